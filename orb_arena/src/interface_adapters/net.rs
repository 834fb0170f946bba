use crate::domain::PlayerInput;
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage, WorldUpdateDto};
use crate::interface_adapters::state::AppState;
use crate::use_cases::{GameEvent, ServerState, WorldUpdate};

use axum::{
    Error,
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures_util::SinkExt;
use std::{
    sync::{Arc, atomic::Ordering},
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    InputClosed,
    WorldUpdatesClosed,
    ServerStateClosed,
}

enum LoopControl {
    Continue,
    Disconnect,
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;

pub async fn world_update_serializer(
    mut world_rx: broadcast::Receiver<WorldUpdate>,
    world_bytes_tx: broadcast::Sender<Utf8Bytes>,
    world_latest_tx: watch::Sender<Utf8Bytes>,
) {
    // Serialize each world update once and broadcast the shared bytes.
    loop {
        match world_rx.recv().await {
            Ok(update) => {
                let msg = ServerMessage::WorldUpdate(WorldUpdateDto::from(update));
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize world update");
                        continue;
                    }
                };

                let bytes = Utf8Bytes::from(txt);
                let _ = world_latest_tx.send(bytes.clone());
                let _ = world_bytes_tx.send(bytes);
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(
                    missed = n,
                    "world serializer lagged; skipping to latest update"
                );
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("world updates channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let player_id = state.next_player_id.fetch_add(1, Ordering::Relaxed);
    ws.on_upgrade(move |socket| {
        handle_socket(socket, state, player_id).instrument(info_span!("conn", player_id))
    })
}

struct ConnCtx {
    player_id: u64,
    input_tx: mpsc::Sender<GameEvent>,
    world_bytes_rx: broadcast::Receiver<Utf8Bytes>,
    world_latest_rx: watch::Receiver<Utf8Bytes>,
    server_state_rx: watch::Receiver<ServerState>,

    msgs_in: u64,
    msgs_out: u64,
    invalid_json: u32,
    lag_recovery_count: u64,

    last_input_full_log: Instant,
    last_invalid_input_log: Instant,
    last_world_lag_log: Instant,

    close_frame: Option<CloseFrame>,
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, player_id: u64) {
    let mut ctx = match bootstrap_connection(&mut socket, &state, player_id).await {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(error = ?e, "failed to bootstrap connection");
            let _ = socket.close().await;
            return;
        }
    };
    info!(player_id, "client connected");

    if let Err(e) = run_client_loop(&mut socket, &mut ctx).await {
        warn!(error = ?e, "client loop exited with error");
    }
}

async fn bootstrap_connection(
    socket: &mut WebSocket,
    state: &AppState,
    player_id: u64,
) -> Result<ConnCtx, NetError> {
    // Subscribe before any await so the first ticks after Join are not missed.
    let world_bytes_rx = state.world_bytes_tx.subscribe();
    let world_latest_rx = state.world_latest_tx.subscribe();
    let server_state_rx = state.server_state_tx.subscribe();

    send_message(
        socket,
        &ServerMessage::Identity {
            player_id: player_id.to_string(),
        },
    )
    .await?;

    state
        .input_tx
        .send(GameEvent::Join { player_id })
        .await
        .map_err(|_| NetError::InputClosed)?;

    let initial_state = server_state_rx.borrow().clone();
    if let Err(e) = send_message(socket, &ServerMessage::GameState(initial_state.into())).await {
        // Compensate so the ship does not outlive a connection that never started.
        let _ = state.input_tx.send(GameEvent::Leave { player_id }).await;
        return Err(e);
    }

    let now = Instant::now()
        .checked_sub(LOG_THROTTLE)
        .unwrap_or_else(Instant::now);
    Ok(ConnCtx {
        player_id,
        input_tx: state.input_tx.clone(),
        world_bytes_rx,
        world_latest_rx,
        server_state_rx,
        msgs_in: 0,
        msgs_out: 0,
        invalid_json: 0,
        lag_recovery_count: 0,
        last_input_full_log: now,
        last_invalid_input_log: now,
        last_world_lag_log: now,
        close_frame: None,
    })
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<(), NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

/// Drops non-finite axes and clamps the rest to the [-1, 1] range the controller expects.
pub fn sanitize_input(mut input: PlayerInput) -> Option<PlayerInput> {
    if !input.horizontal.is_finite() || !input.vertical.is_finite() || !input.rotate.is_finite()
    {
        return None;
    }

    input.horizontal = input.horizontal.clamp(-1.0, 1.0);
    input.vertical = input.vertical.clamp(-1.0, 1.0);
    input.rotate = input.rotate.clamp(-1.0, 1.0);

    Some(input)
}

fn forward_input(ctx: &mut ConnCtx, input: PlayerInput) -> Result<LoopControl, NetError> {
    let player_id = ctx.player_id;
    let Some(input) = sanitize_input(input) else {
        if should_log(&mut ctx.last_invalid_input_log) {
            warn!(player_id, "invalid input values (NaN/inf); dropping");
        }
        return Ok(LoopControl::Continue);
    };

    match ctx.input_tx.try_send(GameEvent::Input { player_id, input }) {
        Ok(()) => Ok(LoopControl::Continue),
        Err(mpsc::error::TrySendError::Full(_)) => {
            if should_log(&mut ctx.last_input_full_log) {
                warn!(player_id, "input channel full; dropping input");
            }
            Ok(LoopControl::Continue)
        }
        Err(mpsc::error::TrySendError::Closed(_)) => Err(NetError::InputClosed),
    }
}

fn handle_incoming(
    ctx: &mut ConnCtx,
    incoming: Option<Result<Message, Error>>,
) -> Result<LoopControl, NetError> {
    let player_id = ctx.player_id;
    match incoming {
        Some(Ok(Message::Text(text))) => {
            ctx.msgs_in += 1;
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Input(input)) => forward_input(ctx, input.into()),
                Err(parse_err) => {
                    ctx.invalid_json += 1;
                    if should_log(&mut ctx.last_invalid_input_log) {
                        warn!(
                            player_id,
                            bytes = text.len(),
                            error = %parse_err,
                            "failed to parse client message"
                        );
                    }

                    if ctx.invalid_json > MAX_INVALID_JSON {
                        ctx.close_frame = Some(CloseFrame {
                            code: close_code::POLICY,
                            reason: "too many invalid messages".into(),
                        });
                        return Ok(LoopControl::Disconnect);
                    }
                    Ok(LoopControl::Continue)
                }
            }
        }
        Some(Ok(Message::Binary(_))) => {
            ctx.close_frame = Some(CloseFrame {
                code: close_code::UNSUPPORTED,
                reason: "binary messages not supported".into(),
            });
            Ok(LoopControl::Disconnect)
        }
        Some(Ok(Message::Ping(_) | Message::Pong(_))) => Ok(LoopControl::Continue),
        Some(Ok(Message::Close(_))) => Ok(LoopControl::Disconnect),
        Some(Err(e)) => {
            warn!(player_id, error = %e, "websocket recv error");
            Ok(LoopControl::Disconnect)
        }
        None => {
            info!(player_id, "websocket closed");
            Ok(LoopControl::Disconnect)
        }
    }
}

async fn forward_world_bytes(
    bytes: Utf8Bytes,
    socket: &mut WebSocket,
    msgs_out: &mut u64,
) -> LoopControl {
    match socket.send(Message::Text(bytes)).await {
        Ok(()) => {
            *msgs_out += 1;
            LoopControl::Continue
        }
        Err(err) => {
            warn!(error = ?err, "failed to send world update");
            LoopControl::Disconnect
        }
    }
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let player_id = ctx.player_id;
    let mut fatal: Option<NetError> = None;

    loop {
        let disconnect = tokio::select! {
            incoming = socket.recv() => match handle_incoming(ctx, incoming) {
                Ok(LoopControl::Continue) => false,
                Ok(LoopControl::Disconnect) => true,
                Err(e) => {
                    fatal = Some(e);
                    true
                }
            },

            world_msg = ctx.world_bytes_rx.recv() => match world_msg {
                Ok(bytes) => matches!(
                    forward_world_bytes(bytes, socket, &mut ctx.msgs_out).await,
                    LoopControl::Disconnect
                ),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    if should_log(&mut ctx.last_world_lag_log) {
                        warn!(player_id, missed = n, "world updates lagged; sending snapshot");
                    }
                    // Resync with the most recent snapshot instead of replaying the backlog.
                    let latest = ctx.world_latest_rx.borrow().clone();
                    if latest.is_empty() {
                        false
                    } else {
                        ctx.lag_recovery_count += 1;
                        matches!(
                            forward_world_bytes(latest, socket, &mut ctx.msgs_out).await,
                            LoopControl::Disconnect
                        )
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    fatal = Some(NetError::WorldUpdatesClosed);
                    true
                }
            },

            changed = ctx.server_state_rx.changed() => match changed {
                Ok(()) => {
                    let st = ctx.server_state_rx.borrow().clone();
                    match send_message(socket, &ServerMessage::GameState(st.into())).await {
                        Ok(()) => {
                            ctx.msgs_out += 1;
                            false
                        }
                        Err(err) => {
                            warn!(error = ?err, "failed to send server state");
                            true
                        }
                    }
                }
                Err(_) => {
                    warn!(player_id, "server state channel closed; disconnecting");
                    fatal = Some(NetError::ServerStateClosed);
                    true
                }
            },
        };

        if disconnect {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    if let Err(e) = ctx
        .input_tx
        .send(GameEvent::Leave { player_id })
        .await
        .map_err(|_| NetError::InputClosed)
    {
        warn!(error = ?e, "failed to despawn player on disconnect");
        if fatal.is_none() {
            fatal = Some(e);
        }
    }

    debug!(
        player_id,
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        invalid_json = ctx.invalid_json,
        lag_recovery_count = ctx.lag_recovery_count,
        "connection stats"
    );
    info!(player_id, "client disconnected");

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
