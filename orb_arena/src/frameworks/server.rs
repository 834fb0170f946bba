// Framework bootstrap for the orb arena runtime.

use crate::domain::ScoreKeeper;
use crate::frameworks::config;
use crate::interface_adapters::http::score_handler;
use crate::interface_adapters::net::{world_update_serializer, ws_handler};
use crate::interface_adapters::state::AppState;
use crate::use_cases::game::world_task;
use crate::use_cases::{GameEvent, ServerState, WorldSettings, WorldUpdate};

use axum::{Router, extract::ws::Utf8Bytes, routing::get};
use std::net::SocketAddr;
use std::sync::atomic::AtomicU64;
use std::{io::Result, sync::Arc, time::Duration};
use tokio::sync::{Notify, broadcast, mpsc, watch};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Serves the arena on `listener` with default gameplay settings.
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    run_with_settings(listener, WorldSettings::default(), config::tick_interval()).await
}

pub async fn run_with_settings(
    listener: tokio::net::TcpListener,
    settings: WorldSettings,
    tick_interval: Duration,
) -> Result<()> {
    let address = listener.local_addr()?;
    let shutdown = Arc::new(Notify::new());
    let state = build_state(settings, tick_interval, shutdown.clone());

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/score", get(score_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        });
    shutdown.notify_one();
    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run_with_settings(listener, config::world_settings(), config::tick_interval()).await
}

fn build_state(
    settings: WorldSettings,
    tick_interval: Duration,
    shutdown: Arc<Notify>,
) -> Arc<AppState> {
    // input_tx/rx: all client inputs go to the single world task.
    let (input_tx, input_rx) = mpsc::channel::<GameEvent>(config::INPUT_CHANNEL_CAPACITY);
    let (world_tx, _world_rx) =
        broadcast::channel::<WorldUpdate>(config::WORLD_BROADCAST_CAPACITY);
    let (world_bytes_tx, _world_bytes_rx) =
        broadcast::channel::<Utf8Bytes>(config::WORLD_BROADCAST_CAPACITY);
    let (world_latest_tx, _world_latest_rx) = watch::channel::<Utf8Bytes>(Utf8Bytes::from(""));
    let (server_state_tx, _server_state_rx) = watch::channel::<ServerState>(ServerState::Starting);
    let score = ScoreKeeper::new();

    tracing::debug!(
        tick_ms = tick_interval.as_millis() as u64,
        engine_power = settings.player_tuning.engine_power,
        rotate_speed = settings.player_tuning.rotate_speed,
        orb_velocity = settings.player_tuning.orb_velocity,
        "world configured"
    );

    tokio::spawn(world_task(
        input_rx,
        world_tx.clone(),
        server_state_tx.clone(),
        settings,
        score.clone(),
        tick_interval,
        shutdown,
    ));

    tokio::spawn(world_update_serializer(
        world_tx.subscribe(),
        world_bytes_tx.clone(),
        world_latest_tx.clone(),
    ));

    Arc::new(AppState {
        input_tx,
        world_bytes_tx,
        world_latest_tx,
        server_state_tx,
        score,
        next_player_id: AtomicU64::new(1),
    })
}
