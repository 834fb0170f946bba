use crate::domain::ScoreKeeper;
use crate::use_cases::{GameEvent, ServerState};
use axum::extract::ws::Utf8Bytes;
use std::sync::atomic::AtomicU64;
use tokio::sync::{broadcast, mpsc, watch};

pub struct AppState {
    // Inputs flowing from the network into the world loop.
    pub input_tx: mpsc::Sender<GameEvent>,
    // Serialized world updates, shared across all connections.
    pub world_bytes_tx: broadcast::Sender<Utf8Bytes>,
    // Latest serialized world update for lag recovery.
    pub world_latest_tx: watch::Sender<Utf8Bytes>,
    // World loop lifecycle.
    pub server_state_tx: watch::Sender<ServerState>,
    // Shared with the world loop, which is the only writer.
    pub score: ScoreKeeper,
    // Source of player ids for new connections.
    pub next_player_id: AtomicU64,
}
