// Use-case level inputs/outputs for the game loop.

use crate::domain::{OrbSnapshot, PlayerInput, PlayerSnapshot};

#[derive(Debug, Clone)]
pub enum GameEvent {
    Join { player_id: u64 },
    Leave { player_id: u64 },
    Input { player_id: u64, input: PlayerInput },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerState {
    Starting,
    Running,
    // The world loop stopped on a configuration fault.
    Halted,
}

#[derive(Debug, Clone)]
pub struct WorldUpdate {
    pub tick: u64,
    pub score: i64,
    pub players: Vec<PlayerSnapshot>,
    pub orbs: Vec<OrbSnapshot>,
}
