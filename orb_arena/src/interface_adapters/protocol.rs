// Wire protocol DTOs and conversions for public orb arena messages.

use crate::domain::{OrbSnapshot, PlayerInput, PlayerSnapshot};
use crate::use_cases::{ServerState, WorldUpdate};
use serde::{Deserialize, Serialize};

/// Messages the server sends to connected clients over the WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    // Assigned identity for the connection.
    Identity { player_id: String },
    // Snapshot of the world for a given tick.
    WorldUpdate(WorldUpdateDto),
    // World loop lifecycle (starting, running, halted).
    GameState(ServerStateDto),
}

/// Messages the client sends to the server over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    Input(PlayerInputDto),
}

/// Axis and button state; missing fields default to released.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerInputDto {
    #[serde(default)]
    pub horizontal: f32,
    #[serde(default)]
    pub vertical: f32,
    #[serde(default)]
    pub rotate: f32,
    #[serde(default)]
    pub fire: bool,
}

impl From<PlayerInputDto> for PlayerInput {
    fn from(input: PlayerInputDto) -> Self {
        Self {
            horizontal: input.horizontal,
            vertical: input.vertical,
            rotate: input.rotate,
            fire: input.fire,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldUpdateDto {
    pub tick: u64,
    pub score: i64,
    pub players: Vec<PlayerStateDto>,
    pub orbs: Vec<OrbStateDto>,
}

impl From<WorldUpdate> for WorldUpdateDto {
    fn from(update: WorldUpdate) -> Self {
        Self {
            tick: update.tick,
            score: update.score,
            players: update.players.iter().map(PlayerStateDto::from).collect(),
            orbs: update.orbs.iter().map(OrbStateDto::from).collect(),
        }
    }
}

// Ids are strings on the wire so JavaScript clients keep full u64 precision.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerStateDto {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub rot: f32,
    pub visible: bool,
}

impl From<&PlayerSnapshot> for PlayerStateDto {
    fn from(player: &PlayerSnapshot) -> Self {
        Self {
            id: player.id.to_string(),
            x: player.x,
            y: player.y,
            rot: player.rot,
            visible: player.visible,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrbStateDto {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl From<&OrbSnapshot> for OrbStateDto {
    fn from(orb: &OrbSnapshot) -> Self {
        Self {
            id: orb.id.to_string(),
            x: orb.x,
            y: orb.y,
            vx: orb.vx,
            vy: orb.vy,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub enum ServerStateDto {
    Starting,
    Running,
    Halted,
}

impl From<ServerState> for ServerStateDto {
    fn from(state: ServerState) -> Self {
        match state {
            ServerState::Starting => ServerStateDto::Starting,
            ServerState::Running => ServerStateDto::Running,
            ServerState::Halted => ServerStateDto::Halted,
        }
    }
}

/// Response body for `GET /score`.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreResponse {
    pub points: i64,
}
