// Use cases layer: application workflows for the orb arena.

pub mod game;
pub mod types;
pub mod world;

pub use types::{GameEvent, ServerState, WorldUpdate};
pub use world::{TickReport, World, WorldSettings};
