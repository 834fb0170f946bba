// Domain-level input and snapshot types.

use crate::domain::ports::InputSource;

pub const HORIZONTAL_AXIS: &str = "Horizontal";
pub const VERTICAL_AXIS: &str = "Vertical";
pub const ROTATE_AXIS: &str = "Rotate";
pub const FIRE_BUTTON: &str = "Fire";

/// Latest input state for one player, polled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    pub horizontal: f32,
    pub vertical: f32,
    pub rotate: f32,
    pub fire: bool,
}

impl InputSource for PlayerInput {
    fn axis(&self, name: &str) -> f32 {
        match name {
            HORIZONTAL_AXIS => self.horizontal,
            VERTICAL_AXIS => self.vertical,
            ROTATE_AXIS => self.rotate,
            _ => 0.0,
        }
    }

    fn button(&self, name: &str) -> bool {
        name == FIRE_BUTTON && self.fire
    }
}

#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub rot: f32,
    pub visible: bool,
}

#[derive(Debug, Clone)]
pub struct OrbSnapshot {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}
