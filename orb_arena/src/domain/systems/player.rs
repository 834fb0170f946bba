//! Player ship controller.
//!
//! Each fixed tick the ship is steered by a world-space engine force and a directly set
//! spin, and fires one orb for every tick the fire button is held. There is no fire
//! cooldown; holding the button emits a continuous stream of orbs.

use crate::domain::physics::{BodyHandle, PhysicsError, PhysicsWorld, TemplateHandle};
use crate::domain::ports::{InputSource, ScoreSink, TickActor};
use crate::domain::state::{FIRE_BUTTON, HORIZONTAL_AXIS, ROTATE_AXIS, VERTICAL_AXIS};
use crate::domain::tuning::player::PlayerTuning;
use glam::Vec2;
use tracing::{info, trace};

/// Points deducted each time the ship is knocked out of view.
pub const OFF_SCREEN_PENALTY: i32 = -1;

#[derive(Debug, Clone)]
pub struct PlayerController {
    id: u64,
    body: BodyHandle,
    orb_template: TemplateHandle,
    tuning: PlayerTuning,
}

impl PlayerController {
    pub fn new(
        id: u64,
        body: BodyHandle,
        orb_template: TemplateHandle,
        tuning: PlayerTuning,
    ) -> Self {
        Self {
            id,
            body,
            orb_template,
            tuning,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Applies engine force in world coordinates and sets the spin from the rotate axis.
    ///
    /// The (horizontal, vertical) pair is scaled but never normalised, so diagonal thrust is
    /// stronger than thrust along a single axis.
    pub fn manoeuvre(
        &self,
        input: &dyn InputSource,
        physics: &mut PhysicsWorld,
    ) -> Result<(), PhysicsError> {
        let direction = Vec2::new(input.axis(HORIZONTAL_AXIS), input.axis(VERTICAL_AXIS));
        physics.add_force(self.body, direction * self.tuning.engine_power)?;
        physics.set_angular_velocity(self.body, input.axis(ROTATE_AXIS) * self.tuning.rotate_speed)
    }

    /// Fires one orb if the fire button is currently held.
    pub fn maybe_fire(
        &self,
        input: &dyn InputSource,
        physics: &mut PhysicsWorld,
    ) -> Result<Option<BodyHandle>, PhysicsError> {
        if input.button(FIRE_BUTTON) {
            self.fire_orb(physics).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Spawns an orb one unit in front of the ship, moving along the ship's facing at
    /// `orb_velocity`.
    pub fn fire_orb(&self, physics: &mut PhysicsWorld) -> Result<BodyHandle, PhysicsError> {
        let ship = physics.body(self.body)?;
        let facing = ship.facing();

        let orb = physics.instantiate(self.orb_template, ship.position, 0.0)?;
        physics.translate(orb, facing)?;
        physics.set_velocity(orb, facing * self.tuning.orb_velocity)?;

        trace!(player_id = self.id, orb_id = orb.id(), "orb fired");
        Ok(orb)
    }
}

impl TickActor for PlayerController {
    fn on_physics_tick(
        &mut self,
        input: &dyn InputSource,
        physics: &mut PhysicsWorld,
    ) -> Result<(), PhysicsError> {
        self.manoeuvre(input, physics)?;
        self.maybe_fire(input, physics)?;
        Ok(())
    }

    fn on_visibility_exit(&mut self, score: &mut dyn ScoreSink) {
        info!(player_id = self.id, "player knocked off screen");
        score.adjust_score(OFF_SCREEN_PENALTY);
    }
}
