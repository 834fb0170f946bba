//! Caller-owned host for player controllers.
//!
//! [`World`] owns the physics arena, camera views and score sink, and runs one fixed tick
//! at a time: actor ticks, physics integration, orb expiry, then the visibility pass.

use super::types::GameEvent;
use crate::domain::camera::{CameraView, VisibilityChange, VisibilityTracker};
use crate::domain::physics::{PhysicsError, PhysicsWorld, RigidBody, TemplateHandle};
use crate::domain::ports::{ScoreSink, TickActor};
use crate::domain::state::{OrbSnapshot, PlayerInput, PlayerSnapshot};
use crate::domain::systems::player::PlayerController;
use crate::domain::systems::visibility;
use crate::domain::tuning::orb::OrbTemplate;
use crate::domain::tuning::player::PlayerTuning;
use glam::Vec2;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct WorldSettings {
    pub player_tuning: PlayerTuning,
    pub orb_template: OrbTemplate,
    /// Every camera looking at the arena; a body is visible if any of them sees it.
    pub cameras: Vec<CameraView>,
    pub spawn_point: Vec2,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            player_tuning: PlayerTuning::default(),
            orb_template: OrbTemplate::default(),
            cameras: vec![CameraView::new(Vec2::ZERO, Vec2::new(8.9, 5.0))],
            spawn_point: Vec2::ZERO,
        }
    }
}

/// What happened during one call to [`World::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub orbs_fired: usize,
    pub orbs_expired: usize,
    pub visibility_exits: usize,
}

struct PlayerSlot {
    controller: PlayerController,
    // Level-triggered: stays in effect until the next input arrives.
    input: PlayerInput,
    visibility: VisibilityTracker,
}

pub struct World<S> {
    physics: PhysicsWorld,
    orb_template: TemplateHandle,
    settings: WorldSettings,
    players: Vec<PlayerSlot>,
    score: S,
}

impl<S: ScoreSink> World<S> {
    pub fn new(settings: WorldSettings, score: S) -> Self {
        let mut physics = PhysicsWorld::new();
        let orb_template = physics.register_template(settings.orb_template);
        Self {
            physics,
            orb_template,
            settings,
            players: Vec::new(),
            score,
        }
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    #[cfg(test)]
    pub(crate) fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    pub fn score(&self) -> &S {
        &self.score
    }

    pub fn player(&self, player_id: u64) -> Option<&PlayerController> {
        self.players
            .iter()
            .find(|slot| slot.controller.id() == player_id)
            .map(|slot| &slot.controller)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Spawns a ship for `player_id`. Returns false if the player already has one.
    pub fn join(&mut self, player_id: u64) -> bool {
        if self.player(player_id).is_some() {
            warn!(player_id, "duplicate join ignored");
            return false;
        }

        let tuning = self.settings.player_tuning;
        let body = self.physics.spawn_body(
            RigidBody::at(self.settings.spawn_point, 0.0, tuning.mass)
                .with_linear_drag(tuning.linear_drag),
            tuning.radius,
        );
        self.players.push(PlayerSlot {
            controller: PlayerController::new(player_id, body, self.orb_template, tuning),
            input: PlayerInput::default(),
            visibility: VisibilityTracker::default(),
        });
        info!(player_id, "player joined");
        true
    }

    /// Removes the player's ship. Orbs already in flight are left alone.
    pub fn leave(&mut self, player_id: u64) -> Result<bool, PhysicsError> {
        let Some(index) = self
            .players
            .iter()
            .position(|slot| slot.controller.id() == player_id)
        else {
            return Ok(false);
        };

        let slot = self.players.remove(index);
        self.physics.despawn(slot.controller.body())?;
        info!(player_id, "player left");
        Ok(true)
    }

    pub fn set_input(&mut self, player_id: u64, input: PlayerInput) -> bool {
        match self
            .players
            .iter_mut()
            .find(|slot| slot.controller.id() == player_id)
        {
            Some(slot) => {
                slot.input = input;
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, event: GameEvent) -> Result<(), PhysicsError> {
        match event {
            GameEvent::Join { player_id } => {
                self.join(player_id);
            }
            GameEvent::Leave { player_id } => {
                self.leave(player_id)?;
            }
            GameEvent::Input { player_id, input } => {
                self.set_input(player_id, input);
            }
        }
        Ok(())
    }

    /// Runs one fixed tick of `dt` seconds.
    pub fn step(&mut self, dt: f32) -> Result<TickReport, PhysicsError> {
        let mut report = TickReport::default();

        let orbs_before = self.physics.orb_count();
        for slot in &mut self.players {
            slot.controller.on_physics_tick(&slot.input, &mut self.physics)?;
        }
        report.orbs_fired = self.physics.orb_count() - orbs_before;

        self.physics.integrate(dt);
        report.orbs_expired = self.physics.expire(dt).len();

        for slot in &mut self.players {
            let change = visibility::track_body(
                &self.physics,
                &self.settings.cameras,
                slot.controller.body(),
                &mut slot.visibility,
            )?;
            if change == VisibilityChange::BecameInvisible {
                slot.controller.on_visibility_exit(&mut self.score);
                report.visibility_exits += 1;
            }
        }

        Ok(report)
    }

    pub fn players(&self) -> Vec<PlayerSnapshot> {
        self.players
            .iter()
            .filter_map(|slot| {
                let body = self.physics.body(slot.controller.body()).ok()?;
                Some(PlayerSnapshot {
                    id: slot.controller.id(),
                    x: body.position.x,
                    y: body.position.y,
                    rot: body.rotation,
                    visible: slot.visibility.is_visible(),
                })
            })
            .collect()
    }

    pub fn orbs(&self) -> Vec<OrbSnapshot> {
        self.physics
            .orbs()
            .into_iter()
            .map(|(handle, body)| OrbSnapshot {
                id: handle.id(),
                x: body.position.x,
                y: body.position.y,
                vx: body.velocity.x,
                vy: body.velocity.y,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.02;

    #[derive(Default)]
    struct RecordingScore {
        deltas: Vec<i32>,
    }

    impl ScoreSink for RecordingScore {
        fn adjust_score(&mut self, delta: i32) {
            self.deltas.push(delta);
        }
    }

    fn world() -> World<RecordingScore> {
        World::new(WorldSettings::default(), RecordingScore::default())
    }

    fn fire() -> PlayerInput {
        PlayerInput {
            fire: true,
            ..PlayerInput::default()
        }
    }

    #[test]
    fn when_fire_is_held_for_n_ticks_then_n_orbs_are_fired() {
        let mut world = world();
        world.join(1);
        world.set_input(1, fire());

        let mut fired = 0;
        for _ in 0..25 {
            fired += world.step(DT).unwrap().orbs_fired;
        }

        assert_eq!(fired, 25);
        assert_eq!(world.orbs().len(), 25);
    }

    #[test]
    fn when_fire_is_released_then_firing_stops() {
        let mut world = world();
        world.join(1);
        world.set_input(1, fire());
        world.step(DT).unwrap();
        world.set_input(1, PlayerInput::default());

        let report = world.step(DT).unwrap();

        assert_eq!(report.orbs_fired, 0);
        assert_eq!(world.orbs().len(), 1);
    }

    #[test]
    fn when_orbs_outlive_their_template_lifetime_then_they_expire() {
        let mut world = World::new(
            WorldSettings {
                orb_template: OrbTemplate {
                    life_time: 0.05,
                    ..OrbTemplate::default()
                },
                ..WorldSettings::default()
            },
            RecordingScore::default(),
        );
        world.join(1);
        world.set_input(1, fire());
        world.step(DT).unwrap();
        world.set_input(1, PlayerInput::default());

        let expired: usize = (0..3).map(|_| world.step(DT).unwrap().orbs_expired).sum();

        assert_eq!(expired, 1);
        assert!(world.orbs().is_empty());
    }

    #[test]
    fn when_thrust_is_held_then_ship_accelerates_along_world_axes() {
        let mut world = world();
        world.join(1);
        world.set_input(
            1,
            PlayerInput {
                horizontal: 1.0,
                ..PlayerInput::default()
            },
        );

        world.step(0.5).unwrap();
        world.step(0.5).unwrap();

        let ship = &world.players()[0];
        // v = 0.5 after the first tick and 1.0 after the second; x = 0.25 + 0.5.
        assert!((ship.x - 0.75).abs() < 1e-6);
        assert_eq!(ship.y, 0.0);
    }

    #[test]
    fn when_ship_drifts_off_screen_then_one_point_is_deducted() {
        let mut world = world();
        world.join(1);
        world.step(DT).unwrap();
        world.set_input(
            1,
            PlayerInput {
                horizontal: 1.0,
                ..PlayerInput::default()
            },
        );

        let mut exits = 0;
        for _ in 0..400 {
            exits += world.step(0.1).unwrap().visibility_exits;
        }

        assert_eq!(exits, 1);
        assert_eq!(world.score().deltas, vec![-1]);
        assert_eq!(world.player_count(), 1);
        assert!(!world.players()[0].visible);
    }

    #[test]
    fn when_ship_returns_and_leaves_again_then_another_point_is_deducted() {
        let mut world = world();
        let push = |world: &mut World<RecordingScore>, horizontal: f32, ticks: usize| {
            world.set_input(
                1,
                PlayerInput {
                    horizontal,
                    ..PlayerInput::default()
                },
            );
            (0..ticks)
                .map(|_| world.step(0.1).unwrap().visibility_exits)
                .sum::<usize>()
        };
        world.join(1);

        let first = push(&mut world, 1.0, 60);
        let back = push(&mut world, -1.0, 200);

        assert_eq!(first, 1);
        assert_eq!(back, 1);
        assert_eq!(world.score().deltas, vec![-1, -1]);
    }

    #[test]
    fn when_spawned_outside_every_camera_then_no_point_is_deducted() {
        let mut world = World::new(
            WorldSettings {
                spawn_point: Vec2::new(100.0, 100.0),
                ..WorldSettings::default()
            },
            RecordingScore::default(),
        );
        world.join(1);

        for _ in 0..10 {
            world.step(DT).unwrap();
        }

        assert!(world.score().deltas.is_empty());
    }

    #[test]
    fn when_player_joins_twice_then_only_one_ship_exists() {
        let mut world = world();

        assert!(world.join(4));
        assert!(!world.join(4));
        assert_eq!(world.players().len(), 1);
    }

    #[test]
    fn when_player_leaves_then_ship_is_removed_but_orbs_stay() {
        let mut world = world();
        world.apply(GameEvent::Join { player_id: 2 }).unwrap();
        world
            .apply(GameEvent::Input {
                player_id: 2,
                input: fire(),
            })
            .unwrap();
        world.step(DT).unwrap();
        let body = world.player(2).unwrap().body();

        world.apply(GameEvent::Leave { player_id: 2 }).unwrap();

        assert!(world.players().is_empty());
        assert!(!world.physics().contains(body));
        assert_eq!(world.orbs().len(), 1);
        assert_eq!(world.leave(2), Ok(false));
    }

    #[test]
    fn when_input_targets_unknown_player_then_it_is_ignored() {
        let mut world = world();

        assert!(!world.set_input(9, fire()));
        assert_eq!(world.step(DT).unwrap(), TickReport::default());
    }
}
