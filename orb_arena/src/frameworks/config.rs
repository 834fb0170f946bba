use crate::domain::CameraView;
use crate::domain::tuning::{orb::OrbTemplate, player::PlayerTuning};
use crate::use_cases::WorldSettings;
use glam::Vec2;
use std::{env, str::FromStr, time::Duration};

// Runtime/server constants (not gameplay tuning).

pub const INPUT_CHANNEL_CAPACITY: usize = 1024;
pub const WORLD_BROADCAST_CAPACITY: usize = 128;

const DEFAULT_TICK_RATE_HZ: u32 = 50;

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub fn http_port() -> u16 {
    env_or("ORB_ARENA_PORT", 3001)
}

/// Fixed physics step derived from `TICK_RATE_HZ` (at least 1 Hz).
pub fn tick_interval() -> Duration {
    let hz = env_or("TICK_RATE_HZ", DEFAULT_TICK_RATE_HZ).max(1);
    Duration::from_secs_f64(1.0 / f64::from(hz))
}

pub fn player_tuning() -> PlayerTuning {
    let defaults = PlayerTuning::default();
    PlayerTuning {
        engine_power: env_or("ENGINE_POWER", defaults.engine_power),
        // Degrees per second in the environment, radians per second in the simulation.
        rotate_speed: env_or("ROTATE_SPEED", defaults.rotate_speed.to_degrees()).to_radians(),
        orb_velocity: env_or("ORB_VELOCITY", defaults.orb_velocity),
        ..defaults
    }
}

pub fn orb_template() -> OrbTemplate {
    let defaults = OrbTemplate::default();
    OrbTemplate {
        life_time: env_or("ORB_LIFE_TIME", defaults.life_time),
        ..defaults
    }
}

pub fn world_settings() -> WorldSettings {
    let defaults = WorldSettings::default();
    let half_extents = Vec2::new(
        env_or("VIEW_HALF_WIDTH", 8.9),
        env_or("VIEW_HALF_HEIGHT", 5.0),
    );
    WorldSettings {
        player_tuning: player_tuning(),
        orb_template: orb_template(),
        cameras: vec![CameraView::new(Vec2::ZERO, half_extents)],
        ..defaults
    }
}
