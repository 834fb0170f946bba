/// Gameplay tuning for the player-controlled ship.
///
/// Keep this separate from runtime/server configuration (tick rates, ports, etc.).

#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Force applied per unit of directional input.
    pub engine_power: f32,

    /// Angular velocity in radians per second at full rotate input.
    ///
    /// The default is one degree per second; `ROTATE_SPEED` is given in degrees per second.
    pub rotate_speed: f32,

    /// Speed given to each fired orb, in units per second.
    pub orb_velocity: f32,

    /// Body mass used when integrating engine force.
    pub mass: f32,

    /// Linear drag applied by the physics step (0 disables).
    pub linear_drag: f32,

    /// Radius of the renderable bounds used for camera visibility.
    pub radius: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            engine_power: 1.0,
            rotate_speed: 1f32.to_radians(),
            orb_velocity: 10.0,
            mass: 1.0,
            linear_drag: 0.0,
            radius: 0.5,
        }
    }
}
