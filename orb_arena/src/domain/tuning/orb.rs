/// Prototype for fired orbs. Registered once with the physics world and referenced by handle.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbTemplate {
    /// Body mass of each spawned orb.
    pub mass: f32,

    /// Radius of the renderable bounds.
    pub radius: f32,

    /// Lifetime in seconds before the orb is despawned.
    pub life_time: f32,
}

impl Default for OrbTemplate {
    fn default() -> Self {
        Self {
            mass: 0.1,
            radius: 0.15,
            life_time: 2.0,
        }
    }
}
