use crate::domain::physics::{PhysicsError, PhysicsWorld};

// Port for polled input: named analog axes and named buttons.
pub trait InputSource {
    fn axis(&self, name: &str) -> f32;
    fn button(&self, name: &str) -> bool;
}

// Port for the process-wide score store.
pub trait ScoreSink {
    fn adjust_score(&mut self, delta: i32);
}

/// Capability implemented by anything the world loop drives once per fixed tick.
pub trait TickActor {
    /// Reads the polled input and writes this actor's physics state.
    fn on_physics_tick(
        &mut self,
        input: &dyn InputSource,
        physics: &mut PhysicsWorld,
    ) -> Result<(), PhysicsError>;

    /// Called once when the actor's bounds leave every camera view.
    fn on_visibility_exit(&mut self, score: &mut dyn ScoreSink);
}
