use crate::domain::camera::{CameraView, VisibilityChange, VisibilityTracker, seen_by_any};
use crate::domain::physics::{BodyHandle, PhysicsError, PhysicsWorld};

/// Re-evaluates whether `body` is inside any camera view and records the transition.
pub fn track_body(
    physics: &PhysicsWorld,
    cameras: &[CameraView],
    body: BodyHandle,
    tracker: &mut VisibilityTracker,
) -> Result<VisibilityChange, PhysicsError> {
    let state = physics.body(body)?;
    let bounds = physics.bounds(body)?;
    Ok(tracker.update(seen_by_any(cameras, state.position, bounds.radius)))
}
