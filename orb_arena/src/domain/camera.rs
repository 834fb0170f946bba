// Camera views and the visible/invisible transitions derived from them.

use glam::Vec2;

/// Axis-aligned visible area of one camera, in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl CameraView {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents,
        }
    }

    /// True if a circle of `radius` at `position` overlaps the view.
    pub fn sees(&self, position: Vec2, radius: f32) -> bool {
        let offset = position - self.center;
        let closest = offset.clamp(-self.half_extents, self.half_extents);
        offset.distance_squared(closest) <= radius * radius
    }
}

pub fn seen_by_any(cameras: &[CameraView], position: Vec2, radius: f32) -> bool {
    cameras.iter().any(|camera| camera.sees(position, radius))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityChange {
    BecameVisible,
    BecameInvisible,
    Unchanged,
}

/// Remembers whether a body was visible on the previous tick.
///
/// Starts out not visible, so a body has to be seen once before it can become invisible.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityTracker {
    visible: bool,
}

impl VisibilityTracker {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn update(&mut self, visible_now: bool) -> VisibilityChange {
        let change = match (self.visible, visible_now) {
            (false, true) => VisibilityChange::BecameVisible,
            (true, false) => VisibilityChange::BecameInvisible,
            _ => VisibilityChange::Unchanged,
        };
        self.visible = visible_now;
        change
    }
}
