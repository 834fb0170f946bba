// Domain layer: core simulation types and rules.

pub mod camera;
pub mod physics;
pub mod ports;
pub mod score;
pub mod state;
pub mod systems;
pub mod tuning;

pub use camera::{CameraView, VisibilityChange, VisibilityTracker};
pub use physics::{BodyHandle, PhysicsError, PhysicsWorld, RigidBody, TemplateHandle};
pub use ports::{InputSource, ScoreSink, TickActor};
pub use score::ScoreKeeper;
pub use state::{OrbSnapshot, PlayerInput, PlayerSnapshot};
