//! Deterministic fixed-timestep physics for a forward-scrolling agent.

pub mod consts;
mod obstacle;
mod state;
mod stepper;

pub use obstacle::{GeometryError, Obstacle, ObstacleKind, Rect};
pub use state::AgentState;
pub use stepper::{is_dead, step};
