use serde::{Deserialize, Serialize};

use super::consts::PLAYER_SPEED;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub px: f32,
    pub py: f32,
    pub vx: f32,
    pub vy: f32,
    /// True only if the step that produced this state detected a landing.
    #[serde(rename = "onGround")]
    pub on_ground: bool,
}

impl AgentState {
    /// Grounded agent at rest vertically, moving at full forward speed.
    pub fn grounded_at(px: f32, py: f32) -> Self {
        Self {
            px,
            py,
            vx: PLAYER_SPEED,
            vy: 0.0,
            on_ground: true,
        }
    }
}
