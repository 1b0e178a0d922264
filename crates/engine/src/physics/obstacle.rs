use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::consts::DEATH_THRESHOLD_Y;

/// Axis-aligned rectangle anchored at its bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y + self.h
    }

    pub fn spans_x(&self, px: f32) -> bool {
        px >= self.left() && px <= self.right()
    }

    /// Inclusive point membership with no tolerance.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        self.spans_x(px) && py >= self.y && py <= self.top()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Platform,
    Spike,
    JumpPad,
}

impl ObstacleKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Platform => "PLATFORM",
            Self::Spike => "SPIKE",
            Self::JumpPad => "JUMP_PAD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub rect: Rect,
    /// Jump pads only.
    pub power: Option<f32>,
}

impl Obstacle {
    pub fn platform(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            kind: ObstacleKind::Platform,
            rect: Rect::new(x, y, w, h),
            power: None,
        }
    }

    pub fn spike(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            kind: ObstacleKind::Spike,
            rect: Rect::new(x, y, w, h),
            power: None,
        }
    }

    pub fn jump_pad(x: f32, y: f32, w: f32, h: f32, power: Option<f32>) -> Self {
        Self {
            kind: ObstacleKind::JumpPad,
            rect: Rect::new(x, y, w, h),
            power,
        }
    }

    pub fn is_platform(&self) -> bool {
        self.kind == ObstacleKind::Platform
    }

    /// Rejects geometry the stepper cannot tell apart from a dead agent.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let Rect { x, y, w, h } = self.rect;
        for (field, value) in [("x", x), ("y", y), ("w", w), ("h", h)] {
            if !value.is_finite() {
                return Err(GeometryError::NonFinite { field });
            }
        }
        if let Some(power) = self.power {
            if !power.is_finite() {
                return Err(GeometryError::NonFinite { field: "power" });
            }
        }
        for (field, value) in [("w", w), ("h", h)] {
            if value < 0.0 {
                return Err(GeometryError::NegativeExtent { field });
            }
        }
        let top = self.rect.top();
        if !top.is_finite() || top <= DEATH_THRESHOLD_Y {
            return Err(GeometryError::BelowDeathThreshold { top });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
    #[error("{field} must be >= 0")]
    NegativeExtent { field: &'static str },
    #[error("top edge {top} must lie above the dead threshold {}", DEATH_THRESHOLD_Y)]
    BelowDeathThreshold { top: f32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive_on_every_edge() {
        let rect = Rect::new(10.0, 20.0, 5.0, 4.0);
        assert!(rect.contains(10.0, 20.0));
        assert!(rect.contains(15.0, 24.0));
        assert!(!rect.contains(15.001, 22.0));
        assert!(!rect.contains(12.0, 19.999));
    }

    #[test]
    fn validate_rejects_bad_numbers_and_sunken_geometry() {
        assert_eq!(Obstacle::platform(0.0, -1_100.0, 10.0, 200.0).validate(), Ok(()));
        assert_eq!(
            Obstacle::platform(0.0, 0.0, -10.0, 20.0).validate(),
            Err(GeometryError::NegativeExtent { field: "w" })
        );
        assert_eq!(
            Obstacle::spike(f32::INFINITY, 0.0, 10.0, 20.0).validate(),
            Err(GeometryError::NonFinite { field: "x" })
        );
        assert_eq!(
            Obstacle::jump_pad(0.0, 0.0, 10.0, 16.0, Some(f32::NAN)).validate(),
            Err(GeometryError::NonFinite { field: "power" })
        );
        assert_eq!(
            Obstacle::platform(0.0, -1_500.0, 1_000.0, 20.0).validate(),
            Err(GeometryError::BelowDeathThreshold { top: -1_480.0 })
        );
        assert!(Obstacle::platform(0.0, -1_020.0, 10.0, 20.0)
            .validate()
            .is_err());
    }

    #[test]
    fn top_and_right_edges_follow_extent() {
        let rect = Rect::new(-4.0, 2.0, 8.0, 3.0);
        assert_eq!(rect.right(), 4.0);
        assert_eq!(rect.top(), 5.0);
    }
}
