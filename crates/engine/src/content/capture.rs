use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::physics::{GeometryError, Obstacle, ObstacleKind, Rect};

/// One entry of a captured object list. Also the obstacle encoding used in
/// run reports, so a report can be fed back in as a capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawObstacleRecord")]
pub struct ObstacleRecord {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<f32>,
}

#[derive(Deserialize)]
struct RawObstacleRecord {
    #[serde(rename = "type")]
    kind: RecordKind,
    #[serde(deserialize_with = "finite")]
    x: f32,
    #[serde(deserialize_with = "finite")]
    y: f32,
    #[serde(deserialize_with = "extent")]
    w: f32,
    #[serde(deserialize_with = "extent")]
    h: f32,
    #[serde(default, deserialize_with = "finite_power")]
    power: Option<f32>,
}

impl TryFrom<RawObstacleRecord> for ObstacleRecord {
    type Error = GeometryError;

    fn try_from(raw: RawObstacleRecord) -> Result<Self, Self::Error> {
        let record = Self {
            kind: raw.kind,
            x: raw.x,
            y: raw.y,
            w: raw.w,
            h: raw.h,
            power: raw.power,
        };
        if let Some(obstacle) = record.to_obstacle() {
            obstacle.validate()?;
        }
        Ok(record)
    }
}

fn finite<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    let value = f64::deserialize(deserializer)?;
    narrow(value).ok_or_else(|| D::Error::custom(format!("{value} does not fit a finite f32")))
}

fn extent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    let value = finite(deserializer)?;
    if value < 0.0 {
        return Err(D::Error::custom(format!("{value} must be >= 0")));
    }
    Ok(value)
}

fn finite_power<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f32>, D::Error> {
    match Option::<f64>::deserialize(deserializer)? {
        Some(value) => narrow(value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("{value} does not fit a finite f32"))),
        None => Ok(None),
    }
}

fn narrow(value: f64) -> Option<f32> {
    let narrowed = value as f32;
    narrowed.is_finite().then_some(narrowed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Platform,
    Spike,
    JumpPad,
    #[serde(other)]
    Unknown,
}

impl From<&Obstacle> for ObstacleRecord {
    fn from(obstacle: &Obstacle) -> Self {
        let kind = match obstacle.kind {
            ObstacleKind::Platform => RecordKind::Platform,
            ObstacleKind::Spike => RecordKind::Spike,
            ObstacleKind::JumpPad => RecordKind::JumpPad,
        };
        Self {
            kind,
            x: obstacle.rect.x,
            y: obstacle.rect.y,
            w: obstacle.rect.w,
            h: obstacle.rect.h,
            power: obstacle.power,
        }
    }
}

impl ObstacleRecord {
    pub fn to_obstacle(&self) -> Option<Obstacle> {
        let kind = match self.kind {
            RecordKind::Platform => ObstacleKind::Platform,
            RecordKind::Spike => ObstacleKind::Spike,
            RecordKind::JumpPad => ObstacleKind::JumpPad,
            RecordKind::Unknown => return None,
        };
        Some(Obstacle {
            kind,
            rect: Rect::new(self.x, self.y, self.w, self.h),
            power: match kind {
                ObstacleKind::JumpPad => self.power,
                _ => None,
            },
        })
    }
}

#[derive(Debug, Deserialize)]
struct CaptureDocument {
    objects: Vec<ObstacleRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCapture {
    pub obstacles: Vec<Obstacle>,
    pub skipped_unknown: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureParseError {
    /// JSON path of the offending value, `.` for the document root.
    pub path: String,
    pub message: String,
    pub line: usize,
}

/// Parses a `{"objects": [...]}` snapshot, skipping objects of unknown type.
pub fn parse_capture_json(raw: &str) -> Result<ParsedCapture, CaptureParseError> {
    let deserializer = &mut serde_json::Deserializer::from_str(raw);
    let document: CaptureDocument =
        serde_path_to_error::deserialize(deserializer).map_err(|error| CaptureParseError {
            path: error.path().to_string(),
            line: error.inner().line(),
            message: error.inner().to_string(),
        })?;

    let total = document.objects.len();
    let obstacles = document
        .objects
        .iter()
        .filter_map(ObstacleRecord::to_obstacle)
        .collect::<Vec<_>>();
    Ok(ParsedCapture {
        skipped_unknown: total - obstacles.len(),
        obstacles,
    })
}
