use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::physics::Obstacle;

use super::capture::parse_capture_json;
use super::level_text::parse_level_text;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("{reason}")]
    Unavailable { reason: String },
    #[error("malformed record at line {line}: {message} ('{content}')")]
    Malformed {
        line: usize,
        content: String,
        message: String,
    },
}

/// Something that can yield the obstacle list for a run.
pub trait ObstacleSource {
    fn name(&self) -> &str;
    fn load(&self) -> Result<Vec<Obstacle>, SourceError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Loaded {
        obstacle_count: usize,
    },
    Unavailable {
        reason: String,
    },
    Malformed {
        line: usize,
        content: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceAttempt {
    pub source: String,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Discovered {
    pub source: String,
    pub obstacles: Vec<Obstacle>,
    pub attempts: Vec<SourceAttempt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("no obstacle source produced data ({} tried)", .attempts.len())]
    Unavailable { attempts: Vec<SourceAttempt> },
    #[error("source '{source_name}' is malformed at line {line}: {message}")]
    Malformed {
        source_name: String,
        line: usize,
        content: String,
        message: String,
        attempts: Vec<SourceAttempt>,
    },
}

impl DiscoveryError {
    pub fn attempts(&self) -> &[SourceAttempt] {
        match self {
            Self::Unavailable { attempts } | Self::Malformed { attempts, .. } => attempts,
        }
    }
}

/// Tries `sources` in order and returns the first that yields data.
///
/// An unavailable source falls through to the next one; a malformed source
/// ends discovery immediately.
pub fn discover_obstacles(sources: &[&dyn ObstacleSource]) -> Result<Discovered, DiscoveryError> {
    let mut attempts = Vec::<SourceAttempt>::new();

    for source in sources {
        let name = source.name().to_string();
        match source.load() {
            Ok(obstacles) => {
                info!(
                    source = %name,
                    obstacle_count = obstacles.len(),
                    "obstacle_source_loaded"
                );
                attempts.push(SourceAttempt {
                    source: name.clone(),
                    outcome: AttemptOutcome::Loaded {
                        obstacle_count: obstacles.len(),
                    },
                });
                return Ok(Discovered {
                    source: name,
                    obstacles,
                    attempts,
                });
            }
            Err(SourceError::Unavailable { reason }) => {
                info!(source = %name, reason = %reason, "obstacle_source_unavailable");
                attempts.push(SourceAttempt {
                    source: name,
                    outcome: AttemptOutcome::Unavailable { reason },
                });
            }
            Err(SourceError::Malformed {
                line,
                content,
                message,
            }) => {
                warn!(source = %name, line, message = %message, "obstacle_source_malformed");
                attempts.push(SourceAttempt {
                    source: name.clone(),
                    outcome: AttemptOutcome::Malformed {
                        line,
                        content: content.clone(),
                        message: message.clone(),
                    },
                });
                return Err(DiscoveryError::Malformed {
                    source_name: name,
                    line,
                    content,
                    message,
                    attempts,
                });
            }
        }
    }

    Err(DiscoveryError::Unavailable { attempts })
}

/// Structured `level.txt` file.
#[derive(Debug, Clone)]
pub struct LevelTextFile {
    path: PathBuf,
}

impl LevelTextFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ObstacleSource for LevelTextFile {
    fn name(&self) -> &str {
        "level_text"
    }

    fn load(&self) -> Result<Vec<Obstacle>, SourceError> {
        let raw = read_source_file(&self.path)?;
        let parsed = parse_level_text(&raw).map_err(|error| SourceError::Malformed {
            line: error.line,
            content: error.content,
            message: error.message,
        })?;
        if !parsed.ignored_lines.is_empty() {
            info!(
                path = %self.path.display(),
                ignored_lines = ?parsed.ignored_lines,
                "level_text_unknown_records_skipped"
            );
        }
        Ok(parsed.obstacles)
    }
}

/// JSON snapshot of a running game's object list.
#[derive(Debug, Clone)]
pub struct CaptureFile {
    path: PathBuf,
}

impl CaptureFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ObstacleSource for CaptureFile {
    fn name(&self) -> &str {
        "capture"
    }

    fn load(&self) -> Result<Vec<Obstacle>, SourceError> {
        let raw = read_source_file(&self.path)?;
        let parsed = parse_capture_json(&raw).map_err(|error| SourceError::Malformed {
            line: error.line,
            content: error.path,
            message: error.message,
        })?;
        if parsed.skipped_unknown > 0 {
            info!(
                path = %self.path.display(),
                skipped = parsed.skipped_unknown,
                "capture_unknown_objects_skipped"
            );
        }
        if parsed.obstacles.is_empty() {
            return Err(SourceError::Unavailable {
                reason: format!("capture {} holds no usable objects", self.path.display()),
            });
        }
        Ok(parsed.obstacles)
    }
}

/// Fixed obstacle list, for callers that already hold the geometry.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    obstacles: Vec<Obstacle>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, obstacles: Vec<Obstacle>) -> Self {
        Self {
            name: name.into(),
            obstacles,
        }
    }
}

impl ObstacleSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Vec<Obstacle>, SourceError> {
        Ok(self.obstacles.clone())
    }
}

fn read_source_file(path: &Path) -> Result<String, SourceError> {
    fs::read_to_string(path).map_err(|error| {
        let reason = match error.kind() {
            io::ErrorKind::NotFound => format!("file not found: {}", path.display()),
            _ => format!("failed to read {}: {error}", path.display()),
        };
        SourceError::Unavailable { reason }
    })
}
