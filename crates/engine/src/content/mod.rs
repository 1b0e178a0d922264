mod capture;
mod level_text;
mod sources;

pub use capture::{
    parse_capture_json, CaptureParseError, ObstacleRecord, ParsedCapture, RecordKind,
};
pub use level_text::{
    parse_level_text, render_level_text, LevelErrorCode, LevelParseError, ParsedLevel,
};
pub use sources::{
    discover_obstacles, AttemptOutcome, CaptureFile, Discovered, DiscoveryError, LevelTextFile,
    ObstacleSource, SourceAttempt, SourceError, StaticSource,
};
