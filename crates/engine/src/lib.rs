use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod artifacts;
pub mod content;
pub mod physics;
pub mod planning;
mod run;

pub use artifacts::{
    course_fingerprint, parse_macro_text, render_macro_text, write_macro, write_report,
    ArtifactError, MacroParseError, RunReport,
};
pub use content::{
    discover_obstacles, parse_capture_json, parse_level_text, render_level_text, AttemptOutcome,
    CaptureFile, CaptureParseError, Discovered, DiscoveryError, LevelErrorCode, LevelParseError,
    LevelTextFile, ObstacleRecord, ObstacleSource, SourceAttempt, SourceError, StaticSource,
};
pub use physics::{is_dead, step, AgentState, GeometryError, Obstacle, ObstacleKind, Rect};
pub use planning::{
    plan, replay, Course, JumpSchedule, Plan, PlanDiagnostics, PlanError, PlanFailure,
    PlannerConfig, ReplayOutcome, ReplayStatus, ScheduleError,
};
pub use run::{
    prepare, run, verify, FailureKind, GoalX, PreparedRun, RunDiagnostics, RunFailure, RunOutcome,
};

pub const DIR_ENV_VAR: &str = "JUMPPLAN_DIR";

pub const LEVEL_FILE_NAME: &str = "level.txt";
pub const CAPTURE_FILE_NAME: &str = "capture.json";
pub const MACRO_FILE_NAME: &str = "macro.txt";
pub const REPORT_FILE_NAME: &str = "pathfinder_report.json";

/// Files a run reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub dir: PathBuf,
    pub level_path: PathBuf,
    pub capture_path: PathBuf,
    pub macro_path: PathBuf,
    pub report_path: PathBuf,
}

impl RunPaths {
    pub fn in_dir(dir: PathBuf) -> Self {
        Self {
            level_path: dir.join(LEVEL_FILE_NAME),
            capture_path: dir.join(CAPTURE_FILE_NAME),
            macro_path: dir.join(MACRO_FILE_NAME),
            report_path: dir.join(REPORT_FILE_NAME),
            dir,
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error(
        "{env_var} is set but does not point to a directory: {path}\n\
Set it to the folder holding level.txt or capture.json, or pass --dir."
    )]
    InvalidEnvDir {
        path: PathBuf,
        env_var: &'static str,
    },
    #[error("run directory does not exist: {path}")]
    MissingDir { path: PathBuf },
}

/// Resolves the run directory from an explicit override, then
/// `JUMPPLAN_DIR`, then the current directory.
pub fn resolve_run_paths(explicit_dir: Option<PathBuf>) -> Result<RunPaths, StartupError> {
    let dir = match explicit_dir {
        Some(dir) => {
            if !dir.is_dir() {
                return Err(StartupError::MissingDir { path: dir });
            }
            normalize_path(&dir)
        }
        None => resolve_dir_from_env()?,
    };
    Ok(RunPaths::in_dir(dir))
}

fn resolve_dir_from_env() -> Result<PathBuf, StartupError> {
    match env::var(DIR_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(Path::new(&value));
            if normalized.is_dir() {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvDir {
                    path: normalized,
                    env_var: DIR_ENV_VAR,
                })
            }
        }
        Err(env::VarError::NotPresent) => env::current_dir().map_err(StartupError::CurrentDir),
        Err(source) => Err(StartupError::EnvVar {
            var: DIR_ENV_VAR,
            source,
        }),
    }
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn run_paths_live_in_the_run_dir() {
        let paths = RunPaths::in_dir(PathBuf::from("runs"));
        assert_eq!(paths.level_path, Path::new("runs").join("level.txt"));
        assert_eq!(paths.capture_path, Path::new("runs").join("capture.json"));
        assert_eq!(paths.macro_path, Path::new("runs").join("macro.txt"));
        assert_eq!(
            paths.report_path,
            Path::new("runs").join("pathfinder_report.json")
        );
    }

    #[test]
    fn explicit_dir_must_exist() {
        let temp = TempDir::new().expect("temp");
        let missing = temp.path().join("definitely_not_a_dir");
        let err = resolve_run_paths(Some(missing.clone())).expect_err("missing dir");
        assert!(matches!(err, StartupError::MissingDir { path } if path == missing));
    }

    #[test]
    fn explicit_dir_is_used_as_is() {
        let temp = TempDir::new().expect("temp");
        let paths = resolve_run_paths(Some(temp.path().to_path_buf())).expect("paths");
        assert_eq!(paths.dir, normalize_path(temp.path()));
    }
}
