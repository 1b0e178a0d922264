use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::AtomicBool;

use jumpplan_engine::{
    parse_macro_text, resolve_run_paths, run, verify, write_macro, write_report, CaptureFile,
    GoalX, LevelTextFile, ObstacleSource, ReplayStatus, RunPaths, RunReport,
};
use tracing::{error, info, warn};

use crate::RunOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Succeeded,
    Failed,
}

/// Plans (or replays) against the configured sources and writes the run
/// artifacts. `Err` is reserved for setup and I/O problems; a run that ends
/// without a plan is `Ok(RunStatus::Failed)`.
pub fn execute(
    options: &RunOptions,
    stop: &AtomicBool,
    out: &mut dyn Write,
) -> Result<RunStatus, String> {
    let paths = resolve_run_paths(options.dir.clone()).map_err(|err| err.to_string())?;
    let capture = CaptureFile::new(
        options
            .capture
            .clone()
            .unwrap_or_else(|| paths.capture_path.clone()),
    );
    let level = LevelTextFile::new(
        options
            .level
            .clone()
            .unwrap_or_else(|| paths.level_path.clone()),
    );
    let sources: [&dyn ObstacleSource; 2] = [&capture, &level];
    let goal = options.goal_x.map_or(GoalX::Auto, GoalX::Explicit);

    info!(dir = %paths.dir.display(), "run_started");

    match &options.replay {
        Some(macro_path) => replay_schedule(options, &sources, goal, macro_path, out),
        None => plan_schedule(options, &paths, &sources, goal, stop, out),
    }
}

fn plan_schedule(
    options: &RunOptions,
    paths: &RunPaths,
    sources: &[&dyn ObstacleSource],
    goal: GoalX,
    stop: &AtomicBool,
    out: &mut dyn Write,
) -> Result<RunStatus, String> {
    let result = run(sources, goal, &options.planner, stop);

    write_report(&paths.report_path, &RunReport::from_result(&result))
        .map_err(|err| err.to_string())?;
    info!(path = %paths.report_path.display(), "report_written");

    match result {
        Ok(outcome) => {
            write_macro(&paths.macro_path, &outcome.schedule).map_err(|err| err.to_string())?;
            info!(
                path = %paths.macro_path.display(),
                jumps = outcome.schedule.len(),
                "macro_written"
            );
            if options.print {
                for frame in outcome.schedule.frames() {
                    writeln!(out, "{frame}").map_err(|err| err.to_string())?;
                }
            }
            Ok(RunStatus::Succeeded)
        }
        Err(failure) => {
            remove_stale_macro(&paths.macro_path)?;
            error!(
                kind = failure.kind.code(),
                error = %failure,
                report = %paths.report_path.display(),
                "run_failed"
            );
            Ok(RunStatus::Failed)
        }
    }
}

/// A schedule from an earlier run must not outlive a failed report.
fn remove_stale_macro(path: &Path) -> Result<(), String> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), "stale_macro_removed");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(format!("failed to remove {}: {err}", path.display())),
    }
}

fn replay_schedule(
    options: &RunOptions,
    sources: &[&dyn ObstacleSource],
    goal: GoalX,
    macro_path: &Path,
    out: &mut dyn Write,
) -> Result<RunStatus, String> {
    let raw = fs::read_to_string(macro_path)
        .map_err(|err| format!("failed to read {}: {err}", macro_path.display()))?;
    let schedule =
        parse_macro_text(&raw).map_err(|err| format!("{}: {err}", macro_path.display()))?;

    let outcome = match verify(sources, goal, &schedule, options.planner.max_frames) {
        Ok(outcome) => outcome,
        Err(failure) => {
            error!(kind = failure.kind.code(), error = %failure, "replay_failed");
            return Ok(RunStatus::Failed);
        }
    };

    let status = match outcome.status {
        ReplayStatus::ReachedGoal => "reached_goal",
        ReplayStatus::Died => "died",
        ReplayStatus::OutOfFrames => "out_of_frames",
    };
    writeln!(
        out,
        "{status} after {} frames at x={}",
        outcome.frames, outcome.final_state.px
    )
    .map_err(|err| err.to_string())?;

    if outcome.status == ReplayStatus::ReachedGoal {
        Ok(RunStatus::Succeeded)
    } else {
        warn!(status, frames = outcome.frames, "replay_missed_goal");
        Ok(RunStatus::Failed)
    }
}
