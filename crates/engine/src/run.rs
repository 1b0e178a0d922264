use std::sync::atomic::AtomicBool;

use thiserror::Error;
use tracing::{info, warn};

use crate::artifacts::course_fingerprint;
use crate::content::{
    discover_obstacles, render_level_text, DiscoveryError, ObstacleSource, SourceAttempt,
};
use crate::physics::{AgentState, Obstacle};
use crate::planning::{
    plan, replay, Course, JumpSchedule, PlanDiagnostics, PlanError, PlannerConfig, ReplayOutcome,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GoalX {
    /// Far edge of the last platform (see [`Course::auto_goal_x`]).
    Auto,
    Explicit(f32),
}

/// Everything known about a run at the point it finished.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunDiagnostics {
    pub source: Option<String>,
    pub source_attempts: Vec<SourceAttempt>,
    pub goal_x: Option<f32>,
    pub start: Option<AgentState>,
    pub obstacles: Vec<Obstacle>,
    pub course_fingerprint: Option<String>,
    pub plan: Option<PlanDiagnostics>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    #[error("no obstacle source produced data")]
    SourceUnavailable,
    #[error("obstacle source '{source_name}' is malformed at line {line}: {message} ('{content}')")]
    MalformedSource {
        source_name: String,
        line: usize,
        content: String,
        message: String,
    },
    #[error("no safe jump within the delay bound at frame {frame}")]
    Unsolvable { frame: u32 },
    #[error("frame cap of {max_frames} reached before the goal")]
    FrameCapExceeded { max_frames: u32 },
    #[error("run cancelled at frame {frame}")]
    Cancelled { frame: u32 },
}

impl FailureKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::SourceUnavailable => "source_unavailable",
            Self::MalformedSource { .. } => "malformed_source",
            Self::Unsolvable { .. } => "unsolvable",
            Self::FrameCapExceeded { .. } => "frame_cap_exceeded",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}

impl From<PlanError> for FailureKind {
    fn from(error: PlanError) -> Self {
        match error {
            PlanError::Unsolvable { frame } => Self::Unsolvable { frame },
            PlanError::FrameCapExceeded { max_frames } => Self::FrameCapExceeded { max_frames },
            PlanError::Cancelled { frame } => Self::Cancelled { frame },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct RunFailure {
    pub kind: FailureKind,
    pub diagnostics: RunDiagnostics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub schedule: JumpSchedule,
    pub diagnostics: RunDiagnostics,
}

/// Course with its derived start and goal, ready to plan or replay against.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRun {
    pub course: Course,
    pub start: AgentState,
    pub goal_x: f32,
    pub diagnostics: RunDiagnostics,
}

/// Discovers obstacles and derives the start state and goal.
pub fn prepare(sources: &[&dyn ObstacleSource], goal: GoalX) -> Result<PreparedRun, RunFailure> {
    let mut diagnostics = RunDiagnostics::default();

    let discovered = match discover_obstacles(sources) {
        Ok(discovered) => discovered,
        Err(error) => {
            diagnostics.source_attempts = error.attempts().to_vec();
            let kind = match error {
                DiscoveryError::Unavailable { .. } => FailureKind::SourceUnavailable,
                DiscoveryError::Malformed {
                    source_name,
                    line,
                    content,
                    message,
                    ..
                } => FailureKind::MalformedSource {
                    source_name,
                    line,
                    content,
                    message,
                },
            };
            warn!(reason = kind.code(), "obstacle_discovery_failed");
            return Err(RunFailure { kind, diagnostics });
        }
    };

    diagnostics.source = Some(discovered.source.clone());
    diagnostics.source_attempts = discovered.attempts;

    // Sources without their own parser (static lists) are checked here; the
    // line is the 1-based position in the obstacle list.
    for (index, obstacle) in discovered.obstacles.iter().enumerate() {
        if let Err(error) = obstacle.validate() {
            let kind = FailureKind::MalformedSource {
                source_name: discovered.source,
                line: index + 1,
                content: render_level_text(std::slice::from_ref(obstacle))
                    .trim_end()
                    .to_string(),
                message: error.to_string(),
            };
            warn!(reason = kind.code(), line = index + 1, "course_geometry_rejected");
            return Err(RunFailure { kind, diagnostics });
        }
    }

    let course = Course::new(discovered.obstacles);
    let goal_x = match goal {
        GoalX::Auto => course.auto_goal_x(),
        GoalX::Explicit(goal_x) => goal_x,
    };
    let start = course.start_state();
    diagnostics.goal_x = Some(goal_x);
    diagnostics.start = Some(start);
    diagnostics.obstacles = course.obstacles().to_vec();
    diagnostics.course_fingerprint = Some(course_fingerprint(course.obstacles()));

    info!(
        obstacle_count = course.len(),
        implicit_ground = course.has_implicit_ground(),
        goal_x,
        start_x = start.px,
        start_y = start.py,
        "course_ready"
    );

    Ok(PreparedRun {
        course,
        start,
        goal_x,
        diagnostics,
    })
}

/// Discovers obstacles, derives start and goal, and plans a jump schedule.
///
/// Every failure is terminal for the run and carries the diagnostics gathered
/// up to that point.
pub fn run(
    sources: &[&dyn ObstacleSource],
    goal: GoalX,
    config: &PlannerConfig,
    stop: &AtomicBool,
) -> Result<RunOutcome, RunFailure> {
    let prepared = prepare(sources, goal)?;
    let mut diagnostics = prepared.diagnostics;

    match plan(&prepared.course, prepared.start, prepared.goal_x, config, stop) {
        Ok(found) => {
            info!(
                jumps = found.schedule.len(),
                frames = found.diagnostics.frames_simulated,
                stepper_calls = found.diagnostics.stepper_calls,
                "plan_found"
            );
            diagnostics.plan = Some(found.diagnostics);
            Ok(RunOutcome {
                schedule: found.schedule,
                diagnostics,
            })
        }
        Err(failure) => {
            diagnostics.plan = Some(failure.diagnostics);
            Err(RunFailure {
                kind: failure.error.into(),
                diagnostics,
            })
        }
    }
}

/// Replays an existing schedule against a freshly discovered course.
pub fn verify(
    sources: &[&dyn ObstacleSource],
    goal: GoalX,
    schedule: &JumpSchedule,
    max_frames: u32,
) -> Result<ReplayOutcome, RunFailure> {
    let prepared = prepare(sources, goal)?;
    let outcome = replay(
        &prepared.course,
        prepared.start,
        schedule,
        prepared.goal_x,
        max_frames,
    );
    info!(
        status = ?outcome.status,
        frames = outcome.frames,
        final_x = outcome.final_state.px,
        "schedule_replayed"
    );
    Ok(outcome)
}
