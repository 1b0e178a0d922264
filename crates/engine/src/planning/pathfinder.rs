use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::physics::{is_dead, step, AgentState};

use super::course::Course;
use super::schedule::JumpSchedule;

/// Frames simulated without jumping to decide whether a state is safe.
pub const LOOKAHEAD_FRAMES: u32 = 36;
/// Largest delay tried when an immediate jump is unsafe.
pub const MAX_JUMP_DELAY_FRAMES: u32 = 8;
/// Safety cap on real frames (five minutes at 60 Hz).
pub const MAX_SIM_FRAMES: u32 = 60 * 300;

const PROGRESS_LOG_INTERVAL_FRAMES: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    pub lookahead_frames: u32,
    pub max_delay_frames: u32,
    pub max_frames: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            lookahead_frames: LOOKAHEAD_FRAMES,
            max_delay_frames: MAX_JUMP_DELAY_FRAMES,
            max_frames: MAX_SIM_FRAMES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanDiagnostics {
    pub goal_x: f32,
    pub obstacle_count: usize,
    pub frames_simulated: u32,
    pub stepper_calls: u64,
    pub jumps_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_frame: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_reason: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub schedule: JumpSchedule,
    pub diagnostics: PlanDiagnostics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("no safe jump within the delay bound at frame {frame}")]
    Unsolvable { frame: u32 },
    #[error("frame cap of {max_frames} reached before the goal")]
    FrameCapExceeded { max_frames: u32 },
    #[error("planning stopped by request at frame {frame}")]
    Cancelled { frame: u32 },
}

impl PlanError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Unsolvable { .. } => "no_safe_jump",
            Self::FrameCapExceeded { .. } => "max_frames_exceeded",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}

/// Failed plan. No partial schedule is ever returned.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}")]
pub struct PlanFailure {
    pub error: PlanError,
    pub diagnostics: PlanDiagnostics,
}

/// Outcome of one frame's decision procedure.
enum Decision {
    Coast(AgentState),
    Jump { delay: u32, after: AgentState },
    NoSafeJump,
}

struct Pathfinder<'a> {
    course: &'a Course,
    config: &'a PlannerConfig,
    stepper_calls: u64,
}

impl<'a> Pathfinder<'a> {
    fn advance(&mut self, state: &AgentState, jump: bool) -> AgentState {
        self.stepper_calls = self.stepper_calls.saturating_add(1);
        step(state, jump, self.course.simulated_obstacles())
    }

    fn survives_lookahead(&mut self, from: &AgentState) -> bool {
        let mut probe = *from;
        for _ in 0..self.config.lookahead_frames {
            probe = self.advance(&probe, false);
            if is_dead(&probe) {
                return false;
            }
        }
        true
    }

    fn decide(&mut self, state: &AgentState) -> Decision {
        if self.survives_lookahead(state) {
            return Decision::Coast(self.advance(state, false));
        }

        if state.on_ground {
            let after = self.advance(state, true);
            if self.survives_lookahead(&after) {
                return Decision::Jump { delay: 0, after };
            }
        }

        for delay in 1..=self.config.max_delay_frames {
            let mut trial = *state;
            for _ in 0..delay {
                trial = self.advance(&trial, false);
            }
            if !trial.on_ground {
                continue;
            }
            let after = self.advance(&trial, true);
            if self.survives_lookahead(&after) {
                return Decision::Jump { delay, after };
            }
        }

        Decision::NoSafeJump
    }
}

/// Greedy frame-by-frame jump search from `start` until `px >= goal_x`.
///
/// `stop` is polled once per real frame, never inside a lookahead.
pub fn plan(
    course: &Course,
    start: AgentState,
    goal_x: f32,
    config: &PlannerConfig,
    stop: &AtomicBool,
) -> Result<Plan, PlanFailure> {
    let mut finder = Pathfinder {
        course,
        config,
        stepper_calls: 0,
    };
    let mut schedule = JumpSchedule::new();
    let mut state = start;
    // Counts stepper calls applied to the authoritative state, so every
    // recorded frame replays exactly.
    let mut frame = 0u32;
    let mut next_progress_frame = PROGRESS_LOG_INTERVAL_FRAMES;

    let outcome = loop {
        if state.px >= goal_x {
            break Ok(());
        }
        if frame >= config.max_frames {
            break Err(PlanError::FrameCapExceeded {
                max_frames: config.max_frames,
            });
        }
        if stop.load(Ordering::Relaxed) {
            break Err(PlanError::Cancelled { frame });
        }

        match finder.decide(&state) {
            Decision::Coast(next) => {
                state = next;
                frame += 1;
            }
            Decision::Jump { delay, after } => {
                let jump_frame = frame + delay;
                if jump_frame >= config.max_frames {
                    break Err(PlanError::FrameCapExceeded {
                        max_frames: config.max_frames,
                    });
                }
                debug!(frame = jump_frame, delay, px = state.px, "jump_committed");
                schedule.push(jump_frame);
                state = after;
                frame = jump_frame + 1;
            }
            Decision::NoSafeJump => break Err(PlanError::Unsolvable { frame }),
        }

        if frame >= next_progress_frame {
            next_progress_frame = frame + PROGRESS_LOG_INTERVAL_FRAMES;
            debug!(
                frame,
                px = state.px,
                progress_pct = progress_percent(state.px, goal_x),
                "plan_progress"
            );
        }
    };

    let mut diagnostics = PlanDiagnostics {
        goal_x,
        obstacle_count: course.len(),
        frames_simulated: frame,
        stepper_calls: finder.stepper_calls,
        jumps_count: schedule.len(),
        failed_frame: None,
        failed_reason: None,
    };

    match outcome {
        Ok(()) => Ok(Plan {
            schedule,
            diagnostics,
        }),
        Err(error) => {
            if let PlanError::Unsolvable { frame } | PlanError::Cancelled { frame } = error {
                diagnostics.failed_frame = Some(frame);
            }
            diagnostics.failed_reason = Some(error.reason_code());
            diagnostics.jumps_count = 0;
            warn!(
                reason = error.reason_code(),
                frame,
                px = state.px,
                goal_x,
                "plan_failed"
            );
            Err(PlanFailure { error, diagnostics })
        }
    }
}

fn progress_percent(px: f32, goal_x: f32) -> f32 {
    if goal_x <= 0.0 {
        return 100.0;
    }
    (px / goal_x * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::consts::{FRAME_DT, PLAYER_SPEED};
    use crate::physics::Obstacle;
    use crate::planning::replay::{replay, ReplayStatus};

    fn never_stop() -> AtomicBool {
        AtomicBool::new(false)
    }

    fn ground() -> Obstacle {
        Obstacle::platform(0.0, 0.0, 1_000.0, 20.0)
    }

    fn spike_course() -> Course {
        Course::new(vec![ground(), Obstacle::spike(400.0, 20.0, 30.0, 30.0)])
    }

    fn start() -> AgentState {
        AgentState::grounded_at(50.0, 20.0)
    }

    fn run_plan(course: &Course, goal_x: f32) -> Result<Plan, PlanFailure> {
        plan(course, start(), goal_x, &PlannerConfig::default(), &never_stop())
    }

    #[test]
    fn flat_course_needs_no_jumps() {
        let course = Course::new(vec![ground()]);
        let plan = run_plan(&course, 900.0).expect("plan");
        assert!(plan.schedule.is_empty());
        assert!(plan.diagnostics.failed_reason.is_none());
        assert!(plan.diagnostics.frames_simulated > 0);
    }

    #[test]
    fn goal_already_reached_returns_before_any_lookahead() {
        let course = spike_course();
        let plan = run_plan(&course, 50.0).expect("plan");
        assert!(plan.schedule.is_empty());
        assert_eq!(plan.diagnostics.frames_simulated, 0);
        assert_eq!(plan.diagnostics.stepper_calls, 0);
    }

    #[test]
    fn single_spike_takes_exactly_one_jump() {
        let course = spike_course();
        let plan = run_plan(&course, 900.0).expect("plan");
        assert_eq!(plan.schedule.len(), 1);
        let latest_useful = ((400.0 - 50.0) / (PLAYER_SPEED * FRAME_DT)) as u32;
        assert!(plan.schedule.frames()[0] < latest_useful);

        let outcome = replay(&course, start(), &plan.schedule, 900.0, 10_000);
        assert_eq!(outcome.status, ReplayStatus::ReachedGoal);

        let without_spike = Course::new(vec![ground()]);
        let plan = run_plan(&without_spike, 900.0).expect("plan");
        assert!(plan.schedule.is_empty());
    }

    #[test]
    fn immediate_jump_into_overhang_falls_back_to_delay() {
        // Jumping at the first unsafe frame clips the hanging spike; one frame
        // later clears it.
        let course = Course::new(vec![
            ground(),
            Obstacle::spike(400.0, 20.0, 30.0, 30.0),
            Obstacle::spike(280.0, 60.0, 5.0, 240.0),
        ]);
        let plan = run_plan(&course, 900.0).expect("plan");
        assert_eq!(plan.schedule.frames(), &[61]);
        let outcome = replay(&course, start(), &plan.schedule, 900.0, 10_000);
        assert_eq!(outcome.status, ReplayStatus::ReachedGoal);
    }

    #[test]
    fn long_spike_bed_is_unsolvable_without_partial_schedule() {
        let course = Course::new(vec![ground(), Obstacle::spike(300.0, 20.0, 500.0, 30.0)]);
        let failure = run_plan(&course, 900.0).expect_err("unsolvable");
        let PlanError::Unsolvable { frame } = failure.error else {
            panic!("unexpected error: {:?}", failure.error);
        };
        assert_eq!(failure.diagnostics.failed_frame, Some(frame));
        assert_eq!(failure.diagnostics.failed_reason, Some("no_safe_jump"));
        assert_eq!(failure.diagnostics.jumps_count, 0);
    }

    #[test]
    fn higher_platform_wins_over_lower_one() {
        let course = Course::new(vec![
            Obstacle::platform(0.0, 0.0, 1_000.0, 20.0),
            Obstacle::platform(0.0, 0.0, 1_000.0, 40.0),
        ]);
        let mut state = AgentState {
            py: 60.0,
            on_ground: false,
            ..start()
        };
        for _ in 0..60 {
            state = step(&state, false, course.simulated_obstacles());
        }
        assert!(state.on_ground);
        assert_eq!(state.py, 40.0);
    }

    #[test]
    fn empty_course_succeeds_on_implicit_ground() {
        let course = Course::new(Vec::new());
        let plan = plan(
            &course,
            AgentState::grounded_at(0.0, 0.0),
            500.0,
            &PlannerConfig::default(),
            &never_stop(),
        )
        .expect("plan");
        assert!(plan.schedule.is_empty());
        assert_eq!(plan.diagnostics.obstacle_count, 0);
    }

    #[test]
    fn unreachable_goal_hits_the_frame_cap() {
        let config = PlannerConfig {
            max_frames: 600,
            ..PlannerConfig::default()
        };
        let goal_x = config.max_frames as f32 * PLAYER_SPEED * FRAME_DT + 100.0;
        let failure = plan(
            &Course::new(Vec::new()),
            AgentState::grounded_at(0.0, 0.0),
            goal_x,
            &config,
            &never_stop(),
        )
        .expect_err("cap");
        assert_eq!(
            failure.error,
            PlanError::FrameCapExceeded { max_frames: 600 }
        );
        assert_eq!(failure.diagnostics.failed_reason, Some("max_frames_exceeded"));
        assert_eq!(failure.diagnostics.failed_frame, None);
        assert_eq!(failure.diagnostics.frames_simulated, 600);
    }

    #[test]
    fn planning_is_deterministic() {
        let course = Course::new(vec![
            ground(),
            Obstacle::spike(300.0, 20.0, 20.0, 20.0),
            Obstacle::spike(600.0, 20.0, 25.0, 25.0),
            Obstacle::jump_pad(780.0, 20.0, 10.0, 16.0, None),
        ]);
        let first = run_plan(&course, 950.0);
        let second = run_plan(&course, 950.0);
        assert_eq!(first, second);
    }

    #[test]
    fn shorter_goal_uses_a_prefix_of_the_schedule() {
        let course = Course::new(vec![
            ground(),
            Obstacle::spike(300.0, 20.0, 20.0, 20.0),
            Obstacle::spike(600.0, 20.0, 25.0, 25.0),
        ]);
        let long = run_plan(&course, 950.0).expect("long plan");
        assert_eq!(long.schedule.len(), 2);
        for goal_x in [100.0, 350.0, 500.0, 700.0, 950.0] {
            let short = run_plan(&course, goal_x).expect("short plan");
            let prefix = &long.schedule.frames()[..short.schedule.len()];
            assert_eq!(short.schedule.frames(), prefix);
        }
    }

    #[test]
    fn stop_flag_cancels_between_frames() {
        let stop = AtomicBool::new(true);
        let failure = plan(
            &spike_course(),
            start(),
            900.0,
            &PlannerConfig::default(),
            &stop,
        )
        .expect_err("cancelled");
        assert_eq!(failure.error, PlanError::Cancelled { frame: 0 });
        assert_eq!(failure.diagnostics.failed_reason, Some("cancelled"));
    }

    #[test]
    fn zero_delay_bound_disables_delayed_jumps() {
        let course = Course::new(vec![
            ground(),
            Obstacle::spike(400.0, 20.0, 30.0, 30.0),
            Obstacle::spike(280.0, 60.0, 5.0, 240.0),
        ]);
        let config = PlannerConfig {
            max_delay_frames: 0,
            ..PlannerConfig::default()
        };
        let failure =
            plan(&course, start(), 900.0, &config, &never_stop()).expect_err("no delay");
        assert!(matches!(failure.error, PlanError::Unsolvable { frame: 60 }));
    }

    #[test]
    fn delayed_jump_past_the_cap_is_not_committed() {
        let course = Course::new(vec![
            ground(),
            Obstacle::spike(400.0, 20.0, 30.0, 30.0),
            Obstacle::spike(280.0, 60.0, 5.0, 240.0),
        ]);
        let config = PlannerConfig {
            max_frames: 61,
            ..PlannerConfig::default()
        };
        let failure = plan(&course, start(), 900.0, &config, &never_stop()).expect_err("cap");
        assert_eq!(failure.error, PlanError::FrameCapExceeded { max_frames: 61 });
        assert_eq!(failure.diagnostics.frames_simulated, 60);
        assert_eq!(failure.diagnostics.jumps_count, 0);

        let config = PlannerConfig {
            max_frames: 62,
            ..config
        };
        let failure = plan(&course, start(), 900.0, &config, &never_stop()).expect_err("cap");
        assert!(failure.diagnostics.frames_simulated <= 62);
    }

    #[test]
    fn progress_percent_is_clamped() {
        assert_eq!(progress_percent(50.0, 100.0), 50.0);
        assert_eq!(progress_percent(500.0, 100.0), 100.0);
        assert_eq!(progress_percent(-10.0, 100.0), 0.0);
    }
}
