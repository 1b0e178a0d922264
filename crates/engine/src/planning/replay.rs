use serde::Serialize;

use crate::physics::{is_dead, step, AgentState};

use super::course::Course;
use super::schedule::JumpSchedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayStatus {
    ReachedGoal,
    Died,
    OutOfFrames,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReplayOutcome {
    pub status: ReplayStatus,
    pub frames: u32,
    pub final_state: AgentState,
}

/// Re-runs `schedule` against the stepper, asserting a jump on exactly the
/// scheduled frames, until the goal is reached, the agent dies, or
/// `max_frames` steps have been taken.
pub fn replay(
    course: &Course,
    start: AgentState,
    schedule: &JumpSchedule,
    goal_x: f32,
    max_frames: u32,
) -> ReplayOutcome {
    let mut state = start;
    let mut frame = 0u32;
    let status = loop {
        if state.px >= goal_x {
            break ReplayStatus::ReachedGoal;
        }
        if is_dead(&state) {
            break ReplayStatus::Died;
        }
        if frame >= max_frames {
            break ReplayStatus::OutOfFrames;
        }
        state = step(&state, schedule.contains(frame), course.simulated_obstacles());
        frame += 1;
    };
    ReplayOutcome {
        status,
        frames: frame,
        final_state: state,
    }
}
