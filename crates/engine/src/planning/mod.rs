mod course;
mod pathfinder;
mod replay;
mod schedule;

pub use course::{
    Course, DEFAULT_COURSE_WIDTH, IMPLICIT_GROUND_HALF_SPAN, START_ABOVE_GROUND, START_BEFORE_X,
};
pub use pathfinder::{
    plan, Plan, PlanDiagnostics, PlanError, PlanFailure, PlannerConfig, LOOKAHEAD_FRAMES,
    MAX_JUMP_DELAY_FRAMES, MAX_SIM_FRAMES,
};
pub use replay::{replay, ReplayOutcome, ReplayStatus};
pub use schedule::{JumpSchedule, ScheduleError};
