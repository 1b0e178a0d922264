use crate::physics::{AgentState, Obstacle};

pub const IMPLICIT_GROUND_HALF_SPAN: f32 = 1.0e7;
const IMPLICIT_GROUND_DEPTH: f32 = 16.0;

pub const START_BEFORE_X: f32 = 16.0;
pub const START_ABOVE_GROUND: f32 = 12.0;
pub const DEFAULT_COURSE_WIDTH: f32 = 1200.0;

/// Immutable obstacle set for a single planning run. A course without any
/// platform gets an implicit ground at Y = 0 that is simulated but not declared.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    declared_len: usize,
    simulated: Vec<Obstacle>,
}

impl Course {
    pub fn new(obstacles: Vec<Obstacle>) -> Self {
        let declared_len = obstacles.len();
        let mut simulated = obstacles;
        if !simulated.iter().any(Obstacle::is_platform) {
            simulated.push(Obstacle::platform(
                -IMPLICIT_GROUND_HALF_SPAN,
                -IMPLICIT_GROUND_DEPTH,
                2.0 * IMPLICIT_GROUND_HALF_SPAN,
                IMPLICIT_GROUND_DEPTH,
            ));
        }
        Self {
            declared_len,
            simulated,
        }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.simulated[..self.declared_len]
    }

    /// Obstacles handed to the stepper, including any implicit ground.
    pub fn simulated_obstacles(&self) -> &[Obstacle] {
        &self.simulated
    }

    pub fn has_implicit_ground(&self) -> bool {
        self.simulated.len() > self.declared_len
    }

    pub fn len(&self) -> usize {
        self.declared_len
    }

    pub fn is_empty(&self) -> bool {
        self.declared_len == 0
    }

    /// Far edge of the last solid ground, falling back to the far edge of any
    /// obstacle, then to a default course width.
    pub fn auto_goal_x(&self) -> f32 {
        let platforms = self.obstacles().iter().filter(|o| o.is_platform());
        max_of(platforms.map(|o| o.rect.right()))
            .or_else(|| max_of(self.obstacles().iter().map(|o| o.rect.right())))
            .unwrap_or(self.min_x() + DEFAULT_COURSE_WIDTH)
    }

    /// Grounded start a fixed offset left of the first obstacle and slightly
    /// above the highest platform top.
    pub fn start_state(&self) -> AgentState {
        AgentState::grounded_at(
            self.min_x() - START_BEFORE_X,
            self.ground_y() + START_ABOVE_GROUND,
        )
    }

    fn min_x(&self) -> f32 {
        self.obstacles()
            .iter()
            .map(|o| o.rect.left())
            .reduce(f32::min)
            .unwrap_or(0.0)
    }

    fn ground_y(&self) -> f32 {
        let platforms = self.obstacles().iter().filter(|o| o.is_platform());
        max_of(platforms.map(|o| o.rect.top())).unwrap_or(0.0)
    }
}

fn max_of(values: impl Iterator<Item = f32>) -> Option<f32> {
    values.reduce(f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{step, ObstacleKind};

    #[test]
    fn empty_course_gets_implicit_ground_at_zero() {
        let course = Course::new(Vec::new());
        assert!(course.is_empty());
        assert!(course.has_implicit_ground());
        assert!(course.obstacles().is_empty());
        let ground = course.simulated_obstacles()[0];
        assert_eq!(ground.kind, ObstacleKind::Platform);
        assert_eq!(ground.rect.top(), 0.0);
    }

    #[test]
    fn declared_platforms_suppress_implicit_ground() {
        let course = Course::new(vec![Obstacle::platform(0.0, 0.0, 100.0, 10.0)]);
        assert!(!course.has_implicit_ground());
        assert_eq!(course.simulated_obstacles().len(), 1);
    }

    #[test]
    fn spike_only_course_still_has_ground() {
        let course = Course::new(vec![Obstacle::spike(50.0, 0.0, 10.0, 10.0)]);
        assert!(course.has_implicit_ground());
        assert_eq!(course.len(), 1);
        assert_eq!(course.obstacles()[0].kind, ObstacleKind::Spike);
    }

    #[test]
    fn auto_goal_uses_far_platform_edge() {
        let course = Course::new(vec![
            Obstacle::platform(0.0, 0.0, 500.0, 20.0),
            Obstacle::platform(600.0, 0.0, 300.0, 20.0),
            Obstacle::spike(950.0, 20.0, 100.0, 20.0),
        ]);
        assert_eq!(course.auto_goal_x(), 900.0);
    }

    #[test]
    fn auto_goal_falls_back_to_any_obstacle_then_default_width() {
        let spikes = Course::new(vec![Obstacle::spike(100.0, 0.0, 20.0, 10.0)]);
        assert_eq!(spikes.auto_goal_x(), 120.0);
        assert_eq!(Course::new(Vec::new()).auto_goal_x(), DEFAULT_COURSE_WIDTH);
    }

    #[test]
    fn start_sits_before_first_obstacle_above_highest_platform() {
        let course = Course::new(vec![
            Obstacle::platform(40.0, 0.0, 500.0, 20.0),
            Obstacle::platform(100.0, 0.0, 50.0, 35.0),
        ]);
        let start = course.start_state();
        assert_eq!(start.px, 40.0 - START_BEFORE_X);
        assert_eq!(start.py, 35.0 + START_ABOVE_GROUND);
        assert!(start.on_ground);
        assert_eq!(start.vy, 0.0);
    }

    #[test]
    fn empty_course_start_lands_on_implicit_ground() {
        let course = Course::new(Vec::new());
        let mut state = course.start_state();
        for _ in 0..30 {
            state = step(&state, false, course.simulated_obstacles());
        }
        assert!(state.on_ground);
        assert_eq!(state.py, 0.0);
    }
}
