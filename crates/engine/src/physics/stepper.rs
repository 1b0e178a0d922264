use super::consts::{
    DEATH_SENTINEL_Y, DEATH_THRESHOLD_Y, FRAME_DT, GRAVITY, JUMP_VELOCITY, LANDING_EPSILON,
    PLAYER_SPEED,
};
use super::obstacle::{Obstacle, ObstacleKind};
use super::state::AgentState;

/// Advances `state` by one fixed timestep.
///
/// Total and deterministic: death is encoded by forcing `py` to
/// [`DEATH_SENTINEL_Y`], never by an error. The order of the phases below is
/// part of the contract: jump, integrate, land, jump pads, spikes.
pub fn step(state: &AgentState, jump_requested: bool, obstacles: &[Obstacle]) -> AgentState {
    let mut next = *state;

    // Airborne requests are dropped; there is no double jump.
    if jump_requested && next.on_ground {
        next.vy = JUMP_VELOCITY;
        next.on_ground = false;
    }

    next.vx = PLAYER_SPEED;
    next.px += PLAYER_SPEED * FRAME_DT;
    next.vy += GRAVITY * FRAME_DT;
    next.py += next.vy * FRAME_DT;

    match landing_surface(state.py, &next, obstacles) {
        Some(top) => {
            next.py = top;
            next.vy = 0.0;
            next.on_ground = true;
        }
        None => next.on_ground = false,
    }

    for pad in obstacles
        .iter()
        .filter(|obstacle| obstacle.kind == ObstacleKind::JumpPad)
    {
        if pad.rect.contains(next.px, next.py) {
            next.vy = match pad.power {
                Some(power) if power > 0.0 => power,
                _ => JUMP_VELOCITY,
            };
            next.on_ground = false;
        }
    }

    let touched_spike = obstacles.iter().any(|obstacle| {
        obstacle.kind == ObstacleKind::Spike && obstacle.rect.contains(next.px, next.py)
    });
    if touched_spike {
        next.py = DEATH_SENTINEL_Y;
        next.on_ground = false;
    }

    next
}

pub fn is_dead(state: &AgentState) -> bool {
    state.py < DEATH_THRESHOLD_Y
}

/// Highest platform top crossed downward between `previous_py` and `next.py`
/// at the new horizontal position.
fn landing_surface(previous_py: f32, next: &AgentState, obstacles: &[Obstacle]) -> Option<f32> {
    let mut best_top: Option<f32> = None;
    for platform in obstacles.iter().filter(|obstacle| obstacle.is_platform()) {
        if !platform.rect.spans_x(next.px) {
            continue;
        }
        let top = platform.rect.top();
        let crossed = previous_py >= top - LANDING_EPSILON && next.py <= top + LANDING_EPSILON;
        if crossed && best_top.map_or(true, |best| top > best) {
            best_top = Some(top);
        }
    }
    best_top
}
