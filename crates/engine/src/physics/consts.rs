pub const FRAME_DT: f32 = 1.0 / 60.0;
pub const PLAYER_SPEED: f32 = 220.0;
pub const GRAVITY: f32 = -1600.0;
pub const JUMP_VELOCITY: f32 = 680.0;

pub const LANDING_EPSILON: f32 = 1e-3;

/// Vertical position an agent is forced to when it touches a spike.
pub const DEATH_SENTINEL_Y: f32 = -999_999.0;
/// Anything strictly below this is dead.
pub const DEATH_THRESHOLD_Y: f32 = -1_000.0;

pub const JUMP_PAD_HEIGHT: f32 = 16.0;

const _: () = assert!(DEATH_SENTINEL_Y < DEATH_THRESHOLD_Y);
