//! Breakout NEAT - lockstep breakout sessions for scoring paddle controllers
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, session tick)
//! - `batch`: Batch driver stepping every live session once per frame
//! - `trainer`: Generation loop driving a population until a fitness target
//! - `champions`: Per-generation champions, ranked by fitness
//! - `policy`: Reference controller and population
//! - `settings`: Run configuration

pub mod batch;
pub mod champions;
pub mod policy;
pub mod settings;
pub mod sim;
pub mod trainer;

pub use batch::{BatchDriver, BatchEnd, BatchReport, Candidate, SessionView, evaluate_batch};
pub use champions::Champions;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Play area dimensions
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 96.0;
    pub const PADDLE_HEIGHT: f32 = 24.0;
    pub const PADDLE_SPEED: f32 = 8.0;
    /// Velocity retained per tick while the control signal sits in the dead zone
    pub const PADDLE_DECAY: f32 = 0.85;
    /// Control signal magnitude needed to drive the paddle
    pub const CONTROL_THRESHOLD: f64 = 1.0 / 3.0;
    /// Paddle start position (top-left)
    pub const PADDLE_START_X: f32 = SCREEN_WIDTH / 2.0 - PADDLE_WIDTH / 2.0;
    pub const PADDLE_START_Y: f32 = SCREEN_HEIGHT * 5.0 / 6.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    /// Per-axis speed; the ball moves 10 px/tick along a diagonal
    pub const BALL_SPEED: f32 = 10.0 * std::f32::consts::FRAC_1_SQRT_2;
    /// Respawn point
    pub const BALL_SPAWN_X: f32 = SCREEN_WIDTH / 2.0 - BALL_RADIUS / 2.0;
    pub const BALL_SPAWN_Y: f32 = SCREEN_HEIGHT * 3.0 / 4.0;

    /// Obstacle defaults
    pub const OBSTACLE_WIDTH: f32 = 64.0;
    pub const OBSTACLE_HEIGHT: f32 = 24.0;
    pub const OBSTACLE_ROWS: usize = 6;
    pub const OBSTACLE_COLUMNS: usize = 10;
    /// Grid origin and pitch
    pub const OBSTACLE_ORIGIN_X: f32 = 60.0;
    pub const OBSTACLE_PITCH_X: f32 = 69.0;
    pub const OBSTACLE_PITCH_Y: f32 = 36.0;
    /// Rows start this many pitches below the ceiling
    pub const OBSTACLE_ROW_OFFSET: usize = 2;

    /// Fitness deltas
    pub const FITNESS_PADDLE_HIT: f64 = 2.0;
    pub const FITNESS_OBSTACLE: f64 = 1.0;
    pub const FITNESS_FALL: f64 = -5.0;

    /// Champion fitness at which training stops
    pub const FITNESS_THRESHOLD: f64 = 45.0;
}
