//! Entity types and their per-tick motion rules
//!
//! Paddle, ball and obstacle are the only entity kinds; each one is a
//! `Bounded` rectangle for collision purposes.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Bounded, Rect};
use crate::consts::*;

/// The closed set of entity kinds that live in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Paddle,
    Ball,
    Obstacle,
}

/// Control signal after thresholding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    Left,
    Right,
    /// Dead zone: velocity decays toward rest
    Coast,
}

impl Steer {
    /// Threshold a raw controller output. Non-finite outputs coast.
    pub fn from_signal(signal: f64) -> Self {
        if !signal.is_finite() {
            Steer::Coast
        } else if signal >= CONTROL_THRESHOLD {
            Steer::Right
        } else if signal <= -CONTROL_THRESHOLD {
            Steer::Left
        } else {
            Steer::Coast
        }
    }
}

/// The agent-controlled paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    /// Top-left corner
    pub pos: Vec2,
    /// Horizontal velocity (px/tick)
    pub dx: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self::new(PADDLE_START_X, PADDLE_START_Y)
    }
}

impl Paddle {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            dx: 0.0,
        }
    }

    /// Apply a thresholded control signal to the velocity
    pub fn steer(&mut self, steer: Steer) {
        match steer {
            Steer::Right => self.dx = PADDLE_SPEED,
            Steer::Left => self.dx = -PADDLE_SPEED,
            Steer::Coast => self.dx *= PADDLE_DECAY,
        }
    }

    /// Move by `dx`, then clamp fully inside the screen
    pub fn update(&mut self) {
        self.pos.x = (self.pos.x + self.dx).clamp(0.0, SCREEN_WIDTH - PADDLE_WIDTH);
    }
}

impl Bounded for Paddle {
    fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, PADDLE_WIDTH, PADDLE_HEIGHT)
    }
}

/// The projectile. `pos` is the anchor used both as the wall-test center and
/// as the top-left corner of its collision square (side = radius).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Ball {
    /// Spawn at the respawn point with a random horizontal direction
    pub fn spawn(rng: &mut Pcg32) -> Self {
        let mut ball = Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
        };
        ball.respawn(rng);
        ball
    }

    /// Ball at an explicit position and velocity
    pub fn with_motion(pos: Vec2, vel: Vec2) -> Self {
        Self {
            pos,
            vel,
            radius: BALL_RADIUS,
        }
    }

    /// Reset to the spawn point heading upward, left or right at random
    pub fn respawn(&mut self, rng: &mut Pcg32) {
        self.pos = Vec2::new(BALL_SPAWN_X, BALL_SPAWN_Y);
        let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.vel = Vec2::new(direction * BALL_SPEED, -BALL_SPEED);
    }

    /// Integrate one tick and handle the screen edges.
    ///
    /// Returns true iff the ball fell past the bottom edge, in which case it
    /// has already been respawned.
    pub fn update(&mut self, rng: &mut Pcg32) -> bool {
        self.pos += self.vel;

        if self.pos.x - self.radius <= 0.0 || self.pos.x + self.radius >= SCREEN_WIDTH {
            self.vel.x = -self.vel.x;
        }

        if self.pos.y - self.radius <= 0.0 {
            // Ceiling hits resume downward at a fixed slow speed
            self.vel.y = self.radius;
        } else if self.pos.y + self.radius >= SCREEN_HEIGHT {
            self.respawn(rng);
            return true;
        }
        false
    }

    /// Vertical-only reflection used for paddle and obstacle bounces
    #[inline]
    pub fn bounce(&mut self) {
        self.vel.y = -self.vel.y;
    }
}

impl Bounded for Ball {
    fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.radius, self.radius)
    }
}

/// A static destructible target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub rect: Rect,
}

impl Obstacle {
    /// Obstacle of the default size
    pub fn new(x: f32, y: f32) -> Self {
        Self::with_size(x, y, OBSTACLE_WIDTH, OBSTACLE_HEIGHT)
    }

    pub fn with_size(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
        }
    }
}

impl Bounded for Obstacle {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

/// Build the starting obstacle field, row by row
pub fn obstacle_grid(rows: usize, columns: usize) -> Vec<Obstacle> {
    let mut obstacles = Vec::with_capacity(rows * columns);
    for row in 0..rows {
        let y = OBSTACLE_PITCH_Y * (row + OBSTACLE_ROW_OFFSET) as f32;
        for col in 0..columns {
            let x = OBSTACLE_ORIGIN_X + col as f32 * OBSTACLE_PITCH_X;
            obstacles.push(Obstacle::new(x, y));
        }
    }
    obstacles
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Derive the state for one session of a batch
    pub fn for_session(seed: u64, index: usize) -> Self {
        Self {
            seed,
            stream: index as u64,
        }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::new(self.seed, self.stream.wrapping_mul(2).wrapping_add(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_steer_thresholds() {
        assert_eq!(Steer::from_signal(1.0 / 3.0), Steer::Right);
        assert_eq!(Steer::from_signal(0.9), Steer::Right);
        assert_eq!(Steer::from_signal(-1.0 / 3.0), Steer::Left);
        assert_eq!(Steer::from_signal(0.0), Steer::Coast);
        assert_eq!(Steer::from_signal(0.3), Steer::Coast);
        assert_eq!(Steer::from_signal(f64::NAN), Steer::Coast);
    }

    #[test]
    fn test_non_finite_signal_coasts() {
        assert_eq!(Steer::from_signal(f64::INFINITY), Steer::Coast);
        assert_eq!(Steer::from_signal(f64::NEG_INFINITY), Steer::Coast);
    }

    #[test]
    fn test_coast_decays_velocity() {
        let mut paddle = Paddle::default();
        paddle.steer(Steer::Right);
        assert_eq!(paddle.dx, PADDLE_SPEED);
        paddle.steer(Steer::Coast);
        assert!((paddle.dx - PADDLE_SPEED * PADDLE_DECAY).abs() < 1e-6);
        paddle.steer(Steer::Left);
        assert_eq!(paddle.dx, -PADDLE_SPEED);
    }

    #[test]
    fn test_paddle_clamps_at_edges() {
        let mut paddle = Paddle::new(2.0, PADDLE_START_Y);
        paddle.steer(Steer::Left);
        paddle.update();
        assert_eq!(paddle.pos.x, 0.0);

        let mut paddle = Paddle::new(SCREEN_WIDTH - PADDLE_WIDTH - 1.0, PADDLE_START_Y);
        paddle.steer(Steer::Right);
        paddle.update();
        assert_eq!(paddle.pos.x, SCREEN_WIDTH - PADDLE_WIDTH);
    }

    #[test]
    fn test_ball_wall_reflects_dx() {
        let mut rng = RngState::new(1).to_rng();
        let mut ball = Ball::with_motion(Vec2::new(10.0, 300.0), Vec2::new(-3.0, 2.0));
        assert!(!ball.update(&mut rng));
        assert_eq!(ball.vel, Vec2::new(3.0, 2.0));
    }

    #[test]
    fn test_ball_ceiling_sets_fixed_downward_speed() {
        let mut rng = RngState::new(1).to_rng();
        let mut ball = Ball::with_motion(Vec2::new(400.0, 12.0), Vec2::new(4.0, -7.0));
        assert!(!ball.update(&mut rng));
        assert_eq!(ball.vel.y, BALL_RADIUS);
        assert_eq!(ball.vel.x, 4.0);
    }

    #[test]
    fn test_ball_falls_and_respawns() {
        let mut rng = RngState::new(7).to_rng();
        let mut ball = Ball::with_motion(Vec2::new(100.0, 590.0), Vec2::new(1.0, 5.0));
        assert!(ball.update(&mut rng));
        assert_eq!(ball.pos, Vec2::new(BALL_SPAWN_X, BALL_SPAWN_Y));
        assert_eq!(ball.vel.x.abs(), BALL_SPEED);
        assert_eq!(ball.vel.y, -BALL_SPEED);
    }

    #[test]
    fn test_respawn_direction_is_seeded() {
        let dirs = |seed| {
            let mut rng = RngState::new(seed).to_rng();
            (0..32)
                .map(|_| Ball::spawn(&mut rng).vel.x.signum())
                .collect::<Vec<_>>()
        };
        assert_eq!(dirs(42), dirs(42));
        let sample = dirs(42);
        assert!(sample.contains(&1.0) && sample.contains(&-1.0));
    }

    #[test]
    fn test_obstacle_grid_layout() {
        let grid = obstacle_grid(OBSTACLE_ROWS, OBSTACLE_COLUMNS);
        assert_eq!(grid.len(), 60);
        assert_eq!(grid[0].rect.min, Vec2::new(60.0, 72.0));
        assert_eq!(grid[9].rect.min, Vec2::new(60.0 + 9.0 * 69.0, 72.0));
        assert_eq!(grid[59].rect.min, Vec2::new(60.0 + 9.0 * 69.0, 36.0 * 7.0));
        assert_eq!(grid[0].rect.size, Vec2::new(OBSTACLE_WIDTH, OBSTACLE_HEIGHT));
    }

    proptest! {
        #[test]
        fn paddle_stays_on_screen(x in -2000.0f32..2000.0, dx in -500.0f32..500.0) {
            let mut paddle = Paddle::new(x, PADDLE_START_Y);
            paddle.dx = dx;
            paddle.update();
            prop_assert!(paddle.pos.x >= 0.0);
            prop_assert!(paddle.pos.x <= SCREEN_WIDTH - PADDLE_WIDTH);
        }

        #[test]
        fn fallen_ball_always_respawns_at_spawn(
            x in 20.0f32..780.0,
            dy in 1.0f32..40.0,
            seed in any::<u64>(),
        ) {
            let mut rng = RngState::new(seed).to_rng();
            let mut ball = Ball::with_motion(Vec2::new(x, SCREEN_HEIGHT - 1.0), Vec2::new(0.0, dy));
            prop_assert!(ball.update(&mut rng));
            prop_assert_eq!(ball.pos.y, BALL_SPAWN_Y);
            prop_assert_eq!(ball.vel.x.abs(), BALL_SPEED);
        }
    }
}
