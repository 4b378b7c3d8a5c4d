//! Fixed-step session tick
//!
//! A session is one self-contained game (paddle, ball, obstacle field)
//! played by one controller. `Session::tick` advances it by exactly one
//! frame and reports whether it should keep running.

use rand_pcg::Pcg32;

use super::collision::Bounded;
use super::state::{Ball, Obstacle, Paddle, RngState, Steer, obstacle_grid};
use crate::consts::*;

/// What a controller sees each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub paddle_x: f64,
    pub ball_x: f64,
    pub ball_y: f64,
}

impl Observation {
    pub fn as_array(&self) -> [f64; 3] {
        [self.paddle_x, self.ball_x, self.ball_y]
    }
}

/// Maps an observation to a scalar steering signal
pub trait Controller {
    fn activate(&mut self, observation: Observation) -> f64;
}

impl<F> Controller for F
where
    F: FnMut(Observation) -> f64,
{
    fn activate(&mut self, observation: Observation) -> f64 {
        self(observation)
    }
}

/// Result of one session tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep stepping this session
    Continue,
    /// The ball fell through the bottom; evict this session
    SessionDone,
    /// This session cleared its board; the whole batch stops
    BatchDone,
}

/// Event counters backing the fitness total
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub ticks: u64,
    pub paddle_hits: u32,
    pub obstacles_destroyed: u32,
    pub falls: u32,
}

impl SessionStats {
    /// Fitness implied by the counters
    pub fn fitness(&self) -> f64 {
        FITNESS_PADDLE_HIT * self.paddle_hits as f64
            + FITNESS_OBSTACLE * self.obstacles_destroyed as f64
            + FITNESS_FALL * self.falls as f64
    }
}

/// One game instance
#[derive(Debug, Clone)]
pub struct Session {
    pub paddle: Paddle,
    pub ball: Ball,
    pub obstacles: Vec<Obstacle>,
    fitness: f64,
    stats: SessionStats,
    rng: Pcg32,
}

impl Session {
    /// Fresh session: paddle at its start, full obstacle grid, new ball
    pub fn new(rng_state: &RngState) -> Self {
        let mut rng = rng_state.to_rng();
        let ball = Ball::spawn(&mut rng);
        Self {
            paddle: Paddle::default(),
            ball,
            obstacles: obstacle_grid(OBSTACLE_ROWS, OBSTACLE_COLUMNS),
            fitness: 0.0,
            stats: SessionStats::default(),
            rng,
        }
    }

    /// Session with explicit entities
    pub fn with_entities(
        paddle: Paddle,
        ball: Ball,
        obstacles: Vec<Obstacle>,
        rng_state: &RngState,
    ) -> Self {
        Self {
            paddle,
            ball,
            obstacles,
            fitness: 0.0,
            stats: SessionStats::default(),
            rng: rng_state.to_rng(),
        }
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn observation(&self) -> Observation {
        Observation {
            paddle_x: self.paddle.pos.x as f64,
            ball_x: self.ball.pos.x as f64,
            ball_y: self.ball.pos.y as f64,
        }
    }

    /// Advance the session by one frame
    pub fn tick<C: Controller + ?Sized>(&mut self, controller: &mut C) -> TickOutcome {
        self.stats.ticks += 1;

        let signal = controller.activate(self.observation());
        self.paddle.steer(Steer::from_signal(signal));
        self.paddle.update();

        let fell = self.ball.update(&mut self.rng);
        if fell {
            self.fitness += FITNESS_FALL;
            self.stats.falls += 1;
        }

        // No separation after a paddle bounce; fast balls can re-hit next tick
        if self.ball.collides(&self.paddle) {
            self.ball.bounce();
            self.fitness += FITNESS_PADDLE_HIT;
            self.stats.paddle_hits += 1;
        }

        // Every overlapping obstacle flips dy, so simultaneous hits can cancel
        let before = self.obstacles.len();
        let ball = &mut self.ball;
        self.obstacles.retain(|obstacle| {
            if ball.collides(obstacle) {
                ball.bounce();
                false
            } else {
                true
            }
        });
        let destroyed = before - self.obstacles.len();
        if destroyed > 0 {
            self.fitness += FITNESS_OBSTACLE * destroyed as f64;
            self.stats.obstacles_destroyed += destroyed as u32;
        }

        if destroyed > 0 && self.obstacles.is_empty() {
            TickOutcome::BatchDone
        } else if fell {
            TickOutcome::SessionDone
        } else {
            TickOutcome::Continue
        }
    }
}
