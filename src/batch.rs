//! Lockstep batch driver
//!
//! Holds one session per candidate and steps every live session exactly once
//! per frame. Sessions whose ball falls are evicted after the sweep; a
//! session clearing its board stops the whole batch.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::{Bounded, Controller, EntityKind, Rect, RngState, Session, TickOutcome};

/// A controller paired with the fitness it earns
#[derive(Debug, Clone)]
pub struct Candidate<C> {
    pub controller: C,
    pub fitness: f64,
}

impl<C> Candidate<C> {
    pub fn new(controller: C) -> Self {
        Self {
            controller,
            fitness: 0.0,
        }
    }
}

/// Why a batch stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchEnd {
    /// Every session was evicted
    Exhausted,
    /// The candidate at `index` cleared its board
    Cleared { index: usize },
    /// The configured tick cap was reached
    TickLimit,
}

/// Summary of a finished batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub ticks: u64,
    pub end: BatchEnd,
}

/// Read-only geometry of one live session, for drawing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    /// Candidate index
    pub index: usize,
    pub paddle: Rect,
    pub ball: Rect,
    pub obstacles: Vec<Rect>,
    pub fitness: f64,
}

impl SessionView {
    /// Every rectangle in draw order, tagged with its kind
    pub fn shapes(&self) -> impl Iterator<Item = (EntityKind, Rect)> + '_ {
        self.obstacles
            .iter()
            .map(|r| (EntityKind::Obstacle, *r))
            .chain([(EntityKind::Paddle, self.paddle), (EntityKind::Ball, self.ball)])
    }
}

/// A session slot, tagged with the candidate it plays for
#[derive(Debug, Clone)]
struct Slot {
    index: usize,
    session: Session,
}

/// Steps a batch of sessions in lockstep
#[derive(Debug, Clone)]
pub struct BatchDriver {
    /// Live sessions, in candidate order
    slots: Vec<Slot>,
    ticks: u64,
    max_ticks: Option<u64>,
    end: Option<BatchEnd>,
}

impl BatchDriver {
    /// One fresh session per candidate. Resets every candidate's fitness.
    pub fn new<C>(candidates: &mut [Candidate<C>], seed: u64, max_ticks: Option<u64>) -> Self {
        let sessions = (0..candidates.len())
            .map(|index| Session::new(&RngState::for_session(seed, index)))
            .collect();
        Self::from_sessions(candidates, sessions, max_ticks)
    }

    /// Drive prepared sessions; session `i` plays for candidate `i`.
    ///
    /// Resets every candidate's fitness. Sessions beyond the last candidate
    /// are dropped.
    pub fn from_sessions<C>(
        candidates: &mut [Candidate<C>],
        sessions: Vec<Session>,
        max_ticks: Option<u64>,
    ) -> Self {
        for candidate in candidates.iter_mut() {
            candidate.fitness = 0.0;
        }
        if sessions.len() > candidates.len() {
            log::warn!(
                "{} sessions for {} candidates, dropping the extra sessions",
                sessions.len(),
                candidates.len()
            );
        }
        let slots: Vec<Slot> = sessions
            .into_iter()
            .take(candidates.len())
            .enumerate()
            .map(|(index, session)| Slot { index, session })
            .collect();

        let end = if slots.is_empty() {
            Some(BatchEnd::Exhausted)
        } else if max_ticks == Some(0) {
            Some(BatchEnd::TickLimit)
        } else {
            None
        };

        Self {
            slots,
            ticks: 0,
            max_ticks,
            end,
        }
    }

    /// Number of live sessions
    pub fn active(&self) -> usize {
        self.slots.len()
    }

    /// Candidate indices of live sessions, ascending
    pub fn active_indices(&self) -> Vec<usize> {
        self.slots.iter().map(|s| s.index).collect()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn end(&self) -> Option<BatchEnd> {
        self.end
    }

    pub fn is_finished(&self) -> bool {
        self.end.is_some()
    }

    /// Advance every live session by one tick.
    ///
    /// Fitness is written back to each candidate as it changes. Returns the
    /// reason the batch ended, if it did. A session whose candidate is
    /// missing from `candidates` is evicted without being stepped.
    pub fn step<C: Controller>(&mut self, candidates: &mut [Candidate<C>]) -> Option<BatchEnd> {
        if self.end.is_some() {
            return self.end;
        }

        let mut evicted = Vec::new();
        let mut cleared = None;

        for slot in &mut self.slots {
            let Some(candidate) = candidates.get_mut(slot.index) else {
                log::warn!("Session #{} has no candidate, evicting it", slot.index);
                evicted.push(slot.index);
                continue;
            };
            let outcome = slot.session.tick(&mut candidate.controller);
            candidate.fitness = slot.session.fitness();

            match outcome {
                TickOutcome::Continue => {}
                TickOutcome::SessionDone => {
                    log::debug!(
                        "Session #{} dropped its ball (fitness {})",
                        slot.index,
                        candidate.fitness
                    );
                    evicted.push(slot.index);
                }
                TickOutcome::BatchDone => {
                    log::info!("Session #{} finished the game!", slot.index);
                    if cleared.is_none() {
                        cleared = Some(slot.index);
                    }
                }
            }
        }

        if !evicted.is_empty() {
            self.slots.retain(|slot| !evicted.contains(&slot.index));
        }
        self.ticks += 1;
        log::trace!("tick {}: {} sessions live", self.ticks, self.slots.len());

        self.end = if let Some(index) = cleared {
            Some(BatchEnd::Cleared { index })
        } else if self.slots.is_empty() {
            Some(BatchEnd::Exhausted)
        } else if self.max_ticks.is_some_and(|max| self.ticks >= max) {
            Some(BatchEnd::TickLimit)
        } else {
            None
        };
        self.end
    }

    /// Geometry of every live session
    pub fn snapshot(&self) -> Vec<SessionView> {
        self.slots
            .iter()
            .map(|slot| {
                let session = &slot.session;
                SessionView {
                    index: slot.index,
                    paddle: session.paddle.bounds(),
                    ball: session.ball.bounds(),
                    obstacles: session.obstacles.iter().map(|o| o.bounds()).collect(),
                    fitness: session.fitness(),
                }
            })
            .collect()
    }

    /// Step until the batch ends
    pub fn run<C: Controller>(&mut self, candidates: &mut [Candidate<C>]) -> BatchReport {
        let end = loop {
            if let Some(end) = self.step(candidates) {
                break end;
            }
        };
        BatchReport {
            ticks: self.ticks,
            end,
        }
    }
}

/// Score every candidate in one lockstep batch
pub fn evaluate_batch<C: Controller>(
    candidates: &mut [Candidate<C>],
    settings: &Settings,
) -> BatchReport {
    if candidates.is_empty() {
        return BatchReport {
            ticks: 0,
            end: BatchEnd::Exhausted,
        };
    }

    log::info!("Evaluating batch of {} sessions", candidates.len());
    let mut driver = BatchDriver::new(candidates, settings.seed, settings.max_ticks);
    let report = driver.run(candidates);
    log::info!("Batch ended after {} ticks: {:?}", report.ticks, report.end);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::{Ball, Observation, Obstacle, Paddle};
    use glam::Vec2;

    fn idle(_: Observation) -> f64 {
        0.0
    }

    fn idle_candidates(n: usize) -> Vec<Candidate<fn(Observation) -> f64>> {
        (0..n).map(|_| Candidate::new(idle as fn(Observation) -> f64)).collect()
    }

    #[test]
    fn test_new_resets_fitness() {
        let mut candidates = idle_candidates(2);
        candidates[1].fitness = 12.0;
        let driver = BatchDriver::new(&mut candidates, 1, None);
        assert_eq!(driver.active(), 2);
        assert!(candidates.iter().all(|c| c.fitness == 0.0));
    }

    #[test]
    fn test_step_after_end_is_noop() {
        let mut candidates = idle_candidates(1);
        let mut driver = BatchDriver::new(&mut candidates, 1, Some(1));
        assert_eq!(driver.step(&mut candidates), Some(BatchEnd::TickLimit));
        assert_eq!(driver.step(&mut candidates), Some(BatchEnd::TickLimit));
        assert_eq!(driver.ticks(), 1);
    }

    #[test]
    fn test_zero_tick_cap_ends_immediately() {
        let mut candidates = idle_candidates(3);
        let mut driver = BatchDriver::new(&mut candidates, 1, Some(0));
        let report = driver.run(&mut candidates);
        assert_eq!(report.ticks, 0);
        assert_eq!(report.end, BatchEnd::TickLimit);
    }

    #[test]
    fn test_snapshot_reflects_sessions() {
        let mut candidates = idle_candidates(2);
        let driver = BatchDriver::new(&mut candidates, 5, None);
        let views = driver.snapshot();
        assert_eq!(views.len(), 2);
        assert_eq!(views[1].index, 1);
        assert_eq!(views[0].obstacles.len(), OBSTACLE_ROWS * OBSTACLE_COLUMNS);
        assert_eq!(views[0].paddle.min, Vec2::new(PADDLE_START_X, PADDLE_START_Y));

        let shapes: Vec<_> = views[0].shapes().collect();
        assert_eq!(shapes.len(), OBSTACLE_ROWS * OBSTACLE_COLUMNS + 2);
        assert_eq!(shapes.last().map(|s| s.0), Some(EntityKind::Ball));
    }

    #[test]
    fn test_fall_and_clear_in_same_tick() {
        // Clearing wins over the fall, but both fitness events land
        let ball = Ball::with_motion(Vec2::new(320.0, 585.0), Vec2::new(0.0, 10.0));
        let obstacle = Obstacle::new(380.0, 440.0);
        let session =
            Session::with_entities(Paddle::new(0.0, 500.0), ball, vec![obstacle], &RngState::new(2));
        let mut candidates = idle_candidates(1);
        let mut driver = BatchDriver::from_sessions(&mut candidates, vec![session], None);

        let end = driver.step(&mut candidates);
        assert_eq!(end, Some(BatchEnd::Cleared { index: 0 }));
        assert_eq!(candidates[0].fitness, FITNESS_FALL + FITNESS_OBSTACLE);
    }

    #[test]
    fn test_from_sessions_resets_fitness_and_drops_extras() {
        let mut candidates = idle_candidates(2);
        candidates[0].fitness = 9.0;
        let sessions = (0..3).map(|i| Session::new(&RngState::for_session(1, i))).collect();
        let driver = BatchDriver::from_sessions(&mut candidates, sessions, None);
        assert_eq!(driver.active(), 2);
        assert_eq!(candidates[0].fitness, 0.0);
    }

    #[test]
    fn test_short_candidate_slice_evicts_orphans() {
        let mut candidates = idle_candidates(3);
        let mut driver = BatchDriver::new(&mut candidates, 1, None);

        let end = driver.step(&mut candidates[..1]);
        assert_eq!(end, None);
        assert_eq!(driver.active_indices(), vec![0]);

        let end = driver.step(&mut candidates[..0]);
        assert_eq!(end, Some(BatchEnd::Exhausted));
    }
}
