//! Generation champions
//!
//! Keeps the best controller of each generation, ranked by fitness and
//! capped at a fixed number of entries.

use serde::{Deserialize, Serialize};

/// Default number of champions to keep
pub const DEFAULT_CAPACITY: usize = 10;

/// The best candidate of one generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Champion<C> {
    /// Generation index (0-based)
    pub generation: u32,
    /// Fitness earned in that generation's batch
    pub fitness: f64,
    /// Ticks the batch ran for
    pub ticks: u64,
    pub controller: C,
}

/// Champion leaderboard, sorted by descending fitness
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Champions<C> {
    pub entries: Vec<Champion<C>>,
    capacity: usize,
}

impl<C> Default for Champions<C> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<C> Champions<C> {
    /// Create an empty leaderboard
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    /// Check if a fitness would make the leaderboard
    pub fn qualifies(&self, fitness: f64) -> bool {
        if self.capacity == 0 || fitness.is_nan() {
            return false;
        }
        if self.entries.len() < self.capacity {
            return true;
        }
        self.entries.last().map(|e| fitness > e.fitness).unwrap_or(true)
    }

    /// Rank a fitness would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, fitness: f64) -> Option<usize> {
        if !self.qualifies(fitness) {
            return None;
        }
        let rank = self.entries.iter().position(|e| fitness > e.fitness);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Record a champion. Returns its rank (1-indexed) or None if it didn't qualify.
    ///
    /// Ties rank behind earlier entries.
    pub fn record(&mut self, champion: Champion<C>) -> Option<usize> {
        let rank = self.potential_rank(champion.fitness)?;
        self.entries.insert(rank - 1, champion);
        self.entries.truncate(self.capacity);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The fittest champion so far
    pub fn best(&self) -> Option<&Champion<C>> {
        self.entries.first()
    }

    /// Champions ordered by the generation that produced them
    pub fn by_generation(&self) -> Vec<&Champion<C>> {
        let mut ordered: Vec<_> = self.entries.iter().collect();
        ordered.sort_by_key(|c| c.generation);
        ordered
    }
}
