//! Run settings
//!
//! Loaded from a JSON file; any field left out keeps its default.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::consts::FITNESS_THRESHOLD;

/// Training and evaluation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Evaluation ===
    /// Seed for respawn directions (session `i` uses stream `i`)
    pub seed: u64,
    /// Stop a batch after this many ticks (`None` = run until it ends)
    pub max_ticks: Option<u64>,

    // === Training ===
    /// Champion fitness at which training stops
    pub fitness_threshold: f64,
    /// Give up after this many generations (`None` = keep going)
    pub max_generations: Option<u32>,
    /// Candidates per generation
    pub population_size: usize,
    /// Best candidates carried unchanged into the next generation
    pub elite_count: usize,
    /// Probability that a weight is perturbed when breeding
    pub mutation_rate: f64,
    /// Largest perturbation applied to a mutated weight
    pub mutation_power: f64,

    // === Champions ===
    /// How many generation champions to keep
    pub champion_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0,
            max_ticks: None,

            fitness_threshold: FITNESS_THRESHOLD,
            max_generations: None,
            population_size: 50,
            elite_count: 5,
            mutation_rate: 0.8,
            mutation_power: 0.5,

            champion_capacity: 10,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        let settings = Self::from_json(&json)
            .with_context(|| format!("parsing settings in {}", path.display()))?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parse and validate settings from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the trainer cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            bail!("population_size must be > 0");
        }
        if self.elite_count > self.population_size {
            bail!(
                "elite_count ({}) exceeds population_size ({})",
                self.elite_count,
                self.population_size
            );
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            bail!("mutation_rate must be within [0, 1]");
        }
        if !self.mutation_power.is_finite() || self.mutation_power < 0.0 {
            bail!("mutation_power must be finite and non-negative");
        }
        if !self.fitness_threshold.is_finite() {
            bail!("fitness_threshold must be finite");
        }
        Ok(())
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing settings to {}", path.display()))?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
