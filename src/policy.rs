//! Reference controller and population
//!
//! A linear policy with a tanh squash, bred by elitist hill climbing. Enough
//! to drive the batch evaluator end to end; any `Controller` and
//! `Population` pair can stand in for these.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::batch::Candidate;
use crate::consts::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::settings::Settings;
use crate::sim::{Controller, Observation};
use crate::trainer::Population;

/// `tanh(w · normalized_observation + bias)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPolicy {
    pub weights: [f64; 3],
    pub bias: f64,
}

impl LinearPolicy {
    pub fn new(weights: [f64; 3], bias: f64) -> Self {
        Self { weights, bias }
    }

    /// Weights and bias drawn uniformly from [-1, 1]
    pub fn random(rng: &mut Pcg32) -> Self {
        Self {
            weights: [
                rng.random_range(-1.0..=1.0),
                rng.random_range(-1.0..=1.0),
                rng.random_range(-1.0..=1.0),
            ],
            bias: rng.random_range(-1.0..=1.0),
        }
    }

    /// Perturb each parameter with probability `rate` by up to `power`
    pub fn mutate(&mut self, rng: &mut Pcg32, rate: f64, power: f64) {
        for w in self.weights.iter_mut().chain(std::iter::once(&mut self.bias)) {
            if power > 0.0 && rng.random_bool(rate) {
                *w += rng.random_range(-power..=power);
            }
        }
    }
}

impl Controller for LinearPolicy {
    fn activate(&mut self, observation: Observation) -> f64 {
        let inputs = [
            observation.paddle_x / SCREEN_WIDTH as f64,
            observation.ball_x / SCREEN_WIDTH as f64,
            observation.ball_y / SCREEN_HEIGHT as f64,
        ];
        let sum: f64 = self
            .weights
            .iter()
            .zip(inputs)
            .map(|(w, x)| w * x)
            .sum();
        (sum + self.bias).tanh()
    }
}

/// Fixed-size population of linear policies
#[derive(Debug, Clone)]
pub struct HillClimbPopulation {
    candidates: Vec<Candidate<LinearPolicy>>,
    elite_count: usize,
    mutation_rate: f64,
    mutation_power: f64,
}

impl HillClimbPopulation {
    pub fn new(settings: &Settings, rng: &mut Pcg32) -> Self {
        let candidates = (0..settings.population_size)
            .map(|_| Candidate::new(LinearPolicy::random(rng)))
            .collect();
        Self {
            candidates,
            elite_count: settings.elite_count,
            mutation_rate: if settings.mutation_rate.is_nan() {
                0.0
            } else {
                settings.mutation_rate.clamp(0.0, 1.0)
            },
            mutation_power: settings.mutation_power,
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl Population for HillClimbPopulation {
    type Controller = LinearPolicy;

    fn candidates_mut(&mut self) -> &mut [Candidate<LinearPolicy>] {
        &mut self.candidates
    }

    fn breed(&mut self, rng: &mut Pcg32) {
        if self.candidates.is_empty() {
            return;
        }
        self.candidates
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        // Never keep more elites than there are candidates
        let keep = self.elite_count.min(self.candidates.len());
        // With no elites, every candidate may parent the next generation
        let parents = if keep == 0 { self.candidates.len() } else { keep };

        let mut next = Vec::with_capacity(self.candidates.len());
        for elite in &self.candidates[..keep] {
            next.push(Candidate::new(elite.controller.clone()));
        }
        while next.len() < self.candidates.len() {
            let parent = &self.candidates[rng.random_range(0..parents)];
            let mut child = parent.controller.clone();
            child.mutate(rng, self.mutation_rate, self.mutation_power);
            next.push(Candidate::new(child));
        }
        self.candidates = next;
    }
}
