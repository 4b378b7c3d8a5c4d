//! Generation loop
//!
//! Evaluates one batch per generation, records the generation champion and
//! breeds the next generation until a champion reaches the fitness
//! threshold.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::batch::{BatchDriver, BatchReport, Candidate, SessionView, evaluate_batch};
use crate::champions::{Champion, Champions};
use crate::settings::Settings;
use crate::sim::Controller;

/// A set of candidates the trainer can evaluate and breed
pub trait Population {
    type Controller: Controller + Clone;

    /// The current generation; fitness is written in place by evaluation
    fn candidates_mut(&mut self) -> &mut [Candidate<Self::Controller>];

    /// Replace the evaluated generation with the next one
    fn breed(&mut self, rng: &mut Pcg32);
}

/// Result of a training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome<C> {
    /// Generations evaluated
    pub generations: u32,
    /// Whether a champion reached the fitness threshold
    pub solved: bool,
    /// Best few champions, ranked by fitness
    pub champions: Champions<C>,
    /// Every generation's champion, in generation order
    pub winners: Vec<Champion<C>>,
    /// Best fitness of each generation, in order
    pub history: Vec<f64>,
}

/// Train until a generation champion reaches `settings.fitness_threshold`
/// or `settings.max_generations` runs out.
pub fn train<P: Population>(population: &mut P, settings: &Settings) -> TrainingOutcome<P::Controller> {
    let mut rng = Pcg32::seed_from_u64(settings.seed);
    let mut champions = Champions::new(settings.champion_capacity);
    let mut winners = Vec::new();
    let mut history = Vec::new();
    let mut generation = 0u32;

    loop {
        let batch_settings = Settings {
            seed: settings.seed.wrapping_add(generation as u64),
            ..settings.clone()
        };
        let candidates = population.candidates_mut();
        let report = evaluate_batch(candidates, &batch_settings);

        let Some(best) = candidates
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
        else {
            log::warn!("Population is empty, nothing to train");
            return TrainingOutcome {
                generations: generation,
                solved: false,
                champions,
                winners,
                history,
            };
        };

        let fitness = best.fitness;
        log::info!(
            "Generation {}: best fitness {} after {} ticks ({:?})",
            generation,
            fitness,
            report.ticks,
            report.end
        );
        history.push(fitness);
        let winner = Champion {
            generation,
            fitness,
            ticks: report.ticks,
            controller: best.controller.clone(),
        };
        if let Some(rank) = champions.record(winner.clone()) {
            log::debug!("Generation {} champion ranked #{}", generation, rank);
        }
        winners.push(winner);
        generation += 1;

        let solved = fitness >= settings.fitness_threshold;
        let exhausted = settings.max_generations.is_some_and(|max| generation >= max);
        if solved || exhausted {
            if solved {
                log::info!("Reached fitness {} in {} generations", fitness, generation);
            }
            return TrainingOutcome {
                generations: generation,
                solved,
                champions,
                winners,
                history,
            };
        }

        population.breed(&mut rng);
    }
}

/// Play one controller alone, handing every frame to `on_frame`
pub fn replay<C, F>(controller: C, settings: &Settings, mut on_frame: F) -> (BatchReport, f64)
where
    C: Controller,
    F: FnMut(u64, &[SessionView]),
{
    let mut candidates = [Candidate::new(controller)];
    let mut driver = BatchDriver::new(&mut candidates, settings.seed, settings.max_ticks);
    on_frame(0, &driver.snapshot());

    let end = loop {
        let end = driver.step(&mut candidates);
        on_frame(driver.ticks(), &driver.snapshot());
        if let Some(end) = end {
            break end;
        }
    };

    let report = BatchReport {
        ticks: driver.ticks(),
        end,
    };
    (report, candidates[0].fitness)
}
