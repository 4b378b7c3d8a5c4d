//! Breakout NEAT entry point
//!
//! Trains the reference population or scores one batch of random policies.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use breakout_neat::batch::{Candidate, evaluate_batch};
use breakout_neat::policy::{HillClimbPopulation, LinearPolicy};
use breakout_neat::sim::EntityKind;
use breakout_neat::trainer::{replay, train};
use breakout_neat::Settings;

#[derive(Parser, Debug)]
#[command(name = "breakout-neat", about = "Score paddle controllers on lockstep breakout sessions")]
struct Cli {
    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the seed from the settings file
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evolve policies until a champion reaches the fitness threshold
    Train {
        /// Replay every generation's champion afterwards
        #[arg(long)]
        replay: bool,
    },
    /// Evaluate one batch of random policies and print their fitness as JSON
    Eval,
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    settings.validate()?;
    Ok(settings)
}

fn run_train(settings: &Settings, replay_champions: bool) -> Result<()> {
    let mut rng = Pcg32::seed_from_u64(settings.seed);
    let mut population = HillClimbPopulation::new(settings, &mut rng);
    let outcome = train(&mut population, settings);

    log::info!(
        "Training finished after {} generations (solved: {})",
        outcome.generations,
        outcome.solved
    );
    if let Some(best) = outcome.champions.best() {
        println!("{}", serde_json::to_string_pretty(best)?);
    }

    if replay_champions {
        for champion in &outcome.winners {
            log::info!("Replaying generation {} champion", champion.generation);
            let (report, fitness) =
                replay(champion.controller.clone(), settings, |tick, views| {
                    for view in views {
                        let obstacles = view
                            .shapes()
                            .filter(|(kind, _)| *kind == EntityKind::Obstacle)
                            .count();
                        log::debug!(
                            "tick {}: paddle x {:.1}, ball ({:.1}, {:.1}), {} obstacles",
                            tick,
                            view.paddle.min.x,
                            view.ball.min.x,
                            view.ball.min.y,
                            obstacles
                        );
                    }
                });
            log::info!(
                "Generation {} replay: fitness {} over {} ticks ({:?})",
                champion.generation,
                fitness,
                report.ticks,
                report.end
            );
        }
    }
    Ok(())
}

fn run_eval(settings: &Settings) -> Result<()> {
    let mut rng = Pcg32::seed_from_u64(settings.seed);
    let mut candidates: Vec<_> = (0..settings.population_size)
        .map(|_| Candidate::new(LinearPolicy::random(&mut rng)))
        .collect();
    let report = evaluate_batch(&mut candidates, settings);

    let fitness: Vec<f64> = candidates.iter().map(|c| c.fitness).collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "report": report,
            "fitness": fitness,
        }))?
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    log::info!("Breakout NEAT starting with seed {}", settings.seed);

    match cli.command {
        Command::Train { replay } => run_train(&settings, replay),
        Command::Eval => run_eval(&settings),
    }
}
