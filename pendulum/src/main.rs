mod config;
mod simulation;

use config::TunerConfig;
use simulation::{ControllerKind, Gains, Simulation};

use oxitune::logging::{EvolutionLogger, ReportingLevel, Stats};
use oxitune::GeneticOptimizer;
use rand::{rngs::StdRng, SeedableRng};

use std::error::Error;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading configuration from {}", path);
            TunerConfig::load(path)?
        }
        None => TunerConfig::default(),
    };

    let simulation = Simulation::new(config.plant.clone(), config.duration, config.samples)?;
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut optimizer = GeneticOptimizer::new(
        config.optimizer.clone(),
        |gains: &[f64]| simulation.integral_squared_error(gains),
        rng,
    )?;
    let mut logger = EvolutionLogger::new(ReportingLevel::NoChromosomes);

    println!("Starting PID optimization with a genetic algorithm...");
    let best = optimizer.run_with(config.generations, |progress| {
        println!("Generation {}:", progress.generation + 1);
        println!("  Best individual: {}", progress.best);
        println!("  Best fitness: {:.6}\n", progress.best_fitness);
        logger.log(progress);
    })?;

    let gains = Gains::from_slice(best.genes())?;
    println!("Optimization complete.");
    println!(
        "Best parameters found: Kp = {:.2}, Ki = {:.2}, Kd = {:.2}",
        gains.kp, gains.ki, gains.kd
    );

    for kind in ControllerKind::ALL {
        let restricted = kind.restrict(gains);
        let cost = simulation.integral_squared_error(&[restricted.kp, restricted.ki, restricted.kd])?;
        println!("  {:>3} controller: integral squared error {:.4}", kind, cost);
    }

    let best_fitness = Stats::from(logger.iter().map(|log| log.best_fitness));
    let cache = optimizer.evaluator().cache().stats();
    log::info!(
        "best fitness per generation: {:?}; {} simulations run, {} cache hits",
        best_fitness,
        cache.misses,
        cache.hits
    );
    Ok(())
}
