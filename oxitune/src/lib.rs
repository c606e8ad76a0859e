//! A genetic algorithm for tuning small vectors of bounded,
//! real-valued parameters, such as the gains of a PID controller,
//! against an arbitrary black-box cost function.
//!
//! Each generation the population is scored through a user-supplied
//! [`Objective`], parents are drawn with probability proportional to
//! their fitness, and pairs of children are produced by single-point
//! crossover and per-gene resampling mutation. Fitness values are
//! memoized per exact chromosome value, so the objective is never
//! called twice for the same genes, and can be evaluated on a pool
//! of worker threads.
//!
//! All randomness comes from a caller-supplied [`rand::Rng`], so
//! runs can be made reproducible by seeding it.
//!
//! # Example usage: tuning PID gains
//! ```
//! use oxitune::logging::{EvolutionLogger, ReportingLevel};
//! use oxitune::{GeneBounds, GeneticOptimizer, Infallible, OptimizerConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Stand-in for an expensive closed-loop simulation:
//! // the cost is the squared distance to a known-good set of gains.
//! fn cost(gains: &[f64]) -> f64 {
//!     let (kp, ki, kd) = (gains[0], gains[1], gains[2]);
//!     (kp - 62.0).powi(2) + (ki - 1.5).powi(2) + (kd - 12.0).powi(2)
//! }
//!
//! fn main() {
//!     let config = OptimizerConfig {
//!         population_size: 20,
//!         chromosome_length: 3,
//!         gene_bounds: GeneBounds::PerGene(vec![(0.0, 100.0), (0.0, 10.0), (0.0, 50.0)]),
//!         mutation_probability: 0.1,
//!         crossover_probability: 0.7,
//!         ..OptimizerConfig::zero()
//!     };
//!
//!     let rng = StdRng::seed_from_u64(2024);
//!     let mut optimizer = GeneticOptimizer::new(config, Infallible(cost), rng).unwrap();
//!     let mut logger = EvolutionLogger::new(ReportingLevel::BestChromosome);
//!
//!     match optimizer.run_with(50, |progress| logger.log(progress)) {
//!         Ok(best) => println!("Kp = {:.2}, Ki = {:.2}, Kd = {:.2}", best[0], best[1], best[2]),
//!         Err(e) => eprintln!("{}", e),
//!     }
//! }
//! ```

mod chromosome;
pub mod fitness;
mod objective;
mod optimizer;
mod rng;
pub mod selection;
pub mod variation;

pub use chromosome::{Chromosome, GeneBounds};
pub use objective::{Infallible, Objective};
pub use optimizer::*;
