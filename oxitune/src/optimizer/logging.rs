use crate::fitness::CacheStats;
use crate::Chromosome;

use std::fmt;

/// Progress report for one evaluated generation,
/// handed to the observer of [`GeneticOptimizer::run_with`].
///
/// [`GeneticOptimizer::run_with`]: crate::GeneticOptimizer::run_with
#[derive(Clone, Debug)]
pub struct Progress {
    /// Zero-based index of the generation.
    pub generation: usize,
    /// The generation's fittest chromosome. Ties go
    /// to the earliest in the population.
    pub best: Chromosome,
    /// Fitness of `best`.
    pub best_fitness: f64,
    /// Statistics of the generation's fitness values.
    pub fitness: Stats,
    /// Fitness cache counters after the generation's evaluation.
    pub cache: CacheStats,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generation {}: best {} (fitness {:.6}, mean {:.6})",
            self.generation + 1,
            self.best,
            self.best_fitness,
            self.fitness.mean
        )
    }
}

/// Defines different possible reporting levels for logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportingLevel {
    /// Clones each generation's best chromosome.
    BestChromosome,
    /// Clones no chromosomes.
    NoChromosomes,
}

/// A snapshot of a generation.
#[derive(Clone, Debug)]
pub struct Log {
    pub generation_number: usize,
    pub best: Option<Chromosome>,
    pub best_fitness: f64,
    pub fitness: Stats,
    pub cache: CacheStats,
}

impl fmt::Display for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Log {{\n\
            \tgeneration_number: {:?}\n\
            \tbest: {}\n\
            \tbest_fitness: {:?}\n\
            \tfitness: {:?}\n\
            \tcache: {:?}\n\
            }}",
            &self.generation_number,
            self.best
                .as_ref()
                .map_or_else(|| String::from("-"), |c| c.to_string()),
            &self.best_fitness,
            &self.fitness,
            &self.cache,
        )
    }
}

/// A struct for reporting basic statistical data.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stats {
    pub maximum: f64,
    pub minimum: f64,
    pub mean: f64,
    pub median: f64,
}

impl Stats {
    /// Returns statistics about numbers in a sequence.
    /// All statistics of an empty sequence are NaN.
    ///
    /// # Examples
    /// ```
    /// use oxitune::logging::Stats;
    ///
    /// let stats = Stats::from([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied());
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    ///
    /// let stats = Stats::from([4.0, 1.0, 3.0, 2.0].iter().copied());
    /// assert_eq!(stats.median, 2.5);
    /// ```
    pub fn from(data: impl Iterator<Item = f64>) -> Stats {
        let mut data: Vec<f64> = data.collect();
        if data.is_empty() {
            return Stats {
                maximum: f64::NAN,
                minimum: f64::NAN,
                mean: f64::NAN,
                median: f64::NAN,
            };
        }
        data.sort_unstable_by(f64::total_cmp);
        let mid = data.len() / 2;
        let median = if data.len() % 2 == 0 {
            (data[mid - 1] + data[mid]) / 2.0
        } else {
            data[mid]
        };
        Stats {
            maximum: data[data.len() - 1],
            minimum: data[0],
            mean: data.iter().sum::<f64>() / data.len() as f64,
            median,
        }
    }
}

/// A log of the evolution of a population over time.
///
/// Can be used directly as the observer of a run.
///
/// # Examples
/// ```
/// use oxitune::logging::{EvolutionLogger, ReportingLevel};
/// use oxitune::{GeneBounds, GeneticOptimizer, Infallible, OptimizerConfig};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let config = OptimizerConfig {
///     population_size: 10,
///     chromosome_length: 2,
///     gene_bounds: GeneBounds::Uniform(-1.0, 1.0),
///     mutation_probability: 0.1,
///     crossover_probability: 0.9,
///     evaluation_threads: 1,
///     ..OptimizerConfig::zero()
/// };
/// let objective = Infallible(|g: &[f64]| g[0] * g[0] + g[1] * g[1]);
/// let mut optimizer =
///     GeneticOptimizer::new(config, objective, StdRng::seed_from_u64(1)).unwrap();
///
/// let mut logger = EvolutionLogger::new(ReportingLevel::BestChromosome);
/// optimizer.run_with(5, |p| logger.log(p)).unwrap();
///
/// assert_eq!(logger.iter().count(), 5);
/// for log in logger.iter() {
///     println!("{}", log);
/// }
/// ```
#[derive(Clone, Debug)]
pub struct EvolutionLogger {
    reporting_level: ReportingLevel,
    logs: Vec<Log>,
}

impl EvolutionLogger {
    /// Returns a logger with the appropiate reporting level.
    pub fn new(reporting_level: ReportingLevel) -> EvolutionLogger {
        EvolutionLogger {
            reporting_level,
            logs: vec![],
        }
    }

    /// Store a snapshot of a generation's progress.
    pub fn log(&mut self, progress: &Progress) {
        self.logs.push(Log {
            generation_number: progress.generation,
            best: match self.reporting_level {
                ReportingLevel::BestChromosome => Some(progress.best.clone()),
                ReportingLevel::NoChromosomes => None,
            },
            best_fitness: progress.best_fitness,
            fitness: progress.fitness,
            cache: progress.cache,
        })
    }

    /// Iterate over all logged snapshots.
    pub fn iter(&self) -> impl Iterator<Item = &Log> {
        self.logs.iter()
    }

    /// Returns the most recent snapshot.
    pub fn last(&self) -> Option<&Log> {
        self.logs.last()
    }
}
