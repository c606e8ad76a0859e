use super::ConfigurationError;
use crate::GeneBounds;

use serde::{Deserialize, Serialize};

/// Configuration data for population generation
/// and evolution.
///
/// # Note
/// All quantities expressing probabilities
/// must be in the range [0.0, 1.0]; this is
/// checked when an optimizer is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Number of chromosomes in each generation.
    /// Must be positive and even.
    pub population_size: usize,
    /// Number of genes in each chromosome.
    pub chromosome_length: usize,
    /// Intervals from which genes are drawn.
    pub gene_bounds: GeneBounds,
    /// Chance of each gene of a child being
    /// resampled from its bounds.
    pub mutation_probability: f64,
    /// Chance of a mating pair being crossed over,
    /// instead of passed through unchanged.
    pub crossover_probability: f64,
    /// Accepted for compatibility but not used: crossover
    /// is gated by [`crossover_probability`] alone.
    ///
    /// [`crossover_probability`]: OptimizerConfig::crossover_probability
    #[serde(default)]
    pub crossover_rate: f64,
    /// Number of threads used to evaluate fitness.
    /// 0 uses one per logical CPU; 1 evaluates on the
    /// calling thread, and must be used if the objective
    /// can't be called concurrently.
    #[serde(default)]
    pub evaluation_threads: usize,
}

impl OptimizerConfig {
    /// Returns a "zero-valued" default configuration.
    /// All values are 0, and bounds are `[0, 0]`.
    ///
    /// # Note
    /// This value is not valid for optimization.
    /// It is meant as a way to abbreviate configuration
    /// instantiation, or to fill in unused values.
    ///
    /// # Examples
    /// ```
    /// use oxitune::{GeneBounds, OptimizerConfig};
    ///
    /// let config = OptimizerConfig {
    ///     population_size: 20,
    ///     chromosome_length: 3,
    ///     gene_bounds: GeneBounds::PerGene(vec![(0.0, 100.0), (0.0, 10.0), (0.0, 50.0)]),
    ///     mutation_probability: 0.1,
    ///     crossover_probability: 0.8,
    ///     ..OptimizerConfig::zero()
    /// };
    /// assert!(config.validate().is_ok());
    /// assert!(OptimizerConfig::zero().validate().is_err());
    /// ```
    pub const fn zero() -> OptimizerConfig {
        OptimizerConfig {
            population_size: 0,
            chromosome_length: 0,
            gene_bounds: GeneBounds::Uniform(0.0, 0.0),
            mutation_probability: 0.0,
            crossover_probability: 0.0,
            crossover_rate: 0.0,
            evaluation_threads: 0,
        }
    }

    /// Checks that the configuration can be used
    /// for optimization.
    ///
    /// # Errors
    /// Returns an error if the population size is zero
    /// or odd, the bounds are invalid for the chromosome
    /// length, or a probability is outside of [0, 1].
    /// [`crossover_rate`] is not checked.
    ///
    /// [`crossover_rate`]: OptimizerConfig::crossover_rate
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.population_size == 0 {
            return Err(ConfigurationError::EmptyPopulation);
        }
        if self.population_size % 2 != 0 {
            return Err(ConfigurationError::OddPopulationSize(self.population_size));
        }
        self.gene_bounds.validate(self.chromosome_length)?;
        for (name, value) in [
            ("mutation_probability", self.mutation_probability),
            ("crossover_probability", self.crossover_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigurationError::ProbabilityOutOfRange { name, value });
            }
        }
        Ok(())
    }
}
