use crate::simulation::Plant;

use oxitune::{GeneBounds, OptimizerConfig};
use serde::{Deserialize, Serialize};

use std::error::Error;
use std::fs;
use std::path::Path;

/// Settings of a tuning session, as read from a RON file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TunerConfig {
    pub plant: Plant,
    /// Simulated time per evaluation (s).
    pub duration: f64,
    /// Output samples per evaluation.
    pub samples: usize,
    pub generations: usize,
    /// Seed for reproducible runs. Drawn from
    /// the OS if absent.
    #[serde(default)]
    pub seed: Option<u64>,
    pub optimizer: OptimizerConfig,
}

impl Default for TunerConfig {
    fn default() -> TunerConfig {
        TunerConfig {
            plant: Plant::default(),
            duration: 10.0,
            samples: 1000,
            generations: 50,
            seed: None,
            optimizer: OptimizerConfig {
                population_size: 20,
                chromosome_length: 3,
                gene_bounds: GeneBounds::PerGene(vec![(0.0, 100.0), (0.0, 10.0), (0.0, 50.0)]),
                mutation_probability: 0.1,
                crossover_probability: 0.7,
                crossover_rate: 0.5,
                evaluation_threads: 0,
            },
        }
    }
}

impl TunerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<TunerConfig, Box<dyn Error>> {
        let text = fs::read_to_string(path)?;
        Ok(ron::from_str(&text)?)
    }
}
