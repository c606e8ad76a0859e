//! The generational driver. An optimizer owns a population
//! of chromosomes, which it repeatedly evaluates and replaces
//! with offspring bred by fitness-proportional selection,
//! crossover and mutation.
mod config;
mod errors;
pub mod logging;

pub use config::OptimizerConfig;
pub use errors::{ConfigurationError, Error};

use crate::fitness::FitnessEvaluator;
use crate::selection::RouletteWheel;
use crate::variation::{crossover, mutate};
use crate::{Chromosome, GeneBounds, Objective};
use logging::{Progress, Stats};

use rand::Rng;

/// Stages of an optimization run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// The first population has been generated.
    Initialized,
    /// The current population is being scored.
    Evaluating,
    /// The best chromosome of the generation is being reported.
    Reporting,
    /// Offspring are being generated from the scored population.
    Breeding,
    /// The run is over and its best chromosome has been returned.
    Terminated,
}

/// Returns `size` chromosomes of `chromosome_length` genes,
/// each gene drawn uniformly from its interval in `bounds`.
///
/// # Errors
/// Returns an error if `size` or `chromosome_length` is zero,
/// or if the bounds are invalid for the chromosome length.
///
/// # Examples
/// ```
/// use oxitune::{initialize_population, GeneBounds};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let bounds = GeneBounds::PerGene(vec![(0.0, 100.0), (0.0, 10.0), (0.0, 50.0)]);
/// let population = initialize_population(20, 3, &bounds, &mut StdRng::seed_from_u64(0)).unwrap();
///
/// assert_eq!(population.len(), 20);
/// assert!(population.iter().all(|c| c.len() == 3 && bounds.contains(c)));
/// ```
pub fn initialize_population<R: Rng + ?Sized>(
    size: usize,
    chromosome_length: usize,
    bounds: &GeneBounds,
    rng: &mut R,
) -> Result<Vec<Chromosome>, ConfigurationError> {
    if size == 0 {
        return Err(ConfigurationError::EmptyPopulation);
    }
    bounds.validate(chromosome_length)?;
    Ok((0..size)
        .map(|_| bounds.sample(chromosome_length, rng))
        .collect())
}

/// A genetic algorithm minimizing an [`Objective`] over
/// bounded real-valued chromosomes.
///
/// Randomness is drawn exclusively from the injected `R`,
/// so runs with a seeded generator and a sequential
/// evaluator are reproducible.
///
/// # Examples
/// ```
/// use oxitune::{GeneBounds, GeneticOptimizer, Infallible, OptimizerConfig};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let config = OptimizerConfig {
///     population_size: 20,
///     chromosome_length: 1,
///     gene_bounds: GeneBounds::Uniform(0.0, 10.0),
///     mutation_probability: 0.1,
///     crossover_probability: 0.7,
///     ..OptimizerConfig::zero()
/// };
/// let objective = Infallible(|g: &[f64]| (g[0] - 5.0).powi(2));
/// let mut optimizer = GeneticOptimizer::new(config, objective, StdRng::seed_from_u64(3)).unwrap();
///
/// let best = optimizer
///     .run_with(30, |progress| println!("{}", progress))
///     .unwrap();
/// println!("best gene: {}", best[0]);
/// ```
pub struct GeneticOptimizer<O, R> {
    config: OptimizerConfig,
    evaluator: FitnessEvaluator<O>,
    rng: R,
    population: Vec<Chromosome>,
    fitness: Option<Vec<f64>>,
    generation: usize,
    phase: Phase,
}

impl<O, R> GeneticOptimizer<O, R>
where
    O: Objective + Sync,
    R: Rng,
{
    /// Creates an optimizer and its initial population.
    ///
    /// Fitness is evaluated on `config.evaluation_threads`
    /// workers. Objectives that can't be shared between
    /// threads are run with [`sequential`] instead.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if the configuration
    /// is invalid, or [`Error::WorkerPool`] if evaluation
    /// workers can't be started.
    ///
    /// [`sequential`]: GeneticOptimizer::sequential
    pub fn new(
        config: OptimizerConfig,
        objective: O,
        rng: R,
    ) -> Result<GeneticOptimizer<O, R>, Error> {
        config.validate()?;
        let evaluator = FitnessEvaluator::new(objective, config.evaluation_threads)?;
        GeneticOptimizer::with_evaluator(config, evaluator, rng)
    }
}

impl<O, R> GeneticOptimizer<O, R>
where
    O: Objective,
    R: Rng,
{
    /// Creates an optimizer that evaluates fitness on the
    /// calling thread, for objectives that aren't [`Sync`].
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if the configuration
    /// is invalid, or if `config.evaluation_threads` isn't 1.
    ///
    /// # Examples
    /// ```
    /// use oxitune::{GeneBounds, GeneticOptimizer, Infallible, OptimizerConfig};
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use std::cell::Cell;
    ///
    /// let calls = Cell::new(0);
    /// let config = OptimizerConfig {
    ///     population_size: 10,
    ///     chromosome_length: 1,
    ///     gene_bounds: GeneBounds::Uniform(0.0, 10.0),
    ///     mutation_probability: 0.1,
    ///     crossover_probability: 0.7,
    ///     evaluation_threads: 1,
    ///     ..OptimizerConfig::zero()
    /// };
    /// let objective = Infallible(|g: &[f64]| {
    ///     calls.set(calls.get() + 1);
    ///     (g[0] - 5.0).powi(2)
    /// });
    /// let mut optimizer =
    ///     GeneticOptimizer::sequential(config, objective, StdRng::seed_from_u64(3)).unwrap();
    /// optimizer.run(5).unwrap();
    /// assert!(calls.get() > 0);
    /// ```
    pub fn sequential(
        config: OptimizerConfig,
        objective: O,
        rng: R,
    ) -> Result<GeneticOptimizer<O, R>, Error> {
        config.validate()?;
        if config.evaluation_threads != 1 {
            return Err(ConfigurationError::ConcurrentEvaluation(config.evaluation_threads).into());
        }
        GeneticOptimizer::with_evaluator(config, FitnessEvaluator::sequential(objective), rng)
    }

    /// Builds the initial population for an already
    /// validated configuration.
    fn with_evaluator(
        config: OptimizerConfig,
        evaluator: FitnessEvaluator<O>,
        mut rng: R,
    ) -> Result<GeneticOptimizer<O, R>, Error> {
        let population = initialize_population(
            config.population_size,
            config.chromosome_length,
            &config.gene_bounds,
            &mut rng,
        )?;
        log::debug!(
            "initialized population of {} chromosomes with {} genes",
            config.population_size,
            config.chromosome_length
        );
        Ok(GeneticOptimizer {
            config,
            evaluator,
            rng,
            population,
            fitness: None,
            generation: 0,
            phase: Phase::Initialized,
        })
    }

    /// Evolves the population for `generations` generations,
    /// and returns the fittest chromosome of the final population.
    ///
    /// # Errors
    /// See [`run_with`](GeneticOptimizer::run_with).
    pub fn run(&mut self, generations: usize) -> Result<Chromosome, Error> {
        self.run_with(generations, |_| {})
    }

    /// Evolves the population for `generations` generations,
    /// passing each generation's [`Progress`] to `observer`
    /// once it has been evaluated. Returns the fittest chromosome
    /// of the population left after the last generation; ties go
    /// to the earliest chromosome.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::ZeroGenerations`] if
    /// `generations` is zero, or the first evaluation or
    /// selection error. Runs are never resumed past an error.
    pub fn run_with<F>(&mut self, generations: usize, mut observer: F) -> Result<Chromosome, Error>
    where
        F: FnMut(&Progress),
    {
        if generations == 0 {
            return Err(ConfigurationError::ZeroGenerations.into());
        }
        for _ in 0..generations {
            self.advance(&mut observer)?;
        }
        let (best, fitness) = self.fittest()?;
        self.phase = Phase::Terminated;
        log::info!(
            "finished after {} generations: best {} (fitness {:.6}, {} objective evaluations)",
            self.generation,
            best,
            fitness,
            self.evaluator.cache().stats().misses
        );
        Ok(best)
    }

    /// Runs a single generation: evaluates the current
    /// population and replaces it with its offspring.
    /// Returns the generation's progress report.
    ///
    /// # Errors
    /// Returns the first evaluation or selection error.
    pub fn step(&mut self) -> Result<Progress, Error> {
        self.advance(&mut |_: &Progress| {})
    }

    /// Returns the fittest chromosome of the current population
    /// and its fitness, evaluating the population if needed.
    /// The run's [`Phase`] is left unchanged.
    ///
    /// # Errors
    /// Returns the first evaluation error.
    pub fn fittest(&mut self) -> Result<(Chromosome, f64), Error> {
        let phase = self.phase;
        let fitness = self.evaluate();
        self.phase = phase;
        let fitness = fitness?;
        let i = fittest_index(&fitness);
        let best = (self.population[i].clone(), fitness[i]);
        self.fitness = Some(fitness);
        Ok(best)
    }

    fn advance<F>(&mut self, observer: &mut F) -> Result<Progress, Error>
    where
        F: FnMut(&Progress),
    {
        let fitness = self.evaluate()?;

        self.phase = Phase::Reporting;
        let progress = self.report(&fitness);
        log::debug!("{}", progress);
        observer(&progress);

        self.phase = Phase::Breeding;
        self.population = self.breed(&fitness)?;
        self.fitness = None;
        self.generation += 1;
        Ok(progress)
    }

    /// Scores the current population, reusing the last
    /// scores if it hasn't changed since.
    fn evaluate(&mut self) -> Result<Vec<f64>, Error> {
        self.phase = Phase::Evaluating;
        match self.fitness.take() {
            Some(fitness) => Ok(fitness),
            None => self.evaluator.score_population(&self.population),
        }
    }

    fn report(&self, fitness: &[f64]) -> Progress {
        let i = fittest_index(fitness);
        Progress {
            generation: self.generation,
            best: self.population[i].clone(),
            best_fitness: fitness[i],
            fitness: Stats::from(fitness.iter().copied()),
            cache: self.evaluator.cache().stats(),
        }
    }

    /// Generates the next population, two children per
    /// selected pair of parents.
    fn breed(&mut self, fitness: &[f64]) -> Result<Vec<Chromosome>, Error> {
        let wheel = RouletteWheel::new(fitness)?;
        let mut offspring = Vec::with_capacity(self.config.population_size);
        for _ in 0..self.config.population_size / 2 {
            let (parent1, parent2) = wheel.select_pair(&mut self.rng);
            let (child1, child2) = crossover(
                &self.population[parent1],
                &self.population[parent2],
                self.config.crossover_probability,
                &mut self.rng,
            );
            for child in [child1, child2] {
                offspring.push(mutate(
                    &child,
                    &self.config.gene_bounds,
                    self.config.mutation_probability,
                    &mut self.rng,
                ));
            }
        }
        Ok(offspring)
    }

    /// Returns the current population.
    pub fn population(&self) -> &[Chromosome] {
        &self.population
    }

    /// Returns the number of generations bred so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Returns the current stage of the run.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the optimizer's configuration.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Returns the fitness evaluator, and through it
    /// the fitness cache and objective.
    pub fn evaluator(&self) -> &FitnessEvaluator<O> {
        &self.evaluator
    }
}

/// Index of the first maximum fitness value.
fn fittest_index(fitness: &[f64]) -> usize {
    let mut best = 0;
    for (i, f) in fitness.iter().enumerate().skip(1) {
        if *f > fitness[best] {
            best = i;
        }
    }
    best
}
