//! Conversion of objective costs into fitness values,
//! memoized per chromosome and optionally computed
//! on a pool of worker threads.
use crate::chromosome::{Chromosome, ChromosomeKey};
use crate::optimizer::Error;
use crate::Objective;

use ahash::AHashMap;
use rayon::prelude::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Offset added to costs before inversion, so that
/// a zero cost maps to a finite fitness.
pub const COST_EPSILON: f64 = 1e-6;

/// Converts a cost into a fitness value: `1 / (cost + ε)`.
///
/// Lower costs give higher fitness. An infinite cost
/// gives a fitness of zero.
///
/// # Errors
/// Returns [`Error::InvalidCost`] if the cost is negative or NaN.
///
/// # Examples
/// ```
/// use oxitune::fitness::{fitness_from_cost, COST_EPSILON};
///
/// assert_eq!(fitness_from_cost(0.0).unwrap(), 1.0 / COST_EPSILON);
/// assert!(fitness_from_cost(1.0).unwrap() > fitness_from_cost(2.0).unwrap());
/// assert_eq!(fitness_from_cost(f64::INFINITY).unwrap(), 0.0);
/// assert!(fitness_from_cost(-1.0).is_err());
/// ```
pub fn fitness_from_cost(cost: f64) -> Result<f64, Error> {
    if cost.is_nan() || cost < 0.0 {
        return Err(Error::InvalidCost { cost });
    }
    Ok(1.0 / (cost + COST_EPSILON))
}

/// Counters describing fitness cache usage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: usize,
    /// Lookups that required an objective evaluation.
    pub misses: usize,
    /// Distinct chromosomes stored.
    pub entries: usize,
}

/// A store of previously computed fitness values,
/// keyed by exact chromosome value.
///
/// Entries are never evicted or overwritten.
#[derive(Debug, Default)]
pub struct FitnessCache {
    entries: Mutex<AHashMap<ChromosomeKey, f64>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl FitnessCache {
    /// Returns the cached fitness of the chromosome, if any.
    ///
    /// Doesn't affect [hit/miss counters].
    ///
    /// [hit/miss counters]: FitnessCache::stats
    pub fn get(&self, chromosome: &Chromosome) -> Option<f64> {
        self.lock().get(&chromosome.key()).copied()
    }

    /// Returns the number of distinct chromosomes cached.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns the cache's usage counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    fn lookup(&self, key: &ChromosomeKey) -> Option<f64> {
        let cached = self.lock().get(key).copied();
        match cached {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        cached
    }

    /// Stores a fitness, returning the value held for the
    /// key afterwards. If another worker stored the same key
    /// first, its value is kept.
    fn insert(&self, key: ChromosomeKey, fitness: f64) -> f64 {
        *self.lock().entry(key).or_insert(fitness)
    }

    fn lock(&self) -> MutexGuard<'_, AHashMap<ChromosomeKey, f64>> {
        // Not held across objective calls, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scores chromosomes through an objective function.
///
/// Owns the fitness cache and, if configured for more
/// than one thread, the worker pool used by
/// [`score_population`]. Both live as long as the
/// evaluator.
///
/// [`score_population`]: FitnessEvaluator::score_population
pub struct FitnessEvaluator<O> {
    objective: O,
    cache: FitnessCache,
    pool: Option<rayon::ThreadPool>,
    // Chosen at construction, where `O: Sync` is known.
    score_all: fn(&FitnessEvaluator<O>, &[Chromosome]) -> Result<Vec<f64>, Error>,
}

impl<O> FitnessEvaluator<O>
where
    O: Objective + Sync,
{
    /// Creates an evaluator for the objective.
    ///
    /// `threads` sets the number of evaluation workers:
    /// 0 uses one per logical CPU, 1 evaluates sequentially
    /// on the calling thread without a pool.
    ///
    /// # Errors
    /// Returns [`Error::WorkerPool`] if the worker threads
    /// can't be spawned.
    ///
    /// # Examples
    /// ```
    /// use oxitune::{fitness::FitnessEvaluator, Chromosome, Infallible};
    ///
    /// let evaluator = FitnessEvaluator::new(Infallible(|g: &[f64]| g[0].abs()), 1).unwrap();
    /// let fitness = evaluator.score(&Chromosome::new(vec![1.0])).unwrap();
    /// assert!((fitness - 1.0 / (1.0 + 1e-6)).abs() < 1e-12);
    /// ```
    pub fn new(objective: O, threads: usize) -> Result<FitnessEvaluator<O>, Error> {
        if threads == 1 {
            return Ok(FitnessEvaluator::sequential(objective));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("oxitune-eval-{}", i))
            .build()?;
        log::debug!(
            "started fitness evaluation pool with {} workers",
            pool.current_num_threads()
        );
        Ok(FitnessEvaluator {
            objective,
            cache: FitnessCache::default(),
            pool: Some(pool),
            score_all: FitnessEvaluator::score_parallel,
        })
    }

    fn score_parallel(&self, population: &[Chromosome]) -> Result<Vec<f64>, Error> {
        match &self.pool {
            Some(pool) => pool.install(|| {
                population
                    .par_iter()
                    .map(|chromosome| self.score(chromosome))
                    .collect()
            }),
            None => self.score_sequential(population),
        }
    }
}

impl<O: Objective> FitnessEvaluator<O> {
    /// Creates an evaluator that scores every chromosome
    /// on the calling thread.
    ///
    /// Unlike [`new`](FitnessEvaluator::new), the objective
    /// doesn't need to be shareable between threads.
    ///
    /// # Examples
    /// ```
    /// use oxitune::{fitness::FitnessEvaluator, Chromosome, Infallible};
    /// use std::cell::Cell;
    ///
    /// let calls = Cell::new(0);
    /// let evaluator = FitnessEvaluator::sequential(Infallible(|g: &[f64]| {
    ///     calls.set(calls.get() + 1);
    ///     g[0]
    /// }));
    /// let population = vec![Chromosome::new(vec![2.0]); 4];
    /// evaluator.score_population(&population).unwrap();
    /// assert_eq!(calls.get(), 1);
    /// ```
    pub fn sequential(objective: O) -> FitnessEvaluator<O> {
        FitnessEvaluator {
            objective,
            cache: FitnessCache::default(),
            pool: None,
            score_all: FitnessEvaluator::score_sequential,
        }
    }

    /// Returns the fitness of a chromosome.
    ///
    /// The objective is only invoked if the chromosome's
    /// exact value isn't cached.
    ///
    /// # Errors
    /// Returns [`Error::Objective`] if the objective fails,
    /// or [`Error::InvalidCost`] if its cost is negative or NaN.
    /// Failures are not cached.
    pub fn score(&self, chromosome: &Chromosome) -> Result<f64, Error> {
        let key = chromosome.key();
        if let Some(fitness) = self.cache.lookup(&key) {
            return Ok(fitness);
        }
        let cost = self
            .objective
            .cost(chromosome.genes())
            .map_err(|e| Error::Objective(Box::new(e)))?;
        let fitness = fitness_from_cost(cost)?;
        Ok(self.cache.insert(key, fitness))
    }

    /// Returns the fitness of each chromosome, in the
    /// same order as `population`.
    ///
    /// Chromosomes are scored concurrently if the evaluator
    /// has a worker pool. Returns once all are scored.
    ///
    /// # Errors
    /// Returns the first objective failure encountered;
    /// no chromosome is skipped or given a placeholder fitness.
    ///
    /// # Examples
    /// ```
    /// use oxitune::{fitness::FitnessEvaluator, Chromosome, Infallible};
    ///
    /// let evaluator = FitnessEvaluator::new(Infallible(|g: &[f64]| g[0]), 4).unwrap();
    /// let population: Vec<_> = (0..8).map(|i| Chromosome::new(vec![i as f64])).collect();
    /// let fitness = evaluator.score_population(&population).unwrap();
    /// assert!(fitness.windows(2).all(|w| w[0] > w[1]));
    /// ```
    pub fn score_population(&self, population: &[Chromosome]) -> Result<Vec<f64>, Error> {
        (self.score_all)(self, population)
    }

    fn score_sequential(&self, population: &[Chromosome]) -> Result<Vec<f64>, Error> {
        population
            .iter()
            .map(|chromosome| self.score(chromosome))
            .collect()
    }

    /// Returns `true` if the evaluator scores
    /// populations on a worker pool.
    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Returns the fitness cache.
    pub fn cache(&self) -> &FitnessCache {
        &self.cache
    }

    /// Returns the objective function.
    pub fn objective(&self) -> &O {
        &self.objective
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Infallible;

    use rand::{rngs::StdRng, Rng, SeedableRng};

    use std::cell::RefCell;
    use std::fmt;
    use std::thread;
    use std::time::Duration;

    #[derive(Debug)]
    struct SimulationDiverged(f64);

    impl fmt::Display for SimulationDiverged {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "simulation diverged at gain {}", self.0)
        }
    }

    impl std::error::Error for SimulationDiverged {}

    #[test]
    fn score_is_memoized() {
        let calls = AtomicUsize::new(0);
        let evaluator = FitnessEvaluator::new(
            Infallible(|g: &[f64]| {
                calls.fetch_add(1, Ordering::SeqCst);
                g.iter().map(|x| x * x).sum()
            }),
            1,
        )
        .unwrap();
        let c = Chromosome::new(vec![1.0, 2.0, 3.0]);

        let first = evaluator.score(&c).unwrap();
        let second = evaluator.score(&c.clone()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, 1.0 / (14.0 + COST_EPSILON));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            evaluator.cache().stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                entries: 1
            }
        );
        assert_eq!(evaluator.cache().get(&c), Some(first));
    }

    #[test]
    fn near_duplicates_miss() {
        let calls = AtomicUsize::new(0);
        let evaluator = FitnessEvaluator::new(
            Infallible(|g: &[f64]| {
                calls.fetch_add(1, Ordering::SeqCst);
                g[0]
            }),
            1,
        )
        .unwrap();
        evaluator.score(&Chromosome::new(vec![1.0])).unwrap();
        evaluator
            .score(&Chromosome::new(vec![1.0 + f64::EPSILON]))
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(evaluator.cache().len(), 2);
    }

    #[test]
    fn zero_cost_is_finite() {
        let evaluator = FitnessEvaluator::new(Infallible(|_: &[f64]| 0.0), 1).unwrap();
        let fitness = evaluator.score(&Chromosome::new(vec![0.0])).unwrap();
        assert!(fitness.is_finite());
        assert_eq!(fitness, 1.0 / COST_EPSILON);
    }

    #[test]
    fn population_order_is_preserved_under_concurrency() {
        let mut rng = StdRng::seed_from_u64(42);
        let delays: Vec<u64> = (0..64).map(|_| rng.gen_range(0..5)).collect();
        let evaluator = FitnessEvaluator::new(
            Infallible(|g: &[f64]| {
                thread::sleep(Duration::from_millis(delays[g[0] as usize]));
                g[0]
            }),
            8,
        )
        .unwrap();
        let population: Vec<_> = (0..64).map(|i| Chromosome::new(vec![i as f64])).collect();

        let fitness = evaluator.score_population(&population).unwrap();

        assert_eq!(fitness.len(), population.len());
        for (c, f) in population.iter().zip(&fitness) {
            assert_eq!(*f, 1.0 / (c[0] + COST_EPSILON));
        }
    }

    #[test]
    fn duplicates_in_population_share_fitness() {
        let calls = AtomicUsize::new(0);
        let evaluator = FitnessEvaluator::new(
            Infallible(|g: &[f64]| {
                calls.fetch_add(1, Ordering::SeqCst);
                g[0] + g[1]
            }),
            4,
        )
        .unwrap();
        let population = vec![Chromosome::new(vec![1.0, 2.0]); 10];
        let fitness = evaluator.score_population(&population).unwrap();
        assert!(fitness.iter().all(|f| *f == fitness[0]));
        assert_eq!(evaluator.cache().len(), 1);
        // Rescoring is answered from the cache.
        let before = calls.load(Ordering::SeqCst);
        evaluator.score_population(&population).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), before);
    }

    #[test]
    fn objective_failure_propagates() {
        let evaluator = FitnessEvaluator::new(
            |g: &[f64]| {
                if g[0] > 5.0 {
                    Err(SimulationDiverged(g[0]))
                } else {
                    Ok(g[0])
                }
            },
            4,
        )
        .unwrap();
        let population: Vec<_> = (0..10).map(|i| Chromosome::new(vec![i as f64])).collect();

        match evaluator.score_population(&population) {
            Err(Error::Objective(e)) => {
                let e = e.downcast_ref::<SimulationDiverged>().unwrap();
                assert!(e.0 > 5.0);
            }
            other => panic!("expected objective failure, got {:?}", other),
        }
        assert!(evaluator
            .cache()
            .get(&Chromosome::new(vec![9.0]))
            .is_none());
    }

    #[test]
    fn sequential_evaluator_accepts_thread_unsafe_objectives() {
        let calls = RefCell::new(vec![]);
        let evaluator = FitnessEvaluator::sequential(Infallible(|g: &[f64]| {
            calls.borrow_mut().push(g[0]);
            g[0]
        }));
        let population: Vec<_> = [3.0, 1.0, 3.0, 2.0]
            .iter()
            .map(|g| Chromosome::new(vec![*g]))
            .collect();

        let fitness = evaluator.score_population(&population).unwrap();

        assert!(!evaluator.is_parallel());
        assert_eq!(fitness[0], fitness[2]);
        assert!(fitness[1] > fitness[3] && fitness[3] > fitness[0]);
        // Scored in population order, duplicates from the cache.
        assert_eq!(*calls.borrow(), [3.0, 1.0, 2.0]);
    }

    #[test]
    fn single_thread_means_no_pool() {
        let single = FitnessEvaluator::new(Infallible(|g: &[f64]| g[0]), 1).unwrap();
        let pooled = FitnessEvaluator::new(Infallible(|g: &[f64]| g[0]), 2).unwrap();
        assert!(!single.is_parallel());
        assert!(pooled.is_parallel());
    }

    #[test]
    fn invalid_costs_are_rejected() {
        let evaluator = FitnessEvaluator::new(Infallible(|g: &[f64]| g[0]), 1).unwrap();
        assert!(matches!(
            evaluator.score(&Chromosome::new(vec![-1.0])),
            Err(Error::InvalidCost { cost }) if cost == -1.0
        ));
        assert!(matches!(
            evaluator.score(&Chromosome::new(vec![f64::NAN])),
            Err(Error::InvalidCost { .. })
        ));
    }
}
