//! Fitness-proportional parent selection.
use crate::optimizer::Error;
use crate::Chromosome;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// A selection distribution in which each individual's
/// probability is its share of the total fitness.
#[derive(Clone, Debug)]
pub struct RouletteWheel {
    index: WeightedIndex<f64>,
}

impl RouletteWheel {
    /// Builds the distribution from a population's fitness values.
    ///
    /// # Errors
    /// Returns [`Error::DegenerateFitness`] if the fitness sum
    /// is zero or non-finite, or if any value is negative.
    ///
    /// # Examples
    /// ```
    /// use oxitune::selection::RouletteWheel;
    ///
    /// assert!(RouletteWheel::new(&[1.0, 3.0]).is_ok());
    /// assert!(RouletteWheel::new(&[0.0, 0.0]).is_err());
    /// assert!(RouletteWheel::new(&[1.0, f64::INFINITY]).is_err());
    /// ```
    pub fn new(fitness: &[f64]) -> Result<RouletteWheel, Error> {
        let total: f64 = fitness.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(Error::DegenerateFitness { total });
        }
        WeightedIndex::new(fitness)
            .map(|index| RouletteWheel { index })
            .map_err(|_| Error::DegenerateFitness { total })
    }

    /// Draws one individual's index.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.index.sample(rng)
    }

    /// Draws two indices independently, with replacement.
    /// Both may refer to the same individual.
    pub fn select_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> (usize, usize) {
        (self.select(rng), self.select(rng))
    }
}

/// Draws a pair of parents from the population, each
/// with probability proportional to its fitness.
///
/// `fitness` must be aligned by index with `population`.
/// Builds a [`RouletteWheel`] on every call; use one
/// directly when drawing several pairs from the same
/// generation.
///
/// # Errors
/// Returns [`Error::DegenerateFitness`] if no selection
/// distribution can be built from `fitness`.
///
/// # Examples
/// ```
/// use oxitune::{selection::select_parents, Chromosome};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let population = vec![Chromosome::new(vec![1.0]), Chromosome::new(vec![2.0])];
/// let mut rng = StdRng::seed_from_u64(0);
/// // Only the second individual can be chosen.
/// let (a, b) = select_parents(&population, &[0.0, 4.0], &mut rng).unwrap();
/// assert_eq!((a[0], b[0]), (2.0, 2.0));
/// ```
pub fn select_parents<'a, R: Rng + ?Sized>(
    population: &'a [Chromosome],
    fitness: &[f64],
    rng: &mut R,
) -> Result<(&'a Chromosome, &'a Chromosome), Error> {
    debug_assert_eq!(population.len(), fitness.len());
    let (a, b) = RouletteWheel::new(fitness)?.select_pair(rng);
    Ok((&population[a], &population[b]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn dominant_individual_is_almost_always_chosen() {
        let mut fitness = vec![1e-9; 19];
        fitness.push(100.0);
        let wheel = RouletteWheel::new(&fitness).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        const DRAWS: usize = 10_000;
        let chosen = (0..DRAWS)
            .map(|_| wheel.select_pair(&mut rng))
            .filter(|(a, b)| *a == 19 && *b == 19)
            .count();
        assert!(chosen as f64 > DRAWS as f64 * 0.99, "chosen {} times", chosen);
    }

    #[test]
    fn selection_frequency_is_proportional() {
        let wheel = RouletteWheel::new(&[1.0, 2.0, 7.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mut counts = [0usize; 3];
        const DRAWS: usize = 30_000;
        for _ in 0..DRAWS {
            counts[wheel.select(&mut rng)] += 1;
        }
        for (count, expected) in counts.iter().zip([0.1, 0.2, 0.7]) {
            let share = *count as f64 / DRAWS as f64;
            assert!((share - expected).abs() < 0.02, "{:?}", counts);
        }
    }

    #[test]
    fn same_individual_may_be_both_parents() {
        let population = vec![Chromosome::new(vec![3.0, 1.0, 4.0])];
        let mut rng = StdRng::seed_from_u64(9);
        let (a, b) = select_parents(&population, &[2.0], &mut rng).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_fitness() {
        for fitness in [
            vec![0.0, 0.0, 0.0],
            vec![],
            vec![1.0, f64::NAN],
            vec![f64::INFINITY, 1.0],
            vec![f64::MAX, f64::MAX],
        ] {
            assert!(
                matches!(
                    RouletteWheel::new(&fitness),
                    Err(Error::DegenerateFitness { .. })
                ),
                "{:?}",
                fitness
            );
        }
        assert!(matches!(
            RouletteWheel::new(&[2.0, -1.0]),
            Err(Error::DegenerateFitness { total }) if total == 1.0
        ));
    }
}
