//! Chromosomes are fixed-length vectors of real-valued
//! genes, each constrained to a closed interval given
//! by the optimizer's [`GeneBounds`].
use crate::optimizer::ConfigurationError;
use crate::rng::uniform;

use rand::Rng;
use serde::{Deserialize, Serialize};

use std::fmt;
use std::ops::Index;

/// A candidate solution: one real value per tunable gene.
///
/// Chromosomes are never modified once built. Crossover
/// and mutation produce new chromosomes instead, so that
/// a chromosome's value always matches its cached fitness.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chromosome(Vec<f64>);

/// Exact-value key of a chromosome, used for memoization.
///
/// Genes are compared by bit pattern, so only bit-identical
/// chromosomes share a key. Near-duplicates never do, and
/// `0.0` and `-0.0` are distinct.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct ChromosomeKey(Box<[u64]>);

impl Chromosome {
    /// Creates a chromosome from a vector of genes.
    ///
    /// # Examples
    /// ```
    /// use oxitune::Chromosome;
    ///
    /// let gains = Chromosome::new(vec![50.0, 1.0, 10.0]);
    /// assert_eq!(gains.len(), 3);
    /// assert_eq!(gains[2], 10.0);
    /// ```
    pub fn new(genes: Vec<f64>) -> Chromosome {
        Chromosome(genes)
    }

    /// Returns the chromosome's genes.
    pub fn genes(&self) -> &[f64] {
        &self.0
    }

    /// Returns the number of genes in the chromosome.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the chromosome has no genes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the chromosome, returning its genes.
    pub fn into_genes(self) -> Vec<f64> {
        self.0
    }

    pub(crate) fn key(&self) -> ChromosomeKey {
        ChromosomeKey(self.0.iter().map(|g| g.to_bits()).collect())
    }
}

impl From<Vec<f64>> for Chromosome {
    fn from(genes: Vec<f64>) -> Chromosome {
        Chromosome(genes)
    }
}

impl Index<usize> for Chromosome {
    type Output = f64;

    fn index(&self, gene: usize) -> &f64 {
        &self.0[gene]
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, gene) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", gene)?;
        }
        write!(f, "]")
    }
}

/// Closed intervals from which gene values are drawn,
/// and to which they are confined.
///
/// # Note
/// Bounds must be finite and satisfy `min <= max`;
/// this is checked by [`GeneBounds::validate`] when
/// an optimizer is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GeneBounds {
    /// The same `(min, max)` interval for every gene.
    Uniform(f64, f64),
    /// One `(min, max)` interval per gene, in gene order.
    PerGene(Vec<(f64, f64)>),
}

impl GeneBounds {
    /// Checks that the bounds are well-formed for
    /// chromosomes of `chromosome_length` genes.
    ///
    /// # Errors
    /// Returns an error if the length is zero, if
    /// per-gene bounds don't match the length, or if any
    /// interval is inverted or not finite.
    ///
    /// # Examples
    /// ```
    /// use oxitune::GeneBounds;
    ///
    /// let bounds = GeneBounds::PerGene(vec![(0.0, 100.0), (0.0, 10.0), (0.0, 50.0)]);
    /// assert!(bounds.validate(3).is_ok());
    /// assert!(bounds.validate(2).is_err());
    /// assert!(GeneBounds::Uniform(1.0, 0.0).validate(3).is_err());
    /// ```
    pub fn validate(&self, chromosome_length: usize) -> Result<(), ConfigurationError> {
        if chromosome_length == 0 {
            return Err(ConfigurationError::EmptyChromosome);
        }
        if let GeneBounds::PerGene(pairs) = self {
            if pairs.len() != chromosome_length {
                return Err(ConfigurationError::BoundsArityMismatch {
                    expected: chromosome_length,
                    found: pairs.len(),
                });
            }
        }
        for gene in 0..chromosome_length {
            let (min, max) = self.interval(gene);
            if !min.is_finite() || !max.is_finite() {
                return Err(ConfigurationError::NonFiniteBounds { gene, min, max });
            }
            if min > max {
                return Err(ConfigurationError::InvertedBounds { gene, min, max });
            }
        }
        Ok(())
    }

    /// Returns the interval of the specified gene, or
    /// `None` if per-gene bounds don't cover it.
    ///
    /// # Examples
    /// ```
    /// use oxitune::GeneBounds;
    ///
    /// assert_eq!(GeneBounds::Uniform(-1.0, 1.0).get(7), Some((-1.0, 1.0)));
    /// assert_eq!(GeneBounds::PerGene(vec![(0.0, 2.0)]).get(1), None);
    /// ```
    pub fn get(&self, gene: usize) -> Option<(f64, f64)> {
        match self {
            GeneBounds::Uniform(min, max) => Some((*min, *max)),
            GeneBounds::PerGene(pairs) => pairs.get(gene).copied(),
        }
    }

    /// Interval of a gene already known to be covered.
    pub(crate) fn interval(&self, gene: usize) -> (f64, f64) {
        match self {
            GeneBounds::Uniform(min, max) => (*min, *max),
            GeneBounds::PerGene(pairs) => pairs[gene],
        }
    }

    /// Draws a chromosome of `chromosome_length` genes,
    /// each uniformly from its interval.
    pub(crate) fn sample<R: Rng + ?Sized>(
        &self,
        chromosome_length: usize,
        rng: &mut R,
    ) -> Chromosome {
        Chromosome(
            (0..chromosome_length)
                .map(|gene| uniform(rng, self.interval(gene)))
                .collect(),
        )
    }

    /// Returns `true` if every gene of the chromosome
    /// lies within its interval.
    ///
    /// # Examples
    /// ```
    /// use oxitune::{Chromosome, GeneBounds};
    ///
    /// let bounds = GeneBounds::Uniform(0.0, 10.0);
    /// assert!(bounds.contains(&Chromosome::new(vec![0.0, 10.0])));
    /// assert!(!bounds.contains(&Chromosome::new(vec![5.0, 10.5])));
    /// ```
    pub fn contains(&self, chromosome: &Chromosome) -> bool {
        chromosome
            .genes()
            .iter()
            .enumerate()
            .all(|(i, g)| match self.get(i) {
                Some((min, max)) => (min..=max).contains(g),
                None => false,
            })
    }

    /// Returns a copy of the chromosome with every gene
    /// moved to the nearest point of its interval.
    ///
    /// Genes without a covering interval are kept as-is.
    ///
    /// # Examples
    /// ```
    /// use oxitune::{Chromosome, GeneBounds};
    ///
    /// let bounds = GeneBounds::PerGene(vec![(0.0, 100.0), (0.0, 10.0), (0.0, 50.0)]);
    /// let clamped = bounds.clamp(&Chromosome::new(vec![-3.0, 4.0, 75.0]));
    /// assert_eq!(clamped.genes(), &[0.0, 4.0, 50.0]);
    /// ```
    pub fn clamp(&self, chromosome: &Chromosome) -> Chromosome {
        Chromosome(
            chromosome
                .genes()
                .iter()
                .enumerate()
                .map(|(i, g)| match self.get(i) {
                    Some((min, max)) => g.max(min).min(max),
                    None => *g,
                })
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn key_is_exact() {
        let a = Chromosome::new(vec![1.0, 2.0, 3.0]);
        let b = Chromosome::new(vec![1.0, 2.0, 3.0]);
        let c = Chromosome::new(vec![1.0, 2.0, 3.0 + f64::EPSILON * 4.0]);
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
        assert_ne!(
            Chromosome::new(vec![0.0]).key(),
            Chromosome::new(vec![-0.0]).key()
        );
    }

    #[test]
    fn sample_respects_per_gene_bounds() {
        let bounds = GeneBounds::PerGene(vec![(0.0, 100.0), (0.0, 10.0), (0.0, 50.0)]);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..500 {
            let c = bounds.sample(3, &mut rng);
            assert_eq!(c.len(), 3);
            assert!(bounds.contains(&c), "{} out of bounds", c);
        }
    }

    #[test]
    fn validate_rejects_bad_bounds() {
        assert_eq!(
            GeneBounds::Uniform(0.0, 1.0).validate(0),
            Err(ConfigurationError::EmptyChromosome)
        );
        assert_eq!(
            GeneBounds::PerGene(vec![(0.0, 1.0); 2]).validate(3),
            Err(ConfigurationError::BoundsArityMismatch {
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            GeneBounds::PerGene(vec![(0.0, 1.0), (2.0, 1.0)]).validate(2),
            Err(ConfigurationError::InvertedBounds {
                gene: 1,
                min: 2.0,
                max: 1.0
            })
        );
        assert!(matches!(
            GeneBounds::Uniform(0.0, f64::INFINITY).validate(1),
            Err(ConfigurationError::NonFiniteBounds { gene: 0, .. })
        ));
        assert!(GeneBounds::Uniform(2.0, 2.0).validate(4).is_ok());
    }

    #[test]
    fn display() {
        assert_eq!(
            Chromosome::new(vec![1.5, -2.0, 0.25]).to_string(),
            "[1.5, -2, 0.25]"
        );
    }
}
