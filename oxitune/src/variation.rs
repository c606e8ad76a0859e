//! Crossover and mutation operators.
//!
//! Both operators return new chromosomes and leave
//! their inputs untouched.
use crate::rng::{chance, uniform};
use crate::{Chromosome, GeneBounds};

use rand::Rng;

/// Single-point crossover.
///
/// With probability `crossover_probability`, a cut point is
/// drawn uniformly from `1..len` and the parents' tails are
/// swapped (see [`crossover_at`]). Otherwise the parents are
/// returned unchanged. Chromosomes with fewer than two genes
/// have no interior cut point, and are always returned unchanged.
///
/// # Examples
/// ```
/// use oxitune::{variation::crossover, Chromosome};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let a = Chromosome::new(vec![1.0, 1.0, 1.0]);
/// let b = Chromosome::new(vec![2.0, 2.0, 2.0]);
/// let mut rng = StdRng::seed_from_u64(0);
///
/// let (c, d) = crossover(&a, &b, 0.0, &mut rng);
/// assert_eq!((c, d), (a, b));
/// ```
pub fn crossover<R: Rng + ?Sized>(
    parent1: &Chromosome,
    parent2: &Chromosome,
    crossover_probability: f64,
    rng: &mut R,
) -> (Chromosome, Chromosome) {
    let len = parent1.len().min(parent2.len());
    if len >= 2 && chance(rng, crossover_probability) {
        let cut = rng.gen_range(1..len);
        crossover_at(parent1, parent2, cut)
    } else {
        (parent1.clone(), parent2.clone())
    }
}

/// Swaps the parents' genes from `cut` onwards.
///
/// The first child takes `parent1[..cut]` followed by
/// `parent2[cut..]`; the second child the reverse.
///
/// # Panics
/// Panics if `cut` is greater than either parent's length.
///
/// # Examples
/// ```
/// use oxitune::{variation::crossover_at, Chromosome};
///
/// let a = Chromosome::new(vec![1.0, 2.0, 3.0]);
/// let b = Chromosome::new(vec![4.0, 5.0, 6.0]);
///
/// let (c, d) = crossover_at(&a, &b, 1);
/// assert_eq!(c.genes(), &[1.0, 5.0, 6.0]);
/// assert_eq!(d.genes(), &[4.0, 2.0, 3.0]);
/// ```
pub fn crossover_at(
    parent1: &Chromosome,
    parent2: &Chromosome,
    cut: usize,
) -> (Chromosome, Chromosome) {
    let (head1, tail1) = parent1.genes().split_at(cut);
    let (head2, tail2) = parent2.genes().split_at(cut);
    (
        Chromosome::new([head1, tail2].concat()),
        Chromosome::new([head2, tail1].concat()),
    )
}

/// Per-gene resampling mutation.
///
/// Each gene is independently replaced, with probability
/// `mutation_probability`, by a fresh uniform draw from its
/// interval in `bounds`. Other genes are copied exactly.
///
/// # Examples
/// ```
/// use oxitune::{variation::mutate, Chromosome, GeneBounds};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let bounds = GeneBounds::Uniform(0.0, 1.0);
/// let original = Chromosome::new(vec![0.25, 0.5, 0.75]);
/// let mut rng = StdRng::seed_from_u64(0);
///
/// assert_eq!(mutate(&original, &bounds, 0.0, &mut rng), original);
/// assert!(bounds.contains(&mutate(&original, &bounds, 1.0, &mut rng)));
/// ```
pub fn mutate<R: Rng + ?Sized>(
    chromosome: &Chromosome,
    bounds: &GeneBounds,
    mutation_probability: f64,
    rng: &mut R,
) -> Chromosome {
    Chromosome::new(
        chromosome
            .genes()
            .iter()
            .enumerate()
            .map(|(i, gene)| match bounds.get(i) {
                Some(interval) if chance(rng, mutation_probability) => uniform(rng, interval),
                _ => *gene,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn parents() -> (Chromosome, Chromosome) {
        (
            Chromosome::new(vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            Chromosome::new(vec![-1.0, -2.0, -3.0, -4.0, -5.0]),
        )
    }

    #[test]
    fn crossover_at_every_cut() {
        let (a, b) = parents();
        for cut in 1..a.len() {
            let (c, d) = crossover_at(&a, &b, cut);
            assert_eq!(&c.genes()[..cut], &a.genes()[..cut]);
            assert_eq!(&c.genes()[cut..], &b.genes()[cut..]);
            assert_eq!(&d.genes()[..cut], &b.genes()[..cut]);
            assert_eq!(&d.genes()[cut..], &a.genes()[cut..]);
        }
    }

    #[test]
    fn certain_crossover_always_mixes_parents() {
        let (a, b) = parents();
        let mut rng = StdRng::seed_from_u64(17);
        let mut cuts_seen = [false; 5];
        for _ in 0..1000 {
            let (c, d) = crossover(&a, &b, 1.0, &mut rng);
            assert_ne!(c, a);
            assert_ne!(c, b);
            assert_ne!(d, a);
            assert_ne!(d, b);
            let cut = c.genes().iter().take_while(|g| **g > 0.0).count();
            assert!((1..5).contains(&cut));
            assert_eq!((c.clone(), d.clone()), crossover_at(&a, &b, cut));
            cuts_seen[cut] = true;
        }
        assert_eq!(cuts_seen, [false, true, true, true, true]);
    }

    #[test]
    fn impossible_crossover_is_pass_through() {
        let (a, b) = parents();
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..1000 {
            assert_eq!(crossover(&a, &b, 0.0, &mut rng), (a.clone(), b.clone()));
        }
    }

    #[test]
    fn single_gene_crossover_is_pass_through() {
        let a = Chromosome::new(vec![1.0]);
        let b = Chromosome::new(vec![2.0]);
        let mut rng = StdRng::seed_from_u64(29);
        assert_eq!(crossover(&a, &b, 1.0, &mut rng), (a, b));
    }

    #[test]
    fn impossible_mutation_keeps_exact_values() {
        let bounds = GeneBounds::PerGene(vec![(0.0, 100.0), (0.0, 10.0), (0.0, 50.0)]);
        let original = Chromosome::new(vec![0.1 + 0.2, 1.0 / 3.0, 49.999999]);
        let mut rng = StdRng::seed_from_u64(31);
        for _ in 0..1000 {
            let mutated = mutate(&original, &bounds, 0.0, &mut rng);
            assert_eq!(mutated.key(), original.key());
        }
    }

    #[test]
    fn certain_mutation_redraws_every_gene() {
        let bounds = GeneBounds::PerGene(vec![(0.0, 100.0), (0.0, 10.0), (0.0, 50.0)]);
        // Values outside the bounds can only survive if a gene isn't redrawn.
        let original = Chromosome::new(vec![-1.0, -1.0, -1.0]);
        let mut rng = StdRng::seed_from_u64(37);
        for _ in 0..1000 {
            let mutated = mutate(&original, &bounds, 1.0, &mut rng);
            assert!(bounds.contains(&mutated), "{}", mutated);
        }
    }

    #[test]
    fn partial_mutation_rate() {
        let bounds = GeneBounds::Uniform(10.0, 20.0);
        let original = Chromosome::new(vec![0.0; 100]);
        let mut rng = StdRng::seed_from_u64(41);
        let mutated = (0..100)
            .map(|_| mutate(&original, &bounds, 0.3, &mut rng))
            .flat_map(|c| c.into_genes())
            .filter(|g| *g != 0.0)
            .count();
        let rate = mutated as f64 / 10_000.0;
        assert!((rate - 0.3).abs() < 0.03, "observed rate {}", rate);
    }
}
