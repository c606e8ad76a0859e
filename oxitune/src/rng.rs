use rand::Rng;

/// Returns `true` with the given probability.
///
/// Draws from `[0, 1)`, so a probability of 0
/// never succeeds and a probability of 1 always
/// does, unlike `Rng::gen_bool` which panics
/// outside the unit interval.
pub(crate) fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    rng.gen::<f64>() < probability
}

/// Draws a value uniformly from `[min, max]`.
///
/// Degenerate intervals (`min == max`) always
/// yield `min`. Finite intervals too wide for
/// `max - min` to be finite are sampled by
/// interpolating between the endpoints.
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, (min, max): (f64, f64)) -> f64 {
    if min == max {
        min
    } else if (max - min).is_finite() {
        rng.gen_range(min..=max)
    } else {
        // Only reachable with min < 0 < max, so neither term overflows.
        let t: f64 = rng.gen();
        (min * (1.0 - t) + max * t).clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn chance_extremes() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(!chance(&mut rng, 0.0));
            assert!(chance(&mut rng, 1.0));
        }
    }

    #[test]
    fn uniform_stays_in_interval() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            let x = uniform(&mut rng, (-2.5, 4.0));
            assert!((-2.5..=4.0).contains(&x));
        }
        assert_eq!(uniform(&mut rng, (3.0, 3.0)), 3.0);
    }

    #[test]
    fn uniform_handles_intervals_wider_than_f64() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut signs = (false, false);
        for _ in 0..1000 {
            for interval in [(-1e308, 1e308), (f64::MIN, f64::MAX)] {
                let x = uniform(&mut rng, interval);
                assert!(x.is_finite());
                assert!((interval.0..=interval.1).contains(&x));
                if x < 0.0 {
                    signs.0 = true;
                } else {
                    signs.1 = true;
                }
            }
        }
        assert_eq!(signs, (true, true));
    }
}
