use std::convert;
use std::error::Error;

/// An interface for cost functions that can be
/// minimized by the optimizer.
///
/// Implementations must be deterministic and free of
/// side effects: costs are memoized per chromosome, so
/// a chromosome is only ever evaluated once. Lower costs
/// are better, and should be non-negative.
///
/// Closures of the form `Fn(&[f64]) -> Result<f64, E>`
/// implement this trait directly. Infallible closures can
/// be wrapped in [`Infallible`].
///
/// # Examples
/// ```
/// use oxitune::Objective;
///
/// #[derive(Debug)]
/// struct Unstable;
///
/// impl std::fmt::Display for Unstable {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "closed loop is unstable")
///     }
/// }
///
/// impl std::error::Error for Unstable {}
///
/// let objective = |gains: &[f64]| {
///     if gains[0] < 1.0 {
///         Err(Unstable)
///     } else {
///         Ok(1.0 / gains[0])
///     }
/// };
///
/// assert_eq!(objective.cost(&[2.0]).unwrap(), 0.5);
/// assert!(objective.cost(&[0.5]).is_err());
/// ```
pub trait Objective {
    /// The error signalled when a cost can't be computed.
    type Error: Error + Send + Sync + 'static;

    /// Returns the cost of the given gene values.
    fn cost(&self, genes: &[f64]) -> Result<f64, Self::Error>;
}

impl<F, E> Objective for F
where
    F: Fn(&[f64]) -> Result<f64, E>,
    E: Error + Send + Sync + 'static,
{
    type Error = E;

    fn cost(&self, genes: &[f64]) -> Result<f64, E> {
        self(genes)
    }
}

/// Adapts a cost function which can't fail.
///
/// # Examples
/// ```
/// use oxitune::{Infallible, Objective};
///
/// let objective = Infallible(|genes: &[f64]| (genes[0] - 5.0).powi(2));
/// assert_eq!(objective.cost(&[3.0]), Ok(4.0));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Infallible<F>(pub F);

impl<F> Objective for Infallible<F>
where
    F: Fn(&[f64]) -> f64,
{
    type Error = convert::Infallible;

    fn cost(&self, genes: &[f64]) -> Result<f64, convert::Infallible> {
        Ok((self.0)(genes))
    }
}
