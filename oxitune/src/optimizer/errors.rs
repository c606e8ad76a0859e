use std::error::Error as StdError;
use std::fmt;

/// An error type indicating an invalid optimizer
/// configuration or run request.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// The population size was zero.
    EmptyPopulation,
    /// The population size was odd. Offspring are
    /// produced in pairs, so odd sizes are unsupported.
    OddPopulationSize(usize),
    /// The chromosome length was zero.
    EmptyChromosome,
    /// Per-gene bounds were given, but their count
    /// does not match the chromosome length.
    BoundsArityMismatch { expected: usize, found: usize },
    /// A bound pair had `min > max`.
    InvertedBounds { gene: usize, min: f64, max: f64 },
    /// A bound was infinite or NaN.
    NonFiniteBounds { gene: usize, min: f64, max: f64 },
    /// A probability was outside of `[0, 1]`.
    ProbabilityOutOfRange { name: &'static str, value: f64 },
    /// A run was requested with zero generations.
    ZeroGenerations,
    /// A sequential optimizer was configured with
    /// a number of evaluation threads other than 1.
    ConcurrentEvaluation(usize),
}

/// The error type for optimizer operations.
#[derive(Debug)]
pub enum Error {
    /// The configuration was invalid.
    Configuration(ConfigurationError),
    /// The sum of the population's fitness was
    /// zero or non-finite, so no selection
    /// distribution could be built.
    DegenerateFitness { total: f64 },
    /// The objective function signalled a failure.
    /// The inner error is the objective's own, unchanged.
    Objective(Box<dyn StdError + Send + Sync>),
    /// The objective function returned a negative or NaN cost.
    InvalidCost { cost: f64 },
    /// The evaluation worker pool could not be started.
    WorkerPool(rayon::ThreadPoolBuildError),
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPopulation => write!(f, "population size must be positive"),
            Self::OddPopulationSize(size) => {
                write!(f, "population size must be even, got {}", size)
            }
            Self::EmptyChromosome => write!(f, "chromosome length must be positive"),
            Self::BoundsArityMismatch { expected, found } => write!(
                f,
                "expected bounds for {} genes, found {}",
                expected, found
            ),
            Self::InvertedBounds { gene, min, max } => write!(
                f,
                "bounds of gene {} are inverted: min {} > max {}",
                gene, min, max
            ),
            Self::NonFiniteBounds { gene, min, max } => write!(
                f,
                "bounds of gene {} are not finite: [{}, {}]",
                gene, min, max
            ),
            Self::ProbabilityOutOfRange { name, value } => {
                write!(f, "{} must be in [0, 1], got {}", name, value)
            }
            Self::ZeroGenerations => write!(f, "generation count must be positive"),
            Self::ConcurrentEvaluation(threads) => write!(
                f,
                "sequential evaluation requires evaluation_threads = 1, got {}",
                threads
            ),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(e) => write!(f, "invalid configuration: {}", e),
            Self::DegenerateFitness { total } => write!(
                f,
                "attempted selection on degenerate population (total fitness {})",
                total
            ),
            Self::Objective(e) => write!(f, "objective function failed: {}", e),
            Self::InvalidCost { cost } => write!(
                f,
                "objective function returned invalid cost {} (must be non-negative)",
                cost
            ),
            Self::WorkerPool(e) => write!(f, "could not start evaluation workers: {}", e),
        }
    }
}

impl StdError for ConfigurationError {}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Configuration(e) => Some(e),
            Self::Objective(e) => Some(e.as_ref()),
            Self::WorkerPool(e) => Some(e),
            Self::DegenerateFitness { .. } | Self::InvalidCost { .. } => None,
        }
    }
}

impl From<ConfigurationError> for Error {
    fn from(e: ConfigurationError) -> Error {
        Error::Configuration(e)
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(e: rayon::ThreadPoolBuildError) -> Error {
        Error::WorkerPool(e)
    }
}
