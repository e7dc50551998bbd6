//! Error types for QC evaluation.

/// Errors raised while establishing control limits or evaluating a series.
///
/// Every error is fatal for the call that produced it: the evaluator never
/// returns a partial violation list.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QcError {
    /// The standard deviation at `index` is not positive, or the mean/sd
    /// are not finite. The control-limit configuration must be fixed before
    /// the series can be evaluated.
    #[error("invalid control limits at point {index}: mean = {mean}, sd = {sd}")]
    InvalidControlLimits { index: usize, mean: f64, sd: f64 },

    /// Limits given outside any series (assigned or computed from a
    /// baseline) have `sd <= 0` or are not finite.
    #[error("invalid control limits: mean = {mean}, sd = {sd}")]
    InvalidLimits { mean: f64, sd: f64 },

    /// The measured value at `index` is NaN or infinite.
    #[error("non-finite control value at point {index}: {value}")]
    NonFiniteValue { index: usize, value: f64 },

    /// The series contains no points.
    #[error("cannot evaluate an empty QC series")]
    EmptySeries,

    /// Too few baseline runs to estimate a mean and standard deviation.
    #[error("baseline needs at least {required} finite runs, got {actual}")]
    InsufficientBaseline { required: usize, actual: usize },

    /// A rule code that is not part of the Westgard multirule set.
    #[error("unknown Westgard rule code: {0:?}")]
    UnknownRule(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, QcError>;
