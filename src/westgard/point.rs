//! Control observations and the limits they are judged against.
//!
//! A [`QcDataPoint`] carries its own mean and standard deviation so a series
//! can span a revision of the assigned limits: each run is always judged
//! against the limits that were in effect when it was measured.
//!
//! # References
//!
//! - Westgard, J.O., Barry, P.L., Hunt, M.R., Groth, T. (1981). "A Multi-Rule
//!   Shewhart Chart for Quality Control in Clinical Chemistry",
//!   *Clinical Chemistry* 27(3), pp. 493-501.
//! - CLSI C24 — Statistical Quality Control for Quantitative Measurement Procedures.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use u_numflow::stats;

use crate::error::{QcError, Result};

/// Minimum number of baseline runs from which limits can be computed at all.
pub const MIN_BASELINE_RUNS: usize = 2;

/// Number of baseline runs recommended before limits are put into use.
pub const RECOMMENDED_BASELINE_RUNS: usize = 20;

/// Assigned mean and standard deviation for one control level of one analyte.
///
/// # Invariants
///
/// - `sd > 0`
/// - `mean` and `sd` are finite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlLimits {
    /// Assigned (target) mean.
    pub mean: f64,
    /// Assigned standard deviation.
    pub sd: f64,
}

impl ControlLimits {
    /// Creates limits from an assigned mean and standard deviation.
    ///
    /// # Errors
    ///
    /// [`QcError::InvalidLimits`] if `sd <= 0` or either value is not
    /// finite.
    pub fn new(mean: f64, sd: f64) -> Result<Self> {
        if !valid_limits(mean, sd) {
            return Err(QcError::InvalidLimits { mean, sd });
        }
        Ok(Self { mean, sd })
    }

    /// Establishes limits from a baseline period of control runs.
    ///
    /// Uses the arithmetic mean and the sample standard deviation (n - 1).
    /// Non-finite values are skipped. At least [`MIN_BASELINE_RUNS`] finite
    /// values are required; [`RECOMMENDED_BASELINE_RUNS`] is the usual
    /// laboratory practice but is not enforced.
    ///
    /// # Errors
    ///
    /// - [`QcError::InsufficientBaseline`] with fewer than two finite values.
    /// - [`QcError::InvalidLimits`] if the baseline has zero spread.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_westgard::ControlLimits;
    ///
    /// let limits = ControlLimits::from_baseline(&[98.0, 100.0, 102.0]).unwrap();
    /// assert!((limits.mean - 100.0).abs() < 1e-12);
    /// assert!((limits.sd - 2.0).abs() < 1e-12);
    /// ```
    pub fn from_baseline(values: &[f64]) -> Result<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let n = finite.len();
        if n < MIN_BASELINE_RUNS {
            return Err(QcError::InsufficientBaseline {
                required: MIN_BASELINE_RUNS,
                actual: n,
            });
        }
        if n < RECOMMENDED_BASELINE_RUNS {
            tracing::debug!(
                runs = n,
                recommended = RECOMMENDED_BASELINE_RUNS,
                "control limits established from a short baseline"
            );
        }

        match (stats::mean(&finite), stats::std_dev(&finite)) {
            (Some(mean), Some(sd)) => Self::new(mean, sd),
            // No spread to measure.
            (mean, _) => Err(QcError::InvalidLimits {
                mean: mean.unwrap_or(f64::NAN),
                sd: 0.0,
            }),
        }
    }

    /// Stamps these limits onto a new observation.
    pub fn point(&self, value: f64, date: NaiveDateTime) -> QcDataPoint {
        QcDataPoint {
            value,
            mean: self.mean,
            sd: self.sd,
            date,
        }
    }

    /// Returns `(mean - k*sd, mean + k*sd)`.
    pub fn limit(&self, k: f64) -> (f64, f64) {
        (self.mean - k * self.sd, self.mean + k * self.sd)
    }
}

/// Which side of the assigned mean a value falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Above,
    Below,
    /// Exactly on the mean; belongs to neither side.
    OnMean,
}

/// One control measurement in a monitored series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcDataPoint {
    /// Result reported by the analyzer for this control run.
    pub value: f64,
    /// Assigned mean in effect at the time of the run.
    pub mean: f64,
    /// Assigned standard deviation in effect at the time of the run.
    pub sd: f64,
    /// Run timestamp; defines the order of the series.
    pub date: NaiveDateTime,
}

impl QcDataPoint {
    pub fn new(value: f64, mean: f64, sd: f64, date: NaiveDateTime) -> Self {
        Self {
            value,
            mean,
            sd,
            date,
        }
    }

    /// Number of standard deviations the value lies from the mean.
    ///
    /// Only meaningful when `sd > 0`; the evaluator validates this before
    /// computing any z-score.
    pub fn z_score(&self) -> f64 {
        (self.value - self.mean) / self.sd
    }

    /// Side of the mean, from the sign of `value - mean`.
    pub fn side(&self) -> Side {
        let d = self.value - self.mean;
        if d > 0.0 {
            Side::Above
        } else if d < 0.0 {
            Side::Below
        } else {
            Side::OnMean
        }
    }

    /// The limits this point was measured against.
    pub fn limits(&self) -> ControlLimits {
        ControlLimits {
            mean: self.mean,
            sd: self.sd,
        }
    }

    /// Checks the point's invariants, reporting `index` on failure.
    pub(crate) fn validate(&self, index: usize) -> Result<()> {
        if !valid_limits(self.mean, self.sd) {
            return Err(QcError::InvalidControlLimits {
                index,
                mean: self.mean,
                sd: self.sd,
            });
        }
        if !self.value.is_finite() {
            return Err(QcError::NonFiniteValue {
                index,
                value: self.value,
            });
        }
        Ok(())
    }
}

fn valid_limits(mean: f64, sd: f64) -> bool {
    mean.is_finite() && sd.is_finite() && sd > 0.0
}
