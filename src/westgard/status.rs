//! Per-run and per-series status derived from violations.

use serde::{Deserialize, Serialize};

use super::evaluator::Violation;
use super::rules::Severity;

/// Outcome of QC evaluation for one run or a whole series.
///
/// Ordered from best to worst, so the status of a series is the maximum of
/// its runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    #[default]
    Pass,
    Warning,
    Reject,
}

impl From<Severity> for RunStatus {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Warning => RunStatus::Warning,
            Severity::Reject => RunStatus::Reject,
        }
    }
}

/// One status per run of a series of `len` points.
///
/// Runs without a violation are [`RunStatus::Pass`]. Violation indices at or
/// beyond `len` are ignored.
pub fn point_statuses(len: usize, violations: &[Violation]) -> Vec<RunStatus> {
    let mut statuses = vec![RunStatus::Pass; len];
    for v in violations {
        if let Some(slot) = statuses.get_mut(v.index) {
            *slot = (*slot).max(v.severity.into());
        }
    }
    statuses
}

/// Worst status over all violations; [`RunStatus::Pass`] when there are none.
pub fn series_status(violations: &[Violation]) -> RunStatus {
    violations
        .iter()
        .map(|v| RunStatus::from(v.severity))
        .max()
        .unwrap_or_default()
}
