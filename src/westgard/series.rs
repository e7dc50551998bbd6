//! Ordering helpers for control series at the caller's boundary.
//!
//! The evaluator expects oldest-to-newest order and never reorders its
//! input. Histories that come back newest-first, or unsorted, are converted
//! here before evaluation.

use super::point::QcDataPoint;

/// Reverses a newest-first history into oldest-first order.
pub fn from_newest_first(mut points: Vec<QcDataPoint>) -> Vec<QcDataPoint> {
    points.reverse();
    points
}

/// Sorts points by run date, oldest first. Runs with equal dates keep
/// their relative order.
pub fn sort_chronological(points: &mut [QcDataPoint]) {
    points.sort_by_key(|p| p.date);
}

/// Returns `true` if no point is dated before its predecessor.
pub fn is_chronological(points: &[QcDataPoint]) -> bool {
    points.windows(2).all(|w| w[0].date <= w[1].date)
}
