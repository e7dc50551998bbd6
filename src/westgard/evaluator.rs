//! Westgard multirule evaluation of a control series.
//!
//! # Algorithm
//!
//! Every point is first validated (`sd > 0`, finite value and limits) and
//! standardized against its own limits:
//!
//! ```text
//! z_i = (x_i - mean_i) / sd_i
//! ```
//!
//! Then for each run `i`, oldest to newest, the enabled rules are checked in
//! priority order `1_3s, 2_2s, R_4s, 4_1s, 10x, 1_2s`. The first rule that
//! matches is recorded as the single violation for that run. Multi-point
//! rules report the most recent run of the offending pattern, which is the
//! run at which the pattern becomes detectable.
//!
//! # Reference
//!
//! Westgard, J.O. et al. (1981). "A Multi-Rule Shewhart Chart for Quality
//! Control in Clinical Chemistry", *Clinical Chemistry* 27(3), pp. 493-501.

use serde::Serialize;

use super::config::WestgardConfig;
use super::point::QcDataPoint;
use super::rules::{Severity, Standardized, WestgardRule};
use super::status::{point_statuses, series_status, RunStatus};
use crate::error::{QcError, Result};

/// A rule violation detected at one run of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Zero-based index of the run in the evaluated series.
    pub index: usize,
    /// The rule that fired.
    pub rule: WestgardRule,
    /// Severity implied by the rule.
    pub severity: Severity,
    /// Explanation of the rule.
    pub message: &'static str,
}

impl Violation {
    pub fn new(index: usize, rule: WestgardRule) -> Self {
        Self {
            index,
            rule,
            severity: rule.severity(),
            message: rule.message(),
        }
    }

    pub fn is_reject(&self) -> bool {
        self.severity.is_reject()
    }
}

/// Full outcome of evaluating a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    /// Violations in ascending index order, at most one per run.
    pub violations: Vec<Violation>,
    /// Status of every run, aligned with the input series.
    pub statuses: Vec<RunStatus>,
    /// Worst status over the series.
    pub status: RunStatus,
    /// Z-score of every run, aligned with the input series.
    pub z_scores: Vec<f64>,
}

impl EvaluationReport {
    /// Rejection-class violations, the ones that warrant a deviation record.
    pub fn rejects(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.is_reject())
    }

    pub fn is_pass(&self) -> bool {
        self.status == RunStatus::Pass
    }
}

/// Westgard multirule evaluator.
///
/// Stateless apart from its rule selection; one instance can be shared by
/// any number of threads.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use u_westgard::{ControlLimits, WestgardEvaluator, WestgardRule};
///
/// let limits = ControlLimits::new(100.0, 5.0).unwrap();
/// let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let series = vec![
///     limits.point(100.0, day(1)),
///     limits.point(111.0, day(2)),
///     limits.point(111.0, day(3)),
/// ];
///
/// let violations = WestgardEvaluator::default().evaluate(&series).unwrap();
/// assert_eq!(violations.len(), 2);
/// assert_eq!(violations[0].rule, WestgardRule::OneTwoS);
/// assert_eq!((violations[1].index, violations[1].rule), (2, WestgardRule::TwoTwoS));
/// ```
#[derive(Debug, Clone)]
pub struct WestgardEvaluator {
    config: WestgardConfig,
    /// Enabled rules in priority order.
    rules: Vec<WestgardRule>,
}

impl Default for WestgardEvaluator {
    fn default() -> Self {
        Self::new(WestgardConfig::default())
    }
}

impl WestgardEvaluator {
    pub fn new(config: WestgardConfig) -> Self {
        let rules = config.ordered_rules();
        Self { config, rules }
    }

    pub fn config(&self) -> &WestgardConfig {
        &self.config
    }

    /// Evaluates an oldest-to-newest series of one control level.
    ///
    /// # Errors
    ///
    /// - [`QcError::EmptySeries`] if `series` is empty.
    /// - [`QcError::InvalidControlLimits`] if any point has `sd <= 0` or
    ///   non-finite limits.
    /// - [`QcError::NonFiniteValue`] if any measured value is NaN or infinite.
    ///
    /// The whole series is validated before any rule runs, so no violations
    /// are returned when an error is.
    ///
    /// # Complexity
    ///
    /// Time: O(n), Space: O(n)
    pub fn evaluate(&self, series: &[QcDataPoint]) -> Result<Vec<Violation>> {
        let standardized = self.standardize(series)?;
        Ok(self.apply_rules(&standardized))
    }

    /// Evaluates the series and projects the violations onto run statuses.
    ///
    /// # Errors
    ///
    /// Same as [`evaluate`](Self::evaluate).
    pub fn report(&self, series: &[QcDataPoint]) -> Result<EvaluationReport> {
        let standardized = self.standardize(series)?;
        let violations = self.apply_rules(&standardized);
        Ok(EvaluationReport {
            statuses: point_statuses(series.len(), &violations),
            status: series_status(&violations),
            violations,
            z_scores: standardized.z,
        })
    }

    fn standardize(&self, series: &[QcDataPoint]) -> Result<Standardized> {
        if series.is_empty() {
            tracing::warn!("QC evaluation requested for an empty series");
            return Err(QcError::EmptySeries);
        }
        for (index, point) in series.iter().enumerate() {
            if let Err(err) = point.validate(index) {
                tracing::warn!(index, error = %err, "QC series rejected before evaluation");
                return Err(err);
            }
        }
        Ok(Standardized::new(series))
    }

    fn apply_rules(&self, series: &Standardized) -> Vec<Violation> {
        let mut violations = Vec::new();
        for i in 0..series.len() {
            if let Some(rule) = self.rules.iter().copied().find(|rule| rule.matches(series, i)) {
                tracing::trace!(index = i, rule = %rule, z = series.z[i], "Westgard rule fired");
                violations.push(Violation::new(i, rule));
            }
        }

        tracing::debug!(
            points = series.len(),
            violations = violations.len(),
            rejects = violations.iter().filter(|v| v.is_reject()).count(),
            "evaluated QC series"
        );
        violations
    }
}

/// Evaluates a series with every rule enabled.
///
/// Shorthand for `WestgardEvaluator::default().evaluate(series)`.
///
/// # Errors
///
/// See [`WestgardEvaluator::evaluate`].
pub fn evaluate(series: &[QcDataPoint]) -> Result<Vec<Violation>> {
    WestgardEvaluator::default().evaluate(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap()
    }

    /// Helper: daily runs with mean 100 and sd 5.
    fn series(values: &[f64]) -> Vec<QcDataPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| QcDataPoint::new(v, 100.0, 5.0, start() + Duration::days(i as i64)))
            .collect()
    }

    fn rules_at(violations: &[Violation]) -> Vec<(usize, WestgardRule)> {
        violations.iter().map(|v| (v.index, v.rule)).collect()
    }

    // --- scenarios ---

    #[test]
    fn test_in_control_series_has_no_violations() {
        let v = evaluate(&series(&[101.0, 99.0, 100.0, 102.0])).unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn test_single_gross_outlier_is_1_3s() {
        let v = evaluate(&series(&[100.0, 100.0, 116.0])).unwrap();
        assert_eq!(rules_at(&v), vec![(2, WestgardRule::OneThreeS)]);
        assert_eq!(v[0].severity, Severity::Reject);
    }

    #[test]
    fn test_consecutive_2sd_runs_are_2_2s() {
        let v = evaluate(&series(&[100.0, 111.0, 111.0])).unwrap();
        assert_eq!(
            rules_at(&v),
            vec![(1, WestgardRule::OneTwoS), (2, WestgardRule::TwoTwoS)]
        );
        assert_eq!(v[0].severity, Severity::Warning);
    }

    #[test]
    fn test_opposite_2sd_runs_are_r_4s() {
        let v = evaluate(&series(&[100.0, 89.0, 111.0])).unwrap();
        assert_eq!(
            rules_at(&v),
            vec![(1, WestgardRule::OneTwoS), (2, WestgardRule::RangeFourS)]
        );
    }

    #[test]
    fn test_zero_sd_fails_without_partial_result() {
        let mut s = series(&[100.0, 116.0, 100.0]);
        s[2].sd = 0.0;
        let err = evaluate(&s).unwrap_err();
        assert_eq!(
            err,
            QcError::InvalidControlLimits {
                index: 2,
                mean: 100.0,
                sd: 0.0
            }
        );
    }

    #[test]
    fn test_ten_on_one_side_is_10x() {
        let v = evaluate(&series(&[101.0; 10])).unwrap();
        assert_eq!(rules_at(&v), vec![(9, WestgardRule::TenX)]);
    }

    #[test]
    fn test_nine_on_one_side_is_not_10x() {
        assert!(evaluate(&series(&[101.0; 9])).unwrap().is_empty());
    }

    #[test]
    fn test_10x_continues_firing_while_streak_lasts() {
        let v = evaluate(&series(&[99.0; 12])).unwrap();
        assert_eq!(
            rules_at(&v),
            vec![
                (9, WestgardRule::TenX),
                (10, WestgardRule::TenX),
                (11, WestgardRule::TenX)
            ]
        );
    }

    #[test]
    fn test_four_runs_beyond_1sd_is_4_1s() {
        let v = evaluate(&series(&[100.0, 106.0, 107.0, 106.0, 108.0])).unwrap();
        assert_eq!(rules_at(&v), vec![(4, WestgardRule::FourOneS)]);
    }

    // --- precedence ---

    #[test]
    fn test_1_3s_preempts_1_2s_and_2_2s() {
        let v = evaluate(&series(&[111.0, 117.0])).unwrap();
        assert_eq!(
            rules_at(&v),
            vec![(0, WestgardRule::OneTwoS), (1, WestgardRule::OneThreeS)]
        );
    }

    #[test]
    fn test_2_2s_preempts_4_1s() {
        // Runs 1..=4 all beyond 1 SD above; runs 3 and 4 also beyond 2 SD.
        let v = evaluate(&series(&[100.0, 106.0, 106.0, 111.0, 111.0])).unwrap();
        assert_eq!(
            rules_at(&v),
            vec![(3, WestgardRule::OneTwoS), (4, WestgardRule::TwoTwoS)]
        );
    }

    #[test]
    fn test_4_1s_preempts_10x() {
        let mut values = vec![101.0; 6];
        values.extend([106.0, 106.0, 106.0, 106.0]);
        let v = evaluate(&series(&values)).unwrap();
        assert_eq!(rules_at(&v), vec![(9, WestgardRule::FourOneS)]);
    }

    // --- boundaries ---

    #[test]
    fn test_boundaries_are_strict() {
        // z = 2.0, then z = -2.0 (range exactly 4), then z = 3.0.
        let v = evaluate(&series(&[110.0, 90.0, 115.0])).unwrap();
        // 115 follows -2.0: range 5 > 4 fires R_4s even though z = 3.0 does not fire 1_3s.
        assert_eq!(rules_at(&v), vec![(2, WestgardRule::RangeFourS)]);

        let v = evaluate(&series(&[110.0, 90.0])).unwrap();
        assert!(v.is_empty());

        let v = evaluate(&series(&[100.0, 115.0])).unwrap();
        assert_eq!(rules_at(&v), vec![(1, WestgardRule::OneTwoS)]);
    }

    #[test]
    fn test_first_point_cannot_fire_multi_point_rules() {
        let v = evaluate(&series(&[112.0])).unwrap();
        assert_eq!(rules_at(&v), vec![(0, WestgardRule::OneTwoS)]);
    }

    // --- errors ---

    #[test]
    fn test_empty_series_fails() {
        assert_eq!(evaluate(&[]).unwrap_err(), QcError::EmptySeries);
    }

    #[test]
    fn test_negative_sd_fails() {
        let mut s = series(&[100.0, 100.0]);
        s[0].sd = -5.0;
        assert!(matches!(
            evaluate(&s).unwrap_err(),
            QcError::InvalidControlLimits { index: 0, .. }
        ));
    }

    #[test]
    fn test_nan_value_fails() {
        let s = series(&[100.0, f64::NAN, 100.0]);
        assert!(matches!(
            evaluate(&s).unwrap_err(),
            QcError::NonFiniteValue { index: 1, .. }
        ));
    }

    // --- limits revised within a series ---

    #[test]
    fn test_each_point_uses_its_own_limits() {
        let mut s = series(&[100.0, 100.0, 116.0]);
        // After revision, 116 is only 1.6 SD above the new mean.
        s[2].mean = 108.0;
        assert!(evaluate(&s).unwrap().is_empty());
    }

    // --- configuration ---

    #[test]
    fn test_disabled_rule_falls_through_to_next() {
        let config = WestgardConfig::with_rules([WestgardRule::OneThreeS, WestgardRule::OneTwoS]);
        let evaluator = WestgardEvaluator::new(config);
        let v = evaluator.evaluate(&series(&[100.0, 111.0, 111.0])).unwrap();
        assert_eq!(
            rules_at(&v),
            vec![(1, WestgardRule::OneTwoS), (2, WestgardRule::OneTwoS)]
        );
    }

    #[test]
    fn test_empty_rule_set_reports_nothing() {
        let evaluator = WestgardEvaluator::new(WestgardConfig { rules: Vec::new() });
        let v = evaluator.evaluate(&series(&[130.0, 60.0])).unwrap();
        assert!(v.is_empty());
    }

    // --- report ---

    #[test]
    fn test_report() {
        let report = WestgardEvaluator::default()
            .report(&series(&[100.0, 89.0, 111.0, 100.0]))
            .unwrap();
        assert_eq!(report.violations.len(), 2);
        assert_eq!(
            report.statuses,
            vec![
                RunStatus::Pass,
                RunStatus::Warning,
                RunStatus::Reject,
                RunStatus::Pass
            ]
        );
        assert_eq!(report.status, RunStatus::Reject);
        assert!(!report.is_pass());
        assert_eq!(report.z_scores.len(), 4);
        assert!((report.z_scores[1] + 2.2).abs() < 1e-12);

        let rejects: Vec<_> = report.rejects().map(|v| v.index).collect();
        assert_eq!(rejects, vec![2]);
    }

    #[test]
    fn test_report_serializes_rule_codes() {
        let report = WestgardEvaluator::default()
            .report(&series(&[100.0, 100.0, 116.0]))
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "REJECT");
        assert_eq!(json["violations"][0]["rule"], "1_3s");
        assert_eq!(json["violations"][0]["severity"], "REJECT");
        assert_eq!(json["violations"][0]["index"], 2);
    }

    #[test]
    fn test_evaluator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WestgardEvaluator>();
        assert_send_sync::<EvaluationReport>();
    }
}
