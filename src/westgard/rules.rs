//! Westgard control rules for detecting random and systematic error.
//!
//! Implements the six rules of the classic Westgard multirule procedure.
//! Each rule looks at the z-score of the current run and, for the
//! multi-point rules, a fixed number of immediately preceding runs from the
//! same series.
//!
//! | Rule | Fires when | Detects |
//! |------|------------|---------|
//! | `1_3s` | one run beyond ±3 SD | random error |
//! | `2_2s` | two consecutive runs beyond 2 SD, same side | systematic error |
//! | `R_4s` | two consecutive runs more than 4 SD apart | random error |
//! | `4_1s` | four consecutive runs beyond 1 SD, same side | systematic error |
//! | `10x` | ten consecutive runs on the same side of the mean | systematic error |
//! | `1_2s` | one run beyond ±2 SD | warning only |
//!
//! # References
//!
//! - Westgard, J.O. et al. (1981). "A Multi-Rule Shewhart Chart for Quality
//!   Control in Clinical Chemistry", *Clinical Chemistry* 27(3), pp. 493-501.
//! - Westgard, J.O. (2002). *Basic QC Practices*, 2nd ed., Westgard QC.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::point::{QcDataPoint, Side};
use crate::error::QcError;

/// Severity of a rule violation.
///
/// Mapping severities onto a persistence status vocabulary is left to the
/// caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational; the run is not rejected.
    Warning,
    /// The run must be held until the cause is investigated.
    Reject,
}

impl Severity {
    pub fn is_reject(self) -> bool {
        self == Severity::Reject
    }
}

/// Kind of analytical error a rejection rule is sensitive to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Isolated large deviation (imprecision).
    Random,
    /// Persistent shift or bias.
    Systematic,
}

/// One rule of the Westgard multirule procedure.
///
/// Serializes as its conventional code (`"1_3s"`, `"R_4s"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WestgardRule {
    /// One run beyond 3 SD.
    #[serde(rename = "1_3s")]
    OneThreeS,
    /// Two consecutive runs beyond 2 SD on the same side of the mean.
    #[serde(rename = "2_2s")]
    TwoTwoS,
    /// Range between two consecutive runs exceeds 4 SD.
    #[serde(rename = "R_4s")]
    RangeFourS,
    /// Four consecutive runs beyond 1 SD on the same side of the mean.
    #[serde(rename = "4_1s")]
    FourOneS,
    /// Ten consecutive runs on the same side of the mean.
    #[serde(rename = "10x")]
    TenX,
    /// One run beyond 2 SD.
    #[serde(rename = "1_2s")]
    OneTwoS,
}

impl WestgardRule {
    /// All rules in evaluation priority order.
    ///
    /// For each run the first matching rule in this order is the only one
    /// reported; `1_2s` is reached only when no rejection rule matched.
    pub const PRIORITY: [WestgardRule; 6] = [
        WestgardRule::OneThreeS,
        WestgardRule::TwoTwoS,
        WestgardRule::RangeFourS,
        WestgardRule::FourOneS,
        WestgardRule::TenX,
        WestgardRule::OneTwoS,
    ];

    /// Conventional rule code.
    pub fn code(self) -> &'static str {
        match self {
            WestgardRule::OneThreeS => "1_3s",
            WestgardRule::TwoTwoS => "2_2s",
            WestgardRule::RangeFourS => "R_4s",
            WestgardRule::FourOneS => "4_1s",
            WestgardRule::TenX => "10x",
            WestgardRule::OneTwoS => "1_2s",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            WestgardRule::OneTwoS => Severity::Warning,
            _ => Severity::Reject,
        }
    }

    /// Human-readable explanation of the rule.
    pub fn message(self) -> &'static str {
        match self {
            WestgardRule::OneThreeS => "One control value lies more than 3 SD from the mean",
            WestgardRule::TwoTwoS => {
                "Two consecutive control values exceed 2 SD on the same side of the mean"
            }
            WestgardRule::RangeFourS => {
                "The difference between two consecutive control values exceeds 4 SD"
            }
            WestgardRule::FourOneS => {
                "Four consecutive control values exceed 1 SD on the same side of the mean"
            }
            WestgardRule::TenX => {
                "Ten consecutive control values fall on the same side of the mean"
            }
            WestgardRule::OneTwoS => "One control value lies more than 2 SD from the mean",
        }
    }

    /// Number of preceding runs the rule needs before it can fire.
    pub fn required_history(self) -> usize {
        match self {
            WestgardRule::OneThreeS | WestgardRule::OneTwoS => 0,
            WestgardRule::TwoTwoS | WestgardRule::RangeFourS => 1,
            WestgardRule::FourOneS => 3,
            WestgardRule::TenX => 9,
        }
    }

    /// Kind of error the rule detects, or `None` for the `1_2s` warning.
    pub fn error_type(self) -> Option<ErrorType> {
        match self {
            WestgardRule::OneThreeS | WestgardRule::RangeFourS => Some(ErrorType::Random),
            WestgardRule::TwoTwoS | WestgardRule::FourOneS | WestgardRule::TenX => {
                Some(ErrorType::Systematic)
            }
            WestgardRule::OneTwoS => None,
        }
    }

    /// Returns `true` if the rule fires at run `i` of the standardized series.
    pub(crate) fn matches(self, series: &Standardized, i: usize) -> bool {
        if i < self.required_history() {
            return false;
        }
        let z = &series.z;
        match self {
            WestgardRule::OneThreeS => check_1_3s(z, i),
            WestgardRule::TwoTwoS => check_2_2s(z, i),
            WestgardRule::RangeFourS => check_r_4s(z, i),
            WestgardRule::FourOneS => check_4_1s(z, i),
            WestgardRule::TenX => check_10x(&series.sides, i),
            WestgardRule::OneTwoS => check_1_2s(z, i),
        }
    }
}

impl fmt::Display for WestgardRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for WestgardRule {
    type Err = QcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WestgardRule::PRIORITY
            .into_iter()
            .find(|rule| rule.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| QcError::UnknownRule(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Standardized series
// ---------------------------------------------------------------------------

/// Z-scores and mean sides of a validated series, computed once per
/// evaluation.
#[derive(Debug, Clone)]
pub(crate) struct Standardized {
    pub(crate) z: Vec<f64>,
    pub(crate) sides: Vec<Side>,
}

impl Standardized {
    /// The caller must have validated every point first.
    pub(crate) fn new(points: &[QcDataPoint]) -> Self {
        Self {
            z: points.iter().map(QcDataPoint::z_score).collect(),
            sides: points.iter().map(QcDataPoint::side).collect(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.z.len()
    }
}

// ---------------------------------------------------------------------------
// Rule checks
// ---------------------------------------------------------------------------

/// `1_3s`: the run lies beyond ±3 SD.
fn check_1_3s(z: &[f64], i: usize) -> bool {
    z[i].abs() > 3.0
}

/// `2_2s`: this run and the previous one both beyond 2 SD on the same side.
fn check_2_2s(z: &[f64], i: usize) -> bool {
    let (cur, prev) = (z[i], z[i - 1]);
    cur.abs() > 2.0 && prev.abs() > 2.0 && cur.signum() == prev.signum()
}

/// `R_4s`: consecutive runs more than 4 SD apart.
fn check_r_4s(z: &[f64], i: usize) -> bool {
    (z[i] - z[i - 1]).abs() > 4.0
}

/// `4_1s`: this run and the three before it all beyond 1 SD, same side.
fn check_4_1s(z: &[f64], i: usize) -> bool {
    let cur = z[i];
    cur.abs() > 1.0
        && z[i - 3..i]
            .iter()
            .all(|&p| p.abs() > 1.0 && p.signum() == cur.signum())
}

/// `10x`: this run and the nine before it on the same side of the mean.
///
/// A run exactly on the mean belongs to neither side and breaks the streak.
fn check_10x(sides: &[Side], i: usize) -> bool {
    let cur = sides[i];
    cur != Side::OnMean && sides[i - 9..i].iter().all(|&s| s == cur)
}

/// `1_2s`: the run lies beyond ±2 SD.
fn check_1_2s(z: &[f64], i: usize) -> bool {
    z[i].abs() > 2.0
}
