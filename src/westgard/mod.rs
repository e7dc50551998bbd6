//! Westgard multirule quality control.
//!
//! Classifies a chronologically ordered series of control measurements for
//! one analyte and control level.
//!
//! # Types
//!
//! - [`QcDataPoint`] — one control run with the limits in effect at the time
//! - [`ControlLimits`] — assigned mean and SD, optionally from a baseline
//! - [`WestgardRule`] — the six rules, with codes, severities and messages
//! - [`Violation`] — one rule firing at one run
//!
//! # Evaluation
//!
//! - [`evaluate`] / [`WestgardEvaluator`] — at most one violation per run,
//!   chosen by rule priority
//! - [`EvaluationReport`] — violations plus per-run and series [`RunStatus`]
//!
//! # References
//!
//! - Westgard, J.O. et al. (1981). "A Multi-Rule Shewhart Chart for Quality
//!   Control in Clinical Chemistry", *Clinical Chemistry* 27(3), pp. 493-501.
//! - CLSI C24 — Statistical Quality Control for Quantitative Measurement Procedures.

mod config;
mod evaluator;
mod point;
mod rules;
mod series;
mod status;

pub use config::WestgardConfig;
pub use evaluator::{evaluate, EvaluationReport, Violation, WestgardEvaluator};
pub use point::{ControlLimits, QcDataPoint, Side, MIN_BASELINE_RUNS, RECOMMENDED_BASELINE_RUNS};
pub use rules::{ErrorType, Severity, WestgardRule};
pub use series::{from_newest_first, is_chronological, sort_chronological};
pub use status::{point_statuses, series_status, RunStatus};
