//! # u-westgard
//!
//! Westgard multirule quality control for laboratory control series.
//!
//! This crate is the evaluation core of a laboratory QC workflow. It takes
//! an oldest-to-newest series of control results for one analyte and
//! control level, each carrying the assigned mean and SD in effect at the
//! time, and reports which runs violate the Westgard rules. Fetching the
//! series, persisting statuses and opening deviation records are left to
//! the caller.
//!
//! ## Modules
//!
//! - [`westgard`] — control rules, the evaluator, and run status projection
//! - [`error`] — the [`QcError`] type
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use u_westgard::{evaluate, ControlLimits, WestgardRule};
//!
//! let limits = ControlLimits::new(100.0, 5.0).unwrap();
//! let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
//! let series: Vec<_> = [100.0, 100.0, 116.0]
//!     .iter()
//!     .map(|&v| limits.point(v, date))
//!     .collect();
//!
//! let violations = evaluate(&series).unwrap();
//! assert_eq!(violations.len(), 1);
//! assert_eq!(violations[0].index, 2);
//! assert_eq!(violations[0].rule, WestgardRule::OneThreeS);
//! ```

pub mod error;
pub mod westgard;

pub use error::{QcError, Result};
pub use westgard::{
    evaluate, ControlLimits, EvaluationReport, QcDataPoint, RunStatus, Severity, Violation,
    WestgardConfig, WestgardEvaluator, WestgardRule,
};
