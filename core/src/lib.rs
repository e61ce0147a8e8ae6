//! # safenet core
//!
//! Target checking for safenet. Every configured endpoint is a [`target::Target`]
//! whose probe measures reachability; the verdict compares that measurement
//! with the declared expectation, and the [`checker::Checker`] folds all
//! verdicts of a run into a single [`report::Outcome`].

pub mod checker;
pub mod error;
pub mod network;
pub mod report;
pub mod target;

pub use checker::Checker;
pub use error::ProbeError;
pub use report::{CheckResult, Outcome, Report};
pub use target::{AnyTarget, Target, TargetKind, Verdict};
