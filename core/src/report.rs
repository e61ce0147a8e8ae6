use std::time::Duration;

use crate::error::ProbeError;
use crate::target::{Target, TargetKind, Verdict};

/// Result of checking one target during a run.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub kind: TargetKind,
    pub address: String,
    pub expected_safe: bool,
    pub available: bool,
    pub safe: bool,
    pub error: Option<ProbeError>,
}

impl CheckResult {
    pub fn new(target: &dyn Target, verdict: Verdict) -> Self {
        Self {
            name: target.name().to_string(),
            kind: target.kind(),
            address: target.address().to_string(),
            expected_safe: target.expected_safe(),
            available: verdict.available,
            safe: verdict.safe,
            error: verdict.error,
        }
    }
}

/// Aggregated decision of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Pass => 0,
            Outcome::Fail => 1,
        }
    }
}

/// Every result of one run, in target order.
#[derive(Debug, Default)]
pub struct Report {
    results: Vec<CheckResult>,
    fail_on_error: bool,
    elapsed: Duration,
}

impl Report {
    pub fn new(results: Vec<CheckResult>, fail_on_error: bool, elapsed: Duration) -> Self {
        Self {
            results,
            fail_on_error,
            elapsed,
        }
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn safe_count(&self) -> usize {
        self.results.iter().filter(|r| r.safe).count()
    }

    pub fn unsafe_count(&self) -> usize {
        self.results.iter().filter(|r| !r.safe).count()
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_some()).count()
    }

    /// Results whose probe failed but whose verdict still reads safe.
    pub fn masked_errors(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| r.safe && r.error.is_some())
    }

    /// FAIL as soon as one verdict is unsafe. Probe errors only fail the run
    /// on their own when `fail_on_error` is set.
    pub fn outcome(&self) -> Outcome {
        let errors_fail = self.fail_on_error && self.error_count() > 0;
        if self.unsafe_count() > 0 || errors_fail {
            Outcome::Fail
        } else {
            Outcome::Pass
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
