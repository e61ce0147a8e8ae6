//! The check orchestrator.
//!
//! Drives every target through [`Target::check`] and collects exactly one
//! [`CheckResult`] per target into a [`Report`]. A failing or panicking
//! probe is recorded like any other result; it never stops the run.

use std::sync::Arc;
use std::time::Instant;

use safenet_common::config::CheckSettings;
use tokio::sync::Semaphore;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::error::ProbeError;
use crate::report::{CheckResult, Report};
use crate::target::{Target, Verdict};

pub struct Checker {
    concurrency: usize,
    fail_on_error: bool,
}

impl Default for Checker {
    fn default() -> Self {
        Self::new(&CheckSettings::default())
    }
}

impl Checker {
    pub fn new(settings: &CheckSettings) -> Self {
        Self {
            concurrency: settings.concurrency.max(1),
            fail_on_error: settings.fail_on_error,
        }
    }

    /// Checks all `targets` and returns their results in the given order.
    ///
    /// At most `concurrency` checks are in flight; with the default of one
    /// they run strictly one after another.
    pub async fn run<T>(&self, targets: Vec<T>) -> Report
    where
        T: Target + 'static,
    {
        info!(targets = targets.len(), concurrency = self.concurrency, "starting checks");
        let start_time = Instant::now();

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut handles = Vec::with_capacity(targets.len());

        for target in targets {
            let target = Arc::new(target);
            let worker = target.clone();
            let permits = permits.clone();
            let span = info_span!("check", name = %target.name(), kind = %target.kind());

            let handle = tokio::spawn(
                async move {
                    let _permit = permits.acquire_owned().await;
                    worker.check().await
                }
                .instrument(span),
            );
            handles.push((target, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (target, handle) in handles {
            let verdict = match handle.await {
                Ok(verdict) => verdict,
                Err(e) => {
                    let failure = ProbeError::Aborted(e.to_string());
                    Verdict::evaluate(target.expected_safe(), Err(failure))
                }
            };

            log_verdict(target.as_ref(), &verdict);
            results.push(CheckResult::new(target.as_ref(), verdict));
        }

        let report = Report::new(results, self.fail_on_error, start_time.elapsed());

        for masked in report.masked_errors() {
            warn!(
                name = %masked.name,
                "probe failed but the verdict counts as safe; set checks.fail_on_error to fail the run"
            );
        }

        info!(
            checked = report.len(),
            unsafe_targets = report.unsafe_count(),
            errors = report.error_count(),
            "checks complete"
        );
        report
    }
}

fn log_verdict(target: &dyn Target, verdict: &Verdict) {
    let name = target.name();
    debug!(name = %name, available = verdict.available, safe = verdict.safe, "verdict");

    match (&verdict.error, verdict.safe) {
        (Some(e), _) => error!(name = %name, safe = verdict.safe, "error checking {}: {e}", target.kind()),
        (None, true) => info!(name = %name, "{} is safe", target.kind()),
        (None, false) => warn!(name = %name, "{} is NOT safe", target.kind()),
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
