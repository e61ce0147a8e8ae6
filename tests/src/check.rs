use safenet_common::config::CheckSettings;
use safenet_core::{Checker, Outcome, ProbeError};

use crate::support::{MockTarget, Observation};

fn five_targets(second: Observation) -> Vec<MockTarget> {
    vec![
        MockTarget::new("one", true, Observation::Available),
        MockTarget::new("two", true, second),
        MockTarget::new("three", false, Observation::Unavailable),
        MockTarget::new("four", false, Observation::Available),
        MockTarget::new("five", true, Observation::Available),
    ]
}

fn verdicts(report: &safenet_core::Report) -> Vec<bool> {
    report.results().iter().map(|r| r.safe).collect()
}

#[tokio::test]
async fn repeated_runs_agree() {
    let targets = five_targets(Observation::Unavailable);
    let checker = Checker::default();

    let first = checker.run(targets.clone()).await;
    let second = checker.run(targets).await;

    assert_eq!(first.outcome(), second.outcome());
    assert_eq!(verdicts(&first), verdicts(&second));
}

#[tokio::test]
async fn failing_probe_does_not_stop_the_run() {
    let report = Checker::default().run(five_targets(Observation::Fails)).await;

    assert_eq!(report.len(), 5);
    assert_eq!(verdicts(&report), vec![true, false, true, false, true]);
    assert!(matches!(
        report.results()[1].error,
        Some(ProbeError::Resolve { .. })
    ));
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.outcome(), Outcome::Fail);
}

#[tokio::test]
async fn panicking_probe_is_recorded_under_concurrency() {
    let settings = CheckSettings {
        concurrency: 5,
        ..CheckSettings::default()
    };
    let report = Checker::new(&settings).run(five_targets(Observation::Panics)).await;

    assert_eq!(report.len(), 5);
    assert_eq!(verdicts(&report), vec![true, false, true, false, true]);
    assert!(matches!(
        report.results()[1].error,
        Some(ProbeError::Aborted(_))
    ));
}

#[tokio::test]
async fn matching_expectations_pass() {
    let targets = vec![
        MockTarget::new("up", true, Observation::Available),
        MockTarget::new("down", false, Observation::Unavailable),
    ];
    let report = Checker::default().run(targets).await;

    assert_eq!(report.outcome(), Outcome::Pass);
    assert_eq!(report.outcome().exit_code(), 0);
}

#[tokio::test]
async fn errored_but_safe_result_passes_unless_strict() {
    let targets = vec![
        MockTarget::new("blocked", false, Observation::Fails),
        MockTarget::new("up", true, Observation::Available),
    ];

    let lenient = Checker::default().run(targets.clone()).await;
    assert_eq!(lenient.outcome(), Outcome::Pass);
    assert_eq!(lenient.masked_errors().count(), 1);

    let strict = Checker::new(&CheckSettings {
        fail_on_error: true,
        ..CheckSettings::default()
    })
    .run(targets)
    .await;
    assert_eq!(strict.outcome(), Outcome::Fail);
    assert_eq!(strict.outcome().exit_code(), 1);
}
