use std::io::Write;

use safenet_common::config::Config;
use safenet_core::{Checker, Outcome, TargetKind, target};

use crate::support::{closed_port, serve_status};

#[tokio::test]
async fn config_file_drives_a_full_run() {
    let site = serve_status(200, "OK").await.unwrap();
    let blocked = closed_port().await.unwrap();

    let yaml = format!(
        r#"
websites:
  - name: portal
    address: http://{site}/
    safe: true
networks:
  - name: blocked admin port
    address: 127.0.0.1
    network: 127.0.0.1/32
    port: {blocked}
    safe: false
http:
  no_proxy: true
tcp:
  timeout_ms: 500
checks:
  concurrency: 2
"#
    );
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let cfg = Config::from_file(file.path()).unwrap();
    let targets = target::build_targets(&cfg).unwrap();
    let report = Checker::new(&cfg.checks).run(targets).await;

    assert_eq!(report.len(), 2);
    assert_eq!(report.results()[0].kind, TargetKind::Website);
    assert_eq!(report.results()[1].kind, TargetKind::Network);
    assert!(report.results().iter().all(|r| r.safe && r.error.is_none()));
    assert_eq!(report.outcome(), Outcome::Pass);
}

#[tokio::test]
async fn exposed_port_fails_the_run() {
    let site = serve_status(200, "OK").await.unwrap();

    let yaml = format!(
        r#"
networks:
  - name: must be closed
    address: 127.0.0.1
    network: 127.0.0.1/32
    port: {port}
    safe: false
"#,
        port = site.port()
    );
    let cfg = Config::from_yaml(&yaml).unwrap();
    let report = Checker::new(&cfg.checks)
        .run(target::build_targets(&cfg).unwrap())
        .await;

    assert!(report.results()[0].available);
    assert_eq!(report.outcome(), Outcome::Fail);
}
