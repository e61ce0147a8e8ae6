use safenet_common::config::HttpSettings;
use safenet_core::target::{WebsiteTarget, http_client};
use safenet_core::{ProbeError, Target};

use crate::support::{closed_port, serve_status};

fn website(address: String, expected_safe: bool) -> WebsiteTarget {
    let settings = HttpSettings {
        no_proxy: true,
        ..HttpSettings::default()
    };
    let client = http_client(&settings).expect("http client");
    WebsiteTarget::new("site", address, expected_safe, client)
}

#[tokio::test]
async fn reachable_site_expected_up_is_safe() {
    let addr = serve_status(200, "OK").await.unwrap();
    let verdict = website(format!("http://{addr}/"), true).check().await;

    assert!(verdict.available);
    assert!(verdict.safe);
    assert!(verdict.error.is_none());
}

#[tokio::test]
async fn unavailable_service_is_unsafe_without_error() {
    let addr = serve_status(503, "Service Unavailable").await.unwrap();
    let verdict = website(format!("http://{addr}/"), true).check().await;

    assert!(!verdict.available);
    assert!(!verdict.safe);
    assert!(verdict.error.is_none());
}

#[tokio::test]
async fn forbidden_site_expected_blocked_is_safe() {
    let addr = serve_status(403, "Forbidden").await.unwrap();
    let verdict = website(format!("http://{addr}/admin"), false).check().await;

    assert!(!verdict.available);
    assert!(verdict.safe);
    assert!(verdict.error.is_none());
}

#[tokio::test]
async fn refused_connection_is_safe_but_carries_the_error() {
    let port = closed_port().await.unwrap();
    let verdict = website(format!("http://127.0.0.1:{port}/"), false).check().await;

    assert!(!verdict.available);
    assert!(verdict.safe);
    assert!(matches!(verdict.error, Some(ProbeError::Http(_))));
}
