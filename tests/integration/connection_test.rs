//! Connection integration tests.
//!
//! Tests connectivity errors without a running server.

use airgraph::config::ConnectionConfig;
use airgraph::connection::ConnectionManager;
use airgraph::db::{GraphClient, HttpGraphClient};
use airgraph::error::AirgraphError;

fn unreachable_config() -> ConnectionConfig {
    ConnectionConfig {
        uri: Some("http://127.0.0.1:1".to_string()),
        timeout_secs: Some(5),
        ..Default::default()
    }
}

#[tokio::test(flavor = "current_thread")]
async fn test_verify_connectivity_with_closed_port() {
    let client = HttpGraphClient::new(&unreachable_config()).unwrap();

    let error = client.verify_connectivity().await.unwrap_err();
    assert!(
        matches!(error, AirgraphError::Connection(_)),
        "Expected connection error, got: {:?}",
        error
    );
}

#[tokio::test(flavor = "current_thread")]
async fn test_acquire_with_closed_port() {
    let result = ConnectionManager::acquire(&unreachable_config()).await;

    let error = result.unwrap_err();
    assert_eq!(error.category(), "Connection Error");
}

#[tokio::test(flavor = "current_thread")]
async fn test_bolt_uri_is_rejected_before_connecting() {
    let config = ConnectionConfig {
        uri: Some("bolt://localhost:7687".to_string()),
        ..Default::default()
    };

    let error = HttpGraphClient::new(&config).unwrap_err();
    assert!(matches!(error, AirgraphError::Config(_)));
    assert!(error.to_string().contains("http://localhost:7474"));
}
