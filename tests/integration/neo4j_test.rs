//! Live Neo4j tests.
//!
//! Require a running server. Set NEO4J_TEST_URI (e.g. http://localhost:7474)
//! and NEO4J_TEST_PASSWORD to run them.

use airgraph::catalog::{Catalog, StatementEntry};
use airgraph::config::ConnectionConfig;
use airgraph::console::Console;
use airgraph::db::{self, GraphClient, HttpGraphClient, Value};
use airgraph::pipeline::{Pipeline, PipelineState};
use futures::StreamExt;

/// Helper to get the test connection from the environment.
fn get_test_config() -> Option<ConnectionConfig> {
    let uri = std::env::var("NEO4J_TEST_URI").ok()?;
    let mut config = ConnectionConfig::from_uri(&uri).ok()?;
    if config.password.is_none() {
        config.password = std::env::var("NEO4J_TEST_PASSWORD").ok();
    }
    Some(config)
}

#[tokio::test]
async fn test_return_literal_values() {
    let Some(config) = get_test_config() else {
        eprintln!("Skipping test: NEO4J_TEST_URI not set");
        return;
    };

    let client = HttpGraphClient::new(&config).unwrap();
    client.verify_connectivity().await.unwrap();

    let mut session = client.open_session().await.unwrap();
    let (columns, mut rows) = session
        .run("RETURN 1 AS n, 'CDG' AS code, null AS missing, [1, 2] AS list")
        .await
        .unwrap()
        .into_parts();

    assert_eq!(columns, vec!["n", "code", "missing", "list"]);
    let record = rows.next().await.unwrap().unwrap();
    assert_eq!(record.get("n"), Some(&Value::Int(1)));
    assert_eq!(record.get("code"), Some(&Value::from("CDG")));
    assert_eq!(record.get("missing"), Some(&Value::Null));
    assert!(rows.next().await.is_none());

    session.close().await.unwrap();
    client.close().await.unwrap();
}

#[tokio::test]
async fn test_syntax_error_is_query_error() {
    let Some(config) = get_test_config() else {
        eprintln!("Skipping test: NEO4J_TEST_URI not set");
        return;
    };

    let client = HttpGraphClient::new(&config).unwrap();
    let mut session = client.open_session().await.unwrap();

    let error = session.run("RETURN RETURN").await.unwrap_err();
    assert_eq!(error.category(), "Query Error");

    client.close().await.unwrap();
}

#[tokio::test]
async fn test_pipeline_against_live_server() {
    let Some(config) = get_test_config() else {
        eprintln!("Skipping test: NEO4J_TEST_URI not set");
        return;
    };

    let catalog = Catalog::new(
        vec![
            StatementEntry::new(
                "Remove test nodes",
                "MATCH (n:AirgraphTest) DETACH DELETE n",
            ),
            StatementEntry::new(
                "Create test airport",
                "CREATE (:AirgraphTest {name: 'Paris', code: 'CDG'})",
            ),
        ],
        vec![
            StatementEntry::new("Broken query", "MATCH (n) RETURN nope(n)"),
            StatementEntry::new(
                "Test airports",
                "MATCH (a:AirgraphTest) RETURN a.name AS Nom, a.code AS CodeIATA",
            ),
            StatementEntry::new("Cleanup", "MATCH (n:AirgraphTest) DETACH DELETE n"),
        ],
    );

    let client = db::connect(&config).unwrap();
    let mut pipeline = Pipeline::new(catalog);
    let (mut console, captured) = Console::capture();

    let report = pipeline
        .run(client, &config.display_string(), &mut console)
        .await
        .unwrap();

    assert_eq!(report.state, PipelineState::Done);
    assert_eq!(report.analysis.failures, vec!["Broken query".to_string()]);
    assert!(captured.stdout().contains("Nom | CodeIATA\n--------------\nParis | CDG\n"));
    assert!(captured
        .stdout()
        .contains("Statement executed, no tabular output to display."));
}
