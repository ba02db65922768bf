//! End-to-end pipeline tests against the mock client.

use airgraph::catalog::{Catalog, StatementEntry};
use airgraph::console::Console;
use airgraph::db::{MockGraphClient, Value};
use airgraph::error::AirgraphError;
use airgraph::pipeline::{Pipeline, PipelineState};
use pretty_assertions::assert_eq;

fn entry(description: &str, statement: &str) -> StatementEntry {
    StatementEntry::new(description, statement)
}

#[tokio::test]
async fn test_failing_setup_never_attempts_analysis() {
    let mock = MockGraphClient::new().with_failure("LOAD CSV bad", "Couldn't load the external resource");
    let catalog = Catalog::new(
        vec![entry("Import airports", "LOAD CSV bad")],
        vec![entry("Airports in France", "MATCH (a:Airport) RETURN a.name")],
    );
    let mut pipeline = Pipeline::new(catalog);
    let (mut console, captured) = Console::capture();

    let err = pipeline
        .run(Box::new(mock.clone()), "mock", &mut console)
        .await
        .unwrap_err();

    assert_eq!(err.category(), "Setup Error");
    assert!(matches!(err, AirgraphError::Mutation { ref step, .. } if step == "Import airports"));
    assert_eq!(mock.submitted(), vec!["LOAD CSV bad".to_string()]);
    assert_eq!(pipeline.state(), PipelineState::Failed);
    assert!(mock.is_closed());
    assert!(!captured.stdout().contains("Airports in France"));
    assert!(captured
        .stderr()
        .contains("ERROR while running 'Import airports': Couldn't load the external resource"));
}

#[tokio::test]
async fn test_analysis_failure_then_table() {
    let mock = MockGraphClient::new()
        .with_failure("BROKEN", "Unknown function 'apoc.nope'")
        .with_rows(
            "FRENCH",
            &["Nom", "CodeIATA"],
            vec![vec![Value::from("Paris"), Value::from("CDG")]],
        );
    let catalog = Catalog::new(
        vec![
            entry("Wipe the database", "WIPE"),
            entry("Import airports", "IMPORT"),
        ],
        vec![
            entry("Broken query", "BROKEN"),
            entry("French airports", "FRENCH"),
        ],
    );
    let mut pipeline = Pipeline::new(catalog);
    let (mut console, captured) = Console::capture();

    let report = pipeline
        .run(Box::new(mock.clone()), "mock", &mut console)
        .await
        .unwrap();

    assert_eq!(report.state, PipelineState::Done);
    assert_eq!(report.setup.submitted, 2);
    assert_eq!(report.analysis.failures, vec!["Broken query".to_string()]);
    assert_eq!(
        mock.submitted(),
        vec![
            "WIPE".to_string(),
            "IMPORT".to_string(),
            "BROKEN".to_string(),
            "FRENCH".to_string(),
        ]
    );
    assert_eq!(
        captured.stderr(),
        "ERROR during analysis 'Broken query': Unknown function 'apoc.nope'\n"
    );
    assert!(captured.stdout().contains(
        "--- Analysis: French airports ---\n\
         Nom | CodeIATA\n\
         --------------\n\
         Paris | CDG\n\
         (1 lines returned)\n"
    ));
    assert_eq!(mock.sessions_opened(), 1);
    assert_eq!(mock.sessions_closed(), 1);
    assert!(mock.is_closed());
}

#[tokio::test]
async fn test_unreachable_server_reports_and_submits_nothing() {
    let mock = MockGraphClient::unreachable("Connection refused");
    let mut pipeline = Pipeline::new(Catalog::builtin());
    let (mut console, captured) = Console::capture();

    let err = pipeline
        .run(Box::new(mock.clone()), "neo4j@http://localhost:7474/ (neo4j)", &mut console)
        .await
        .unwrap_err();

    assert_eq!(err.category(), "Connection Error");
    assert!(mock.submitted().is_empty());
    assert!(captured
        .stderr()
        .contains("Unable to connect to the database at neo4j@http://localhost:7474/ (neo4j)"));
}

#[tokio::test]
async fn test_builtin_catalog_runs_in_order() {
    let catalog = Catalog::builtin();
    let expected: Vec<String> = catalog
        .setup()
        .iter()
        .chain(catalog.analysis())
        .map(|e| e.statement().to_string())
        .collect();

    let mock = MockGraphClient::new();
    let mut pipeline = Pipeline::new(catalog);
    let (mut console, _captured) = Console::capture();

    let report = pipeline
        .run(Box::new(mock.clone()), "mock", &mut console)
        .await
        .unwrap();

    assert_eq!(report.analysis.succeeded(), report.analysis.submitted);
    assert_eq!(mock.submitted(), expected);
}
