//! Neo4j client over the HTTP transactional API.
//!
//! Every statement is sent to `POST /db/{database}/tx/commit` as its own
//! auto-committed transaction, with statistics enabled so write statements
//! report their mutation counters.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;
use url::Url;

use crate::config::ConnectionConfig;
use crate::db::{
    Counters, GraphClient, GraphSession, Node, Record, Relationship, StatementResult, Value,
};
use crate::error::{AirgraphError, Result};

/// Neo4j HTTP client.
#[derive(Debug)]
pub struct HttpGraphClient {
    transport: Transport,
    closed: AtomicBool,
}

impl HttpGraphClient {
    /// Creates a client for the configured server. Does not contact it.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let endpoint = commit_endpoint(&config.base_url()?, config.database_name())?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs()))
            .build()
            .map_err(|e| AirgraphError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            transport: Transport {
                client,
                endpoint,
                user: config.user_name().to_string(),
                password: config.password.clone(),
                timeout_secs: config.timeout_secs(),
            },
            closed: AtomicBool::new(false),
        })
    }

    /// The commit endpoint statements are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.transport.endpoint
    }
}

#[async_trait]
impl GraphClient for HttpGraphClient {
    async fn verify_connectivity(&self) -> Result<()> {
        debug!("Verifying connectivity to {}", self.transport.endpoint);

        let response = self.transport.commit(Vec::new()).await.map_err(|e| match e {
            AirgraphError::Connection(_) => e,
            other => AirgraphError::connection(other.cause().to_string()),
        })?;

        if let Some(message) = server_error_message(&response.errors) {
            return Err(AirgraphError::connection(message));
        }

        debug!("Server accepted credentials for user '{}'", self.transport.user);
        Ok(())
    }

    async fn open_session(&self) -> Result<Box<dyn GraphSession>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AirgraphError::connection("Connection already closed"));
        }

        Ok(Box::new(HttpSession {
            transport: self.transport.clone(),
            statements_run: 0,
        }))
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            debug!("Closed connection to {}", self.transport.endpoint);
        }
        Ok(())
    }
}

struct HttpSession {
    transport: Transport,
    statements_run: usize,
}

#[async_trait]
impl GraphSession for HttpSession {
    async fn run(&mut self, statement: &str) -> Result<StatementResult> {
        self.statements_run += 1;
        debug!(
            "Submitting statement #{}: {}",
            self.statements_run,
            statement.trim()
        );

        let response = self
            .transport
            .commit(vec![StatementRequest::new(statement)])
            .await?;

        if let Some(message) = server_error_message(&response.errors) {
            return Err(AirgraphError::query(message));
        }

        let payload = response.results.into_iter().next().unwrap_or_default();
        Ok(into_statement_result(payload))
    }

    async fn close(&mut self) -> Result<()> {
        debug!("Session closed after {} statements", self.statements_run);
        Ok(())
    }
}

/// Shared request plumbing for the client and its sessions.
#[derive(Clone)]
struct Transport {
    client: Client,
    endpoint: Url,
    user: String,
    password: Option<String>,
    timeout_secs: u64,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("endpoint", &self.endpoint.as_str())
            .field("user", &self.user)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl Transport {
    async fn commit(&self, statements: Vec<StatementRequest<'_>>) -> Result<CommitResponse> {
        let request = CommitRequest { statements };

        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.user, self.password.as_ref())
            .header("Accept", "application/json;charset=UTF-8")
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AirgraphError::query(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(self.parse_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| AirgraphError::internal(format!("Failed to parse response: {e}")))
    }

    fn map_request_error(&self, error: reqwest::Error) -> AirgraphError {
        if error.is_connect() {
            AirgraphError::connection(format!(
                "Cannot reach Neo4j at {}: {}",
                self.endpoint.origin().ascii_serialization(),
                error
            ))
        } else if error.is_timeout() {
            AirgraphError::query(format!(
                "Statement timed out after {} seconds",
                self.timeout_secs
            ))
        } else {
            AirgraphError::query(format!("Request failed: {error}"))
        }
    }

    fn parse_error(&self, status: StatusCode, body: &str) -> AirgraphError {
        if status == StatusCode::UNAUTHORIZED {
            return AirgraphError::connection(format!(
                "Authentication rejected for user '{}'",
                self.user
            ));
        }

        if status == StatusCode::FORBIDDEN {
            return AirgraphError::connection(format!("Access denied for user '{}'", self.user));
        }

        if let Ok(response) = serde_json::from_str::<CommitResponse>(body) {
            if let Some(message) = server_error_message(&response.errors) {
                return AirgraphError::query(message);
            }
        }

        AirgraphError::query(format!("Neo4j HTTP error ({status}): {body}"))
    }
}

/// Builds `<base>/db/<database>/tx/commit`.
fn commit_endpoint(base: &Url, database: &str) -> Result<Url> {
    base.join(&format!("db/{database}/tx/commit"))
        .map_err(|e| AirgraphError::config(format!("Invalid database name '{database}': {e}")))
}

fn server_error_message(errors: &[ServerError]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }

    let messages: Vec<String> = errors
        .iter()
        .map(|e| format!("{}: {}", e.code, e.message))
        .collect();
    Some(messages.join("; "))
}

/// Turns one statement payload into a result whose rows decode on demand.
fn into_statement_result(payload: ResultPayload) -> StatementResult {
    let ResultPayload {
        columns,
        data,
        stats,
    } = payload;

    let keys: Arc<[String]> = columns.clone().into();
    let records = data
        .into_iter()
        .map(move |row| Ok(Record::new(Arc::clone(&keys), decode_row(row))));

    StatementResult::new(columns, stream::iter(records).boxed(), stats)
}

fn decode_row(row: RowPayload) -> Vec<Value> {
    let mut meta = row.meta.into_iter();
    row.row
        .into_iter()
        .map(|value| decode_value(value, &meta.next().unwrap_or(JsonValue::Null)))
        .collect()
}

/// Decodes a row value, using its `meta` entry to recover graph elements.
fn decode_value(value: JsonValue, meta: &JsonValue) -> Value {
    match (value, meta) {
        (JsonValue::Object(map), JsonValue::Object(_)) => match element_type(meta) {
            Some("node") => Value::Node(Node {
                id: element_id(meta),
                properties: decode_properties(map),
            }),
            Some("relationship") => Value::Relationship(Relationship {
                id: element_id(meta),
                properties: decode_properties(map),
            }),
            _ => Value::from(JsonValue::Object(map)),
        },
        (JsonValue::Array(items), JsonValue::Array(metas)) if items.len() == metas.len() => {
            let elements: Vec<Value> = items
                .into_iter()
                .zip(metas.iter())
                .map(|(item, item_meta)| decode_value(item, item_meta))
                .collect();

            if is_path(metas) {
                Value::Path(elements)
            } else {
                Value::List(elements)
            }
        }
        (value, _) => Value::from(value),
    }
}

fn decode_properties(map: serde_json::Map<String, JsonValue>) -> BTreeMap<String, Value> {
    map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
}

fn element_type(meta: &JsonValue) -> Option<&str> {
    meta.get("type").and_then(JsonValue::as_str)
}

fn element_id(meta: &JsonValue) -> Option<String> {
    meta.get("elementId")
        .and_then(JsonValue::as_str)
        .map(String::from)
        .or_else(|| meta.get("id").and_then(JsonValue::as_i64).map(|id| id.to_string()))
}

/// A path's meta alternates node and relationship entries, starting and
/// ending with a node.
fn is_path(metas: &[JsonValue]) -> bool {
    metas.len() >= 3
        && metas.len() % 2 == 1
        && metas.iter().enumerate().all(|(idx, meta)| {
            let expected = if idx % 2 == 0 { "node" } else { "relationship" };
            element_type(meta) == Some(expected)
        })
}

// Neo4j HTTP API types

#[derive(Debug, Serialize)]
struct CommitRequest<'a> {
    statements: Vec<StatementRequest<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatementRequest<'a> {
    statement: &'a str,
    include_stats: bool,
    result_data_contents: [&'static str; 1],
}

impl<'a> StatementRequest<'a> {
    fn new(statement: &'a str) -> Self {
        Self {
            statement,
            include_stats: true,
            result_data_contents: ["row"],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct CommitResponse {
    #[serde(default)]
    results: Vec<ResultPayload>,
    #[serde(default)]
    errors: Vec<ServerError>,
}

#[derive(Debug, Default, Deserialize)]
struct ResultPayload {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<RowPayload>,
    #[serde(default)]
    stats: Counters,
}

#[derive(Debug, Deserialize)]
struct RowPayload {
    #[serde(default)]
    row: Vec<JsonValue>,
    #[serde(default)]
    meta: Vec<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct ServerError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(body: JsonValue) -> CommitResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_commit_endpoint() {
        let base = Url::parse("http://localhost:7474/").unwrap();
        let endpoint = commit_endpoint(&base, "neo4j").unwrap();
        assert_eq!(
            endpoint.as_str(),
            "http://localhost:7474/db/neo4j/tx/commit"
        );
    }

    #[test]
    fn test_client_endpoint_from_config() {
        let config = ConnectionConfig {
            uri: Some("https://graph.example.com:7473/proxy".to_string()),
            database: Some("flights".to_string()),
            ..Default::default()
        };
        let client = HttpGraphClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint().as_str(),
            "https://graph.example.com:7473/proxy/db/flights/tx/commit"
        );
    }

    #[test]
    fn test_statement_request_shape() {
        let request = CommitRequest {
            statements: vec![StatementRequest::new("RETURN 1")],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "statements": [{
                    "statement": "RETURN 1",
                    "includeStats": true,
                    "resultDataContents": ["row"]
                }]
            })
        );
    }

    #[test]
    fn test_server_error_message() {
        let response = parse(json!({
            "results": [],
            "errors": [{
                "code": "Neo.ClientError.Statement.SyntaxError",
                "message": "Invalid input 'MATC'"
            }]
        }));
        assert_eq!(
            server_error_message(&response.errors).unwrap(),
            "Neo.ClientError.Statement.SyntaxError: Invalid input 'MATC'"
        );
        assert!(server_error_message(&[]).is_none());
    }

    #[tokio::test]
    async fn test_decode_scalar_rows_and_stats() {
        let response = parse(json!({
            "results": [{
                "columns": ["Nom", "CodeIATA"],
                "data": [
                    {"row": ["Paris", "CDG"], "meta": [null, null]},
                    {"row": ["Nantes", null], "meta": [null, null]}
                ],
                "stats": {"contains_updates": false, "nodes_created": 0}
            }],
            "errors": []
        }));

        let result = into_statement_result(response.results.into_iter().next().unwrap());
        assert_eq!(result.counters, Counters::default());

        let (columns, records) = result.into_parts();
        let records: Vec<Record> = records.map(|r| r.unwrap()).collect().await;

        assert_eq!(columns, vec!["Nom".to_string(), "CodeIATA".to_string()]);
        assert_eq!(records[0].get("CodeIATA"), Some(&Value::from("CDG")));
        assert_eq!(records[1].get("CodeIATA"), Some(&Value::Null));
    }

    #[test]
    fn test_decode_node_with_meta() {
        let value = decode_value(
            json!({"IATA": "CDG", "city": "Paris"}),
            &json!({"id": 12, "elementId": "4:abc:12", "type": "node", "deleted": false}),
        );

        match value {
            Value::Node(node) => {
                assert_eq!(node.id.as_deref(), Some("4:abc:12"));
                assert_eq!(node.properties.get("city"), Some(&Value::from("Paris")));
            }
            other => panic!("Expected Node, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_path_with_meta() {
        let value = decode_value(
            json!([{"IATA": "NTE"}, {"airline": "Air France"}, {"IATA": "CDG"}]),
            &json!([
                {"id": 1, "type": "node", "deleted": false},
                {"id": 9, "type": "relationship", "deleted": false},
                {"id": 2, "type": "node", "deleted": false}
            ]),
        );

        assert_eq!(
            value.to_display_string(),
            "(1:{IATA: NTE})-[9:{airline: Air France}]-(2:{IATA: CDG})"
        );
    }

    #[test]
    fn test_decode_list_of_scalars() {
        let value = decode_value(json!(["NTE", "CDG", "SLC"]), &json!([null, null, null]));
        assert_eq!(value, Value::from(vec!["NTE", "CDG", "SLC"]));

        let value = decode_value(json!([1, 2]), &JsonValue::Null);
        assert_eq!(value.to_display_string(), "[1, 2]");
    }

    #[test]
    fn test_decode_unknown_meta_type_keeps_map() {
        let value = decode_value(
            json!({"type": "Point", "coordinates": [2.55, 49.01]}),
            &json!({"type": "point"}),
        );
        assert!(matches!(value, Value::Map(_)));
    }

    #[test]
    fn test_is_path_requires_alternation() {
        let node = json!({"type": "node"});
        let rel = json!({"type": "relationship"});
        assert!(is_path(&[node.clone(), rel.clone(), node.clone()]));
        assert!(!is_path(&[node.clone(), node.clone(), node.clone()]));
        assert!(!is_path(&[node.clone(), rel]));
        assert!(!is_path(&[node]));
    }

    #[test]
    fn test_empty_payload_has_no_columns() {
        let response = parse(json!({"results": [{"columns": [], "data": [], "stats": {
            "contains_updates": true, "indexes_added": 1
        }}], "errors": []}));

        let result = into_statement_result(response.results.into_iter().next().unwrap());
        assert!(result.columns.is_empty());
        assert_eq!(result.counters.indexes_added, 1);
    }
}
