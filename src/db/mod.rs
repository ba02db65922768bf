//! Graph database abstraction layer for Airgraph.
//!
//! Provides a trait-based interface for the database boundary: a client
//! (the connection) hands out sessions, and a session submits statement
//! text and returns either records or an error.

mod http;
mod mock;
mod types;

pub use http::HttpGraphClient;
pub use mock::{MockGraphClient, MockResponse};
pub use types::{Counters, Node, Record, RecordStream, Relationship, StatementResult, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Creates a graph client for the given configuration.
///
/// The client is not verified here; `ConnectionManager::establish` checks
/// that the server is reachable and accepts the credentials.
pub fn connect(config: &ConnectionConfig) -> Result<Box<dyn GraphClient>> {
    let client = HttpGraphClient::new(config)?;
    Ok(Box::new(client))
}

/// Trait defining the interface for graph database clients.
///
/// A client represents one connection to the server for the whole run.
#[async_trait]
pub trait GraphClient: Send + Sync {
    /// Checks that the server is reachable and the credentials are accepted.
    async fn verify_connectivity(&self) -> Result<()>;

    /// Opens a session for submitting statements.
    async fn open_session(&self) -> Result<Box<dyn GraphSession>>;

    /// Closes the connection.
    async fn close(&self) -> Result<()>;
}

/// A session on an open connection. Statements run one at a time.
#[async_trait]
pub trait GraphSession: Send {
    /// Submits a statement and returns its columns, records and counters.
    async fn run(&mut self, statement: &str) -> Result<StatementResult>;

    /// Closes the session.
    async fn close(&mut self) -> Result<()>;
}
