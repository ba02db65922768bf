//! Mock graph client for testing.
//!
//! Serves scripted responses keyed by statement text and records every
//! statement it receives, so tests can assert on submission order.

use super::{Counters, GraphClient, GraphSession, Record, StatementResult, Value};
use crate::error::{AirgraphError, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Scripted outcome for one statement.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Tabular result.
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },

    /// Write result with no columns.
    Counters(Counters),

    /// The server rejects the statement.
    Fail(String),

    /// Columns and some rows arrive, then the stream fails.
    FailMidStream {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
        message: String,
    },
}

#[derive(Debug, Default)]
struct MockState {
    submitted: Vec<String>,
    sessions_opened: usize,
    sessions_closed: usize,
    closed: bool,
}

/// A mock graph client that returns predefined results.
///
/// Clones share state, so a test can keep a handle after boxing one copy
/// as a `GraphClient`.
#[derive(Debug, Clone, Default)]
pub struct MockGraphClient {
    responses: Arc<HashMap<String, MockResponse>>,
    unreachable: Option<String>,
    state: Arc<Mutex<MockState>>,
}

impl MockGraphClient {
    /// Creates a mock that accepts every statement with no changes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock whose connectivity check fails with the given message.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            unreachable: Some(message.into()),
            ..Self::default()
        }
    }

    /// Scripts the response for a statement.
    pub fn with_response(mut self, statement: impl Into<String>, response: MockResponse) -> Self {
        Arc::make_mut(&mut self.responses).insert(statement.into(), response);
        self
    }

    /// Scripts a tabular response for a statement.
    pub fn with_rows(
        self,
        statement: impl Into<String>,
        columns: &[&str],
        rows: Vec<Vec<Value>>,
    ) -> Self {
        let columns = columns.iter().map(|c| c.to_string()).collect();
        self.with_response(statement, MockResponse::Rows { columns, rows })
    }

    /// Scripts a failure for a statement.
    pub fn with_failure(self, statement: impl Into<String>, message: impl Into<String>) -> Self {
        self.with_response(statement, MockResponse::Fail(message.into()))
    }

    /// Statements submitted so far, in submission order.
    pub fn submitted(&self) -> Vec<String> {
        self.lock().submitted.clone()
    }

    /// Number of sessions opened.
    pub fn sessions_opened(&self) -> usize {
        self.lock().sessions_opened
    }

    /// Number of sessions closed.
    pub fn sessions_closed(&self) -> usize {
        self.lock().sessions_closed
    }

    /// Returns true once the client has been closed.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl GraphClient for MockGraphClient {
    async fn verify_connectivity(&self) -> Result<()> {
        match &self.unreachable {
            Some(message) => Err(AirgraphError::connection(message.clone())),
            None => Ok(()),
        }
    }

    async fn open_session(&self) -> Result<Box<dyn GraphSession>> {
        let mut state = self.lock();
        if state.closed {
            return Err(AirgraphError::connection("Connection already closed"));
        }
        state.sessions_opened += 1;

        Ok(Box::new(MockSession {
            responses: Arc::clone(&self.responses),
            state: Arc::clone(&self.state),
        }))
    }

    async fn close(&self) -> Result<()> {
        self.lock().closed = true;
        Ok(())
    }
}

struct MockSession {
    responses: Arc<HashMap<String, MockResponse>>,
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl GraphSession for MockSession {
    async fn run(&mut self, statement: &str) -> Result<StatementResult> {
        lock_state(&self.state).submitted.push(statement.to_string());

        match self.responses.get(statement).cloned() {
            None => Ok(StatementResult::empty(Counters::default())),
            Some(MockResponse::Counters(counters)) => Ok(StatementResult::empty(counters)),
            Some(MockResponse::Rows { columns, rows }) => Ok(StatementResult::from_rows(
                columns,
                rows,
                Counters::default(),
            )),
            Some(MockResponse::Fail(message)) => Err(AirgraphError::query(message)),
            Some(MockResponse::FailMidStream {
                columns,
                rows,
                message,
            }) => {
                let keys: Arc<[String]> = columns.clone().into();
                let records = rows
                    .into_iter()
                    .map(move |values| Ok(Record::new(Arc::clone(&keys), values)))
                    .chain(std::iter::once(Err(AirgraphError::query(message))));

                Ok(StatementResult::new(
                    columns,
                    stream::iter(records).boxed(),
                    Counters::default(),
                ))
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        lock_state(&self.state).sessions_closed += 1;
        Ok(())
    }
}
