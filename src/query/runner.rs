//! Phase execution.
//!
//! Runs a list of named statements in order against one session. The SETUP
//! phase stops at the first failure; the ANALYSIS phase reports a failure
//! and moves on to the next entry.

use tracing::{debug, info, warn};

use crate::catalog::StatementEntry;
use crate::console::Console;
use crate::db::{Counters, GraphSession};
use crate::error::{AirgraphError, Result};
use crate::query::render::{render, RenderedReport};

/// What happened during one phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseReport {
    /// Entries submitted to the server.
    pub submitted: usize,
    /// Descriptions of the entries that failed, in order.
    pub failures: Vec<String>,
}

impl PhaseReport {
    /// Entries that completed without error.
    pub fn succeeded(&self) -> usize {
        self.submitted - self.failures.len()
    }
}

/// Runs statements that change the database, stopping at the first failure.
///
/// Each statement is run to completion and its counters printed. On
/// failure the error is printed to stderr and returned as a mutation error
/// naming the step; later entries are never submitted.
pub async fn run_mutating(
    session: &mut dyn GraphSession,
    entries: &[StatementEntry],
    console: &mut Console,
) -> Result<PhaseReport> {
    let mut report = PhaseReport::default();

    for (idx, entry) in entries.iter().enumerate() {
        console.line("");
        console.line(format!("--- Running: {} ---", entry.description()));
        info!(
            "Setup step {}/{}: {}",
            idx + 1,
            entries.len(),
            entry.description()
        );

        report.submitted += 1;
        match execute_mutation(session, entry).await {
            Ok(counters) => {
                debug!("Step '{}' counters: {:?}", entry.description(), counters);
                console.line(format!("Success. {counters}"));
            }
            Err(e) => {
                console.error_line(format!(
                    "ERROR while running '{}': {}",
                    entry.description(),
                    e.cause()
                ));
                debug!("Setup step '{}' failed: {}", entry.description(), e);
                return Err(AirgraphError::mutation(entry.description(), e.cause()));
            }
        }
    }

    Ok(report)
}

async fn execute_mutation(
    session: &mut dyn GraphSession,
    entry: &StatementEntry,
) -> Result<Counters> {
    session.run(entry.statement()).await?.consume().await
}

/// Runs read-only statements and renders each result.
///
/// A failing entry is reported on stderr and recorded in the returned
/// report; the remaining entries still run.
pub async fn run_read_only(
    session: &mut dyn GraphSession,
    entries: &[StatementEntry],
    console: &mut Console,
) -> PhaseReport {
    let mut report = PhaseReport::default();

    for (idx, entry) in entries.iter().enumerate() {
        console.line("");
        console.line(format!("--- Analysis: {} ---", entry.description()));
        info!(
            "Analysis step {}/{}: {}",
            idx + 1,
            entries.len(),
            entry.description()
        );

        report.submitted += 1;
        match execute_query(session, entry, console).await {
            Ok(rendered) => {
                debug!(
                    "Step '{}' rendered {} rows",
                    entry.description(),
                    rendered.row_count()
                );
            }
            Err(e) => {
                console.error_line(format!(
                    "ERROR during analysis '{}': {}",
                    entry.description(),
                    e.cause()
                ));
                warn!("Analysis step '{}' failed: {}", entry.description(), e);
                report.failures.push(entry.description().to_string());
            }
        }
    }

    report
}

async fn execute_query(
    session: &mut dyn GraphSession,
    entry: &StatementEntry,
    console: &mut Console,
) -> Result<RenderedReport> {
    let (columns, rows) = session.run(entry.statement()).await?.into_parts();
    render(&columns, rows, console).await
}
