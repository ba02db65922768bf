//! Pipeline driver.
//!
//! Connects, runs the SETUP phase, runs the ANALYSIS phase and disconnects.
//! The session and the connection are closed on every path, including a
//! failed setup step.

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::connection::ConnectionManager;
use crate::console::Console;
use crate::db::{GraphClient, GraphSession};
use crate::error::{AirgraphError, Result};
use crate::query::{run_mutating, run_read_only, PhaseReport};

/// Where a pipeline run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Disconnected,
    Connected,
    SettingUp,
    Analyzing,
    Done,
    Failed,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub state: PipelineState,
    pub setup: PhaseReport,
    pub analysis: PhaseReport,
}

/// Runs a statement catalog against one connection.
#[derive(Debug, Clone)]
pub struct Pipeline {
    catalog: Catalog,
    state: PipelineState,
    history: Vec<PipelineState>,
}

impl Pipeline {
    /// Creates a pipeline for the given catalog.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            state: PipelineState::Disconnected,
            history: vec![PipelineState::Disconnected],
        }
    }

    /// The catalog this pipeline runs.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state entered so far, oldest first.
    pub fn history(&self) -> &[PipelineState] {
        &self.history
    }

    /// Runs both phases against `client`.
    ///
    /// Returns the connection error if the server cannot be reached, or the
    /// mutation error of the first failing SETUP entry. Failed ANALYSIS
    /// entries are reported on the console and counted, but the run still
    /// succeeds.
    pub async fn run(
        &mut self,
        client: Box<dyn GraphClient>,
        target: &str,
        console: &mut Console,
    ) -> Result<PipelineReport> {
        self.transition(PipelineState::Disconnected);

        let mut manager = match ConnectionManager::establish(client, target).await {
            Ok(manager) => manager,
            Err(e) => {
                report_connection_failure(console, target, &e);
                self.transition(PipelineState::Failed);
                return Err(e);
            }
        };
        self.transition(PipelineState::Connected);

        let rule = "=".repeat(50);
        console.line(&rule);
        console.line(format!("Connected to Neo4j at {target}"));
        console.line(&rule);

        let outcome = self.run_session(&manager, console).await;

        if let Err(e) = manager.close().await {
            warn!("Failed to close connection: {}", e);
        }

        match outcome {
            Ok((setup, analysis)) => {
                self.transition(PipelineState::Done);
                if !analysis.failures.is_empty() {
                    console.line("");
                    console.line(format!(
                        "({} of {} analysis queries failed)",
                        analysis.failures.len(),
                        analysis.submitted
                    ));
                }
                console.banner("Pipeline completed successfully");
                info!(
                    "Pipeline done: {} setup steps, {}/{} analysis queries succeeded",
                    setup.submitted,
                    analysis.succeeded(),
                    analysis.submitted
                );

                Ok(PipelineReport {
                    state: self.state,
                    setup,
                    analysis,
                })
            }
            Err(e) => {
                self.transition(PipelineState::Failed);
                console.error_line("");
                console.error_line(format!("=== Pipeline aborted: {e} ==="));
                debug!("Pipeline aborted: {}", e);
                Err(e)
            }
        }
    }

    async fn run_session(
        &mut self,
        manager: &ConnectionManager,
        console: &mut Console,
    ) -> Result<(PhaseReport, PhaseReport)> {
        self.transition(PipelineState::SettingUp);
        let mut session = manager.open_session().await?;
        let outcome = self.run_phases(session.as_mut(), console).await;

        if let Err(e) = session.close().await {
            warn!("Failed to close session: {}", e);
        }

        outcome
    }

    async fn run_phases(
        &mut self,
        session: &mut dyn GraphSession,
        console: &mut Console,
    ) -> Result<(PhaseReport, PhaseReport)> {
        console.banner("STEP 1: SETUP AND DATA IMPORT");
        let setup = run_mutating(session, self.catalog.setup(), console).await?;

        self.transition(PipelineState::Analyzing);
        console.line("");
        console.banner("STEP 2: ANALYSIS QUERIES");
        let analysis = run_read_only(session, self.catalog.analysis(), console).await;

        Ok((setup, analysis))
    }

    fn transition(&mut self, next: PipelineState) {
        if self.state != next {
            debug!("Pipeline state: {:?} -> {:?}", self.state, next);
            self.history.push(next);
        }
        self.state = next;
    }
}

fn report_connection_failure(console: &mut Console, target: &str, err: &AirgraphError) {
    console.error_line(format!(
        "ERROR: Unable to connect to the database at {target}"
    ));
    console.error_line(format!("Details: {}", err.cause()));
    console.error_line("");
    console.error_line("Make sure the Neo4j server is running and the credentials are correct.");
}
