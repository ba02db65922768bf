//! Connection manager for the database lifecycle.

use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::db::{self, GraphClient, GraphSession};
use crate::error::{AirgraphError, Result};

/// Owns the single connection used by a pipeline run.
pub struct ConnectionManager {
    client: Option<Box<dyn GraphClient>>,
    target: String,
}

impl ConnectionManager {
    /// Builds a client from the configuration and verifies it.
    ///
    /// Fails with a connection error if the server is unreachable or rejects
    /// the credentials.
    pub async fn acquire(config: &ConnectionConfig) -> Result<Self> {
        let client = db::connect(config)?;
        Self::establish(client, config.display_string()).await
    }

    /// Verifies an already-built client and takes ownership of it.
    pub async fn establish(client: Box<dyn GraphClient>, target: impl Into<String>) -> Result<Self> {
        let target = target.into();
        debug!("Connecting to {}", target);

        client.verify_connectivity().await?;
        info!("Connected to {}", target);

        Ok(Self {
            client: Some(client),
            target,
        })
    }

    /// Display-safe description of the server.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Check if the connection is still open.
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Opens a session on the connection.
    pub async fn open_session(&self) -> Result<Box<dyn GraphSession>> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| AirgraphError::connection("Connection already closed"))?;
        client.open_session().await
    }

    /// Closes the connection. Calling it again is a no-op.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client.close().await?;
            info!("Disconnected from {}", self.target);
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("target", &self.target)
            .field("connected", &self.is_connected())
            .finish()
    }
}
