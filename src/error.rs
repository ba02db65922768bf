//! Error types for Airgraph.
//!
//! Defines the main error enum used throughout the pipeline.

use thiserror::Error;

/// Main error type for Airgraph operations.
#[derive(Error, Debug)]
pub enum AirgraphError {
    /// Database connection errors (server unreachable, auth rejected, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// A SETUP statement failed. Fatal to the run.
    #[error("Setup step '{step}' failed: {cause}")]
    Mutation { step: String, cause: String },

    /// Statement execution errors (syntax errors, unknown properties, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (invalid config file, bad URI, bad catalog, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected response shapes, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AirgraphError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a mutation error for the named setup step.
    pub fn mutation(step: impl Into<String>, cause: impl ToString) -> Self {
        Self::Mutation {
            step: step.into(),
            cause: cause.to_string(),
        }
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Mutation { .. } => "Setup Error",
            Self::Query(_) => "Query Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }

    /// Returns the underlying cause without the category prefix.
    pub fn cause(&self) -> &str {
        match self {
            Self::Connection(msg)
            | Self::Query(msg)
            | Self::Config(msg)
            | Self::Internal(msg) => msg,
            Self::Mutation { cause, .. } => cause,
        }
    }
}

/// Result type alias using AirgraphError.
pub type Result<T> = std::result::Result<T, AirgraphError>;
