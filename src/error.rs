//! Error handling module for the Harvester console
//!
//! Provides centralized error handling with proper error types using thiserror.
//! User-correctable problems never travel through these types: validators
//! return display strings and screens render them inline. These errors cover
//! probe failures, screen wiring mistakes and terminal problems.

use crate::screens::ScreenId;
use thiserror::Error;

/// Main error type for the console
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// IO errors (file operations, terminal, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A screen was looked up that was never registered
    #[error("screen {0} not found")]
    ScreenNotFound(ScreenId),

    /// A screen was registered twice during start-up
    #[error("screen {0} registered twice")]
    DuplicateScreen(ScreenId),

    /// A blocking probe (shell command, HTTP request) failed
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// State errors (unexpected task payloads, missing wizard data)
    #[error("State error: {0}")]
    State(String),

    /// Settings and configuration file errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// General errors (catch-all for edge cases)
    #[error("{0}")]
    General(String),
}

/// Result type alias for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

impl ConsoleError {
    /// Create a state error
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a general error
    pub fn general(msg: impl Into<String>) -> Self {
        Self::General(msg.into())
    }
}

/// Failure of a single blocking probe.
///
/// The `Display` output is shown to the user verbatim (spinner message,
/// status line), so variants keep the collaborator's own wording.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The command could not be started at all
    #[error("failed to run {command}: {reason}")]
    Spawn { command: String, reason: String },

    /// The command ran and exited non-zero
    #[error("{command} failed: {output}")]
    Command { command: String, output: String },

    /// An HTTP request failed or returned a non-success status
    #[error("{0}")]
    Http(String),

    /// The probe produced output it could not interpret
    #[error("unexpected output from {source_name}: {detail}")]
    Parse { source_name: String, detail: String },

    /// Anything else the probe wants to report
    #[error("{0}")]
    Other(String),
}

impl ProbeError {
    /// Create a parse error for the named probe
    pub fn parse(source_name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            detail: detail.into(),
        }
    }

    /// Create a free-form probe error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
