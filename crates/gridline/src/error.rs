//! Error types for the grid controller.

use gridline_core::{ExportError, ReconcileError};
use gridline_yaml::ConfigError;
use thiserror::Error;

/// Failure to obtain records.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Payload is not valid JSON
    #[error("invalid JSON payload: {0}")]
    Parse(#[from] serde_json::Error),
    /// Payload is valid JSON but not an array
    #[error("expected a JSON array of records, got {0}")]
    NotAnArray(&'static str),
    /// Request could not be made or read
    #[error("request failed: {0}")]
    Request(String),
    /// Server answered with an error status
    #[error("server answered {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },
}

/// Errors surfaced by grid operations.
#[derive(Debug, Error)]
pub enum GridError {
    /// Configuration could not be parsed
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Records could not be loaded
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Rows could not be reconciled
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    /// Export failed
    #[error(transparent)]
    Export(#[from] ExportError),
    /// No displayed row has this key
    #[error("no row with key '{0}'")]
    UnknownRow(String),
    /// No callback registered for this action
    #[error("no handler for action '{0}'")]
    UnknownAction(String),
    /// Editing is disabled
    #[error("grid is not editable")]
    NotEditable,
    /// `end_edit` without `start_edit`
    #[error("no edit in progress")]
    NoEditInProgress,
}
