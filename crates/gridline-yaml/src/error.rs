//! Error types for configuration parsing.

use thiserror::Error;

/// Error type for configuration parsing.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A non-fatal problem found in a configuration.
///
/// The grid still renders; these are reported so the author can fix them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    /// No key field: rows are keyed by position
    #[error("no key_field set, rows are keyed by position")]
    MissingKeyField,
    /// Data source mode other than `url` or `json`
    #[error("unsupported source mode, no data will be loaded")]
    UnsupportedSourceMode,
    /// `json` source that is not an array
    #[error("inline json source is not an array of records")]
    InvalidInlineData,
    /// Date format that cannot be applied
    #[error("invalid date_format '{0}'")]
    InvalidDateFormat(String),
    /// Column referencing a formatter that is not registered
    #[error("column '{column}' references unknown renderer '{renderer}'")]
    UnknownRenderer {
        /// Column key
        column: String,
        /// Renderer name
        renderer: String,
    },
    /// Two columns with the same key
    #[error("duplicate column key '{0}'")]
    DuplicateColumn(String),
    /// Initial sort on a column that does not exist
    #[error("sort references unknown column '{0}'")]
    UnknownSortColumn(String),
    /// Page size of zero
    #[error("page_size must be at least 1")]
    ZeroPageSize,
}
