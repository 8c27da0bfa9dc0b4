//! Configuration manifests for Gridline tables.
//!
//! A grid is described by a [`GridConfig`], written as YAML or JSON:
//!
//! ```yaml
//! key_field: id
//! columns:
//!   - key: id
//!     title: ID
//!   - key: name
//!     title: Name
//! paging:
//!   enabled: true
//!   page_size: 25
//! ```

mod error;
mod manifest;

pub use error::{ConfigError, ConfigIssue};
pub use manifest::{GridConfig, SourceConfig, SourceMode};
