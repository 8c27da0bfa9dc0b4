//! Export hand-off: a plain-text snapshot of what the grid shows.
//!
//! Encoding the snapshot (spreadsheet, CSV, ...) is left to a
//! [`TableExporter`] supplied by the caller; [`JsonExporter`] is provided for
//! headless use.

use crate::column::DataType;
use crate::date;
use crate::header::HeaderLayout;
use crate::render::FormatOptions;
use crate::value::Record;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A header cell of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotCell {
    /// Display title
    pub title: String,
    /// Leaf columns spanned
    pub colspan: usize,
    /// Header rows spanned
    pub rowspan: usize,
}

/// Headers and body text of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Header rows, top to bottom
    pub header: Vec<Vec<SnapshotCell>>,
    /// Body rows as display text, one entry per leaf column
    pub rows: Vec<Vec<String>>,
}

impl TableSnapshot {
    /// Capture a layout and the given records.
    #[must_use]
    pub fn capture(layout: &HeaderLayout, records: &[&Record], options: &FormatOptions) -> Self {
        let header = layout
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| SnapshotCell {
                        title: cell.title.clone(),
                        colspan: cell.colspan,
                        rowspan: cell.rowspan,
                    })
                    .collect()
            })
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                layout
                    .leaves
                    .iter()
                    .map(|leaf| {
                        let Some(value) = record.get(&leaf.key).filter(|v| !v.is_empty()) else {
                            return options.null_placeholder.clone();
                        };
                        match (leaf.datatype, &options.date_format) {
                            (Some(DataType::Date), Some(format)) => date::format_value(value, format)
                                .unwrap_or_else(|| value.display()),
                            _ => value.display(),
                        }
                    })
                    .collect()
            })
            .collect();

        Self { header, rows }
    }

    /// Number of leaf columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.header
            .first()
            .map_or(0, |row| row.iter().map(|c| c.colspan).sum())
    }
}

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Snapshot could not be encoded
    #[error("failed to encode table: {0}")]
    Encode(String),
    /// Snapshot has nothing to export
    #[error("table has no columns")]
    NoColumns,
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encode(err.to_string())
    }
}

/// Encodes a snapshot into a file format.
pub trait TableExporter {
    /// Encode the snapshot.
    fn export(&self, snapshot: &TableSnapshot) -> Result<Vec<u8>, ExportError>;

    /// Suggested file extension.
    fn extension(&self) -> &str;
}

/// Exports a snapshot as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonExporter {
    /// Pretty-print the output
    pub pretty: bool,
}

impl TableExporter for JsonExporter {
    fn export(&self, snapshot: &TableSnapshot) -> Result<Vec<u8>, ExportError> {
        if snapshot.column_count() == 0 {
            return Err(ExportError::NoColumns);
        }
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(snapshot)?
        } else {
            serde_json::to_vec(snapshot)?
        };
        Ok(bytes)
    }

    fn extension(&self) -> &str {
        "json"
    }
}
