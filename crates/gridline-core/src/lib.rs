//! Core types for Gridline tables.
//!
//! This crate holds everything that does not need a browser:
//! - Data model: [`Record`], [`CellValue`], [`ColumnNode`], [`KeyField`]
//! - Header layout: [`compute_header_structure`] turns a column tree into
//!   spanned header rows
//! - Row rendering: [`RowRenderer`] with pluggable [`CellFormatter`]s
//! - Keyed reconciliation: [`TableReconciler`] patches a [`RowHost`] in place
//! - View derivation: [`DataStore`] sorts, filters and pages records

mod color;
pub mod column;
pub mod date;
pub mod export;
pub mod header;
pub mod host;
pub mod key;
pub mod markup;
pub mod reconcile;
pub mod render;
pub mod store;
mod style;
mod value;

pub use color::{Color, ColorParseError};
pub use column::{infer_columns, ColumnNode, DataType, TextAlign};
pub use export::{ExportError, JsonExporter, TableExporter, TableSnapshot};
pub use header::{compute_header_structure, HeaderCell, HeaderLayout};
pub use host::{HostError, MemoryTable, RowHost, TableHost};
pub use key::{KeyField, RowKey};
pub use markup::ActionSpec;
pub use reconcile::{EmptyRow, ReconcileError, RowOp, TableReconciler};
pub use render::{escape_html, CellFormatter, FormatOptions, FormatterRegistry, RowRenderer};
pub use store::{
    DataStore, FilterState, PagingOptions, PagingState, SortOrder, SortState, View,
};
pub use style::StyleOptions;
pub use value::{CellValue, Record};

/// Message shown in the body when there is nothing to display.
pub const DEFAULT_EMPTY_MESSAGE: &str = "No Data Available";
