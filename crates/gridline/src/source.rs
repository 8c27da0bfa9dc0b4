//! Record loading: payload parsing and load bookkeeping.
//!
//! Loads may overlap (a URL fetch still in flight when new data is set).
//! Every load takes a [`LoadTicket`] from the [`LoadTracker`]; only the
//! result of the most recent ticket is applied.

use crate::error::LoadError;
use gridline_core::Record;
use serde_json::Value;

/// Identifies one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    /// Generation number of the load.
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.0
    }
}

/// Hands out load tickets and recognizes the latest one.
#[derive(Debug, Clone, Default)]
pub struct LoadTracker {
    generation: u64,
}

impl LoadTracker {
    /// Create a tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load, superseding every earlier one.
    pub fn begin(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Supersede pending loads without starting a new one.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    /// Check if a ticket belongs to the most recent load.
    #[must_use]
    pub const fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }
}

/// Parse a JSON array of records.
pub fn parse_records(json: &str) -> Result<Vec<Record>, LoadError> {
    let value: Value = serde_json::from_str(json)?;
    records_from_value(value)
}

/// Convert a JSON array into records. Entries that are not objects are
/// skipped with a warning.
pub fn records_from_value(value: Value) -> Result<Vec<Record>, LoadError> {
    let Value::Array(items) = value else {
        return Err(LoadError::NotAnArray(json_kind(&value)));
    };
    let total = items.len();
    let records: Vec<Record> = items.into_iter().filter_map(Record::from_json).collect();
    if records.len() < total {
        log::warn!("skipped {} non-object entries", total - records.len());
    }
    Ok(records)
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
