//! Keyed row reconciliation for efficient table updates.
//!
//! Instead of rebuilding the table body on every sort, filter, page change or
//! edit, new data is diffed against the live rows by composite key.
//!
//! # Algorithm
//!
//! For each new record at position `i`:
//!
//! 1. **Matched key**: re-render the row and write the markup only if it
//!    differs from what the row already holds, then move the row to `i` if it
//!    is elsewhere.
//! 2. **New key**: create a row at `i`.
//!
//! Placing rows in order keeps the prefix `0..=i` final, so rows that are no
//! longer present drift to the end and are removed in a last pass.
//!
//! A row the host fails to create is logged and left untracked, so the next
//! reconciliation tries again.

use crate::host::RowHost;
use crate::key::{KeyField, RowKey};
use crate::value::Record;
use std::collections::HashMap;
use thiserror::Error;

/// Operation applied to the live rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOp {
    /// A new row was created
    Insert {
        /// Row key
        key: RowKey,
        /// Position it was inserted at
        index: usize,
    },
    /// A row's markup changed
    Update {
        /// Row key
        key: RowKey,
    },
    /// A row was moved
    Move {
        /// Row key
        key: RowKey,
        /// Position before the move (`None` if it was detached)
        from: Option<usize>,
        /// Position after the move
        to: usize,
    },
    /// A row was removed
    Remove {
        /// Row key
        key: RowKey,
    },
}

/// Errors detected before any row is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// Two records produced the same composite key
    #[error("duplicate row key '{key}' at positions {first} and {second}")]
    DuplicateKey {
        /// The repeated key
        key: RowKey,
        /// First position
        first: usize,
        /// Second position
        second: usize,
    },
    /// The key list does not match the record list
    #[error("{keys} keys given for {rows} rows")]
    KeyCountMismatch {
        /// Number of records
        rows: usize,
        /// Number of keys
        keys: usize,
    },
}

/// The row shown when there is no data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyRow {
    /// Columns to span
    pub colspan: usize,
    /// Message to show
    pub message: String,
}

impl EmptyRow {
    /// Create an empty-row description.
    #[must_use]
    pub fn new(colspan: usize, message: impl Into<String>) -> Self {
        Self {
            colspan: colspan.max(1),
            message: message.into(),
        }
    }
}

/// Result of a reconciliation.
#[derive(Debug, Clone)]
pub struct Reconciliation<H> {
    /// Live rows by key
    pub rows_by_key: HashMap<RowKey, H>,
    /// Keys in physical order
    pub ordered_keys: Vec<RowKey>,
    /// Operations applied
    pub ops: Vec<RowOp>,
}

impl<H> Reconciliation<H> {
    /// Check if nothing was changed.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.ops.is_empty()
    }

    /// Count operations matching a predicate.
    pub fn count(&self, predicate: impl Fn(&RowOp) -> bool) -> usize {
        self.ops.iter().filter(|op| predicate(op)).count()
    }
}

/// Composite keys of records, positional when `key_field` is empty.
#[must_use]
pub fn composite_keys(data: &[&Record], key_field: &KeyField) -> Vec<RowKey> {
    data.iter()
        .enumerate()
        .map(|(i, r)| key_field.key_at(r, i))
        .collect()
}

/// Positional keys for a record list.
#[must_use]
pub fn positional_keys(len: usize) -> Vec<RowKey> {
    (0..len).map(RowKey::positional).collect()
}

/// Find the first repeated key.
pub fn check_unique(keys: &[RowKey]) -> Result<(), ReconcileError> {
    let mut seen: HashMap<&RowKey, usize> = HashMap::with_capacity(keys.len());
    for (i, key) in keys.iter().enumerate() {
        if let Some(&first) = seen.get(key) {
            return Err(ReconcileError::DuplicateKey {
                key: key.clone(),
                first,
                second: i,
            });
        }
        seen.insert(key, i);
    }
    Ok(())
}

/// Reconcile the live rows with new data keyed by `key_field`.
pub fn reconcile<H, F>(
    host: &mut H,
    previous: HashMap<RowKey, H::Handle>,
    data: &[&Record],
    key_field: &KeyField,
    render: F,
    empty: &EmptyRow,
) -> Result<Reconciliation<H::Handle>, ReconcileError>
where
    H: RowHost,
    F: Fn(&Record) -> String,
{
    let keys = composite_keys(data, key_field);
    reconcile_keys(host, previous, data, &keys, render, empty)
}

/// Reconcile with precomputed keys, one per record.
pub fn reconcile_keys<H, F>(
    host: &mut H,
    mut previous: HashMap<RowKey, H::Handle>,
    data: &[&Record],
    keys: &[RowKey],
    render: F,
    empty: &EmptyRow,
) -> Result<Reconciliation<H::Handle>, ReconcileError>
where
    H: RowHost,
    F: Fn(&Record) -> String,
{
    if keys.len() != data.len() {
        return Err(ReconcileError::KeyCountMismatch {
            rows: data.len(),
            keys: keys.len(),
        });
    }
    check_unique(keys)?;

    let mut ops = Vec::new();

    if data.is_empty() {
        remove_stale(host, previous, &mut ops);
        host.show_placeholder(empty.colspan, &empty.message);
        return Ok(Reconciliation {
            rows_by_key: HashMap::new(),
            ordered_keys: Vec::new(),
            ops,
        });
    }

    host.clear_placeholder();

    let mut rows_by_key = HashMap::with_capacity(data.len());
    for (index, (record, key)) in data.iter().zip(keys).enumerate() {
        let html = render(record);
        let row = match previous.remove(key) {
            Some(row) => {
                if host.row_html(&row) != html {
                    host.set_row_html(&row, &html);
                    ops.push(RowOp::Update { key: key.clone() });
                }
                let from = host.row_index(&row);
                if from != Some(index) {
                    host.move_row(&row, index);
                    ops.push(RowOp::Move {
                        key: key.clone(),
                        from,
                        to: index,
                    });
                }
                row
            }
            None => match host.create_row(key, &html, index) {
                Ok(row) => {
                    ops.push(RowOp::Insert {
                        key: key.clone(),
                        index,
                    });
                    row
                }
                Err(err) => {
                    log::error!("{err}");
                    continue;
                }
            },
        };
        rows_by_key.insert(key.clone(), row);
    }

    remove_stale(host, previous, &mut ops);

    log::debug!(
        "reconciled {} rows with {} operations",
        data.len(),
        ops.len()
    );

    Ok(Reconciliation {
        ordered_keys: keys
            .iter()
            .filter(|k| rows_by_key.contains_key(*k))
            .cloned()
            .collect(),
        rows_by_key,
        ops,
    })
}

fn remove_stale<H: RowHost>(
    host: &mut H,
    stale: HashMap<RowKey, H::Handle>,
    ops: &mut Vec<RowOp>,
) {
    let mut stale: Vec<(RowKey, H::Handle)> = stale.into_iter().collect();
    stale.sort_by(|a, b| a.0.cmp(&b.0));
    for (key, row) in stale {
        host.remove_row(&row);
        ops.push(RowOp::Remove { key });
    }
}

/// Tracks the live rows between reconciliations.
#[derive(Debug, Clone)]
pub struct TableReconciler<H> {
    rows_by_key: HashMap<RowKey, H>,
    ordered_keys: Vec<RowKey>,
}

impl<H> Default for TableReconciler<H> {
    fn default() -> Self {
        Self {
            rows_by_key: HashMap::new(),
            ordered_keys: Vec::new(),
        }
    }
}

impl<H: Clone> TableReconciler<H> {
    /// Create a reconciler with no tracked rows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys in physical order after the last reconciliation.
    #[must_use]
    pub fn ordered_keys(&self) -> &[RowKey] {
        &self.ordered_keys
    }

    /// Live row of a key.
    #[must_use]
    pub fn row(&self, key: &RowKey) -> Option<&H> {
        self.rows_by_key.get(key)
    }

    /// Number of tracked rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered_keys.len()
    }

    /// Check if no rows are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered_keys.is_empty()
    }

    /// Reconcile with precomputed keys, keeping the tracked rows when the
    /// keys are rejected.
    pub fn apply<T, F>(
        &mut self,
        host: &mut T,
        data: &[&Record],
        keys: &[RowKey],
        render: F,
        empty: &EmptyRow,
    ) -> Result<Vec<RowOp>, ReconcileError>
    where
        T: RowHost<Handle = H>,
        F: Fn(&Record) -> String,
    {
        if keys.len() != data.len() {
            return Err(ReconcileError::KeyCountMismatch {
                rows: data.len(),
                keys: keys.len(),
            });
        }
        check_unique(keys)?;
        let previous = std::mem::take(&mut self.rows_by_key);
        let result = reconcile_keys(host, previous, data, keys, render, empty)?;
        self.rows_by_key = result.rows_by_key;
        self.ordered_keys = result.ordered_keys;
        Ok(result.ops)
    }

    /// Forget every tracked row without touching the host.
    pub fn forget(&mut self) {
        self.rows_by_key.clear();
        self.ordered_keys.clear();
    }
}
