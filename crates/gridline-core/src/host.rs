//! Render targets: the live row collection the reconciler patches.
//!
//! The browser runtime implements these traits over a real `<table>`;
//! [`MemoryTable`] implements them over plain strings for headless use and
//! tests.

use crate::key::RowKey;
use thiserror::Error;

/// A row could not be created by the host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to create row '{key}': {reason}")]
pub struct HostError {
    /// Key of the row
    pub key: RowKey,
    /// Reason reported by the host
    pub reason: String,
}

/// A live, ordered collection of body rows.
///
/// Indices count data rows only; the placeholder row is not part of them.
pub trait RowHost {
    /// Handle to one live row.
    type Handle: Clone;

    /// Create a row tagged with `key` holding `html`, inserted at `index`.
    fn create_row(&mut self, key: &RowKey, html: &str, index: usize)
        -> Result<Self::Handle, HostError>;

    /// Current inner markup of a row.
    fn row_html(&self, row: &Self::Handle) -> String;

    /// Replace the inner markup of a row.
    fn set_row_html(&mut self, row: &Self::Handle, html: &str);

    /// Current position of a row, `None` if it is detached.
    fn row_index(&self, row: &Self::Handle) -> Option<usize>;

    /// Move a row so it ends up at `index`.
    fn move_row(&mut self, row: &Self::Handle, index: usize);

    /// Detach a row.
    fn remove_row(&mut self, row: &Self::Handle);

    /// Show the single "no data" row spanning `colspan` columns.
    fn show_placeholder(&mut self, colspan: usize, message: &str);

    /// Remove the "no data" row if shown.
    fn clear_placeholder(&mut self);
}

/// A full table target: body rows plus header and footer sections.
pub trait TableHost: RowHost {
    /// Replace the `<thead>` content.
    fn set_head_html(&mut self, html: &str);

    /// Replace the `<tfoot>` content.
    fn set_foot_html(&mut self, html: &str);
}

/// Identity of a row in a [`MemoryTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowId(u64);

/// A row of a [`MemoryTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRow {
    /// Row identity, stable across moves
    pub id: RowId,
    /// Composite key the row is tagged with
    pub key: RowKey,
    /// Inner markup
    pub html: String,
}

/// Mutation counters of a [`MemoryTable`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mutations {
    pub created: usize,
    pub updated: usize,
    pub moved: usize,
    pub removed: usize,
}

impl Mutations {
    /// Total number of row mutations.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.created + self.updated + self.moved + self.removed
    }
}

/// In-memory table.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    rows: Vec<MemoryRow>,
    next_id: u64,
    placeholder: Option<(usize, String)>,
    head: String,
    foot: String,
    mutations: Mutations,
}

impl MemoryTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Body rows in order.
    #[must_use]
    pub fn rows(&self) -> &[MemoryRow] {
        &self.rows
    }

    /// Keys of the body rows in order.
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.key.as_str()).collect()
    }

    /// Find a row by key.
    #[must_use]
    pub fn row(&self, key: &str) -> Option<&MemoryRow> {
        self.rows.iter().find(|r| r.key.as_str() == key)
    }

    /// Placeholder row, if shown: `(colspan, message)`.
    #[must_use]
    pub fn placeholder(&self) -> Option<(usize, &str)> {
        self.placeholder.as_ref().map(|(n, m)| (*n, m.as_str()))
    }

    /// `<thead>` content.
    #[must_use]
    pub fn head_html(&self) -> &str {
        &self.head
    }

    /// `<tfoot>` content.
    #[must_use]
    pub fn foot_html(&self) -> &str {
        &self.foot
    }

    /// Mutations since the last reset.
    #[must_use]
    pub const fn mutations(&self) -> Mutations {
        self.mutations
    }

    /// Reset the mutation counters.
    pub fn reset_mutations(&mut self) {
        self.mutations = Mutations::default();
    }

    /// `<tbody>` content.
    #[must_use]
    pub fn body_html(&self) -> String {
        if let Some((colspan, message)) = &self.placeholder {
            return crate::markup::placeholder_row(*colspan, message);
        }
        self.rows
            .iter()
            .map(|r| crate::markup::body_row(&r.key, &r.html))
            .collect()
    }

    /// Complete table markup.
    #[must_use]
    pub fn to_html(&self) -> String {
        crate::markup::table(&self.head, &self.body_html(), &self.foot)
    }

    fn position(&self, id: RowId) -> Option<usize> {
        self.rows.iter().position(|r| r.id == id)
    }
}

impl RowHost for MemoryTable {
    type Handle = RowId;

    fn create_row(&mut self, key: &RowKey, html: &str, index: usize) -> Result<RowId, HostError> {
        let id = RowId(self.next_id);
        self.next_id += 1;
        let index = index.min(self.rows.len());
        self.rows.insert(
            index,
            MemoryRow {
                id,
                key: key.clone(),
                html: html.to_string(),
            },
        );
        self.mutations.created += 1;
        Ok(id)
    }

    fn row_html(&self, row: &RowId) -> String {
        self.position(*row)
            .map(|i| self.rows[i].html.clone())
            .unwrap_or_default()
    }

    fn set_row_html(&mut self, row: &RowId, html: &str) {
        if let Some(i) = self.position(*row) {
            self.rows[i].html = html.to_string();
            self.mutations.updated += 1;
        }
    }

    fn row_index(&self, row: &RowId) -> Option<usize> {
        self.position(*row)
    }

    fn move_row(&mut self, row: &RowId, index: usize) {
        if let Some(from) = self.position(*row) {
            let moved = self.rows.remove(from);
            let index = index.min(self.rows.len());
            self.rows.insert(index, moved);
            self.mutations.moved += 1;
        }
    }

    fn remove_row(&mut self, row: &RowId) {
        if let Some(i) = self.position(*row) {
            self.rows.remove(i);
            self.mutations.removed += 1;
        }
    }

    fn show_placeholder(&mut self, colspan: usize, message: &str) {
        self.placeholder = Some((colspan, message.to_string()));
    }

    fn clear_placeholder(&mut self) {
        self.placeholder = None;
    }
}

impl TableHost for MemoryTable {
    fn set_head_html(&mut self, html: &str) {
        self.head = html.to_string();
    }

    fn set_foot_html(&mut self, html: &str) {
        self.foot = html.to_string();
    }
}
