//! Header layout: flattening a column tree into spanned header rows.
//!
//! A column forest such as
//!
//! ```text
//! a   b
//!    / \
//!   c   d
//! ```
//!
//! becomes two header rows: `[a(rowspan 2), b(colspan 2)]` and `[c, d]`,
//! with leaf columns `[a, c, d]`.
//!
//! # Algorithm
//!
//! 1. Siblings are stable-sorted by `index`.
//! 2. Nodes are visited depth-first, pre-order, and appended to the row of
//!    their level; this keeps every row in the left-to-right order of the
//!    final leaves.
//! 3. A group's colspan is the sum of its children's colspans, accumulated
//!    after the children are visited.
//! 4. Once the depth is known, every leaf header's rowspan is stretched down
//!    to the body: `rowspan = depth - level`.

use crate::column::{ColumnNode, TextAlign};
use serde::Serialize;

/// A header cell derived from a column node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    /// Display title
    pub title: String,
    /// Column key
    pub key: String,
    /// Tree depth of the node (0 = top row)
    pub level: usize,
    /// Number of leaf columns spanned
    pub colspan: usize,
    /// Number of header rows spanned
    pub rowspan: usize,
    /// Whether the node groups sub-columns
    pub is_group: bool,
    /// Whether the column can be sorted
    pub sortable: bool,
    /// Whether the column offers a filter menu
    pub filterable: bool,
    /// Whether a filter is active
    pub has_filter: bool,
    /// Alignment of the column
    pub align: TextAlign,
    /// Width as a CSS length
    pub width: Option<String>,
    /// Whether the column sticks to the left edge
    pub frozen: bool,
}

impl HeaderCell {
    fn from_node(node: &ColumnNode, level: usize) -> Self {
        let is_group = !node.is_leaf();
        Self {
            title: node.display_title().to_string(),
            key: node.key.clone(),
            level,
            colspan: 1,
            rowspan: 1,
            is_group,
            sortable: node.sortable && !is_group,
            filterable: node.filterable && !is_group,
            has_filter: node.has_filter,
            align: node.align,
            width: node.width.clone(),
            frozen: node.freeze,
        }
    }
}

/// Result of laying out a column forest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderLayout {
    /// Header rows, top to bottom
    pub rows: Vec<Vec<HeaderCell>>,
    /// Leaf columns in visual order
    pub leaves: Vec<ColumnNode>,
}

impl HeaderLayout {
    /// Number of header rows.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.rows.len()
    }

    /// Number of leaf columns.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Check if there are no columns at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Keys of the leaf columns in visual order.
    #[must_use]
    pub fn leaf_keys(&self) -> Vec<&str> {
        self.leaves.iter().map(|c| c.key.as_str()).collect()
    }

    /// Find a header cell by column key.
    #[must_use]
    pub fn cell(&self, key: &str) -> Option<&HeaderCell> {
        self.rows.iter().flatten().find(|c| c.key == key)
    }
}

/// Compute the header rows and leaf order of a column forest.
#[must_use]
pub fn compute_header_structure(columns: &[ColumnNode]) -> HeaderLayout {
    let mut layout = HeaderLayout::default();
    visit(columns, 0, &mut layout);

    let depth = layout.rows.len();
    for (level, row) in layout.rows.iter_mut().enumerate() {
        for cell in row.iter_mut().filter(|c| !c.is_group) {
            cell.rowspan = depth - level;
        }
    }

    layout
}

/// Visit one sibling list; returns the combined colspan of the list.
fn visit(siblings: &[ColumnNode], level: usize, layout: &mut HeaderLayout) -> usize {
    let mut ordered: Vec<&ColumnNode> = siblings.iter().collect();
    ordered.sort_by_key(|c| c.index);

    let mut total = 0;
    for node in ordered {
        if layout.rows.len() <= level {
            layout.rows.push(Vec::new());
        }
        let slot = layout.rows[level].len();
        layout.rows[level].push(HeaderCell::from_node(node, level));

        let colspan = if node.is_leaf() {
            layout.leaves.push(node.clone());
            1
        } else {
            visit(&node.children, level + 1, layout)
        };

        layout.rows[level][slot].colspan = colspan;
        total += colspan;
    }
    total
}
