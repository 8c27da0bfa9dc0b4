//! Column tree definitions.

use crate::value::Record;
use serde::{Deserialize, Serialize};

/// Data type hint for a leaf column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Plain text (default)
    #[default]
    Text,
    /// Numeric value
    Number,
    /// Date or timestamp, formatted with the configured date format
    Date,
    /// Boolean value
    Bool,
}

/// Text alignment within a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// CSS `text-align` value.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// A node in the column tree.
///
/// A node with children is a group header and owns no data cell. A node
/// without children is a leaf column bound to the record field `key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnNode {
    /// Column key (field name in data)
    pub key: String,
    /// Display header
    #[serde(default)]
    pub title: String,
    /// Sort key among siblings
    #[serde(default)]
    pub index: i64,
    /// Name of a registered cell formatter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,
    /// Data type hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<DataType>,
    /// Column width as a CSS length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    /// Keep the column visible while scrolling horizontally
    #[serde(default)]
    pub freeze: bool,
    /// Whether clicking the header sorts by this column
    #[serde(default = "default_true")]
    pub sortable: bool,
    /// Whether the header offers a filter menu
    #[serde(default = "default_true")]
    pub filterable: bool,
    /// Text alignment
    #[serde(default)]
    pub align: TextAlign,
    /// Set while a filter is active on this column
    #[serde(default, skip_serializing)]
    pub has_filter: bool,
    /// Sub-columns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ColumnNode>,
}

const fn default_true() -> bool {
    true
}

impl ColumnNode {
    /// Create a new leaf column.
    #[must_use]
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            index: 0,
            renderer: None,
            datatype: None,
            width: None,
            freeze: false,
            sortable: true,
            filterable: true,
            align: TextAlign::Left,
            has_filter: false,
            children: Vec::new(),
        }
    }

    /// Set the sibling index.
    #[must_use]
    pub const fn index(mut self, index: i64) -> Self {
        self.index = index;
        self
    }

    /// Set the data type.
    #[must_use]
    pub const fn datatype(mut self, datatype: DataType) -> Self {
        self.datatype = Some(datatype);
        self
    }

    /// Use a registered cell formatter.
    #[must_use]
    pub fn renderer(mut self, name: impl Into<String>) -> Self {
        self.renderer = Some(name.into());
        self
    }

    /// Set column width.
    #[must_use]
    pub fn width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    /// Set text alignment.
    #[must_use]
    pub const fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    /// Freeze the column.
    #[must_use]
    pub const fn frozen(mut self) -> Self {
        self.freeze = true;
        self
    }

    /// Disable sorting on this column.
    #[must_use]
    pub const fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Disable the filter menu on this column.
    #[must_use]
    pub const fn unfilterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    /// Add a sub-column.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// A node is a leaf when its child list is empty.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Title to display, falling back to the key.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.key
        } else {
            &self.title
        }
    }
}

/// Infer a flat column list from a record's fields, in field order.
#[must_use]
pub fn infer_columns(record: &Record) -> Vec<ColumnNode> {
    record
        .fields()
        .iter()
        .enumerate()
        .map(|(i, field)| ColumnNode::new(field.clone(), field.clone()).index(i as i64))
        .collect()
}

/// Find a node anywhere in the forest by key.
#[must_use]
pub fn find_column<'a>(columns: &'a [ColumnNode], key: &str) -> Option<&'a ColumnNode> {
    columns.iter().find_map(|c| {
        if c.key == key {
            Some(c)
        } else {
            find_column(&c.children, key)
        }
    })
}

/// Find a node anywhere in the forest by key, mutably.
pub fn find_column_mut<'a>(columns: &'a mut [ColumnNode], key: &str) -> Option<&'a mut ColumnNode> {
    for column in columns.iter_mut() {
        if column.key == key {
            return Some(column);
        }
        if let Some(found) = find_column_mut(&mut column.children, key) {
            return Some(found);
        }
    }
    None
}
