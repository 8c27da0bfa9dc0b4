//! Row rendering: one record plus the leaf columns to cell markup.

use crate::column::{ColumnNode, DataType, TextAlign};
use crate::date;
use crate::value::{CellValue, Record};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Options applied to every cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormatOptions {
    /// Markup shown for absent values
    pub null_placeholder: String,
    /// strftime-style format for `datatype: date` columns
    pub date_format: Option<String>,
}

impl FormatOptions {
    /// Set the null placeholder.
    #[must_use]
    pub fn null_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.null_placeholder = placeholder.into();
        self
    }

    /// Set the date format.
    #[must_use]
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = Some(format.into());
        self
    }
}

/// Escape `& < > " '` for HTML text and attribute contexts.
#[must_use]
pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Display text of a value; only text values are escaped.
#[must_use]
pub fn escape_value(value: &CellValue) -> String {
    match value {
        CellValue::Text(s) => escape_html(s).into_owned(),
        other => other.display(),
    }
}

/// A custom cell renderer.
///
/// The returned markup is used verbatim and must include its own `<td>`.
/// Missing or null fields arrive as the null placeholder text.
/// Implementations must not panic; a panic propagates out of the render.
pub trait CellFormatter {
    /// Render one cell.
    fn format(&self, value: &CellValue, record: &Record, options: &FormatOptions) -> String;
}

impl<F> CellFormatter for F
where
    F: Fn(&CellValue, &Record, &FormatOptions) -> String,
{
    fn format(&self, value: &CellValue, record: &Record, options: &FormatOptions) -> String {
        self(value, record, options)
    }
}

/// Named cell formatters, referenced by `ColumnNode::renderer`.
#[derive(Default, Clone)]
pub struct FormatterRegistry {
    formatters: HashMap<String, Rc<dyn CellFormatter>>,
}

impl fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.formatters.keys().collect();
        names.sort();
        f.debug_struct("FormatterRegistry")
            .field("formatters", &names)
            .finish()
    }
}

impl FormatterRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a formatter under a name, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, formatter: impl CellFormatter + 'static) {
        self.formatters.insert(name.into(), Rc::new(formatter));
    }

    /// Register with fluent API.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, formatter: impl CellFormatter + 'static) -> Self {
        self.register(name, formatter);
        self
    }

    /// Look up a formatter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Rc<dyn CellFormatter>> {
        self.formatters.get(name).cloned()
    }

    /// Check if a name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// Number of registered formatters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.formatters.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.formatters.is_empty()
    }
}

/// A leaf column with its formatter resolved.
#[derive(Clone)]
pub struct BoundColumn {
    /// The leaf column
    pub column: ColumnNode,
    /// Resolved custom formatter
    pub formatter: Option<Rc<dyn CellFormatter>>,
}

impl fmt::Debug for BoundColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundColumn")
            .field("column", &self.column.key)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

impl BoundColumn {
    /// Bind a column without a custom formatter.
    #[must_use]
    pub const fn plain(column: ColumnNode) -> Self {
        Self {
            column,
            formatter: None,
        }
    }
}

/// Resolve the formatters of leaf columns once.
///
/// Unknown renderer names are reported and the column falls back to the
/// default cell.
#[must_use]
pub fn bind_columns(leaves: &[ColumnNode], registry: &FormatterRegistry) -> Vec<BoundColumn> {
    leaves
        .iter()
        .map(|column| {
            let formatter = column.renderer.as_deref().and_then(|name| {
                let found = registry.get(name);
                if found.is_none() {
                    log::warn!(
                        "column '{}' references unknown renderer '{name}', using default cell",
                        column.key
                    );
                }
                found
            });
            BoundColumn {
                column: column.clone(),
                formatter,
            }
        })
        .collect()
}

/// Render the cell markup of one record, one entry per leaf column.
#[must_use]
pub fn render_row_cells(
    record: &Record,
    columns: &[BoundColumn],
    options: &FormatOptions,
) -> Vec<String> {
    columns
        .iter()
        .map(|bound| render_cell(record, bound, options))
        .collect()
}

fn render_cell(record: &Record, bound: &BoundColumn, options: &FormatOptions) -> String {
    let column = &bound.column;
    let value = record.get(&column.key).unwrap_or(&CellValue::Empty);

    if let Some(formatter) = &bound.formatter {
        if value.is_empty() {
            let placeholder = CellValue::Text(options.null_placeholder.clone());
            return formatter.format(&placeholder, record, options);
        }
        return formatter.format(value, record, options);
    }

    let content = if value.is_empty() {
        options.null_placeholder.clone()
    } else {
        match (&column.datatype, &options.date_format) {
            (Some(DataType::Date), Some(format)) => date::format_value(value, format)
                .map_or_else(|| escape_value(value), |s| escape_html(&s).into_owned()),
            _ => escape_value(value),
        }
    };

    let key = escape_html(&column.key);
    let mut classes = Vec::new();
    if column.align != TextAlign::Left {
        classes.push(format!("gl-align-{}", column.align.as_css()));
    }
    if column.freeze {
        classes.push("gl-frozen".to_string());
    }
    if classes.is_empty() {
        format!(r#"<td data-column="{key}">{content}</td>"#)
    } else {
        format!(
            r#"<td data-column="{key}" class="{}">{content}</td>"#,
            classes.join(" ")
        )
    }
}

/// Renders records against a fixed set of bound columns.
#[derive(Debug, Clone, Default)]
pub struct RowRenderer {
    columns: Vec<BoundColumn>,
    options: FormatOptions,
}

impl RowRenderer {
    /// Create a renderer, resolving formatters from the registry.
    #[must_use]
    pub fn new(leaves: &[ColumnNode], registry: &FormatterRegistry, options: FormatOptions) -> Self {
        Self {
            columns: bind_columns(leaves, registry),
            options,
        }
    }

    /// Bound columns.
    #[must_use]
    pub fn columns(&self) -> &[BoundColumn] {
        &self.columns
    }

    /// Number of cells per row.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Format options.
    #[must_use]
    pub const fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Cell markup of a record.
    #[must_use]
    pub fn cells(&self, record: &Record) -> Vec<String> {
        render_row_cells(record, &self.columns, &self.options)
    }

    /// Concatenated cell markup of a record.
    #[must_use]
    pub fn row_html(&self, record: &Record) -> String {
        self.cells(record).concat()
    }
}
