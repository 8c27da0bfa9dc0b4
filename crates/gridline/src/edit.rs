//! Inline row editing.
//!
//! An edit is committed by building a new record from the submitted values;
//! the original record is never changed in place.

use gridline_core::{escape_html, CellValue, ColumnNode, DataType, Record, RowKey};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write;

/// One editable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditField {
    /// Field name
    pub key: String,
    /// Label
    pub title: String,
    /// Current value as text
    pub value: String,
    /// Data type hint
    pub datatype: Option<DataType>,
}

impl EditField {
    const fn input_type(&self) -> &'static str {
        match self.datatype {
            Some(DataType::Number) => "number",
            _ => "text",
        }
    }
}

/// Form for editing one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditForm {
    /// Key of the edited row
    pub key: RowKey,
    /// One field per leaf column
    pub fields: Vec<EditField>,
}

impl EditForm {
    /// Build a form for a record over the leaf columns.
    #[must_use]
    pub fn new(key: RowKey, record: &Record, leaves: &[ColumnNode]) -> Self {
        let fields = leaves
            .iter()
            .map(|leaf| EditField {
                key: leaf.key.clone(),
                title: leaf.display_title().to_string(),
                value: record.display(&leaf.key).unwrap_or_default(),
                datatype: leaf.datatype,
            })
            .collect();
        Self { key, fields }
    }

    /// Form markup with save and cancel buttons.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = format!(
            r#"<form class="gl-edit" data-row-key="{}">"#,
            escape_html(self.key.as_str())
        );
        for field in &self.fields {
            let _ = write!(
                html,
                r#"<label>{}<input type="{}" name="{}" value="{}"></label>"#,
                escape_html(&field.title),
                field.input_type(),
                escape_html(&field.key),
                escape_html(&field.value)
            );
        }
        html.push_str(
            r#"<button type="button" data-edit="save">Save</button><button type="button" data-edit="cancel">Cancel</button></form>"#,
        );
        html
    }
}

/// Build the edited record: `original` with the submitted values applied.
///
/// Values are converted by the column's data type; a blank value clears the
/// field. Fields not submitted keep their original value.
#[must_use]
pub fn apply_values(
    original: &Record,
    leaves: &[ColumnNode],
    values: &HashMap<String, String>,
) -> Record {
    let mut record = original.clone();
    for leaf in leaves {
        if let Some(raw) = values.get(&leaf.key) {
            record.insert(leaf.key.clone(), convert(raw, leaf.datatype));
        }
    }
    record
}

fn convert(raw: &str, datatype: Option<DataType>) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    match datatype {
        Some(DataType::Number) => trimmed
            .parse::<f64>()
            .map_or_else(|_| CellValue::Text(raw.to_string()), CellValue::Number),
        Some(DataType::Bool) => match trimmed {
            "true" => CellValue::Bool(true),
            "false" => CellValue::Bool(false),
            _ => CellValue::Text(raw.to_string()),
        },
        _ => CellValue::Text(raw.to_string()),
    }
}
