//! Filter menu: the distinct values of a column with their checked state.

use gridline_core::escape_html;
use serde::Serialize;
use std::fmt::Write;

/// Label shown for the empty value.
pub const EMPTY_LABEL: &str = "(empty)";

/// One value in a filter menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    /// Raw display value
    pub value: String,
    /// Whether the value is currently accepted
    pub checked: bool,
}

/// An open filter menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterMenu {
    /// Column key
    pub key: String,
    /// Column title
    pub title: String,
    /// Distinct values, sorted, empty value last
    pub options: Vec<FilterOption>,
}

impl FilterMenu {
    /// Values currently checked.
    #[must_use]
    pub fn checked(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|o| o.checked)
            .map(|o| o.value.as_str())
            .collect()
    }

    /// Menu markup: one checkbox per value plus apply and cancel buttons.
    #[must_use]
    pub fn to_html(&self) -> String {
        let key = escape_html(&self.key);
        let mut html = format!(
            r#"<div class="gl-filter-menu" data-filter-menu="{key}"><div class="gl-filter-title">{}</div><ul>"#,
            escape_html(&self.title)
        );
        for option in &self.options {
            let label = if option.value.is_empty() {
                EMPTY_LABEL
            } else {
                option.value.as_str()
            };
            let _ = write!(
                html,
                r#"<li><label><input type="checkbox" value="{}"{}> {}</label></li>"#,
                escape_html(&option.value),
                if option.checked { " checked" } else { "" },
                escape_html(label)
            );
        }
        let _ = write!(
            html,
            r#"</ul><button type="button" data-filter-apply="{key}">Apply</button><button type="button" data-filter-cancel="{key}">Cancel</button></div>"#
        );
        html
    }
}
