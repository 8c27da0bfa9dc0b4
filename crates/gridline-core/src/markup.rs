//! Table markup: header rows, body rows, pager and action cells.
//!
//! Every header cell carries `data-column`, every body row `data-row-key`,
//! every pager button `data-page` and every action button `data-action`;
//! event handlers rely on these attributes to map a click back to the grid.
//! An action button finds its row key on the enclosing `<tr>`.

use crate::header::{HeaderCell, HeaderLayout};
use crate::key::RowKey;
use crate::render::escape_html;
use crate::store::{FilterState, PagingState, SortOrder, SortState};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// A row action offered in the trailing action column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Action name passed to callbacks
    pub name: String,
    /// Button label
    #[serde(default)]
    pub label: String,
}

impl ActionSpec {
    /// Create an action.
    #[must_use]
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }

    fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.name
        } else {
            &self.label
        }
    }
}

/// Wrap the three sections in a table element.
#[must_use]
pub fn table(head: &str, body: &str, foot: &str) -> String {
    format!(
        r#"<table class="gl-table"><thead>{head}</thead><tbody>{body}</tbody><tfoot>{foot}</tfoot></table>"#
    )
}

/// A body row tagged with its key.
#[must_use]
pub fn body_row(key: &RowKey, html: &str) -> String {
    format!(
        r#"<tr data-row-key="{}">{html}</tr>"#,
        escape_html(key.as_str())
    )
}

/// The "no data" row.
#[must_use]
pub fn placeholder_row(colspan: usize, message: &str) -> String {
    format!(r#"<tr class="gl-empty">{}</tr>"#, placeholder_cell(colspan, message))
}

/// The single cell of the "no data" row.
#[must_use]
pub fn placeholder_cell(colspan: usize, message: &str) -> String {
    format!(r#"<td colspan="{colspan}">{}</td>"#, escape_html(message))
}

/// Header rows of a layout.
///
/// An action column header, when given, spans every header row.
#[must_use]
pub fn header_rows(
    layout: &HeaderLayout,
    sort: Option<&SortState>,
    filters: &FilterState,
    actions_title: Option<&str>,
) -> String {
    let mut html = String::new();
    for (level, row) in layout.rows.iter().enumerate() {
        html.push_str("<tr>");
        for cell in row {
            header_cell(&mut html, cell, sort, filters);
        }
        if level == 0 {
            if let Some(title) = actions_title {
                let _ = write!(
                    html,
                    r#"<th class="gl-actions"{}>{}</th>"#,
                    span_attr("rowspan", layout.depth()),
                    escape_html(title)
                );
            }
        }
        html.push_str("</tr>");
    }
    html
}

fn span_attr(name: &str, value: usize) -> String {
    if value > 1 {
        format!(r#" {name}="{value}""#)
    } else {
        String::new()
    }
}

fn header_cell(html: &mut String, cell: &HeaderCell, sort: Option<&SortState>, filters: &FilterState) {
    let sorted = sort.filter(|s| s.key == cell.key && !cell.is_group);
    let filtered = cell.has_filter || filters.is_active(&cell.key);

    let mut classes = Vec::new();
    if cell.is_group {
        classes.push("gl-group".to_string());
    }
    if cell.sortable {
        classes.push("gl-sortable".to_string());
    }
    if let Some(s) = sorted {
        classes.push(format!("gl-sorted-{}", s.order.as_str()));
    }
    if filtered {
        classes.push("gl-filtered".to_string());
    }
    if cell.frozen {
        classes.push("gl-frozen".to_string());
    }

    let key = escape_html(&cell.key);
    let _ = write!(html, r#"<th data-column="{key}""#);
    html.push_str(&span_attr("colspan", cell.colspan));
    html.push_str(&span_attr("rowspan", cell.rowspan));
    if !classes.is_empty() {
        let _ = write!(html, r#" class="{}""#, classes.join(" "));
    }
    if let Some(width) = &cell.width {
        let _ = write!(html, r#" style="width:{}""#, escape_html(width));
    }
    html.push('>');
    html.push_str(&escape_html(&cell.title));

    if let Some(s) = sorted {
        let arrow = match s.order {
            SortOrder::Asc => "\u{25b2}",
            SortOrder::Desc => "\u{25bc}",
        };
        let _ = write!(html, r#"<span class="gl-sort-indicator">{arrow}</span>"#);
    }
    if cell.filterable {
        let _ = write!(
            html,
            r#"<button type="button" class="gl-filter-button" data-filter="{key}">&#9662;</button>"#
        );
    }
    html.push_str("</th>");
}

/// Pager row: first / previous / next / last buttons and a summary.
#[must_use]
pub fn pager_row(paging: &PagingState, colspan: usize) -> String {
    let current = paging.current_page;
    let last = paging.total_pages;
    let mut html = format!(r#"<tr><td colspan="{}"><div class="gl-pager">"#, colspan.max(1));
    for (label, target, enabled) in [
        ("&laquo;", 1, current > 1),
        ("&lsaquo;", current.saturating_sub(1).max(1), current > 1),
        ("&rsaquo;", (current + 1).min(last), current < last),
        ("&raquo;", last, current < last),
    ] {
        let disabled = if enabled { "" } else { " disabled" };
        let _ = write!(
            html,
            r#"<button type="button" data-page="{target}"{disabled}>{label}</button>"#
        );
    }
    let _ = write!(
        html,
        r#"<span class="gl-page-info">Page {current} of {last} ({} records)</span></div></td></tr>"#,
        paging.total_records
    );
    html
}

/// The trailing action cell of a row.
#[must_use]
pub fn action_cell(actions: &[ActionSpec]) -> String {
    let mut html = String::from(r#"<td class="gl-actions">"#);
    for action in actions {
        let _ = write!(
            html,
            r#"<button type="button" data-action="{}">{}</button>"#,
            escape_html(&action.name),
            escape_html(action.display_label())
        );
    }
    html.push_str("</td>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnNode;
    use crate::header::compute_header_structure;

    fn layout() -> HeaderLayout {
        compute_header_structure(&[
            ColumnNode::new("a", "A").index(0),
            ColumnNode::new("b", "B")
                .index(1)
                .child(ColumnNode::new("c", "C").index(0))
                .child(ColumnNode::new("d", "D").index(1).unfilterable()),
        ])
    }

    #[test]
    fn test_header_rows_spans() {
        let html = header_rows(&layout(), None, &FilterState::new(), None);
        assert_eq!(html.matches("<tr>").count(), 2);
        assert!(html.contains(r#"<th data-column="a" rowspan="2" class="gl-sortable">A"#));
        assert!(html.contains(r#"<th data-column="b" colspan="2" class="gl-group">B</th>"#));
        assert!(html.contains(r#"<th data-column="d" class="gl-sortable">D</th>"#));
    }

    #[test]
    fn test_header_sort_and_filter_markers() {
        let mut filters = FilterState::new();
        filters.set("c", ["x"]);
        let sort = SortState::desc("a");
        let html = header_rows(&layout(), Some(&sort), &filters, None);
        assert!(html.contains("gl-sorted-desc"));
        assert!(html.contains("\u{25bc}"));
        assert!(html.contains(r#"class="gl-sortable gl-filtered""#));
    }

    #[test]
    fn test_header_frozen_column() {
        let layout = compute_header_structure(&[
            ColumnNode::new("id", "ID").index(0).frozen(),
            ColumnNode::new("n", "N").index(1).unsortable().unfilterable(),
        ]);
        let html = header_rows(&layout, None, &FilterState::new(), None);
        assert!(html.contains(r#"<th data-column="id" class="gl-sortable gl-frozen">ID"#));
        assert!(html.contains(r#"<th data-column="n">N</th>"#));
    }

    #[test]
    fn test_header_actions_column_spans_all_rows() {
        let html = header_rows(&layout(), None, &FilterState::new(), Some("Actions"));
        assert!(html.contains(r#"<th class="gl-actions" rowspan="2">Actions</th>"#));
    }

    #[test]
    fn test_body_row_escapes_key() {
        assert_eq!(
            body_row(&RowKey::new("a\"b"), "<td></td>"),
            r#"<tr data-row-key="a&quot;b"><td></td></tr>"#
        );
    }

    #[test]
    fn test_placeholder_row() {
        assert_eq!(
            placeholder_row(3, "No Data Available"),
            r#"<tr class="gl-empty"><td colspan="3">No Data Available</td></tr>"#
        );
    }

    #[test]
    fn test_pager_row_first_page() {
        let html = pager_row(&PagingState::new(1, 10, 25), 4);
        assert!(html.contains(r#"<button type="button" data-page="1" disabled>&laquo;</button>"#));
        assert!(html.contains(r#"<button type="button" data-page="2">&rsaquo;</button>"#));
        assert!(html.contains("Page 1 of 3 (25 records)"));
    }

    #[test]
    fn test_pager_row_last_page() {
        let html = pager_row(&PagingState::new(3, 10, 25), 4);
        assert!(html.contains(r#"<button type="button" data-page="3" disabled>&raquo;</button>"#));
        assert!(html.contains(r#"<button type="button" data-page="2">&lsaquo;</button>"#));
    }

    #[test]
    fn test_action_cell() {
        let actions = vec![ActionSpec::new("edit", "Edit"), ActionSpec::new("delete", "")];
        let html = action_cell(&actions);
        assert!(html.starts_with(r#"<td class="gl-actions">"#));
        assert!(html.contains(r#"data-action="edit">Edit</button>"#));
        assert!(html.contains(r#"data-action="delete">delete</button>"#));
    }
}
