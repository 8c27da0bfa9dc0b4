//! Click classification for event delegation.
//!
//! The grid listens for clicks once, on its container. A click is mapped to
//! a [`GridEvent`] from the `data-*` attributes of the clicked element and
//! its ancestors, so the mapping can be tested without a browser.

use gridline_core::RowKey;

/// A grid interaction decoded from a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    /// Header cell clicked
    HeaderClick {
        /// Column key
        key: String,
    },
    /// Filter button clicked
    OpenFilter {
        /// Column key
        key: String,
    },
    /// Filter menu applied
    ApplyFilter {
        /// Column key
        key: String,
    },
    /// Filter menu dismissed
    CancelFilter,
    /// Pager button clicked
    Page(usize),
    /// Row action clicked
    Action {
        /// Action name
        action: String,
        /// Key of the row
        row: RowKey,
    },
    /// Edit form submitted
    SaveEdit,
    /// Edit form dismissed
    CancelEdit,
}

impl GridEvent {
    /// Decode a click.
    ///
    /// `lookup(selector, attr)` returns the value of `attr` on the clicked
    /// element or its nearest ancestor matching the CSS `selector`. Controls
    /// nested in a header cell win over the header cell itself.
    pub fn classify(lookup: impl Fn(&str, &str) -> Option<String>) -> Option<Self> {
        let closest = |attr: &str| lookup(&format!("[{attr}]"), attr);
        if let Some(edit) = closest("data-edit") {
            return match edit.as_str() {
                "save" => Some(Self::SaveEdit),
                "cancel" => Some(Self::CancelEdit),
                _ => None,
            };
        }
        if let Some(key) = closest("data-filter-apply") {
            return Some(Self::ApplyFilter { key });
        }
        if closest("data-filter-cancel").is_some() {
            return Some(Self::CancelFilter);
        }
        if let Some(key) = closest("data-filter") {
            return Some(Self::OpenFilter { key });
        }
        if let Some(page) = closest("data-page") {
            return page.parse().ok().map(Self::Page);
        }
        if let Some(action) = closest("data-action") {
            let row = closest("data-row-key")?;
            return Some(Self::Action {
                action,
                row: RowKey::new(row),
            });
        }
        // Body cells carry `data-column` too; only header cells sort.
        lookup("th[data-column]", "data-column").map(|key| Self::HeaderClick { key })
    }
}
