//! Row host over a real `<table>` element.

use gridline_core::markup::placeholder_cell;
use gridline_core::{HostError, RowHost, RowKey, TableHost};
use std::collections::HashMap;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlTableElement, HtmlTableRowElement, HtmlTableSectionElement};

/// A `<table class="gl-table">` mounted in a container.
///
/// Rows report the markup last written to them; `innerHTML` comes back
/// re-serialized by the browser.
pub struct DomTable {
    table: HtmlTableElement,
    head: HtmlTableSectionElement,
    body: HtmlTableSectionElement,
    foot: HtmlTableSectionElement,
    placeholder: Option<HtmlTableRowElement>,
    /// Last markup written, by `data-row-key`
    written: HashMap<String, String>,
    content_writes: usize,
}

impl DomTable {
    /// Create the table and append it to `container`.
    ///
    /// # Errors
    ///
    /// Returns an error if the DOM refuses to create or attach the elements.
    pub fn mount(document: &Document, container: &Element) -> Result<Self, JsValue> {
        let table = document
            .create_element("table")?
            .dyn_into::<HtmlTableElement>()
            .map_err(|_| "Element is not a table")?;
        table.set_class_name("gl-table");

        let head = section(table.create_t_head())?;
        let body = section(table.create_t_body())?;
        let foot = section(table.create_t_foot())?;
        container.append_child(&table)?;

        Ok(Self {
            table,
            head,
            body,
            foot,
            placeholder: None,
            written: HashMap::new(),
            content_writes: 0,
        })
    }

    /// The table element.
    #[must_use]
    pub const fn element(&self) -> &HtmlTableElement {
        &self.table
    }

    /// Detach the table from the document.
    pub fn unmount(&self) {
        self.table.remove();
    }

    /// Number of row content writes since mounting.
    #[must_use]
    pub const fn content_writes(&self) -> usize {
        self.content_writes
    }

    fn row_count(&self) -> u32 {
        self.body.rows().length()
    }

    fn write_row(&mut self, row: &HtmlTableRowElement, html: &str) {
        row.set_inner_html(html);
        self.content_writes += 1;
        if let Some(key) = row.get_attribute("data-row-key") {
            self.written.insert(key, html.to_string());
        }
    }
}

fn section(element: web_sys::HtmlElement) -> Result<HtmlTableSectionElement, JsValue> {
    element
        .dyn_into::<HtmlTableSectionElement>()
        .map_err(|_| JsValue::from_str("Element is not a table section"))
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

impl RowHost for DomTable {
    type Handle = HtmlTableRowElement;

    fn create_row(
        &mut self,
        key: &RowKey,
        html: &str,
        index: usize,
    ) -> Result<HtmlTableRowElement, HostError> {
        let index = (index as u32).min(self.row_count());
        let fail = |err: JsValue| HostError {
            key: key.clone(),
            reason: describe(&err),
        };
        let row = self
            .body
            .insert_row_with_index(index as i32)
            .map_err(fail)?
            .dyn_into::<HtmlTableRowElement>()
            .map_err(|_| HostError {
                key: key.clone(),
                reason: "inserted element is not a row".to_string(),
            })?;
        row.set_attribute("data-row-key", key.as_str()).map_err(fail)?;
        self.write_row(&row, html);
        Ok(row)
    }

    fn row_html(&self, row: &HtmlTableRowElement) -> String {
        row.get_attribute("data-row-key")
            .and_then(|key| self.written.get(&key).cloned())
            .unwrap_or_else(|| row.inner_html())
    }

    fn set_row_html(&mut self, row: &HtmlTableRowElement, html: &str) {
        self.write_row(row, html);
    }

    fn row_index(&self, row: &HtmlTableRowElement) -> Option<usize> {
        usize::try_from(row.section_row_index()).ok()
    }

    fn move_row(&mut self, row: &HtmlTableRowElement, index: usize) {
        let rows = self.body.rows();
        let from = self.row_index(row);
        // Moving down: the row's own slot disappears once it is detached.
        let target = match from {
            Some(from) if from < index => index + 1,
            _ => index,
        };
        let reference = rows.item(target as u32);
        if let Err(err) = self.body.insert_before(row, reference.as_deref()) {
            log::error!("failed to move row: {}", describe(&err));
        }
    }

    fn remove_row(&mut self, row: &HtmlTableRowElement) {
        if let Some(key) = row.get_attribute("data-row-key") {
            self.written.remove(&key);
        }
        row.remove();
    }

    fn show_placeholder(&mut self, colspan: usize, message: &str) {
        self.clear_placeholder();
        match self.body.insert_row() {
            Ok(element) => {
                element.set_class_name("gl-empty");
                element.set_inner_html(&placeholder_cell(colspan, message));
                self.placeholder = element.dyn_into::<HtmlTableRowElement>().ok();
            }
            Err(err) => log::error!("failed to show empty row: {}", describe(&err)),
        }
    }

    fn clear_placeholder(&mut self) {
        if let Some(row) = self.placeholder.take() {
            row.remove();
        }
    }
}

impl TableHost for DomTable {
    fn set_head_html(&mut self, html: &str) {
        self.head.set_inner_html(html);
    }

    fn set_foot_html(&mut self, html: &str) {
        self.foot.set_inner_html(html);
    }
}
