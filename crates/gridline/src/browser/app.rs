//! WASM application entry point.

use super::dom::DomTable;
use super::events::GridEvent;
use super::fetch::fetch_records;
use crate::controller::GridController;
use gridline_core::{FormatterRegistry, JsonExporter, Record, RowKey};
use gridline_yaml::GridConfig;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{window, Element, HtmlInputElement, MouseEvent, NodeList};

/// Action name that opens the inline edit form on editable grids.
pub const EDIT_ACTION: &str = "edit";

/// State shared between the app and its event listener.
struct Shared {
    grid: RefCell<GridController<DomTable>>,
    container: Element,
    overlay: Element,
}

impl Shared {
    fn handle_click(&self, event: &MouseEvent) {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let lookup = |selector: &str, attr: &str| {
            let element = target.closest(selector).ok().flatten()?;
            if !self.container.contains(Some(&*element)) {
                return None;
            }
            element.get_attribute(attr)
        };
        if let Some(grid_event) = GridEvent::classify(lookup) {
            log::debug!("{grid_event:?}");
            self.dispatch(grid_event);
        }
    }

    fn dispatch(&self, event: GridEvent) {
        match event {
            GridEvent::HeaderClick { key } => {
                self.grid.borrow_mut().handle_header_click(&key);
            }
            GridEvent::OpenFilter { key } => {
                let menu = self.grid.borrow_mut().open_filter_menu(&key);
                match menu {
                    Some(menu) => self.show_overlay(&menu.to_html()),
                    None => self.hide_overlay(),
                }
            }
            GridEvent::ApplyFilter { key } => {
                let selected = self.input_values("input[type=checkbox]:checked");
                self.hide_overlay();
                self.grid
                    .borrow_mut()
                    .handle_filter_apply(&key, selected.into_iter().map(|(_, v)| v));
            }
            GridEvent::CancelFilter => {
                self.grid.borrow_mut().cancel_filter_menu();
                self.hide_overlay();
            }
            GridEvent::Page(page) => {
                self.grid.borrow_mut().goto_page(page);
            }
            GridEvent::Action { action, row } => self.run_action(&action, &row),
            GridEvent::SaveEdit => {
                let values: HashMap<String, String> =
                    self.input_values("input[name]").into_iter().collect();
                self.hide_overlay();
                if let Err(err) = self.grid.borrow_mut().end_edit(&values) {
                    log::warn!("{err}");
                }
            }
            GridEvent::CancelEdit => {
                self.grid.borrow_mut().cancel_edit();
                self.hide_overlay();
            }
        }
    }

    fn run_action(&self, action: &str, row: &RowKey) {
        if action == EDIT_ACTION && self.grid.borrow().config().editable {
            let form = self.grid.borrow_mut().start_edit(row);
            match form {
                Ok(form) => self.show_overlay(&form.to_html()),
                Err(err) => log::warn!("{err}"),
            }
            return;
        }
        // The callback may call back into the app; run it outside the borrow.
        let prepared = self.grid.borrow().prepare_action(action, row);
        match prepared {
            Ok((handler, record)) => handler(action, &record),
            Err(err) => log::warn!("{err}"),
        }
    }

    fn show_overlay(&self, html: &str) {
        self.overlay.set_inner_html(html);
        let _ = self.overlay.class_list().add_1("gl-open");
    }

    fn hide_overlay(&self) {
        self.overlay.set_inner_html("");
        let _ = self.overlay.class_list().remove_1("gl-open");
    }

    /// `(name, value)` of the overlay inputs matching `selector`.
    fn input_values(&self, selector: &str) -> Vec<(String, String)> {
        self.overlay
            .query_selector_all(selector)
            .map(|nodes| inputs(&nodes))
            .unwrap_or_default()
            .into_iter()
            .map(|input| (input.name(), input.value()))
            .collect()
    }
}

fn inputs(nodes: &NodeList) -> Vec<HtmlInputElement> {
    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<HtmlInputElement>().ok())
        .collect()
}

fn record_to_js(record: &Record) -> JsValue {
    js_sys::JSON::parse(&record.to_json().to_string()).unwrap_or(JsValue::NULL)
}

/// Interactive grid mounted in a container element.
#[wasm_bindgen]
pub struct GridApp {
    shared: Rc<Shared>,
    style: Element,
    click_callback: Option<Closure<dyn FnMut(MouseEvent)>>,
    destroyed: bool,
}

#[wasm_bindgen]
impl GridApp {
    /// Create a grid in the element with id `container_id` from a JSON
    /// configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str, config_json: &str) -> Result<GridApp, JsValue> {
        let config = GridConfig::from_json(config_json)
            .map_err(|e| JsValue::from_str(&format!("Config error: {e}")))?;
        Self::mount(container_id, config)
    }

    /// Create a grid from a YAML configuration.
    pub fn from_yaml(container_id: &str, config_yaml: &str) -> Result<GridApp, JsValue> {
        let config = GridConfig::from_yaml(config_yaml)
            .map_err(|e| JsValue::from_str(&format!("Config error: {e}")))?;
        Self::mount(container_id, config)
    }

    /// Register the row action callback: `(action, record) => ...`.
    pub fn on_action(&self, callback: js_sys::Function) {
        self.shared
            .grid
            .borrow_mut()
            .actions_mut()
            .register_fallback(move |action: &str, record: &Record| {
                let _ = callback.call2(
                    &JsValue::NULL,
                    &JsValue::from_str(action),
                    &record_to_js(record),
                );
            });
    }

    /// Fetch records from a URL; a newer load or `set_data_json` supersedes it.
    pub fn load_url(&self, url: String) {
        let shared = Rc::clone(&self.shared);
        let ticket = shared.grid.borrow_mut().begin_load();
        spawn_local(async move {
            let result = fetch_records(&url).await;
            shared.grid.borrow_mut().complete_load(ticket, result);
        });
    }

    /// Replace the records with a JSON array.
    pub fn set_data_json(&self, json: &str) -> Result<(), JsValue> {
        let records = crate::source::parse_records(json)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.shared.grid.borrow_mut().set_data(records);
        Ok(())
    }

    /// Re-render the current view.
    pub fn render(&self) {
        self.shared.grid.borrow_mut().render();
    }

    /// Number of records.
    pub fn record_count(&self) -> usize {
        self.shared.grid.borrow().store().len()
    }

    /// Current page (1-based).
    pub fn current_page(&self) -> usize {
        self.shared.grid.borrow().paging().current_page
    }

    /// Headers and sorted, filtered rows as JSON, for a spreadsheet writer.
    pub fn export_json(&self) -> Result<String, JsValue> {
        let bytes = self
            .shared
            .grid
            .borrow()
            .export(&JsonExporter::default())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Remove the listener, the table, the overlay and the injected styles.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        if let Some(cb) = self.click_callback.take() {
            let _ = self
                .shared
                .container
                .remove_event_listener_with_callback("click", cb.as_ref().unchecked_ref());
        }
        let mut grid = self.shared.grid.borrow_mut();
        grid.destroy();
        grid.host().unmount();
        self.shared.overlay.remove();
        self.style.remove();
        log::info!("grid destroyed");
    }
}

impl GridApp {
    fn mount(container_id: &str, config: GridConfig) -> Result<Self, JsValue> {
        super::console::install(log::LevelFilter::Info);

        let document = window()
            .ok_or("No window")?
            .document()
            .ok_or("No document")?;
        let container = document
            .get_element_by_id(container_id)
            .ok_or_else(|| format!("Container '{container_id}' not found"))?;

        let style = document.create_element("style")?;
        style.set_text_content(Some(&config.style.to_css(container_id)));
        container.append_child(&style)?;

        let table = DomTable::mount(&document, &container)?;

        let overlay = document.create_element("div")?;
        overlay.set_class_name("gl-overlay");
        container.append_child(&overlay)?;

        let grid = GridController::new(config, table, FormatterRegistry::new());
        let url = grid.source_url().map(str::to_string);
        let shared = Rc::new(Shared {
            grid: RefCell::new(grid),
            container,
            overlay,
        });

        let listener = Rc::clone(&shared);
        let cb = Closure::new(move |e: MouseEvent| listener.handle_click(&e));
        shared
            .container
            .add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;

        let app = Self {
            shared,
            style,
            click_callback: Some(cb),
            destroyed: false,
        };
        if let Some(url) = url {
            app.load_url(url);
        }
        log::info!("grid mounted in #{container_id}");
        Ok(app)
    }
}

impl Drop for GridApp {
    fn drop(&mut self) {
        self.destroy();
    }
}
