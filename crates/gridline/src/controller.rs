//! The grid controller: owns the configuration, the records and the row host,
//! and turns user interactions into re-renders.
//!
//! Every interaction follows the same path: update the data store (sort,
//! filter, page, records), derive the view, then reconcile the host's rows
//! against it. Headers and pager are re-emitted as markup on each render; the
//! header layout itself is only recomputed when the columns change.

use crate::actions::{ActionHandler, ActionRegistry};
use crate::edit::{apply_values, EditForm};
use crate::error::{GridError, LoadError};
use crate::menu::{FilterMenu, FilterOption};
use crate::source::{LoadTicket, LoadTracker};
use gridline_core::column::find_column_mut;
use gridline_core::markup::{self, ActionSpec};
use gridline_core::reconcile::{check_unique, composite_keys, positional_keys};
use gridline_core::{
    compute_header_structure, infer_columns, ColumnNode, DataStore, EmptyRow, FormatterRegistry,
    HeaderLayout, PagingState, Record, RowKey, RowOp, RowRenderer, SortState, TableExporter,
    TableHost, TableReconciler, TableSnapshot,
};
use gridline_yaml::{ConfigIssue, GridConfig, SourceMode};
use std::collections::HashMap;

/// What the user is doing with the grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InteractionState {
    /// Nothing open
    #[default]
    Idle,
    /// A filter menu is open for a column
    FilterMenuOpen {
        /// Column key
        key: String,
    },
    /// A row is being edited
    Editing {
        /// Row key
        key: RowKey,
    },
}

/// Outcome of completing a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Records replaced and rendered
    Applied,
    /// A newer load started since; result dropped
    Stale,
    /// Load failed; previous records kept
    Failed,
}

/// Interactive grid over a table host.
pub struct GridController<H: TableHost> {
    config: GridConfig,
    host: H,
    registry: FormatterRegistry,
    columns: Vec<ColumnNode>,
    layout: HeaderLayout,
    renderer: RowRenderer,
    store: DataStore,
    reconciler: TableReconciler<H::Handle>,
    actions: ActionRegistry,
    loads: LoadTracker,
    state: InteractionState,
    issues: Vec<ConfigIssue>,
    positional: bool,
}

impl<H: TableHost> std::fmt::Debug for GridController<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridController")
            .field("columns", &self.layout.leaf_keys())
            .field("records", &self.store.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<H: TableHost> GridController<H> {
    /// Create a controller and render the initial view.
    ///
    /// Configuration issues are logged, never fatal. Inline `json` sources
    /// are loaded immediately; `url` sources are left to the caller (see
    /// [`Self::source_url`]).
    pub fn new(config: GridConfig, host: H, registry: FormatterRegistry) -> Self {
        let issues = config.validate(&registry);
        for issue in &issues {
            log::warn!("grid configuration: {issue}");
        }

        let mut store = DataStore::new(config.paging);
        store.set_sort(config.sort.clone());

        let mut grid = Self {
            columns: config.columns.clone(),
            config,
            host,
            registry,
            layout: HeaderLayout::default(),
            renderer: RowRenderer::default(),
            store,
            reconciler: TableReconciler::new(),
            actions: ActionRegistry::new(),
            loads: LoadTracker::new(),
            state: InteractionState::Idle,
            issues,
            positional: false,
        };

        if let Some(source) = grid.config.source.as_ref() {
            if source.mode == SourceMode::Json {
                match source.inline_records() {
                    Some(records) => grid.store.set_records(records),
                    None => log::error!("inline data is not an array"),
                }
            }
        }
        grid.infer_columns_if_needed();
        grid.rebuild_columns();
        grid.render();
        grid
    }

    /// Configuration the grid was created with.
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Issues found when the configuration was checked.
    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    /// The row host.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Current column tree.
    pub fn columns(&self) -> &[ColumnNode] {
        &self.columns
    }

    /// Current header layout.
    pub const fn layout(&self) -> &HeaderLayout {
        &self.layout
    }

    /// Records and view parameters.
    pub const fn store(&self) -> &DataStore {
        &self.store
    }

    /// Current interaction state.
    pub const fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Paging position of the current view.
    pub fn paging(&self) -> PagingState {
        self.store.paging_state()
    }

    /// Keys of the rendered rows, in order.
    pub fn row_keys(&self) -> &[RowKey] {
        self.reconciler.ordered_keys()
    }

    /// URL to fetch records from, when the source is a URL.
    pub fn source_url(&self) -> Option<&str> {
        self.config.source.as_ref().and_then(|s| s.as_url())
    }

    /// Row action callbacks.
    pub fn actions_mut(&mut self) -> &mut ActionRegistry {
        &mut self.actions
    }

    // ---------------------------------------------------------------------
    // Columns and data
    // ---------------------------------------------------------------------

    /// Replace the column tree and re-render.
    pub fn set_columns(&mut self, columns: Vec<ColumnNode>) {
        self.columns = columns;
        self.infer_columns_if_needed();
        self.rebuild_columns();
        self.render();
    }

    /// Replace the records and re-render.
    ///
    /// Supersedes any pending load.
    pub fn set_data(&mut self, records: Vec<Record>) {
        self.loads.invalidate();
        self.apply_records(records);
    }

    fn apply_records(&mut self, records: Vec<Record>) {
        self.store.set_records(records);
        if self.infer_columns_if_needed() {
            self.rebuild_columns();
        }
        self.render();
    }

    /// Start a load; only the latest load's result will be applied.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.loads.begin()
    }

    /// Finish a load started with [`Self::begin_load`].
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Record>, LoadError>,
    ) -> LoadOutcome {
        if !self.loads.is_current(ticket) {
            log::debug!("dropping result of superseded load {}", ticket.generation());
            return LoadOutcome::Stale;
        }
        match result {
            Ok(records) => {
                log::info!("loaded {} records", records.len());
                self.apply_records(records);
                LoadOutcome::Applied
            }
            Err(err) => {
                log::error!("failed to load records: {err}");
                LoadOutcome::Failed
            }
        }
    }

    fn infer_columns_if_needed(&mut self) -> bool {
        if !self.columns.is_empty() {
            return false;
        }
        match self.store.records().first() {
            Some(first) => {
                self.columns = infer_columns(first);
                true
            }
            None => false,
        }
    }

    fn rebuild_columns(&mut self) {
        for key in self.store.filters().keys().map(str::to_string).collect::<Vec<_>>() {
            if let Some(column) = find_column_mut(&mut self.columns, &key) {
                column.has_filter = true;
            }
        }
        self.layout = compute_header_structure(&self.columns);
        self.renderer = RowRenderer::new(
            &self.layout.leaves,
            &self.registry,
            self.config.format_options(),
        );
    }

    // ---------------------------------------------------------------------
    // Rendering
    // ---------------------------------------------------------------------

    fn colspan(&self) -> usize {
        self.layout.leaf_count() + usize::from(!self.config.actions.is_empty())
    }

    /// Derive the view and patch the host. Returns the row operations applied.
    pub fn render(&mut self) -> Vec<RowOp> {
        let view = self.store.view();

        let mut positional = self.config.key_field.is_empty();
        let mut keys = if positional {
            positional_keys(view.rows.len())
        } else {
            composite_keys(&view.rows, &self.config.key_field)
        };
        if let Err(err) = check_unique(&keys) {
            log::warn!("{err}; keying rows by position");
            positional = true;
            keys = positional_keys(view.rows.len());
        }
        if positional != self.positional {
            // Positional and field keys never identify the same row.
            clear_rows(&mut self.reconciler, &mut self.host);
        }
        self.positional = positional;

        let empty = EmptyRow::new(self.colspan(), self.config.empty_message.clone());
        let renderer = &self.renderer;
        let actions = &self.config.actions;
        let result = self.reconciler.apply(
            &mut self.host,
            &view.rows,
            &keys,
            |record| row_html(renderer, actions, record),
            &empty,
        );
        let ops = match result {
            Ok(ops) => ops,
            Err(err) => {
                log::error!("render failed: {err}");
                Vec::new()
            }
        };

        let actions_title = (!actions.is_empty()).then_some(self.config.actions_title.as_str());
        self.host.set_head_html(&markup::header_rows(
            &self.layout,
            self.store.sort(),
            self.store.filters(),
            actions_title,
        ));
        let foot = if self.store.paging_options().enabled {
            markup::pager_row(&view.paging, empty.colspan)
        } else {
            String::new()
        };
        self.host.set_foot_html(&foot);

        log::debug!(
            "rendered page {}/{} with {} rows, {} row operations",
            view.paging.current_page,
            view.paging.total_pages,
            view.rows.len(),
            ops.len()
        );
        ops
    }

    // ---------------------------------------------------------------------
    // Sorting
    // ---------------------------------------------------------------------

    /// Sort by a column; clicking the sorted column again flips the order.
    ///
    /// Group headers and unsortable columns are ignored. Returns whether the
    /// sort changed.
    pub fn handle_header_click(&mut self, key: &str) -> bool {
        let Some(cell) = self.layout.cell(key) else {
            return false;
        };
        if cell.is_group || !cell.sortable {
            return false;
        }
        let sort = match self.store.sort() {
            Some(current) if current.key == key => SortState {
                key: current.key.clone(),
                order: current.order.toggled(),
            },
            _ => SortState::asc(key),
        };
        self.store.set_sort(Some(sort));
        self.render();
        true
    }

    // ---------------------------------------------------------------------
    // Filtering
    // ---------------------------------------------------------------------

    /// Open the filter menu of a column, closing any other open menu.
    ///
    /// Values are the distinct values of the column over all records, not
    /// only the filtered ones.
    pub fn open_filter_menu(&mut self, key: &str) -> Option<FilterMenu> {
        let cell = self.layout.cell(key)?;
        if cell.is_group || !cell.filterable {
            return None;
        }
        let title = cell.title.clone();
        let selected = self.store.filters().get(key);
        let options = self
            .store
            .distinct_values(key)
            .into_iter()
            .map(|value| FilterOption {
                checked: selected.is_some_and(|s| s.contains(&value)),
                value,
            })
            .collect();
        self.state = InteractionState::FilterMenuOpen {
            key: key.to_string(),
        };
        Some(FilterMenu {
            key: key.to_string(),
            title,
            options,
        })
    }

    /// Close the open filter menu without applying it.
    pub fn cancel_filter_menu(&mut self) {
        if matches!(self.state, InteractionState::FilterMenuOpen { .. }) {
            self.state = InteractionState::Idle;
        }
    }

    /// Accept only the selected values of a column; an empty selection
    /// clears the column's filter. Goes back to page 1, keeping the sort.
    ///
    /// Keys that are not filterable leaf columns are ignored. Returns
    /// whether the filter was applied.
    pub fn handle_filter_apply<I, S>(&mut self, key: &str, selected: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(cell) = self.layout.cell(key) else {
            log::warn!("filter on unknown column '{key}' ignored");
            return false;
        };
        if cell.is_group || !cell.filterable {
            log::warn!("column '{key}' is not filterable");
            return false;
        }
        let active = self.store.set_filter(key, selected);
        if let Some(column) = find_column_mut(&mut self.columns, key) {
            column.has_filter = active;
        }
        for cell in self.layout.rows.iter_mut().flatten() {
            if cell.key == key {
                cell.has_filter = active;
            }
        }
        self.state = InteractionState::Idle;
        self.render();
        true
    }

    // ---------------------------------------------------------------------
    // Paging
    // ---------------------------------------------------------------------

    /// Go to a page; out-of-range pages are ignored. Returns whether the
    /// page changed.
    pub fn goto_page(&mut self, page: usize) -> bool {
        if page == self.paging().current_page || !self.store.goto_page(page) {
            return false;
        }
        self.render();
        true
    }

    /// Go to the next page.
    pub fn next_page(&mut self) -> bool {
        self.goto_page(self.paging().current_page + 1)
    }

    /// Go to the previous page.
    pub fn prev_page(&mut self) -> bool {
        self.goto_page(self.paging().current_page.saturating_sub(1))
    }

    // ---------------------------------------------------------------------
    // Row lookup, actions and editing
    // ---------------------------------------------------------------------

    fn locate(&self, key: &RowKey) -> Option<usize> {
        if self.positional {
            let position: usize = key.as_str().strip_prefix('#')?.parse().ok()?;
            let view = self.store.view();
            let record = view.rows.get(position)?;
            self.store.index_of(record)
        } else {
            let record = self.store.find(&self.config.key_field, key)?;
            self.store.index_of(record)
        }
    }

    /// The original record behind a displayed row.
    pub fn record(&self, key: &RowKey) -> Option<&Record> {
        self.locate(key).map(|i| &self.store.records()[i])
    }

    /// Resolve an action click to its callback and the full record, without
    /// calling it.
    pub fn prepare_action(
        &self,
        action: &str,
        key: &RowKey,
    ) -> Result<(ActionHandler, Record), GridError> {
        let record = self
            .record(key)
            .ok_or_else(|| GridError::UnknownRow(key.to_string()))?;
        let handler = self
            .actions
            .resolve(action)
            .ok_or_else(|| GridError::UnknownAction(action.to_string()))?;
        Ok((handler, record.clone()))
    }

    /// Call the callback of a row action with the row's full record.
    pub fn handle_action_menu_click(&self, action: &str, key: &RowKey) -> Result<(), GridError> {
        let (handler, record) = self.prepare_action(action, key)?;
        handler(action, &record);
        Ok(())
    }

    /// Configured row actions.
    pub fn action_specs(&self) -> &[ActionSpec] {
        &self.config.actions
    }

    /// Start editing a row.
    pub fn start_edit(&mut self, key: &RowKey) -> Result<EditForm, GridError> {
        if !self.config.editable {
            return Err(GridError::NotEditable);
        }
        let record = self
            .record(key)
            .ok_or_else(|| GridError::UnknownRow(key.to_string()))?;
        let form = EditForm::new(key.clone(), record, &self.layout.leaves);
        self.state = InteractionState::Editing { key: key.clone() };
        Ok(form)
    }

    /// Commit the edit in progress with the submitted values.
    pub fn end_edit(&mut self, values: &HashMap<String, String>) -> Result<(), GridError> {
        let InteractionState::Editing { key } = std::mem::take(&mut self.state) else {
            return Err(GridError::NoEditInProgress);
        };
        let index = self
            .locate(&key)
            .ok_or_else(|| GridError::UnknownRow(key.to_string()))?;
        let edited = apply_values(&self.store.records()[index], &self.layout.leaves, values);
        self.store.replace_at(index, edited);
        self.render();
        Ok(())
    }

    /// Abandon the edit in progress.
    pub fn cancel_edit(&mut self) {
        if matches!(self.state, InteractionState::Editing { .. }) {
            self.state = InteractionState::Idle;
        }
    }

    // ---------------------------------------------------------------------
    // Export and teardown
    // ---------------------------------------------------------------------

    /// Headers and the text of every sorted, filtered record (all pages).
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot::capture(
            &self.layout,
            &self.store.filtered(),
            &self.config.format_options(),
        )
    }

    /// Hand the snapshot to an exporter.
    pub fn export(&self, exporter: &dyn TableExporter) -> Result<Vec<u8>, GridError> {
        Ok(exporter.export(&self.snapshot())?)
    }

    /// Remove every row and header, drop pending loads and close any menu.
    pub fn destroy(&mut self) {
        self.loads.invalidate();
        clear_rows(&mut self.reconciler, &mut self.host);
        self.host.clear_placeholder();
        self.host.set_head_html("");
        self.host.set_foot_html("");
        self.state = InteractionState::Idle;
    }

    /// Tear down and give back the host.
    pub fn into_host(mut self) -> H {
        self.destroy();
        self.host
    }
}

fn clear_rows<H: TableHost>(reconciler: &mut TableReconciler<H::Handle>, host: &mut H) {
    for key in reconciler.ordered_keys() {
        if let Some(row) = reconciler.row(key) {
            host.remove_row(row);
        }
    }
    reconciler.forget();
}

fn row_html(renderer: &RowRenderer, actions: &[ActionSpec], record: &Record) -> String {
    let mut html = renderer.row_html(record);
    if !actions.is_empty() {
        html.push_str(&markup::action_cell(actions));
    }
    html
}
