//! Gridline: an interactive HTML data grid.
//!
//! Multi-level headers, sortable and filterable columns, paging, row actions
//! and inline editing over a live `<table>`. Rows are patched by composite
//! key instead of being rebuilt on every change.
//!
//! # Browser Usage (WASM)
//!
//! ```javascript
//! import init, { GridApp } from './gridline.js';
//!
//! async function main() {
//!     await init();
//!     const grid = new GridApp('people', JSON.stringify({
//!         key_field: 'id',
//!         source: { mode: 'url', source: '/api/people' },
//!         paging: { enabled: true, page_size: 20 },
//!     }));
//!     grid.on_action((action, record) => console.log(action, record));
//! }
//! ```
//!
//! # Rust Usage
//!
//! [`GridController`] works over any [`TableHost`]; [`MemoryTable`] keeps the
//! rows as strings.
//!
//! ```
//! use gridline::{GridController, MemoryTable, Record, FormatterRegistry};
//! use gridline::yaml::GridConfig;
//!
//! let config = GridConfig::from_yaml("key_field: id").unwrap();
//! let mut grid = GridController::new(config, MemoryTable::new(), FormatterRegistry::new());
//! grid.set_data(vec![Record::new().cell("id", 1).cell("name", "Ann")]);
//! assert_eq!(grid.host().keys(), vec!["1"]);
//! ```

pub use gridline_core::*;
pub use gridline_yaml as yaml;

pub mod actions;
pub mod browser;
pub mod controller;
pub mod edit;
mod error;
pub mod menu;
pub mod source;

pub use actions::ActionRegistry;
pub use controller::{GridController, InteractionState, LoadOutcome};
pub use edit::EditForm;
pub use error::{GridError, LoadError};
pub use menu::FilterMenu;
pub use source::{parse_records, LoadTicket};

#[cfg(target_arch = "wasm32")]
pub use browser::GridApp;
