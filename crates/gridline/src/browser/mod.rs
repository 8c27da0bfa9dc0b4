//! Browser runtime for Gridline.
//!
//! This module binds the grid controller to a real `<table>` element, the
//! browser's `fetch` and click events.

#[cfg(target_arch = "wasm32")]
pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod console;
#[cfg(target_arch = "wasm32")]
pub mod dom;
#[cfg(target_arch = "wasm32")]
pub mod fetch;

pub mod events;

#[cfg(target_arch = "wasm32")]
pub use app::GridApp;
#[cfg(target_arch = "wasm32")]
pub use dom::DomTable;
pub use events::GridEvent;
