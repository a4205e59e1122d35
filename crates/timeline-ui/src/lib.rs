//! Console layer for Meter Timeline.
//!
//! Provides the [`console::Console`] abstraction, ratatui-rendered event
//! tables, CSV export, the SVG timeline plot, and the interactive session
//! in [`app`].

pub mod app;
pub mod console;
pub mod export;
pub mod plot;
pub mod table_view;

pub use timeline_core as core;
