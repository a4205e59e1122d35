//! Log ingestion layer for Meter Timeline.
//!
//! Reads meter logs from disk, extracts device identity headers and
//! lifecycle step timestamps, and runs the extractor over whole directories.

pub mod batch;
pub mod header;
pub mod reader;
pub mod timeline;

pub use timeline_core as core;
