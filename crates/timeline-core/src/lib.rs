//! Core types for Meter Timeline.
//!
//! Holds the lifecycle step catalog, the header/timeline data model, clock
//! time helpers, text formatting, the shared error type and CLI settings.

pub mod catalog;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
