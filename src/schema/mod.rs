//! Keystroke event input schema
//!
//! Event files are handed over by the capture layer either as a single JSON
//! array or as newline-delimited JSON, one `KeystrokeEvent` per line.

mod adapter;

pub use adapter::*;

/// Identifier of the event record layout accepted by the engine.
pub const SCHEMA_VERSION: &str = "keystroke.event.v1";
