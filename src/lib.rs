//! Keystroke Flux - typing behavior analytics from keystroke event streams
//!
//! Flux turns an ordered stream of keystroke events into typing analytics
//! through a deterministic pipeline: session segmentation, flow detection,
//! correction and word reconstruction → stream metrics → ranked optimization
//! opportunities.
//!
//! ## Modules
//!
//! - **Event model**: [`types`], parsed and validated by [`schema`]
//! - **Components**: [`session`], [`flow`], [`correction`], [`words`], [`metrics`], [`opportunities`]
//! - **Pipeline**: [`analyze`] (one-shot) and [`TypingAnalyzer`] (reusable)

pub mod config;
pub mod correction;
pub mod error;
pub mod flow;
pub mod heuristics;
pub mod metrics;
pub mod opportunities;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod session;
pub mod stats;
pub mod types;
pub mod words;

#[cfg(test)]
mod test_support;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, EventValidationError};
pub use pipeline::{analyze, events_to_report_json, TypingAnalyzer};
pub use report::{AnalysisOutcome, TypingReport};
pub use types::{Finger, KeystrokeEvent, RawKeypress};

// Schema exports
pub use schema::{parse_array, parse_ndjson, validate_events, InputFormat, SCHEMA_VERSION};

/// Engine version recorded in report metadata
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
