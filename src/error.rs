//! Error types for Keystroke Flux

use thiserror::Error;

/// Errors that can occur at the edges of the engine (parsing, validation, configuration).
///
/// The analysis itself never fails: empty input produces an explicit empty outcome.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to parse event payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid event at index {index}: {source}")]
    InvalidEvent {
        index: usize,
        #[source]
        source: EventValidationError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),
}

/// Violations of the keystroke event invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EventValidationError {
    #[error("dwell_time must be >= 0, got {0}")]
    NegativeDwellTime(f64),

    #[error("pause_before must be >= 0, got {0}")]
    NegativePause(f64),

    #[error("key_char must hold at most one character, got {0:?}")]
    MultiCharacterKey(String),

    #[error("is_correction is set on non-deletion key {0:?}")]
    CorrectionOnNonDeletionKey(String),

    #[error("cognitive_load_indicator must be within [0, 1], got {0}")]
    CognitiveLoadOutOfRange(f64),

    #[error("timestamp {current} precedes previous event at {previous}")]
    OutOfOrder { previous: f64, current: f64 },
}
