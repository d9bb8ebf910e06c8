//! Configuration for the analysis engine.
//!
//! Keys mirror the dotted names used by the capture/config collaborator
//! (`analysis.hesitation_threshold`, `session_detection.long_pause_threshold`, ...).
//! Every field has a default so partial documents deserialize cleanly.

use crate::error::AnalysisError;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration consumed by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Per-keystroke analysis thresholds
    pub analysis: AnalysisSettings,
    /// Session boundary thresholds
    pub session_detection: SessionDetectionSettings,
}

/// `analysis.*` keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Pause length (seconds) considered hesitant for per-key statistics
    pub hesitation_threshold: f64,
    /// Maximum gap (seconds) classified as burst typing
    pub burst_threshold: f64,
    /// Minimum run length (keystrokes) to count as a flow period
    pub flow_state_threshold: usize,
    /// IANA timezone used for hour-of-day buckets
    pub timezone: String,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            hesitation_threshold: 0.8,
            burst_threshold: 0.15,
            flow_state_threshold: 60,
            timezone: "UTC".to_string(),
        }
    }
}

/// `session_detection.*` keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDetectionSettings {
    /// Gap (seconds) that splits sessions
    pub long_pause_threshold: f64,
    /// Diagnostic only: gaps above this count as short breaks
    pub short_pause_threshold: f64,
    /// Diagnostic only: gaps above this count as medium breaks
    pub medium_pause_threshold: f64,
}

impl Default for SessionDetectionSettings {
    fn default() -> Self {
        Self {
            long_pause_threshold: 1800.0,
            short_pause_threshold: 120.0,
            medium_pause_threshold: 900.0,
        }
    }
}

impl AnalysisConfig {
    /// Parse a configuration document from JSON.
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Check thresholds and timezone.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let a = &self.analysis;
        if !(a.hesitation_threshold > 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "analysis.hesitation_threshold must be positive, got {}",
                a.hesitation_threshold
            )));
        }
        if !(a.burst_threshold > 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "analysis.burst_threshold must be positive, got {}",
                a.burst_threshold
            )));
        }
        if a.flow_state_threshold == 0 {
            return Err(AnalysisError::InvalidConfig(
                "analysis.flow_state_threshold must be at least 1".to_string(),
            ));
        }

        let s = &self.session_detection;
        if !(s.short_pause_threshold > 0.0
            && s.short_pause_threshold <= s.medium_pause_threshold
            && s.medium_pause_threshold <= s.long_pause_threshold)
        {
            return Err(AnalysisError::InvalidConfig(format!(
                "session_detection thresholds must satisfy 0 < short ({}) <= medium ({}) <= long ({})",
                s.short_pause_threshold, s.medium_pause_threshold, s.long_pause_threshold
            )));
        }

        self.timezone()?;
        Ok(())
    }

    /// Resolve `analysis.timezone`.
    pub fn timezone(&self) -> Result<Tz, AnalysisError> {
        self.analysis
            .timezone
            .parse::<Tz>()
            .map_err(|_| AnalysisError::InvalidTimezone(self.analysis.timezone.clone()))
    }
}
