//! Analysis result structure
//!
//! One explicitly typed section per analysis. Only per-application and
//! per-hour breakdowns use maps, keyed by application name and local hour.

use crate::correction::ErrorPatterns;
use crate::metrics::{
    CognitiveLoad, EfficiencyMetrics, FingerUsage, HesitationPatterns, KeyCombinations, KeyUsage,
};
use crate::opportunities::OptimizationOpportunities;
use crate::session::SessionAnalysis;
use crate::types::local_time;
use crate::words::WordPatterns;
use chrono::{SecondsFormat, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// First and last event of the analyzed stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start_timestamp: f64,
    pub end_timestamp: f64,
    /// RFC 3339 in the configured timezone
    pub start: Option<String>,
    pub end: Option<String>,
}

impl TimeRange {
    pub fn new(start_timestamp: f64, end_timestamp: f64, tz: Tz) -> Self {
        let format = |ts: f64| {
            local_time(ts, tz).map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, false))
        };
        Self {
            start_timestamp,
            end_timestamp,
            start: format(start_timestamp),
            end: format(end_timestamp),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Wall-clock time of the run; the only field that differs between runs
    pub analysis_timestamp: String,
    pub engine_version: String,
    pub timezone: String,
    pub total_events: usize,
    pub time_range: TimeRange,
}

impl ReportMetadata {
    pub fn new(total_events: usize, time_range: TimeRange, tz: Tz) -> Self {
        Self {
            analysis_timestamp: Utc::now()
                .with_timezone(&tz)
                .to_rfc3339_opts(SecondsFormat::Secs, false),
            engine_version: crate::ENGINE_VERSION.to_string(),
            timezone: tz.name().to_string(),
            total_events,
            time_range,
        }
    }
}

/// Full analysis of a non-empty event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingReport {
    pub metadata: ReportMetadata,
    pub key_usage: KeyUsage,
    pub hesitation_patterns: HesitationPatterns,
    pub efficiency_metrics: EfficiencyMetrics,
    pub finger_usage: FingerUsage,
    /// Absent when no event carries a load indicator
    pub cognitive_load: Option<CognitiveLoad>,
    pub error_patterns: ErrorPatterns,
    pub word_patterns: WordPatterns,
    pub key_combinations: KeyCombinations,
    pub optimization_opportunities: OptimizationOpportunities,
    pub session_analysis: SessionAnalysis,
}

/// Result of an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// The input held no events
    Empty,
    Complete(Box<TypingReport>),
}

impl AnalysisOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, AnalysisOutcome::Empty)
    }

    pub fn report(&self) -> Option<&TypingReport> {
        match self {
            AnalysisOutcome::Empty => None,
            AnalysisOutcome::Complete(report) => Some(report),
        }
    }

    pub fn into_report(self) -> Option<TypingReport> {
        match self {
            AnalysisOutcome::Empty => None,
            AnalysisOutcome::Complete(report) => Some(*report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_outcome_serialization() {
        let json = serde_json::to_string(&AnalysisOutcome::Empty).unwrap();
        assert_eq!(json, r#"{"status":"empty"}"#);
        assert!(AnalysisOutcome::Empty.report().is_none());
    }

    #[test]
    fn test_time_range_in_timezone() {
        // 2024-01-15T14:30:00Z
        let range = TimeRange::new(1_705_329_000.0, 1_705_329_060.5, chrono_tz::Asia::Tokyo);
        assert_eq!(range.start.as_deref(), Some("2024-01-15T23:30:00.000+09:00"));
        assert_eq!(range.end.as_deref(), Some("2024-01-15T23:31:00.500+09:00"));
    }

    #[test]
    fn test_metadata_records_engine() {
        let range = TimeRange::new(0.0, 1.0, Tz::UTC);
        let metadata = ReportMetadata::new(2, range, Tz::UTC);
        assert_eq!(metadata.engine_version, crate::ENGINE_VERSION);
        assert_eq!(metadata.timezone, "UTC");
        assert!(!metadata.analysis_timestamp.is_empty());
    }
}
