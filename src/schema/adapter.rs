//! Parsing and validation of keystroke event payloads

use crate::error::{AnalysisError, EventValidationError};
use crate::types::KeystrokeEvent;
use serde::{Deserialize, Serialize};

/// Layout of an event payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// A single JSON array
    #[default]
    Json,
    /// One JSON object per line
    Ndjson,
}

/// Parse a JSON string containing an array of events.
pub fn parse_array(json: &str) -> Result<Vec<KeystrokeEvent>, AnalysisError> {
    let events: Vec<KeystrokeEvent> = serde_json::from_str(json)?;
    Ok(events)
}

/// Parse NDJSON (newline-delimited JSON) events, skipping blank lines.
pub fn parse_ndjson(ndjson: &str) -> Result<Vec<KeystrokeEvent>, AnalysisError> {
    let mut events = Vec::new();
    for (line_num, line) in ndjson.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let event = serde_json::from_str::<KeystrokeEvent>(trimmed).map_err(|e| {
            AnalysisError::ParseError(format!("Failed to parse line {}: {}", line_num + 1, e))
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Parse a payload in the given format.
pub fn parse_events(input: &str, format: InputFormat) -> Result<Vec<KeystrokeEvent>, AnalysisError> {
    match format {
        InputFormat::Json => parse_array(input),
        InputFormat::Ndjson => parse_ndjson(input),
    }
}

/// Every invariant violation in `events`, with the index of the offending event.
pub fn find_violations(events: &[KeystrokeEvent]) -> Vec<(usize, EventValidationError)> {
    let mut violations = Vec::new();
    let mut previous: Option<f64> = None;

    for (index, event) in events.iter().enumerate() {
        if let Err(e) = event.validate() {
            violations.push((index, e));
        }
        if let Some(prev) = previous {
            if event.timestamp < prev {
                violations.push((
                    index,
                    EventValidationError::OutOfOrder {
                        previous: prev,
                        current: event.timestamp,
                    },
                ));
            }
        }
        previous = Some(event.timestamp);
    }

    violations
}

/// Fail on the first invariant violation.
pub fn validate_events(events: &[KeystrokeEvent]) -> Result<(), AnalysisError> {
    match find_violations(events).into_iter().next() {
        Some((index, source)) => Err(AnalysisError::InvalidEvent { index, source }),
        None => Ok(()),
    }
}

/// One invariant violation, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventIssue {
    pub index: usize,
    pub message: String,
}

/// Summary of a payload's validity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub schema_version: String,
    pub valid: bool,
    pub event_count: usize,
    pub issues: Vec<EventIssue>,
}

impl ValidationReport {
    pub fn for_events(events: &[KeystrokeEvent]) -> Self {
        let issues: Vec<EventIssue> = find_violations(events)
            .into_iter()
            .map(|(index, e)| EventIssue {
                index,
                message: e.to_string(),
            })
            .collect();
        Self {
            schema_version: super::SCHEMA_VERSION.to_string(),
            valid: issues.is_empty(),
            event_count: events.len(),
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT_A: &str = r#"{"timestamp": 10.0, "key_code": 0, "key_char": "a", "key_name": "a", "dwell_time": 0.08, "time_since_last": 0.2, "app_name": "Editor", "pause_before": 0.2, "finger_assignment": "left_pinky"}"#;
    const EVENT_BS: &str = r#"{"timestamp": 10.3, "key_code": 51, "key_char": "", "key_name": "backspace", "is_correction": true, "correction_type": "single_correction"}"#;

    #[test]
    fn test_parse_array() {
        let json = format!("[{EVENT_A}, {EVENT_BS}]");
        let events = parse_array(&json).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].app_name, "Editor");
        assert!(events[1].is_correction);
        assert!(validate_events(&events).is_ok());
    }

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let ndjson = format!("{EVENT_A}\n\n{EVENT_BS}\n");
        let events = parse_events(&ndjson, InputFormat::Ndjson).unwrap();
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_parse_ndjson_reports_line() {
        let ndjson = format!("{EVENT_A}\nnot json\n");
        let err = parse_ndjson(&ndjson).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_out_of_order_detected() {
        let json = format!("[{EVENT_BS}, {EVENT_A}]");
        let events = parse_array(&json).unwrap();

        match validate_events(&events) {
            Err(AnalysisError::InvalidEvent { index, source }) => {
                assert_eq!(index, 1);
                assert!(matches!(source, EventValidationError::OutOfOrder { .. }));
            }
            other => panic!("expected out-of-order error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_report_lists_every_issue() {
        let mut events = parse_array(&format!("[{EVENT_A}, {EVENT_BS}]")).unwrap();
        events[0].dwell_time = -1.0;
        events[1].key_name = "a".to_string();

        let report = ValidationReport::for_events(&events);
        assert!(!report.valid);
        assert_eq!(report.event_count, 2);
        assert_eq!(report.issues.len(), 2);
        assert_eq!(report.issues[1].index, 1);
    }
}
