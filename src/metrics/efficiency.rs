//! Typing speed and efficiency

use crate::flow::FlowPeriod;
use crate::stats::{mean, pct, sample_std_dev};
use crate::types::{words_per_minute, wpm_from_chars, KeystrokeEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Apps need more events than this for a per-app WPM.
pub const MIN_APP_WPM_EVENTS: usize = 50;

/// Apps need to span more seconds than this for a per-app WPM.
pub const MIN_APP_WPM_SPAN_SEC: f64 = 30.0;

/// Efficiency section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyMetrics {
    /// WPM over the raw span of the whole stream
    pub overall_wpm: f64,
    pub session_duration_minutes: f64,
    pub app_specific_wpm: BTreeMap<String, f64>,
    pub burst_typing_percentage: f64,
    pub flow_state_periods: Vec<FlowPeriod>,
    /// Non-correction keystrokes as a percentage of all keystrokes
    pub efficiency_ratio: f64,
    /// Coefficient of variation of inter-key intervals (lower is steadier)
    pub consistency_score: f64,
    pub correction_percentage: f64,
    pub peak_wpm: f64,
}

pub struct EfficiencyAnalyzer;

impl EfficiencyAnalyzer {
    pub fn analyze(events: &[KeystrokeEvent], flow_periods: Vec<FlowPeriod>) -> EfficiencyMetrics {
        let total = events.len();
        let span = match (events.first(), events.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        };
        let overall_wpm = words_per_minute(events, span);
        let app_specific_wpm = compute_app_wpm(events);
        let corrections = events.iter().filter(|e| e.is_correction).count();
        let bursts = events.iter().filter(|e| e.typing_burst).count();

        let peak_wpm = app_specific_wpm
            .values()
            .copied()
            .reduce(f64::max)
            .unwrap_or(overall_wpm);

        EfficiencyMetrics {
            overall_wpm,
            session_duration_minutes: span / 60.0,
            burst_typing_percentage: pct(bursts, total),
            flow_state_periods: flow_periods,
            efficiency_ratio: pct(total - corrections, total),
            consistency_score: compute_interval_variation(events),
            correction_percentage: pct(corrections, total),
            peak_wpm,
            app_specific_wpm,
        }
    }
}

/// WPM per application over the span between its first and last event.
fn compute_app_wpm(events: &[KeystrokeEvent]) -> BTreeMap<String, f64> {
    // (events, alphanumeric chars, first timestamp, last timestamp)
    let mut by_app: BTreeMap<&str, (usize, usize, f64, f64)> = BTreeMap::new();
    for event in events {
        let entry = by_app
            .entry(event.app_name.as_str())
            .or_insert((0, 0, event.timestamp, event.timestamp));
        entry.0 += 1;
        entry.1 += usize::from(event.is_alphanumeric());
        entry.3 = event.timestamp;
    }

    by_app
        .into_iter()
        .filter(|(_, (count, _, first, last))| {
            *count > MIN_APP_WPM_EVENTS && last - first > MIN_APP_WPM_SPAN_SEC
        })
        .map(|(app, (_, chars, first, last))| (app.to_string(), wpm_from_chars(chars, last - first)))
        .collect()
}

/// Coefficient of variation of positive `time_since_last` values.
///
/// Formula: `std_dev / mean`, 0 when the mean is 0
fn compute_interval_variation(events: &[KeystrokeEvent]) -> f64 {
    let intervals: Vec<f64> = events
        .iter()
        .map(|e| e.time_since_last)
        .filter(|t| *t > 0.0)
        .collect();
    let m = mean(&intervals);
    if m > 0.0 {
        sample_std_dev(&intervals) / m
    } else {
        0.0
    }
}
