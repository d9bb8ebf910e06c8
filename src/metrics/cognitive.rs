//! Cognitive-load proxy statistics

use crate::stats::{mean, sample_std_dev};
use crate::types::{hour_of_day, KeystrokeEvent};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Indicator values above this count as high load.
pub const HIGH_LOAD_THRESHOLD: f64 = 0.7;

/// Apps need more samples than this for a per-app mean.
pub const MIN_APP_SAMPLES: usize = 10;

/// Cognitive-load section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitiveLoad {
    pub overall_cognitive_load: f64,
    pub cognitive_load_std: f64,
    pub high_load_events: usize,
    pub app_cognitive_load: BTreeMap<String, f64>,
    /// Mean load by local hour of day (0-23)
    pub hourly_cognitive_load: BTreeMap<u32, f64>,
    pub peak_load_hour: Option<u32>,
    pub lowest_load_hour: Option<u32>,
}

pub struct CognitiveLoadAnalyzer;

impl CognitiveLoadAnalyzer {
    /// `None` when no event carries a load indicator.
    pub fn analyze(events: &[KeystrokeEvent], tz: Tz) -> Option<CognitiveLoad> {
        let mut loads = Vec::new();
        let mut by_app: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        let mut by_hour: BTreeMap<u32, Vec<f64>> = BTreeMap::new();

        for event in events {
            let Some(load) = event.cognitive_load_indicator else {
                continue;
            };
            loads.push(load);
            by_app.entry(event.app_name.as_str()).or_default().push(load);
            if let Some(hour) = hour_of_day(event.timestamp, tz) {
                by_hour.entry(hour).or_default().push(load);
            }
        }

        if loads.is_empty() {
            return None;
        }

        let hourly: BTreeMap<u32, f64> = by_hour
            .into_iter()
            .map(|(hour, samples)| (hour, mean(&samples)))
            .collect();

        Some(CognitiveLoad {
            overall_cognitive_load: mean(&loads),
            cognitive_load_std: sample_std_dev(&loads),
            high_load_events: loads.iter().filter(|l| **l > HIGH_LOAD_THRESHOLD).count(),
            app_cognitive_load: by_app
                .into_iter()
                .filter(|(_, samples)| samples.len() > MIN_APP_SAMPLES)
                .map(|(app, samples)| (app.to_string(), mean(&samples)))
                .collect(),
            peak_load_hour: extreme_hour(&hourly, |candidate, best| candidate > best),
            lowest_load_hour: extreme_hour(&hourly, |candidate, best| candidate < best),
            hourly_cognitive_load: hourly,
        })
    }
}

/// First hour (in hour order) whose mean beats every earlier one.
fn extreme_hour(hourly: &BTreeMap<u32, f64>, beats: impl Fn(f64, f64) -> bool) -> Option<u32> {
    let mut best: Option<(u32, f64)> = None;
    for (&hour, &value) in hourly {
        if best.map_or(true, |(_, b)| beats(value, b)) {
            best = Some((hour, value));
        }
    }
    best.map(|(hour, _)| hour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::key;

    fn loaded(timestamp: f64, load: f64) -> KeystrokeEvent {
        let mut event = key("a", timestamp);
        event.cognitive_load_indicator = Some(load);
        event
    }

    #[test]
    fn test_no_indicator_yields_none() {
        assert!(CognitiveLoadAnalyzer::analyze(&[key("a", 0.0)], Tz::UTC).is_none());
    }

    #[test]
    fn test_overall_and_hourly() {
        // Hour 0 and hour 2 UTC
        let events = vec![
            loaded(0.0, 0.2),
            loaded(10.0, 0.4),
            loaded(7200.0, 0.9),
            loaded(7210.0, 0.8),
        ];
        let load = CognitiveLoadAnalyzer::analyze(&events, Tz::UTC).unwrap();

        assert!((load.overall_cognitive_load - 0.575).abs() < 1e-9);
        assert_eq!(load.high_load_events, 2);
        assert!((load.hourly_cognitive_load[&0] - 0.3).abs() < 1e-9);
        assert_eq!(load.peak_load_hour, Some(2));
        assert_eq!(load.lowest_load_hour, Some(0));
        assert!(load.app_cognitive_load.is_empty());
    }

    #[test]
    fn test_app_means_need_eleven_samples() {
        let events: Vec<_> = (0..11).map(|i| loaded(i as f64, 0.5)).collect();
        let load = CognitiveLoadAnalyzer::analyze(&events, Tz::UTC).unwrap();
        assert!((load.app_cognitive_load["Editor"] - 0.5).abs() < 1e-9);
    }
}
