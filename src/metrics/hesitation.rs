//! Pause and hesitation statistics

use crate::stats::{mean, median, percentile, sample_std_dev};
use crate::types::KeystrokeEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys need more pauses than this for per-key statistics.
pub const MIN_KEY_SAMPLES: usize = 5;

/// Apps and app/window contexts need more pauses than this.
pub const MIN_CONTEXT_SAMPLES: usize = 10;

/// Pauses above this many seconds count as long pauses.
pub const LONG_PAUSE_SEC: f64 = 2.0;

const TOP_HESITANT_KEYS: usize = 20;

/// Pause statistics for one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyHesitation {
    pub key: String,
    pub mean_pause: f64,
    pub median_pause: f64,
    pub max_pause: f64,
    /// Fraction of this key's pauses above the hesitation threshold
    pub hesitation_rate: f64,
    pub sample_size: usize,
}

/// Distribution of all non-zero pauses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PauseDistribution {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub p25: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

/// Hesitation section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HesitationPatterns {
    /// Keys with enough samples, ordered by key
    pub key_hesitation_stats: Vec<KeyHesitation>,
    /// Highest mean pause first
    pub hesitant_keys: Vec<KeyHesitation>,
    pub pause_distribution: PauseDistribution,
    /// Mean pause by application
    pub app_pause_patterns: BTreeMap<String, f64>,
    /// Mean pause by `app:window` context
    pub context_pause_patterns: BTreeMap<String, f64>,
    pub total_pauses: usize,
    pub long_pauses: usize,
}

pub struct HesitationAnalyzer;

impl HesitationAnalyzer {
    /// Group pauses (`pause_before > 0`) by key, app and window context.
    pub fn analyze(events: &[KeystrokeEvent], hesitation_threshold: f64) -> HesitationPatterns {
        let mut by_key: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        let mut by_app: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        let mut by_context: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut pauses = Vec::new();

        for event in events.iter().filter(|e| e.pause_before > 0.0) {
            let pause = event.pause_before;
            by_key.entry(event.key_label()).or_default().push(pause);
            by_app.entry(event.app_name.as_str()).or_default().push(pause);
            by_context
                .entry(format!("{}:{}", event.app_name, event.window_title))
                .or_default()
                .push(pause);
            pauses.push(pause);
        }

        let key_hesitation_stats: Vec<KeyHesitation> = by_key
            .into_iter()
            .filter(|(_, samples)| samples.len() > MIN_KEY_SAMPLES)
            .map(|(key, samples)| key_stats(key, &samples, hesitation_threshold))
            .collect();

        let mut hesitant_keys = key_hesitation_stats.clone();
        hesitant_keys.sort_by(|a, b| b.mean_pause.total_cmp(&a.mean_pause));
        hesitant_keys.truncate(TOP_HESITANT_KEYS);

        HesitationPatterns {
            key_hesitation_stats,
            hesitant_keys,
            pause_distribution: compute_distribution(&pauses),
            app_pause_patterns: group_means(by_app),
            context_pause_patterns: group_means(by_context),
            total_pauses: pauses.len(),
            long_pauses: pauses.iter().filter(|p| **p > LONG_PAUSE_SEC).count(),
        }
    }
}

fn key_stats(key: &str, samples: &[f64], threshold: f64) -> KeyHesitation {
    let hesitant = samples.iter().filter(|p| **p > threshold).count();
    KeyHesitation {
        key: key.to_string(),
        mean_pause: mean(samples),
        median_pause: median(samples),
        max_pause: samples.iter().copied().fold(0.0, f64::max),
        hesitation_rate: hesitant as f64 / samples.len() as f64,
        sample_size: samples.len(),
    }
}

fn compute_distribution(pauses: &[f64]) -> PauseDistribution {
    PauseDistribution {
        mean: mean(pauses),
        median: median(pauses),
        std_dev: sample_std_dev(pauses),
        p25: percentile(pauses, 25.0),
        p75: percentile(pauses, 75.0),
        p90: percentile(pauses, 90.0),
        p95: percentile(pauses, 95.0),
    }
}

fn group_means<K: ToString>(groups: BTreeMap<K, Vec<f64>>) -> BTreeMap<String, f64> {
    groups
        .into_iter()
        .filter(|(_, samples)| samples.len() > MIN_CONTEXT_SAMPLES)
        .map(|(key, samples)| (key.to_string(), mean(&samples)))
        .collect()
}
