//! Key and character frequencies

use crate::stats::{pct, Counted, Tally};
use crate::types::KeystrokeEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TOP_CHARS: usize = 10;

/// Frequency of a key or character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyShare {
    pub key: String,
    pub count: usize,
    /// Percent of all keystrokes
    pub percentage: f64,
}

/// Key-usage section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyUsage {
    /// Printed characters, most frequent first
    pub character_frequencies: Vec<KeyShare>,
    /// Key names, most frequent first
    pub key_frequencies: Vec<KeyShare>,
    pub most_frequent_chars: Vec<Counted<String>>,
    pub least_frequent_chars: Vec<Counted<String>>,
    /// Corrections by deletion key name
    pub correction_counts: BTreeMap<String, usize>,
    /// Corrections as a percentage of each deletion key's uses
    pub error_rates: BTreeMap<String, f64>,
    pub total_keystrokes: usize,
    pub total_corrections: usize,
}

pub struct KeyUsageAnalyzer;

impl KeyUsageAnalyzer {
    pub fn analyze(events: &[KeystrokeEvent]) -> KeyUsage {
        let total = events.len();
        let mut chars: Tally<String> = Tally::new();
        let mut keys: Tally<String> = Tally::new();
        let mut corrections: BTreeMap<String, usize> = BTreeMap::new();

        for event in events {
            if !event.key_char.is_empty() {
                chars.add(event.key_char.clone());
            }
            keys.add(event.key_name.clone());
            if event.is_correction {
                *corrections.entry(event.key_name.clone()).or_default() += 1;
            }
        }

        let error_rates = corrections
            .iter()
            .map(|(key, count)| (key.clone(), pct(*count, keys.get(key))))
            .collect();

        let ranked_chars = chars.ranked();
        let least_start = ranked_chars.len().saturating_sub(TOP_CHARS);

        KeyUsage {
            character_frequencies: shares(&chars, total),
            key_frequencies: shares(&keys, total),
            most_frequent_chars: chars.most_common(TOP_CHARS),
            least_frequent_chars: ranked_chars[least_start..].to_vec(),
            total_corrections: corrections.values().sum(),
            correction_counts: corrections,
            error_rates,
            total_keystrokes: total,
        }
    }
}

fn shares(tally: &Tally<String>, total: usize) -> Vec<KeyShare> {
    tally
        .ranked()
        .into_iter()
        .map(|entry| KeyShare {
            percentage: pct(entry.count, total),
            key: entry.key,
            count: entry.count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::typed;

    #[test]
    fn test_frequencies() {
        let events = typed("aab\u{8}", 0.0, 0.2);
        let usage = KeyUsageAnalyzer::analyze(&events);

        assert_eq!(usage.total_keystrokes, 4);
        assert_eq!(usage.total_corrections, 1);
        assert_eq!(usage.character_frequencies[0].key, "a");
        assert!((usage.character_frequencies[0].percentage - 50.0).abs() < 1e-9);
        assert_eq!(usage.key_frequencies.len(), 3);
        assert_eq!(usage.correction_counts["backspace"], 1);
        assert!((usage.error_rates["backspace"] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_least_frequent_chars_are_ranking_tail() {
        let text: String = ('a'..='l').collect::<String>() + "aaa";
        let usage = KeyUsageAnalyzer::analyze(&typed(&text, 0.0, 0.2));

        assert_eq!(usage.most_frequent_chars[0].key, "a");
        assert_eq!(usage.least_frequent_chars.len(), 10);
        assert_eq!(usage.least_frequent_chars.last().unwrap().key, "l");
        assert!(usage.least_frequent_chars.iter().all(|c| c.key != "a"));
    }
}
