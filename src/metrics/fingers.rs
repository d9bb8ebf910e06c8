//! Finger and hand load

use crate::stats::{pct, Counted, Tally};
use crate::types::{Hand, KeystrokeEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const TOP_SAME_FINGER_BIGRAMS: usize = 20;

/// Label used for events without a finger assignment.
pub const UNKNOWN_FINGER: &str = "unknown";

/// Keystrokes per hand bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandBalance {
    pub left: usize,
    pub right: usize,
    pub thumbs: usize,
}

impl HandBalance {
    pub fn total(&self) -> usize {
        self.left + self.right + self.thumbs
    }

    /// Left and right shares of all bucketed keystrokes, in percent.
    pub fn percentages(&self) -> (f64, f64) {
        (pct(self.left, self.total()), pct(self.right, self.total()))
    }

    fn record(&mut self, hand: Hand) {
        match hand {
            Hand::Left => self.left += 1,
            Hand::Right => self.right += 1,
            Hand::Thumbs => self.thumbs += 1,
        }
    }
}

/// Finger-usage section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerUsage {
    pub finger_usage_counts: BTreeMap<String, usize>,
    pub finger_usage_percentages: BTreeMap<String, f64>,
    /// Cumulative dwell seconds per finger
    pub finger_dwell_times: BTreeMap<String, f64>,
    pub hand_balance: HandBalance,
    pub most_used_finger: String,
    pub least_used_finger: String,
    /// Adjacent keystrokes typed with the same finger
    pub same_finger_bigrams: Vec<Counted<String>>,
    /// Left count over right count (right floored at 1)
    pub hand_balance_ratio: f64,
}

pub struct FingerAnalyzer;

impl FingerAnalyzer {
    pub fn analyze(events: &[KeystrokeEvent]) -> FingerUsage {
        let total = events.len();
        let mut counts: Tally<&'static str> = Tally::new();
        let mut dwell: BTreeMap<String, f64> = BTreeMap::new();
        let mut hand_balance = HandBalance::default();

        for event in events {
            let label = event.finger_assignment.map_or(UNKNOWN_FINGER, |f| f.label());
            counts.add(label);
            *dwell.entry(label.to_string()).or_default() += event.dwell_time;
            if let Some(hand) = event.finger_assignment.and_then(|f| f.hand()) {
                hand_balance.record(hand);
            }
        }

        let mut same_finger: Tally<String> = Tally::new();
        for pair in events.windows(2) {
            if let (Some(a), Some(b)) = (pair[0].known_finger(), pair[1].known_finger()) {
                if a == b {
                    same_finger.add(format!("{}{}", pair[0].key_label(), pair[1].key_label()));
                }
            }
        }

        FingerUsage {
            finger_usage_counts: counts.iter().map(|(k, c)| (k.to_string(), c)).collect(),
            finger_usage_percentages: counts
                .iter()
                .map(|(k, c)| (k.to_string(), pct(c, total)))
                .collect(),
            finger_dwell_times: dwell,
            most_used_finger: counts.max_key().copied().unwrap_or(UNKNOWN_FINGER).to_string(),
            least_used_finger: counts.min_key().copied().unwrap_or(UNKNOWN_FINGER).to_string(),
            same_finger_bigrams: same_finger.most_common(TOP_SAME_FINGER_BIGRAMS),
            hand_balance_ratio: hand_balance.left as f64 / hand_balance.right.max(1) as f64,
            hand_balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::typed;

    #[test]
    fn test_counts_and_hand_balance() {
        // a, s: left hand; j: right; space: thumbs
        let usage = FingerAnalyzer::analyze(&typed("asj ", 0.0, 0.2));

        assert_eq!(usage.finger_usage_counts["left_pinky"], 1);
        assert_eq!(usage.finger_usage_counts["thumbs"], 1);
        assert_eq!(
            usage.hand_balance,
            HandBalance {
                left: 2,
                right: 1,
                thumbs: 1
            }
        );
        assert!((usage.hand_balance_ratio - 2.0).abs() < 1e-9);
        assert!((usage.finger_dwell_times["right_index"] - 0.08).abs() < 1e-9);
    }

    #[test]
    fn test_same_finger_bigrams() {
        // "de" and "ed" are both left middle
        let usage = FingerAnalyzer::analyze(&typed("deded", 0.0, 0.2));
        assert_eq!(usage.same_finger_bigrams[0].key, "de");
        assert_eq!(usage.same_finger_bigrams[0].count, 2);
        assert_eq!(usage.same_finger_bigrams[1].key, "ed");
        assert_eq!(usage.most_used_finger, "left_middle");
    }

    #[test]
    fn test_unknown_fingers_excluded_from_bigrams() {
        let mut events = typed("zz", 0.0, 0.2);
        for event in &mut events {
            event.finger_assignment = None;
        }
        let usage = FingerAnalyzer::analyze(&events);
        assert!(usage.same_finger_bigrams.is_empty());
        assert_eq!(usage.finger_usage_counts[UNKNOWN_FINGER], 2);
        assert_eq!(usage.hand_balance.total(), 0);
        assert_eq!(usage.hand_balance_ratio, 0.0);
    }

    #[test]
    fn test_percentages() {
        let balance = HandBalance {
            left: 3,
            right: 1,
            thumbs: 0,
        };
        assert_eq!(balance.percentages(), (75.0, 25.0));
    }
}
