//! Adjacent-key combinations

use crate::stats::{Counted, Tally};
use crate::types::{Finger, Hand, KeystrokeEvent};
use serde::{Deserialize, Serialize};

const TOP_BIGRAMS: usize = 20;
const TOP_SAME_FINGER: usize = 15;

/// Key-combination section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyCombinations {
    /// Adjacent non-correction character pairs
    pub most_common_bigrams: Vec<Counted<String>>,
    /// Character pairs typed with the same finger
    pub same_finger_sequences: Vec<Counted<String>>,
    /// Fraction of finger-assigned adjacent pairs that switch hands
    pub hand_alternation_rate: f64,
    pub total_bigrams: usize,
    pub inefficient_sequences: usize,
    /// `max(0, 100 - same-finger share of bigrams in percent)`
    pub efficiency_score: f64,
}

pub struct CombinationAnalyzer;

impl CombinationAnalyzer {
    pub fn analyze(events: &[KeystrokeEvent]) -> KeyCombinations {
        let mut bigrams: Tally<String> = Tally::new();
        let mut same_finger: Tally<String> = Tally::new();
        let mut switches = 0usize;
        let mut finger_pairs = 0usize;

        for pair in events.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let fingers = (a.known_finger(), b.known_finger());

            if let (Some(fa), Some(fb)) = fingers {
                finger_pairs += 1;
                if alternation_side(fa) != alternation_side(fb) {
                    switches += 1;
                }
            }

            let chars_typed = !a.key_char.is_empty()
                && !b.key_char.is_empty()
                && !a.is_correction
                && !b.is_correction;
            if !chars_typed {
                continue;
            }
            let bigram = format!("{}{}", a.key_char, b.key_char);
            if matches!(fingers, (Some(fa), Some(fb)) if fa == fb) {
                same_finger.add(bigram.clone());
            }
            bigrams.add(bigram);
        }

        let total_bigrams = bigrams.total();
        let inefficient_sequences = same_finger.total();
        let efficiency_score = if total_bigrams == 0 {
            0.0
        } else {
            (100.0 - inefficient_sequences as f64 / total_bigrams as f64 * 100.0).max(0.0)
        };

        KeyCombinations {
            most_common_bigrams: bigrams.most_common(TOP_BIGRAMS),
            same_finger_sequences: same_finger.most_common(TOP_SAME_FINGER),
            hand_alternation_rate: if finger_pairs == 0 {
                0.0
            } else {
                switches as f64 / finger_pairs as f64
            },
            total_bigrams,
            inefficient_sequences,
            efficiency_score,
        }
    }
}

/// Left, right, or everything else (thumbs and generic modifiers).
fn alternation_side(finger: Finger) -> Hand {
    finger.hand().unwrap_or(Hand::Thumbs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::typed;

    #[test]
    fn test_bigrams_skip_corrections() {
        let combos = CombinationAnalyzer::analyze(&typed("ab\u{8}c", 0.0, 0.2));
        assert_eq!(combos.total_bigrams, 1);
        assert_eq!(combos.most_common_bigrams[0].key, "ab");
    }

    #[test]
    fn test_same_finger_and_efficiency() {
        // "de" shares the left middle finger, "ej" does not
        let combos = CombinationAnalyzer::analyze(&typed("dej", 0.0, 0.2));
        assert_eq!(combos.total_bigrams, 2);
        assert_eq!(combos.inefficient_sequences, 1);
        assert_eq!(combos.same_finger_sequences[0].key, "de");
        assert!((combos.efficiency_score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_hand_alternation() {
        // f->j switches, j->k stays, k->d switches
        let combos = CombinationAnalyzer::analyze(&typed("fjkd", 0.0, 0.2));
        assert!((combos.hand_alternation_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_stream_scores_zero() {
        let combos = CombinationAnalyzer::analyze(&[]);
        assert_eq!(combos.efficiency_score, 0.0);
        assert_eq!(combos.hand_alternation_rate, 0.0);
    }
}
