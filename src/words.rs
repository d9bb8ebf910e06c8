//! Word reconstruction
//!
//! Replays printable characters and deletions into words, then re-splits
//! segments that look like several words merged by a dropped space.

use crate::heuristics::SegmentVocabulary;
use crate::stats::{Counted, Tally};
use crate::types::KeystrokeEvent;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Segments longer than this (in characters) are treated as merged words.
pub const MERGED_SEGMENT_LEN: usize = 20;

/// Minimum length of a leftover lowercase run kept by the repair pass.
pub const MIN_LEFTOVER_RUN: usize = 3;

/// Words longer than this are shortcut candidates.
pub const SHORTCUT_MIN_LEN: usize = 6;

/// Words must occur this often to get an efficiency record.
pub const MIN_EFFICIENCY_FREQUENCY: usize = 3;

const TOP_WORDS: usize = 20;
const TOP_NGRAMS: usize = 10;

const SENTENCE_END: [char; 3] = ['.', '!', '?'];
const TRAILING_PUNCTUATION: [char; 6] = ['.', '!', '?', ',', ':', ';'];
const WHITESPACE_KEY_NAMES: [&str; 4] = ["space", "enter", "return", "tab"];

/// Typing cost of a frequently repeated word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEfficiency {
    pub word: String,
    pub frequency: usize,
    /// Share of all reconstructed words
    pub percentage: f64,
    /// Word length times frequency
    pub total_keystrokes: usize,
    pub shortcut_candidate: bool,
}

/// Word-pattern section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordPatterns {
    pub total_words: usize,
    pub unique_words: usize,
    pub vocabulary_size: usize,
    /// Fraction of distinct words occurring more than once
    pub repetition_rate: f64,
    pub most_frequent_words: Vec<Counted<String>>,
    pub most_frequent_bigrams: Vec<Counted<String>>,
    pub most_frequent_trigrams: Vec<Counted<String>>,
    /// Words typed at least three times, most frequent first
    pub word_efficiency: Vec<WordEfficiency>,
}

/// Rebuilds typed words from the event stream.
pub struct WordReconstructor<'a> {
    vocabulary: &'a dyn SegmentVocabulary,
}

impl<'a> WordReconstructor<'a> {
    pub fn new(vocabulary: &'a dyn SegmentVocabulary) -> Self {
        Self { vocabulary }
    }

    /// Reconstructed words in typing order, merged segments already split.
    pub fn segments(&self, events: &[KeystrokeEvent]) -> Vec<String> {
        let mut raw = Vec::new();
        let mut buffer = String::new();

        for event in events {
            if event.is_correction {
                buffer.pop();
            } else if is_word_break(event) {
                close_word(&mut buffer, &mut raw, false);
            } else if let Some(c) = event.printable_char() {
                buffer.push(c);
                if SENTENCE_END.contains(&c) {
                    close_word(&mut buffer, &mut raw, true);
                }
            }
        }
        close_word(&mut buffer, &mut raw, false);

        let mut words = Vec::with_capacity(raw.len());
        for segment in raw {
            if segment.chars().count() > MERGED_SEGMENT_LEN {
                words.extend(self.split_merged(&segment));
            } else {
                words.push(segment);
            }
        }
        words
    }

    /// Re-split an over-long segment using the vocabulary, then leftover
    /// lowercase runs. Falls back to the segment itself.
    pub fn split_merged(&self, segment: &str) -> Vec<String> {
        let mut remaining = segment.to_string();
        let mut found: Vec<(usize, String)> = Vec::new();

        while let Some((start, end)) = self.vocabulary.longest_match(&remaining) {
            let word = &remaining[start..end];
            if word.trim().is_empty() {
                break;
            }
            found.push((start, word.to_string()));
            // Same byte length keeps later positions stable
            remaining.replace_range(start..end, &" ".repeat(end - start));
        }

        let mut run_start: Option<usize> = None;
        for (i, c) in remaining.char_indices().chain(std::iter::once((remaining.len(), ' '))) {
            match (c.is_ascii_lowercase(), run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(s)) => {
                    if i - s >= MIN_LEFTOVER_RUN {
                        found.push((s, remaining[s..i].to_string()));
                    }
                    run_start = None;
                }
                _ => {}
            }
        }

        if found.is_empty() {
            return vec![segment.to_string()];
        }
        found.sort_by_key(|(position, _)| *position);
        found.into_iter().map(|(_, word)| word).collect()
    }

    pub fn analyze(&self, events: &[KeystrokeEvent]) -> WordPatterns {
        let words = self.segments(events);
        let total_words = words.len();

        let mut counts: Tally<String> = Tally::new();
        for word in &words {
            counts.add(word.clone());
        }
        let mut bigrams: Tally<String> = Tally::new();
        for pair in words.windows(2) {
            bigrams.add(pair.join(" "));
        }
        let mut trigrams: Tally<String> = Tally::new();
        for triple in words.windows(3) {
            trigrams.add(triple.join(" "));
        }

        let repeated = counts.iter().filter(|(_, count)| *count > 1).count();
        let repetition_rate = if counts.is_empty() {
            0.0
        } else {
            repeated as f64 / counts.len() as f64
        };

        let word_efficiency = counts
            .ranked()
            .into_iter()
            .filter(|entry| entry.count >= MIN_EFFICIENCY_FREQUENCY)
            .map(|entry| {
                let length = entry.key.chars().count();
                WordEfficiency {
                    frequency: entry.count,
                    percentage: entry.count as f64 / total_words as f64 * 100.0,
                    total_keystrokes: length * entry.count,
                    shortcut_candidate: length > SHORTCUT_MIN_LEN,
                    word: entry.key,
                }
            })
            .collect();

        debug!(
            words = total_words,
            unique = counts.len(),
            "reconstructed words"
        );

        WordPatterns {
            total_words,
            unique_words: counts.len(),
            vocabulary_size: counts.len(),
            repetition_rate,
            most_frequent_words: counts.most_common(TOP_WORDS),
            most_frequent_bigrams: bigrams.most_common(TOP_NGRAMS),
            most_frequent_trigrams: trigrams.most_common(TOP_NGRAMS),
            word_efficiency,
        }
    }
}

/// Whitespace characters, or whitespace keys reported without a character.
fn is_word_break(event: &KeystrokeEvent) -> bool {
    match event.char() {
        Some(c) => matches!(c, ' ' | '\t' | '\n'),
        None => {
            event.key_char.is_empty()
                && WHITESPACE_KEY_NAMES.contains(&event.key_name.to_lowercase().as_str())
        }
    }
}

fn close_word(buffer: &mut String, words: &mut Vec<String>, strip_punctuation: bool) {
    let mut word = buffer.trim().to_lowercase();
    if strip_punctuation {
        word = word.trim_end_matches(TRAILING_PUNCTUATION).to_string();
    }
    if is_valid_word(&word) {
        words.push(word);
    }
    buffer.clear();
}

fn is_valid_word(word: &str) -> bool {
    word.chars().count() > 1 && word.chars().any(char::is_alphanumeric)
}
