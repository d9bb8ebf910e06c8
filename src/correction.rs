//! Correction reconstruction
//!
//! Replays deletions against a rolling buffer of recently typed characters to
//! classify correction runs and flag likely typos.
//!
//! One deletion is assumed to remove exactly one character. OS-level
//! "delete word" and multi-character undo are indistinguishable from a
//! single backspace in the event stream, so they are under-counted.

use crate::heuristics::TypoMatcher;
use crate::stats::{mean, pct, Counted, Tally};
use crate::types::{hour_of_day, CorrectionType, KeystrokeEvent};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Characters kept in the rolling context.
pub const CONTEXT_CAPACITY: usize = 10;

/// Trailing characters tested against the typo table.
pub const TYPO_WINDOW: usize = 6;

/// Minimum keystrokes for an application to get an error rate.
pub const MIN_APP_KEYSTROKES: usize = 20;

/// Minimum keystrokes for an hour of day to get an error rate.
pub const MIN_HOUR_KEYSTROKES: usize = 10;

const TOP_TYPO_PATTERNS: usize = 10;
const TOP_ERROR_PRONE_CHARS: usize = 10;

/// Fixed-capacity ring buffer; pushing onto a full buffer evicts the oldest item.
#[derive(Debug, Clone)]
pub struct RingBuffer<T: Copy, const N: usize> {
    slots: [Option<T>; N],
    /// Slot of the oldest item
    head: usize,
    len: usize,
}

impl<T: Copy, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self {
            slots: [None; N],
            head: 0,
            len: 0,
        }
    }
}

impl<T: Copy, const N: usize> RingBuffer<T, N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append `item`, returning the evicted oldest item when full.
    pub fn push(&mut self, item: T) -> Option<T> {
        if N == 0 {
            return Some(item);
        }
        let tail = (self.head + self.len) % N;
        let evicted = self.slots[tail].replace(item);
        if self.len == N {
            self.head = (self.head + 1) % N;
            evicted
        } else {
            self.len += 1;
            None
        }
    }

    /// Remove and return the newest item.
    pub fn pop_newest(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let newest = (self.head + self.len - 1) % N;
        self.len -= 1;
        self.slots[newest].take()
    }

    /// Items from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len).filter_map(move |i| self.slots[(self.head + i) % N])
    }

    /// The newest `n` items, oldest first.
    pub fn newest(&self, n: usize) -> impl Iterator<Item = T> + '_ {
        self.iter().skip(self.len.saturating_sub(n))
    }
}

/// Per-event correction annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrectionAnnotation {
    pub correction_type: CorrectionType,
    /// Character presumed removed, empty when the context was empty
    pub corrected_text: Option<String>,
    pub likely_typo: bool,
    pub typo_pattern: Option<String>,
}

/// A maximal run of consecutive correction events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionSequence {
    pub start_index: usize,
    pub length: usize,
    /// Timestamp of the first correction in the run
    pub timestamp: f64,
    /// Characters presumed removed, in the order they were typed
    pub corrected_text: String,
    pub app_name: String,
}

/// Correction counts by type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionTypeCounts {
    pub single_correction: usize,
    pub multi_correction: usize,
}

/// Error-pattern section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPatterns {
    pub total_corrections: usize,
    /// Corrections as a percentage of all keystrokes
    pub overall_error_rate: f64,
    /// Corrections per 100 keystrokes
    pub error_frequency: f64,
    pub correction_sequences: Vec<CorrectionSequence>,
    pub sequence_count: usize,
    pub avg_correction_length: f64,
    pub max_correction_length: usize,
    pub correction_types: CorrectionTypeCounts,
    pub typo_patterns: Vec<Counted<String>>,
    pub likely_typos_detected: usize,
    /// Characters typed immediately before a correction
    pub error_prone_chars: Vec<Counted<String>>,
    /// Error rate by application name
    pub app_error_rates: BTreeMap<String, f64>,
    /// Error rate by local hour of day (0-23)
    pub hourly_error_rates: BTreeMap<u32, f64>,
    /// Mean of `1 / length` over correction sequences
    pub correction_efficiency: f64,
}

/// Replays corrections against the rolling context.
pub struct CorrectionReconstructor<'a> {
    typos: &'a dyn TypoMatcher,
}

impl<'a> CorrectionReconstructor<'a> {
    pub fn new(typos: &'a dyn TypoMatcher) -> Self {
        Self { typos }
    }

    /// Recompute the correction annotation of every event.
    ///
    /// Annotations already present on the events are ignored.
    pub fn annotate(&self, events: &[KeystrokeEvent]) -> Vec<CorrectionAnnotation> {
        let mut context: RingBuffer<char, CONTEXT_CAPACITY> = RingBuffer::new();
        let mut previous_was_correction = false;
        let mut annotations = Vec::with_capacity(events.len());

        for event in events {
            let mut annotation = CorrectionAnnotation::default();

            if event.is_correction {
                annotation.correction_type = if previous_was_correction {
                    CorrectionType::MultiCorrection
                } else {
                    CorrectionType::SingleCorrection
                };
                annotation.corrected_text = Some(
                    context
                        .pop_newest()
                        .map(String::from)
                        .unwrap_or_default(),
                );
            } else if let Some(c) = event.printable_char() {
                context.push(c);
                if context.len() >= 2 {
                    let recent: String = context
                        .newest(TYPO_WINDOW)
                        .collect::<String>()
                        .to_lowercase();
                    if let Some(hit) = self.typos.find_typo(&recent) {
                        annotation.likely_typo = true;
                        annotation.typo_pattern = Some(hit.pattern());
                    }
                }
            }

            previous_was_correction = event.is_correction;
            annotations.push(annotation);
        }

        annotations
    }

    /// Build the error-pattern section, bucketing hours in `tz`.
    pub fn analyze(&self, events: &[KeystrokeEvent], tz: Tz) -> ErrorPatterns {
        let annotations = self.annotate(events);
        let total = events.len();
        let total_corrections = events.iter().filter(|e| e.is_correction).count();

        let sequences = collect_sequences(events, &annotations);
        let lengths: Vec<f64> = sequences.iter().map(|s| s.length as f64).collect();
        let efficiencies: Vec<f64> = sequences.iter().map(|s| 1.0 / s.length as f64).collect();

        let mut correction_types = CorrectionTypeCounts::default();
        let mut typo_patterns: Tally<String> = Tally::new();
        let mut likely_typos_detected = 0;
        for annotation in &annotations {
            match annotation.correction_type {
                CorrectionType::SingleCorrection => correction_types.single_correction += 1,
                CorrectionType::MultiCorrection => correction_types.multi_correction += 1,
                CorrectionType::None => {}
            }
            if let (true, Some(pattern)) = (annotation.likely_typo, &annotation.typo_pattern) {
                typo_patterns.add(pattern.clone());
                likely_typos_detected += 1;
            }
        }

        let mut error_prone: Tally<String> = Tally::new();
        for pair in events.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            if current.is_correction && !previous.is_correction && !previous.key_char.is_empty() {
                error_prone.add(previous.key_char.clone());
            }
        }

        let sequence_count = sequences.len();
        debug!(
            corrections = total_corrections,
            sequences = sequence_count,
            likely_typos = likely_typos_detected,
            "reconstructed corrections"
        );

        ErrorPatterns {
            total_corrections,
            overall_error_rate: pct(total_corrections, total),
            error_frequency: pct(total_corrections, total),
            sequence_count,
            avg_correction_length: mean(&lengths),
            max_correction_length: sequences.iter().map(|s| s.length).max().unwrap_or(0),
            correction_sequences: sequences,
            correction_types,
            typo_patterns: typo_patterns.most_common(TOP_TYPO_PATTERNS),
            likely_typos_detected,
            error_prone_chars: error_prone.most_common(TOP_ERROR_PRONE_CHARS),
            app_error_rates: app_error_rates(events),
            hourly_error_rates: hourly_error_rates(events, tz),
            correction_efficiency: mean(&efficiencies),
        }
    }
}

fn collect_sequences(
    events: &[KeystrokeEvent],
    annotations: &[CorrectionAnnotation],
) -> Vec<CorrectionSequence> {
    let mut sequences = Vec::new();
    let mut start: Option<usize> = None;

    for i in 0..=events.len() {
        let in_run = events.get(i).is_some_and(|e| e.is_correction);
        match (in_run, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                sequences.push(build_sequence(&events[s..i], &annotations[s..i], s));
                start = None;
            }
            _ => {}
        }
    }

    sequences
}

fn build_sequence(
    run: &[KeystrokeEvent],
    annotations: &[CorrectionAnnotation],
    start_index: usize,
) -> CorrectionSequence {
    // Deletions remove the newest character first
    let corrected_text: String = annotations
        .iter()
        .rev()
        .filter_map(|a| a.corrected_text.as_deref())
        .collect();

    let mut apps = Tally::new();
    for event in run {
        apps.add(event.app_name.as_str());
    }

    CorrectionSequence {
        start_index,
        length: run.len(),
        timestamp: run[0].timestamp,
        corrected_text,
        app_name: apps.max_key().map(|a| a.to_string()).unwrap_or_default(),
    }
}

fn app_error_rates(events: &[KeystrokeEvent]) -> BTreeMap<String, f64> {
    let mut totals: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for event in events {
        let entry = totals.entry(event.app_name.as_str()).or_default();
        entry.0 += usize::from(event.is_correction);
        entry.1 += 1;
    }
    totals
        .into_iter()
        .filter(|(_, (_, total))| *total >= MIN_APP_KEYSTROKES)
        .map(|(app, (corrections, total))| (app.to_string(), pct(corrections, total)))
        .collect()
}

fn hourly_error_rates(events: &[KeystrokeEvent], tz: Tz) -> BTreeMap<u32, f64> {
    let mut totals: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
    for event in events {
        if let Some(hour) = hour_of_day(event.timestamp, tz) {
            let entry = totals.entry(hour).or_default();
            entry.0 += usize::from(event.is_correction);
            entry.1 += 1;
        }
    }
    totals
        .into_iter()
        .filter(|(_, (_, total))| *total >= MIN_HOUR_KEYSTROKES)
        .map(|(hour, (corrections, total))| (hour, pct(corrections, total)))
        .collect()
}
