//! Property-based tests over generated keystroke streams.

use keystroke_flux::config::AnalysisSettings;
use keystroke_flux::flow::FlowDetector;
use keystroke_flux::heuristics::WordList;
use keystroke_flux::opportunities::{Priority, MAX_OPPORTUNITIES};
use keystroke_flux::session::SessionSegmenter;
use keystroke_flux::words::WordReconstructor;
use keystroke_flux::{analyze, AnalysisConfig, KeystrokeEvent, RawKeypress};
use proptest::prelude::*;

const LONG_PAUSE: f64 = 1800.0;

/// (key_char, key_name) pairs the generator draws from.
const KEYS: &[(&str, &str)] = &[
    ("a", "a"),
    ("e", "e"),
    ("t", "t"),
    ("h", "h"),
    ("j", "j"),
    ("k", "k"),
    ("d", "d"),
    ("3", "3"),
    (" ", "space"),
    ("\t", "tab"),
    ("\n", "return"),
    (".", "period"),
    (",", "comma"),
    ("!", "exclam"),
    ("é", "e_acute"),
    ("日", "kanji"),
    ("", "backspace"),
    ("", "enter"),
    ("", "shift"),
];

fn gap() -> impl Strategy<Value = f64> {
    prop_oneof![
        6 => 0.01f64..0.5,
        2 => 0.5f64..100.0,
        1 => 1800.5f64..5000.0,
    ]
}

fn stream() -> impl Strategy<Value = Vec<KeystrokeEvent>> {
    prop::collection::vec((0..KEYS.len(), gap()), 1..300).prop_map(|draws| {
        let settings = AnalysisSettings::default();
        let mut timestamp = 1_700_000_000.0;
        draws
            .into_iter()
            .enumerate()
            .map(|(i, (key, gap))| {
                let time_since_last = if i == 0 { 0.0 } else { gap };
                timestamp += time_since_last;
                let (key_char, key_name) = KEYS[key];
                KeystrokeEvent::from_keypress(
                    RawKeypress {
                        timestamp,
                        key_code: key as i64,
                        key_char: key_char.to_string(),
                        key_name: key_name.to_string(),
                        dwell_time: 0.08,
                        time_since_last,
                        app_name: if i % 7 == 0 { "Terminal" } else { "Editor" }.to_string(),
                        window_title: "notes.md".to_string(),
                        session_id: "capture".to_string(),
                        cognitive_load_indicator: None,
                    },
                    &settings,
                )
            })
            .collect()
    })
}

/// Maximal runs with no gap above the long-pause threshold, as index ranges.
fn long_gap_runs(events: &[KeystrokeEvent]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..events.len() {
        if events[i].timestamp - events[i - 1].timestamp > LONG_PAUSE {
            runs.push((start, i));
            start = i;
        }
    }
    runs.push((start, events.len()));
    runs
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn sessions_are_the_long_gap_runs_in_order(events in stream()) {
        let sessions = SessionSegmenter::default().segment(&events);
        let runs = long_gap_runs(&events);

        let expected: Vec<(usize, usize)> =
            runs.iter().copied().filter(|(s, e)| e - s >= 2).collect();
        let actual: Vec<(usize, usize)> =
            sessions.iter().map(|s| (s.start_index, s.end_index)).collect();
        prop_assert_eq!(&actual, &expected);

        // Sessions plus omitted single-event runs rebuild the input exactly
        let mut covered: Vec<usize> = Vec::new();
        for (start, end) in runs {
            covered.extend(start..end);
        }
        prop_assert_eq!(covered, (0..events.len()).collect::<Vec<_>>());
    }

    #[test]
    fn sessions_do_not_overlap(events in stream()) {
        let sessions = SessionSegmenter::default().segment(&events);
        for pair in sessions.windows(2) {
            prop_assert!(pair[0].end_timestamp <= pair[1].start_timestamp);
            prop_assert!(pair[0].end_index <= pair[1].start_index);
        }
    }

    #[test]
    fn active_duration_never_exceeds_raw(events in stream()) {
        for session in SessionSegmenter::default().segment(&events) {
            prop_assert!(session.active_duration_seconds >= 0.0);
            prop_assert!(
                session.active_duration_seconds <= session.duration_seconds,
                "active {} > raw {}",
                session.active_duration_seconds,
                session.duration_seconds
            );
        }
    }

    #[test]
    fn flow_periods_meet_minimum_length(events in stream(), min in 1usize..80) {
        for period in FlowDetector::new(min).detect(&events) {
            prop_assert!(period.keystroke_count >= min);
            prop_assert!(period.start_time <= period.end_time);
            for event in &events[period.start_index..period.start_index + period.keystroke_count] {
                prop_assert!(FlowDetector::is_flowing(event));
            }
        }
    }

    #[test]
    fn reconstructed_words_pass_validity_filter(events in stream()) {
        let vocabulary = WordList::default();
        for word in WordReconstructor::new(&vocabulary).segments(&events) {
            prop_assert!(word.chars().count() > 1, "word {:?}", word);
            prop_assert!(word.chars().any(char::is_alphanumeric), "word {:?}", word);
            prop_assert_eq!(word.to_lowercase(), word.clone());
        }
    }

    #[test]
    fn opportunities_are_bounded(events in stream()) {
        let report = analyze(&events, &AnalysisConfig::default())
            .into_report()
            .expect("generated streams are never empty");
        let ranked = &report.optimization_opportunities;

        prop_assert!(ranked.opportunities.len() <= MAX_OPPORTUNITIES);
        prop_assert!(ranked.total_opportunities >= ranked.opportunities.len());
        prop_assert_eq!(ranked.high_priority + ranked.medium_priority, ranked.total_opportunities);
        prop_assert!(ranked
            .opportunities
            .windows(2)
            .all(|pair| pair[0].priority <= pair[1].priority));
        prop_assert!(ranked
            .opportunities
            .iter()
            .all(|o| matches!(o.priority, Priority::High | Priority::Medium)));
    }
}
