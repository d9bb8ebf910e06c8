//! Event builders shared by the unit tests.

use crate::config::AnalysisSettings;
use crate::types::{KeystrokeEvent, RawKeypress};

pub const TEST_APP: &str = "Editor";

fn build(key_char: &str, key_name: &str, timestamp: f64, time_since_last: f64) -> KeystrokeEvent {
    KeystrokeEvent::from_keypress(
        RawKeypress {
            timestamp,
            key_code: key_char.chars().next().map_or(51, |c| c as i64),
            key_char: key_char.to_string(),
            key_name: key_name.to_string(),
            dwell_time: 0.08,
            time_since_last,
            app_name: TEST_APP.to_string(),
            window_title: "main.rs".to_string(),
            session_id: "test".to_string(),
            cognitive_load_indicator: None,
        },
        &AnalysisSettings::default(),
    )
}

/// Printable keystroke at `timestamp`, 0.2s after the previous one.
pub fn key(ch: &str, timestamp: f64) -> KeystrokeEvent {
    let name = if ch == " " { "space" } else { ch };
    build(ch, name, timestamp, 0.2)
}

/// Backspace at `timestamp`, 0.2s after the previous one.
pub fn correction(timestamp: f64) -> KeystrokeEvent {
    build("", "backspace", timestamp, 0.2)
}

/// Type `text` one character every `interval` seconds; `\u{8}` is a backspace.
pub fn typed(text: &str, start: f64, interval: f64) -> Vec<KeystrokeEvent> {
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            let t = start + i as f64 * interval;
            let mut event = if c == '\u{8}' {
                correction(t)
            } else {
                key(&c.to_string(), t)
            };
            if i > 0 {
                event = retime(event, interval);
            }
            event
        })
        .collect()
}

fn retime(event: KeystrokeEvent, time_since_last: f64) -> KeystrokeEvent {
    build(&event.key_char, &event.key_name, event.timestamp, time_since_last)
}
