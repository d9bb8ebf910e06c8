//! Keystroke event model
//!
//! This module defines the immutable per-keystroke record handed over by the
//! capture collaborator, plus the small enums attached to it.

use crate::config::AnalysisSettings;
use crate::error::EventValidationError;
use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Gaps at or below this many seconds are treated as timing noise, not pauses.
pub const PAUSE_NOISE_FLOOR_SEC: f64 = 0.1;

/// Key names reported for deletion keys.
pub const DELETION_KEYS: [&str; 2] = ["backspace", "delete"];

/// Physical finger (or hand group) assigned to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Finger {
    LeftPinky,
    LeftRing,
    LeftMiddle,
    LeftIndex,
    RightIndex,
    RightMiddle,
    RightRing,
    RightPinky,
    /// Space bar
    Thumbs,
    /// Modifier keys pressed with a thumb (cmd, alt)
    Thumb,
    /// Modifier keys pressed with either pinky (shift, ctrl)
    Pinky,
    Unknown,
}

/// Hand bucket derived from a finger label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hand {
    Left,
    Right,
    Thumbs,
}

impl Finger {
    /// Snake-case label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            Finger::LeftPinky => "left_pinky",
            Finger::LeftRing => "left_ring",
            Finger::LeftMiddle => "left_middle",
            Finger::LeftIndex => "left_index",
            Finger::RightIndex => "right_index",
            Finger::RightMiddle => "right_middle",
            Finger::RightRing => "right_ring",
            Finger::RightPinky => "right_pinky",
            Finger::Thumbs => "thumbs",
            Finger::Thumb => "thumb",
            Finger::Pinky => "pinky",
            Finger::Unknown => "unknown",
        }
    }

    /// Hand-balance bucket, classified by substring match on the label.
    ///
    /// Generic `pinky` and `unknown` belong to no bucket.
    pub fn hand(&self) -> Option<Hand> {
        let label = self.label();
        if label.contains("left") {
            Some(Hand::Left)
        } else if label.contains("right") {
            Some(Hand::Right)
        } else if label == "thumbs" || label == "thumb" {
            Some(Hand::Thumbs)
        } else {
            None
        }
    }

    /// Whether the finger is an actual assignment rather than a placeholder.
    pub fn is_known(&self) -> bool {
        *self != Finger::Unknown
    }

    /// Standard QWERTY touch-typing assignment for a key char or key name.
    pub fn for_key(key: &str) -> Finger {
        match key.to_lowercase().as_str() {
            "q" | "a" | "z" | "1" | "tab" | "caps" | "caps_lock" => Finger::LeftPinky,
            "w" | "s" | "x" | "2" => Finger::LeftRing,
            "e" | "d" | "c" | "3" => Finger::LeftMiddle,
            "r" | "f" | "v" | "4" | "t" | "g" | "b" | "5" => Finger::LeftIndex,
            "y" | "h" | "n" | "6" | "u" | "j" | "m" | "7" => Finger::RightIndex,
            "i" | "k" | "," | "8" => Finger::RightMiddle,
            "o" | "l" | "." | "9" => Finger::RightRing,
            "p" | ";" | "/" | "0" | "return" | "enter" | "delete" | "backspace" => {
                Finger::RightPinky
            }
            " " | "space" => Finger::Thumbs,
            "cmd" | "alt" => Finger::Thumb,
            "shift" | "ctrl" => Finger::Pinky,
            _ => Finger::Unknown,
        }
    }
}

/// How a deletion keystroke relates to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionType {
    /// Not a correction
    #[default]
    None,
    /// First deletion after a non-deletion keystroke
    SingleCorrection,
    /// Deletion continuing a run of deletions
    MultiCorrection,
}

/// A single keystroke as recorded by the capture layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeystrokeEvent {
    /// Monotonic timestamp in seconds
    pub timestamp: f64,
    /// Integer identity of the physical/logical key
    pub key_code: i64,
    /// Printed character, empty for non-printable and deletion keys
    #[serde(default)]
    pub key_char: String,
    /// Symbolic key name, e.g. "a" or "backspace"
    pub key_name: String,
    /// Seconds the key was held
    #[serde(default)]
    pub dwell_time: f64,
    /// Seconds since the previous event in the stream
    #[serde(default)]
    pub time_since_last: f64,
    /// Foreground application at capture time
    #[serde(default)]
    pub app_name: String,
    /// Focused window title at capture time
    #[serde(default)]
    pub window_title: String,
    /// Capture-time session token, unrelated to derived sessions
    #[serde(default)]
    pub session_id: String,
    /// True iff key_name is a deletion key
    #[serde(default)]
    pub is_correction: bool,
    /// `time_since_last` when above the noise floor, else 0
    #[serde(default)]
    pub pause_before: f64,
    /// True iff `time_since_last` is below the burst threshold
    #[serde(default)]
    pub typing_burst: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finger_assignment: Option<Finger>,
    /// Capture-layer load proxy in [0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognitive_load_indicator: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction_type: Option<CorrectionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likely_typo: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typo_pattern: Option<String>,
}

/// Raw key data before the capture-derived fields are filled in.
#[derive(Debug, Clone, Default)]
pub struct RawKeypress {
    pub timestamp: f64,
    pub key_code: i64,
    pub key_char: String,
    pub key_name: String,
    pub dwell_time: f64,
    pub time_since_last: f64,
    pub app_name: String,
    pub window_title: String,
    pub session_id: String,
    pub cognitive_load_indicator: Option<f64>,
}

impl KeystrokeEvent {
    /// Build an event from raw key data, deriving the capture-layer fields
    /// (`is_correction`, `pause_before`, `typing_burst`, `finger_assignment`).
    pub fn from_keypress(raw: RawKeypress, settings: &AnalysisSettings) -> Self {
        let is_correction = DELETION_KEYS.contains(&raw.key_name.as_str());
        let pause_before = if raw.time_since_last > PAUSE_NOISE_FLOOR_SEC {
            raw.time_since_last
        } else {
            0.0
        };
        let typing_burst = raw.time_since_last < settings.burst_threshold;
        let finger_key = if raw.key_char.is_empty() {
            raw.key_name.as_str()
        } else {
            raw.key_char.as_str()
        };
        let finger_assignment = Some(Finger::for_key(finger_key));

        Self {
            timestamp: raw.timestamp,
            key_code: raw.key_code,
            key_char: raw.key_char,
            key_name: raw.key_name,
            dwell_time: raw.dwell_time,
            time_since_last: raw.time_since_last,
            app_name: raw.app_name,
            window_title: raw.window_title,
            session_id: raw.session_id,
            is_correction,
            pause_before,
            typing_burst,
            finger_assignment,
            cognitive_load_indicator: raw.cognitive_load_indicator,
            correction_type: None,
            corrected_text: None,
            likely_typo: None,
            typo_pattern: None,
        }
    }

    /// The single printed character, if any.
    pub fn char(&self) -> Option<char> {
        let mut chars = self.key_char.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    /// Printable character (not a control character) on a non-deletion key.
    pub fn printable_char(&self) -> Option<char> {
        if self.is_correction {
            return None;
        }
        self.char().filter(|c| !c.is_control())
    }

    /// Whether the event counts toward WPM: a single alphanumeric character.
    pub fn is_alphanumeric(&self) -> bool {
        self.char().is_some_and(char::is_alphanumeric)
    }

    /// `key_char` when present, otherwise `key_name`.
    pub fn key_label(&self) -> &str {
        if self.key_char.is_empty() {
            &self.key_name
        } else {
            &self.key_char
        }
    }

    /// Finger assignment, treating `unknown` as absent.
    pub fn known_finger(&self) -> Option<Finger> {
        self.finger_assignment.filter(Finger::is_known)
    }

    /// Check the per-event invariants.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.dwell_time < 0.0 {
            return Err(EventValidationError::NegativeDwellTime(self.dwell_time));
        }
        if self.pause_before < 0.0 {
            return Err(EventValidationError::NegativePause(self.pause_before));
        }
        if self.key_char.chars().count() > 1 {
            return Err(EventValidationError::MultiCharacterKey(self.key_char.clone()));
        }
        if self.is_correction && !DELETION_KEYS.contains(&self.key_name.as_str()) {
            return Err(EventValidationError::CorrectionOnNonDeletionKey(
                self.key_name.clone(),
            ));
        }
        if let Some(load) = self.cognitive_load_indicator {
            if !(0.0..=1.0).contains(&load) {
                return Err(EventValidationError::CognitiveLoadOutOfRange(load));
            }
        }
        Ok(())
    }
}

/// Alphanumeric single-character keystrokes ÷ 5 ÷ minutes.
pub fn words_per_minute(events: &[KeystrokeEvent], duration_sec: f64) -> f64 {
    let char_count = events.iter().filter(|e| e.is_alphanumeric()).count();
    wpm_from_chars(char_count, duration_sec)
}

/// Standard words (5 characters) per minute, 0 for a non-positive duration.
pub fn wpm_from_chars(char_count: usize, duration_sec: f64) -> f64 {
    if duration_sec <= 0.0 {
        return 0.0;
    }
    let words = char_count as f64 / 5.0;
    words / (duration_sec / 60.0)
}

/// Wall-clock time of an epoch-seconds timestamp in `tz`.
pub fn local_time(timestamp: f64, tz: Tz) -> Option<DateTime<Tz>> {
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9) as u32;
    DateTime::<Utc>::from_timestamp(secs as i64, nanos.min(999_999_999))
        .map(|utc| utc.with_timezone(&tz))
}

/// Hour of day (0-23) of a timestamp in `tz`.
pub fn hour_of_day(timestamp: f64, tz: Tz) -> Option<u32> {
    local_time(timestamp, tz).map(|t| t.hour())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(key_char: &str, key_name: &str, time_since_last: f64) -> RawKeypress {
        RawKeypress {
            timestamp: 100.0,
            key_char: key_char.to_string(),
            key_name: key_name.to_string(),
            time_since_last,
            app_name: "Editor".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_finger_serialization() {
        let json = serde_json::to_string(&Finger::LeftPinky).unwrap();
        assert_eq!(json, "\"left_pinky\"");

        let parsed: Finger = serde_json::from_str("\"thumbs\"").unwrap();
        assert_eq!(parsed, Finger::Thumbs);
    }

    #[test]
    fn test_finger_hand_buckets() {
        assert_eq!(Finger::LeftIndex.hand(), Some(Hand::Left));
        assert_eq!(Finger::RightPinky.hand(), Some(Hand::Right));
        assert_eq!(Finger::Thumbs.hand(), Some(Hand::Thumbs));
        assert_eq!(Finger::Thumb.hand(), Some(Hand::Thumbs));
        assert_eq!(Finger::Pinky.hand(), None);
        assert_eq!(Finger::Unknown.hand(), None);
    }

    #[test]
    fn test_finger_for_key() {
        assert_eq!(Finger::for_key("A"), Finger::LeftPinky);
        assert_eq!(Finger::for_key("j"), Finger::RightIndex);
        assert_eq!(Finger::for_key(" "), Finger::Thumbs);
        assert_eq!(Finger::for_key("backspace"), Finger::RightPinky);
        assert_eq!(Finger::for_key("f13"), Finger::Unknown);
    }

    #[test]
    fn test_from_keypress_derives_capture_fields() {
        let settings = AnalysisSettings::default();

        let fast = KeystrokeEvent::from_keypress(raw("a", "a", 0.05), &settings);
        assert!(fast.typing_burst);
        assert_eq!(fast.pause_before, 0.0);
        assert!(!fast.is_correction);
        assert_eq!(fast.finger_assignment, Some(Finger::LeftPinky));

        let slow = KeystrokeEvent::from_keypress(raw("", "backspace", 1.2), &settings);
        assert!(!slow.typing_burst);
        assert_eq!(slow.pause_before, 1.2);
        assert!(slow.is_correction);
        assert_eq!(slow.finger_assignment, Some(Finger::RightPinky));
    }

    #[test]
    fn test_validate_rejects_bad_events() {
        let settings = AnalysisSettings::default();
        let mut event = KeystrokeEvent::from_keypress(raw("a", "a", 0.2), &settings);
        assert!(event.validate().is_ok());

        event.key_char = "ab".to_string();
        assert!(matches!(
            event.validate(),
            Err(EventValidationError::MultiCharacterKey(_))
        ));

        event.key_char = "a".to_string();
        event.is_correction = true;
        assert!(matches!(
            event.validate(),
            Err(EventValidationError::CorrectionOnNonDeletionKey(_))
        ));

        event.is_correction = false;
        event.cognitive_load_indicator = Some(1.5);
        assert!(matches!(
            event.validate(),
            Err(EventValidationError::CognitiveLoadOutOfRange(_))
        ));
    }

    #[test]
    fn test_event_deserialization_defaults() {
        let json = r#"{
            "timestamp": 1234567890.0,
            "key_code": 65,
            "key_char": "a",
            "key_name": "a"
        }"#;

        let event: KeystrokeEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.key_char, "a");
        assert!(!event.is_correction);
        assert!(event.finger_assignment.is_none());
        assert!(event.cognitive_load_indicator.is_none());
    }

    #[test]
    fn test_words_per_minute() {
        let settings = AnalysisSettings::default();
        let events: Vec<KeystrokeEvent> = (0..10)
            .map(|_| KeystrokeEvent::from_keypress(raw("a", "a", 0.1), &settings))
            .collect();

        // 10 chars = 2 words in 30 seconds = 4 WPM
        assert!((words_per_minute(&events, 30.0) - 4.0).abs() < 1e-9);
        assert_eq!(words_per_minute(&events, 0.0), 0.0);
    }

    #[test]
    fn test_hour_of_day_uses_timezone() {
        // 2024-01-15T14:30:00Z
        let ts = 1_705_329_000.0;
        assert_eq!(hour_of_day(ts, Tz::UTC), Some(14));
        assert_eq!(hour_of_day(ts, chrono_tz::Asia::Tokyo), Some(23));
        assert_eq!(hour_of_day(ts, chrono_tz::America::New_York), Some(9));
    }
}
