//! Session segmentation
//!
//! Splits the event stream into typing sessions on genuinely long absences
//! and computes per-session rate metrics. Short and medium breaks stay inside
//! a session; they only shrink its active duration.

use crate::config::SessionDetectionSettings;
use crate::stats::{mean, sample_std_dev, Tally};
use crate::types::{words_per_minute, KeystrokeEvent};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// In-session gaps above this many seconds do not count as active time.
pub const ACTIVE_GAP_CUTOFF_SEC: f64 = 30.0;

/// Below this fraction of the raw span, active time falls back to the raw span.
pub const MIN_ACTIVE_FRACTION: f64 = 0.10;

/// Sessions with fewer events are omitted.
pub const MIN_SESSION_EVENTS: usize = 2;

/// Added to the standard deviation before inverting it.
const CONSISTENCY_EPSILON: f64 = 0.01;

/// A maximal run of events with no gap above the long-pause threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Index of the first event in the input sequence
    pub start_index: usize,
    /// Index one past the last event
    pub end_index: usize,
    pub start_timestamp: f64,
    pub end_timestamp: f64,
    /// Raw span from first to last event in seconds
    pub duration_seconds: f64,
    /// Sum of in-session gaps at or below the active cutoff
    pub active_duration_seconds: f64,
    pub keystroke_count: usize,
    /// Single alphanumeric keystrokes
    pub character_count: usize,
    /// Standard words (5 characters each)
    pub word_count: f64,
    pub correction_count: usize,
    pub wpm: f64,
    /// 100 minus the correction percentage
    pub accuracy: f64,
    /// Application with the most events in the session
    pub dominant_app: String,
    /// Gaps between the short and medium pause thresholds
    pub short_breaks: usize,
    /// Gaps between the medium and long pause thresholds
    pub medium_breaks: usize,
}

impl Session {
    pub fn event_count(&self) -> usize {
        self.end_index - self.start_index
    }
}

/// Sign of the mean session-to-session change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

impl TrendDirection {
    fn from_change(change: f64) -> Self {
        if change > 0.0 {
            TrendDirection::Improving
        } else if change < 0.0 {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        }
    }
}

/// Cross-session trend, present with two or more sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTrend {
    pub wpm_trend: TrendDirection,
    pub accuracy_trend: TrendDirection,
    pub mean_wpm_change: f64,
    pub mean_accuracy_change: f64,
    /// Inverse of the cross-session WPM standard deviation
    pub consistency_score: f64,
}

/// Session section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionAnalysis {
    pub sessions: Vec<Session>,
    pub total_sessions: usize,
    pub total_active_minutes: f64,
    pub average_session_minutes: f64,
    pub average_wpm: f64,
    pub average_accuracy: f64,
    pub trend: Option<SessionTrend>,
}

/// Splits events into sessions using the configured pause thresholds.
#[derive(Debug, Clone)]
pub struct SessionSegmenter {
    long_pause_threshold: f64,
    short_pause_threshold: f64,
    medium_pause_threshold: f64,
}

impl Default for SessionSegmenter {
    fn default() -> Self {
        Self::new(&SessionDetectionSettings::default())
    }
}

impl SessionSegmenter {
    pub fn new(settings: &SessionDetectionSettings) -> Self {
        Self {
            long_pause_threshold: settings.long_pause_threshold,
            short_pause_threshold: settings.short_pause_threshold,
            medium_pause_threshold: settings.medium_pause_threshold,
        }
    }

    /// Segment a time-ordered event sequence into sessions.
    pub fn segment(&self, events: &[KeystrokeEvent]) -> Vec<Session> {
        let mut sessions = Vec::new();
        if events.is_empty() {
            return sessions;
        }

        let mut start = 0;
        for i in 1..events.len() {
            let gap = events[i].timestamp - events[i - 1].timestamp;
            if gap > self.long_pause_threshold {
                if i - start >= MIN_SESSION_EVENTS {
                    sessions.push(self.build_session(events, start, i));
                }
                start = i;
            }
        }
        if events.len() - start >= MIN_SESSION_EVENTS {
            sessions.push(self.build_session(events, start, events.len()));
        }

        debug!(sessions = sessions.len(), "segmented event stream");
        sessions
    }

    /// Segment and summarise, including the cross-session trend.
    pub fn analyze(&self, events: &[KeystrokeEvent]) -> SessionAnalysis {
        let sessions = self.segment(events);

        let total_active_minutes = sessions
            .iter()
            .map(|s| s.active_duration_seconds / 60.0)
            .sum::<f64>();
        let durations: Vec<f64> = sessions.iter().map(|s| s.duration_seconds / 60.0).collect();
        let wpms: Vec<f64> = sessions.iter().map(|s| s.wpm).collect();
        let accuracies: Vec<f64> = sessions.iter().map(|s| s.accuracy).collect();

        SessionAnalysis {
            total_sessions: sessions.len(),
            total_active_minutes,
            average_session_minutes: mean(&durations),
            average_wpm: mean(&wpms),
            average_accuracy: mean(&accuracies),
            trend: compute_trend(&wpms, &accuracies),
            sessions,
        }
    }

    fn build_session(&self, events: &[KeystrokeEvent], start: usize, end: usize) -> Session {
        let slice = &events[start..end];
        let first = &slice[0];
        let last = &slice[slice.len() - 1];
        let duration_seconds = last.timestamp - first.timestamp;

        let mut active = 0.0;
        let mut short_breaks = 0;
        let mut medium_breaks = 0;
        for pair in slice.windows(2) {
            let gap = pair[1].timestamp - pair[0].timestamp;
            if gap <= ACTIVE_GAP_CUTOFF_SEC {
                active += gap;
            }
            if gap > self.medium_pause_threshold {
                medium_breaks += 1;
            } else if gap > self.short_pause_threshold {
                short_breaks += 1;
            }
        }
        // Summed gaps can exceed the raw span by rounding error
        let active_duration_seconds = if active < duration_seconds * MIN_ACTIVE_FRACTION {
            duration_seconds
        } else {
            active.min(duration_seconds)
        };

        let keystroke_count = slice.len();
        let character_count = slice.iter().filter(|e| e.is_alphanumeric()).count();
        let correction_count = slice.iter().filter(|e| e.is_correction).count();
        let accuracy = 100.0 - (correction_count as f64 / keystroke_count as f64 * 100.0);

        let mut apps = Tally::new();
        for event in slice {
            apps.add(event.app_name.as_str());
        }

        Session {
            start_index: start,
            end_index: end,
            start_timestamp: first.timestamp,
            end_timestamp: last.timestamp,
            duration_seconds,
            active_duration_seconds,
            keystroke_count,
            character_count,
            word_count: character_count as f64 / 5.0,
            correction_count,
            wpm: words_per_minute(slice, active_duration_seconds),
            accuracy,
            dominant_app: apps.max_key().map(|a| a.to_string()).unwrap_or_default(),
            short_breaks,
            medium_breaks,
        }
    }
}

fn compute_trend(wpms: &[f64], accuracies: &[f64]) -> Option<SessionTrend> {
    if wpms.len() < 2 {
        return None;
    }

    let wpm_changes: Vec<f64> = wpms.windows(2).map(|w| w[1] - w[0]).collect();
    let accuracy_changes: Vec<f64> = accuracies.windows(2).map(|w| w[1] - w[0]).collect();
    let mean_wpm_change = mean(&wpm_changes);
    let mean_accuracy_change = mean(&accuracy_changes);

    Some(SessionTrend {
        wpm_trend: TrendDirection::from_change(mean_wpm_change),
        accuracy_trend: TrendDirection::from_change(mean_accuracy_change),
        mean_wpm_change,
        mean_accuracy_change,
        consistency_score: 1.0 / (sample_std_dev(wpms) + CONSISTENCY_EPSILON),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{correction, key};

    fn stream(gaps: &[f64]) -> Vec<KeystrokeEvent> {
        let mut t = 1_000.0;
        let mut events = vec![key("a", t)];
        for gap in gaps {
            t += gap;
            events.push(key("a", t));
        }
        events
    }

    #[test]
    fn test_long_gap_splits_into_two_sessions() {
        let events = stream(&[0.2, 0.2, 2000.0, 0.2, 0.2]);
        let sessions = SessionSegmenter::default().segment(&events);

        assert_eq!(sessions.len(), 2);
        assert_eq!((sessions[0].start_index, sessions[0].end_index), (0, 3));
        assert_eq!((sessions[1].start_index, sessions[1].end_index), (3, 6));
        assert!(sessions[0].end_timestamp <= sessions[1].start_timestamp);
    }

    #[test]
    fn test_medium_breaks_stay_in_session() {
        let events = stream(&[0.2, 600.0, 0.2, 1000.0, 0.2]);
        let sessions = SessionSegmenter::default().segment(&events);

        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].event_count(), 6);
        assert_eq!(sessions[0].short_breaks, 1);
        assert_eq!(sessions[0].medium_breaks, 1);
    }

    #[test]
    fn test_single_event_session_omitted() {
        let events = stream(&[2000.0, 0.5, 0.5]);
        let sessions = SessionSegmenter::default().segment(&events);

        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].start_index, 1);
    }

    #[test]
    fn test_active_duration_excludes_long_gaps() {
        // 10 gaps of 1s plus one 120s break
        let mut gaps = vec![1.0; 10];
        gaps.push(120.0);
        let events = stream(&gaps);
        let session = &SessionSegmenter::default().segment(&events)[0];

        assert!((session.duration_seconds - 130.0).abs() < 1e-9);
        assert!((session.active_duration_seconds - 10.0).abs() < 1e-9);
        assert!(session.active_duration_seconds <= session.duration_seconds);
    }

    #[test]
    fn test_active_duration_falls_back_to_raw_span() {
        // Every gap exceeds the cutoff, so filtered active time is zero
        let events = stream(&[60.0, 60.0, 60.0]);
        let session = &SessionSegmenter::default().segment(&events)[0];

        assert_eq!(session.active_duration_seconds, session.duration_seconds);
        assert!(session.wpm > 0.0);
    }

    #[test]
    fn test_accuracy_and_dominant_app() {
        let mut events = stream(&[0.2, 0.2, 0.2]);
        events.push(correction(1_000.8));
        events[0].app_name = "Terminal".to_string();
        let session = &SessionSegmenter::default().segment(&events)[0];

        assert_eq!(session.correction_count, 1);
        assert!((session.accuracy - 80.0).abs() < 1e-9);
        assert_eq!(session.dominant_app, "Editor");
    }

    #[test]
    fn test_trend_requires_two_sessions() {
        let analysis = SessionSegmenter::default().analyze(&stream(&[0.2, 0.2]));
        assert_eq!(analysis.total_sessions, 1);
        assert!(analysis.trend.is_none());
    }

    #[test]
    fn test_trend_direction() {
        // Slow session, then a faster one
        let mut events = stream(&[1.0, 1.0, 1.0]);
        let mut t = events.last().unwrap().timestamp + 3600.0;
        for _ in 0..4 {
            events.push(key("a", t));
            t += 0.2;
        }

        let analysis = SessionSegmenter::default().analyze(&events);
        let trend = analysis.trend.unwrap();
        assert_eq!(analysis.total_sessions, 2);
        assert_eq!(trend.wpm_trend, TrendDirection::Improving);
        assert_eq!(trend.accuracy_trend, TrendDirection::Stable);
        assert!(trend.consistency_score > 0.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(SessionSegmenter::default().segment(&[]).is_empty());
    }
}
