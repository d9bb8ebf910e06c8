//! Flow-period detection
//!
//! A flow period is a sustained run of fast, uncorrected, low-pause typing.

use crate::stats::Tally;
use crate::types::{words_per_minute, KeystrokeEvent};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Events pausing this long or longer break a flow streak.
pub const FLOW_MAX_PAUSE_SEC: f64 = 0.5;

/// A maximal run of flow-satisfying events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowPeriod {
    /// Index of the first event in the input sequence
    pub start_index: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub duration_seconds: f64,
    pub keystroke_count: usize,
    pub wpm: f64,
    /// Application with the most events in the period
    pub app_name: String,
}

/// Finds flow periods of at least `min_keystrokes` events.
#[derive(Debug, Clone)]
pub struct FlowDetector {
    min_keystrokes: usize,
}

impl FlowDetector {
    pub fn new(min_keystrokes: usize) -> Self {
        Self {
            min_keystrokes: min_keystrokes.max(1),
        }
    }

    /// Whether a single event keeps a flow streak going.
    pub fn is_flowing(event: &KeystrokeEvent) -> bool {
        event.typing_burst && !event.is_correction && event.pause_before < FLOW_MAX_PAUSE_SEC
    }

    pub fn detect(&self, events: &[KeystrokeEvent]) -> Vec<FlowPeriod> {
        let mut periods = Vec::new();
        let mut streak_start: Option<usize> = None;

        for (i, event) in events.iter().enumerate() {
            if Self::is_flowing(event) {
                streak_start.get_or_insert(i);
            } else if let Some(start) = streak_start.take() {
                self.flush(events, start, i, &mut periods);
            }
        }
        // A streak running through the last event has no break to close it
        if let Some(start) = streak_start {
            self.flush(events, start, events.len(), &mut periods);
        }

        debug!(flow_periods = periods.len(), "detected flow periods");
        periods
    }

    fn flush(&self, events: &[KeystrokeEvent], start: usize, end: usize, out: &mut Vec<FlowPeriod>) {
        if end - start < self.min_keystrokes {
            return;
        }
        let slice = &events[start..end];
        let start_time = slice[0].timestamp;
        let end_time = slice[slice.len() - 1].timestamp;
        let duration_seconds = end_time - start_time;

        let mut apps = Tally::new();
        for event in slice {
            apps.add(event.app_name.as_str());
        }

        out.push(FlowPeriod {
            start_index: start,
            start_time,
            end_time,
            duration_seconds,
            keystroke_count: slice.len(),
            wpm: words_per_minute(slice, duration_seconds),
            app_name: apps.max_key().map(|a| a.to_string()).unwrap_or_default(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{correction, key};

    fn burst(count: usize, start: f64) -> Vec<KeystrokeEvent> {
        (0..count)
            .map(|i| {
                let mut event = key("e", start + i as f64 * 0.1);
                event.typing_burst = true;
                event.pause_before = 0.02;
                event
            })
            .collect()
    }

    #[test]
    fn test_run_to_end_of_stream_is_flushed() {
        let events = burst(100, 0.0);
        let periods = FlowDetector::new(50).detect(&events);

        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].keystroke_count, 100);
        assert!((periods[0].duration_seconds - 9.9).abs() < 1e-9);
        assert!(periods[0].wpm > 0.0);
        assert_eq!(periods[0].app_name, "Editor");
    }

    #[test]
    fn test_short_streaks_are_dropped() {
        let mut events = burst(30, 0.0);
        events.push(correction(3.0));
        events.extend(burst(70, 3.1));

        let periods = FlowDetector::new(50).detect(&events);
        assert_eq!(periods.len(), 1);
        assert_eq!(periods[0].start_index, 31);
        assert_eq!(periods[0].keystroke_count, 70);
    }

    #[test]
    fn test_long_pause_breaks_flow() {
        let mut events = burst(60, 0.0);
        events[30].pause_before = 0.6;

        let periods = FlowDetector::new(20).detect(&events);
        assert_eq!(periods.len(), 2);
        assert_eq!(periods[0].keystroke_count, 30);
        assert_eq!(periods[1].keystroke_count, 29);
        assert!(periods.iter().all(|p| p.keystroke_count >= 20));
    }

    #[test]
    fn test_no_flow_in_slow_typing() {
        let events: Vec<_> = (0..100).map(|i| key("a", i as f64)).collect();
        assert!(FlowDetector::new(10).detect(&events).is_empty());
    }
}
