//! Pipeline orchestration
//!
//! Runs every component over the same immutable event slice and assembles
//! the report. Nothing is retained between runs: identical input and
//! configuration give identical results apart from the run timestamp.

use crate::config::AnalysisConfig;
use crate::correction::CorrectionReconstructor;
use crate::error::AnalysisError;
use crate::flow::FlowDetector;
use crate::heuristics::{MisspellingTable, SegmentVocabulary, TypoMatcher, WordList};
use crate::metrics::MetricAggregator;
use crate::opportunities::OpportunityRanker;
use crate::report::{AnalysisOutcome, ReportMetadata, TimeRange, TypingReport};
use crate::schema::{parse_array, validate_events};
use crate::session::SessionSegmenter;
use crate::types::KeystrokeEvent;
use crate::words::WordReconstructor;
use chrono_tz::Tz;
use tracing::{info, warn};

/// Analyze an event stream with the default heuristic tables.
///
/// Empty input returns [`AnalysisOutcome::Empty`].
pub fn analyze(events: &[KeystrokeEvent], config: &AnalysisConfig) -> AnalysisOutcome {
    run(
        events,
        config,
        &MisspellingTable::default(),
        &WordList::default(),
    )
}

/// Convert an event JSON array to report JSON (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let report_json = events_to_report_json(&events_json, &AnalysisConfig::default())?;
/// ```
pub fn events_to_report_json(
    events_json: &str,
    config: &AnalysisConfig,
) -> Result<String, AnalysisError> {
    // Stage 1: Parse and validate events
    let events = parse_array(events_json)?;
    validate_events(&events)?;

    // Stage 2: Analyze
    let outcome = analyze(&events, config);

    // Stage 3: Encode
    Ok(serde_json::to_string(&outcome)?)
}

/// Reusable analyzer holding configuration and heuristic tables.
///
/// Holds no state derived from previous runs.
pub struct TypingAnalyzer {
    config: AnalysisConfig,
    typos: Box<dyn TypoMatcher>,
    vocabulary: Box<dyn SegmentVocabulary>,
}

impl Default for TypingAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl TypingAnalyzer {
    /// Create an analyzer with the default misspelling table and word list
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            typos: Box::new(MisspellingTable::default()),
            vocabulary: Box::new(WordList::default()),
        }
    }

    /// Replace the typo table
    pub fn with_typo_matcher(mut self, typos: impl TypoMatcher + 'static) -> Self {
        self.typos = Box::new(typos);
        self
    }

    /// Replace the vocabulary used to split merged words
    pub fn with_vocabulary(mut self, vocabulary: impl SegmentVocabulary + 'static) -> Self {
        self.vocabulary = Box::new(vocabulary);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze(&self, events: &[KeystrokeEvent]) -> AnalysisOutcome {
        run(events, &self.config, self.typos.as_ref(), self.vocabulary.as_ref())
    }

    /// Parse, validate and analyze an event JSON array, returning report JSON
    pub fn process(&self, events_json: &str) -> Result<String, AnalysisError> {
        let events = parse_array(events_json)?;
        validate_events(&events)?;
        Ok(serde_json::to_string(&self.analyze(&events))?)
    }
}

fn run(
    events: &[KeystrokeEvent],
    config: &AnalysisConfig,
    typos: &dyn TypoMatcher,
    vocabulary: &dyn SegmentVocabulary,
) -> AnalysisOutcome {
    let (Some(first), Some(last)) = (events.first(), events.last()) else {
        info!("no events to analyze");
        return AnalysisOutcome::Empty;
    };
    info!(events = events.len(), "starting typing analysis");

    let tz = config.timezone().unwrap_or_else(|e| {
        warn!(error = %e, "falling back to UTC");
        Tz::UTC
    });
    let settings = &config.analysis;

    // Stage 1: Independent single-pass components
    let session_analysis = SessionSegmenter::new(&config.session_detection).analyze(events);
    let flow_periods = FlowDetector::new(settings.flow_state_threshold).detect(events);
    let error_patterns = CorrectionReconstructor::new(typos).analyze(events, tz);
    let word_patterns = WordReconstructor::new(vocabulary).analyze(events);

    // Stage 2: Raw-stream metrics, folding in flow periods
    let metrics = MetricAggregator::aggregate(events, settings, tz, flow_periods);

    // Stage 3: Rank opportunities
    let optimization_opportunities = OpportunityRanker::rank(
        &word_patterns,
        &metrics.key_combinations,
        &metrics.finger_usage,
        &metrics.efficiency.flow_state_periods,
    );

    info!(
        sessions = session_analysis.total_sessions,
        flow_periods = metrics.efficiency.flow_state_periods.len(),
        corrections = error_patterns.total_corrections,
        words = word_patterns.total_words,
        opportunities = optimization_opportunities.total_opportunities,
        "typing analysis complete"
    );

    let time_range = TimeRange::new(first.timestamp, last.timestamp, tz);
    AnalysisOutcome::Complete(Box::new(TypingReport {
        metadata: ReportMetadata::new(events.len(), time_range, tz),
        key_usage: metrics.key_usage,
        hesitation_patterns: metrics.hesitation,
        efficiency_metrics: metrics.efficiency,
        finger_usage: metrics.finger_usage,
        cognitive_load: metrics.cognitive_load,
        error_patterns,
        word_patterns,
        key_combinations: metrics.key_combinations,
        optimization_opportunities,
        session_analysis,
    }))
}
