//! Raw-stream metric aggregation
//!
//! Each analyzer is a single pass over the event stream. [`MetricAggregator`]
//! runs them all and folds in the flow periods found by the flow detector.

pub mod cognitive;
pub mod combinations;
pub mod efficiency;
pub mod fingers;
pub mod hesitation;
pub mod key_usage;

pub use cognitive::{CognitiveLoad, CognitiveLoadAnalyzer};
pub use combinations::{CombinationAnalyzer, KeyCombinations};
pub use efficiency::{EfficiencyAnalyzer, EfficiencyMetrics};
pub use fingers::{FingerAnalyzer, FingerUsage, HandBalance};
pub use hesitation::{HesitationAnalyzer, HesitationPatterns, KeyHesitation, PauseDistribution};
pub use key_usage::{KeyShare, KeyUsage, KeyUsageAnalyzer};

use crate::config::AnalysisSettings;
use crate::flow::FlowPeriod;
use crate::types::KeystrokeEvent;
use chrono_tz::Tz;
use tracing::debug;

/// Outputs of every raw-stream analyzer.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedMetrics {
    pub key_usage: KeyUsage,
    pub hesitation: HesitationPatterns,
    pub efficiency: EfficiencyMetrics,
    pub finger_usage: FingerUsage,
    pub cognitive_load: Option<CognitiveLoad>,
    pub key_combinations: KeyCombinations,
}

pub struct MetricAggregator;

impl MetricAggregator {
    pub fn aggregate(
        events: &[KeystrokeEvent],
        settings: &AnalysisSettings,
        tz: Tz,
        flow_periods: Vec<FlowPeriod>,
    ) -> AggregatedMetrics {
        let metrics = AggregatedMetrics {
            key_usage: KeyUsageAnalyzer::analyze(events),
            hesitation: HesitationAnalyzer::analyze(events, settings.hesitation_threshold),
            efficiency: EfficiencyAnalyzer::analyze(events, flow_periods),
            finger_usage: FingerAnalyzer::analyze(events),
            cognitive_load: CognitiveLoadAnalyzer::analyze(events, tz),
            key_combinations: CombinationAnalyzer::analyze(events),
        };

        debug!(
            pauses = metrics.hesitation.total_pauses,
            bigrams = metrics.key_combinations.total_bigrams,
            has_cognitive_load = metrics.cognitive_load.is_some(),
            "aggregated stream metrics"
        );
        metrics
    }
}
