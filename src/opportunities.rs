//! Optimization opportunities
//!
//! Turns word, combination, finger and flow statistics into a short ranked
//! list of suggestions.

use crate::flow::FlowPeriod;
use crate::metrics::{FingerUsage, KeyCombinations};
use crate::stats::mean;
use crate::words::WordPatterns;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// At most this many opportunities are reported.
pub const MAX_OPPORTUNITIES: usize = 10;

/// Assumed cost of a text-expansion shortcut for a word.
const WORD_SHORTCUT_KEYSTROKES: usize = 3;
/// Assumed cost of a text-expansion shortcut for a phrase.
const PHRASE_SHORTCUT_KEYSTROKES: i64 = 4;

const MIN_WORD_SHORTCUT_FREQUENCY: usize = 5;
const HIGH_PRIORITY_WORD_FREQUENCY: usize = 10;
const MIN_REPEAT_COUNT: usize = 3;
const HIGH_PRIORITY_PHRASE_COUNT: usize = 5;
const MIN_PHRASE_SAVINGS: i64 = 20;
const CANDIDATES_PER_RULE: usize = 5;
const HAND_IMBALANCE_POINTS: f64 = 20.0;
const SHORT_FLOW_SEC: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityType {
    TextShortcut,
    FingerOptimization,
    PhraseShortcut,
    HandBalance,
    FlowOptimization,
}

/// Ordered high before medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    #[serde(rename = "type")]
    pub kind: OpportunityType,
    pub description: String,
    /// Either "<n> keystrokes" or a qualitative benefit
    pub potential_savings: String,
    pub priority: Priority,
}

/// Optimization section of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationOpportunities {
    /// Counted before truncation
    pub total_opportunities: usize,
    pub high_priority: usize,
    pub medium_priority: usize,
    pub opportunities: Vec<Opportunity>,
    /// Sum of keystroke savings over every opportunity found
    pub estimated_total_savings: u64,
}

pub struct OpportunityRanker;

impl OpportunityRanker {
    pub fn rank(
        words: &WordPatterns,
        combinations: &KeyCombinations,
        fingers: &FingerUsage,
        flow_periods: &[FlowPeriod],
    ) -> OptimizationOpportunities {
        let mut opportunities = Vec::new();
        word_shortcuts(words, &mut opportunities);
        finger_sequences(combinations, &mut opportunities);
        phrase_shortcuts(words, &mut opportunities);
        hand_balance(fingers, &mut opportunities);
        flow_interruptions(flow_periods, &mut opportunities);

        // Stable, so rule order is kept within a priority
        opportunities.sort_by_key(|o| o.priority);

        let total_opportunities = opportunities.len();
        let high_priority = opportunities
            .iter()
            .filter(|o| o.priority == Priority::High)
            .count();
        let estimated_total_savings = opportunities
            .iter()
            .filter(|o| o.potential_savings.contains("keystrokes"))
            .filter_map(|o| first_integer(&o.potential_savings))
            .sum();
        opportunities.truncate(MAX_OPPORTUNITIES);

        debug!(
            found = total_opportunities,
            reported = opportunities.len(),
            "ranked optimization opportunities"
        );

        OptimizationOpportunities {
            total_opportunities,
            high_priority,
            medium_priority: total_opportunities - high_priority,
            opportunities,
            estimated_total_savings,
        }
    }
}

fn word_shortcuts(words: &WordPatterns, out: &mut Vec<Opportunity>) {
    for entry in &words.word_efficiency {
        if !entry.shortcut_candidate || entry.frequency < MIN_WORD_SHORTCUT_FREQUENCY {
            continue;
        }
        let savings = entry
            .total_keystrokes
            .saturating_sub(entry.frequency * WORD_SHORTCUT_KEYSTROKES);
        out.push(Opportunity {
            kind: OpportunityType::TextShortcut,
            description: format!(
                "Create shortcut for '{}' (typed {} times)",
                entry.word, entry.frequency
            ),
            potential_savings: format!("{savings} keystrokes"),
            priority: if entry.frequency > HIGH_PRIORITY_WORD_FREQUENCY {
                Priority::High
            } else {
                Priority::Medium
            },
        });
    }
}

fn finger_sequences(combinations: &KeyCombinations, out: &mut Vec<Opportunity>) {
    for entry in combinations
        .same_finger_sequences
        .iter()
        .take(CANDIDATES_PER_RULE)
        .filter(|e| e.count >= MIN_REPEAT_COUNT)
    {
        out.push(Opportunity {
            kind: OpportunityType::FingerOptimization,
            description: format!(
                "'{}' uses same finger {} times - consider alternative layout",
                entry.key, entry.count
            ),
            potential_savings: "Reduce strain, increase speed".to_string(),
            priority: Priority::Medium,
        });
    }
}

fn phrase_shortcuts(words: &WordPatterns, out: &mut Vec<Opportunity>) {
    for entry in words
        .most_frequent_bigrams
        .iter()
        .take(CANDIDATES_PER_RULE)
        .filter(|e| e.count >= MIN_REPEAT_COUNT)
    {
        let phrase_length = entry.key.chars().filter(|c| *c != ' ').count() as i64;
        let savings = entry.count as i64 * (phrase_length - PHRASE_SHORTCUT_KEYSTROKES);
        if savings <= MIN_PHRASE_SAVINGS {
            continue;
        }
        out.push(Opportunity {
            kind: OpportunityType::PhraseShortcut,
            description: format!(
                "Create shortcut for '{}' (used {} times)",
                entry.key, entry.count
            ),
            potential_savings: format!("{savings} keystrokes"),
            priority: if entry.count > HIGH_PRIORITY_PHRASE_COUNT {
                Priority::High
            } else {
                Priority::Medium
            },
        });
    }
}

fn hand_balance(fingers: &FingerUsage, out: &mut Vec<Opportunity>) {
    if fingers.hand_balance.total() == 0 {
        return;
    }
    let (left, right) = fingers.hand_balance.percentages();
    if (left - right).abs() <= HAND_IMBALANCE_POINTS {
        return;
    }
    let dominant = if left > right { "left" } else { "right" };
    out.push(Opportunity {
        kind: OpportunityType::HandBalance,
        description: format!(
            "Hand usage imbalance: {dominant} hand used {:.1}% of time",
            left.max(right)
        ),
        potential_savings: "Better ergonomics and reduced fatigue".to_string(),
        priority: Priority::Medium,
    });
}

fn flow_interruptions(flow_periods: &[FlowPeriod], out: &mut Vec<Opportunity>) {
    if flow_periods.is_empty() {
        return;
    }
    let durations: Vec<f64> = flow_periods.iter().map(|p| p.duration_seconds).collect();
    let average = mean(&durations);
    if average >= SHORT_FLOW_SEC {
        return;
    }
    out.push(Opportunity {
        kind: OpportunityType::FlowOptimization,
        description: format!("Short flow states (avg {average:.1}s) - minimize interruptions"),
        potential_savings: "Increase sustained productivity periods".to_string(),
        priority: Priority::High,
    });
}

/// First run of ASCII digits in `text`.
fn first_integer(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
