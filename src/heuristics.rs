//! Pluggable heuristic tables
//!
//! Typo detection and merged-word splitting both depend on small fixed word
//! lists. They sit behind traits so the tables can be swapped or extended
//! without touching the reconstruction algorithms.

/// A matched misspelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypoMatch {
    pub typo: String,
    pub correction: String,
}

impl TypoMatch {
    /// Pattern label, e.g. `"teh -> the"`.
    pub fn pattern(&self) -> String {
        format!("{} -> {}", self.typo, self.correction)
    }
}

/// Detects likely typos in the most recently typed characters.
pub trait TypoMatcher: Send + Sync {
    /// `recent` is already lowercased.
    fn find_typo(&self, recent: &str) -> Option<TypoMatch>;
}

/// Substring match against a misspelling → correct-spelling table.
///
/// Entries are tried in table order; the first hit wins.
#[derive(Debug, Clone)]
pub struct MisspellingTable {
    pairs: Vec<(String, String)>,
}

const COMMON_MISSPELLINGS: [(&str, &str); 7] = [
    ("teh", "the"),
    ("adn", "and"),
    ("recieve", "receive"),
    ("seperate", "separate"),
    ("definately", "definitely"),
    ("occured", "occurred"),
    ("accomodate", "accommodate"),
];

impl Default for MisspellingTable {
    fn default() -> Self {
        Self::new(
            COMMON_MISSPELLINGS
                .iter()
                .map(|(t, c)| (t.to_string(), c.to_string())),
        )
    }
}

impl MisspellingTable {
    pub fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(t, c)| (t.to_lowercase(), c))
                .collect(),
        }
    }

    /// Add entries after the existing ones.
    pub fn extend(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.pairs
            .extend(pairs.into_iter().map(|(t, c)| (t.to_lowercase(), c)));
        self
    }
}

impl TypoMatcher for MisspellingTable {
    fn find_typo(&self, recent: &str) -> Option<TypoMatch> {
        self.pairs
            .iter()
            .find(|(typo, _)| recent.contains(typo.as_str()))
            .map(|(typo, correction)| TypoMatch {
                typo: typo.clone(),
                correction: correction.clone(),
            })
    }
}

/// Finds known words inside accidentally merged text.
pub trait SegmentVocabulary: Send + Sync {
    /// Byte span `(start, end)` of the longest vocabulary word occurring
    /// anywhere in `text`, leftmost occurrence on equal length.
    fn longest_match(&self, text: &str) -> Option<(usize, usize)>;
}

/// Fixed list of common English and programming words.
#[derive(Debug, Clone)]
pub struct WordList {
    // Sorted longest first
    words: Vec<String>,
}

const COMMON_WORDS: &[&str] = &[
    "the", "and", "that", "have", "for", "not", "with", "you", "this", "but", "from", "they",
    "will", "would", "there", "their", "what", "about", "which", "when", "make", "can", "like",
    "time", "just", "know", "take", "people", "into", "your", "good", "some", "could", "them",
    "other", "than", "then", "now", "look", "only", "come", "over", "think", "also", "back",
    "after", "work", "first", "well", "because", "these", "function", "return", "import",
    "class", "const", "string", "value", "error", "data", "file", "test", "hello", "world",
];

impl Default for WordList {
    fn default() -> Self {
        Self::new(COMMON_WORDS.iter().map(|w| w.to_string()))
    }
}

impl WordList {
    pub fn new(words: impl IntoIterator<Item = String>) -> Self {
        let mut words: Vec<String> = words
            .into_iter()
            .map(|w| w.to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        words.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        words.dedup();
        Self { words }
    }
}

impl SegmentVocabulary for WordList {
    fn longest_match(&self, text: &str) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;
        for word in &self.words {
            if let Some((start, end)) = best {
                // Sorted longest first, so nothing shorter can win
                if word.len() < end - start {
                    break;
                }
            }
            if let Some(start) = text.find(word.as_str()) {
                if best.map_or(true, |(s, _)| start < s) {
                    best = Some((start, start + word.len()));
                }
            }
        }
        best
    }
}
