//! Concept extraction
//!
//! Turns a stemmed token sequence into an ordered sequence of candidate
//! concept units (word n-grams or skip bigrams). Pure functions, no state:
//! filtering by stopwords or frequency is the caller's responsibility.

use crate::types::Concept;
use serde::{Deserialize, Serialize};

/// The concept-extraction mode (unit selector)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitMode {
    /// Word unigrams
    Unigram,
    /// Word bigrams (default)
    #[default]
    Bigram,
    /// Word trigrams
    Trigram,
    /// Word 4-grams
    Fourgram,
    /// Skip bigrams with a maximum gap of 4, plus unigrams
    SkipBigram,
}

impl UnitMode {
    /// Maximum in-pair gap for the skip-bigram mode
    pub const SKIP_GAP: usize = 4;

    /// Parse the short mode names used in run configurations
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "n1" => Some(UnitMode::Unigram),
            "n2" => Some(UnitMode::Bigram),
            "n3" => Some(UnitMode::Trigram),
            "n4" => Some(UnitMode::Fourgram),
            "su4" => Some(UnitMode::SkipBigram),
            _ => None,
        }
    }
}

/// Extract all contiguous n-grams of size `n` from `tokens`.
///
/// Produces `len(tokens) - n + 1` concepts, or none when the sequence is
/// shorter than `n`. Emission order follows the sliding window.
pub fn ngrams(tokens: &[String], n: usize) -> Vec<Concept> {
    if n == 0 || tokens.len() < n {
        return Vec::new();
    }
    tokens
        .windows(n)
        .map(|w| Concept::new(w.iter().cloned()))
        .collect()
}

/// Extract all skip bigrams `(tokens[i], tokens[j])` with `i < j <= i + k + 1`.
///
/// Emission order is by `i`, then by `j`, which keeps the output
/// deterministic for test reproducibility (downstream consumers
/// deduplicate via sets, so order carries no semantics).
pub fn skip_bigrams(tokens: &[String], k: usize) -> Vec<Concept> {
    let mut out = Vec::new();
    for i in 0..tokens.len() {
        let upper = (i + k + 1).min(tokens.len().saturating_sub(1));
        for j in (i + 1)..=upper {
            if j > i {
                out.push(Concept::new([tokens[i].clone(), tokens[j].clone()]));
            }
        }
    }
    out
}

/// Extract the ordered sequence of candidate concepts for the given mode.
///
/// `SkipBigram` emits all gap-≤4 skip bigrams followed by all unigrams.
pub fn extract_units(tokens: &[String], mode: UnitMode) -> Vec<Concept> {
    match mode {
        UnitMode::Unigram => ngrams(tokens, 1),
        UnitMode::Bigram => ngrams(tokens, 2),
        UnitMode::Trigram => ngrams(tokens, 3),
        UnitMode::Fourgram => ngrams(tokens, 4),
        UnitMode::SkipBigram => {
            let mut units = skip_bigrams(tokens, UnitMode::SKIP_GAP);
            units.extend(ngrams(tokens, 1));
            units
        }
    }
}
