//! Stopword filtering
//!
//! Multi-language stopword filtering via the `stop-words` crate, with
//! support for custom lists. The summarizer only needs two queries: is a
//! single token a stopword, and is a whole concept made of nothing else.

use crate::types::Concept;
use rustc_hash::FxHashSet;
use stop_words::{get, LANGUAGE};

/// A filter for recognizing stopwords in stemmed token sequences
#[derive(Debug, Clone)]
pub struct StopwordFilter {
    /// Set of stopwords (lowercase)
    stopwords: FxHashSet<String>,
}

impl Default for StopwordFilter {
    fn default() -> Self {
        Self::new("en")
    }
}

impl StopwordFilter {
    /// Create a new stopword filter for the given language code
    ///
    /// Unknown languages fall back to English.
    pub fn new(language: &str) -> Self {
        Self {
            stopwords: Self::load_stopwords(language),
        }
    }

    /// Create an empty filter (nothing is a stopword)
    pub fn empty() -> Self {
        Self {
            stopwords: FxHashSet::default(),
        }
    }

    /// Create a filter from a custom list
    pub fn from_list(words: &[&str]) -> Self {
        Self {
            stopwords: words.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Add additional stopwords to the filter
    pub fn add_stopwords(&mut self, words: &[&str]) {
        for word in words {
            self.stopwords.insert(word.to_lowercase());
        }
    }

    /// Check if a word is a stopword
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }

    /// Check if a concept consists entirely of stopwords.
    ///
    /// Empty concepts count as all-stopword so they never survive pruning.
    pub fn is_all_stopwords(&self, concept: &Concept) -> bool {
        concept.tokens().iter().all(|t| self.is_stopword(t))
    }

    /// Fraction of a concept's tokens that are stopwords, in [0, 1]
    pub fn stopword_ratio(&self, concept: &Concept) -> f64 {
        if concept.is_empty() {
            return 1.0;
        }
        let stop = concept
            .tokens()
            .iter()
            .filter(|t| self.is_stopword(t))
            .count();
        stop as f64 / concept.len() as f64
    }

    /// Number of stopwords in the filter
    pub fn len(&self) -> usize {
        self.stopwords.len()
    }

    /// Check if the filter is empty
    pub fn is_empty(&self) -> bool {
        self.stopwords.is_empty()
    }

    fn load_stopwords(language: &str) -> FxHashSet<String> {
        let lang = match language.to_lowercase().as_str() {
            "en" | "english" => LANGUAGE::English,
            "de" | "german" => LANGUAGE::German,
            "fr" | "french" => LANGUAGE::French,
            "es" | "spanish" => LANGUAGE::Spanish,
            "it" | "italian" => LANGUAGE::Italian,
            "pt" | "portuguese" => LANGUAGE::Portuguese,
            "nl" | "dutch" => LANGUAGE::Dutch,
            "ru" | "russian" => LANGUAGE::Russian,
            _ => LANGUAGE::English,
        };

        get(lang).iter().map(|s| s.to_string()).collect()
    }
}
