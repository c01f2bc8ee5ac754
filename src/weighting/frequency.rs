//! Frequency heuristic weighting
//!
//! Weights each concept by its document frequency (count of distinct
//! documents containing it) when the document set is large enough, or by
//! raw occurrence frequency otherwise. Low-frequency and all-stopword
//! concepts are discarded.

use crate::concepts::{extract_units, UnitMode};
use crate::errors::Result;
use crate::nlp::{LexicalOverlap, Similarity, StopwordFilter};
use crate::types::{Problem, Sentence, SummConfig};
use crate::weighting::{ConceptWeights, WeightingStrategy};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// The frequency/doc-frequency heuristic, the default blind strategy
pub struct FrequencyWeighting {
    mode: UnitMode,
    config: SummConfig,
    stopwords: StopwordFilter,
    similarity: Arc<dyn Similarity>,
}

impl FrequencyWeighting {
    /// Create the strategy for the given unit mode and run config
    pub fn new(mode: UnitMode, config: SummConfig) -> Self {
        let stopwords = StopwordFilter::new(&config.language);
        Self {
            mode,
            config,
            stopwords,
            similarity: Arc::new(LexicalOverlap),
        }
    }

    /// Override the similarity collaborator
    pub fn with_similarity(mut self, similarity: Arc<dyn Similarity>) -> Self {
        self.similarity = similarity;
        self
    }

    /// Override the stopword filter
    pub fn with_stopwords(mut self, stopwords: StopwordFilter) -> Self {
        self.stopwords = stopwords;
        self
    }

    fn query_sim(&self, sentence: &Sentence, query: &[String]) -> f64 {
        sentence
            .query_sim
            .unwrap_or_else(|| self.similarity.similarity(&sentence.stemmed, query))
    }
}

impl std::fmt::Debug for FrequencyWeighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrequencyWeighting")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl WeightingStrategy for FrequencyWeighting {
    fn name(&self) -> &'static str {
        "frequency"
    }

    fn compute_weights(&self, problem: &Problem) -> Result<ConceptWeights> {
        let min_count = self.config.min_concept_count;
        // Doc frequency only pays once the document set is large enough.
        let use_doc_freq = problem.documents.len() > min_count;

        let mut seen_sentences: FxHashSet<String> = FxHashSet::default();
        let mut counts = ConceptWeights::default();

        for doc in &problem.documents {
            let mut doc_counts: FxHashMap<_, f64> = FxHashMap::default();

            for sentence in &doc.sentences {
                if sentence.length() < self.config.min_sentence_length {
                    continue;
                }

                // Exact stemmed duplicates: first occurrence wins.
                if !seen_sentences.insert(sentence.stemmed_key()) {
                    continue;
                }

                if let Some(query) = &problem.query {
                    if self.query_sim(sentence, query) <= 0.0 {
                        continue;
                    }
                }

                for unit in extract_units(&sentence.stemmed, self.mode) {
                    *doc_counts.entry(unit).or_insert(0.0) += 1.0;
                }
            }

            for (concept, count) in doc_counts {
                let entry = counts.entry(concept).or_insert(0.0);
                if use_doc_freq {
                    *entry += 1.0;
                } else {
                    *entry += count;
                }
            }
        }

        let min = min_count as f64;
        counts.retain(|concept, count| *count >= min && !self.stopwords.is_all_stopwords(concept));

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Concept, Document};

    fn sent(text: &str, order: usize, doc_index: usize) -> Sentence {
        let stemmed: Vec<String> = text.split_whitespace().map(String::from).collect();
        Sentence::new(text, stemmed, order, format!("doc{doc_index}"), doc_index)
    }

    /// One small document set where "budget deficit grew" repeats enough
    /// times to survive the min-count cut.
    fn problem() -> Problem {
        let docs = vec![
            Document::new(
                "d0",
                vec![
                    sent("budget deficit grew sharply last year", 0, 0),
                    sent("officials said budget deficit grew again", 1, 0),
                ],
            ),
            Document::new(
                "d1",
                vec![sent("reports show budget deficit grew in spring", 0, 1)],
            ),
        ];
        let mut config = Problem::new("p-freq", docs);
        config.query = None;
        config
    }

    #[test]
    fn test_raw_frequency_small_docset() {
        // 2 docs <= min_count 3 → raw frequency.
        let strategy = FrequencyWeighting::new(UnitMode::Bigram, SummConfig::default());
        let weights = strategy.compute_weights(&problem()).unwrap();

        // "budget deficit" occurs 3 times total across 3 sentences.
        assert_eq!(weights[&Concept::new(["budget", "deficit"])], 3.0);
        assert_eq!(weights[&Concept::new(["deficit", "grew"])], 3.0);
        // Below min_count 3: pruned.
        assert!(!weights.contains_key(&Concept::new(["last", "year"])));
    }

    #[test]
    fn test_short_sentences_filtered() {
        let docs = vec![Document::new(
            "d0",
            vec![
                sent("budget deficit", 0, 0), // 2 tokens < 5
                sent("budget deficit grew sharply last year", 1, 0),
            ],
        )];
        let problem = Problem::new("p", docs);

        let config = SummConfig::default().with_min_concept_count(1);
        let strategy = FrequencyWeighting::new(UnitMode::Bigram, config);
        let weights = strategy.compute_weights(&problem).unwrap();

        // The short sentence contributes nothing, so the count is 1.
        assert_eq!(weights[&Concept::new(["budget", "deficit"])], 1.0);
    }

    #[test]
    fn test_duplicate_sentences_counted_once() {
        let docs = vec![Document::new(
            "d0",
            vec![
                sent("budget deficit grew sharply last year", 0, 0),
                sent("budget deficit grew sharply last year", 1, 0),
            ],
        )];
        let problem = Problem::new("p", docs);

        let config = SummConfig::default().with_min_concept_count(1);
        let strategy = FrequencyWeighting::new(UnitMode::Bigram, config);
        let weights = strategy.compute_weights(&problem).unwrap();

        assert_eq!(weights[&Concept::new(["budget", "deficit"])], 1.0);
    }

    #[test]
    fn test_all_stopword_concepts_pruned() {
        let docs = vec![Document::new(
            "d0",
            vec![
                sent("of the budget deficit it was", 0, 0),
                sent("of the money supply it was", 1, 0),
            ],
        )];
        let problem = Problem::new("p", docs);

        let config = SummConfig::default().with_min_concept_count(1);
        let strategy = FrequencyWeighting::new(UnitMode::Bigram, config);
        let weights = strategy.compute_weights(&problem).unwrap();

        assert!(!weights.contains_key(&Concept::new(["of", "the"])));
        assert!(!weights.contains_key(&Concept::new(["it", "was"])));
        assert!(weights.contains_key(&Concept::new(["budget", "deficit"])));
    }

    #[test]
    fn test_query_filter_drops_irrelevant_sentences() {
        let docs = vec![Document::new(
            "d0",
            vec![
                sent("budget deficit grew sharply last year", 0, 0),
                sent("weather stayed sunny all week long", 1, 0),
            ],
        )];
        let problem = Problem::new("p", docs)
            .with_query(vec!["budget".to_string(), "deficit".to_string()]);

        let config = SummConfig::default().with_min_concept_count(1);
        let strategy = FrequencyWeighting::new(UnitMode::Bigram, config);
        let weights = strategy.compute_weights(&problem).unwrap();

        assert!(weights.contains_key(&Concept::new(["budget", "deficit"])));
        assert!(!weights.contains_key(&Concept::new(["weather", "stayed"])));
    }

    #[test]
    fn test_idempotent() {
        let strategy = FrequencyWeighting::new(UnitMode::Bigram, SummConfig::default());
        let p = problem();
        let a = strategy.compute_weights(&p).unwrap();
        let b = strategy.compute_weights(&p).unwrap();
        assert_eq!(a, b);
    }
}
