//! Learned weighting via an external classifier
//!
//! Each concept occurrence is described by a fixed feature record; the
//! classifier collaborator scores all occurrences, and a concept's weight
//! is its mean occurrence score times its raw occurrence frequency. Only
//! the strongest concepts survive pruning.
//!
//! The delimited record format is consumed verbatim by the external tool
//! and must be reproduced exactly.

use crate::classifier::ClassifierPort;
use crate::concepts::{extract_units, UnitMode};
use crate::errors::Result;
use crate::nlp::{LexicalOverlap, Similarity, StopwordFilter};
use crate::types::{Concept, Problem, SummConfig};
use crate::weighting::{ConceptWeights, WeightingStrategy};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One concept occurrence's feature vector, as submitted to the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// The concept tokens joined by spaces
    pub ngram: String,
    /// Document frequency over the problem's document count
    pub doc_freq_ratio: f64,
    /// Sentence frequency over the problem's sentence count
    pub sent_freq_ratio: f64,
    /// Fraction of the concept's tokens that are stopwords
    pub stopword_ratio: f64,
    /// Similarity of the containing sentence to the query
    pub sentence_sim: f64,
    /// Position of the containing sentence within its document
    pub sentence_order: usize,
    /// Source document identifier of the containing sentence
    pub sentence_source: String,
    /// Token length of the containing sentence
    pub sentence_length: usize,
    /// Similarity of the concept tokens to the topic title
    pub title_sim: f64,
    /// Similarity of the concept tokens to the topic narrative
    pub narrative_sim: f64,
    /// Training label: 1 when the concept appears in any gold summary
    pub label: u8,
}

impl FeatureRecord {
    /// Serialize to the fixed delimited line format consumed by the
    /// external classifier. The trailing period is part of the format.
    pub fn to_line(&self) -> String {
        format!(
            "{}, {:.2}, {:.2}, {:.2}, {:.2}, {}, {}, {}, {:.2}, {:.2}, {}.",
            self.ngram,
            self.doc_freq_ratio,
            self.sent_freq_ratio,
            self.stopword_ratio,
            self.sentence_sim,
            self.sentence_order,
            self.sentence_source,
            self.sentence_length,
            self.title_sim,
            self.narrative_sim,
            self.label
        )
    }
}

/// Per-problem frequency statistics backing the feature ratios
struct UnitStats {
    doc_freq: FxHashMap<Concept, usize>,
    sent_freq: FxHashMap<Concept, usize>,
    raw_freq: FxHashMap<Concept, usize>,
    num_docs: usize,
    num_sents: usize,
}

/// Weighting strategy delegating occurrence scoring to a classifier port
pub struct LearnedWeighting {
    mode: UnitMode,
    config: SummConfig,
    classifier: Arc<dyn ClassifierPort>,
    stopwords: StopwordFilter,
    similarity: Arc<dyn Similarity>,
}

impl LearnedWeighting {
    /// Create the strategy with its classifier collaborator
    pub fn new(
        mode: UnitMode,
        config: SummConfig,
        classifier: Arc<dyn ClassifierPort>,
    ) -> Self {
        let stopwords = StopwordFilter::new(&config.language);
        Self {
            mode,
            config,
            classifier,
            stopwords,
            similarity: Arc::new(LexicalOverlap),
        }
    }

    /// Override the similarity collaborator
    pub fn with_similarity(mut self, similarity: Arc<dyn Similarity>) -> Self {
        self.similarity = similarity;
        self
    }

    fn unit_stats(&self, problem: &Problem) -> UnitStats {
        let mut doc_freq: FxHashMap<Concept, usize> = FxHashMap::default();
        let mut sent_freq: FxHashMap<Concept, usize> = FxHashMap::default();
        let mut raw_freq: FxHashMap<Concept, usize> = FxHashMap::default();
        let mut num_sents = 0;

        for doc in &problem.documents {
            let mut doc_counts: FxHashMap<Concept, usize> = FxHashMap::default();

            for sentence in &doc.sentences {
                num_sents += 1;
                let units = extract_units(&sentence.stemmed, self.mode);
                for unit in &units {
                    *doc_counts.entry(unit.clone()).or_insert(0) += 1;
                }
                // Sentence frequency counts each unit once per sentence.
                let mut distinct: Vec<&Concept> = units.iter().collect();
                distinct.sort();
                distinct.dedup();
                for unit in distinct {
                    *sent_freq.entry(unit.clone()).or_insert(0) += 1;
                }
            }

            for (unit, count) in doc_counts {
                *doc_freq.entry(unit.clone()).or_insert(0) += 1;
                *raw_freq.entry(unit).or_insert(0) += count;
            }
        }

        UnitStats {
            doc_freq,
            sent_freq,
            raw_freq,
            num_docs: problem.documents.len(),
            num_sents,
        }
    }

    /// Gold concept counts across annotators, for training labels
    fn gold_concepts(&self, problem: &Problem) -> FxHashMap<Concept, usize> {
        let mut gold: FxHashMap<Concept, usize> = FxHashMap::default();
        for reference in &problem.references {
            let mut annotator: Vec<Concept> = Vec::new();
            for sentence in &reference.sentences {
                annotator.extend(extract_units(sentence, self.mode));
            }
            annotator.sort();
            annotator.dedup();
            for concept in annotator {
                *gold.entry(concept).or_insert(0) += 1;
            }
        }
        gold
    }

    /// Build one feature record per concept occurrence, plus the parallel
    /// concept list. Records whose tokens are all stopwords are skipped.
    ///
    /// With `train` set, labels come from the gold summaries and each
    /// record is replicated once per extra gold count, giving
    /// better-supported concepts more training mass — the exact artifact
    /// the external trainer expects.
    pub fn feature_records(
        &self,
        problem: &Problem,
        train: bool,
    ) -> (Vec<FeatureRecord>, Vec<Concept>) {
        let stats = self.unit_stats(problem);
        let gold = if train {
            self.gold_concepts(problem)
        } else {
            FxHashMap::default()
        };

        let query = problem.query.as_deref().unwrap_or(&[]);

        let mut records = Vec::new();
        let mut concepts = Vec::new();

        for sentence in problem.sentences() {
            let sentence_sim = sentence
                .query_sim
                .unwrap_or_else(|| self.similarity.similarity(&sentence.stemmed, query));

            for unit in extract_units(&sentence.stemmed, self.mode) {
                let stopword_ratio = self.stopwords.stopword_ratio(&unit);
                if (stopword_ratio - 1.0).abs() < f64::EPSILON {
                    continue;
                }

                let gold_count = gold.get(&unit).copied().unwrap_or(0);
                let record = FeatureRecord {
                    ngram: unit.to_string(),
                    doc_freq_ratio: stats.doc_freq.get(&unit).copied().unwrap_or(0) as f64
                        / stats.num_docs.max(1) as f64,
                    sent_freq_ratio: stats.sent_freq.get(&unit).copied().unwrap_or(0) as f64
                        / stats.num_sents.max(1) as f64,
                    stopword_ratio,
                    sentence_sim,
                    sentence_order: sentence.order,
                    sentence_source: sentence.source.clone(),
                    sentence_length: sentence.length(),
                    title_sim: self.similarity.similarity(unit.tokens(), &problem.title),
                    narrative_sim: self
                        .similarity
                        .similarity(unit.tokens(), &problem.narrative),
                    label: if train { u8::from(gold_count > 0) } else { 0 },
                };

                // Replicate per extra gold count when training.
                let copies = if train { gold_count.max(1) } else { 1 };
                for _ in 0..copies {
                    records.push(record.clone());
                    concepts.push(unit.clone());
                }
            }
        }

        (records, concepts)
    }

    /// The persisted training/scoring artifact: one line per record
    pub fn feature_lines(&self, problem: &Problem, train: bool) -> Vec<String> {
        let (records, _) = self.feature_records(problem, train);
        records.iter().map(FeatureRecord::to_line).collect()
    }
}

impl std::fmt::Debug for LearnedWeighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearnedWeighting")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl WeightingStrategy for LearnedWeighting {
    fn name(&self) -> &'static str {
        "learned"
    }

    fn compute_weights(&self, problem: &Problem) -> Result<ConceptWeights> {
        let stats = self.unit_stats(problem);
        let (records, concepts) = self.feature_records(problem, false);
        if records.is_empty() {
            return Ok(ConceptWeights::default());
        }

        let scores = self.classifier.score(&records)?;

        // Sum and collect per-concept occurrence scores.
        let mut summed: FxHashMap<Concept, f64> = FxHashMap::default();
        let mut occurrences: FxHashMap<Concept, (f64, usize)> = FxHashMap::default();
        for (concept, &score) in concepts.iter().zip(scores.iter()) {
            *summed.entry(concept.clone()).or_insert(0.0) += score;
            let entry = occurrences.entry(concept.clone()).or_insert((0.0, 0));
            entry.0 += score;
            entry.1 += 1;
        }

        // Rank by summed score, deterministic tie-break on the tuple.
        let mut ranked: Vec<(Concept, f64)> = summed.into_iter().collect();
        ranked.sort_by(|(ca, wa), (cb, wb)| {
            wb.partial_cmp(wa)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| ca.cmp(cb))
        });

        let mut weights = ConceptWeights::default();
        for (concept, total) in ranked.into_iter().take(self.config.max_learned_concepts) {
            // Retention stops at the first non-positive summed score.
            if total <= 0.0 {
                break;
            }
            let (sum, count) = occurrences[&concept];
            let mean = sum / count as f64;
            let raw = stats.raw_freq.get(&concept).copied().unwrap_or(0) as f64;
            weights.insert(concept, mean * raw);
        }

        Ok(weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Document, ReferenceSummary, Sentence};

    fn sent(text: &str, order: usize, doc_index: usize) -> Sentence {
        let stemmed: Vec<String> = text.split_whitespace().map(String::from).collect();
        Sentence::new(text, stemmed, order, format!("doc{doc_index}"), doc_index)
    }

    fn problem() -> Problem {
        let docs = vec![Document::new(
            "d0",
            vec![
                sent("budget deficit grew sharply", 0, 0),
                sent("officials discussed budget deficit", 1, 0),
            ],
        )];
        Problem::new("p-learn", docs)
            .with_title(vec!["budget".into()])
            .with_narrative(vec!["deficit".into(), "spending".into()])
    }

    /// Deterministic stub: score = number of characters in the ngram
    /// minus a fixed offset, so some concepts score non-positive.
    struct StubClassifier {
        offset: f64,
    }

    impl ClassifierPort for StubClassifier {
        fn score(&self, records: &[FeatureRecord]) -> Result<Vec<f64>> {
            Ok(records
                .iter()
                .map(|r| r.ngram.len() as f64 - self.offset)
                .collect())
        }
    }

    #[test]
    fn test_feature_line_format() {
        let record = FeatureRecord {
            ngram: "budget deficit".to_string(),
            doc_freq_ratio: 1.0,
            sent_freq_ratio: 0.5,
            stopword_ratio: 0.0,
            sentence_sim: 0.75,
            sentence_order: 3,
            sentence_source: "APW19990101".to_string(),
            sentence_length: 24,
            title_sim: 0.5,
            narrative_sim: 0.1,
            label: 1,
        };

        assert_eq!(
            record.to_line(),
            "budget deficit, 1.00, 0.50, 0.00, 0.75, 3, APW19990101, 24, 0.50, 0.10, 1."
        );
    }

    #[test]
    fn test_all_stopword_occurrences_skipped() {
        let docs = vec![Document::new(
            "d0",
            vec![sent("of the budget deficit", 0, 0)],
        )];
        let p = Problem::new("p", docs);

        let strategy = LearnedWeighting::new(
            UnitMode::Bigram,
            SummConfig::default(),
            Arc::new(StubClassifier { offset: 0.0 }),
        );
        let (records, concepts) = strategy.feature_records(&p, false);

        assert!(concepts.iter().all(|c| c != &Concept::new(["of", "the"])));
        assert_eq!(records.len(), concepts.len());
    }

    #[test]
    fn test_weight_is_mean_times_raw_frequency() {
        let strategy = LearnedWeighting::new(
            UnitMode::Bigram,
            SummConfig::default(),
            Arc::new(StubClassifier { offset: 0.0 }),
        );
        let weights = strategy.compute_weights(&problem()).unwrap();

        // "budget deficit" occurs twice; stub scores it 14 each time,
        // so weight = mean 14 × raw frequency 2.
        let w = weights[&Concept::new(["budget", "deficit"])];
        assert!((w - 28.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_scores_pruned() {
        // Offset larger than every ngram length → all scores negative.
        let strategy = LearnedWeighting::new(
            UnitMode::Bigram,
            SummConfig::default(),
            Arc::new(StubClassifier { offset: 1000.0 }),
        );
        let weights = strategy.compute_weights(&problem()).unwrap();
        assert!(weights.is_empty());
    }

    #[test]
    fn test_top_n_truncation() {
        let mut config = SummConfig::default();
        config.max_learned_concepts = 1;

        let strategy = LearnedWeighting::new(
            UnitMode::Bigram,
            config,
            Arc::new(StubClassifier { offset: 0.0 }),
        );
        let weights = strategy.compute_weights(&problem()).unwrap();
        assert_eq!(weights.len(), 1);
    }

    #[test]
    fn test_training_labels_and_replication() {
        let p = problem().with_reference(ReferenceSummary {
            annotator: "A".to_string(),
            sentences: vec![vec!["budget".into(), "deficit".into()]],
        });

        let strategy = LearnedWeighting::new(
            UnitMode::Bigram,
            SummConfig::default(),
            Arc::new(StubClassifier { offset: 0.0 }),
        );
        let (records, _) = strategy.feature_records(&p, true);

        let gold_lines: Vec<_> = records
            .iter()
            .filter(|r| r.ngram == "budget deficit")
            .collect();
        assert!(!gold_lines.is_empty());
        assert!(gold_lines.iter().all(|r| r.label == 1));

        let other: Vec<_> = records
            .iter()
            .filter(|r| r.ngram == "grew sharply")
            .collect();
        assert!(other.iter().all(|r| r.label == 0));
    }
}
