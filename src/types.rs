//! Core types for ilpsumm
//!
//! This module defines the fundamental data structures used throughout the
//! library: concepts, sentences, documents, summarization problems, and the
//! run configuration.

use crate::errors::{Result, SummError};
use serde::{Deserialize, Serialize};

// ============================================================================
// Concept
// ============================================================================

/// An ordered tuple of stemmed tokens treated as an atomic unit of
/// information coverage (a word n-gram or skip bigram).
///
/// Equality and hashing are by token-tuple value. Concepts are never
/// mutated after construction. The derived `Ord` (lexicographic over the
/// token tuple) is the deterministic ordering used for concept-id
/// assignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Concept(Vec<String>);

impl Concept {
    /// Create a concept from stemmed tokens
    pub fn new(tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(tokens.into_iter().map(Into::into).collect())
    }

    /// The stemmed tokens making up this concept
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Number of tokens in the concept
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the concept has no tokens
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Concept {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

impl<S: Into<String>> FromIterator<S> for Concept {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// Sentence & Document
// ============================================================================

/// A candidate sentence from a source document.
///
/// Immutable once created. Token length is the stemmed token count, which
/// is also the sentence's cost against the summary length budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    /// The original surface text
    pub original: String,
    /// The stemmed token sequence
    pub stemmed: Vec<String>,
    /// Position of this sentence within its source document (0-based)
    pub order: usize,
    /// Identifier of the source document
    pub source: String,
    /// Index of the source document within the problem's document set
    pub doc_index: usize,
    /// Lexical-overlap similarity to the problem query, if one was computed
    pub query_sim: Option<f64>,
}

impl Sentence {
    /// Create a new sentence
    pub fn new(
        original: impl Into<String>,
        stemmed: Vec<String>,
        order: usize,
        source: impl Into<String>,
        doc_index: usize,
    ) -> Self {
        Self {
            original: original.into(),
            stemmed,
            order,
            source: source.into(),
            doc_index,
            query_sim: None,
        }
    }

    /// Token length (cost against the length budget)
    pub fn length(&self) -> usize {
        self.stemmed.len()
    }

    /// The stemmed tokens joined by single spaces, used as the duplicate key
    pub fn stemmed_key(&self) -> String {
        self.stemmed.join(" ")
    }

    /// Query similarity, defaulting to 1.0 when no query was supplied
    pub fn query_sim_or_default(&self) -> f64 {
        self.query_sim.unwrap_or(1.0)
    }
}

/// A source document: an ordered sequence of sentences with an identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier
    pub id: String,
    /// Sentences in document order
    pub sentences: Vec<Sentence>,
}

impl Document {
    /// Create a document
    pub fn new(id: impl Into<String>, sentences: Vec<Sentence>) -> Self {
        Self {
            id: id.into(),
            sentences,
        }
    }
}

// ============================================================================
// Problem
// ============================================================================

/// A human-authored reference summary used as an oracle signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceSummary {
    /// Annotator identifier (e.g. "A", "B")
    pub annotator: String,
    /// Reference sentences as stemmed token sequences
    pub sentences: Vec<Vec<String>>,
}

/// One summarization problem: a document set, an optional query, and
/// optionally one or more gold summaries keyed by annotator.
///
/// All text arrives pre-stemmed; tokenization is a collaborator concern.
/// Sentence/concept state created for a problem lives for one run and is
/// discarded afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    /// Problem identifier (carried into errors and logs)
    pub id: String,
    /// Source documents
    pub documents: Vec<Document>,
    /// Optional query as a stemmed token sequence
    pub query: Option<Vec<String>>,
    /// Topic title tokens (used by the learned strategy's features)
    pub title: Vec<String>,
    /// Topic narrative tokens (used by the learned strategy's features)
    pub narrative: Vec<String>,
    /// Gold summaries, one per annotator
    pub references: Vec<ReferenceSummary>,
}

impl Problem {
    /// Create a problem over a document set
    pub fn new(id: impl Into<String>, documents: Vec<Document>) -> Self {
        Self {
            id: id.into(),
            documents,
            query: None,
            title: Vec::new(),
            narrative: Vec::new(),
            references: Vec::new(),
        }
    }

    /// Attach a query
    pub fn with_query(mut self, query: Vec<String>) -> Self {
        self.query = Some(query);
        self
    }

    /// Attach topic title tokens
    pub fn with_title(mut self, title: Vec<String>) -> Self {
        self.title = title;
        self
    }

    /// Attach topic narrative tokens
    pub fn with_narrative(mut self, narrative: Vec<String>) -> Self {
        self.narrative = narrative;
        self
    }

    /// Attach a reference summary
    pub fn with_reference(mut self, reference: ReferenceSummary) -> Self {
        self.references.push(reference);
        self
    }

    /// Iterate all sentences across documents in (document, in-document) order
    pub fn sentences(&self) -> impl Iterator<Item = &Sentence> {
        self.documents.iter().flat_map(|d| d.sentences.iter())
    }

    /// Total sentence count across all documents
    pub fn sentence_count(&self) -> usize {
        self.documents.iter().map(|d| d.sentences.len()).sum()
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for one summarization run.
///
/// All knobs are explicit values passed at construction; nothing reads the
/// process environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummConfig {
    /// Summary length budget in tokens
    pub max_length: usize,
    /// Minimum sentence token length; shorter sentences are filtered
    pub min_sentence_length: usize,
    /// Upper bound on candidate sentences considered per problem
    pub max_sentences: usize,
    /// Minimum concept occurrence count for the frequency heuristic;
    /// also the document-count threshold for switching to doc frequency
    pub min_concept_count: usize,
    /// Maximum power-iteration count for reinforcement weighting
    pub max_iterations: usize,
    /// Iterations to force before checking convergence
    pub min_iterations: usize,
    /// Convergence threshold on the sentence-distribution distance
    pub convergence_threshold: f64,
    /// Maximum concepts retained by the query-expansion strategy
    pub max_query_expansion_concepts: usize,
    /// Maximum concepts retained by the learned strategy
    pub max_learned_concepts: usize,
    /// Stopword language code (e.g. "en")
    pub language: String,
}

impl Default for SummConfig {
    fn default() -> Self {
        Self {
            max_length: 100,
            min_sentence_length: 5,
            max_sentences: 10_000,
            min_concept_count: 3,
            max_iterations: 50,
            min_iterations: 1,
            convergence_threshold: 1e-4,
            max_query_expansion_concepts: 65,
            max_learned_concepts: 300,
            language: "en".to_string(),
        }
    }
}

impl SummConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_length == 0 {
            return Err(SummError::configuration("max_length must be > 0"));
        }

        if self.max_iterations == 0 {
            return Err(SummError::configuration("max_iterations must be > 0"));
        }

        if self.min_iterations > self.max_iterations {
            return Err(SummError::configuration(format!(
                "min_iterations ({}) must not exceed max_iterations ({})",
                self.min_iterations, self.max_iterations
            )));
        }

        if self.convergence_threshold <= 0.0 {
            return Err(SummError::configuration(
                "convergence_threshold must be > 0",
            ));
        }

        if self.max_sentences == 0 {
            return Err(SummError::configuration("max_sentences must be > 0"));
        }

        Ok(())
    }

    /// Builder method: set the length budget
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Builder method: set the minimum sentence length
    pub fn with_min_sentence_length(mut self, min: usize) -> Self {
        self.min_sentence_length = min;
        self
    }

    /// Builder method: set the candidate sentence bound
    pub fn with_max_sentences(mut self, max: usize) -> Self {
        self.max_sentences = max;
        self
    }

    /// Builder method: set the minimum concept count
    pub fn with_min_concept_count(mut self, min: usize) -> Self {
        self.min_concept_count = min;
        self
    }

    /// Builder method: set the iteration cap
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Builder method: set the forced minimum iterations
    pub fn with_min_iterations(mut self, min: usize) -> Self {
        self.min_iterations = min;
        self
    }

    /// Builder method: set the convergence threshold
    pub fn with_convergence_threshold(mut self, threshold: f64) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    /// Builder method: set the stopword language
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sent(text: &str, order: usize, doc_index: usize) -> Sentence {
        let stemmed: Vec<String> = text.split_whitespace().map(String::from).collect();
        Sentence::new(text, stemmed, order, format!("doc{doc_index}"), doc_index)
    }

    #[test]
    fn test_concept_equality_by_value() {
        let a = Concept::new(["he", "said"]);
        let b: Concept = ["he", "said"].into_iter().collect();
        let c = Concept::new(["she", "said"]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "he said");
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_concept_ordering_is_lexicographic() {
        let mut concepts = vec![
            Concept::new(["dog"]),
            Concept::new(["cat", "sat"]),
            Concept::new(["cat"]),
        ];
        concepts.sort();
        assert_eq!(concepts[0], Concept::new(["cat"]));
        assert_eq!(concepts[1], Concept::new(["cat", "sat"]));
        assert_eq!(concepts[2], Concept::new(["dog"]));
    }

    #[test]
    fn test_sentence_length_and_key() {
        let s = sent("the cat sat", 0, 0);
        assert_eq!(s.length(), 3);
        assert_eq!(s.stemmed_key(), "the cat sat");
        assert!((s.query_sim_or_default() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_problem_sentence_iteration_order() {
        let d0 = Document::new("a", vec![sent("one two three", 0, 0)]);
        let d1 = Document::new(
            "b",
            vec![sent("four five six", 0, 1), sent("seven eight nine", 1, 1)],
        );
        let problem = Problem::new("p1", vec![d0, d1]);

        let originals: Vec<_> = problem.sentences().map(|s| s.original.as_str()).collect();
        assert_eq!(
            originals,
            vec!["one two three", "four five six", "seven eight nine"]
        );
        assert_eq!(problem.sentence_count(), 3);
    }

    #[test]
    fn test_config_validation() {
        let config = SummConfig::default();
        assert!(config.validate().is_ok());

        let bad = SummConfig::default().with_max_length(0);
        assert!(bad.validate().is_err());

        let bad = SummConfig::default()
            .with_max_iterations(2)
            .with_min_iterations(5);
        assert!(bad.validate().is_err());

        let bad = SummConfig::default().with_convergence_threshold(0.0);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = SummConfig::default().with_max_length(250);
        let json = serde_json::to_string(&config).unwrap();
        let back: SummConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_length, 250);
        assert_eq!(back.min_sentence_length, config.min_sentence_length);
    }
}
