//! Sentence selection and concept indexing
//!
//! Filters candidate sentences, restricts their concepts to the weighted
//! domain, and builds the dense concept index plus the incidence tables
//! the coverage model is assembled from.

use crate::concepts::{extract_units, UnitMode};
use crate::errors::{Result, SummError};
use crate::types::{Concept, Document, Sentence, SummConfig};
use crate::weighting::ConceptWeights;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Filters sentences and indexes their weighted concepts.
///
/// Uses the same unit selector as the weighting strategy that produced the
/// weight map; mixing modes silently yields empty intersections.
#[derive(Debug, Clone)]
pub struct SentenceSelector {
    mode: UnitMode,
    config: SummConfig,
}

/// The output of sentence selection: surviving sentences, the dense
/// concept index, per-sentence concept ids, and the pruned weights.
///
/// Concept ids are assigned by lexicographic order of the concept token
/// tuple, so the index is deterministic across runs and platforms. Ids
/// form the contiguous range `0..concept_count()`, and every id has at
/// least one covering sentence by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceSelection {
    /// Sentences that survived filtering, in original source order
    pub sentences: Vec<Sentence>,
    /// For each sentence, the sorted distinct ids of concepts it covers
    pub sentence_concepts: Vec<Vec<u32>>,
    /// Dense index: position = concept id
    pub concepts: Vec<Concept>,
    /// Weight per concept id
    pub weights: Vec<f64>,
    /// Inverse incidence: for each concept id, the indices of covering
    /// sentences in ascending order
    pub covering: Vec<Vec<usize>>,
}

impl SentenceSelector {
    /// Create a selector over the given unit mode and configuration
    pub fn new(mode: UnitMode, config: SummConfig) -> Self {
        Self { mode, config }
    }

    /// Filter sentences and build the concept index.
    ///
    /// Sentences shorter than the minimum length and exact stemmed-text
    /// duplicates are dropped silently (first occurrence wins), as are
    /// sentences covering no weighted concept. Only the first
    /// `max_sentences` candidates are examined at all; filters apply
    /// within that window, so dropped candidates still consume it.
    pub fn select(&self, documents: &[Document], weights: &ConceptWeights) -> SentenceSelection {
        let mut sentences: Vec<Sentence> = Vec::new();
        let mut sentence_units: Vec<Vec<Concept>> = Vec::new();
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut examined = 0usize;

        'documents: for doc in documents {
            for sentence in &doc.sentences {
                if examined >= self.config.max_sentences {
                    break 'documents;
                }
                examined += 1;
                if sentence.length() < self.config.min_sentence_length {
                    continue;
                }
                if !seen.insert(sentence.stemmed_key()) {
                    continue;
                }

                let mut units: Vec<Concept> = extract_units(&sentence.stemmed, self.mode)
                    .into_iter()
                    .filter(|unit| weights.contains_key(unit))
                    .collect();
                units.sort_unstable();
                units.dedup();
                if units.is_empty() {
                    continue;
                }

                sentences.push(sentence.clone());
                sentence_units.push(units);
            }
        }

        // Dense ids by lexicographic concept order, never by hash
        // iteration order.
        let mut concepts: Vec<Concept> = sentence_units
            .iter()
            .flat_map(|units| units.iter().cloned())
            .collect();
        concepts.sort_unstable();
        concepts.dedup();

        let ids: FxHashMap<&Concept, u32> = concepts
            .iter()
            .enumerate()
            .map(|(id, concept)| (concept, id as u32))
            .collect();

        let pruned_weights: Vec<f64> = concepts
            .iter()
            .map(|concept| weights.get(concept).copied().unwrap_or(0.0))
            .collect();

        let mut sentence_concepts: Vec<Vec<u32>> = Vec::with_capacity(sentence_units.len());
        let mut covering: Vec<Vec<usize>> = vec![Vec::new(); concepts.len()];
        for (sent_idx, units) in sentence_units.iter().enumerate() {
            let mut concept_ids: Vec<u32> = units.iter().map(|unit| ids[unit]).collect();
            concept_ids.sort_unstable();
            for &id in &concept_ids {
                covering[id as usize].push(sent_idx);
            }
            sentence_concepts.push(concept_ids);
        }

        SentenceSelection {
            sentences,
            sentence_concepts,
            concepts,
            weights: pruned_weights,
            covering,
        }
    }

    /// The unit mode this selector extracts with
    pub fn mode(&self) -> UnitMode {
        self.mode
    }
}

impl SentenceSelection {
    /// Number of surviving sentences
    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    /// Number of indexed concepts
    pub fn concept_count(&self) -> usize {
        self.concepts.len()
    }

    /// True when no sentence survived filtering
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Resolve a concept to its dense id
    pub fn concept_id(&self, concept: &Concept) -> Option<u32> {
        self.concepts.binary_search(concept).ok().map(|i| i as u32)
    }

    /// Check the structural invariants of the index.
    ///
    /// Every concept id must have at least one covering sentence, and the
    /// parallel id-indexed vectors must agree on length. A violation is a
    /// programming error in selection, not a data condition.
    pub fn verify(&self) -> Result<()> {
        if self.weights.len() != self.concepts.len() || self.covering.len() != self.concepts.len() {
            return Err(SummError::internal(format!(
                "concept index length mismatch: {} concepts, {} weights, {} covering lists",
                self.concepts.len(),
                self.weights.len(),
                self.covering.len()
            )));
        }
        for (id, sentences) in self.covering.iter().enumerate() {
            debug_assert!(
                !sentences.is_empty(),
                "concept id {id} indexed with zero covering sentences"
            );
            if sentences.is_empty() {
                return Err(SummError::dangling_concept(
                    id as u32,
                    self.concepts[id].to_string(),
                ));
            }
        }
        Ok(())
    }
}
