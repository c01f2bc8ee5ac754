//! Gold-summary overlap weighting
//!
//! Weights concepts by the number of reference summaries in which they
//! appear (each concept counted at most once per reference). Only used to
//! establish an oracle upper bound for maximum-recall experiments, never
//! for blind summarization.

use crate::concepts::{extract_units, UnitMode};
use crate::errors::{Result, SummError};
use crate::types::{Concept, Problem};
use crate::weighting::{ConceptWeights, WeightingStrategy};
use rustc_hash::FxHashSet;

/// Oracle weighting from human reference summaries
#[derive(Debug, Clone)]
pub struct GoldOverlapWeighting {
    mode: UnitMode,
}

impl GoldOverlapWeighting {
    /// Create the strategy for the given unit mode
    pub fn new(mode: UnitMode) -> Self {
        Self { mode }
    }
}

impl WeightingStrategy for GoldOverlapWeighting {
    fn name(&self) -> &'static str {
        "gold_overlap"
    }

    fn compute_weights(&self, problem: &Problem) -> Result<ConceptWeights> {
        if problem.references.is_empty() {
            return Err(SummError::no_gold_data(
                &problem.id,
                "gold overlap weighting requires at least one reference summary",
            ));
        }

        let mut weights = ConceptWeights::default();

        for reference in &problem.references {
            // Distinct concepts per reference: each counts at most once.
            let mut reference_concepts: FxHashSet<Concept> = FxHashSet::default();
            for sentence in &reference.sentences {
                reference_concepts.extend(extract_units(sentence, self.mode));
            }

            for concept in reference_concepts {
                *weights.entry(concept).or_insert(0.0) += 1.0;
            }
        }

        Ok(weights)
    }
}
