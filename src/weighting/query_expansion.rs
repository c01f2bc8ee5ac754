//! Query-expansion weighting
//!
//! Runs the same sentence↔concept alternation as mutual reinforcement, but
//! seeds sentence values from query similarity instead of a uniform prior
//! and stops after exactly two iterations. This models a one-step query
//! expansion rather than a fixed point: concepts near the query pull in
//! their co-occurring concepts, and no further.

use crate::concepts::{extract_units, UnitMode};
use crate::errors::Result;
use crate::nlp::{LexicalOverlap, Similarity, StopwordFilter};
use crate::types::{Concept, Problem, SummConfig};
use crate::weighting::{normalize, ConceptWeights, WeightingStrategy};
use std::sync::Arc;
use tracing::debug;

/// Fixed iteration count: seed propagation plus one expansion step
const EXPANSION_ITERATIONS: usize = 2;

/// Query-seeded two-step reinforcement weighting
pub struct QueryExpansionWeighting {
    mode: UnitMode,
    config: SummConfig,
    stopwords: StopwordFilter,
    similarity: Arc<dyn Similarity>,
}

impl QueryExpansionWeighting {
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

    fn seed(&self, problem: &Problem, stemmed: &[String], cached: Option<f64>) -> f64 {
        match &problem.query {
            // No query to expand: every sentence seeds equally.
            None => 1.0,
            Some(query) => {
                cached.unwrap_or_else(|| self.similarity.similarity(stemmed, query))
            }
        }
    }
}

impl std::fmt::Debug for QueryExpansionWeighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExpansionWeighting")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl WeightingStrategy for QueryExpansionWeighting {
    fn name(&self) -> &'static str {
        "query_expansion"
    }

    fn compute_weights(&self, problem: &Problem) -> Result<ConceptWeights> {
        // All sentences participate; the query shapes the seed, not the set.
        let mut sent_units: Vec<Vec<Concept>> = Vec::new();
        let mut sent_values: Vec<f64> = Vec::new();

        for sentence in problem.sentences() {
            let mut units: Vec<Concept> = extract_units(&sentence.stemmed, self.mode)
                .into_iter()
                .filter(|u| !self.stopwords.is_all_stopwords(u))
                .collect();
            units.sort();
            units.dedup();
            if units.is_empty() {
                continue;
            }

            sent_values.push(self.seed(problem, &sentence.stemmed, sentence.query_sim));
            sent_units.push(units);
        }

        if sent_units.is_empty() {
            return Ok(ConceptWeights::default());
        }

        let total: f64 = sent_values.iter().sum();
        if total > 0.0 {
            for value in &mut sent_values {
                *value /= total;
            }
        } else {
            // Degenerate seed (no sentence overlaps the query): fall back
            // to a uniform prior rather than propagating zeros.
            let uniform = 1.0 / sent_values.len() as f64;
            sent_values.fill(uniform);
        }

        let mut unit_values = ConceptWeights::default();

        for iteration in 1..=EXPANSION_ITERATIONS {
            unit_values.clear();
            for (units, &value) in sent_units.iter().zip(sent_values.iter()) {
                for unit in units {
                    *unit_values.entry(unit.clone()).or_insert(0.0) += value;
                }
            }
            normalize(&mut unit_values);

            for (units, value) in sent_units.iter().zip(sent_values.iter_mut()) {
                *value = units.iter().map(|u| unit_values[u]).sum();
            }
            let total: f64 = sent_values.iter().sum();
            if total > 0.0 {
                for value in &mut sent_values {
                    *value /= total;
                }
            }

            debug!(iteration, concepts = unit_values.len(), "expansion step");
        }

        // Keep only the strongest concepts, deterministically ordered.
        let max_concepts = self.config.max_query_expansion_concepts;
        if unit_values.len() > max_concepts {
            let mut ranked: Vec<(Concept, f64)> = unit_values.into_iter().collect();
            ranked.sort_by(|(ca, wa), (cb, wb)| {
                wb.partial_cmp(wa)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| ca.cmp(cb))
            });
            ranked.truncate(max_concepts);
            unit_values = ranked.into_iter().collect();
        }

        Ok(unit_values)
    }
}
