//! Mutual-reinforcement weighting
//!
//! Power iteration over a bipartite graph linking sentences (or documents)
//! to the concepts they contain. Importance alternates between the two
//! sides with renormalization after every half-step, until the distance
//! between consecutive sentence distributions falls below the threshold
//! or the iteration cap is reached.

use crate::concepts::{extract_units, UnitMode};
use crate::errors::Result;
use crate::nlp::{LexicalOverlap, Similarity, StopwordFilter};
use crate::types::{Concept, Problem, SummConfig};
use crate::weighting::{
    euclidean_distance, kl_divergence, normalize, ConceptWeights, WeightingStrategy,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Granularity of the reinforcement graph's non-concept side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReinforcementLevel {
    /// One node per candidate sentence (finer, KL-converged)
    #[default]
    Sentence,
    /// One node per document (coarser, Euclidean-converged)
    Document,
}

/// Whether the node update divides by the node's concept count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MassMode {
    /// Divide by the node's concept count; total mass is conserved
    /// before renormalization
    Conserving,
    /// Plain sum; nodes with many concepts amplify their mass
    #[default]
    Amplifying,
}

/// Distance metric between consecutive node distributions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    Euclidean,
    KlDivergence,
}

/// One reinforcement node: its distinct non-stopword concepts,
/// deterministically ordered.
struct Node {
    units: Vec<Concept>,
}

/// Mutual-reinforcement weighting over a sentence↔concept (or
/// document↔concept) bipartite graph
pub struct MutualReinforcementWeighting {
    mode: UnitMode,
    config: SummConfig,
    level: ReinforcementLevel,
    mass: MassMode,
    distance: DistanceMetric,
    min_iterations: usize,
    stopwords: StopwordFilter,
    similarity: Arc<dyn Similarity>,
}

impl MutualReinforcementWeighting {
    /// Create the sentence-level strategy with the level's default knobs
    pub fn new(mode: UnitMode, config: SummConfig) -> Self {
        let stopwords = StopwordFilter::new(&config.language);
        let min_iterations = config.min_iterations;
        Self {
            mode,
            config,
            level: ReinforcementLevel::Sentence,
            mass: MassMode::Amplifying,
            distance: DistanceMetric::KlDivergence,
            min_iterations,
            stopwords,
            similarity: Arc::new(LexicalOverlap),
        }
    }

    /// Switch the graph granularity; the document level defaults to
    /// Euclidean distance, mass conservation, and a 2-iteration floor.
    pub fn with_level(mut self, level: ReinforcementLevel) -> Self {
        self.level = level;
        if level == ReinforcementLevel::Document {
            self.distance = DistanceMetric::Euclidean;
            self.mass = MassMode::Conserving;
            self.min_iterations = self.min_iterations.max(2);
        }
        self
    }

    /// Override the mass mode
    pub fn with_mass_mode(mut self, mass: MassMode) -> Self {
        self.mass = mass;
        self
    }

    /// Override the distance metric
    pub fn with_distance(mut self, distance: DistanceMetric) -> Self {
        self.distance = distance;
        self
    }

    /// Override the forced minimum iterations before convergence checks
    pub fn with_min_iterations(mut self, min: usize) -> Self {
        self.min_iterations = min;
        self
    }

    /// Override the similarity collaborator
    pub fn with_similarity(mut self, similarity: Arc<dyn Similarity>) -> Self {
        self.similarity = similarity;
        self
    }

    /// Collect reinforcement nodes, restricted to sentences with positive
    /// query similarity (or all sentences when there is no query).
    fn build_nodes(&self, problem: &Problem) -> Vec<Node> {
        let mut nodes = Vec::new();

        match self.level {
            ReinforcementLevel::Sentence => {
                for sentence in problem.sentences() {
                    if !self.passes_query(problem, &sentence.stemmed, sentence.query_sim) {
                        continue;
                    }
                    let units = self.distinct_units(&sentence.stemmed);
                    if !units.is_empty() {
                        nodes.push(Node { units });
                    }
                }
            }
            ReinforcementLevel::Document => {
                for doc in &problem.documents {
                    let mut all = Vec::new();
                    for sentence in &doc.sentences {
                        if !self.passes_query(problem, &sentence.stemmed, sentence.query_sim) {
                            continue;
                        }
                        all.extend(self.distinct_units(&sentence.stemmed));
                    }
                    all.sort();
                    all.dedup();
                    if !all.is_empty() {
                        nodes.push(Node { units: all });
                    }
                }
            }
        }

        nodes
    }

    fn passes_query(&self, problem: &Problem, stemmed: &[String], cached: Option<f64>) -> bool {
        match &problem.query {
            None => true,
            Some(query) => {
                let sim = cached.unwrap_or_else(|| self.similarity.similarity(stemmed, query));
                sim > 0.0
            }
        }
    }

    fn distinct_units(&self, stemmed: &[String]) -> Vec<Concept> {
        let mut units: Vec<Concept> = extract_units(stemmed, self.mode)
            .into_iter()
            .filter(|u| !self.stopwords.is_all_stopwords(u))
            .collect();
        units.sort();
        units.dedup();
        units
    }

    /// Run the alternating-normalization fixed point and return the final
    /// concept distribution.
    fn iterate(&self, nodes: &[Node]) -> ConceptWeights {
        if nodes.is_empty() {
            return ConceptWeights::default();
        }

        // Uniform prior over nodes.
        let uniform = 1.0 / nodes.len() as f64;
        let mut node_values: Vec<f64> = vec![uniform; nodes.len()];
        let mut unit_values = ConceptWeights::default();

        let mut converged = false;
        for iteration in 1..=self.config.max_iterations {
            let prev: FxHashMap<usize, f64> =
                node_values.iter().copied().enumerate().collect();

            // Concept side: sum of owning-node values, renormalized.
            unit_values.clear();
            for (node, &value) in nodes.iter().zip(node_values.iter()) {
                for unit in &node.units {
                    *unit_values.entry(unit.clone()).or_insert(0.0) += value;
                }
            }
            normalize(&mut unit_values);

            // Node side: sum of contained-concept values, optionally
            // divided by the node's concept count, renormalized.
            for (node, value) in nodes.iter().zip(node_values.iter_mut()) {
                let mut sum = 0.0;
                for unit in &node.units {
                    sum += unit_values[unit];
                }
                if self.mass == MassMode::Conserving {
                    sum /= node.units.len() as f64;
                }
                *value = sum;
            }
            let total: f64 = node_values.iter().sum();
            if total > 0.0 {
                for value in &mut node_values {
                    *value /= total;
                }
            }

            if iteration < self.min_iterations {
                continue;
            }

            let current: FxHashMap<usize, f64> =
                node_values.iter().copied().enumerate().collect();
            let dist = match self.distance {
                DistanceMetric::Euclidean => euclidean_distance(&prev, &current),
                DistanceMetric::KlDivergence => kl_divergence(&prev, &current),
            };
            debug!(iteration, distance = dist, "reinforcement step");

            if dist < self.config.convergence_threshold {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                cap = self.config.max_iterations,
                "reinforcement hit the iteration cap without converging"
            );
        }
        unit_values
    }
}

impl std::fmt::Debug for MutualReinforcementWeighting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutualReinforcementWeighting")
            .field("mode", &self.mode)
            .field("level", &self.level)
            .field("mass", &self.mass)
            .field("distance", &self.distance)
            .finish_non_exhaustive()
    }
}

impl WeightingStrategy for MutualReinforcementWeighting {
    fn name(&self) -> &'static str {
        "mutual_reinforcement"
    }

    fn compute_weights(&self, problem: &Problem) -> Result<ConceptWeights> {
        let nodes = self.build_nodes(problem);
        Ok(self.iterate(&nodes))
    }
}
