//! Concept-weighting strategies
//!
//! Each strategy consumes a problem's documents (and, for some variants,
//! the query or gold summaries) and produces a mapping concept → weight.
//! The set of variants is closed and selected by configuration:
//!
//! - [`GoldOverlapWeighting`] — oracle upper bound from reference summaries
//! - [`FrequencyWeighting`] — document/raw frequency heuristic
//! - [`MutualReinforcementWeighting`] — sentence↔concept power iteration
//! - [`QueryExpansionWeighting`] — two-step query-seeded reinforcement
//! - [`LearnedWeighting`] — external classifier scores per occurrence

pub mod frequency;
pub mod gold_overlap;
pub mod learned;
pub mod query_expansion;
pub mod reinforcement;

pub use frequency::FrequencyWeighting;
pub use gold_overlap::GoldOverlapWeighting;
pub use learned::{FeatureRecord, LearnedWeighting};
pub use query_expansion::QueryExpansionWeighting;
pub use reinforcement::{DistanceMetric, MassMode, MutualReinforcementWeighting, ReinforcementLevel};

use crate::concepts::UnitMode;
use crate::errors::Result;
use crate::types::{Concept, Problem, SummConfig};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A concept → non-negative weight map, scoped to one summarization run
pub type ConceptWeights = FxHashMap<Concept, f64>;

/// Common contract for all weighting strategies.
///
/// Fails with a typed error if required inputs (gold summaries, query)
/// are absent for the variant.
pub trait WeightingStrategy: Send + Sync {
    /// Strategy name, carried into errors and logs
    fn name(&self) -> &'static str;

    /// Compute concept weights for one problem
    fn compute_weights(&self, problem: &Problem) -> Result<ConceptWeights>;
}

/// Which weighting strategy to run, selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Gold-summary overlap (oracle upper bound)
    GoldOverlap,
    /// Frequency/doc-frequency heuristic (default)
    #[default]
    Frequency,
    /// Sentence-level mutual reinforcement
    MutualReinforcement,
    /// Query-seeded two-step expansion
    QueryExpansion,
}

/// Build the configured strategy.
///
/// `LearnedWeighting` is constructed directly because it needs a
/// classifier port; it is not part of this config-only factory.
pub fn strategy_for(kind: StrategyKind, mode: UnitMode, config: &SummConfig) -> Box<dyn WeightingStrategy> {
    match kind {
        StrategyKind::GoldOverlap => Box::new(GoldOverlapWeighting::new(mode)),
        StrategyKind::Frequency => Box::new(FrequencyWeighting::new(mode, config.clone())),
        StrategyKind::MutualReinforcement => {
            Box::new(MutualReinforcementWeighting::new(mode, config.clone()))
        }
        StrategyKind::QueryExpansion => {
            Box::new(QueryExpansionWeighting::new(mode, config.clone()))
        }
    }
}

// ============================================================================
// Distribution helpers shared by the iterative strategies
// ============================================================================

/// Normalize a value map into a probability distribution in place.
///
/// A zero or non-finite total leaves the map untouched.
pub(crate) fn normalize<K: std::hash::Hash + Eq>(values: &mut FxHashMap<K, f64>) {
    let total: f64 = values.values().sum();
    if total > 0.0 && total.is_finite() {
        for v in values.values_mut() {
            *v /= total;
        }
    }
}

/// Euclidean distance between two distributions over the same key set
pub(crate) fn euclidean_distance<K: std::hash::Hash + Eq>(
    a: &FxHashMap<K, f64>,
    b: &FxHashMap<K, f64>,
) -> f64 {
    let mut sum = 0.0;
    for (key, &va) in a {
        let vb = b.get(key).copied().unwrap_or(0.0);
        sum += (va - vb) * (va - vb);
    }
    for (key, &vb) in b {
        if !a.contains_key(key) {
            sum += vb * vb;
        }
    }
    sum.sqrt()
}

/// KL divergence D(b ‖ a) between two distributions.
///
/// Terms where either side is non-positive are skipped, matching the
/// smoothed counter semantics the iteration was tuned against.
pub(crate) fn kl_divergence<K: std::hash::Hash + Eq>(
    a: &FxHashMap<K, f64>,
    b: &FxHashMap<K, f64>,
) -> f64 {
    let mut sum = 0.0;
    for (key, &vb) in b {
        let va = a.get(key).copied().unwrap_or(0.0);
        if vb > 0.0 && va > 0.0 {
            sum += vb * (vb / va).ln();
        }
    }
    sum.max(0.0)
}
