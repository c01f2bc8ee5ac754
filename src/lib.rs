//! # ilpsumm
//!
//! Extractive multi-document summarization via budgeted maximum coverage.
//!
//! Given a set of source documents and an optional query, the library
//! weights sub-sentence "concepts" (word n-grams or skip bigrams) with
//! one of several interchangeable strategies, then selects a subset of
//! sentences maximizing total covered concept weight under a token
//! budget, formulated as a 0/1 integer program.
//!
//! ## Features
//!
//! - **Interchangeable weighting**: frequency/doc-frequency, gold-summary
//!   overlap, mutual-reinforcement power iteration, query expansion, and
//!   classifier-scored weights
//! - **Exact selection**: budgeted maximum-coverage ILP with per-concept
//!   linking constraints
//! - **Swappable backends**: solver and classifier sit behind port traits,
//!   with a bundled exact solver for small instances
//! - **Deterministic**: concept ids are assigned by lexicographic order,
//!   never hash iteration order

pub mod classifier;
pub mod concepts;
pub mod errors;
pub mod model;
pub mod nlp;
pub mod pipeline;
pub mod selection;
pub mod solver;
pub mod types;
pub mod weighting;

// Re-export commonly used types
pub use errors::{ClassifierFailureKind, Result, SolverFailureKind, SummError};
pub use types::{Concept, Document, Problem, ReferenceSummary, Sentence, SummConfig};

// Re-export main functionality
pub use classifier::{ClassifierPort, ProcessClassifier};
pub use concepts::{extract_units, UnitMode};
pub use model::{CoverageModel, CoverageModelBuilder, SolutionExtractor};
pub use nlp::{LexicalOverlap, Similarity, StopwordFilter};
pub use pipeline::{Summarizer, Summary};
pub use selection::{SentenceSelection, SentenceSelector};
pub use solver::{Assignment, ExhaustiveSolver, ProcessSolver, SolverPort};
pub use weighting::{
    ConceptWeights, DistanceMetric, FeatureRecord, FrequencyWeighting, GoldOverlapWeighting,
    LearnedWeighting, MassMode, MutualReinforcementWeighting, QueryExpansionWeighting,
    ReinforcementLevel, StrategyKind, WeightingStrategy,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
