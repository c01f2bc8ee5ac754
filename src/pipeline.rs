//! End-to-end summarization pipeline
//!
//! Glues the stages together: weighting → sentence selection → coverage
//! model → solver → extraction. A single problem runs sequentially;
//! independent problems run concurrently through [`Summarizer::summarize_batch`],
//! each owning its per-run state.

use crate::concepts::UnitMode;
use crate::errors::Result;
use crate::model::{CoverageModelBuilder, SolutionExtractor};
use crate::selection::SentenceSelector;
use crate::solver::SolverPort;
use crate::types::{Problem, Sentence, SummConfig};
use crate::weighting::{strategy_for, StrategyKind, WeightingStrategy};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The extract produced for one problem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Problem this summary was produced for
    pub problem_id: String,
    /// Selected sentences in original source order
    pub sentences: Vec<Sentence>,
    /// Total stemmed-token length of the extract
    pub token_count: usize,
    /// Objective value: summed weight of covered concepts
    pub covered_weight: f64,
}

impl Summary {
    /// An empty summary for a problem where nothing survived filtering
    pub fn empty(problem_id: impl Into<String>) -> Self {
        Self {
            problem_id: problem_id.into(),
            sentences: Vec::new(),
            token_count: 0,
            covered_weight: 0.0,
        }
    }

    /// True when no sentence was selected
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// The extract as display text, one sentence per line
    pub fn text(&self) -> String {
        self.sentences
            .iter()
            .map(|s| s.original.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Runs the full pipeline for one or many problems.
///
/// Owns the weighting strategy and the solver backend; all other stages
/// are stateless per run.
pub struct Summarizer {
    strategy: Box<dyn WeightingStrategy>,
    selector: SentenceSelector,
    builder: CoverageModelBuilder,
    extractor: SolutionExtractor,
    solver: Box<dyn SolverPort>,
}

impl Summarizer {
    /// Create a summarizer with one of the config-selectable strategies
    pub fn new(
        kind: StrategyKind,
        mode: UnitMode,
        config: SummConfig,
        solver: Box<dyn SolverPort>,
    ) -> Result<Self> {
        let strategy = strategy_for(kind, mode, &config);
        Self::with_strategy(strategy, mode, config, solver)
    }

    /// Create a summarizer with an explicit strategy instance (used for
    /// [`crate::weighting::LearnedWeighting`], which needs a classifier
    /// port the config factory cannot supply)
    pub fn with_strategy(
        strategy: Box<dyn WeightingStrategy>,
        mode: UnitMode,
        config: SummConfig,
        solver: Box<dyn SolverPort>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            strategy,
            selector: SentenceSelector::new(mode, config.clone()),
            builder: CoverageModelBuilder::new(config.max_length),
            extractor: SolutionExtractor::new(),
            solver,
        })
    }

    /// Summarize one problem
    pub fn summarize(&self, problem: &Problem) -> Result<Summary> {
        let weights = self.strategy.compute_weights(problem)?;
        debug!(
            problem = %problem.id,
            strategy = self.strategy.name(),
            concepts = weights.len(),
            "computed concept weights"
        );

        let selection = self.selector.select(&problem.documents, &weights);
        if selection.is_empty() {
            warn!(
                problem = %problem.id,
                "no sentence survived filtering, returning empty summary"
            );
            return Ok(Summary::empty(&problem.id));
        }
        debug!(
            problem = %problem.id,
            sentences = selection.sentence_count(),
            concepts = selection.concept_count(),
            "built sentence selection"
        );

        let model = self.builder.build(&selection)?;
        let assignment = self.solver.solve(&model)?;

        let sentences = self.extractor.extract(&assignment, &selection);
        if sentences.is_empty() {
            warn!(problem = %problem.id, "solver selected no sentence");
        }
        let token_count = sentences.iter().map(Sentence::length).sum();
        let covered_weight = self
            .extractor
            .covered_concepts(&assignment, &selection)
            .iter()
            .map(|&j| selection.weights[j as usize])
            .sum();

        Ok(Summary {
            problem_id: problem.id.clone(),
            sentences,
            token_count,
            covered_weight,
        })
    }

    /// Summarize independent problems across the rayon worker pool.
    ///
    /// Per-problem failures are returned in place so a batch never
    /// aborts on one bad problem; results keep the input order.
    pub fn summarize_batch(&self, problems: &[Problem]) -> Vec<Result<Summary>> {
        problems
            .par_iter()
            .map(|problem| {
                let result = self.summarize(problem);
                if let Err(err) = &result {
                    warn!(problem = %problem.id, error = %err, "problem failed");
                }
                result
            })
            .collect()
    }
}
