//! In-process exact solver
//!
//! Enumerates sentence subsets directly, deriving each concept variable
//! from the linking semantics (covered iff at least one covering sentence
//! is selected, valid for non-negative weights). Exponential in the
//! sentence count, so it is capped and meant for small instances and as
//! the oracle in tests.

use super::{Assignment, SolverPort};
use crate::errors::{Result, SummError};
use crate::model::{ConstraintOp, CoverageModel};
use rustc_hash::FxHashMap;

/// Exact reference solver for small models
#[derive(Debug, Clone)]
pub struct ExhaustiveSolver {
    max_sentences: usize,
}

impl Default for ExhaustiveSolver {
    fn default() -> Self {
        Self { max_sentences: 20 }
    }
}

impl ExhaustiveSolver {
    /// Create a solver refusing models with more sentence variables
    /// than `max_sentences` (enumeration is `2^n`)
    pub fn new(max_sentences: usize) -> Self {
        Self { max_sentences }
    }
}

/// The model pieces the enumeration needs, recovered from the
/// solver-neutral representation
struct Instance {
    /// (variable name, token length) per sentence, in variable order
    sentences: Vec<(String, f64)>,
    budget: f64,
    /// (variable name, weight, covering sentence positions) per concept
    concepts: Vec<(String, f64, Vec<usize>)>,
}

fn parse_instance(model: &CoverageModel) -> Result<Instance> {
    let length = model
        .constraints
        .iter()
        .find(|c| c.name == "length" && c.op == ConstraintOp::Le)
        .ok_or_else(|| SummError::malformed_model("model has no length constraint"))?;

    let sentences: Vec<(String, f64)> = length
        .terms
        .iter()
        .map(|t| (t.var.clone(), t.coeff))
        .collect();
    let positions: FxHashMap<&str, usize> = sentences
        .iter()
        .enumerate()
        .map(|(i, (var, _))| (var.as_str(), i))
        .collect();

    let weights: FxHashMap<&str, f64> = model
        .objective
        .iter()
        .map(|t| (t.var.as_str(), t.coeff))
        .collect();

    let mut concepts = Vec::new();
    for constraint in &model.constraints {
        if !constraint.name.starts_with("absence_") {
            continue;
        }
        let concept_var = constraint
            .terms
            .iter()
            .find(|t| t.coeff < 0.0)
            .map(|t| t.var.clone())
            .ok_or_else(|| {
                SummError::malformed_model(format!(
                    "constraint '{}' has no concept term",
                    constraint.name
                ))
            })?;
        let mut covering = Vec::new();
        for term in &constraint.terms {
            if term.coeff > 0.0 {
                let pos = positions.get(term.var.as_str()).ok_or_else(|| {
                    SummError::malformed_model(format!(
                        "constraint '{}' references unknown sentence '{}'",
                        constraint.name, term.var
                    ))
                })?;
                covering.push(*pos);
            }
        }
        let weight = weights.get(concept_var.as_str()).copied().unwrap_or(0.0);
        concepts.push((concept_var, weight, covering));
    }

    Ok(Instance {
        sentences,
        budget: length.bound,
        concepts,
    })
}

impl SolverPort for ExhaustiveSolver {
    fn name(&self) -> &'static str {
        "exhaustive"
    }

    fn solve(&self, model: &CoverageModel) -> Result<Assignment> {
        let instance = parse_instance(model)?;
        let n = instance.sentences.len();
        if n > self.max_sentences || n >= usize::BITS as usize {
            return Err(SummError::configuration(format!(
                "exhaustive solver supports at most {} sentences, model has {}",
                self.max_sentences, n
            )));
        }

        // Ties on the objective break toward the lexicographically
        // smallest selected index set, so results are deterministic.
        let mut best_mask: usize = 0;
        let mut best_score = f64::NEG_INFINITY;
        let mut best_indices: Vec<usize> = Vec::new();

        for mask in 0..(1usize << n) {
            let mut total_length = 0.0;
            for (i, (_, length)) in instance.sentences.iter().enumerate() {
                if mask & (1 << i) != 0 {
                    total_length += length;
                }
            }
            if total_length > instance.budget {
                continue;
            }

            let mut score = 0.0;
            for (_, weight, covering) in &instance.concepts {
                if covering.iter().any(|&i| mask & (1 << i) != 0) {
                    score += weight;
                }
            }

            let indices: Vec<usize> = (0..n).filter(|i| mask & (1 << i) != 0).collect();
            let improves = score > best_score + 1e-9
                || ((score - best_score).abs() <= 1e-9
                    && (best_score == f64::NEG_INFINITY || indices < best_indices));
            if improves {
                best_score = score;
                best_mask = mask;
                best_indices = indices;
            }
        }

        let mut assignment = Assignment::default();
        for (i, (var, _)) in instance.sentences.iter().enumerate() {
            assignment.insert(var.clone(), u8::from(best_mask & (1 << i) != 0));
        }
        for (var, _, covering) in &instance.concepts {
            let covered = covering.iter().any(|&i| best_mask & (1 << i) != 0);
            assignment.insert(var.clone(), u8::from(covered));
        }
        Ok(assignment)
    }
}
