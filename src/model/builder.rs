//! Coverage-model construction

use super::{Constraint, ConstraintOp, CoverageModel, LinearTerm};
use crate::errors::{Result, SummError};
use crate::selection::SentenceSelection;

/// Builds the budgeted maximum-coverage program from a sentence selection.
///
/// For each concept j with covering set Cov(j), the paired constraints
///
/// ```text
/// presence_j:  Σ_{i∈Cov(j)} s_i − c_j        ≥ 0
/// absence_j:   Σ_{i∈Cov(j)} s_i − |Cov(j)|·c_j ≤ 0
/// ```
///
/// together with maximization pressure make c_j the exact indicator of
/// "at least one covering sentence selected". That equivalence only holds
/// for non-negative weights, so negative weights are rejected at build
/// time instead of producing a model with undefined linking semantics.
#[derive(Debug, Clone)]
pub struct CoverageModelBuilder {
    budget: usize,
}

impl CoverageModelBuilder {
    /// Create a builder with the given token budget
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    /// The token budget this builder emits
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Build the model for a selection.
    ///
    /// Verifies the selection's index invariants first; a dangling concept
    /// here would emit an unsatisfiable absence row.
    pub fn build(&self, selection: &SentenceSelection) -> Result<CoverageModel> {
        selection.verify()?;

        let mut objective = Vec::with_capacity(selection.concept_count());
        for (j, &weight) in selection.weights.iter().enumerate() {
            if weight < 0.0 {
                return Err(SummError::malformed_model(format!(
                    "negative weight {} for concept '{}' breaks coverage linking",
                    weight, selection.concepts[j]
                )));
            }
            objective.push(LinearTerm::new(weight, CoverageModel::concept_var(j as u32)));
        }

        let mut constraints = Vec::with_capacity(1 + 2 * selection.concept_count());
        constraints.push(Constraint {
            name: "length".to_string(),
            terms: selection
                .sentences
                .iter()
                .enumerate()
                .map(|(i, s)| LinearTerm::new(s.length() as f64, CoverageModel::sentence_var(i)))
                .collect(),
            op: ConstraintOp::Le,
            bound: self.budget as f64,
        });

        for (j, covering) in selection.covering.iter().enumerate() {
            let concept_var = CoverageModel::concept_var(j as u32);

            let mut presence: Vec<LinearTerm> = covering
                .iter()
                .map(|&i| LinearTerm::new(1.0, CoverageModel::sentence_var(i)))
                .collect();
            presence.push(LinearTerm::new(-1.0, concept_var.clone()));
            constraints.push(Constraint {
                name: format!("presence_{j}"),
                terms: presence,
                op: ConstraintOp::Ge,
                bound: 0.0,
            });

            let mut absence: Vec<LinearTerm> = covering
                .iter()
                .map(|&i| LinearTerm::new(1.0, CoverageModel::sentence_var(i)))
                .collect();
            absence.push(LinearTerm::new(-(covering.len() as f64), concept_var));
            constraints.push(Constraint {
                name: format!("absence_{j}"),
                terms: absence,
                op: ConstraintOp::Le,
                bound: 0.0,
            });
        }

        let mut binary = Vec::with_capacity(selection.sentence_count() + selection.concept_count());
        for i in 0..selection.sentence_count() {
            binary.push(CoverageModel::sentence_var(i));
        }
        for j in 0..selection.concept_count() {
            binary.push(CoverageModel::concept_var(j as u32));
        }

        Ok(CoverageModel {
            objective_name: "score".to_string(),
            objective,
            constraints,
            binary,
        })
    }
}
