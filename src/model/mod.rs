//! The budgeted maximum-coverage model
//!
//! A solver-neutral 0/1 integer program: binary selection variables per
//! sentence and per concept, a linear objective over concept variables,
//! a length-budget constraint, and a presence/absence constraint pair
//! per concept. Built once per run, consumed once by a solver backend,
//! then discarded.

pub mod builder;
pub mod solution;

pub use builder::CoverageModelBuilder;
pub use solution::SolutionExtractor;

use serde::{Deserialize, Serialize};

/// One `coeff · var` term of a linear expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTerm {
    pub coeff: f64,
    pub var: String,
}

impl LinearTerm {
    pub fn new(coeff: f64, var: impl Into<String>) -> Self {
        Self {
            coeff,
            var: var.into(),
        }
    }
}

/// Comparison operator of a linear constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintOp {
    /// Left-hand side ≥ bound
    Ge,
    /// Left-hand side ≤ bound
    Le,
}

/// A named linear constraint `Σ coeff · var  op  bound`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub terms: Vec<LinearTerm>,
    pub op: ConstraintOp,
    pub bound: f64,
}

/// The complete model: a maximization objective, named constraints, and
/// the list of binary variables.
///
/// Variable naming follows the `s{i}` / `c{j}` convention expected by the
/// external solver wrapper; index `i` refers to the position within the
/// selection's sentence list and `j` to the dense concept id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageModel {
    /// Objective expression name (always "score")
    pub objective_name: String,
    /// Maximization objective terms
    pub objective: Vec<LinearTerm>,
    /// Named constraints in emission order: length, then per-concept pairs
    pub constraints: Vec<Constraint>,
    /// All variables; every variable in this model is binary
    pub binary: Vec<String>,
}

impl CoverageModel {
    /// Name of the selection variable for sentence `i`
    pub fn sentence_var(i: usize) -> String {
        format!("s{i}")
    }

    /// Name of the coverage variable for concept id `j`
    pub fn concept_var(j: u32) -> String {
        format!("c{j}")
    }

    /// Number of variables in the model
    pub fn variable_count(&self) -> usize {
        self.binary.len()
    }

    /// Serialize to the CPLEX-LP text format consumed by glpsol-style
    /// solvers: a `Maximize` section, a `Subject To` section with one
    /// named row per constraint, a `Binary` section listing every
    /// variable, and a closing `End`.
    pub fn to_lp_format(&self) -> String {
        let mut out = String::new();
        out.push_str("Maximize\n");
        out.push_str(&format!(
            " {}: {}\n",
            self.objective_name,
            format_terms(&self.objective)
        ));
        out.push_str("Subject To\n");
        for constraint in &self.constraints {
            let op = match constraint.op {
                ConstraintOp::Ge => ">=",
                ConstraintOp::Le => "<=",
            };
            out.push_str(&format!(
                " {}: {} {} {}\n",
                constraint.name,
                format_terms(&constraint.terms),
                op,
                format_coeff(constraint.bound)
            ));
        }
        out.push_str("Binary\n");
        for var in &self.binary {
            out.push_str(&format!(" {var}\n"));
        }
        out.push_str("End\n");
        out
    }
}

/// Render a linear expression as `a x + b y - c z`.
///
/// Unit coefficients are elided; negative coefficients fold their sign
/// into the joining operator.
fn format_terms(terms: &[LinearTerm]) -> String {
    let mut out = String::new();
    for (pos, term) in terms.iter().enumerate() {
        let magnitude = term.coeff.abs();
        let sign_negative = term.coeff < 0.0;
        if pos == 0 {
            if sign_negative {
                out.push_str("- ");
            }
        } else if sign_negative {
            out.push_str(" - ");
        } else {
            out.push_str(" + ");
        }
        if (magnitude - 1.0).abs() > f64::EPSILON {
            out.push_str(&format_coeff(magnitude));
            out.push(' ');
        }
        out.push_str(&term.var);
    }
    out
}

/// Render a coefficient without a trailing `.0` when it is integral
fn format_coeff(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
