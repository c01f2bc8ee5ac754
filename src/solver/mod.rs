//! Solver backends
//!
//! The coverage model is consumed through the [`SolverPort`] trait so the
//! optimizer is swappable: [`ProcessSolver`] shells out to a glpsol-style
//! binary, while [`ExhaustiveSolver`] is an in-process exact reference for
//! small instances and tests. Solver failures are typed; a timeout or a
//! non-zero exit aborts only the current problem, never a batch.

pub mod exhaustive;
pub mod process;

pub use exhaustive::ExhaustiveSolver;
pub use process::ProcessSolver;

use crate::errors::Result;
use crate::model::CoverageModel;
use rustc_hash::FxHashMap;

/// A 0/1 assignment over the model's variables, keyed by variable name
pub type Assignment = FxHashMap<String, u8>;

/// Capability interface for integer-program backends
pub trait SolverPort: Send + Sync {
    /// Backend name, carried into errors and logs
    fn name(&self) -> &'static str;

    /// Solve the model, returning a complete 0/1 assignment
    fn solve(&self, model: &CoverageModel) -> Result<Assignment>;
}
