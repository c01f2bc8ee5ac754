//! Error types for ilpsumm
//!
//! This module defines the error taxonomy used throughout the library.
//! Every error carries enough context (problem id, strategy name, solver
//! detail) to log and skip a single problem inside a batch run.

use thiserror::Error;

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SummError>;

/// Main error type for ilpsumm
#[derive(Error, Debug, Clone)]
pub enum SummError {
    /// Missing or invalid configuration (bad thresholds, missing tool path)
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    /// A gold-overlap strategy was requested without reference summaries
    #[error("No gold data for problem '{problem_id}': {message}")]
    NoGoldData { problem_id: String, message: String },

    /// The coverage model could not be built (e.g. negative concept weight)
    #[error("Malformed model: {message}")]
    MalformedModel { message: String },

    /// The external solver failed, timed out, or reported infeasibility.
    /// Aborts only the current problem, never a whole batch.
    #[error("Solver failure ({kind:?}): {message}")]
    Solver {
        kind: SolverFailureKind,
        message: String,
    },

    /// The external classifier failed, timed out, or returned a malformed
    /// response. Aborts only the current problem, never a whole batch.
    #[error("Classifier failure ({kind:?}): {message}")]
    Classifier {
        kind: ClassifierFailureKind,
        message: String,
    },

    /// A concept was indexed with zero covering sentences.
    /// This is a programming error, not a recoverable condition.
    #[error("Dangling concept invariant violated: concept id {concept_id} ('{concept}') has no covering sentence")]
    DanglingConcept { concept_id: u32, concept: String },

    /// Internal error (should not occur in normal usage)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Distinguishes the ways an external solver call can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverFailureKind {
    /// The solver process exceeded the caller-supplied timeout
    Timeout,
    /// The solver exited with a non-zero status
    NonZeroExit,
    /// The solver reported the model as infeasible
    Infeasible,
    /// The solver output could not be parsed
    MalformedOutput,
    /// Spawning or talking to the solver process failed
    Io,
}

/// Distinguishes the ways an external classifier call can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierFailureKind {
    /// The classifier process exceeded the caller-supplied timeout
    Timeout,
    /// The classifier exited with a non-zero status
    NonZeroExit,
    /// The classifier output could not be parsed or was incomplete
    MalformedOutput,
    /// Spawning or talking to the classifier process failed
    Io,
}

impl SummError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a no-gold-data error
    pub fn no_gold_data(problem_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NoGoldData {
            problem_id: problem_id.into(),
            message: message.into(),
        }
    }

    /// Create a malformed-model error
    pub fn malformed_model(message: impl Into<String>) -> Self {
        Self::MalformedModel {
            message: message.into(),
        }
    }

    /// Create a solver error
    pub fn solver(kind: SolverFailureKind, message: impl Into<String>) -> Self {
        Self::Solver {
            kind,
            message: message.into(),
        }
    }

    /// Create a classifier error
    pub fn classifier(kind: ClassifierFailureKind, message: impl Into<String>) -> Self {
        Self::Classifier {
            kind,
            message: message.into(),
        }
    }

    /// Create a dangling-concept error
    pub fn dangling_concept(concept_id: u32, concept: impl Into<String>) -> Self {
        Self::DanglingConcept {
            concept_id,
            concept: concept.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error indicates a solver timeout
    pub fn is_solver_timeout(&self) -> bool {
        matches!(
            self,
            Self::Solver {
                kind: SolverFailureKind::Timeout,
                ..
            }
        )
    }

    /// Check if this error indicates a classifier timeout
    pub fn is_classifier_timeout(&self) -> bool {
        matches!(
            self,
            Self::Classifier {
                kind: ClassifierFailureKind::Timeout,
                ..
            }
        )
    }

    /// Check if this error should abort only the current problem
    /// (safe to log and skip in a batch run)
    pub fn is_per_problem(&self) -> bool {
        matches!(
            self,
            Self::NoGoldData { .. } | Self::Solver { .. } | Self::Classifier { .. }
        )
    }
}

impl From<serde_json::Error> for SummError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("serialization: {err}"))
    }
}
