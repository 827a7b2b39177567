//! Engine error taxonomy.
//!
//! Every failure in the core surfaces through [`EngineError`]; nothing is
//! auto-recovered. Configuration problems are rejected at construction
//! time, strategy-contract violations and evaluation failures abort the
//! generation step they occur in. Completed prior generations remain valid
//! and queryable after a failed step.

use thiserror::Error;

/// Errors produced by the search engine and its subsystems.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Malformed configuration (negative rate, zero population, ...).
    ///
    /// Raised by [`SearchConfig::validate`](crate::search::SearchConfig::validate)
    /// during construction, never from inside a generation step.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A strategy produced a sequence whose length does not match the
    /// population. There is no truncation or padding; the step aborts.
    #[error("{what}: expected length {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A per-genome evaluation task failed. Fatal for the whole step;
    /// retry, if desired, belongs to the task implementation.
    #[error("evaluation task failed: {0}")]
    Evaluation(String),

    /// A scheduler action returned an error (distinct from the
    /// `Skipped` control signal, which is not an error).
    #[error("scheduler action '{action}' failed: {message}")]
    Action { action: String, message: String },

    /// An operation that needs at least one genome was given none.
    #[error("operation requires a non-empty population")]
    EmptyPopulation,
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_display() {
        let err = EngineError::LengthMismatch {
            what: "fitness column",
            expected: 10,
            actual: 7,
        };
        assert_eq!(err.to_string(), "fitness column: expected length 10, got 7");
    }

    #[test]
    fn test_action_display() {
        let err = EngineError::Action {
            action: "cull-stagnant".into(),
            message: "history empty".into(),
        };
        assert!(err.to_string().contains("cull-stagnant"));
    }
}
