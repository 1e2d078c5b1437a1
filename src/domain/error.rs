//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent invalid user input to domain types.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid --since value '{input}': {message}")]
    InvalidSince { input: String, message: String },

    #[error("invalid sort direction '{0}': use 1 (ascending) or -1 (descending)")]
    InvalidSortDirection(String),

    #[error("invalid submission reference '{0}': expected a job id or submission name")]
    InvalidSubmissionRef(String),
}
