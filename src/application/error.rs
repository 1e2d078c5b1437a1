//! Application-level errors (wraps domain and API errors)

use thiserror::Error;

use crate::domain::DomainError;
use crate::infrastructure::traits::ApiError;

/// Application errors wrap domain and API errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Api(#[from] ApiError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("multiple users match '{query}' ({}); use their exact login", .candidates.join(", "))]
    AmbiguousUser {
        query: String,
        candidates: Vec<String>,
    },

    #[error("operation failed: {context}: {source}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
