//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::traits::ApiError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("cannot render output: {0}")]
    Render(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Render(_) => exitcode::SOFTWARE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => exitcode::IOERR,
                InfraError::Client(api) => api_exit_code(api),
                InfraError::Application(app) => application_exit_code(app),
            },
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Domain(_) => exitcode::USAGE,
        ApplicationError::Api(api) => api_exit_code(api),
        ApplicationError::Config { .. } => exitcode::CONFIG,
        ApplicationError::NotFound { .. } => exitcode::NOINPUT,
        ApplicationError::AmbiguousUser { .. } => exitcode::DATAERR,
        ApplicationError::OperationFailed { .. } => exitcode::IOERR,
    }
}

fn api_exit_code(e: &ApiError) -> i32 {
    match e {
        ApiError::Configuration(_) => exitcode::CONFIG,
        ApiError::Auth { .. } => exitcode::NOPERM,
        ApiError::NotFound { .. } => exitcode::NOINPUT,
        ApiError::Network { .. } => exitcode::UNAVAILABLE,
        ApiError::Http { .. } | ApiError::Decode { .. } => exitcode::SOFTWARE,
    }
}
