//! Error types for the chamictl CLI.
//!
//! CliError wraps CoreError from the shared library and adds CLI-specific variants.

use chamictl_core::error::CoreError;
use thiserror::Error;

// Re-export core error types so command modules can use them via crate::error
pub use chamictl_core::error::{CodecError, ConfigError, HttpError, ResolveError, TokenError};

/// Exit codes for the CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
}

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Partial failure: {succeeded} succeeded, {failed} failed")]
    PartialFailure { succeeded: usize, failed: usize },

    /// The user answered no to a confirmation prompt.
    #[error("Aborted by user")]
    Declined,

    #[error("Prompt error: {0}")]
    Prompt(String),

    /// A status check found the service down; the command already said so.
    #[error("service is not healthy")]
    Unhealthy,

    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Declined => exit_codes::SUCCESS,
            CliError::Core(_)
            | CliError::Io(_)
            | CliError::InvalidArgument(_)
            | CliError::PartialFailure { .. }
            | CliError::Prompt(_)
            | CliError::Unhealthy
            | CliError::Other(_) => exit_codes::GENERAL_ERROR,
        }
    }

    /// Whether main should report this error. A declined prompt is a normal
    /// exit and an unhealthy service has been reported by its command.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, CliError::Declined | CliError::Unhealthy)
    }
}

// Conversions from core error subtypes to CliError
impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Core(CoreError::Config(e))
    }
}

impl From<ResolveError> for CliError {
    fn from(e: ResolveError) -> Self {
        CliError::Core(CoreError::Resolve(e))
    }
}

impl From<TokenError> for CliError {
    fn from(e: TokenError) -> Self {
        CliError::Core(CoreError::Token(e))
    }
}

impl From<HttpError> for CliError {
    fn from(e: HttpError) -> Self {
        CliError::Core(CoreError::Http(e))
    }
}

impl From<CodecError> for CliError {
    fn from(e: CodecError) -> Self {
        CliError::Core(CoreError::Codec(e))
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
