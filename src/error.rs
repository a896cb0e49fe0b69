//! Top-level error types for pipeline runs.
//!
//! Wraps the build/package and deployment errors together with CLI argument
//! problems, so `main` has a single type to report.

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for all pipeline operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Build and packaging errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),

    /// Deployment errors
    #[error("Deploy error: {0}")]
    Deploy(#[from] crate::deploy::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl PipelineError {
    /// Actionable hints printed after the error.
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::bundler::Error as B;
        use crate::deploy::Error as D;

        match self {
            PipelineError::Bundler(B::UploadToolMissing { program }) => {
                vec![format!("Install '{program}' and make sure it is on PATH")]
            }
            PipelineError::Bundler(B::Config { path, .. }) => {
                vec![format!("Check {} or pass --config", path.display())]
            }
            PipelineError::Deploy(D::Config(_)) => vec![format!(
                "Set {}, {} and {}",
                crate::deploy::ENV_URL,
                crate::deploy::ENV_KEY,
                crate::deploy::ENV_SECRET
            )],
            PipelineError::Deploy(D::ConfirmationTimedOut { .. }) => {
                vec!["Increase --timeout or check the service in the orchestration UI".to_string()]
            }
            PipelineError::Deploy(D::Finalize { .. }) => vec![
                "The upgrade rolled out but was not finalized; finish it manually".to_string(),
            ],
            PipelineError::Deploy(e) if e.is_transient() => {
                vec!["The platform may be temporarily unavailable; retry the deploy".to_string()]
            }
            _ => Vec::new(),
        }
    }
}
