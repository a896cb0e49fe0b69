//! Error types for the deployment orchestrator.
//!
//! Lookup failures, confirmation timeouts and finalize failures are
//! separate variants: "never confirmed" and "confirmed but not committed"
//! must stay distinguishable.

use super::orchestrator::UpgradeState;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for deployment operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure reported by the orchestration platform's API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}{message}", .status.map(|s| format!("HTTP {s}: ")).unwrap_or_default())]
pub struct ApiError {
    /// HTTP status, if a response was received
    pub status: Option<u16>,
    /// Response body or transport error
    pub message: String,
}

impl ApiError {
    /// Transport-level failure without a response.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// True when the credentials were rejected; retrying cannot help.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self.status, Some(401) | Some(403))
    }
}

/// Errors raised while upgrading a deployed service.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid connection settings
    #[error("deployment configuration error: {0}")]
    Config(String),

    /// No stack matched the group filter
    #[error("Unable to find stack {stack}")]
    StackNotFound {
        /// Requested stack name
        stack: String,
    },

    /// No service matched the name filter
    #[error("Unable to find service {service}")]
    ServiceNotFound {
        /// Requested `stack/service` or service name
        service: String,
    },

    /// API call failed outside the confirmation loop
    #[error("Failed to {action}: {source}")]
    Api {
        /// What was being attempted
        action: &'static str,
        /// Underlying API failure
        #[source]
        source: ApiError,
    },

    /// Upgrade action was refused
    #[error("Unable to upgrade service {service}: {source}")]
    UpgradeRejected {
        /// Service being upgraded
        service: String,
        /// Underlying API failure
        #[source]
        source: ApiError,
    },

    /// Confirmation deadline elapsed without an "upgraded" observation
    #[error(
        "Error waiting for service upgrade to complete: {service} not upgraded after {}s{}",
        .timeout.as_secs_f64(),
        .last.as_deref().map(|l| format!(" (last: {l})")).unwrap_or_default()
    )]
    ConfirmationTimedOut {
        /// Service being upgraded
        service: String,
        /// Confirmation timeout
        timeout: Duration,
        /// Last observed state or error
        last: Option<String>,
    },

    /// Confirmation stopped on a non-retryable failure
    #[error("Error waiting for service upgrade to complete: {service}: {reason}")]
    ConfirmationFailed {
        /// Service being upgraded
        service: String,
        /// Failure reason
        reason: String,
    },

    /// Confirmation cancelled by the operator
    #[error("Confirmation of {service} upgrade cancelled")]
    Cancelled {
        /// Service being upgraded
        service: String,
    },

    /// Upgrade reached "upgraded" but could not be finalized
    #[error("Unable to finish upgrade {service}: {source}")]
    Finalize {
        /// Service being upgraded
        service: String,
        /// Underlying API failure
        #[source]
        source: ApiError,
    },
}

impl Error {
    /// True for configuration and lookup errors, which are never retried.
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::StackNotFound { .. } | Error::ServiceNotFound { .. }
        )
    }

    /// True when a later attempt could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Api { source, .. } => !source.is_auth_rejection(),
            Error::ConfirmationTimedOut { .. } => true,
            _ => false,
        }
    }

    /// Terminal confirmation state this error corresponds to, if any.
    pub fn upgrade_state(&self) -> Option<UpgradeState> {
        match self {
            Error::ConfirmationTimedOut { .. } => Some(UpgradeState::TimedOut),
            Error::ConfirmationFailed { .. } | Error::Cancelled { .. } | Error::Finalize { .. } => {
                Some(UpgradeState::Failed)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status() {
        let err = ApiError {
            status: Some(422),
            message: "InvalidState".into(),
        };
        assert_eq!(err.to_string(), "HTTP 422: InvalidState");
        assert_eq!(ApiError::transport("refused").to_string(), "refused");
    }

    #[test]
    fn auth_rejection_is_detected() {
        assert!(ApiError { status: Some(401), message: String::new() }.is_auth_rejection());
        assert!(ApiError { status: Some(403), message: String::new() }.is_auth_rejection());
        assert!(!ApiError { status: Some(500), message: String::new() }.is_auth_rejection());
        assert!(!ApiError::transport("timeout").is_auth_rejection());
    }

    #[test]
    fn timeout_and_finalize_are_distinct() {
        let timeout = Error::ConfirmationTimedOut {
            service: "stack-a/service-b".into(),
            timeout: Duration::from_secs(5),
            last: Some("service not upgraded: upgrading".into()),
        };
        let finalize = Error::Finalize {
            service: "stack-a/service-b".into(),
            source: ApiError::transport("connection reset"),
        };
        assert_eq!(timeout.upgrade_state(), Some(UpgradeState::TimedOut));
        assert_eq!(finalize.upgrade_state(), Some(UpgradeState::Failed));
        assert!(timeout.to_string().contains("after 5s"));
        assert!(timeout.to_string().contains("last: service not upgraded: upgrading"));
        assert!(finalize.to_string().starts_with("Unable to finish upgrade"));
    }

    #[test]
    fn lookup_errors_are_classified() {
        assert!(Error::StackNotFound { stack: "a".into() }.is_lookup());
        assert!(Error::Config("RANCHER_URL must be set".into()).is_lookup());
        assert!(!Error::Cancelled { service: "b".into() }.is_lookup());

        let unavailable = Error::Api {
            action: "list services",
            source: ApiError { status: Some(503), message: String::new() },
        };
        let forbidden = Error::Api {
            action: "list services",
            source: ApiError { status: Some(403), message: String::new() },
        };
        assert!(unavailable.is_transient());
        assert!(!forbidden.is_transient());
        assert!(!Error::ServiceNotFound { service: "b".into() }.is_transient());
    }
}
