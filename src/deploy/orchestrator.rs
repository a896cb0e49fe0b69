//! Confirmed rolling upgrade of a deployed service.
//!
//! The orchestrator resolves a [`DeploymentTarget`] to one service, submits
//! an in-service upgrade with a new image, and when confirmation is
//! requested polls until the platform reports `upgraded` before finalizing.

use super::{
    ApiError, DeploymentTarget, Error, Result, UpgradeOptions,
    client::{InServiceStrategy, RancherApi, Service, ServiceUpgrade},
    poll::{Attempt, PollOutcome, poll_until},
};
use serde_json::{Map, Value};
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Scheme prefix the platform expects on image references.
pub const IMAGE_SCHEME: &str = "docker:";

/// Service state reported once an upgrade has rolled out.
const UPGRADED: &str = "upgraded";

/// Progress of an upgrade confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeState {
    /// Upgrade accepted; not confirmed
    Submitted,
    /// Waiting for the service to report `upgraded`
    Polling,
    /// Confirmed and finalized
    Upgraded,
    /// Deadline reached without confirmation
    TimedOut,
    /// Confirmation or finalization failed
    Failed,
}

impl fmt::Display for UpgradeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UpgradeState::Submitted => "submitted",
            UpgradeState::Polling => "polling",
            UpgradeState::Upgraded => "upgraded",
            UpgradeState::TimedOut => "timed out",
            UpgradeState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One upgrade to perform.
#[derive(Debug, Clone)]
pub struct UpgradeRequest {
    pub target: DeploymentTarget,
    pub image: String,
    pub options: UpgradeOptions,
}

/// Result of a successful deploy call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployReport {
    pub service_id: String,
    /// `stack/service` as requested
    pub service: String,
    /// Normalized image reference
    pub image: String,
    pub state: UpgradeState,
}

/// Adds the image scheme prefix when missing.
pub fn normalize_image(image: &str) -> String {
    let image = image.trim();
    if image.starts_with(IMAGE_SCHEME) {
        image.to_string()
    } else {
        format!("{IMAGE_SCHEME}{image}")
    }
}

/// Builds the upgrade body: the service's launch config with only the image
/// replaced, and its secondary launch configs unchanged.
pub fn upgrade_body(service: &Service, image: &str, options: &UpgradeOptions) -> ServiceUpgrade {
    let mut launch_config = service.launch_config.clone().unwrap_or_default();
    launch_config.insert("imageUuid".to_string(), Value::String(image.to_string()));

    ServiceUpgrade {
        in_service_strategy: InServiceStrategy {
            launch_config,
            secondary_launch_configs: service.secondary_launch_configs.clone().unwrap_or_default(),
            start_first: options.start_first,
            interval_millis: u64::try_from(options.batch_interval.as_millis()).unwrap_or(u64::MAX),
            batch_size: options.batch_size,
        },
        to_service_strategy: Map::new(),
    }
}

/// Drives upgrades through a [`RancherApi`].
#[derive(Debug)]
pub struct DeploymentOrchestrator<A> {
    api: A,
}

impl<A: RancherApi + Sync> DeploymentOrchestrator<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Resolves `target` to a service: stack by name first, then the
    /// service by name within that stack. The first match of each is used.
    pub async fn resolve(&self, target: &DeploymentTarget) -> Result<Service> {
        let stack_id = match &target.stack {
            Some(stack) => {
                let stacks = self
                    .api
                    .find_stacks(stack)
                    .await
                    .map_err(|source| Error::Api { action: "list stacks", source })?;
                let found = stacks.into_iter().next().ok_or_else(|| Error::StackNotFound {
                    stack: stack.clone(),
                })?;
                log::debug!("Resolved stack {} to {}", stack, found.id);
                Some(found.id)
            }
            None => None,
        };

        let services = self
            .api
            .find_services(&target.service, stack_id.as_deref())
            .await
            .map_err(|source| Error::Api { action: "list services", source })?;

        let service = services.into_iter().next().ok_or_else(|| Error::ServiceNotFound {
            service: target.to_string(),
        })?;
        log::debug!("Resolved service {} to {}", target, service.id);
        Ok(service)
    }

    /// Submits the upgrade and, when confirmation is on, waits for it and
    /// finalizes it.
    pub async fn deploy(&self, request: &UpgradeRequest, cancel: &CancellationToken) -> Result<DeployReport> {
        let image = normalize_image(&request.image);
        let name = request.target.to_string();
        let options = &request.options;

        let service = self.resolve(&request.target).await?;
        let body = upgrade_body(&service, &image, options);

        log::info!("Upgrading {} ({}) to {}", name, service.id, image);
        self.api
            .upgrade(&service.id, &body)
            .await
            .map_err(|source| Error::UpgradeRejected {
                service: name.clone(),
                source,
            })?;

        let mut report = DeployReport {
            service_id: service.id.clone(),
            service: name.clone(),
            image,
            state: UpgradeState::Submitted,
        };

        if !options.confirm {
            log::info!("Upgrade of {} submitted; confirmation skipped", name);
            return Ok(report);
        }

        report.state = UpgradeState::Polling;
        log::info!(
            "Waiting up to {}s for {} to finish upgrading ...",
            options.timeout.as_secs_f64(),
            name
        );

        let api = &self.api;
        let id = service.id.as_str();
        let outcome = poll_until(
            move || async move {
                match api.service(id).await {
                    Ok(current) if current.state == UPGRADED => Ok(current),
                    Ok(current) => Err(Attempt::Retry(format!(
                        "service not upgraded: {}",
                        current.state
                    ))),
                    Err(e) if e.is_auth_rejection() => Err(Attempt::Fatal(e.to_string())),
                    Err(e) => Err(Attempt::Retry(e.to_string())),
                }
            },
            options.poll_interval,
            options.timeout,
            cancel,
        )
        .await;

        let err = match outcome {
            PollOutcome::Ready(_) => {
                self.api
                    .finish_upgrade(id)
                    .await
                    .map_err(|source| Error::Finalize {
                        service: name.clone(),
                        source,
                    })?;
                log::info!("✓ Upgrade of {} finished", name);
                report.state = UpgradeState::Upgraded;
                return Ok(report);
            }
            PollOutcome::TimedOut { last, attempts } => {
                log::debug!("Confirmation of {} gave up after {} attempts", name, attempts);
                Error::ConfirmationTimedOut {
                    service: name.clone(),
                    timeout: options.timeout,
                    last,
                }
            }
            PollOutcome::Failed(reason) => Error::ConfirmationFailed {
                service: name.clone(),
                reason,
            },
            PollOutcome::Cancelled => return Err(Error::Cancelled { service: name }),
        };

        if options.rollback_on_failure {
            self.rollback(id, &name).await;
        }
        Err(err)
    }

    /// Best effort: the outcome is logged, never returned.
    async fn rollback(&self, id: &str, name: &str) {
        log::warn!("Rolling back {} ...", name);
        match self.api.rollback(id).await {
            Ok(_) => log::info!("Rolled back {}", name),
            Err(ApiError { status, message }) => log::warn!(
                "Rollback of {} failed{}: {}",
                name,
                status.map(|s| format!(" (HTTP {s})")).unwrap_or_default(),
                message
            ),
        }
    }
}
