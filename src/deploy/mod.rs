//! Confirmed rolling upgrades of deployed services.
//!
//! # Example
//!
//! ```no_run
//! use release_pipeline::deploy::{
//!     DeploymentOrchestrator, DeploymentTarget, RancherClient, RancherCredentials,
//!     UpgradeOptions, UpgradeRequest,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> release_pipeline::deploy::Result<()> {
//! let client = RancherClient::new(&RancherCredentials::from_env()?)?;
//! let orchestrator = DeploymentOrchestrator::new(client);
//! let request = UpgradeRequest {
//!     target: DeploymentTarget::parse("stack-a/service-b")?,
//!     image: "org/app:1.2.3".into(),
//!     options: UpgradeOptions::default(),
//! };
//! let report = orchestrator.deploy(&request, &CancellationToken::new()).await?;
//! println!("{} is {}", report.service, report.state);
//! # Ok(())
//! # }
//! ```

pub mod client;
mod config;
mod error;
mod orchestrator;
pub mod poll;
mod target;

pub use client::{RancherApi, RancherClient, Service, Stack};
pub use config::{
    ENV_IMAGE, ENV_KEY, ENV_SECRET, ENV_SERVICE, ENV_TIMEOUT, ENV_URL, RancherCredentials,
    UpgradeOptions, parse_timeout,
};
pub use error::{ApiError, Error, Result};
pub use orchestrator::{
    DeployReport, DeploymentOrchestrator, IMAGE_SCHEME, UpgradeRequest, UpgradeState,
    normalize_image, upgrade_body,
};
pub use target::DeploymentTarget;
