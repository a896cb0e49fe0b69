//! Deployment connection settings and upgrade options.

use super::{Error, Result};
use std::fmt;
use std::time::Duration;

/// Endpoint URL of the orchestration API, including the version path.
pub const ENV_URL: &str = "RANCHER_URL";
/// Access key.
pub const ENV_KEY: &str = "RANCHER_KEY";
/// Secret key.
pub const ENV_SECRET: &str = "RANCHER_SECRET";
/// `stack/service` or bare service name to upgrade.
pub const ENV_SERVICE: &str = "RANCHER_SERVICE";
/// Image reference to deploy.
pub const ENV_IMAGE: &str = "RANCHER_IMAGE";
/// Confirmation timeout in whole seconds.
pub const ENV_TIMEOUT: &str = "RANCHER_TIMEOUT";

/// Connection credentials for the orchestration API.
#[derive(Clone, PartialEq, Eq)]
pub struct RancherCredentials {
    /// API base URL, e.g. `https://rancher.example.com/v2-beta`
    pub url: String,
    /// Access key
    pub access_key: String,
    /// Secret key
    pub secret_key: String,
}

impl fmt::Debug for RancherCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RancherCredentials")
            .field("url", &self.url)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl RancherCredentials {
    /// Reads credentials from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads credentials through `lookup`. Absent or empty values are
    /// configuration errors naming the variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("{key} must be set")))
        };

        Ok(Self {
            url: require(ENV_URL)?,
            access_key: require(ENV_KEY)?,
            secret_key: require(ENV_SECRET)?,
        })
    }
}

/// Parses a confirmation timeout given in whole seconds.
pub fn parse_timeout(value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| Error::Config(format!("invalid {ENV_TIMEOUT} '{value}': {e}")))
}

/// Rollout and confirmation parameters of one upgrade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeOptions {
    /// Start new instances before stopping old ones
    pub start_first: bool,
    /// Instances replaced per batch
    pub batch_size: u64,
    /// Pause between batches
    pub batch_interval: Duration,
    /// Wait for "upgraded" and finalize
    pub confirm: bool,
    /// Overall confirmation deadline
    pub timeout: Duration,
    /// Delay between state checks
    pub poll_interval: Duration,
    /// Roll back after a confirmation timeout or failure
    pub rollback_on_failure: bool,
}

impl Default for UpgradeOptions {
    fn default() -> Self {
        Self {
            start_first: false,
            batch_size: 1,
            batch_interval: Duration::from_millis(2000),
            confirm: true,
            timeout: Duration::from_secs(5),
            poll_interval: Duration::from_secs(3),
            rollback_on_failure: false,
        }
    }
}
