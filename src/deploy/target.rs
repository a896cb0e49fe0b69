//! Deployment target naming.

use std::fmt;

/// Service to upgrade, optionally scoped by its stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentTarget {
    /// Grouping (stack) name
    pub stack: Option<String>,
    /// Service name
    pub service: String,
}

impl DeploymentTarget {
    /// Parses `stack/service` or a bare `service`, splitting on the first `/`.
    pub fn parse(value: &str) -> super::Result<Self> {
        let value = value.trim();
        let (stack, service) = match value.split_once('/') {
            Some((stack, service)) => (Some(stack.to_string()), service.to_string()),
            None => (None, value.to_string()),
        };

        if service.is_empty() || stack.as_deref().is_some_and(str::is_empty) {
            return Err(super::Error::Config(format!(
                "invalid service '{value}': expected 'stack/service' or 'service'"
            )));
        }

        Ok(Self { stack, service })
    }
}

impl fmt::Display for DeploymentTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.stack {
            Some(stack) => write!(f, "{}/{}", stack, self.service),
            None => f.write_str(&self.service),
        }
    }
}
