//! Per-target outcomes of a matrix run.

use crate::bundler::{Error, Result, settings::TargetPlatform};

/// How a matrix run reacts to a failed target.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FailurePolicy {
    /// Attempt every target and report all failures together.
    #[default]
    CollectAll,
    /// Stop at the first failed target; remaining targets are not attempted.
    FailFast,
}

/// Result of one target in a matrix run.
#[derive(Debug)]
pub struct TargetOutcome<T> {
    /// Target that was attempted.
    pub target: TargetPlatform,
    /// What happened.
    pub result: Result<T>,
}

/// Ordered outcomes of every attempted target.
#[derive(Debug)]
pub struct MatrixReport<T> {
    outcomes: Vec<TargetOutcome<T>>,
}

impl<T> Default for MatrixReport<T> {
    fn default() -> Self {
        Self {
            outcomes: Vec::new(),
        }
    }
}

impl<T> MatrixReport<T> {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an outcome, returning whether the run should continue under `policy`.
    pub fn record(&mut self, target: TargetPlatform, result: Result<T>, policy: FailurePolicy) -> bool {
        let failed = result.is_err();
        if let Err(e) = &result {
            log::error!("Target {} failed: {}", target, e);
        }
        self.outcomes.push(TargetOutcome { target, result });
        !(failed && policy == FailurePolicy::FailFast)
    }

    /// All outcomes in attempt order.
    pub fn outcomes(&self) -> &[TargetOutcome<T>] {
        &self.outcomes
    }

    /// Successful targets with their values.
    pub fn succeeded(&self) -> impl Iterator<Item = (&TargetPlatform, &T)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|v| (&o.target, v)))
    }

    /// Failed targets with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&TargetPlatform, &Error)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (&o.target, e)))
    }

    /// True when every attempted target succeeded.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Collapses the report: all values, or every failure aggregated into
    /// [`Error::TargetFailures`].
    pub fn into_result(self) -> Result<Vec<(TargetPlatform, T)>> {
        let mut values = Vec::with_capacity(self.outcomes.len());
        let mut failures = Vec::new();

        for outcome in self.outcomes {
            match outcome.result {
                Ok(value) => values.push((outcome.target, value)),
                Err(e) => failures.push((outcome.target, e.to_string())),
            }
        }

        if failures.is_empty() {
            Ok(values)
        } else {
            Err(Error::TargetFailures { failures })
        }
    }
}
