//! `build`: cross-compile for each target.

use crate::bundler::{Builder, MatrixReport};
use crate::cli::{BuildArgs, RuntimeConfig};
use crate::error::Result;

pub async fn build(args: &BuildArgs, runtime: &RuntimeConfig) -> Result<i32> {
    let spec = args.spec.to_spec()?;
    let builder = Builder::new(runtime.pipeline().clone());

    runtime.section(&format!("Building {} {}", spec.name(), spec.version_string()))?;
    let report = builder
        .build_matrix(&spec, &args.spec.targets, args.spec.policy())
        .await;

    for outcome in report.outcomes() {
        match &outcome.result {
            Ok(artifact) => {
                runtime.success(&format!("{}: {}", outcome.target, artifact.path.display()))?;
                runtime.verbose_println(&format!(
                    "{} bytes, sha256 {}",
                    artifact.size, artifact.checksum
                ))?;
            }
            Err(e) => runtime.error(&format!("{}: {}", outcome.target, e))?,
        }
    }

    summarize(runtime, &report)
}

/// Prints the matrix summary and returns the exit code.
pub(super) fn summarize<T>(runtime: &RuntimeConfig, report: &MatrixReport<T>) -> Result<i32> {
    let total = report.outcomes().len();
    let failed = report.failures().count();
    if failed == 0 {
        runtime.success(&format!("{total} target(s) succeeded"))?;
        Ok(0)
    } else {
        runtime.error(&format!("{failed} of {total} target(s) failed"))?;
        Ok(1)
    }
}
