//! Multi-target build driver.
//!
//! Builds every target of a matrix one after another. Whether a failed
//! target stops the run is decided by the caller's [`FailurePolicy`]; every
//! attempted target is reported, so failures are never overwritten by a
//! later target's result.

use super::{Builder, checksum::calculate_sha256};
use crate::bundler::{
    FailurePolicy, MatrixReport, Result,
    error::ErrorExt,
    settings::{PackageSpec, TargetPlatform},
};
use std::path::PathBuf;

/// A successfully built artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltArtifact {
    /// Path of the binary.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Hex-encoded SHA-256.
    pub checksum: String,
}

impl Builder {
    /// Builds `spec` for each target, or for the configured default matrix
    /// when `targets` is empty.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use release_pipeline::bundler::{Builder, FailurePolicy, PackageSpecBuilder, PipelineConfig};
    ///
    /// # async fn example() -> release_pipeline::bundler::Result<()> {
    /// let builder = Builder::new(PipelineConfig::default());
    /// let spec = PackageSpecBuilder::new("agent", semver::Version::new(1, 2, 3)).build()?;
    /// let report = builder.build_matrix(&spec, &[], FailurePolicy::CollectAll).await;
    /// for (target, artifact) in report.succeeded() {
    ///     println!("{target}: {} ({})", artifact.path.display(), artifact.checksum);
    /// }
    /// report.into_result()?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build_matrix(
        &self,
        spec: &PackageSpec,
        targets: &[TargetPlatform],
        policy: FailurePolicy,
    ) -> MatrixReport<BuiltArtifact> {
        let targets = self.config().targets_or_default(targets);
        let mut report = MatrixReport::new();

        for target in targets {
            let result = self.build_artifact(spec, &target).await;
            if !report.record(target, result, policy) {
                log::warn!("Stopping matrix after first failure");
                break;
            }
        }

        report
    }

    async fn build_artifact(&self, spec: &PackageSpec, target: &TargetPlatform) -> Result<BuiltArtifact> {
        let path = self.build(spec, target).await?;

        let size = tokio::fs::metadata(&path)
            .await
            .fs_context("reading artifact metadata", &path)?
            .len();
        let checksum = calculate_sha256(&path).await?;

        Ok(BuiltArtifact {
            path,
            size,
            checksum,
        })
    }
}
