//! Per-target plugin packaging.
//!
//! For each target: build, stamp the manifest with the target's platform and
//! executable, write it beside the binary, gather auxiliary files into the
//! same directory, zip everything, and optionally upload the archive.

use super::{archive::write_zip, manifest::Manifest, upload::upload_archive};
use crate::bundler::{
    Builder, Error, FailurePolicy, MatrixReport, Result,
    builder::calculate_sha256,
    error::Context,
    path::plugin_layout_template,
    settings::{PackageSpec, PipelineConfig, TargetPlatform},
    utils::fs::{link_or_copy, same_file},
};
use std::path::{Path, PathBuf};

/// Inputs of a packaging run besides the package spec.
#[derive(Debug, Clone, Default)]
pub struct PackageRequest {
    /// Targets to package; empty means the configured default matrix.
    pub targets: Vec<TargetPlatform>,
    /// Files copied verbatim into every archive.
    pub files: Vec<PathBuf>,
    /// Upload destination token; no upload when `None`.
    pub upload_destination: Option<String>,
    /// Reaction to a failed target.
    pub policy: FailurePolicy,
}

/// Result of packaging one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutcome {
    /// Built binary
    pub artifact: PathBuf,
    /// Manifest written beside the binary
    pub manifest: PathBuf,
    /// Zip archive
    pub archive: PathBuf,
    /// Archive entry names in write order
    pub entries: Vec<String>,
    /// Hex-encoded SHA-256 of the archive
    pub checksum: String,
    /// Whether the archive was handed to the upload helper
    pub uploaded: bool,
}

/// Builds and packages plugins.
///
/// # Examples
///
/// ```no_run
/// use release_pipeline::bundler::{PackageRequest, PackageSpecBuilder, Packager, PipelineConfig, LINUX_AMD64};
///
/// # async fn example() -> release_pipeline::bundler::Result<()> {
/// let packager = Packager::new(PipelineConfig::default());
/// let spec = PackageSpecBuilder::new("agent", semver::Version::new(1, 2, 3)).build()?;
/// let report = packager
///     .package(&spec, &PackageRequest {
///         targets: vec![LINUX_AMD64],
///         files: vec!["README.md".into()],
///         ..Default::default()
///     })
///     .await?;
/// report.into_result()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Packager {
    builder: Builder,
}

impl Packager {
    /// Creates a packager using the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            builder: Builder::new(config),
        }
    }

    fn config(&self) -> &PipelineConfig {
        self.builder.config()
    }

    /// Spec used for packaging: the caller's template, or the nested plugin layout.
    pub fn packaging_spec(spec: &PackageSpec) -> PackageSpec {
        match spec.out_template() {
            Some(_) => spec.clone(),
            None => spec.with_template(plugin_layout_template(spec.name())),
        }
    }

    /// Packages `spec` for every requested target.
    ///
    /// # Errors
    ///
    /// The outer error is a configuration problem found before any target
    /// is attempted (missing or malformed manifest). Per-target failures
    /// are reported in the returned [`MatrixReport`].
    pub async fn package(
        &self,
        spec: &PackageSpec,
        request: &PackageRequest,
    ) -> Result<MatrixReport<PackageOutcome>> {
        let manifest_path = &self.config().manifest_path;
        let mut manifest = Manifest::load(manifest_path).await?;
        manifest.version = Some(spec.version_string());
        manifest
            .inline_icon(manifest_path.parent().unwrap_or(Path::new("")))
            .await;

        let spec = Self::packaging_spec(spec);
        let targets = self.config().targets_or_default(&request.targets);
        let mut report = MatrixReport::new();

        for target in targets {
            let result = self.package_target(&spec, &target, &manifest, request).await;
            if !report.record(target, result, request.policy) {
                log::warn!("Stopping packaging after first failure");
                break;
            }
        }

        Ok(report)
    }

    async fn package_target(
        &self,
        spec: &PackageSpec,
        target: &TargetPlatform,
        manifest: &Manifest,
        request: &PackageRequest,
    ) -> Result<PackageOutcome> {
        let artifact = self.builder.build(spec, target).await?;
        let out_dir = artifact
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let executable = artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context(format!("artifact path {} has no file name", artifact.display()))?;

        let manifest_name = self
            .config()
            .manifest_path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("manifest.json"));
        let manifest_out = out_dir.join(manifest_name);
        if same_file(&manifest_out, &self.config().manifest_path).await {
            return Err(Error::Manifest {
                path: manifest_out,
                reason: "stamped manifest would overwrite its source".into(),
            });
        }
        manifest
            .for_target(target, &executable)
            .write(&manifest_out)
            .await?;

        let archive = out_dir.join(&self.config().archive_name);
        let mut include = vec![artifact.clone(), manifest_out.clone()];
        for file in &request.files {
            let destination = aux_destination(&out_dir, file);
            if destination == archive || same_file(file, &archive).await {
                return Err(Error::Archive {
                    path: archive,
                    reason: format!(
                        "auxiliary file {} would be overwritten by the archive",
                        file.display()
                    ),
                });
            }
            if include.contains(&destination) {
                log::debug!("{} already included, not overwriting", destination.display());
            } else {
                link_or_copy(file, &destination).await?;
            }
            include.push(destination);
        }

        let entries = write_zip(&archive, &include).await?;
        let checksum = calculate_sha256(&archive).await?;
        log::info!("Packaged {} for {} ({})", archive.display(), target, checksum);

        let uploaded = match request.upload_destination.as_deref() {
            Some(destination) => {
                upload_archive(&self.config().upload, &archive, destination).await?;
                true
            }
            None => false,
        };

        Ok(PackageOutcome {
            artifact,
            manifest: manifest_out,
            archive,
            entries,
            checksum,
            uploaded,
        })
    }
}

/// Location of an auxiliary file inside a target directory.
///
/// Relative paths keep their structure; absolute paths keep only the file name.
fn aux_destination(out_dir: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        match file.file_name() {
            Some(name) => out_dir.join(name),
            None => file.to_path_buf(),
        }
    } else {
        out_dir.join(file)
    }
}
