//! `package`: build, manifest, archive and optional upload per target.

use super::build::summarize;
use crate::bundler::{PackageRequest, Packager};
use crate::cli::{PackageArgs, RuntimeConfig};
use crate::error::Result;

pub async fn package(args: &PackageArgs, runtime: &RuntimeConfig) -> Result<i32> {
    let spec = args.spec.to_spec()?;

    let mut config = runtime.pipeline().clone();
    if let Some(manifest) = &args.manifest {
        config.manifest_path = manifest.clone();
    }

    let request = PackageRequest {
        targets: args.spec.targets.clone(),
        files: args.files.clone(),
        upload_destination: args
            .upload_env
            .clone()
            .or_else(|| config.upload.destination()),
        policy: args.spec.policy(),
    };
    if request.upload_destination.is_none() {
        runtime.verbose_println(&format!(
            "{} not set, archives will not be uploaded",
            config.upload.env_var
        ))?;
    }

    runtime.section(&format!("Packaging {} {}", spec.name(), spec.version_string()))?;
    let packager = Packager::new(config);
    let report = packager.package(&spec, &request).await?;

    for outcome in report.outcomes() {
        match &outcome.result {
            Ok(packaged) => {
                runtime.success(&format!("{}: {}", outcome.target, packaged.archive.display()))?;
                runtime.verbose_println(&format!(
                    "{} entries, sha256 {}",
                    packaged.entries.len(),
                    packaged.checksum
                ))?;
                if packaged.uploaded {
                    runtime.indent("uploaded")?;
                }
            }
            Err(e) => runtime.error(&format!("{}: {}", outcome.target, e))?,
        }
    }

    summarize(runtime, &report)
}
