//! Hand-off of finished archives to the external upload helper.
//!
//! The helper is only looked up, never installed: its absence is a
//! configuration error.

use crate::bundler::{
    Error, Result,
    builder::find_tool,
    settings::UploadConfig,
};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Verifies the upload helper is installed and returns its location.
pub fn ensure_helper_installed(config: &UploadConfig) -> Result<PathBuf> {
    find_tool(&config.program).ok_or_else(|| Error::UploadToolMissing {
        program: config.program.clone(),
    })
}

/// Uploads `archive` to `destination` through the helper.
pub async fn upload_archive(config: &UploadConfig, archive: &Path, destination: &str) -> Result<()> {
    let helper = ensure_helper_installed(config)?;

    log::info!("Uploading {} to {} ...", archive.display(), destination);

    let output = Command::new(&helper)
        .args(&config.args)
        .arg(archive)
        .arg(&config.env_flag)
        .arg(destination)
        .output()
        .await
        .map_err(|e| Error::UploadFailed {
            archive: archive.to_path_buf(),
            status: "not started".to_string(),
            output: e.to_string(),
        })?;

    if !output.status.success() {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        return Err(Error::UploadFailed {
            archive: archive.to_path_buf(),
            status: output.status.to_string(),
            output: combined.trim_end().to_string(),
        });
    }

    log::info!("✓ Uploaded {}", archive.display());
    Ok(())
}
