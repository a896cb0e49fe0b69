//! Best-effort size reduction of built artifacts.
//!
//! Both tools are optional. A missing tool is skipped, a failing tool is
//! logged; neither ever fails the build.

use crate::bundler::settings::{TargetPlatform, Toolchain};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Looks up an external tool in PATH.
pub(crate) fn find_tool(program: &str) -> Option<PathBuf> {
    match which::which(program) {
        Ok(path) => {
            log::debug!("Found {} at: {}", program, path.display());
            Some(path)
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}. Skipping.", program, e);
            None
        }
    }
}

/// Strips symbols (Linux binaries only) and compresses the executable.
pub async fn try_shrink(toolchain: &Toolchain, target: &TargetPlatform, binary: &Path) {
    if target.is_linux() {
        if let Some(strip) = find_tool(&toolchain.strip_program) {
            run_tool(&strip, binary).await;
        }
    }

    if let Some(compress) = find_tool(&toolchain.compress_program) {
        run_tool(&compress, binary).await;
    }
}

async fn run_tool(tool: &Path, binary: &Path) {
    match Command::new(tool).arg(binary).output().await {
        Ok(output) if output.status.success() => {
            log::info!("✓ {} {}", tool.display(), binary.display());
        }
        Ok(output) => {
            log::warn!(
                "running {} on {:?} returned {}: {}",
                tool.display(),
                binary,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Err(e) => {
            log::warn!("running {} on {:?} failed: {}", tool.display(), binary, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::settings::LINUX_AMD64;

    #[tokio::test]
    async fn missing_tools_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("agent");
        std::fs::write(&binary, b"binary").unwrap();

        let toolchain = Toolchain {
            strip_program: "release-pipeline-missing-strip".into(),
            compress_program: "release-pipeline-missing-upx".into(),
            ..Toolchain::default()
        };
        try_shrink(&toolchain, &LINUX_AMD64, &binary).await;

        assert_eq!(std::fs::read(&binary).unwrap(), b"binary");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_tool_does_not_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("agent");
        std::fs::write(&binary, b"binary").unwrap();

        // `false` exists on every unix and always exits non-zero.
        let toolchain = Toolchain {
            strip_program: "false".into(),
            compress_program: "false".into(),
            ..Toolchain::default()
        };
        try_shrink(&toolchain, &LINUX_AMD64, &binary).await;

        assert!(binary.is_file());
    }
}
