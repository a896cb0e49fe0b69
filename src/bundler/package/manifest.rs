//! Plugin manifest document.
//!
//! The manifest schema belongs to the plugin ecosystem. Only the platform,
//! version, executable and icon fields are owned here; every other field is
//! carried through [`Manifest::extra`] untouched.

use crate::bundler::{
    Error, Result,
    error::ErrorExt,
    settings::TargetPlatform,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Manifest with the well-known fields typed and the rest preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Package version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Target operating system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,

    /// Target architecture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,

    /// File name of the executable inside the archive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,

    /// Inlined icon as a data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Path of the icon image to inline
    #[serde(default, rename = "iconFile", skip_serializing_if = "Option::is_none")]
    pub icon_file: Option<String>,

    /// Every field not listed above
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Manifest {
    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// A missing or malformed manifest is a configuration error naming the path.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| Error::Manifest {
            path: path.to_path_buf(),
            reason: if e.kind() == std::io::ErrorKind::NotFound {
                "file not found".to_string()
            } else {
                e.to_string()
            },
        })?;

        Self::parse(&bytes).map_err(|e| Error::Manifest {
            path: path.to_path_buf(),
            reason: format!("invalid JSON object: {e}"),
        })
    }

    /// Parses manifest JSON.
    pub fn parse(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Replaces `icon` with the data URI of `iconFile`, resolved against
    /// `base_dir` when relative.
    ///
    /// An unreadable icon is logged and left out; it never fails packaging.
    pub async fn inline_icon(&mut self, base_dir: &Path) {
        let Some(icon_file) = self.icon_file.as_deref() else {
            return;
        };
        let icon_path = base_dir.join(icon_file);

        match tokio::fs::read(&icon_path).await {
            Ok(bytes) => {
                let ext = icon_path
                    .extension()
                    .map(|e| e.to_string_lossy().to_ascii_lowercase())
                    .unwrap_or_default();
                let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
                self.icon = Some(format!("data:image/{ext};base64,{payload}"));
            }
            Err(e) => {
                log::warn!("Could not read icon {}: {}. Skipping icon.", icon_path.display(), e);
            }
        }
    }

    /// Copy of this manifest describing `executable` built for `target`.
    pub fn for_target(&self, target: &TargetPlatform, executable: &str) -> Self {
        Self {
            os: Some(target.os().to_string()),
            arch: Some(target.arch().to_string()),
            executable: Some(executable.to_string()),
            ..self.clone()
        }
    }

    /// Writes the manifest as JSON, creating parent directories.
    pub async fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .fs_context("creating manifest directory", parent)?;
        }
        let json = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, json)
            .await
            .fs_context("writing manifest", path)
    }
}
