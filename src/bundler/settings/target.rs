//! Compilation target platforms and the default target matrix.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Operating system / architecture pair a binary is compiled for.
///
/// Both fields empty denotes the host build: no cross-compilation
/// overrides are applied and the artifact takes the bare package name.
///
/// # Examples
///
/// ```no_run
/// use release_pipeline::bundler::TargetPlatform;
///
/// let target: TargetPlatform = "windows/amd64".parse().unwrap();
/// assert_eq!(target.to_string(), "windows_amd64");
/// assert!(target.is_windows());
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TargetPlatform {
    /// Operating system (e.g. `linux`, `windows`, `darwin`). Empty means host.
    #[serde(default)]
    pub os: Cow<'static, str>,
    /// Architecture (e.g. `amd64`, `386`, `arm64`). Empty means host.
    #[serde(default)]
    pub arch: Cow<'static, str>,
}

/// Linux on 32-bit x86.
pub const LINUX_386: TargetPlatform = TargetPlatform::from_static("linux", "386");
/// Linux on x86_64.
pub const LINUX_AMD64: TargetPlatform = TargetPlatform::from_static("linux", "amd64");
/// Windows on 32-bit x86.
pub const WINDOWS_386: TargetPlatform = TargetPlatform::from_static("windows", "386");
/// Windows on x86_64.
pub const WINDOWS_AMD64: TargetPlatform = TargetPlatform::from_static("windows", "amd64");
/// macOS on Intel. Not part of the default matrix.
pub const DARWIN_AMD64: TargetPlatform = TargetPlatform::from_static("darwin", "amd64");
/// macOS on Apple Silicon. Not part of the default matrix.
pub const DARWIN_ARM64: TargetPlatform = TargetPlatform::from_static("darwin", "arm64");
/// The host platform, no overrides.
pub const HOST: TargetPlatform = TargetPlatform::from_static("", "");

/// Default matrix used when a caller names no targets.
///
/// Darwin targets are left out on purpose; request them explicitly.
pub fn default_matrix() -> Vec<TargetPlatform> {
    vec![LINUX_386, LINUX_AMD64, WINDOWS_386, WINDOWS_AMD64]
}

impl TargetPlatform {
    /// Creates a target from owned or borrowed strings.
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: Cow::Owned(os.into()),
            arch: Cow::Owned(arch.into()),
        }
    }

    const fn from_static(os: &'static str, arch: &'static str) -> Self {
        Self {
            os: Cow::Borrowed(os),
            arch: Cow::Borrowed(arch),
        }
    }

    /// Operating system name.
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Architecture name.
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// True when neither OS nor architecture is set.
    pub fn is_host(&self) -> bool {
        self.os.is_empty() && self.arch.is_empty()
    }

    /// True when the target OS is Windows.
    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }

    /// True when the produced binary is a Linux ELF, including host builds on Linux.
    pub fn is_linux(&self) -> bool {
        if self.os.is_empty() {
            cfg!(target_os = "linux")
        } else {
            self.os == "linux"
        }
    }

    /// `.exe` for Windows targets, empty otherwise.
    pub fn executable_suffix(&self) -> &'static str {
        if self.is_windows() { ".exe" } else { "" }
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)
    }
}

impl FromStr for TargetPlatform {
    type Err = String;

    /// Accepts `os/arch`, `os_arch`, or `host` / `local` / empty for the host build.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("host") || s.eq_ignore_ascii_case("local") {
            return Ok(HOST);
        }

        let (os, arch) = s
            .split_once('/')
            .or_else(|| s.split_once('_'))
            .ok_or_else(|| format!("invalid target '{s}': expected os/arch, e.g. linux/amd64"))?;

        if os.is_empty() || arch.is_empty() {
            return Err(format!(
                "invalid target '{s}': both os and arch are required (use 'host' for a host build)"
            ));
        }

        Ok(Self::new(os, arch))
    }
}
