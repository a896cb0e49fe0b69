//! Configuration structures for build and packaging runs.
//!
//! This module provides the package specification, its builder, the target
//! platform type with the default matrix, and the explicit pipeline
//! configuration that replaces process-wide defaults.

mod builder;
mod core;
mod package;
mod target;

// Re-export all public types
pub use builder::PackageSpecBuilder;
pub use core::{DEFAULT_CONFIG_FILE, DEFAULT_OUT_DIR, PipelineConfig, Toolchain, UploadConfig};
pub use package::PackageSpec;
pub use target::{
    DARWIN_AMD64, DARWIN_ARM64, HOST, LINUX_386, LINUX_AMD64, TargetPlatform, WINDOWS_386,
    WINDOWS_AMD64, default_matrix,
};
