//! Package specification handed to build and package calls.

use std::path::{Path, PathBuf};

/// Description of the package being compiled.
///
/// Constructed through [`super::PackageSpecBuilder`] and never mutated by a
/// build call. The version is the only field consulted for path and archive
/// naming besides the name itself.
///
/// # Examples
///
/// ```no_run
/// use release_pipeline::bundler::PackageSpecBuilder;
///
/// let spec = PackageSpecBuilder::new("agent", semver::Version::new(1, 2, 3))
///     .source("./cmd/agent")
///     .out_dir("./bin")
///     .shrink(true)
///     .build()
///     .unwrap();
/// assert_eq!(spec.version_string(), "1.2.3");
/// ```
#[derive(Debug, Clone)]
pub struct PackageSpec {
    pub(super) name: String,
    pub(super) version: semver::Version,
    /// Replaces the rendered semver in names when set.
    pub(super) version_override: Option<String>,
    /// Source path handed to the compiler as its last argument.
    pub(super) source: PathBuf,
    /// None means use the configured default output directory.
    pub(super) out_dir: Option<PathBuf>,
    /// Handlebars template producing the full output path.
    pub(super) out_template: Option<String>,
    pub(super) build_args: Vec<String>,
    pub(super) shrink: bool,
    pub(super) native_interop: bool,
}

impl PackageSpec {
    /// Package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parsed semantic version.
    pub fn version(&self) -> &semver::Version {
        &self.version
    }

    /// Version as used in names: the override if present, otherwise the semver.
    pub fn version_string(&self) -> String {
        self.version_override
            .clone()
            .unwrap_or_else(|| self.version.to_string())
    }

    /// Source path passed to the compiler.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Explicit output directory, if any.
    pub fn out_dir(&self) -> Option<&Path> {
        self.out_dir.as_deref()
    }

    /// Naming template, if any.
    pub fn out_template(&self) -> Option<&str> {
        self.out_template.as_deref()
    }

    /// Extra compiler arguments placed between the output flag and the source.
    pub fn build_args(&self) -> &[String] {
        &self.build_args
    }

    /// Whether the size-reduction post-process was requested.
    pub fn shrink(&self) -> bool {
        self.shrink
    }

    /// Whether native interop stays enabled during compilation.
    pub fn native_interop(&self) -> bool {
        self.native_interop
    }

    /// Copy of this spec with a naming template set.
    ///
    /// Used by the packager to apply its directory layout without touching
    /// the caller's value.
    pub fn with_template(&self, template: impl Into<String>) -> Self {
        Self {
            out_template: Some(template.into()),
            ..self.clone()
        }
    }
}
