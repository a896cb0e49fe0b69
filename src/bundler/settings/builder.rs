//! Builder for constructing a PackageSpec.

use super::PackageSpec;
use crate::bundler::Error;
use std::path::{Path, PathBuf};

/// Builder for constructing [`PackageSpec`].
///
/// # Examples
///
/// ```no_run
/// use release_pipeline::bundler::PackageSpecBuilder;
///
/// # fn example() -> release_pipeline::bundler::Result<()> {
/// let spec = PackageSpecBuilder::new("agent", "1.2.3".parse().unwrap())
///     .out_template("dist/{{os}}/{{name}}{{#if (eq os \"windows\")}}.exe{{/if}}")
///     .build_args(vec!["-trimpath".into()])
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PackageSpecBuilder {
    name: String,
    version: semver::Version,
    version_override: Option<String>,
    source: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    out_template: Option<String>,
    build_args: Vec<String>,
    shrink: bool,
    native_interop: bool,
}

impl PackageSpecBuilder {
    /// Starts a builder for the named package.
    pub fn new(name: impl Into<String>, version: semver::Version) -> Self {
        Self {
            name: name.into(),
            version,
            version_override: None,
            source: None,
            out_dir: None,
            out_template: None,
            build_args: Vec::new(),
            shrink: false,
            native_interop: false,
        }
    }

    /// Overrides the version string used in names.
    pub fn version_override(mut self, version: impl Into<String>) -> Self {
        self.version_override = Some(version.into());
        self
    }

    /// Sets the source path. Default: `.`
    pub fn source<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the output directory. Default: configured default (`./bin`).
    pub fn out_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.out_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the output naming template.
    pub fn out_template(mut self, template: impl Into<String>) -> Self {
        self.out_template = Some(template.into());
        self
    }

    /// Sets extra compiler arguments.
    pub fn build_args(mut self, args: Vec<String>) -> Self {
        self.build_args = args;
        self
    }

    /// Requests the best-effort size-reduction post-process.
    pub fn shrink(mut self, shrink: bool) -> Self {
        self.shrink = shrink;
        self
    }

    /// Keeps native interop enabled while compiling.
    pub fn native_interop(mut self, enabled: bool) -> Self {
        self.native_interop = enabled;
        self
    }

    /// Builds the spec.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or an empty template / version
    /// override was supplied.
    pub fn build(self) -> crate::bundler::Result<PackageSpec> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::GenericError("package name must not be empty".into()));
        }
        if self.out_template.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(Error::GenericError(
                "output template must not be empty when set".into(),
            ));
        }
        if self.version_override.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(Error::GenericError(
                "version override must not be empty when set".into(),
            ));
        }

        Ok(PackageSpec {
            name,
            version: self.version,
            version_override: self.version_override,
            source: self.source.unwrap_or_else(|| PathBuf::from(".")),
            out_dir: self.out_dir,
            out_template: self.out_template,
            build_args: self.build_args,
            shrink: self.shrink,
            native_interop: self.native_interop,
        })
    }
}
