//! Build-matrix resolution and plugin packaging.
//!
//! Components, leaf first:
//!
//! - [`settings`] - target platforms, the default matrix, package specs and
//!   the pipeline configuration
//! - [`path`] - output path resolution (templates and default naming)
//! - [`builder`] - compiler invocation, best-effort shrinking, matrix driver
//! - [`package`] - manifest stamping, zip assembly and upload hand-off
//!
//! # Example
//!
//! ```no_run
//! use release_pipeline::bundler::{Builder, FailurePolicy, PackageSpecBuilder, PipelineConfig};
//!
//! # async fn example() -> release_pipeline::bundler::Result<()> {
//! let spec = PackageSpecBuilder::new("agent", semver::Version::new(1, 2, 3)).build()?;
//! let builder = Builder::new(PipelineConfig::default());
//! builder
//!     .build_matrix(&spec, &[], FailurePolicy::CollectAll)
//!     .await
//!     .into_result()?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod error;
mod outcome;
pub mod package;
pub mod path;
pub mod settings;
pub mod utils;

pub use builder::{Builder, BuiltArtifact};
pub use error::{Error, Result};
pub use outcome::{FailurePolicy, MatrixReport, TargetOutcome};
pub use package::{Manifest, PackageOutcome, PackageRequest, Packager};
pub use path::{plugin_layout_template, resolve_output_path};
pub use settings::*;
