//! Plugin packaging: manifest stamping, archive assembly and upload.
//!
//! - [`manifest`] - typed manifest with pass-through extension fields
//! - [`archive`] - deduplicating zip writer
//! - [`upload`] - external upload helper hand-off
//! - [`plugin`] - the per-target [`Packager`]

pub mod archive;
pub mod manifest;
mod plugin;
pub mod upload;

pub use manifest::Manifest;
pub use plugin::{PackageOutcome, PackageRequest, Packager};
