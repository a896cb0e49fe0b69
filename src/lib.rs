//! Release pipeline library
//!
//! This library provides the building blocks of a release pipeline:
//! - Cross-compiling a package for a matrix of OS/architecture targets
//! - Packaging plugin archives (binary + manifest + auxiliary files)
//! - Confirmed rolling upgrades of a deployed service
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod deploy;
pub mod error;

// Re-export commonly used types
pub use error::{CliError, PipelineError, Result};
