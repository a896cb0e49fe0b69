//! Compilation of a package for one target or a whole matrix.
//!
//! This module provides the [`Builder`] that invokes the external compiler
//! with a target-specific environment and the matrix driver on top of it.
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum calculation for artifacts
//! - [`compile`] - Single-target compilation ([`Builder::build`])
//! - [`orchestrator`] - Matrix driver ([`Builder::build_matrix`])
//! - [`shrink`] - Best-effort strip / compress post-process

mod checksum;
mod compile;
mod orchestrator;
mod shrink;

pub use checksum::calculate_sha256;
pub use compile::Builder;
pub use orchestrator::BuiltArtifact;
pub(crate) use shrink::find_tool;
