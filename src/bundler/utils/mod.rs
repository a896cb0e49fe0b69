//! Shared helpers for build and packaging steps.

pub mod fs;
