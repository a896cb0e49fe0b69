//! Command execution functions for pipeline operations.
//!
//! Each command returns the process exit code; per-target failures are
//! printed and turned into a non-zero code rather than an error.

mod build;
mod deploy;
mod package;

pub use build::build;
pub use deploy::deploy;
pub use package::package;
