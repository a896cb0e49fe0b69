//! Error types for building and packaging.
//!
//! Every variant carries enough context (template text, target platform,
//! file path) to locate the failing step without re-running verbosely.

use super::settings::TargetPlatform;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for build and packaging operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving paths, compiling, and packaging.
#[derive(Error, Debug)]
pub enum Error {
    /// Pipeline configuration file missing or malformed
    #[error("configuration {}: {reason}", .path.display())]
    Config {
        /// Configuration file
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Naming template failed to compile or render
    #[error("failed to render output template {template:?}: {reason}")]
    PathTemplate {
        /// The offending template text
        template: String,
        /// Renderer message
        reason: String,
    },

    /// Compiler exited with a non-zero status
    #[error("build of {target} to {} failed ({status}):\n{output}", .path.display())]
    CompileFailed {
        /// Target being built
        target: TargetPlatform,
        /// Resolved output path (may hold a partial artifact)
        path: PathBuf,
        /// Exit status description
        status: String,
        /// Combined stdout and stderr
        output: String,
    },

    /// Compiler could not be started at all
    #[error("failed to run compiler {program:?} for {target} (output {}): {source}", .path.display())]
    CompilerSpawn {
        /// Compiler program
        program: String,
        /// Target being built
        target: TargetPlatform,
        /// Resolved output path that was never produced
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Manifest could not be read, parsed or written
    #[error("manifest {}: {reason}", .path.display())]
    Manifest {
        /// Manifest path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Zip assembly failed
    #[error("failed to assemble archive {}: {reason}", .path.display())]
    Archive {
        /// Archive path
        path: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Filesystem operation failed
    #[error("error {context} {}: {source}", .path.display())]
    Fs {
        /// Operation being performed
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Upload requested but the helper tool is not installed
    #[error(
        "upload requested but {program:?} was not found in PATH; install it before enabling uploads"
    )]
    UploadToolMissing {
        /// Helper program name
        program: String,
    },

    /// Upload helper ran and failed
    #[error("upload of {} failed ({status}):\n{output}", .archive.display())]
    UploadFailed {
        /// Archive being uploaded
        archive: PathBuf,
        /// Exit status description
        status: String,
        /// Combined stdout and stderr
        output: String,
    },

    /// One or more targets of a matrix run failed
    #[error("{} target(s) failed: {}", .failures.len(), format_failures(.failures))]
    TargetFailures {
        /// Failed target and its error message, in matrix order
        failures: Vec<(TargetPlatform, String)>,
    },

    /// JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anything else
    #[error("{0}")]
    GenericError(String),
}

fn format_failures(failures: &[(TargetPlatform, String)]) -> String {
    failures
        .iter()
        .map(|(target, message)| format!("[{target}] {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Target platform this error is tied to, if any.
    pub fn target(&self) -> Option<&TargetPlatform> {
        match self {
            Error::CompileFailed { target, .. } | Error::CompilerSpawn { target, .. } => {
                Some(target)
            }
            _ => None,
        }
    }
}

/// Attaches an operation description and path to IO results.
pub trait ErrorExt<T> {
    /// Wraps an IO error into [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

/// Converts missing values into [`Error::GenericError`].
pub trait Context<T> {
    /// Returns the contained value or an error with the given message.
    fn context<C: Display>(self, msg: C) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display>(self, msg: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(msg.to_string()))
    }
}
