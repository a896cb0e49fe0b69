//! Configuration derived from command line arguments.

use super::{Args, OutputManager};
use crate::bundler::{DEFAULT_CONFIG_FILE, PipelineConfig};
use std::path::PathBuf;

/// Loaded pipeline configuration plus the output manager
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    output: OutputManager,
    pipeline: PipelineConfig,
}

impl RuntimeConfig {
    /// Loads `--config`, or `release.toml` in the working directory if present.
    pub fn load(args: &Args) -> crate::bundler::Result<Self> {
        let (path, explicit) = match &args.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        let pipeline = PipelineConfig::load(&path, explicit)?;

        Ok(Self {
            output: OutputManager::new(args.verbose, args.quiet),
            pipeline,
        })
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &OutputManager {
        &self.output
    }

    pub fn pipeline(&self) -> &PipelineConfig {
        &self.pipeline
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) -> std::io::Result<()> {
        self.output.verbose(message)
    }

    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    pub fn error(&self, message: &str) -> std::io::Result<()> {
        self.output.error(message)
    }

    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.output.progress(message)
    }

    pub fn section(&self, title: &str) -> std::io::Result<()> {
        self.output.section(title)
    }

    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }
}
