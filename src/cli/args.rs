//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap,
//! with validation and conversion into library types.

use crate::bundler::{FailurePolicy, PackageSpec, PackageSpecBuilder, TargetPlatform};
use crate::deploy::{ENV_IMAGE, ENV_SERVICE, ENV_TIMEOUT, UpgradeOptions};
use crate::error::CliError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Cross-compile, package and deploy releases
#[derive(Parser, Debug)]
#[command(
    name = "release_pipeline",
    version,
    about = "Cross-compile, package and deploy releases",
    long_about = "Builds a package for a matrix of OS/architecture targets, assembles plugin archives, \
and drives confirmed rolling upgrades of a deployed service.

Usage:
  release_pipeline build --name agent --version 1.2.3 --target linux/amd64 --target windows/amd64
  release_pipeline package --name agent --version 1.2.3 --file README.md
  release_pipeline deploy --image org/agent:1.2.3 --service stack-a/agent

Exit code 0 = every requested target (or the deployment) succeeded."
)]
pub struct Args {
    /// Pipeline configuration file (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show detailed progress and debug logs
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Cross-compile the package for each target
    Build(BuildArgs),
    /// Build, write the manifest, archive and optionally upload each target
    Package(PackageArgs),
    /// Upgrade a deployed service to a new image
    Deploy(DeployArgs),
}

/// Package identity and build options shared by `build` and `package`.
#[derive(clap::Args, Debug, Clone)]
pub struct PackageSpecArgs {
    /// Package name
    #[arg(long)]
    pub name: String,

    /// Package version (semver)
    #[arg(long = "version", value_name = "VERSION")]
    pub version: String,

    /// String used in place of the version in output names
    #[arg(long, value_name = "VERSION")]
    pub version_override: Option<String>,

    /// Source path handed to the compiler
    #[arg(long, default_value = ".")]
    pub source: PathBuf,

    /// Output directory for the default naming scheme
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Output path template (Handlebars)
    #[arg(long, value_name = "TEMPLATE")]
    pub template: Option<String>,

    /// Target as os/arch; repeat for several, omit for the default matrix
    #[arg(long = "target", value_name = "OS/ARCH")]
    pub targets: Vec<TargetPlatform>,

    /// Strip and compress built binaries
    #[arg(long)]
    pub shrink: bool,

    /// Enable native interop when compiling
    #[arg(long)]
    pub native_interop: bool,

    /// Stop at the first failed target
    #[arg(long)]
    pub fail_fast: bool,

    /// Extra compiler arguments
    #[arg(last = true, value_name = "ARGS")]
    pub build_args: Vec<String>,
}

impl PackageSpecArgs {
    /// Builds the package specification.
    pub fn to_spec(&self) -> Result<PackageSpec, CliError> {
        let version = semver::Version::parse(&self.version).map_err(|e| CliError::InvalidArguments {
            reason: format!("invalid version '{}': {}", self.version, e),
        })?;

        let mut builder = PackageSpecBuilder::new(&self.name, version)
            .source(&self.source)
            .build_args(self.build_args.clone())
            .shrink(self.shrink)
            .native_interop(self.native_interop);
        if let Some(version) = &self.version_override {
            builder = builder.version_override(version);
        }
        if let Some(out_dir) = &self.out_dir {
            builder = builder.out_dir(out_dir);
        }
        if let Some(template) = &self.template {
            builder = builder.out_template(template);
        }

        builder.build().map_err(|e| CliError::InvalidArguments {
            reason: e.to_string(),
        })
    }

    pub fn policy(&self) -> FailurePolicy {
        if self.fail_fast {
            FailurePolicy::FailFast
        } else {
            FailurePolicy::CollectAll
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub spec: PackageSpecArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct PackageArgs {
    #[command(flatten)]
    pub spec: PackageSpecArgs,

    /// Auxiliary file to include in each archive; repeatable
    #[arg(long = "file", value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Manifest template (defaults to the configured manifest path)
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Upload destination; overrides the configured upload variable
    #[arg(long, value_name = "ENV")]
    pub upload_env: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct DeployArgs {
    /// Image reference to deploy
    #[arg(long, env = ENV_IMAGE)]
    pub image: String,

    /// Service to upgrade, as stack/service or service
    #[arg(long, env = ENV_SERVICE)]
    pub service: String,

    /// Submit the upgrade without waiting for it
    #[arg(long)]
    pub no_confirm: bool,

    /// Confirmation timeout in seconds
    #[arg(long, env = ENV_TIMEOUT, value_name = "SECS", value_parser = parse_secs)]
    pub timeout: Option<Duration>,

    /// Seconds between state checks
    #[arg(long, value_name = "SECS", default_value_t = 3)]
    pub poll_interval: u64,

    /// Start new instances before stopping old ones
    #[arg(long)]
    pub start_first: bool,

    /// Instances replaced per batch
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub batch_size: u64,

    /// Pause between batches in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 2000)]
    pub batch_interval_ms: u64,

    /// Roll back when the upgrade is not confirmed
    #[arg(long)]
    pub rollback_on_failure: bool,
}

fn parse_secs(value: &str) -> Result<Duration, String> {
    crate::deploy::parse_timeout(value).map_err(|e| e.to_string())
}

impl DeployArgs {
    pub fn options(&self) -> UpgradeOptions {
        let defaults = UpgradeOptions::default();
        UpgradeOptions {
            start_first: self.start_first,
            batch_size: self.batch_size,
            batch_interval: Duration::from_millis(self.batch_interval_ms),
            confirm: !self.no_confirm,
            timeout: self.timeout.unwrap_or(defaults.timeout),
            poll_interval: Duration::from_secs(self.poll_interval),
            rollback_on_failure: self.rollback_on_failure,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Default log filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        let spec = match &self.command {
            Command::Build(args) => &args.spec,
            Command::Package(args) => &args.spec,
            Command::Deploy(args) => {
                if args.image.trim().is_empty() {
                    return Err("Image cannot be empty".to_string());
                }
                return Ok(());
            }
        };

        if spec.name.trim().is_empty() {
            return Err("Name cannot be empty".to_string());
        }
        if spec.template.is_some() && spec.out_dir.is_some() {
            return Err("--template and --out-dir cannot be combined".to_string());
        }

        Ok(())
    }
}
