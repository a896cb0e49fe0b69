//! Command line interface for the release pipeline.
//!
//! Parses arguments, loads configuration and dispatches to the
//! build, package and deploy commands.

mod args;
pub mod commands;
mod output;
mod runtime;

pub use args::{Args, BuildArgs, Command, DeployArgs, PackageArgs, PackageSpecArgs};
pub use output::OutputManager;
pub use runtime::RuntimeConfig;

use crate::error::{CliError, Result};

/// Main CLI entry point; returns the process exit code.
pub async fn run(args: Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let runtime = RuntimeConfig::load(&args)?;

    match &args.command {
        Command::Build(build) => commands::build(build, &runtime).await,
        Command::Package(package) => commands::package(package, &runtime).await,
        Command::Deploy(deploy) => commands::deploy(deploy, &runtime).await,
    }
}
