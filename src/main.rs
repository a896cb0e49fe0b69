//! Release pipeline - cross-compile, package and deploy.
//!
//! This binary builds a package for a matrix of targets, assembles plugin
//! archives and drives confirmed rolling upgrades.

use release_pipeline::cli;
use std::process;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse_args();

    // Initialize logging; RUST_LOG still wins over -v
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter())).init();

    // Run CLI and get exit code
    let exit_code = match cli::run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            for hint in e.recovery_suggestions() {
                eprintln!("  hint: {}", hint);
            }
            1
        }
    };

    process::exit(exit_code);
}
