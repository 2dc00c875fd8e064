//! `deploy` and `better-target` commands.

use crate::{
    cli::DeployArgs,
    config::ProjectConfig,
    debug,
    deploy::{DeployOutcome, Deployer},
    log,
    logger::Logger,
    utils::{git::Git, version::better_target},
};
use anyhow::Result;
use std::path::Path;

/// Load configuration and run one deployment.
pub fn deploy_site(config_path: Option<&Path>, args: &DeployArgs) -> Result<()> {
    let logger = Logger::new(args.is_verbose());

    let git = Git::ensure_installed()?;
    debug!(logger, "deploy"; "using {}", git.display());

    let config = ProjectConfig::load(config_path, args, logger)?;
    if let Some(path) = &config.config_path {
        debug!(logger, "deploy"; "config {}", path.display());
    }

    let request = config.to_request(args.dry_run)?;
    log!(
        logger,
        "deploy";
        "{} -> {}:{}/{}",
        request.src.display(),
        request.remote,
        request.branch,
        request.target()
    );

    match Deployer::new(logger).deploy(&request)? {
        DeployOutcome::Pushed { message, report } => {
            debug!(logger, "deploy"; "committed \"{}\"", message);
            log!(logger, "done"; "{}", report);
        }
        DeployOutcome::Unchanged => {
            log!(logger, "done"; "{} is already up to date", request.target());
        }
        DeployOutcome::DryRun { workspace } => {
            log!(logger, "done"; "dry run complete, inspect {}", workspace.display());
        }
    }

    Ok(())
}

/// Print the normalized form of `target`.
pub fn print_better_target(target: &str) {
    println!("{}", better_target(target));
}
