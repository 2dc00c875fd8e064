//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Publish a directory into a versioned subdirectory of a git branch
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: gh-pages-multi.toml, searched upward)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Push a directory into <branch>/<target> and refresh the index page
    #[command(visible_alias = "d")]
    Deploy {
        #[command(flatten)]
        args: DeployArgs,
    },

    /// Print the `major.minor` form of a version-like target
    #[command(visible_alias = "bt")]
    BetterTarget {
        /// Target name, e.g. a tag such as v1.2.3
        target: String,
    },
}

/// Deploy command arguments.
///
/// Unset options fall back to `[deploy]` in the config file, then to defaults.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct DeployArgs {
    /// Directory to publish [default: docs]
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub src: Option<PathBuf>,

    /// Subdirectory of the branch to publish into [default: latest]
    #[arg(short, long)]
    pub target: Option<String>,

    /// Remote repository [default: the `origin` remote]
    #[arg(short, long, value_hint = clap::ValueHint::Url)]
    pub remote: Option<String>,

    /// Branch to publish to [default: gh-pages]
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Index page template [default: embedded]
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub template: Option<PathBuf>,

    /// Index page title [default: repository name]
    #[arg(long)]
    pub title: Option<String>,

    /// Erase the history of the target directory and force-push
    #[arg(long)]
    pub no_history: bool,

    /// Publish `1.2.3`-like targets as `1.2`
    #[arg(long)]
    pub better_target: bool,

    /// Prepare and stage everything, keep the workspace, skip commit and push
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,
}

impl DeployArgs {
    /// Dry runs always report every step.
    pub const fn is_verbose(&self) -> bool {
        self.verbose || self.dry_run
    }
}
