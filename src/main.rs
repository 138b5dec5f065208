use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dataset_release::cli::{self, PackageTarget, StageStatus};
use dataset_release::config::{self, Workspace};
use dataset_release::git::Git2Repository;
use dataset_release::publisher::GhCliHost;
use dataset_release::ui;

#[derive(clap::Parser)]
#[command(
    name = "dataset-release",
    about = "Version, tag, package and publish datasets based on conventional commits",
    version
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Repository root (default: enclosing git work tree)")]
    root: Option<PathBuf>,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase log verbosity (-v, -vv)")]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decide version bumps from commits since each last release
    Plan,

    /// Bump versions and create tags from the saved plan
    Apply,

    /// Build release archives
    Package {
        #[arg(long, required_unless_present = "all", conflicts_with = "all", help = "Dataset to package")]
        dataset: Option<String>,

        #[arg(long, help = "Package every dataset")]
        all: bool,

        #[arg(long, help = "Version string (default: from git tag or timestamp)")]
        version: Option<String>,
    },

    /// Create hosted releases for the tags created by `apply`
    Publish,

    /// Copy raw dataset files to a local directory
    Deploy {
        #[arg(long, help = "Destination directory")]
        path: PathBuf,

        #[arg(long, help = "Deploy a single dataset (default: all)")]
        dataset: Option<String>,
    },
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(status) => process::exit(status.exit_code()),
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<StageStatus> {
    let root = resolve_root(args.root)?;
    let config = config::load_config(args.config.as_deref(), &root)?;
    let workspace = Workspace::new(root, config);

    match args.command {
        Command::Plan => {
            let repo = open_repository(&workspace.root)?;
            let outcome = cli::run_plan(&repo, &workspace)?;
            Ok(if outcome.plan.has_changes {
                StageStatus::Completed
            } else {
                StageStatus::NothingToDo
            })
        }
        Command::Apply => {
            let repo = open_repository(&workspace.root)?;
            let report = cli::run_apply(&repo, &workspace)?;
            Ok(if report.tags_created.is_empty() {
                StageStatus::NothingToDo
            } else {
                StageStatus::Completed
            })
        }
        Command::Package {
            dataset,
            all: _,
            version,
        } => {
            // Only consulted for the version; packaging works outside a repository
            let repo = Git2Repository::open(&workspace.root).ok();
            let target = match dataset {
                Some(name) => PackageTarget::Dataset(name),
                None => PackageTarget::All,
            };
            Ok(cli::run_package(
                repo.as_ref(),
                &workspace,
                &target,
                version.as_deref(),
            )?)
        }
        Command::Publish => {
            let repo = open_repository(&workspace.root)?;
            let host = GhCliHost::new(&workspace.config.publish, &workspace.root);
            let (_, status) = cli::run_publish(&repo, &host, &workspace)?;
            Ok(status)
        }
        Command::Deploy { path, dataset } => {
            Ok(cli::run_deploy(&workspace, &path, dataset.as_deref())?)
        }
    }
}

fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(root) = root {
        return Ok(root);
    }

    let cwd = std::env::current_dir().context("Cannot determine current directory")?;
    Ok(Git2Repository::open(&cwd)
        .ok()
        .and_then(|repo| repo.workdir())
        .unwrap_or(cwd))
}

fn open_repository(root: &Path) -> Result<Git2Repository> {
    Git2Repository::open(root)
        .with_context(|| format!("Git repository error at {}", root.display()))
}
