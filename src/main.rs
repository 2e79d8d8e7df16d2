//! commitsmith - prepare-commit-msg hook entry point.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commitsmith::config::{self, ConfigPaths};
use commitsmith::{CliBackend, Git2Source, GitSource, Hook, HookArgs, HookOutcome};

/// Environment variable holding a tracing filter directive.
const LOG_ENV_VAR: &str = "COMMITSMITH_LOG";

/// Draft a commit message from the staged diff.
///
/// Install as `.git/hooks/prepare-commit-msg`; git passes the message file,
/// the message source, and a commit SHA.
#[derive(Parser, Debug)]
#[command(name = "commitsmith")]
#[command(about = "Draft commit messages from the staged diff using an AI CLI")]
#[command(version)]
struct Cli {
    /// Commit message file git asks the hook to prepare
    #[arg(required_unless_present = "show_config")]
    message_file: Option<PathBuf>,

    /// Source of the message (message, template, merge, squash, commit)
    source: Option<String>,

    /// Commit SHA, for amend and -c/-C
    sha: Option<String>,

    /// Log pipeline decisions to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print the merged configuration as YAML and exit
    #[arg(long)]
    show_config: bool,
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Step 1: Locate the repository and its config files
    let cwd = env::current_dir().context("Failed to read current directory")?;
    let git = Git2Source::discover(&cwd)?;
    let paths = ConfigPaths::resolve(&git.work_dir())?;
    debug!(
        "Config files: global {}, local {}",
        paths.global.display(),
        paths.local.display()
    );

    if cli.show_config {
        let effective = config::load(&paths)?;
        let yaml = serde_yaml::to_string(effective.root())
            .context("Failed to render configuration")?;
        print!("{yaml}");
        return Ok(());
    }

    // Step 2: Run the hook pipeline
    let Some(message_file) = cli.message_file else {
        anyhow::bail!("A commit message file is required");
    };
    let args = HookArgs {
        message_file,
        source: cli.source,
        sha: cli.sha,
    };

    let outcome = Hook::new(git, paths)
        .run(&args, CliBackend::new)
        .await
        .context("commitsmith could not prepare a commit message")?;

    match outcome {
        HookOutcome::Written(_) => debug!("Commit message ready for editing"),
        HookOutcome::Skipped(stage) => debug!("Hook ended early at: {stage}"),
    }

    Ok(())
}
