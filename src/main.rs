//! vibecommit - CLI entry point.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vibecommit::host::{Host, SaveHandler, SaveOutcome};

/// Environment variable holding the log filter.
const LOG_ENV_VAR: &str = "VIBECOMMIT_LOG";

/// Auto-commit files on save with LLM-generated or templated messages.
#[derive(Parser, Debug)]
#[command(name = "vibecommit")]
#[command(about = "Auto-commit files on save with LLM-generated or templated messages")]
#[command(version)]
struct Cli {
    /// Any path inside the target repository
    #[arg(long, global = true, default_value = ".")]
    repo: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show whether auto-commit is on
    Status,
    /// Switch auto-commit on or off
    Toggle,
    /// Switch auto-commit on
    Enable,
    /// Switch auto-commit off
    Disable,
    /// Print the commit message a save of FILE would use, without committing
    Message { file: PathBuf },
    /// Deliver one save notification for FILE
    Save { file: PathBuf },
    /// Watch the work tree and commit every saved file until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Status => {
            let host = activate(&cli.repo)?;
            println!("{}", host.status().text());
        }
        Command::Toggle => {
            let mut host = activate(&cli.repo)?;
            let enabled = host.toggle().context("Failed to toggle VibeCommit")?;
            println!("{}", vibecommit::host::toggle_announcement(enabled));
            println!("{}", host.status().text());
        }
        Command::Enable => set_enabled(&cli.repo, true)?,
        Command::Disable => set_enabled(&cli.repo, false)?,
        Command::Message { file } => {
            let (_, message) = SaveHandler::new()
                .preview(&file)
                .await
                .with_context(|| format!("Cannot compose a message for {}", file.display()))?;
            println!("{}", message);
        }
        Command::Save { file } => {
            let host = activate(&file)?;
            for result in host.document_saved(&file).await {
                match result? {
                    SaveOutcome::Disabled => {
                        println!("{}; nothing committed", host.status().text());
                    }
                    SaveOutcome::Committed { file, message } => {
                        println!("✓ Committed {}: {}", file.relative_path(), message);
                    }
                }
            }
            host.deactivate();
        }
        Command::Watch => {
            let host = activate(&cli.repo)?;
            println!(
                "{} - watching {} (Ctrl-C to stop)",
                host.status().text(),
                host.workspace().root().display()
            );
            host.watch(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
            .context("Watcher failed")?;
            host.deactivate();
        }
    }

    Ok(())
}

fn activate(path: &Path) -> Result<Host> {
    Host::activate(path).with_context(|| {
        format!(
            "VibeCommit needs a git repository; {} is not inside one",
            path.display()
        )
    })
}

fn set_enabled(repo: &Path, enabled: bool) -> Result<()> {
    let mut host = activate(repo)?;
    host.set_enabled(enabled)
        .context("Failed to update VibeCommit state")?;
    println!("{}", host.status().text());
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
