//! Command-line entry point: send a single email through SendGrid,
//! retrying with exponential backoff until it is accepted.

use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use notifier::{Config, Controller};
use notifier_common::logging;
use notifier_delivery::SendOutcome;

#[cfg(not(unix))]
compile_error!("Only unix is currently supported");

/// Send transactional email through SendGrid
#[derive(Parser, Debug)]
#[command(name = "notifier")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send one email, retrying until it is delivered or rejected
    Send(SendArgs),
}

#[derive(Args, Debug)]
struct SendArgs {
    /// Recipient address
    #[arg(long)]
    to: String,

    /// Subject line
    #[arg(long)]
    subject: String,

    /// HTML body
    #[arg(
        long,
        conflicts_with = "body_file",
        required_unless_present = "body_file"
    )]
    body: Option<String>,

    /// Read the HTML body from a file
    #[arg(long)]
    body_file: Option<PathBuf>,
}

impl SendArgs {
    async fn body(&self) -> anyhow::Result<String> {
        match (&self.body, &self.body_file) {
            (Some(body), _) => Ok(body.clone()),
            (None, Some(path)) => {
                let context = || format!("Failed to read body from {}", path.display());
                tokio::fs::read_to_string(path).await.with_context(context)
            }
            (None, None) => anyhow::bail!("Either --body or --body-file is required"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config_path = find_config_file(cli.config.as_deref())?;
    let config = Config::load(&config_path)?;

    logging::init();

    match cli.command {
        Commands::Send(args) => {
            let body = args.body().await?;
            let controller = Controller::new(&config)?;

            let outcome = controller.send(&args.to, &args.subject, &body).await;
            Ok(ExitCode::from(exit_status(&outcome)))
        }
    }
}

const fn exit_status(outcome: &SendOutcome) -> u8 {
    match outcome {
        SendOutcome::Delivered { .. } => 0,
        SendOutcome::Rejected { .. } => 2,
        SendOutcome::Cancelled { .. } => 130,
    }
}

/// Find the configuration file using the following precedence:
/// 1. `--config` on the command line
/// 2. `NOTIFIER_CONFIG` environment variable
/// 3. ./notifier.toml (current working directory)
/// 4. /etc/notifier/notifier.toml (system-wide config)
fn find_config_file(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        anyhow::bail!("--config points to non-existent file: {}", path.display());
    }

    if let Ok(env_path) = std::env::var("NOTIFIER_CONFIG") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        anyhow::bail!(
            "NOTIFIER_CONFIG points to non-existent file: {}",
            path.display()
        );
    }

    let default_paths = [
        PathBuf::from("./notifier.toml"),
        PathBuf::from("/etc/notifier/notifier.toml"),
    ];

    for path in &default_paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    let paths_tried = default_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    anyhow::bail!(
        "No configuration file found. Tried:\n  - NOTIFIER_CONFIG environment variable\n{paths_tried}"
    )
}
