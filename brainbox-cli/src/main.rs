//! BrainBox CLI
//!
//! Command-line interface for the BrainBox practice platform: run code on
//! the judge, submit solutions, manage problems and review submissions.

mod commands;
mod config;
mod services;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "brainbox")]
#[command(about = "BrainBox practice grader CLI", long_about = None)]
struct Cli {
    /// User id to act as
    #[arg(long, global = true, env = "BRAINBOX_USER")]
    user: Option<String>,

    /// Judge submissions endpoint
    #[arg(long, global = true, env = "JUDGE_URL")]
    judge_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "brainbox=info,brainbox_grader=warn,brainbox_judge=warn".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut grader = brainbox_grader::Config::from_env().context("Failed to load configuration")?;
    if let Some(url) = cli.judge_url {
        grader.judge_url = url;
    }
    grader.validate()?;

    let config = Config {
        grader,
        user: cli.user,
    };

    handle_command(cli.command, &config).await
}
