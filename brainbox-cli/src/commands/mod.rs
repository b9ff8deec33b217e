//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod problem;
mod profile;
mod run;
mod submission;
mod submit;

pub use problem::ProblemCommands;
pub use run::RunArgs;
pub use submission::SubmissionCommands;
pub use submit::SubmitArgs;

use anyhow::{Context, Result};
use brainbox_core::domain::envelope::OutputEnvelope;
use brainbox_grader::service::WorkflowError;
use clap::Subcommand;
use colored::*;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run code on the judge with custom input
    Run(RunArgs),
    /// Submit a solution to a problem
    Submit(SubmitArgs),
    /// Problem management
    Problem {
        #[command(subcommand)]
        command: ProblemCommands,
    },
    /// Submission history and review
    Submission {
        #[command(subcommand)]
        command: SubmissionCommands,
    },
    /// Show the problems solved by the current user
    Profile,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Run(args) => run::handle_run_command(args, config).await,
        Commands::Submit(args) => submit::handle_submit_command(args, config).await,
        Commands::Problem { command } => problem::handle_problem_command(command, config).await,
        Commands::Submission { command } => {
            submission::handle_submission_command(command, config).await
        }
        Commands::Profile => profile::handle_profile_command(config).await,
    }
}

/// Reads a source file, rejecting empty ones
fn read_source(path: &Path) -> Result<String> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if source.trim().is_empty() {
        anyhow::bail!("{} is empty", path.display());
    }
    Ok(source)
}

/// Token cancelled when the user presses Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling evaluation");
            trigger.cancel();
        }
    });
    token
}

/// Wraps a workflow error with its user-facing status line
fn workflow_error(error: WorkflowError) -> anyhow::Error {
    let message = error.status_message();
    anyhow::Error::new(error).context(message)
}

/// Print a run report, highlighting the envelope header when present
fn print_report(report: &str) {
    let Some(envelope) = OutputEnvelope::parse(report) else {
        println!("{}", report);
        return;
    };

    println!("  Status: {}", envelope.status_label.bold());
    println!("  Memory: {}KB", envelope.memory_used_kb);
    println!("  Time:   {}s", envelope.time_used_seconds);
    println!("\n{}", "Output:".bold());
    println!("{}", "─".repeat(80).dimmed());
    println!("{}", envelope.program_output.trim_end());
    println!("{}", "─".repeat(80).dimmed());

    if let Some(stderr) = &envelope.stderr {
        println!("\n{}", "Stderr:".bold());
        println!("{}", stderr.trim_end().red());
    }
}

/// Colorize a problem difficulty for display
fn colorize_difficulty(difficulty: &str) -> ColoredString {
    match difficulty.to_ascii_lowercase().as_str() {
        "easy" => difficulty.green(),
        "medium" => difficulty.yellow(),
        "hard" => difficulty.red(),
        _ => difficulty.normal(),
    }
}

/// Check mark for correct, cross otherwise
fn correctness_mark(is_correct: bool) -> ColoredString {
    if is_correct { "✓".green() } else { "✗".red() }
}
