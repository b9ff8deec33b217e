//! Submit command handler
//!
//! Runs a solution against a problem. By default the verdict is recorded
//! and the user's solved problems are updated; `--run-only` skips both.

use anyhow::Result;
use brainbox_core::domain::language::Language;
use brainbox_core::domain::user::Session;
use brainbox_grader::service::{Attempt, RunMode, WorkflowOutcome};
use clap::Args;
use colored::*;
use std::path::PathBuf;

use super::{cancel_on_ctrl_c, print_report, read_source, workflow_error};
use crate::config::Config;
use crate::services::Services;

/// Arguments of `submit`
#[derive(Args)]
pub struct SubmitArgs {
    /// Problem id
    problem: String,

    /// Language of the source file (e.g. python, cpp, java)
    #[arg(short, long)]
    language: Language,

    /// Path to the source file
    #[arg(short, long)]
    file: PathBuf,

    /// Only run the code; nothing is recorded
    #[arg(long)]
    run_only: bool,

    /// Custom input for --run-only (defaults to the problem's test input)
    #[arg(long, requires = "run_only")]
    stdin: Option<String>,
}

/// Handle the submit command
pub async fn handle_submit_command(args: SubmitArgs, config: &Config) -> Result<()> {
    let session = if args.run_only {
        config
            .session()
            .unwrap_or_else(|_| Session::new("anonymous"))
    } else {
        config.session()?
    };

    let attempt = Attempt {
        problem_id: args.problem,
        language: args.language,
        source_code: read_source(&args.file)?,
        stdin: args.stdin,
        mode: if args.run_only {
            RunMode::Run
        } else {
            RunMode::Submit
        },
    };

    let services = Services::connect(&config.grader)?;

    println!(
        "{}",
        format!(
            "Evaluating {} solution for {}...",
            attempt.language.label(),
            attempt.problem_id
        )
        .dimmed()
    );

    let cancel = cancel_on_ctrl_c();
    let outcome = services
        .workflow(&config.grader)
        .execute(&session, attempt, &cancel)
        .await
        .map_err(workflow_error)?;

    print_outcome(&outcome);
    Ok(())
}

/// Print the verdict and the run report
fn print_outcome(outcome: &WorkflowOutcome) {
    print_report(&outcome.evaluation.display_output);
    println!();

    let status = outcome.status_message();
    if outcome.evaluation.is_correct {
        println!("{} {}", "✓".green(), status.green().bold());
    } else {
        println!("{} {}", "✗".red(), status.red().bold());
    }

    if let Some(receipt) = &outcome.receipt {
        println!("  Submission: {}", receipt.id.to_string().dimmed());
    }
}
