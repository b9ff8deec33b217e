//! Run command handler
//!
//! Runs a source file on the judge with custom input. Nothing is recorded.

use anyhow::Result;
use brainbox_core::domain::judge::SubmissionRequest;
use brainbox_core::domain::language::Language;
use clap::Args;
use colored::*;
use std::path::PathBuf;

use super::{cancel_on_ctrl_c, print_report, read_source, workflow_error};
use crate::config::Config;
use crate::services::Services;

/// Arguments of `run`
#[derive(Args)]
pub struct RunArgs {
    /// Language of the source file (e.g. python, cpp, java)
    #[arg(short, long)]
    language: Language,

    /// Path to the source file
    #[arg(short, long)]
    file: PathBuf,

    /// Input fed to the program
    #[arg(long, default_value = "")]
    stdin: String,
}

/// Handle the run command
pub async fn handle_run_command(args: RunArgs, config: &Config) -> Result<()> {
    let source = read_source(&args.file)?;
    let services = Services::judge_only(&config.grader);

    let request = SubmissionRequest::new(args.language, source, args.stdin).with_limits(
        config.grader.time_limit_seconds,
        config.grader.memory_limit_kb,
    );

    println!(
        "{}",
        format!("Running {} on the judge...", args.language.label()).dimmed()
    );

    let cancel = cancel_on_ctrl_c();
    let report = services
        .workflow(&config.grader)
        .run_source(request, &cancel)
        .await
        .map_err(workflow_error)?;

    print_report(&report);
    Ok(())
}
