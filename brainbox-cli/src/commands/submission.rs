//! Submission command handlers
//!
//! Handles reviewing submission history and scoring submissions.

use anyhow::Result;
use brainbox_core::domain::submission::{RecordId, StoredSubmission};
use clap::Subcommand;
use colored::*;

use super::{correctness_mark, print_report};
use crate::config::Config;
use crate::services::Services;

/// Submission subcommands
#[derive(Subcommand)]
pub enum SubmissionCommands {
    /// List submissions, newest first
    List {
        /// Only show submissions of --user
        #[arg(long)]
        mine: bool,
    },
    /// Show submission details
    Show {
        /// Submission id
        id: String,
    },
    /// Assign a reviewer score to a submission
    Grade {
        /// Submission id
        id: String,

        /// Score to assign
        score: u32,
    },
}

/// Handle submission commands
pub async fn handle_submission_command(
    command: SubmissionCommands,
    config: &Config,
) -> Result<()> {
    let services = Services::connect(&config.grader)?;

    match command {
        SubmissionCommands::List { mine } => list_submissions(&services, config, mine).await,
        SubmissionCommands::Show { id } => show_submission(&services, &RecordId::from(id)).await,
        SubmissionCommands::Grade { id, score } => {
            grade_submission(&services, &RecordId::from(id), score).await
        }
    }
}

/// List submissions
async fn list_submissions(services: &Services, config: &Config, mine: bool) -> Result<()> {
    let user = if mine {
        Some(config.session()?.user_id)
    } else {
        None
    };

    let submissions = services.submissions.list(user.as_deref()).await?;

    if submissions.is_empty() {
        println!("{}", "No submissions found.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Found {} submission(s):", submissions.len()).bold()
    );
    println!();
    for stored in &submissions {
        print_submission_summary(stored);
    }

    Ok(())
}

/// Show a single submission
async fn show_submission(services: &Services, id: &RecordId) -> Result<()> {
    let stored = services.submissions.get(id).await?;
    print_submission_details(&stored);
    Ok(())
}

/// Score a submission
async fn grade_submission(services: &Services, id: &RecordId, score: u32) -> Result<()> {
    services.submissions.set_score(id, score).await?;
    println!(
        "{} Submission {} scored {}",
        "✓".green(),
        id.to_string().cyan(),
        score
    );
    Ok(())
}

/// Print a submission summary
fn print_submission_summary(stored: &StoredSubmission) {
    let submission = &stored.submission;

    println!(
        "  {} Submission {}",
        correctness_mark(submission.is_correct),
        stored.id.to_string().dimmed()
    );
    println!("    Problem:   {}", submission.problem_id);
    println!("    User:      {}", submission.user_id.dimmed());
    println!("    Language:  {}", submission.language.label());
    println!(
        "    Submitted: {}",
        submission
            .submitted_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    if let Some(score) = submission.score {
        println!("    Score:     {}", score.to_string().cyan());
    }
    println!();
}

/// Print detailed submission information
fn print_submission_details(stored: &StoredSubmission) {
    let submission = &stored.submission;

    println!("{}", "Submission Details:".bold());
    println!("  ID:        {}", stored.id.to_string().cyan());
    println!("  Problem:   {}", submission.problem_id);
    println!("  User:      {}", submission.user_id);
    println!("  Language:  {}", submission.language.label());
    println!(
        "  Correct:   {}",
        correctness_mark(submission.is_correct)
    );
    println!(
        "  Submitted: {}",
        submission.submitted_at.format("%Y-%m-%d %H:%M:%S")
    );
    match submission.score {
        Some(score) => println!("  Score:     {}", score),
        None => println!("  Score:     {}", "not graded".dimmed()),
    }

    println!("\n{}", "Code:".bold());
    println!("{}", "─".repeat(80).dimmed());
    println!("{}", submission.code.trim_end());
    println!("{}", "─".repeat(80).dimmed());

    if !submission.input.is_empty() {
        println!("\n{}", "Input:".bold());
        println!("{}", submission.input.trim_end());
    }

    println!("\n{}", "Result:".bold());
    print_report(&submission.raw_output);
}
