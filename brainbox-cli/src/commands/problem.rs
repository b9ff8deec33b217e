//! Problem command handlers
//!
//! Handles listing, viewing, creating and editing problems.

use anyhow::{Context, Result};
use brainbox_core::domain::problem::{Problem, ProblemPatch};
use brainbox_core::domain::user::UserProgress;
use clap::Subcommand;
use colored::*;
use std::path::{Path, PathBuf};

use super::colorize_difficulty;
use crate::config::Config;
use crate::services::Services;

/// Problem subcommands
#[derive(Subcommand)]
pub enum ProblemCommands {
    /// List all problems, marking the ones solved by --user
    List,
    /// Show problem details
    Show {
        /// Problem id
        id: String,
    },
    /// Create a problem from a JSON file
    Add {
        /// Path to the problem JSON file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Edit fields of an existing problem
    Update {
        /// Problem id
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        difficulty: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// File holding the new test input
        #[arg(long)]
        test_input_file: Option<PathBuf>,

        /// File holding the new expected output
        #[arg(long)]
        expected_output_file: Option<PathBuf>,

        /// Position in the problem list
        #[arg(long)]
        order: Option<i64>,

        /// Solution video id
        #[arg(long)]
        video_id: Option<String>,

        /// External reference link
        #[arg(long)]
        link: Option<String>,
    },
}

/// Handle problem commands
pub async fn handle_problem_command(command: ProblemCommands, config: &Config) -> Result<()> {
    let services = Services::connect(&config.grader)?;

    match command {
        ProblemCommands::List => list_problems(&services, config).await,
        ProblemCommands::Show { id } => show_problem(&services, &id).await,
        ProblemCommands::Add { file } => add_problem(&services, &file).await,
        ProblemCommands::Update {
            id,
            title,
            category,
            difficulty,
            description,
            test_input_file,
            expected_output_file,
            order,
            video_id,
            link,
        } => {
            let patch = ProblemPatch {
                title,
                category,
                difficulty,
                description,
                test_input: test_input_file.as_deref().map(read_file).transpose()?,
                expected_output: expected_output_file.as_deref().map(read_file).transpose()?,
                order,
                video_id,
                link,
            };
            update_problem(&services, &id, patch).await
        }
    }
}

/// List all problems
async fn list_problems(services: &Services, config: &Config) -> Result<()> {
    let problems = services.problems.list().await?;

    let progress = match config.session() {
        Ok(session) => services.users.progress(&session.user_id).await?,
        Err(_) => UserProgress::new(""),
    };

    if problems.is_empty() {
        println!("{}", "No problems found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} problem(s):", problems.len()).bold());
    println!();
    for problem in &problems {
        let mark = if progress.has_solved(&problem.id) {
            "✓".green()
        } else {
            " ".normal()
        };
        println!(
            "  {} {:>3}. {} [{}] {} {}",
            mark,
            problem.order,
            problem.title.bold(),
            colorize_difficulty(&problem.difficulty),
            problem.category.cyan(),
            format!("({})", problem.id).dimmed()
        );
    }

    Ok(())
}

/// Show a single problem
async fn show_problem(services: &Services, id: &str) -> Result<()> {
    let problem = services.problems.get(id).await?;
    print_problem_details(&problem);
    Ok(())
}

/// Create a problem
async fn add_problem(services: &Services, file: &Path) -> Result<()> {
    let problem: Problem = serde_json::from_str(&read_file(file)?)
        .with_context(|| format!("Invalid problem JSON in {}", file.display()))?;

    if problem.id.trim().is_empty() {
        anyhow::bail!("Problem id cannot be empty");
    }

    let id = problem.id.clone();
    services.problems.create(problem).await?;

    println!("{} Problem created: {}", "✓".green(), id.cyan());
    Ok(())
}

/// Edit a problem
async fn update_problem(services: &Services, id: &str, patch: ProblemPatch) -> Result<()> {
    if patch.is_empty() {
        anyhow::bail!("Nothing to update; pass at least one field");
    }

    let problem = services.problems.update(id, patch).await?;

    println!("{} Problem updated: {}", "✓".green(), problem.id.cyan());
    print_problem_details(&problem);
    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Print detailed problem information
fn print_problem_details(problem: &Problem) {
    println!("{}", "Problem Details:".bold());
    println!("  ID:         {}", problem.id.cyan());
    println!("  Title:      {}", problem.title);
    println!("  Category:   {}", problem.category);
    println!("  Difficulty: {}", colorize_difficulty(&problem.difficulty));
    println!("  Order:      {}", problem.order);
    println!("  Likes:      {} / Dislikes: {}", problem.likes, problem.dislikes);

    if let Some(video) = &problem.video_id {
        println!("  Video:      {}", video.dimmed());
    }
    if let Some(link) = &problem.link {
        println!("  Link:       {}", link.dimmed());
    }

    println!("\n{}", "Description:".bold());
    println!("{}", problem.description);

    println!("\n{}", "Sample Input:".bold());
    println!("{}", problem.test_input.trim_end());

    println!("\n{}", "Expected Output:".bold());
    println!("{}", problem.expected_output.trim_end());
}
