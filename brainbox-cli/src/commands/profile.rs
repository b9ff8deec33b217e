//! Profile command handler

use anyhow::Result;
use colored::*;
use std::collections::HashMap;

use super::colorize_difficulty;
use crate::config::Config;
use crate::services::Services;

/// Show the problems solved by the current user
pub async fn handle_profile_command(config: &Config) -> Result<()> {
    let session = config.session()?;
    let services = Services::connect(&config.grader)?;

    let progress = services.users.progress(&session.user_id).await?;
    let problems = services.problems.list().await?;
    let by_id: HashMap<&str, _> = problems.iter().map(|p| (p.id.as_str(), p)).collect();

    println!("{}", format!("Profile of {}", session.user_id).bold());
    println!(
        "  Solved {} of {} problem(s)",
        progress.solved.len().to_string().green(),
        problems.len()
    );

    if progress.solved.is_empty() {
        println!("{}", "  No problems solved yet.".yellow());
        return Ok(());
    }

    println!();
    for id in &progress.solved {
        match by_id.get(id.as_str()) {
            Some(problem) => println!(
                "  {} {} [{}] {}",
                "✓".green(),
                problem.title,
                colorize_difficulty(&problem.difficulty),
                format!("({})", id).dimmed()
            ),
            // Solved problems that were since deleted
            None => println!("  {} {}", "✓".green(), id.dimmed()),
        }
    }

    Ok(())
}
