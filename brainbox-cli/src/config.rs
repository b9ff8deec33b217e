//! Configuration module
//!
//! CLI configuration: the grader settings plus the acting user.

use anyhow::Result;
use brainbox_core::domain::user::Session;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Grading pipeline settings
    pub grader: brainbox_grader::Config,

    /// User the commands act as
    pub user: Option<String>,
}

impl Config {
    /// Session of the acting user
    pub fn session(&self) -> Result<Session> {
        match self.user.as_deref().map(str::trim) {
            Some(user) if !user.is_empty() => Ok(Session::new(user)),
            _ => anyhow::bail!("No user given; pass --user or set BRAINBOX_USER"),
        }
    }
}
