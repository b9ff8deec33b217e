//! Core domain types
//!
//! These types represent the entities that flow through the submission
//! pipeline. They are shared between the judge client (which produces
//! statuses), the grader (which evaluates and records them) and the CLI
//! (which displays them).

pub mod envelope;
pub mod judge;
pub mod language;
pub mod problem;
pub mod submission;
pub mod user;
