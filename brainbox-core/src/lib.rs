//! BrainBox Core
//!
//! Core types for the BrainBox IDE grading system.
//!
//! This crate contains the domain types shared by the judge client, the
//! grader and the CLI: submission requests, judge statuses, problems,
//! evaluated submissions and user progress. It performs no I/O.

pub mod domain;
