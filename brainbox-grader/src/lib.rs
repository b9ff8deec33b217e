//! Brainbox grader
//!
//! Grades student code against the problems of a practice platform.
//!
//! Architecture:
//! - Repositories: Problem, user and submission stores (Firestore, in-memory)
//! - Scheduler: Polling judge jobs to a terminal status
//! - Services: Evaluation, recording and the end-to-end submission workflow
//!
//! A submission is sent to the remote judge, polled until it settles,
//! compared against the problem's expected output, and stored together
//! with the user's solved-problem progress.

pub mod config;
pub mod repository;
pub mod scheduler;
pub mod service;

pub use config::Config;
