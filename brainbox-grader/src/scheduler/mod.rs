//! Scheduler layer
//!
//! Follows in-flight judge jobs until they settle. Polling is bounded by
//! an attempt budget and stops early when the caller cancels.

pub mod poller;

pub use poller::{PollError, PollPolicy, StatusPoller};
