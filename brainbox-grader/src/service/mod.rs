//! Service layer
//!
//! Services contain the grading logic. They compose the judge client and
//! the repositories into the submission pipeline: evaluate a finished run,
//! record the verdict, and drive a whole attempt end to end.

pub mod evaluator;
pub mod recorder;
pub mod workflow;

// Re-export traits
pub use evaluator::OutputComparator;

// Re-export implementations
pub use evaluator::{EvaluationOutcome, ExactTrimComparator, ResultEvaluator, Verdict};
pub use recorder::{RecordError, RecordReceipt, SolveProgress, SubmissionRecorder};
pub use workflow::{Attempt, Limits, RunMode, SubmissionWorkflow, WorkflowError, WorkflowOutcome};
