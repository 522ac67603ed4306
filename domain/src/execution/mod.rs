//! Execution domain - the vocabulary of a fan-out run.
//!
//! - [`category::ErrorCategory`] / [`category::CategorizedError`] - failure taxonomy
//! - [`content::Content`] - model output that is guaranteed non-blank
//! - [`result::CallOutcome`] - one attempt against one target
//! - [`result::ModelResult`] - the final state of one target after retries
//! - [`summary::RunSummary`] - the aggregate over a whole run
//! - [`phase::WorkerState`] - per-target lifecycle

pub mod category;
pub mod content;
pub mod phase;
pub mod result;
pub mod summary;
