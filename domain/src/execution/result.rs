//! Per-attempt and per-target results.

use super::category::{CategorizedError, ErrorCategory};
use super::content::Content;
use crate::core::target::Target;
use serde::Serialize;
use std::time::Duration;

/// Result of one attempt against one target.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub target: Target,
    /// 1-based attempt number
    pub attempt: u32,
    pub duration: Duration,
    pub result: Result<Content, CategorizedError>,
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// `None` for a successful attempt
    pub fn category(&self) -> Option<ErrorCategory> {
        self.result.as_ref().err().map(|e| e.category)
    }

    pub fn record(&self) -> AttemptRecord {
        AttemptRecord {
            attempt: self.attempt,
            duration_ms: self.duration.as_millis() as u64,
            category: self.category(),
        }
    }
}

/// Compact trace of one attempt, kept in [`ModelResult::attempt_log`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    pub attempt: u32,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,
}

/// Final, post-retry state of one target within a run.
///
/// Content and error are mutually exclusive: a failed target has no content
/// at all, so it cannot be counted or formatted as an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResult {
    target: Target,
    outcome: Result<Content, CategorizedError>,
    attempt_log: Vec<AttemptRecord>,
}

impl ModelResult {
    pub fn success(target: Target, content: Content, attempt_log: Vec<AttemptRecord>) -> Self {
        Self {
            target,
            outcome: Ok(content),
            attempt_log,
        }
    }

    pub fn failure(
        target: Target,
        error: CategorizedError,
        attempt_log: Vec<AttemptRecord>,
    ) -> Self {
        Self {
            target,
            outcome: Err(error),
            attempt_log,
        }
    }

    /// Failure for a target that never got to make a call.
    pub fn not_started(target: Target, error: CategorizedError) -> Self {
        Self::failure(target, error, Vec::new())
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn content(&self) -> Option<&str> {
        self.outcome.as_ref().ok().map(Content::as_str)
    }

    pub fn final_error(&self) -> Option<&CategorizedError> {
        self.outcome.as_ref().err()
    }

    /// Number of client calls actually issued for this target.
    pub fn attempts(&self) -> u32 {
        self.attempt_log.len() as u32
    }

    pub fn attempt_log(&self) -> &[AttemptRecord] {
        &self.attempt_log
    }
}

#[derive(Serialize)]
struct ModelResultView<'a> {
    target: &'a Target,
    succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a CategorizedError>,
    attempts: u32,
    attempt_log: &'a [AttemptRecord],
}

impl Serialize for ModelResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        ModelResultView {
            target: &self.target,
            succeeded: self.succeeded(),
            content: self.content(),
            error: self.final_error(),
            attempts: self.attempts(),
            attempt_log: &self.attempt_log,
        }
        .serialize(serializer)
    }
}
