//! Run phases and the per-target worker lifecycle

use serde::{Deserialize, Serialize};

/// Phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Every target answers the prompt concurrently
    Fanout,
    /// One extra call consolidates the successful outputs
    Synthesis,
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Fanout => "fanout",
            Phase::Synthesis => "synthesis",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Phase::Fanout => "Fan-out",
            Phase::Synthesis => "Synthesis",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Lifecycle of the worker driving one target.
///
/// ```text
/// Pending → Attempting → Succeeded
///               ↑   ↓
///            Retrying → PermanentlyFailed
/// ```
///
/// `Attempting` may also go straight to `PermanentlyFailed`, and any
/// non-terminal state may end in `PermanentlyFailed` on cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Pending,
    Attempting,
    Retrying,
    Succeeded,
    PermanentlyFailed,
}

impl WorkerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerState::Succeeded | WorkerState::PermanentlyFailed)
    }

    pub fn can_transition_to(&self, next: WorkerState) -> bool {
        use WorkerState::*;
        match (self, next) {
            (Pending, Attempting) => true,
            (Attempting, Succeeded | Retrying) => true,
            (Retrying, Attempting) => true,
            (Pending | Attempting | Retrying, PermanentlyFailed) => true,
            _ => false,
        }
    }
}
