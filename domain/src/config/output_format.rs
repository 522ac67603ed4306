//! Output format value object

use serde::{Deserialize, Serialize};

/// How a run summary is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every target's output or failure, then the synthesis
    #[default]
    Full,
    /// Only the synthesis (or the successful outputs when there is none)
    Synthesis,
    /// Machine-readable JSON
    Json,
}
