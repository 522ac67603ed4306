//! Output formatting for run summaries

pub mod console;
pub mod formatter;
