//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod run_fanout;
pub mod synthesize;
pub(crate) mod worker;
