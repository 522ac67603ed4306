//! Core domain concepts shared across all subdomains.
//!
//! - [`target::Target`]: one (provider, model) pair to invoke in a run
//! - [`prompt::Prompt`]: a validated, non-empty prompt
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod prompt;
pub mod target;
