//! Prompt domain
//!
//! Templates for turning a run's successful outputs into a synthesis prompt.

mod template;

pub use template::PromptTemplate;
