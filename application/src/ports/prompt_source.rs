//! Prompt source port
//!
//! Supplies the base prompt for a run and formats the synthesis prompt.

use fanout_domain::{DomainError, Prompt, PromptTemplate, SynthesisInput};
use thiserror::Error;

/// Errors raised while obtaining the base prompt
#[derive(Error, Debug)]
pub enum PromptSourceError {
    #[error("Failed to read prompt from {source_name}: {message}")]
    Read {
        source_name: String,
        message: String,
    },

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Where the prompt comes from and how synthesis prompts are written.
///
/// `synthesis_prompt` must be deterministic for the same inputs; the
/// default uses [`PromptTemplate::synthesis_prompt`].
pub trait PromptSource: Send + Sync {
    fn base_prompt(&self) -> Result<Prompt, PromptSourceError>;

    fn synthesis_prompt(&self, original: &Prompt, outputs: &[SynthesisInput<'_>]) -> String {
        PromptTemplate::synthesis_prompt(original.content(), outputs)
    }
}

/// A prompt already held in memory.
#[derive(Debug, Clone)]
pub struct StaticPromptSource {
    prompt: Prompt,
}

impl StaticPromptSource {
    pub fn new(prompt: Prompt) -> Self {
        Self { prompt }
    }
}

impl PromptSource for StaticPromptSource {
    fn base_prompt(&self) -> Result<Prompt, PromptSourceError> {
        Ok(self.prompt.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanout_domain::Target;

    #[test]
    fn test_static_source_returns_prompt() {
        let source = StaticPromptSource::new(Prompt::new("Explain lifetimes").unwrap());
        assert_eq!(source.base_prompt().unwrap().content(), "Explain lifetimes");
    }

    #[test]
    fn test_default_synthesis_uses_template() {
        let source = StaticPromptSource::new(Prompt::new("q").unwrap());
        let target = Target::new("p", "m");
        let outputs = [SynthesisInput {
            target: &target,
            content: "answer",
        }];
        let prompt = source.synthesis_prompt(&source.base_prompt().unwrap(), &outputs);
        assert!(prompt.contains("--- p/m ---\nanswer"));
    }
}
