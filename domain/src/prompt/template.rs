//! Prompt templates for the synthesis pass

use crate::execution::summary::SynthesisInput;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Instructions placed ahead of the collected responses
    pub fn synthesis_instructions() -> &'static str {
        r#"You are consolidating answers that several independent models gave to the same request.
Your task is to:
1. Identify where the responses agree
2. Resolve disagreements in favour of the best-supported position
3. Merge the strongest points into one complete answer

Do not mention the individual models unless it matters for the answer."#
    }

    /// User prompt for synthesis.
    ///
    /// Responses are laid out sorted by target, so the same set of outputs
    /// always produces the same prompt regardless of the order they were
    /// collected in.
    pub fn synthesis_prompt(original: &str, outputs: &[SynthesisInput<'_>]) -> String {
        let mut sorted: Vec<&SynthesisInput<'_>> = outputs.iter().collect();
        sorted.sort_by(|a, b| a.target.cmp(b.target));

        let mut prompt = format!(
            "{}\n\nOriginal request:\n{}\n\nResponses ({}):\n",
            Self::synthesis_instructions(),
            original,
            sorted.len()
        );

        for output in sorted {
            prompt.push_str(&format!("\n--- {} ---\n{}\n", output.target, output.content));
        }

        prompt.push_str(
            r#"
Provide the consolidated answer with clear markdown headers, followed by a short
"Disagreements" section if the responses conflicted."#,
        );

        prompt
    }
}
