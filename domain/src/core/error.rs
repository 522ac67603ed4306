//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid target '{0}': expected <provider>/<model>")]
    InvalidTarget(String),

    #[error("Prompt cannot be empty")]
    EmptyPrompt,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_target_display() {
        let error = DomainError::InvalidTarget("gpt-4o".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid target 'gpt-4o': expected <provider>/<model>"
        );
    }

    #[test]
    fn test_empty_prompt_display() {
        assert_eq!(DomainError::EmptyPrompt.to_string(), "Prompt cannot be empty");
    }
}
