//! Prompt sources backed by the filesystem and standard input.

use fanout_application::{PromptSource, PromptSourceError};
use fanout_domain::Prompt;
use std::io::Read;
use std::path::PathBuf;

/// Reads the whole prompt from one file.
#[derive(Debug, Clone)]
pub struct FilePromptSource {
    path: PathBuf,
}

impl FilePromptSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PromptSource for FilePromptSource {
    fn base_prompt(&self) -> Result<Prompt, PromptSourceError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| PromptSourceError::Read {
            source_name: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Prompt::new(text)?)
    }
}

/// Reads the prompt from standard input until EOF.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPromptSource;

impl PromptSource for StdinPromptSource {
    fn base_prompt(&self) -> Result<Prompt, PromptSourceError> {
        let mut text = String::new();
        std::io::stdin()
            .lock()
            .read_to_string(&mut text)
            .map_err(|e| PromptSourceError::Read {
                source_name: "stdin".to_string(),
                message: e.to_string(),
            })?;
        Ok(Prompt::new(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanout_domain::DomainError;

    #[test]
    fn test_file_source_reads_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.md");
        std::fs::write(&path, "Summarize the borrow checker.\n").unwrap();

        let prompt = FilePromptSource::new(&path).base_prompt().unwrap();
        assert!(prompt.content().starts_with("Summarize the borrow checker."));
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.md");

        let err = FilePromptSource::new(&path).base_prompt().unwrap_err();
        match err {
            PromptSourceError::Read { source_name, .. } => {
                assert!(source_name.ends_with("missing.md"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.md");
        std::fs::write(&path, "  \n\t").unwrap();

        let err = FilePromptSource::new(&path).base_prompt().unwrap_err();
        assert!(matches!(err, PromptSourceError::Invalid(DomainError::EmptyPrompt)));
    }
}
