//! Non-blank model output.

use serde::Serialize;

/// Text returned by a successful call.
///
/// Can only be built from text with at least one non-whitespace character,
/// so a success can never carry an empty placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Content(String);

impl Content {
    /// Returns `None` for empty or whitespace-only text.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Content {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_not_content() {
        assert!(Content::new("").is_none());
        assert!(Content::new("  \n ").is_none());
    }

    #[test]
    fn test_content_keeps_text_verbatim() {
        let content = Content::new("  answer\n").unwrap();
        assert_eq!(content.as_str(), "  answer\n");
    }
}
