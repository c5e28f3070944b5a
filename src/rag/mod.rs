//! RAG (Retrieval-Augmented Generation) for document chat with citations.
//!
//! Answers questions about a single document using retrieved context
//! blocks, with bracketed source citations in the answer.

pub mod context;
mod response;

pub use context::{Retriever, RetrievedContext, NO_CONTEXT_SENTINEL};
pub use response::{ChatEngine, ChatReply, BUSY_FALLBACK, ERROR_FALLBACK, NOT_FOUND_FALLBACK};

use serde::{Deserialize, Serialize};

/// One turn in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role ("user" or "assistant").
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Extract the 1-based citation indices referenced in an answer, in order
/// of first appearance.
pub fn extract_citations(answer: &str) -> Vec<usize> {
    let re = regex::Regex::new(r"\[(\d+)\]").expect("valid citation regex");

    let mut indices = Vec::new();
    for capture in re.captures_iter(answer) {
        if let Ok(index) = capture[1].parse::<usize>() {
            if !indices.contains(&index) {
                indices.push(index);
            }
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_citations() {
        let answer = "Chlorophyll absorbs light [2]. It powers photosynthesis [1][2].\n\nSources Used: [1], [2]";
        assert_eq!(extract_citations(answer), vec![2, 1]);
    }

    #[test]
    fn test_extract_citations_none() {
        assert!(extract_citations("No citations here.").is_empty());
    }

    #[test]
    fn test_extract_citations_adjacent_brackets() {
        assert_eq!(extract_citations("Both sources agree [1][3]."), vec![1, 3]);
    }
}
