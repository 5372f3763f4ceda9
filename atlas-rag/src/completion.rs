//! Completion API seam.
//!
//! The pipeline never depends on a concrete provider. Answer generation takes
//! any [`Completer`], so switching models is a matter of passing a different
//! implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Everything sent to the completion model for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptPayload {
    /// Fixed grounding instruction.
    pub system_instruction: String,
    /// Rendered, cited context passages.
    pub context: String,
    /// The user's question.
    pub query: String,
}

impl PromptPayload {
    /// Render the user turn: the context followed by the question.
    pub fn user_message(&self) -> String {
        format!("BAĞLAM:\n{}\n\nKULLANICI SORUSU:\n{}\n\nCEVAP:", self.context, self.query)
    }
}

/// A text completion backend.
///
/// Implementations return the final answer text. The core does not inspect
/// tokens or streams.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Produce an answer for the prompt.
    async fn complete(&self, prompt: &PromptPayload) -> Result<String>;

    /// The model identifier, used in logs and error messages.
    fn name(&self) -> &str;
}
