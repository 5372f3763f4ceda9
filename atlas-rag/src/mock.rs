//! Mock completer for testing.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::completion::{Completer, PromptPayload};
use crate::error::{RagError, Result};

/// A [`Completer`] that returns canned replies and records every prompt.
#[derive(Debug, Default)]
pub struct MockCompleter {
    name: String,
    replies: Mutex<Vec<Result<String>>>,
    prompts: Mutex<Vec<PromptPayload>>,
}

impl MockCompleter {
    /// Create a mock with no queued replies.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Queue a reply; replies are returned in the order they were queued.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push(Ok(reply.into()));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        let error = RagError::Completion { provider: self.name.clone(), message: message.into() };
        self.push(Err(error));
        self
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<PromptPayload> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn push(&self, reply: Result<String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push(reply);
        }
    }
}

#[async_trait]
impl Completer for MockCompleter {
    async fn complete(&self, prompt: &PromptPayload) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }
        let mut replies = self.replies.lock().map_err(|_| RagError::Completion {
            provider: self.name.clone(),
            message: "reply queue poisoned".into(),
        })?;
        if replies.is_empty() {
            return Err(RagError::Completion {
                provider: self.name.clone(),
                message: "no reply queued".into(),
            });
        }
        replies.remove(0)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
