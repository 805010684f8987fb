//! Canned provider for agent tests.

use super::provider::{CompletionOptions, LlmError, LlmProvider};
use super::types::{CompletionResponse, FinishReason, Message, ToolCall};
use crate::agent::tools::ToolDefinition;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays queued completions in order and records every conversation it saw.
pub(crate) struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<CompletionResponse, LlmError>>>,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn answer(self, content: &str) -> Self {
        self.push(Ok(CompletionResponse {
            message: Message::assistant(content),
            finish_reason: FinishReason::Stop,
            usage: None,
        }))
    }

    pub fn call_tool(self, id: &str, name: &str, arguments: Value) -> Self {
        self.push(Ok(CompletionResponse {
            message: Message::assistant_with_tools("", vec![ToolCall::new(id, name, arguments)]),
            finish_reason: FinishReason::ToolCalls,
            usage: None,
        }))
    }

    pub fn fail(self, error: LlmError) -> Self {
        self.push(Err(error))
    }

    fn push(self, reply: Result<CompletionResponse, LlmError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// Messages sent on the `n`th call.
    pub fn conversation(&self, n: usize) -> Vec<Message> {
        self.seen.lock().unwrap()[n].clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        messages: &[Message],
        _tools: Option<&[ToolDefinition]>,
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::InvalidResponse("script exhausted".to_string())))
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        Ok(())
    }
}
