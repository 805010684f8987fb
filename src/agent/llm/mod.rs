//! LLM provider abstraction layer.
//!
//! The agent talks to the model through [`LlmProvider`]; the only backend
//! shipped is the OpenAI chat completions API.

mod openai;
mod provider;
mod types;

pub use openai::{ApiKeySource, OpenAIProvider};
pub use provider::{CompletionOptions, LlmError, LlmProvider};
pub use types::{CompletionResponse, FinishReason, Message, MessageRole, TokenUsage, ToolCall};

#[cfg(test)]
pub(crate) mod scripted;
