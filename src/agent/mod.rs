//! Agent infrastructure for natural-language payroll commands.
//!
//! This module provides:
//! - LLM provider abstraction (OpenAI chat completions API)
//! - Tool registry and the workforce tools built on the dispatcher
//! - Workflow state machine for step-by-step execution
//! - [`WorkforceAgent`], the entry point used by the HTTP layer

pub mod llm;
mod runner;
pub mod tools;
pub mod workflow;

pub use llm::{
    ApiKeySource, CompletionOptions, CompletionResponse, LlmError, LlmProvider, Message,
    MessageRole, OpenAIProvider,
};
pub use runner::{describe_failure, AgentError, WorkforceAgent, MAX_ITERATIONS_MESSAGE};
pub use tools::{AgentTool, AgentToolRegistry, ToolContext, ToolDefinition, ToolError};
pub use workflow::{Workflow, WorkflowError, WorkflowExecutor, WorkflowState};
