//! Workflow executor.

use super::state::WorkflowState;
use crate::agent::llm::{CompletionOptions, LlmError, LlmProvider, Message};
use crate::agent::tools::{AgentToolRegistry, ToolContext, ToolError};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Max iterations exceeded")]
    MaxIterationsExceeded,

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}

/// One agent conversation.
pub struct Workflow {
    pub state: WorkflowState,
    pub messages: Vec<Message>,
    /// Completions requested so far.
    pub iteration_count: usize,
}

impl Workflow {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            state: WorkflowState::Started,
            messages: vec![Message::system(system_prompt)],
            iteration_count: 0,
        }
    }

    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Final answer once the workflow completed.
    pub fn output(&self) -> Option<&str> {
        match &self.state {
            WorkflowState::Completed { output } => Some(output),
            _ => None,
        }
    }

    fn fail(&mut self, error: &impl std::fmt::Display) {
        self.state = WorkflowState::Failed {
            error: error.to_string(),
        };
    }
}

/// Executes agent workflows step by step.
pub struct WorkflowExecutor {
    llm: Arc<dyn LlmProvider>,
    tools: Arc<AgentToolRegistry>,
    max_iterations: usize,
    completion_options: CompletionOptions,
}

impl WorkflowExecutor {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        tools: Arc<AgentToolRegistry>,
        max_iterations: usize,
    ) -> Self {
        Self {
            llm,
            tools,
            max_iterations,
            completion_options: CompletionOptions::default(),
        }
    }

    pub fn with_completion_options(mut self, options: CompletionOptions) -> Self {
        self.completion_options = options;
        self
    }

    /// Run one step of the workflow.
    ///
    /// Errors leave the workflow in [`WorkflowState::Failed`].
    pub async fn step(
        &self,
        workflow: &mut Workflow,
        ctx: &ToolContext,
    ) -> Result<(), WorkflowError> {
        let result = self.advance(workflow, ctx).await;
        if let Err(e) = &result {
            if !matches!(e, WorkflowError::InvalidStateTransition(_)) {
                warn!("Workflow failed after {} iterations: {}", workflow.iteration_count, e);
                workflow.fail(e);
            }
        }
        result
    }

    async fn advance(
        &self,
        workflow: &mut Workflow,
        ctx: &ToolContext,
    ) -> Result<(), WorkflowError> {
        match &workflow.state {
            WorkflowState::Started => {
                debug!("Starting workflow with model {}", self.llm.model());
                workflow.state = WorkflowState::Thinking;
            }

            WorkflowState::Thinking => {
                if workflow.iteration_count >= self.max_iterations {
                    return Err(WorkflowError::MaxIterationsExceeded);
                }
                workflow.iteration_count += 1;

                let tool_defs = self.tools.definitions();
                let tools = if tool_defs.is_empty() {
                    None
                } else {
                    Some(tool_defs.as_slice())
                };

                let response = self
                    .llm
                    .complete(&workflow.messages, tools, &self.completion_options)
                    .await?;

                debug!(
                    "LLM response (iteration {}): {}",
                    workflow.iteration_count,
                    truncate(&response.message.content, 200)
                );

                let tool_calls = response.message.requested_tools().to_vec();
                workflow.messages.push(response.message.clone());

                workflow.state = if tool_calls.is_empty() {
                    WorkflowState::Completed {
                        output: response.message.content,
                    }
                } else {
                    WorkflowState::ExecutingTools { tool_calls }
                };
            }

            WorkflowState::ExecutingTools { tool_calls } => {
                let tool_calls = tool_calls.clone();

                for tool_call in tool_calls {
                    debug!("Calling tool {} with {}", tool_call.name, tool_call.arguments);

                    let content = match self
                        .tools
                        .execute(&tool_call.name, tool_call.arguments.clone(), ctx)
                        .await
                    {
                        Ok(Value::String(text)) => text,
                        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_default(),
                        // Arguments the tool cannot even read end the run.
                        Err(e @ ToolError::InvalidArguments(_)) => return Err(e.into()),
                        // The model sees the error and decides how to proceed.
                        Err(e) => format!("Error: {}", e),
                    };

                    debug!(
                        "Tool {} returned: {}",
                        tool_call.name,
                        truncate(&content, 200)
                    );

                    workflow.messages.push(Message::tool_response(
                        &tool_call.id,
                        &tool_call.name,
                        content,
                    ));
                }

                workflow.state = WorkflowState::Thinking;
            }

            WorkflowState::Completed { .. } | WorkflowState::Failed { .. } => {
                return Err(WorkflowError::InvalidStateTransition(
                    "Workflow already in terminal state".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Steps the workflow until it completes or fails.
    pub async fn run(&self, workflow: &mut Workflow, ctx: &ToolContext) -> Result<(), WorkflowError> {
        while workflow.state.can_continue() {
            self.step(workflow, ctx).await?;
        }
        Ok(())
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::llm::scripted::ScriptedProvider;
    use crate::agent::llm::MessageRole;
    use crate::agent::tools::{AgentTool, ToolDefinition};
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl AgentTool for EchoTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::no_params("echo", "Echoes its arguments")
        }

        async fn execute(&self, args: Value, _ctx: &ToolContext) -> Result<Value, ToolError> {
            match args {
                Value::String(_) => Err(ToolError::InvalidArguments("expected an object".into())),
                other => Ok(json!({ "echo": other })),
            }
        }
    }

    struct ShoutTool;

    #[async_trait]
    impl AgentTool for ShoutTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::no_params("shout", "Returns plain text")
        }

        async fn execute(&self, _args: Value, _ctx: &ToolContext) -> Result<Value, ToolError> {
            Ok(Value::String("HELLO".to_string()))
        }
    }

    fn executor(provider: Arc<ScriptedProvider>, max_iterations: usize) -> WorkflowExecutor {
        let mut registry = AgentToolRegistry::new();
        registry.register(EchoTool);
        registry.register(ShoutTool);
        WorkflowExecutor::new(provider, Arc::new(registry), max_iterations)
    }

    fn workflow(input: &str) -> Workflow {
        let mut workflow = Workflow::new("System");
        workflow.add_user_message(input);
        workflow
    }

    #[test]
    fn test_workflow_creation() {
        let workflow = Workflow::new("You are a helpful assistant.");

        assert!(matches!(workflow.state, WorkflowState::Started));
        assert_eq!(workflow.messages.len(), 1);
        assert_eq!(workflow.messages[0].role, MessageRole::System);
        assert_eq!(workflow.output(), None);
    }

    #[tokio::test]
    async fn direct_answer_completes() {
        let provider = Arc::new(ScriptedProvider::new().answer("Nothing to do."));
        let mut wf = workflow("hi");

        executor(provider.clone(), 5)
            .run(&mut wf, &ToolContext::new())
            .await
            .unwrap();

        assert_eq!(wf.output(), Some("Nothing to do."));
        assert_eq!(wf.iteration_count, 1);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn tool_results_are_fed_back() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .call_tool("c1", "shout", json!({}))
                .call_tool("c2", "echo", json!({"a": 1}))
                .answer("Done."),
        );
        let mut wf = workflow("go");

        executor(provider.clone(), 5)
            .run(&mut wf, &ToolContext::new())
            .await
            .unwrap();

        assert_eq!(wf.output(), Some("Done."));
        assert_eq!(provider.calls(), 3);

        let second = provider.conversation(1);
        let reply = second.last().unwrap();
        assert_eq!(reply.role, MessageRole::Tool);
        assert_eq!(reply.tool_call_id.as_deref(), Some("c1"));
        assert_eq!(reply.content, "HELLO");

        let third = provider.conversation(2);
        let echoed: Value = serde_json::from_str(&third.last().unwrap().content).unwrap();
        assert_eq!(echoed, json!({"echo": {"a": 1}}));
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_to_the_model() {
        let provider = Arc::new(
            ScriptedProvider::new()
                .call_tool("c1", "teleport", json!({}))
                .answer("Sorry."),
        );
        let mut wf = workflow("go");

        executor(provider.clone(), 5)
            .run(&mut wf, &ToolContext::new())
            .await
            .unwrap();

        let reply = provider.conversation(1).last().unwrap().clone();
        assert_eq!(reply.content, "Error: Tool not found: teleport");
        assert_eq!(wf.output(), Some("Sorry."));
    }

    #[tokio::test]
    async fn unreadable_arguments_abort() {
        let provider =
            Arc::new(ScriptedProvider::new().call_tool("c1", "echo", json!("{broken")));
        let mut wf = workflow("go");

        let err = executor(provider, 5)
            .run(&mut wf, &ToolContext::new())
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Tool(ToolError::InvalidArguments(_))));
        assert!(matches!(wf.state, WorkflowState::Failed { .. }));
    }

    #[tokio::test]
    async fn stops_after_max_iterations() {
        let mut script = ScriptedProvider::new();
        for i in 0..10 {
            script = script.call_tool(&format!("c{}", i), "shout", json!({}));
        }
        let provider = Arc::new(script);
        let mut wf = workflow("loop");

        let err = executor(provider.clone(), 3)
            .run(&mut wf, &ToolContext::new())
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::MaxIterationsExceeded));
        assert_eq!(provider.calls(), 3);
        assert_eq!(wf.iteration_count, 3);
    }

    #[tokio::test]
    async fn llm_failure_fails_the_workflow() {
        let provider = Arc::new(ScriptedProvider::new().fail(LlmError::RateLimited));
        let mut wf = workflow("go");

        let err = executor(provider, 5)
            .run(&mut wf, &ToolContext::new())
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Llm(LlmError::RateLimited)));
        assert!(matches!(wf.state, WorkflowState::Failed { .. }));
    }

    #[tokio::test]
    async fn terminal_workflow_cannot_step() {
        let provider = Arc::new(ScriptedProvider::new());
        let mut wf = workflow("go");
        wf.state = WorkflowState::Completed {
            output: "x".to_string(),
        };

        let err = executor(provider, 5)
            .step(&mut wf, &ToolContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidStateTransition(_)));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("Março", 3), "Mar...");
        assert_eq!(truncate("ação", 2), "aç...");
        assert_eq!(truncate("ok", 5), "ok");
    }
}
