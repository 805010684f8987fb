//! Natural-language front end: one user request in, one text answer out.

use super::llm::{CompletionOptions, LlmProvider, OpenAIProvider};
use super::tools::{workforce_context, workforce_tools, ToolContext, SCHEMA_MISMATCH};
use super::workflow::{Workflow, WorkflowError, WorkflowExecutor};
use crate::config::AgentSettings;
use crate::dispatch::Dispatcher;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

const SYSTEM_PROMPT: &str = "You are a payroll assistant for a small company. \
You manage employees and the monthly records of weekends and holidays they worked, \
using the tools provided. Amounts are derived from each employee's weekend and holiday \
rates and are in Brazilian reais. When a request names an employee without an ID, \
look the employee up first. Never invent IDs or figures; report tool errors plainly.";

const REPHRASE_HINT: &str = "I encountered an error with the tool input format. \
Please try rephrasing your request with more specific details. For example: \
'Add a monthly record for employee ID 2 with 3 weekends worked and 1 holiday worked'";

pub const MAX_ITERATIONS_MESSAGE: &str = "Agent stopped due to max iterations.";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("OpenAI API key is missing. Please check your .env file or provide a key.")]
    MissingApiKey,

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}

pub struct WorkforceAgent {
    executor: WorkflowExecutor,
    ctx: ToolContext,
}

impl WorkforceAgent {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        dispatcher: Dispatcher,
        max_iterations: usize,
        options: CompletionOptions,
    ) -> Self {
        let executor = WorkflowExecutor::new(llm, Arc::new(workforce_tools()), max_iterations)
            .with_completion_options(options);
        Self {
            executor,
            ctx: workforce_context(dispatcher),
        }
    }

    /// Builds an OpenAI-backed agent, failing when no key source is configured.
    pub fn from_settings(settings: &AgentSettings, dispatcher: Dispatcher) -> Result<Self, AgentError> {
        if !settings.is_enabled() {
            return Err(AgentError::MissingApiKey);
        }
        let llm = OpenAIProvider::new(&settings.base_url, &settings.model, settings.api_key.clone());
        let options = CompletionOptions {
            temperature: settings.temperature,
            max_tokens: None,
            timeout: settings.timeout,
        };
        Ok(Self::new(Arc::new(llm), dispatcher, settings.max_iterations, options))
    }

    /// Runs `input` through the tool-calling loop and returns the model's answer.
    pub async fn try_run(&self, input: &str) -> Result<String, AgentError> {
        info!("Running agent with query: {}", input);
        let mut workflow = Workflow::new(SYSTEM_PROMPT);
        workflow.add_user_message(input);

        self.executor.run(&mut workflow, &self.ctx).await?;

        let output = workflow.output().unwrap_or_default().to_string();
        info!(
            "Agent finished after {} iterations",
            workflow.iteration_count
        );
        Ok(output)
    }

    /// Like [`WorkforceAgent::try_run`], rendering failures as the answer text.
    pub async fn run(&self, input: &str) -> String {
        match self.try_run(input).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Agent run failed: {}", e);
                describe_failure(&e)
            }
        }
    }
}

/// User-facing text for a failed run.
pub fn describe_failure(error: &AgentError) -> String {
    match error {
        AgentError::Workflow(WorkflowError::MaxIterationsExceeded) => {
            MAX_ITERATIONS_MESSAGE.to_string()
        }
        other => {
            let message = other.to_string();
            if message.contains(SCHEMA_MISMATCH) {
                REPHRASE_HINT.to_string()
            } else {
                format!("Error: {}", message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::llm::scripted::ScriptedProvider;
    use crate::agent::llm::{ApiKeySource, LlmError, MessageRole};
    use crate::dispatch::FixedClock;
    use crate::store::SqliteWorkforceStore;
    use serde_json::json;
    use tempfile::TempDir;

    struct TestAgent {
        agent: WorkforceAgent,
        provider: Arc<ScriptedProvider>,
        dispatcher: Dispatcher,
        _temp_dir: TempDir,
    }

    fn create_test_agent(provider: ScriptedProvider, max_iterations: usize) -> TestAgent {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteWorkforceStore::new(temp_dir.path().join("workforce.db")).unwrap();
        let dispatcher =
            Dispatcher::with_clock(Arc::new(store), Arc::new(FixedClock::new(2024, 5)));
        let provider = Arc::new(provider);
        TestAgent {
            agent: WorkforceAgent::new(
                provider.clone(),
                dispatcher.clone(),
                max_iterations,
                CompletionOptions::default(),
            ),
            provider,
            dispatcher,
            _temp_dir: temp_dir,
        }
    }

    #[tokio::test]
    async fn creates_employee_through_tools() {
        let t = create_test_agent(
            ScriptedProvider::new()
                .call_tool(
                    "c1",
                    "create_employee",
                    json!({"name": "Ana", "email": "ana@x.com", "telephone": "111"}),
                )
                .answer("Ana was added with ID 1."),
            5,
        );

        let output = t.agent.run("Add Ana, ana@x.com, phone 111").await;

        assert_eq!(output, "Ana was added with ID 1.");
        assert_eq!(t.dispatcher.store().count_employees().unwrap(), 1);

        let second = t.provider.conversation(1);
        assert_eq!(second[0].role, MessageRole::System);
        assert_eq!(second[1].content, "Add Ana, ana@x.com, phone 111");
        assert_eq!(
            second.last().unwrap().content,
            "Employee created successfully with ID: 1"
        );
    }

    #[tokio::test]
    async fn malformed_tool_input_gets_rephrase_hint() {
        let t = create_test_agent(
            ScriptedProvider::new().call_tool("c1", "add_monthly_record", json!({"employeeId": 2})),
            5,
        );
        assert_eq!(t.agent.run("add a record").await, REPHRASE_HINT);
    }

    #[tokio::test]
    async fn iteration_budget_is_reported() {
        let mut script = ScriptedProvider::new();
        for i in 0..6 {
            script = script.call_tool(&format!("c{}", i), "get_mcp_schema", json!({}));
        }
        let t = create_test_agent(script, 5);

        assert_eq!(t.agent.run("loop forever").await, MAX_ITERATIONS_MESSAGE);
        assert_eq!(t.provider.calls(), 5);
    }

    #[tokio::test]
    async fn provider_errors_are_prefixed() {
        let t = create_test_agent(ScriptedProvider::new().fail(LlmError::RateLimited), 5);
        assert_eq!(
            t.agent.run("hello").await,
            "Error: LLM error: Rate limited by the LLM provider"
        );
    }

    #[test]
    fn missing_key_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteWorkforceStore::new(temp_dir.path().join("workforce.db")).unwrap();
        let settings = AgentSettings {
            api_key: ApiKeySource::None,
            ..Default::default()
        };

        let err = WorkforceAgent::from_settings(&settings, Dispatcher::new(Arc::new(store)))
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "OpenAI API key is missing. Please check your .env file or provide a key."
        );
    }
}
