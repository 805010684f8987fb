use crate::agent::llm::ToolCall;
use serde::Serialize;

/// Where a workflow stands between two executor steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkflowState {
    Started,
    /// Next step asks the model for a completion.
    Thinking,
    /// Next step runs the calls the model requested.
    ExecutingTools { tool_calls: Vec<ToolCall> },
    Completed { output: String },
    Failed { error: String },
}

impl WorkflowState {
    pub fn can_continue(&self) -> bool {
        matches!(
            self,
            WorkflowState::Started | WorkflowState::Thinking | WorkflowState::ExecutingTools { .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        !self.can_continue()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_stop_the_loop() {
        assert!(WorkflowState::Started.can_continue());
        assert!(WorkflowState::ExecutingTools { tool_calls: vec![] }.can_continue());
        assert!(WorkflowState::Completed {
            output: "done".to_string()
        }
        .is_terminal());
        assert!(WorkflowState::Failed {
            error: "boom".to_string()
        }
        .is_terminal());
    }
}
