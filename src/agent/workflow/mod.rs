//! Tool-calling loop: ask the model, run the tools it picks, feed the results
//! back, until it answers in plain text or the iteration budget runs out.

mod executor;
mod state;

pub use executor::{Workflow, WorkflowError, WorkflowExecutor};
pub use state::WorkflowState;
