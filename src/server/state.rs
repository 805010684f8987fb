use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use crate::agent::WorkforceAgent;
use crate::config::AgentSettings;
use crate::dispatch::Dispatcher;

use super::ServerConfig;

pub type OptionalAgent = Option<Arc<WorkforceAgent>>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub dispatcher: Dispatcher,
    /// `None` when no LLM key source is configured.
    pub agent: OptionalAgent,
    pub agent_settings: AgentSettings,
    pub hash: String,
}

impl FromRef<ServerState> for Dispatcher {
    fn from_ref(input: &ServerState) -> Self {
        input.dispatcher.clone()
    }
}

impl FromRef<ServerState> for OptionalAgent {
    fn from_ref(input: &ServerState) -> Self {
        input.agent.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
