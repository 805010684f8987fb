use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State, middleware, response::IntoResponse, routing::get, Json, Router,
};
use serde::Serialize;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use super::agent_routes::agent_routes;
use super::mcp_routes::mcp_routes;
use super::rest_routes::{employee_routes, record_routes};
use super::{log_requests, state::*, ServerConfig};
use crate::agent::{AgentError, WorkforceAgent};
use crate::config::AgentSettings;
use crate::dispatch::Dispatcher;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvCheck {
    database_path_exists: bool,
    llm_key_configured: bool,
    /// First five characters of a static key.
    llm_key_prefix: Option<String>,
    version: &'static str,
    hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

async fn env_check(State(state): State<ServerState>) -> impl IntoResponse {
    Json(EnvCheck {
        database_path_exists: state
            .config
            .db_path
            .as_ref()
            .is_some_and(|path| path.exists()),
        llm_key_configured: state.agent_settings.is_enabled(),
        llm_key_prefix: state.agent_settings.key_prefix(),
        version: env!("CARGO_PKG_VERSION"),
        hash: state.hash.clone(),
    })
}

impl ServerState {
    fn new(config: ServerConfig, dispatcher: Dispatcher, agent_settings: AgentSettings) -> Self {
        let agent = match WorkforceAgent::from_settings(&agent_settings, dispatcher.clone()) {
            Ok(agent) => {
                info!(
                    "Agent enabled with model {} at {}",
                    agent_settings.model, agent_settings.base_url
                );
                Some(Arc::new(agent))
            }
            Err(AgentError::MissingApiKey) => {
                warn!("No LLM API key configured, /api/agent is disabled");
                None
            }
            Err(e) => {
                warn!("Agent disabled: {}", e);
                None
            }
        };
        ServerState {
            config,
            start_time: Instant::now(),
            dispatcher,
            agent,
            agent_settings,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    dispatcher: Dispatcher,
    agent_settings: AgentSettings,
) -> Result<Router> {
    let state = ServerState::new(config.clone(), dispatcher, agent_settings);

    let api_routes: Router = Router::new()
        .nest("/mcp", mcp_routes())
        .nest("/employees", employee_routes())
        .nest("/monthly-records", record_routes())
        .nest("/agent", agent_routes())
        .route("/env-check", get(env_check))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let app: Router = home_router
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

pub async fn run_server(
    config: ServerConfig,
    dispatcher: Dispatcher,
    agent_settings: AgentSettings,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, dispatcher, agent_settings)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Ready to serve at port {}!", port);

    Ok(axum::serve(listener, app).await?)
}
