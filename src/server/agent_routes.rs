//! Natural-language endpoint backed by [`WorkforceAgent`](crate::agent::WorkforceAgent).

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::agent::AgentError;
use crate::server::state::{OptionalAgent, ServerState};

#[derive(Debug, Deserialize)]
pub struct AgentRequest {
    pub input: String,
}

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub output: String,
}

async fn run_agent(
    State(agent): State<OptionalAgent>,
    body: Result<Json<AgentRequest>, JsonRejection>,
) -> Response {
    let Some(agent) = agent else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": AgentError::MissingApiKey.to_string() })),
        )
            .into_response();
    };
    let input = match body {
        Ok(Json(request)) if !request.input.trim().is_empty() => request.input,
        Ok(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Input is required" })),
            )
                .into_response()
        }
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": rejection.body_text() })),
            )
                .into_response()
        }
    };

    let output = agent.run(&input).await;
    Json(AgentResponse { output }).into_response()
}

pub fn agent_routes() -> Router<ServerState> {
    Router::new().route("/", post(run_agent))
}
