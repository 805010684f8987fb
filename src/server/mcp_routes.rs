//! Dispatch endpoint: `POST /api/mcp` runs one command, `GET /api/mcp` says how.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::{debug, error};

use crate::dispatch::{DispatchRequest, DispatchResponse, Dispatcher};
use crate::server::state::ServerState;

async fn describe_endpoint() -> impl IntoResponse {
    Json(json!({
        "message": "Model Context Protocol (MCP) endpoint",
        "usage": "Send POST requests with action, entity, and optional params/data",
        "examples": [
            { "action": "list", "entity": "employees" },
            { "action": "get", "entity": "employee", "params": { "id": 1 } },
            {
                "action": "create",
                "entity": "employee",
                "data": {
                    "name": "John Doe",
                    "email": "john@example.com",
                    "telephone": "123-456-7890"
                }
            }
        ]
    }))
}

/// Every dispatch outcome, failures included, is a 200 carrying the envelope.
async fn dispatch(
    State(dispatcher): State<Dispatcher>,
    body: Result<Json<DispatchRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Rejected dispatch body: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(DispatchResponse::failure(rejection.body_text())),
            )
                .into_response();
        }
    };
    Json(dispatcher.dispatch(&request)).into_response()
}

async fn get_schema(State(dispatcher): State<Dispatcher>) -> Response {
    match dispatcher.schema() {
        Ok(schema) => Json(schema).into_response(),
        Err(e) => {
            error!("Error generating schema: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

pub fn mcp_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(describe_endpoint).post(dispatch))
        .route("/schema", get(get_schema))
}
