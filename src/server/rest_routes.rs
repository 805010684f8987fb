//! Resource-style routes over the dispatcher, for form-driven clients.
//!
//! Each handler builds the equivalent dispatch request, so validation, pay
//! derivation and the duplicate-period guard are shared with `/api/mcp`.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use tracing::error;

use crate::dispatch::{DispatchError, DispatchRequest, Dispatcher, FailureKind, Outcome};
use crate::server::state::ServerState;

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn failure_response(err: DispatchError) -> Response {
    let status = match err.kind() {
        FailureKind::Invalid => StatusCode::BAD_REQUEST,
        FailureKind::NotFound => StatusCode::NOT_FOUND,
        FailureKind::Conflict => StatusCode::CONFLICT,
        FailureKind::Fault => {
            error!("REST request failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_body(status, err.to_string())
}

/// Runs `request` and renders it with `status` on success.
fn respond(dispatcher: &Dispatcher, request: DispatchRequest, status: StatusCode) -> Response {
    match dispatcher.execute(&request) {
        Ok(Outcome::Done(Some(data))) => (status, Json(data)).into_response(),
        Ok(Outcome::Done(None)) => status.into_response(),
        Ok(Outcome::Conflict { message, existing }) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": message, "existing": existing })),
        )
            .into_response(),
        Err(err) => failure_response(err),
    }
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, Response> {
    body.map(|Json(value)| value)
        .map_err(|rejection| error_body(StatusCode::BAD_REQUEST, rejection.body_text()))
}

// ============================================================================
// Employees
// ============================================================================

async fn list_employees(State(dispatcher): State<Dispatcher>) -> Response {
    respond(
        &dispatcher,
        DispatchRequest::new("list", "employee"),
        StatusCode::OK,
    )
}

async fn create_employee(
    State(dispatcher): State<Dispatcher>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let data = match json_body(body) {
        Ok(data) => data,
        Err(response) => return response,
    };
    respond(
        &dispatcher,
        DispatchRequest::new("create", "employee").with_data(data),
        StatusCode::CREATED,
    )
}

async fn get_employee(State(dispatcher): State<Dispatcher>, Path(id): Path<String>) -> Response {
    respond(
        &dispatcher,
        DispatchRequest::new("get", "employee").with_params(json!({ "id": id })),
        StatusCode::OK,
    )
}

async fn update_employee(
    State(dispatcher): State<Dispatcher>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let data = match json_body(body) {
        Ok(data) => data,
        Err(response) => return response,
    };
    respond(
        &dispatcher,
        DispatchRequest::new("update", "employee")
            .with_params(json!({ "id": id }))
            .with_data(data),
        StatusCode::OK,
    )
}

async fn delete_employee(State(dispatcher): State<Dispatcher>, Path(id): Path<String>) -> Response {
    let request = DispatchRequest::new("delete", "employee").with_params(json!({ "id": id }));
    match dispatcher.execute(&request) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => failure_response(err),
    }
}

async fn list_employee_records(
    State(dispatcher): State<Dispatcher>,
    Path(id): Path<String>,
) -> Response {
    let lookup = DispatchRequest::new("get", "employee").with_params(json!({ "id": id }));
    if let Err(err) = dispatcher.execute(&lookup) {
        return failure_response(err);
    }
    respond(
        &dispatcher,
        DispatchRequest::new("getByEmployee", "monthlyWorkRecord")
            .with_params(json!({ "employeeId": id })),
        StatusCode::OK,
    )
}

// ============================================================================
// Monthly records
// ============================================================================

/// `?employeeId=&year=&month=` narrow the list; other keys are ignored.
async fn list_records(
    State(dispatcher): State<Dispatcher>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let mut filters = Map::new();
    for key in ["employeeId", "year", "month"] {
        if let Some(value) = query.get(key) {
            filters.insert(key.to_string(), Value::String(value.clone()));
        }
    }
    let request = if filters.is_empty() {
        DispatchRequest::new("list", "monthlyWorkRecord")
    } else {
        DispatchRequest::new("list", "monthlyWorkRecord")
            .with_params(json!({ "where": Value::Object(filters) }))
    };
    respond(&dispatcher, request, StatusCode::OK)
}

async fn create_record(
    State(dispatcher): State<Dispatcher>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let data = match json_body(body) {
        Ok(data) => data,
        Err(response) => return response,
    };
    respond(
        &dispatcher,
        DispatchRequest::new("create", "monthlyWorkRecord").with_data(data),
        StatusCode::CREATED,
    )
}

async fn get_record(State(dispatcher): State<Dispatcher>, Path(id): Path<String>) -> Response {
    respond(
        &dispatcher,
        DispatchRequest::new("get", "monthlyWorkRecord").with_params(json!({ "id": id })),
        StatusCode::OK,
    )
}

async fn update_record(
    State(dispatcher): State<Dispatcher>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let data = match json_body(body) {
        Ok(data) => data,
        Err(response) => return response,
    };
    respond(
        &dispatcher,
        DispatchRequest::new("update", "monthlyWorkRecord")
            .with_params(json!({ "id": id }))
            .with_data(data),
        StatusCode::OK,
    )
}

async fn delete_record(State(dispatcher): State<Dispatcher>, Path(id): Path<String>) -> Response {
    let request =
        DispatchRequest::new("delete", "monthlyWorkRecord").with_params(json!({ "id": id }));
    match dispatcher.execute(&request) {
        Ok(_) => Json(json!({ "success": true })).into_response(),
        Err(err) => failure_response(err),
    }
}

pub fn employee_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_employees).post(create_employee))
        .route(
            "/{id}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
        .route("/{id}/monthly-records", get(list_employee_records))
}

pub fn record_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(list_records).post(create_record))
        .route(
            "/{id}",
            get(get_record).put(update_record).delete(delete_record),
        )
}
