//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per server endpoint.
//! When API routes or request formats change, update only this file.

#![allow(dead_code)]

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    pub async fn dispatch(&self, body: Value) -> Response {
        self.client
            .post(self.url("/api/mcp"))
            .json(&body)
            .send()
            .await
            .expect("Dispatch request failed")
    }

    /// Dispatches and returns the decoded envelope.
    pub async fn dispatch_json(&self, body: Value) -> Value {
        self.dispatch(body)
            .await
            .json()
            .await
            .expect("Dispatch response was not JSON")
    }

    pub async fn mcp_usage(&self) -> Response {
        self.client
            .get(self.url("/api/mcp"))
            .send()
            .await
            .expect("Usage request failed")
    }

    pub async fn schema(&self) -> Response {
        self.client
            .get(self.url("/api/mcp/schema"))
            .send()
            .await
            .expect("Schema request failed")
    }

    // ========================================================================
    // Employees
    // ========================================================================

    pub async fn list_employees(&self) -> Response {
        self.client
            .get(self.url("/api/employees"))
            .send()
            .await
            .expect("List employees request failed")
    }

    pub async fn create_employee(&self, body: Value) -> Response {
        self.client
            .post(self.url("/api/employees"))
            .json(&body)
            .send()
            .await
            .expect("Create employee request failed")
    }

    pub async fn get_employee(&self, id: i64) -> Response {
        self.client
            .get(self.url(&format!("/api/employees/{}", id)))
            .send()
            .await
            .expect("Get employee request failed")
    }

    pub async fn update_employee(&self, id: i64, body: Value) -> Response {
        self.client
            .put(self.url(&format!("/api/employees/{}", id)))
            .json(&body)
            .send()
            .await
            .expect("Update employee request failed")
    }

    pub async fn delete_employee(&self, id: i64) -> Response {
        self.client
            .delete(self.url(&format!("/api/employees/{}", id)))
            .send()
            .await
            .expect("Delete employee request failed")
    }

    pub async fn employee_records(&self, id: i64) -> Response {
        self.client
            .get(self.url(&format!("/api/employees/{}/monthly-records", id)))
            .send()
            .await
            .expect("Employee records request failed")
    }

    // ========================================================================
    // Monthly records
    // ========================================================================

    pub async fn list_records(&self, query: &[(&str, String)]) -> Response {
        self.client
            .get(self.url("/api/monthly-records"))
            .query(query)
            .send()
            .await
            .expect("List records request failed")
    }

    pub async fn create_record(&self, body: Value) -> Response {
        self.client
            .post(self.url("/api/monthly-records"))
            .json(&body)
            .send()
            .await
            .expect("Create record request failed")
    }

    pub async fn update_record(&self, id: i64, body: Value) -> Response {
        self.client
            .put(self.url(&format!("/api/monthly-records/{}", id)))
            .json(&body)
            .send()
            .await
            .expect("Update record request failed")
    }

    pub async fn delete_record(&self, id: i64) -> Response {
        self.client
            .delete(self.url(&format!("/api/monthly-records/{}", id)))
            .send()
            .await
            .expect("Delete record request failed")
    }

    // ========================================================================
    // Agent and diagnostics
    // ========================================================================

    pub async fn ask_agent(&self, input: &str) -> Response {
        self.client
            .post(self.url("/api/agent"))
            .json(&json!({ "input": input }))
            .send()
            .await
            .expect("Agent request failed")
    }

    pub async fn env_check(&self) -> Response {
        self.client
            .get(self.url("/api/env-check"))
            .send()
            .await
            .expect("Env check request failed")
    }
}
