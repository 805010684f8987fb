//! End-to-end tests for the natural-language agent endpoint
//!
//! The agent talks to a scripted OpenAI-compatible server over HTTP.

mod common;

use common::{answer, tool_call, MockLlm, TestClient, TestServer, TEST_LLM_MODEL};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_agent_disabled_without_key() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.ask_agent("list employees").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        json!("OpenAI API key is missing. Please check your .env file or provide a key.")
    );

    let env: Value = client.env_check().await.json().await.unwrap();
    assert_eq!(env["llmKeyConfigured"], json!(false));
    assert_eq!(env["llmKeyPrefix"], Value::Null);
}

#[tokio::test]
async fn test_agent_creates_employee_and_record() {
    let llm = MockLlm::spawn(vec![
        tool_call(
            "call_1",
            "create_employee",
            json!({"name": "Ana", "email": "ana@x.com", "telephone": "111", "weekendRate": 100}),
        ),
        tool_call(
            "call_2",
            "add_monthly_record",
            json!({"employeeId": 1, "year": 2024, "month": 3, "weekendsWorked": 2, "holidaysWorked": 0}),
        ),
        answer("Ana was added and March 2024 was recorded."),
    ])
    .await;
    let server = TestServer::spawn_with_agent(&llm).await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .ask_agent("Add Ana (ana@x.com, 111) and record 2 weekends for March 2024")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(
        body["output"],
        json!("Ana was added and March 2024 was recorded.")
    );

    let store = server.dispatcher.store();
    assert_eq!(store.count_employees().unwrap(), 1);
    assert_eq!(store.count_records().unwrap(), 1);

    let requests = llm.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0]["model"], json!(TEST_LLM_MODEL));
    assert_eq!(requests[0]["tools"].as_array().unwrap().len(), 8);

    let messages = requests[1]["messages"].as_array().unwrap();
    let tool_reply = messages.last().unwrap();
    assert_eq!(tool_reply["role"], json!("tool"));
    assert_eq!(tool_reply["tool_call_id"], json!("call_1"));
    assert_eq!(
        tool_reply["content"],
        json!("Employee created successfully with ID: 1")
    );
}

#[tokio::test]
async fn test_agent_reports_iteration_limit() {
    let script = (0..6)
        .map(|i| tool_call(&format!("call_{}", i), "list_employees", json!({})))
        .collect();
    let llm = MockLlm::spawn(script).await;
    let server = TestServer::spawn_with_agent(&llm).await;
    let client = TestClient::new(server.base_url.clone());

    let body: Value = client.ask_agent("keep going").await.json().await.unwrap();

    assert_eq!(body["output"], json!("Agent stopped due to max iterations."));
    assert_eq!(llm.requests().len(), 5);
}

#[tokio::test]
async fn test_agent_blank_input_is_rejected() {
    let llm = MockLlm::spawn(Vec::new()).await;
    let server = TestServer::spawn_with_agent(&llm).await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.ask_agent("   ").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(llm.requests().is_empty());
}
