//! End-to-end tests for the resource-style employee and record routes

mod common;

use common::{ana, bruno, record_for, TestClient, TestServer, ANA_NAME, BRUNO_NAME};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn create_employee(client: &TestClient, body: Value) -> i64 {
    let response = client.create_employee(body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    created["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_employees_are_listed_by_name() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    create_employee(&client, bruno()).await;
    create_employee(&client, ana()).await;

    let response = client.list_employees().await;
    assert_eq!(response.status(), StatusCode::OK);
    let employees: Vec<Value> = response.json().await.unwrap();
    let names: Vec<&str> = employees
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec![ANA_NAME, BRUNO_NAME]);
}

#[tokio::test]
async fn test_employee_crud_statuses() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let id = create_employee(&client, ana()).await;

    let response = client.update_employee(id, json!({"telephone": "999"})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["telephone"], json!("999"));
    assert_eq!(updated["name"], json!(ANA_NAME));

    let response = client.update_employee(id, json!({"weekendRate": "abc"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client.delete_employee(id).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = client.get_employee(id).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "Employee not found"}));
}

#[tokio::test]
async fn test_missing_required_fields_is_bad_request() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.create_employee(json!({"name": "Ana"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_record_conflict_returns_existing() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let id = create_employee(&client, ana()).await;

    let response = client.create_record(record_for(id, 2024, 3, 2, 1)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();

    let response = client.create_record(record_for(id, 2024, 3, 4, 4)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("already exists"));
    assert_eq!(body["existing"]["id"], created["id"]);
    assert_eq!(body["existing"]["totalAmount"], json!(350.0));
}

#[tokio::test]
async fn test_record_for_unknown_employee_is_not_found() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.create_record(record_for(42, 2024, 3, 1, 1)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_records_query_filters() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let ana_id = create_employee(&client, ana()).await;
    let bruno_id = create_employee(&client, bruno()).await;
    for month in 1..=3 {
        client.create_record(record_for(ana_id, 2024, month, 1, 0)).await;
    }
    client.create_record(record_for(bruno_id, 2023, 12, 1, 0)).await;

    let response = client
        .list_records(&[("employeeId", ana_id.to_string()), ("month", "2".to_string())])
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let records: Vec<Value> = response.json().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["month"], json!(2));

    let records: Vec<Value> = client
        .list_records(&[("year", "2023".to_string())])
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["employeeId"], json!(bruno_id));
}

#[tokio::test]
async fn test_record_update_and_delete() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let id = create_employee(&client, ana()).await;
    let created: Value = client
        .create_record(record_for(id, 2024, 3, 2, 1))
        .await
        .json()
        .await
        .unwrap();
    let record_id = created["id"].as_i64().unwrap();

    let response = client
        .update_record(record_id, json!({"holidaysWorked": 2}))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["holidayAmount"], json!(300.0));
    assert_eq!(updated["totalAmount"], json!(500.0));

    let response = client.delete_record(record_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"success": true}));

    let response = client.employee_records(id).await;
    let records: Vec<Value> = response.json().await.unwrap();
    assert!(records.is_empty());
    assert_eq!(server.dispatcher.store().count_records().unwrap(), 0);
}
