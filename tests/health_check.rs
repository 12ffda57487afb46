//! Integration tests for the unauthenticated service routes

mod common;

use common::spawn_app;
use serde_json::Value;

#[tokio::test]
async fn health_check_works() {
    let app = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length());
}

#[tokio::test]
async fn index_returns_welcome_message() {
    let app = spawn_app();

    let response = reqwest::Client::new()
        .get(&app.address)
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Welcome to the Healthcare API!");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/health_check", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.headers().contains_key("x-request-id"));
}
