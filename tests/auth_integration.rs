mod common;

use clinic_auth::auth::Role;
use clinic_auth::store::AccountStore;
use common::{spawn_app, TestApp};
use serde_json::{json, Value};

async fn signup(app: &TestApp, body: &Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(&format!("{}/api/signup", &app.address))
        .json(body)
        .send()
        .await
        .expect("Failed to execute request.")
}

async fn login(app: &TestApp, body: &Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(&format!("{}/api/login", &app.address))
        .json(body)
        .send()
        .await
        .expect("Failed to execute request.")
}

async fn login_token(app: &TestApp, username: &str, password: &str) -> String {
    let response = login(app, &json!({"username": username, "password": password})).await;
    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    body["token"].as_str().expect("No token in response").to_string()
}

// --- Registration Tests ---

#[tokio::test]
async fn signup_returns_201_for_valid_request() {
    let app = spawn_app();

    let response = signup(
        &app,
        &json!({"username": "alice", "password": "pw1", "role": "Patient"}),
    )
    .await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "User registered successfully");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    // Stored record holds a hash, never the plaintext
    let account = app
        .store
        .find_by_username("alice")
        .await
        .expect("Store lookup failed")
        .expect("Account was not stored");
    assert_eq!(account.role, Role::Patient);
    assert_ne!(account.password_hash, "pw1");
}

#[tokio::test]
async fn signup_returns_400_for_duplicate_username() {
    let app = spawn_app();
    let body = json!({"username": "alice", "password": "pw1", "role": "Patient"});

    let first = signup(&app, &body).await;
    assert_eq!(201, first.status().as_u16());

    let second = signup(&app, &body).await;
    assert_eq!(400, second.status().as_u16(), "Duplicate username should be rejected with 400");
    let response_body: Value = second.json().await.expect("Failed to parse response");
    assert_eq!(response_body["message"], "Username already exists");
}

#[tokio::test]
async fn signup_is_case_sensitive_on_username() {
    let app = spawn_app();

    let first = signup(&app, &json!({"username": "alice", "password": "pw1", "role": "Patient"})).await;
    let second = signup(&app, &json!({"username": "Alice", "password": "pw1", "role": "Patient"})).await;

    assert_eq!(201, first.status().as_u16());
    assert_eq!(201, second.status().as_u16());
}

#[tokio::test]
async fn signup_returns_400_for_missing_fields() {
    let app = spawn_app();

    let test_cases = vec![
        (json!({"password": "pw1", "role": "Patient"}), "missing username"),
        (json!({"username": "alice", "role": "Patient"}), "missing password"),
        (json!({"username": "alice", "password": "pw1"}), "missing role"),
        (json!({"username": "", "password": "pw1", "role": "Patient"}), "empty username"),
        (json!({}), "missing all fields"),
    ];

    for (body, reason) in test_cases {
        let response = signup(&app, &body).await;

        assert_eq!(400, response.status().as_u16(), "Should reject request: {}", reason);
        let response_body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(response_body["message"], "Missing required fields", "{}", reason);
    }
}

#[tokio::test]
async fn signup_returns_400_for_unknown_role() {
    let app = spawn_app();

    let response = signup(&app, &json!({"username": "eve", "password": "pw1", "role": "Nurse"})).await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn signup_returns_400_for_malformed_json() {
    let app = spawn_app();

    let response = reqwest::Client::new()
        .post(&format!("{}/api/signup", &app.address))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

// --- Login Tests ---

#[tokio::test]
async fn login_returns_200_and_token_for_valid_credentials() {
    let app = spawn_app();
    signup(&app, &json!({"username": "alice", "password": "pw1", "role": "Patient"})).await;

    let response = login(&app, &json!({"username": "alice", "password": "pw1"})).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Login successful");

    let token = body["token"].as_str().expect("No token in response");
    let identity = app.codec.verify(token).expect("Issued token should verify");
    assert_eq!(identity.role, Role::Patient);
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = spawn_app();
    signup(&app, &json!({"username": "u", "password": "rightpw", "role": "Doctor"})).await;

    let wrong_password = login(&app, &json!({"username": "u", "password": "wrongpw"})).await;
    let unknown_user = login(&app, &json!({"username": "nosuchuser", "password": "x"})).await;

    assert_eq!(401, wrong_password.status().as_u16());
    assert_eq!(401, unknown_user.status().as_u16());

    let wrong_password: Value = wrong_password.json().await.expect("Failed to parse response");
    let unknown_user: Value = unknown_user.json().await.expect("Failed to parse response");
    assert_eq!(wrong_password["message"], unknown_user["message"]);
    assert_eq!(wrong_password["code"], unknown_user["code"]);
    assert_eq!(wrong_password["message"], "Invalid username or password");
}

#[tokio::test]
async fn login_returns_400_for_missing_fields() {
    let app = spawn_app();

    let test_cases = vec![
        (json!({"username": "alice"}), "missing password"),
        (json!({"password": "pw1"}), "missing username"),
        (json!({}), "missing all fields"),
    ];

    for (body, reason) in test_cases {
        let response = login(&app, &body).await;
        assert_eq!(400, response.status().as_u16(), "Should reject request: {}", reason);
    }
}

// --- Current User Tests ---

#[tokio::test]
async fn signup_login_me_scenario() {
    let app = spawn_app();
    let client = reqwest::Client::new();

    let response = signup(&app, &json!({"username": "alice", "password": "pw1", "role": "Patient"})).await;
    assert_eq!(201, response.status().as_u16());
    let signup_body: Value = response.json().await.expect("Failed to parse response");

    let token = login_token(&app, "alice", "pw1").await;

    let response = client
        .get(&format!("{}/api/me", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["user_id"], signup_body["user_id"]);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "Patient");
}

#[tokio::test]
async fn me_returns_401_without_token() {
    let app = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/api/me", &app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Token is missing!");
}

#[tokio::test]
async fn rejected_requests_carry_matching_request_id() {
    let app = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/api/me", &app.address))
        .header("Authorization", "Bearer invalid.token.here")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("No x-request-id header on rejected request")
        .to_str()
        .expect("Header is not ASCII")
        .to_string();
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error_id"], request_id.as_str());
    assert_eq!(body["message"], "Token is invalid!");
}

#[tokio::test]
async fn me_returns_401_with_invalid_token() {
    let app = spawn_app();

    let response = reqwest::Client::new()
        .get(&format!("{}/api/me", &app.address))
        .header("Authorization", "Bearer invalid.token.here")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn me_does_not_reveal_token_expiry() {
    let app = spawn_app();
    let expired = app
        .codec
        .issue_with_ttl(1, Role::Patient, 0)
        .expect("Failed to issue token");

    let response = reqwest::Client::new()
        .get(&format!("{}/api/me", &app.address))
        .header("Authorization", format!("Bearer {}", expired))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Token is invalid!");
}

#[tokio::test]
async fn me_rejects_malformed_authorization_header() {
    let app = spawn_app();

    let malformed_headers = vec![
        "Bearer",             // missing token
        "Basic dXNlcjpwYXNz", // not Bearer
        "BearerToken",        // missing space
        "",                   // empty
    ];

    for header in malformed_headers {
        let response = reqwest::Client::new()
            .get(&format!("{}/api/me", &app.address))
            .header("Authorization", header)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(401, response.status().as_u16(), "Should reject malformed header: {}", header);
    }
}

#[tokio::test]
async fn me_returns_404_when_account_is_gone() {
    let app = spawn_app();
    // Valid signature for an account id that was never created
    let token = app.codec.issue(9999, Role::Admin).expect("Failed to issue token");

    let response = reqwest::Client::new()
        .get(&format!("{}/api/me", &app.address))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(404, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "User not found");
}

// --- Token Verification Tests ---

#[tokio::test]
async fn verify_token_returns_identity_for_valid_token() {
    let app = spawn_app();
    signup(&app, &json!({"username": "doc", "password": "pw", "role": "Doctor"})).await;
    let token = login_token(&app, "doc", "pw").await;

    let response = reqwest::Client::new()
        .post(&format!("{}/api/verify-token", &app.address))
        .json(&json!({"token": token}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Token is valid");
    assert_eq!(body["role"], "Doctor");
    assert!(body["user_id"].is_i64());
}

#[tokio::test]
async fn verify_token_reports_expiry() {
    let app = spawn_app();
    let expired = app
        .codec
        .issue_with_ttl(1, Role::Patient, 0)
        .expect("Failed to issue token");

    let response = reqwest::Client::new()
        .post(&format!("{}/api/verify-token", &app.address))
        .json(&json!({"token": expired}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Token has expired");
}

#[tokio::test]
async fn verify_token_rejects_garbage() {
    let app = spawn_app();

    let response = reqwest::Client::new()
        .post(&format!("{}/api/verify-token", &app.address))
        .json(&json!({"token": "not-a-token"}))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "TOKEN_INVALID");
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn verify_token_returns_400_for_missing_token() {
    let app = spawn_app();

    for body in [json!({}), json!({"token": ""})] {
        let response = reqwest::Client::new()
            .post(&format!("{}/api/verify-token", &app.address))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.");

        assert_eq!(400, response.status().as_u16());
        let response_body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(response_body["message"], "Token is missing");
    }
}
