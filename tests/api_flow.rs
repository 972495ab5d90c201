//! End-to-end HTTP tests for the auth and inventory flows.
//!
//! Each test builds the real router over a throwaway SQLite database and
//! drives it with `tower::ServiceExt::oneshot`.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use pharmstock_backend::app::build_router;
use pharmstock_backend::auth::{AuthService, JwtHandler, RevocationLedger, UserStore};
use pharmstock_backend::inventory::{DrugStore, InventoryState};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

fn test_app() -> (Router, NamedTempFile) {
    let temp_file = NamedTempFile::new().unwrap();
    let db_path = temp_file.path().to_str().unwrap();

    let users = Arc::new(UserStore::new(db_path).unwrap());
    let ledger = Arc::new(RevocationLedger::new(db_path).unwrap());
    let drugs = Arc::new(DrugStore::new(db_path).unwrap());
    let codec = Arc::new(JwtHandler::new("integration-test-secret".to_string()));

    let auth = AuthService::new(users, codec, ledger);
    let inventory = InventoryState { drugs };

    (build_router(auth, inventory), temp_file)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn bearer_json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn register_and_login(app: &Router, username: &str, password: &str) -> (String, String, Value) {
    let (status, _) = send(
        app,
        json_request(
            "POST",
            "/auth/register",
            json!({ "username": username, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/auth/login",
            json!({ "username": username, "password": password }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let access = body["access_token"].as_str().unwrap().to_string();
    let refresh = body["refresh_token"].as_str().unwrap().to_string();
    let user = body["user"].clone();
    (access, refresh, user)
}

#[tokio::test]
async fn health_check_is_public() {
    let (app, _temp) = test_app();

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn register_login_me_logout_roundtrip() {
    let (app, _temp) = test_app();

    let (access, _refresh, user) = register_and_login(&app, "alice", "pw1").await;
    assert_eq!(user["username"], "alice");
    assert_eq!(user["role"], "user");

    // Authorized call returns the same subject
    let (status, body) = send(&app, bearer_request("GET", "/auth/me", &access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user["id"]);
    assert_eq!(body["username"], "alice");

    // Revoke the access token
    let (status, _) = send(&app, bearer_request("POST", "/auth/logout/access", &access)).await;
    assert_eq!(status, StatusCode::OK);

    // Token is now rejected, permanently
    let (status, _) = send(&app, bearer_request("GET", "/auth/me", &access)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&app, bearer_request("GET", "/auth/me", &access)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Logging out the same token again is not an error
    let (status, _) = send(&app, bearer_request("POST", "/auth/logout/access", &access)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn register_duplicate_and_bad_logins() {
    let (app, _temp) = test_app();

    let (_, _, _) = register_and_login(&app, "alice", "pw1").await;

    // Duplicate registration
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            json!({ "username": "alice", "password": "other" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Missing fields
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            json!({ "username": "", "password": "" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Wrong password and unknown user are indistinguishable
    let (status_a, body_a) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            json!({ "username": "alice", "password": "wrong" }),
        ),
    )
    .await;
    let (status_b, body_b) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            json!({ "username": "nobody", "password": "pw1" }),
        ),
    )
    .await;
    assert_eq!(status_a, StatusCode::UNAUTHORIZED);
    assert_eq!(status_b, StatusCode::UNAUTHORIZED);
    assert_eq!(body_a, body_b);
}

#[tokio::test]
async fn refresh_flow_and_sibling_revocation() {
    let (app, _temp) = test_app();

    let (access, refresh, _) = register_and_login(&app, "alice", "pw1").await;

    // An access token cannot be used to refresh
    let (status, _) = send(&app, bearer_request("POST", "/auth/refresh", &access)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Refresh mints a usable access token
    let (status, body) = send(&app, bearer_request("POST", "/auth/refresh", &refresh)).await;
    assert_eq!(status, StatusCode::OK);
    let new_access = body["access_token"].as_str().unwrap().to_string();

    let (status, _) = send(&app, bearer_request("GET", "/auth/me", &new_access)).await;
    assert_eq!(status, StatusCode::OK);

    // Revoking the refresh token leaves already-issued access tokens valid
    let (status, _) = send(
        &app,
        bearer_request("POST", "/auth/logout/refresh", &refresh),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, bearer_request("POST", "/auth/refresh", &refresh)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, bearer_request("GET", "/auth/me", &new_access)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn drug_crud_with_ownership() {
    let (app, _temp) = test_app();

    let (alice_access, _, _) = register_and_login(&app, "alice", "pw1").await;
    let (bob_access, _, _) = register_and_login(&app, "bob", "pw2").await;

    // Unauthenticated create is rejected
    let (status, _) = send(
        &app,
        json_request("POST", "/drugs", json!({ "name": "Aspirin" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Alice adds a record
    let (status, body) = send(
        &app,
        bearer_json_request(
            "POST",
            "/drugs",
            &alice_access,
            json!({ "name": "Aspirin", "quantity": 5, "min_threshold": 10 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let drug_id = body["drug"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["drug"]["owner"], "alice");
    assert_eq!(body["drug"]["low_stock"], true);

    // Duplicate per-owner name
    let (status, _) = send(
        &app,
        bearer_json_request("POST", "/drugs", &alice_access, json!({ "name": "Aspirin" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Public list and single-record reads
    let (status, body) = send(
        &app,
        Request::builder().uri("/drugs").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        Request::builder()
            .uri(format!("/drugs/{drug_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Low-stock and search are public
    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/drugs/low_stock")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/drugs/search?q=asp")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Bob may not edit Alice's record
    let (status, _) = send(
        &app,
        bearer_json_request(
            "PUT",
            &format!("/drugs/{drug_id}"),
            &bob_access,
            json!({ "quantity": 100 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The owner may
    let (status, body) = send(
        &app,
        bearer_json_request(
            "PUT",
            &format!("/drugs/{drug_id}"),
            &alice_access,
            json!({ "quantity": 100 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["drug"]["quantity"], 100);
    assert_eq!(body["drug"]["low_stock"], false);

    // Per-owner listing
    let (status, body) = send(&app, bearer_request("GET", "/drugs/mine", &alice_access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, bearer_request("GET", "/drugs/mine", &bob_access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);

    // Bob may not delete it either; Alice may
    let (status, _) = send(
        &app,
        bearer_request("DELETE", &format!("/drugs/{drug_id}"), &bob_access),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        bearer_request("DELETE", &format!("/drugs/{drug_id}"), &alice_access),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Request::builder()
            .uri(format!("/drugs/{drug_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_can_override_and_promote() {
    let (app, _temp) = test_app();

    let (alice_access, _, alice_user) = register_and_login(&app, "alice", "pw1").await;
    let alice_id = alice_user["id"].as_str().unwrap().to_string();

    // The bootstrap admin logs in
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            json!({ "username": "admin", "password": "admin123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let admin_access = body["access_token"].as_str().unwrap().to_string();

    // Alice adds a record; the admin edits it without owning it
    let (status, body) = send(
        &app,
        bearer_json_request(
            "POST",
            "/drugs",
            &alice_access,
            json!({ "name": "Ibuprofen", "quantity": 50 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let drug_id = body["drug"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        bearer_json_request(
            "PUT",
            &format!("/drugs/{drug_id}"),
            &admin_access,
            json!({ "quantity": 7 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Non-admin promotion is forbidden
    let (status, _) = send(
        &app,
        bearer_request("POST", &format!("/admin/promote/{alice_id}"), &alice_access),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin promotion works, and /auth/me reflects the new role
    let (status, _) = send(
        &app,
        bearer_request("POST", &format!("/admin/promote/{alice_id}"), &admin_access),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, bearer_request("GET", "/auth/me", &alice_access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");

    // Admin user listing
    let (status, body) = send(&app, bearer_request("GET", "/admin/users", &admin_access)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().len() >= 2);

    // Alice's existing token still carries the role snapshot from login,
    // so admin-gated routes stay closed until she logs in again.
    let (status, _) = send(&app, bearer_request("GET", "/admin/users", &alice_access)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            json!({ "username": "alice", "password": "pw1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_alice_access = body["access_token"].as_str().unwrap().to_string();
    let (status, _) = send(
        &app,
        bearer_request("GET", "/admin/users", &new_alice_access),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
