/// API integration tests
/// Drive the full router with in-memory storage and fake providers
mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use betnad_core::{SubjectId, UserStore, WalletStore};
use betnad_server::{api, state::AppState};
use betnad_storage::InMemoryStorage;
use chrono::{DateTime, Utc};
use common::{
    alice_record, fixtures::*, post_request, send, unavailable_store_app, FakeIdentity,
    FakeWalletProvider, TestApp,
};
use futures::future::join_all;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

fn timestamp(value: &Value) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value.as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc)
}

// =============================================================================
// Service Info
// =============================================================================

#[tokio::test]
async fn test_root() {
    let app = TestApp::new();

    let (status, body) = app.get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "BetNad Backend API");
    assert_eq!(body["status"], "running");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    timestamp(&body["timestamp"]);
}

#[tokio::test]
async fn test_health_touches_no_dependency() {
    let app = TestApp::new();

    let (status, body) = app.get("/api/auth/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "auth-service");
    timestamp(&body["timestamp"]);
    assert_eq!(app.identity.verify_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_health_with_storage_down() {
    let router = unavailable_store_app();

    let request = Request::builder()
        .uri("/api/auth/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&router, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_creates_user() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/auth/login", json!({ "idToken": ALICE_TOKEN }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Login successful");

    let user = &body["user"];
    assert_eq!(user["uid"], ALICE_UID);
    assert_eq!(user["email"], ALICE_EMAIL);
    assert_eq!(user["displayName"], "Alice");
    assert_eq!(user["photoURL"], "https://example.com/alice.png");
    assert!(user.get("walletAddress").is_none());
    timestamp(&user["createdAt"]);
    timestamp(&user["updatedAt"]);

    assert_eq!(app.storage.user_count().await, 1);
}

#[tokio::test]
async fn test_login_response_never_contains_oauth_fields() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/auth/login", json!({ "idToken": BOB_TOKEN }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let keys: Vec<&String> = body["user"].as_object().unwrap().keys().collect();
    for key in keys {
        assert!(
            ["uid", "email", "displayName", "photoURL", "walletAddress", "createdAt", "updatedAt"]
                .contains(&key.as_str()),
            "unexpected field {} in user response",
            key
        );
    }

    // Twitter linkage is persisted even though it is not returned
    let stored = app
        .storage
        .find_by_subject_id(&SubjectId::new(BOB_UID))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.twitter_id.as_deref(), Some("777"));
    assert_eq!(stored.twitter_username.as_deref(), Some("bob_bets"));
    assert_eq!(stored.email, "");
}

#[tokio::test]
async fn test_repeat_login_updates_single_record() {
    let app = TestApp::new();

    let (_, first) = app
        .post_json("/api/auth/login", json!({ "idToken": ALICE_TOKEN }))
        .await;

    let mut renamed = alice_record();
    renamed.display_name = Some("Alice B.".to_string());
    app.identity.update_record(renamed);

    let (status, second) = app
        .post_json("/api/auth/login", json!({ "idToken": ALICE_TOKEN }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["user"]["displayName"], "Alice B.");
    assert_eq!(second["user"]["createdAt"], first["user"]["createdAt"]);
    assert!(timestamp(&second["user"]["updatedAt"]) > timestamp(&first["user"]["updatedAt"]));
    assert_eq!(app.storage.user_count().await, 1);
}

#[tokio::test]
async fn test_login_invalid_token_writes_nothing() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/auth/login", json!({ "idToken": EXPIRED_TOKEN }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "LOGIN_FAILED");
    assert_eq!(body["message"], "Invalid or expired token");

    assert_eq!(app.identity.lookup_calls.load(Ordering::SeqCst), 0);
    assert_eq!(app.storage.user_count().await, 0);
}

#[tokio::test]
async fn test_login_invalid_token_leaves_existing_user_untouched() {
    let app = TestApp::new();
    let uid = SubjectId::new(ALICE_UID);

    let (status, _) = app
        .post_json("/api/auth/login", json!({ "idToken": ALICE_TOKEN }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let before = app.storage.find_by_subject_id(&uid).await.unwrap();

    let (status, body) = app
        .post_json("/api/auth/login", json!({ "idToken": EXPIRED_TOKEN }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "LOGIN_FAILED");
    assert_eq!(app.storage.find_by_subject_id(&uid).await.unwrap(), before);
    assert_eq!(app.storage.user_count().await, 1);
}

#[tokio::test]
async fn test_login_unknown_provider_user() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/auth/login", json!({ "idToken": ORPHAN_TOKEN }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "LOGIN_FAILED");
    assert_eq!(body["message"], "User not found");
    assert_eq!(app.storage.user_count().await, 0);
}

#[tokio::test]
async fn test_login_storage_failure_hides_detail() {
    let router = unavailable_store_app();

    let (status, body) = send(
        &router,
        post_request("/api/auth/login", &json!({ "idToken": ALICE_TOKEN }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "LOGIN_FAILED");
    assert_eq!(body["message"], "Service temporarily unavailable");
    assert!(!body.to_string().contains("10.0.0.7"));
}

#[tokio::test]
async fn test_concurrent_logins_leave_one_record() {
    let app = TestApp::new();

    let logins = (0..16).map(|_| app.post_json("/api/auth/login", json!({ "idToken": ALICE_TOKEN })));
    let results = join_all(logins).await;

    for (status, body) in &results {
        assert_eq!(*status, StatusCode::OK);
        assert_eq!(body["user"]["uid"], ALICE_UID);
    }
    assert_eq!(app.storage.user_count().await, 1);
}

// =============================================================================
// Validation
// =============================================================================

mod validation {
    use super::*;

    async fn assert_rejected(app: &TestApp, uri: &str, body: &str) {
        let (status, json) = send(&app.router, post_request(uri, body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?} on {}", body, uri);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "VALIDATION_ERROR");
        assert!(json["message"].is_string());
    }

    #[tokio::test]
    async fn test_empty_id_token() {
        let app = TestApp::new();

        let (status, body) = app
            .post_json("/api/auth/login", json!({ "idToken": "" }))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "ID token is required");
    }

    #[tokio::test]
    async fn test_bad_bodies_rejected_before_any_call() {
        let app = TestApp::new();

        for uri in ["/api/auth/login", "/api/auth/verify-token", "/api/wallets"] {
            assert_rejected(&app, uri, "{}").await;
            assert_rejected(&app, uri, r#"{"idToken": ""}"#).await;
            assert_rejected(&app, uri, r#"{"idToken": 42}"#).await;
            assert_rejected(&app, uri, "{not json").await;
        }

        assert_eq!(app.identity.verify_calls.load(Ordering::SeqCst), 0);
        assert_eq!(app.storage.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let app = TestApp::new();

        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .body(Body::from(json!({ "idToken": ALICE_TOKEN }).to_string()))
            .unwrap();
        let (status, body) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_blank_chain_type() {
        let app = TestApp::new();

        assert_rejected(
            &app,
            "/api/wallets",
            r#"{"idToken": "valid-token-alice", "chainType": "  "}"#,
        )
        .await;
    }
}

// =============================================================================
// Verify Token
// =============================================================================

#[tokio::test]
async fn test_verify_token_known_user() {
    let app = TestApp::new();
    app.post_json("/api/auth/login", json!({ "idToken": ALICE_TOKEN }))
        .await;

    let (status, body) = app
        .post_json("/api/auth/verify-token", json!({ "idToken": ALICE_TOKEN }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["message"], "Token is valid");
    assert_eq!(body["user"]["uid"], ALICE_UID);
}

#[tokio::test]
async fn test_verify_token_unknown_user_is_read_only() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/auth/verify-token", json!({ "idToken": ALICE_TOKEN }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["message"], "User not found in database");
    assert!(body.get("user").is_none());

    assert_eq!(app.storage.user_count().await, 0);
    assert_eq!(app.identity.lookup_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_verify_token_invalid_token() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json("/api/auth/verify-token", json!({ "idToken": EXPIRED_TOKEN }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_verify_token_storage_failure() {
    let router = unavailable_store_app();

    let (status, body) = send(
        &router,
        post_request("/api/auth/verify-token", &json!({ "idToken": ALICE_TOKEN }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["message"], "Service temporarily unavailable");
}

// =============================================================================
// Wallet Provisioning
// =============================================================================

mod wallets {
    use super::*;

    #[tokio::test]
    async fn test_requires_prior_login() {
        let app = TestApp::new();

        let (status, body) = app
            .post_json("/api/wallets", json!({ "idToken": ALICE_TOKEN }))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "WALLET_PROVISION_FAILED");
        assert_eq!(body["message"], "User not found");
        assert_eq!(app.wallet_provider.created.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provision_default_chain() {
        let app = TestApp::new();
        app.post_json("/api/auth/login", json!({ "idToken": ALICE_TOKEN }))
            .await;

        let (status, body) = app
            .post_json("/api/wallets", json!({ "idToken": ALICE_TOKEN }))
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["wallet"]["chainType"], "ethereum");
        assert_eq!(body["wallet"]["privyWalletId"], "privy-wallet-1");

        let address = body["wallet"]["address"].as_str().unwrap();
        let user = app
            .storage
            .find_by_subject_id(&SubjectId::new(ALICE_UID))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.wallet_address.as_deref(), Some(address));
    }

    #[tokio::test]
    async fn test_provision_named_chain() {
        let app = TestApp::new();
        app.post_json("/api/auth/login", json!({ "idToken": BOB_TOKEN }))
            .await;

        let (status, body) = app
            .post_json(
                "/api/wallets",
                json!({ "idToken": BOB_TOKEN, "chainType": "solana" }),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["wallet"]["chainType"], "solana");
    }

    #[tokio::test]
    async fn test_provision_is_idempotent() {
        let app = TestApp::new();
        app.post_json("/api/auth/login", json!({ "idToken": ALICE_TOKEN }))
            .await;

        let (_, first) = app
            .post_json("/api/wallets", json!({ "idToken": ALICE_TOKEN }))
            .await;
        let (_, second) = app
            .post_json("/api/wallets", json!({ "idToken": ALICE_TOKEN }))
            .await;

        assert_eq!(first["wallet"]["address"], second["wallet"]["address"]);
        assert_eq!(app.wallet_provider.created.load(Ordering::SeqCst), 1);
        assert_eq!(app.storage.wallet_count().await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_provisions_share_one_wallet() {
        let app = TestApp::with_wallet_provider(FakeWalletProvider::slow(Duration::from_millis(50)));
        app.post_json("/api/auth/login", json!({ "idToken": ALICE_TOKEN }))
            .await;

        let requests =
            (0..4).map(|_| app.post_json("/api/wallets", json!({ "idToken": ALICE_TOKEN })));
        let results = join_all(requests).await;

        let stored = app
            .storage
            .find_by_user_id(&SubjectId::new(ALICE_UID))
            .await
            .unwrap()
            .unwrap();

        for (status, body) in &results {
            assert_eq!(*status, StatusCode::OK);
            assert_eq!(body["wallet"]["address"], stored.address.as_str());
        }
        assert_eq!(app.storage.wallet_count().await, 1);
    }

    #[tokio::test]
    async fn test_wallet_address_survives_login() {
        let app = TestApp::new();
        app.post_json("/api/auth/login", json!({ "idToken": ALICE_TOKEN }))
            .await;
        let (_, provisioned) = app
            .post_json("/api/wallets", json!({ "idToken": ALICE_TOKEN }))
            .await;

        let (_, login) = app
            .post_json("/api/auth/login", json!({ "idToken": ALICE_TOKEN }))
            .await;

        assert_eq!(login["user"]["walletAddress"], provisioned["wallet"]["address"]);
    }

    #[tokio::test]
    async fn test_provider_failure_hides_detail() {
        let app = TestApp::with_wallet_provider(FakeWalletProvider::failing());
        app.post_json("/api/auth/login", json!({ "idToken": ALICE_TOKEN }))
            .await;

        let (status, body) = app
            .post_json("/api/wallets", json!({ "idToken": ALICE_TOKEN }))
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "WALLET_PROVISION_FAILED");
        assert_eq!(body["message"], "Wallet provider unavailable");
        assert!(!body.to_string().contains("upstream exploded"));
        assert_eq!(app.storage.wallet_count().await, 0);
    }
}

// =============================================================================
// Middleware
// =============================================================================

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let storage = Arc::new(InMemoryStorage::new());
    let app_state = AppState::new(
        storage.clone(),
        storage,
        Arc::new(FakeIdentity::new()),
        Arc::new(FakeWalletProvider::default()),
    );
    let router = api::app(app_state, "http://localhost:3000").unwrap();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/auth/login")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(router, request).await.unwrap();

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:3000"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_invalid_cors_origin_rejected() {
    let storage = Arc::new(InMemoryStorage::new());
    let app_state = AppState::new(
        storage.clone(),
        storage,
        Arc::new(FakeIdentity::new()),
        Arc::new(FakeWalletProvider::default()),
    );

    assert!(api::app(app_state, "http://bad\norigin").is_err());
}
