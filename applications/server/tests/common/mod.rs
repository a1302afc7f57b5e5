//! Common test utilities and fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use betnad_core::{
    BetnadError, DecodedToken, IdentityProvider, ProviderUser, ProvisionedWallet, Result,
    SubjectId, TwitterIdentity, User, UserStore, WalletProvider,
};
use betnad_server::{api, state::AppState};
use betnad_storage::InMemoryStorage;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// Test fixtures
pub mod fixtures {
    pub const ALICE_UID: &str = "alice-uid";
    pub const ALICE_TOKEN: &str = "valid-token-alice";
    pub const ALICE_EMAIL: &str = "alice@example.com";

    pub const BOB_UID: &str = "bob-uid";
    pub const BOB_TOKEN: &str = "valid-token-bob";

    pub const EXPIRED_TOKEN: &str = "expired-token";
    /// Verifies, but the provider has no record for the subject
    pub const ORPHAN_TOKEN: &str = "valid-token-orphan";
}

/// Identity provider answering from fixed tables
#[derive(Default)]
pub struct FakeIdentity {
    tokens: HashMap<String, SubjectId>,
    records: Mutex<HashMap<SubjectId, ProviderUser>>,
    pub verify_calls: AtomicUsize,
    pub lookup_calls: AtomicUsize,
}

impl FakeIdentity {
    pub fn new() -> Self {
        use fixtures::*;

        let mut tokens = HashMap::new();
        tokens.insert(ALICE_TOKEN.to_string(), SubjectId::new(ALICE_UID));
        tokens.insert(BOB_TOKEN.to_string(), SubjectId::new(BOB_UID));
        tokens.insert(ORPHAN_TOKEN.to_string(), SubjectId::new("orphan-uid"));

        let mut records = HashMap::new();
        records.insert(SubjectId::new(ALICE_UID), alice_record());
        records.insert(
            SubjectId::new(BOB_UID),
            ProviderUser {
                uid: SubjectId::new(BOB_UID),
                email: None,
                display_name: None,
                photo_url: None,
                twitter: Some(TwitterIdentity {
                    id: "777".to_string(),
                    username: Some("bob_bets".to_string()),
                }),
                created_at: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
                last_sign_in_at: None,
            },
        );

        Self {
            tokens,
            records: Mutex::new(records),
            ..Default::default()
        }
    }

    /// Change the provider's record, as if the user edited their profile
    pub fn update_record(&self, record: ProviderUser) {
        self.records.lock().unwrap().insert(record.uid.clone(), record);
    }
}

pub fn alice_record() -> ProviderUser {
    ProviderUser {
        uid: SubjectId::new(fixtures::ALICE_UID),
        email: Some(fixtures::ALICE_EMAIL.to_string()),
        display_name: Some("Alice".to_string()),
        photo_url: Some("https://example.com/alice.png".to_string()),
        twitter: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        last_sign_in_at: Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn verify_id_token(&self, token: &str) -> Result<DecodedToken> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);

        let uid = self
            .tokens
            .get(token)
            .cloned()
            .ok_or_else(|| BetnadError::invalid_token(format!("unknown token {}", token)))?;

        let now = Utc::now();
        Ok(DecodedToken {
            uid,
            email: None,
            email_verified: Some(true),
            sign_in_provider: Some("password".to_string()),
            auth_time: Some(now),
            issued_at: now,
            expires_at: now + chrono::Duration::hours(1),
        })
    }

    async fn get_user(&self, uid: &SubjectId) -> Result<ProviderUser> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);

        self.records
            .lock()
            .unwrap()
            .get(uid)
            .cloned()
            .ok_or_else(|| BetnadError::user_not_found(uid.as_str()))
    }
}

/// Wallet provider handing out sequential wallets
#[derive(Default)]
pub struct FakeWalletProvider {
    pub created: AtomicUsize,
    /// Delay before answering, to widen race windows
    pub delay: Option<Duration>,
    pub fail: bool,
}

impl FakeWalletProvider {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl WalletProvider for FakeWalletProvider {
    async fn create_wallet(&self, chain_type: &str) -> Result<ProvisionedWallet> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(BetnadError::wallet_provider("privy returned 500: upstream exploded"));
        }

        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ProvisionedWallet {
            id: format!("privy-wallet-{}", n),
            address: format!("0x{:040x}", n),
            chain_type: chain_type.to_string(),
        })
    }
}

/// User store whose database is down
pub struct UnavailableStore;

#[async_trait]
impl UserStore for UnavailableStore {
    async fn find_by_subject_id(&self, _uid: &SubjectId) -> Result<Option<User>> {
        Err(BetnadError::storage("connection refused: mongodb://10.0.0.7:27017"))
    }

    async fn create_or_update(&self, _user: User) -> Result<User> {
        Err(BetnadError::storage("connection refused: mongodb://10.0.0.7:27017"))
    }

    async fn set_wallet_address(&self, _uid: &SubjectId, _address: &str) -> Result<Option<User>> {
        Err(BetnadError::storage("connection refused: mongodb://10.0.0.7:27017"))
    }

    async fn delete(&self, _uid: &SubjectId) -> Result<bool> {
        Err(BetnadError::storage("connection refused: mongodb://10.0.0.7:27017"))
    }
}

/// Router plus handles on its collaborators
pub struct TestApp {
    pub router: Router,
    pub storage: Arc<InMemoryStorage>,
    pub identity: Arc<FakeIdentity>,
    pub wallet_provider: Arc<FakeWalletProvider>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_wallet_provider(FakeWalletProvider::default())
    }

    pub fn with_wallet_provider(wallet_provider: FakeWalletProvider) -> Self {
        let storage = Arc::new(InMemoryStorage::new());
        let identity = Arc::new(FakeIdentity::new());
        let wallet_provider = Arc::new(wallet_provider);

        let app_state = AppState::new(
            storage.clone(),
            storage.clone(),
            identity.clone(),
            wallet_provider.clone(),
        );

        Self {
            router: api::router(app_state),
            storage,
            identity,
            wallet_provider,
        }
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        send(&self.router, post_request(uri, &body.to_string())).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(&self.router, request).await
    }
}

/// Router whose user store always fails
pub fn unavailable_store_app() -> Router {
    let storage = Arc::new(InMemoryStorage::new());
    let app_state = AppState::new(
        Arc::new(UnavailableStore),
        storage,
        Arc::new(FakeIdentity::new()),
        Arc::new(FakeWalletProvider::default()),
    );
    api::router(app_state)
}

pub fn post_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
