/// API route modules
pub mod auth;
pub mod extract;
pub mod health;
pub mod wallets;

use crate::error::{Result, ServerError};
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// All routes, without middleware
pub fn router(app_state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/verify-token", post(auth::verify_token))
        .route("/health", get(health::health));

    Router::new()
        .route("/", get(health::root))
        .nest("/api/auth", auth_routes)
        .route("/api/wallets", post(wallets::provision_wallet))
        .with_state(app_state)
}

/// Routes with request tracing and CORS for a single allowed origin
pub fn app(app_state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = HeaderValue::from_str(cors_origin)
        .map_err(|e| ServerError::Config(format!("invalid CORS origin {:?}: {}", cors_origin, e)))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Ok(router(app_state)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .layer(cors))
}
