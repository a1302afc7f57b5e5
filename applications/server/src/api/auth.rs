/// Authentication API routes
use crate::api::extract::{require_id_token, Validate, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use betnad_core::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub id_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenRequest {
    pub id_token: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        require_id_token(&self.id_token)
    }
}

impl Validate for VerifyTokenRequest {
    fn validate(&self) -> Result<(), String> {
        require_id_token(&self.id_token)
    }
}

/// User as returned to clients. OAuth tokens are never included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub uid: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            uid: user.uid.into_inner(),
            email: user.email,
            display_name: user.display_name,
            photo_url: user.photo_url,
            wallet_address: user.wallet_address,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: UserResponse,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
    pub message: String,
}

/// POST /api/auth/login
pub async fn login(
    State(app_state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> impl IntoResponse {
    match app_state.auth_service.login(&req.id_token).await {
        Ok(user) => (
            StatusCode::OK,
            Json(LoginResponse {
                success: true,
                user: user.into(),
                message: "Login successful",
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    success: false,
                    error: "LOGIN_FAILED",
                    message: e.client_message().to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /api/auth/verify-token
///
/// Always answers 200 once the body is valid; `valid` carries the outcome.
pub async fn verify_token(
    State(app_state): State<AppState>,
    ValidatedJson(req): ValidatedJson<VerifyTokenRequest>,
) -> Json<VerifyTokenResponse> {
    let response = match app_state.auth_service.verify(&req.id_token).await {
        Ok(Some(user)) => VerifyTokenResponse {
            valid: true,
            user: Some(user.into()),
            message: "Token is valid".to_string(),
        },
        Ok(None) => VerifyTokenResponse {
            valid: false,
            user: None,
            message: "User not found in database".to_string(),
        },
        Err(e) => {
            tracing::warn!(error = %e, "Token verification failed");
            VerifyTokenResponse {
                valid: false,
                user: None,
                message: e.client_message().to_string(),
            }
        }
    };

    Json(response)
}
