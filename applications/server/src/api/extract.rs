/// Request body extraction with validation
use crate::error::ServerError;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

/// Field checks run after a body has been deserialized
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// JSON body that deserialized and passed `Validate`.
///
/// Rejections become `ServerError::Validation`, so a bad body is answered
/// with 400 before the handler runs.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ServerError::Validation(rejection.body_text()))?;

        value.validate().map_err(ServerError::Validation)?;
        Ok(Self(value))
    }
}

/// Check shared by every body that carries an ID token
pub fn require_id_token(id_token: &str) -> Result<(), String> {
    if id_token.is_empty() {
        return Err("ID token is required".to_string());
    }
    Ok(())
}
