/// Authentication service - ID-token login and verification
use betnad_core::{IdentityProvider, Result, User, UserStore};
use betnad_identity::map_to_user;
use std::sync::Arc;
use tracing::{debug, info};

/// Verifies identity-provider tokens and keeps the local user record in sync
pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserStore>,
}

impl AuthService {
    pub fn new(identity: Arc<dyn IdentityProvider>, users: Arc<dyn UserStore>) -> Self {
        Self { identity, users }
    }

    /// Log a user in.
    ///
    /// Verifies the token, fetches the provider's record and upserts the local
    /// user. Nothing is written unless the token verifies.
    pub async fn login(&self, id_token: &str) -> Result<User> {
        let decoded = self.identity.verify_id_token(id_token).await?;
        debug!(uid = %decoded.uid, "ID token accepted");

        let record = self.identity.get_user(&decoded.uid).await?;
        let user = self.users.create_or_update(map_to_user(&record)).await?;

        info!(uid = %user.uid, "User logged in");
        Ok(user)
    }

    /// Verify a token and look up its subject without writing anything.
    ///
    /// Returns `None` when the token is valid but the user never logged in.
    pub async fn verify(&self, id_token: &str) -> Result<Option<User>> {
        let decoded = self.identity.verify_id_token(id_token).await?;
        let user = self.users.find_by_subject_id(&decoded.uid).await?;

        debug!(uid = %decoded.uid, known = user.is_some(), "Token verified");
        Ok(user)
    }
}
