/// User domain type
use super::SubjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User account, keyed by the identity provider's subject id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identity-provider subject id (unique)
    pub uid: SubjectId,

    /// Email address, empty when the provider has none
    pub email: String,

    pub display_name: Option<String>,

    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,

    /// On-chain address of the custody wallet, once provisioned
    pub wallet_address: Option<String>,

    // Twitter linkage
    pub twitter_id: Option<String>,
    pub twitter_username: Option<String>,
    pub twitter_access_token: Option<String>,
    pub twitter_refresh_token: Option<String>,
    pub twitter_token_expires_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a user with only the required fields set
    pub fn new(uid: SubjectId, email: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            uid,
            email: email.into(),
            display_name: None,
            photo_url: None,
            wallet_address: None,
            twitter_id: None,
            twitter_username: None,
            twitter_access_token: None,
            twitter_refresh_token: None,
            twitter_token_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
