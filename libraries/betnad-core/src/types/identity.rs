/// Identity-provider shapes: verified token claims and provider user records
use super::SubjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims of a verified ID token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedToken {
    pub uid: SubjectId,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    /// Provider used for the sign-in (`password`, `twitter.com`, ...)
    pub sign_in_provider: Option<String>,
    pub auth_time: Option<DateTime<Utc>>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Linked Twitter account on the provider record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitterIdentity {
    pub id: String,
    pub username: Option<String>,
}

/// User record as held by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub uid: SubjectId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub twitter: Option<TwitterIdentity>,
    pub created_at: DateTime<Utc>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
}
