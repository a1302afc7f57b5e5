//! Service-account credentials

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default OAuth2 token endpoint for Google service accounts
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Firebase service-account fields, as found in the downloaded JSON key file
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub auth_uri: String,
    #[serde(default)]
    pub token_uri: String,
    #[serde(default)]
    pub auth_provider_x509_cert_url: String,
    #[serde(default)]
    pub client_x509_cert_url: String,
}

impl ServiceAccount {
    /// Private key PEM with escaped `\n` sequences turned into newlines.
    ///
    /// Keys pasted into environment variables usually arrive on one line.
    pub fn private_key_pem(&self) -> String {
        self.private_key.replace("\\n", "\n")
    }

    /// Token endpoint, falling back to Google's default
    pub fn token_uri(&self) -> &str {
        if self.token_uri.is_empty() {
            DEFAULT_TOKEN_URI
        } else {
            &self.token_uri
        }
    }

    /// Issuer expected in ID tokens for this project
    pub fn token_issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri())
            .finish_non_exhaustive()
    }
}
