/// Server configuration
use crate::error::{Result, ServerError};
use betnad_identity::ServiceAccount;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Prefix of the environment variables read by `load`
pub const ENV_PREFIX: &str = "BETNAD";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub mongodb: MongoSettings,

    #[serde(default)]
    pub firebase: FirebaseSettings,

    #[serde(default)]
    pub privy: PrivySettings,

    /// Twitter bot credentials; not needed by the HTTP API
    #[serde(default)]
    pub twitter: Option<TwitterSettings>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    #[serde(default)]
    pub environment: Environment,
}

#[derive(Clone, Deserialize)]
pub struct MongoSettings {
    #[serde(default)]
    pub uri: String,

    #[serde(default = "default_database")]
    pub database: String,
}

#[derive(Clone, Default, Deserialize)]
pub struct FirebaseSettings {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: String,
    #[serde(default)]
    pub private_key: String,
    #[serde(default)]
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

#[derive(Clone, Default, Deserialize)]
pub struct PrivySettings {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub app_secret: String,
}

#[derive(Clone, Default, Deserialize)]
pub struct TwitterSettings {
    #[serde(default)]
    pub app_key: String,
    #[serde(default)]
    pub app_secret: String,
    #[serde(default)]
    pub user_access_token: String,
    #[serde(default)]
    pub user_access_secret: String,
    #[serde(default)]
    pub bot_user_id: String,
}

impl FirebaseSettings {
    pub fn service_account(&self) -> ServiceAccount {
        ServiceAccount {
            project_id: self.project_id.clone(),
            private_key_id: self.private_key_id.clone(),
            private_key: self.private_key.clone(),
            client_email: self.client_email.clone(),
            client_id: self.client_id.clone(),
            auth_uri: self.auth_uri.clone(),
            token_uri: self.token_uri.clone(),
            auth_provider_x509_cert_url: self.auth_provider_x509_cert_url.clone(),
            client_x509_cert_url: self.client_x509_cert_url.clone(),
        }
    }
}

// Secrets never reach Debug output unmasked
impl fmt::Debug for FirebaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebaseSettings")
            .field("project_id", &self.project_id)
            .field("private_key_id", &mask_secret(&self.private_key_id))
            .field("private_key", &mask_secret(&self.private_key))
            .field("client_email", &self.client_email)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for MongoSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MongoSettings")
            .field("uri", &mask_secret(&self.uri))
            .field("database", &self.database)
            .finish()
    }
}

impl fmt::Debug for PrivySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivySettings")
            .field("app_id", &self.app_id)
            .field("app_secret", &mask_secret(&self.app_secret))
            .finish()
    }
}

impl fmt::Debug for TwitterSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwitterSettings")
            .field("app_key", &mask_secret(&self.app_key))
            .field("app_secret", &mask_secret(&self.app_secret))
            .field("user_access_token", &mask_secret(&self.user_access_token))
            .field("user_access_secret", &mask_secret(&self.user_access_secret))
            .field("bot_user_id", &self.bot_user_id)
            .finish()
    }
}

/// Mask a secret for diagnostics.
///
/// Values of 8 characters or fewer are fully masked; longer ones keep their
/// first and last 4 characters.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 8), tail)
}

impl ServerConfig {
    /// Load configuration from file and environment.
    ///
    /// `path` must exist when given; otherwise `config.toml` in the working
    /// directory is used if present. Environment variables override both.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from("config.toml");
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // BETNAD_MONGODB__URI -> mongodb.uri
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        Self::build(settings)
    }

    /// Parse configuration from a TOML document
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml));
        Self::build(settings)
    }

    fn build(
        settings: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Environment variable names of required settings that are empty
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let required = [
            (&self.mongodb.uri, "BETNAD_MONGODB__URI"),
            (&self.firebase.project_id, "BETNAD_FIREBASE__PROJECT_ID"),
            (&self.firebase.client_email, "BETNAD_FIREBASE__CLIENT_EMAIL"),
            (&self.firebase.private_key, "BETNAD_FIREBASE__PRIVATE_KEY"),
            (&self.privy.app_id, "BETNAD_PRIVY__APP_ID"),
            (&self.privy.app_secret, "BETNAD_PRIVY__APP_SECRET"),
        ];

        required
            .into_iter()
            .filter(|(value, _)| value.trim().is_empty())
            .map(|(_, name)| name)
            .collect()
    }

    /// Validate configuration, reporting every missing setting at once
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_settings();
        if !missing.is_empty() {
            return Err(ServerError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        if self.server.port == 0 {
            return Err(ServerError::Config("server port must not be 0".to_string()));
        }

        Ok(())
    }

    /// Default tracing filter for the configured environment
    pub fn default_log_filter(&self) -> &'static str {
        match self.server.environment {
            Environment::Development => "betnad_server=debug,betnad_identity=debug,tower_http=debug",
            Environment::Production | Environment::Test => "betnad_server=info,tower_http=info",
        }
    }

    /// Log the effective configuration with secrets masked
    pub fn log_summary(&self) {
        tracing::info!(
            environment = %self.server.environment,
            host = %self.server.host,
            port = self.server.port,
            cors_origin = %self.server.cors_origin,
            "Server settings"
        );
        tracing::info!(
            uri = %mask_secret(&self.mongodb.uri),
            database = %self.mongodb.database,
            "MongoDB settings"
        );
        tracing::info!(
            project_id = %self.firebase.project_id,
            client_email = %self.firebase.client_email,
            private_key = %mask_secret(&self.firebase.private_key),
            "Firebase settings"
        );
        tracing::info!(
            app_id = %self.privy.app_id,
            app_secret = %mask_secret(&self.privy.app_secret),
            "Privy settings"
        );
        match &self.twitter {
            Some(twitter) => tracing::info!(
                app_key = %mask_secret(&twitter.app_key),
                user_access_token = %mask_secret(&twitter.user_access_token),
                bot_user_id = %twitter.bot_user_id,
                "Twitter settings"
            ),
            None => tracing::debug!("Twitter settings not configured"),
        }
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_database() -> String {
    "betnad".to_string()
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            environment: Environment::default(),
        }
    }
}

impl Default for MongoSettings {
    fn default() -> Self {
        Self {
            uri: String::new(),
            database: default_database(),
        }
    }
}
