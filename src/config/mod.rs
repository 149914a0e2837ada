//! Credentials and environment-driven configuration.

use crate::error::{AppError, AppResult};

/// Default service endpoint when no custom domain is configured.
pub const DEFAULT_DOMAIN: &str = "https://app.socketbus.com";

/// Application credentials, immutable once built.
#[derive(Clone)]
pub struct Credentials {
    app_id: String,
    secret: String,
    custom_encryption_key: Option<String>,
    custom_domain: Option<String>,
}

impl Credentials {
    /// Build credentials. `app_id` and `secret` must be non-empty.
    pub fn new(app_id: impl Into<String>, secret: impl Into<String>) -> AppResult<Self> {
        let app_id = app_id.into();
        let secret = secret.into();
        if app_id.trim().is_empty() {
            return Err(AppError::Config("app_id is required".to_string()));
        }
        if secret.trim().is_empty() {
            return Err(AppError::Config("secret is required".to_string()));
        }
        Ok(Self {
            app_id,
            secret,
            custom_encryption_key: None,
            custom_domain: None,
        })
    }

    /// Enable end-to-end encryption. An empty key leaves it disabled.
    pub fn with_encryption_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.custom_encryption_key = (!key.is_empty()).then_some(key);
        self
    }

    /// Point the client at another deployment of the service.
    pub fn with_custom_domain(mut self, domain: impl Into<String>) -> Self {
        let domain = domain.into();
        self.custom_domain = (!domain.trim().is_empty()).then_some(domain);
        self
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }

    pub fn encryption_key(&self) -> Option<&str> {
        self.custom_encryption_key.as_deref()
    }

    pub fn encryption_enabled(&self) -> bool {
        self.custom_encryption_key.is_some()
    }

    /// Base URL for REST calls, without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.custom_domain
            .as_deref()
            .unwrap_or(DEFAULT_DOMAIN)
            .trim_end_matches('/')
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("secret", &"<redacted>")
            .field("encryption", &self.encryption_enabled())
            .field("custom_domain", &self.custom_domain)
            .finish()
    }
}

/// Configuration for the command-line tool, loaded from `.env` and environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Application id issued by the service (`SOCKETBUS_APP_ID`).
    pub app_id: String,
    /// Application secret (`SOCKETBUS_SECRET`).
    pub secret: String,
    /// Optional end-to-end encryption key (`SOCKETBUS_ENCRYPTION_KEY`).
    pub encryption_key: Option<String>,
    /// Optional base URL override (`SOCKETBUS_DOMAIN`).
    pub domain: Option<String>,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let app_id =
            std::env::var("SOCKETBUS_APP_ID").map_err(|_| ConfigLoadError::Missing("SOCKETBUS_APP_ID"))?;
        let secret =
            std::env::var("SOCKETBUS_SECRET").map_err(|_| ConfigLoadError::Missing("SOCKETBUS_SECRET"))?;
        let encryption_key = std::env::var("SOCKETBUS_ENCRYPTION_KEY").ok();
        let domain = std::env::var("SOCKETBUS_DOMAIN").ok();
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            app_id,
            secret,
            encryption_key,
            domain,
            log_level,
        })
    }

    /// Validated credentials for the SDK.
    pub fn credentials(&self) -> AppResult<Credentials> {
        let mut credentials = Credentials::new(self.app_id.clone(), self.secret.clone())?;
        if let Some(key) = &self.encryption_key {
            credentials = credentials.with_encryption_key(key.clone());
        }
        if let Some(domain) = &self.domain {
            credentials = credentials.with_custom_domain(domain.clone());
        }
        Ok(credentials)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("{0} is not set")]
    Missing(&'static str),
}
