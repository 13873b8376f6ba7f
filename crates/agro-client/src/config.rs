//! # Client Configuration
//!
//! Where the marketplace API lives and how to authenticate admin calls.
//! Values come from an optional TOML file, then environment variables
//! (a `.env` file is honoured) override whatever the file set.

use agro_core::{StoreError, StoreResult};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::Path;

/// Production backend used when nothing else is configured
pub const DEFAULT_API_URL: &str = "https://agrofix-backend-beta.vercel.app";

/// Request timeout used when nothing else is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Credentials sent as `username` / `password` headers on admin calls
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Marketplace API configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API base URL (overridable for testing/mocking)
    pub api_base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Required only for admin operations
    pub admin: Option<AdminCredentials>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            admin: None,
        }
    }
}

impl ClientConfig {
    /// Create config pointing at `api_base_url` with default timeout
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Recognised env vars (all optional):
    /// - `AGROFIX_API_URL`
    /// - `AGROFIX_TIMEOUT_SECS`
    /// - `AGROFIX_ADMIN_USERNAME` / `AGROFIX_ADMIN_PASSWORD`
    pub fn from_env() -> StoreResult<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a TOML document, filling unset keys with defaults
    pub fn from_toml_str(raw: &str) -> StoreResult<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| StoreError::Configuration(format!("invalid config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path` if it exists, then apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Self::from_env();
        }
        dotenvy::dotenv().ok();

        let raw = std::fs::read_to_string(path).map_err(|e| {
            StoreError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_toml_str(&raw)?;
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `AGROFIX_*` values supplied by `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> StoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("AGROFIX_API_URL") {
            self.api_base_url = url;
        }

        if let Some(raw) = lookup("AGROFIX_TIMEOUT_SECS") {
            self.timeout_secs = raw.trim().parse().map_err(|_| {
                StoreError::Configuration(format!(
                    "AGROFIX_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?;
        }

        match (lookup("AGROFIX_ADMIN_USERNAME"), lookup("AGROFIX_ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => {
                self.admin = Some(AdminCredentials { username, password });
            }
            (None, None) => {}
            _ => {
                return Err(StoreError::Configuration(
                    "AGROFIX_ADMIN_USERNAME and AGROFIX_ADMIN_PASSWORD must be set together"
                        .to_string(),
                ))
            }
        }

        self.validate()
    }

    fn validate(&self) -> StoreResult<()> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(StoreError::Configuration(format!(
                "API URL must start with http:// or https://, got '{}'",
                self.api_base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(StoreError::Configuration(
                "timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }

    /// Credentials for admin calls, or a configuration error
    pub fn admin_credentials(&self) -> StoreResult<&AdminCredentials> {
        self.admin.as_ref().ok_or_else(|| {
            StoreError::Configuration(
                "admin credentials not configured (set AGROFIX_ADMIN_USERNAME and AGROFIX_ADMIN_PASSWORD)"
                    .to_string(),
            )
        })
    }

    /// Absolute URL for an API path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }

    /// Builder: replace the API base URL, checking it like a loaded one
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> StoreResult<Self> {
        self.api_base_url = url.into();
        self.validate()?;
        Ok(self)
    }

    /// Builder: set admin credentials
    pub fn with_admin(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.admin = Some(AdminCredentials::new(username, password));
        self
    }
}
