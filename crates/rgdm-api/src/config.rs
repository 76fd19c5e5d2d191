//! # Service Configuration
//!
//! Environment-driven settings for the HTTP service. A `.env` file is loaded
//! by the binary before this runs.
//!
//! | Variable                     | Default                  |
//! |------------------------------|--------------------------|
//! | `PORT`                       | `3500`                   |
//! | `REDIS_URL`                  | `redis://127.0.0.1:6379` |
//! | `REDIS_KEY_PREFIX`           | empty                    |
//! | `WIDE_DOMAIN`                | unset (no CORS origin)   |
//! | `WEB_DOMAIN`                 | unset (no CORS origin)   |
//! | `SESSION_SECRET`             | required                 |
//! | `COOKIE_USE_SECURE`          | `false`                  |
//! | `COOKIE_SAME_SITE`           | `lax`                    |
//! | `COOKIE_EXPIRY_MILLISECONDS` | `3600000`                |
//! | `COOKIE_DOMAIN`              | `LOCAL` (host-only)      |
//! | `LOG_FORMAT`                 | text; `json` for JSON    |
//!
//! The verifier's own variables are read by
//! [`rgdm_verifier::VerifierConfig::from_env`].

use axum_extra::extract::cookie::SameSite;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3500;
/// Default Redis connection URL.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
/// Default session cookie lifetime.
pub const DEFAULT_COOKIE_EXPIRY_MS: u64 = 3_600_000;
/// `COOKIE_DOMAIN` value meaning "no Domain attribute".
const HOST_ONLY_DOMAIN: &str = "LOCAL";

/// Session signing secret. `Debug` output is redacted.
#[derive(Clone)]
pub struct SessionSecret(String);

impl SessionSecret {
    /// Wrap a secret string.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionSecret(***)")
    }
}

/// Session cookie attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    /// Send the cookie over HTTPS only.
    pub secure: bool,
    /// `SameSite` policy.
    pub same_site: SameSite,
    /// Lifetime of both the cookie and the stored session.
    pub max_age_ms: u64,
    /// `Domain` attribute; `None` for a host-only cookie.
    pub domain: Option<String>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: false,
            same_site: SameSite::Lax,
            max_age_ms: DEFAULT_COOKIE_EXPIRY_MS,
            domain: None,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Redis connection URL.
    pub redis_url: String,
    /// Prefix for every application key in the store.
    pub key_prefix: String,
    /// Allowed CORS origin for `/wide`.
    pub wide_domain: Option<String>,
    /// Allowed CORS origin for `/rgdm`.
    pub web_domain: Option<String>,
    /// Secret the session cookie is signed with.
    pub session_secret: SessionSecret,
    /// Session cookie attributes.
    pub cookie: CookieConfig,
    /// Emit logs as JSON lines.
    pub json_logs: bool,
}

impl AppConfig {
    /// Configuration for tests and local runs with the given session secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            port: DEFAULT_PORT,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            key_prefix: String::new(),
            wide_domain: None,
            web_domain: None,
            session_secret: SessionSecret::new(secret),
            cookie: CookieConfig::default(),
            json_logs: false,
        }
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret = get("SESSION_SECRET")
            .ok_or_else(|| ConfigError::Missing("SESSION_SECRET".to_string()))?;
        let mut config = Self::with_secret(secret);

        if let Some(raw) = get("PORT") {
            config.port = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT".to_string(), raw.clone()))?;
        }
        if let Some(url) = get("REDIS_URL") {
            config.redis_url = url;
        }
        if let Some(prefix) = lookup("REDIS_KEY_PREFIX") {
            config.key_prefix = prefix;
        }
        config.wide_domain = get("WIDE_DOMAIN");
        config.web_domain = get("WEB_DOMAIN");
        config.json_logs = get("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json"));

        config.cookie.secure = get("COOKIE_USE_SECURE").is_some_and(|v| v == "true");
        if let Some(raw) = get("COOKIE_SAME_SITE") {
            config.cookie.same_site = parse_same_site(&raw)?;
        }
        if let Some(raw) = get("COOKIE_EXPIRY_MILLISECONDS") {
            config.cookie.max_age_ms = raw.trim().parse().map_err(|_| {
                ConfigError::Invalid("COOKIE_EXPIRY_MILLISECONDS".to_string(), raw.clone())
            })?;
        }
        config.cookie.domain = get("COOKIE_DOMAIN").filter(|d| d != HOST_ONLY_DOMAIN);

        Ok(config)
    }
}

fn parse_same_site(raw: &str) -> Result<SameSite, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" => Ok(SameSite::None),
        _ => Err(ConfigError::Invalid(
            "COOKIE_SAME_SITE".to_string(),
            raw.to_string(),
        )),
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(String),

    #[error("invalid value for {0}: {1}")]
    Invalid(String, String),
}
