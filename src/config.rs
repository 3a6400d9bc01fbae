use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::constants::DEFAULT_BLOGS_LOGIN_TARGET;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("failed to parse {name} as boolean: {value}")]
    ParseBool { name: String, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Backends. Either may be absent; features that need a missing one
    // surface a configuration error instead of issuing requests.
    pub api_url: Option<String>,
    pub blog_api_url: Option<String>,

    // HTTP client
    pub http_timeout: Duration,

    // Admin session
    pub session_file: PathBuf,
    pub blogs_login_target: String,

    // Related articles
    pub related_failure_policy: RelatedFailurePolicy,

    // Health pings
    pub ping_enabled: bool,
    pub ping_interval: Duration,

    // Edge server
    pub web_host: String,
    pub web_port: u16,
    pub static_dir: PathBuf,
    pub site_url: String,
    pub routes_file: Option<PathBuf>,
}

/// What the reader sees when the related-articles fetch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelatedFailurePolicy {
    /// Log only; the related section is simply empty.
    #[default]
    Silent,
    /// Log and attach a short note to the page.
    Notice,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Backends
            api_url: optional_env("SITE_API_URL").map(trim_base_url),
            blog_api_url: optional_env("SITE_BLOG_API_URL").map(trim_base_url),

            // HTTP client
            http_timeout: Duration::from_secs(parse_env_u64("HTTP_TIMEOUT_SECS", 30)?),

            // Admin session
            session_file: PathBuf::from(env_or_default(
                "SESSION_FILE",
                "./data/admin-session.json",
            )),
            blogs_login_target: env_or_default("BLOGS_LOGIN_TARGET", DEFAULT_BLOGS_LOGIN_TARGET),

            // Related articles
            related_failure_policy: parse_related_policy(&env_or_default(
                "RELATED_FAILURE_POLICY",
                "silent",
            ))?,

            // Health pings
            ping_enabled: parse_env_bool("PING_ENABLED", true)?,
            ping_interval: Duration::from_secs(parse_env_u64("PING_INTERVAL_SECS", 300)?),

            // Edge server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 3000)?,
            static_dir: PathBuf::from(env_or_default("STATIC_DIR", "./public")),
            site_url: trim_base_url(env_or_default("SITE_URL", "http://localhost:3000")),
            routes_file: optional_env("ROUTES_FILE").map(PathBuf::from),
        })
    }

    /// Configuration with defaults and no backends, for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            api_url: None,
            blog_api_url: None,
            http_timeout: Duration::from_secs(5),
            session_file: PathBuf::from("./data/admin-session.json"),
            blogs_login_target: DEFAULT_BLOGS_LOGIN_TARGET.to_string(),
            related_failure_policy: RelatedFailurePolicy::Silent,
            ping_enabled: false,
            ping_interval: Duration::from_secs(300),
            web_host: "127.0.0.1".to_string(),
            web_port: 3000,
            static_dir: PathBuf::from("./public"),
            site_url: "http://localhost:3000".to_string(),
            routes_file: None,
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// Missing backend URLs are not an error here; they are reported by the
    /// feature that needs them.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.api_url {
            validate_url("SITE_API_URL", url)?;
        }
        if let Some(url) = &self.blog_api_url {
            validate_url("SITE_BLOG_API_URL", url)?;
        }
        validate_url("SITE_URL", &self.site_url)?;
        validate_url("BLOGS_LOGIN_TARGET", &self.blogs_login_target)?;
        if self.ping_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "PING_INTERVAL_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.http_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "HTTP_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn validate_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|e| ConfigError::InvalidValue {
        name: name.to_string(),
        message: format!("not a valid URL ({e})"),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            message: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(())
}

/// Base URLs are joined to absolute paths, so drop any trailing slash.
fn trim_base_url(value: String) -> String {
    value.trim_end_matches('/').to_string()
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_bool(name: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::ParseBool {
                name: name.to_string(),
                value: val,
            }),
        },
        _ => Ok(default),
    }
}

fn parse_related_policy(value: &str) -> Result<RelatedFailurePolicy, ConfigError> {
    match value.to_lowercase().as_str() {
        "silent" => Ok(RelatedFailurePolicy::Silent),
        "notice" => Ok(RelatedFailurePolicy::Notice),
        _ => Err(ConfigError::InvalidValue {
            name: "RELATED_FAILURE_POLICY".to_string(),
            message: format!("must be 'silent' or 'notice', got '{value}'"),
        }),
    }
}
