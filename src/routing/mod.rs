//! Site routing rules: rewrites, redirects, response headers and the remote
//! image allowlist.
//!
//! A built-in rule set ships with the crate; a TOML file can replace it.
//! Rules are evaluated in the same order a request meets them: headers are
//! computed from the requested path, then the first matching redirect wins,
//! then the first matching rewrite.

use std::path::Path;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum RoutesError {
    #[error("failed to read routes file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse routes file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid path pattern '{0}'")]
    InvalidPattern(String),
    #[error("invalid header '{key}: {value}'")]
    InvalidHeader { key: String, value: String },
}

/// Request path matcher.
///
/// - `/exact/path`
/// - `/prefix/*` matches everything under the prefix
/// - `*.(jpg|png)` matches any path ending in one of the extensions
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum PathPattern {
    Exact(String),
    Prefix(String),
    Extensions(Vec<String>),
}

impl TryFrom<String> for PathPattern {
    type Error = RoutesError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        PathPattern::parse(&raw)
    }
}

impl PathPattern {
    /// # Errors
    ///
    /// Returns an error if the pattern is empty or malformed.
    pub fn parse(raw: &str) -> Result<Self, RoutesError> {
        let invalid = || RoutesError::InvalidPattern(raw.to_string());

        if let Some(rest) = raw.strip_prefix("*.") {
            let list = rest
                .strip_prefix('(')
                .and_then(|r| r.strip_suffix(')'))
                .unwrap_or(rest);
            let extensions: Vec<String> = list
                .split('|')
                .map(|e| e.trim().to_ascii_lowercase())
                .collect();
            if extensions.iter().any(|e| e.is_empty() || e.contains(|c: char| c == '/' || c == '*')) {
                return Err(invalid());
            }
            return Ok(Self::Extensions(extensions));
        }

        if !raw.starts_with('/') {
            return Err(invalid());
        }
        if let Some(prefix) = raw.strip_suffix("/*") {
            return Ok(Self::Prefix(format!("{prefix}/")));
        }
        if raw.contains('*') {
            return Err(invalid());
        }
        Ok(Self::Exact(raw.to_string()))
    }

    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(p) => path == p,
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
            Self::Extensions(extensions) => path
                .rsplit_once('/')
                .map_or(path, |(_, last)| last)
                .rsplit_once('.')
                .is_some_and(|(_, ext)| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RewriteRule {
    pub source: PathPattern,
    pub destination: String,
    /// Only apply when the request's host matches.
    #[serde(default)]
    pub host: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RedirectRule {
    pub source: PathPattern,
    pub destination: String,
    #[serde(default)]
    pub permanent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HeaderPair {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HeaderRule {
    pub source: PathPattern,
    pub headers: Vec<HeaderPair>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImagePattern {
    pub protocol: String,
    pub hostname: String,
}

impl ImagePattern {
    #[must_use]
    pub fn matches(&self, url: &Url) -> bool {
        url.host_str().is_some_and(|host| {
            self.protocol.eq_ignore_ascii_case(url.scheme())
                && self.hostname.eq_ignore_ascii_case(host)
        })
    }
}

/// What to do with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Redirect { location: String, status: StatusCode },
    Rewrite(String),
    PassThrough,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SiteRoutes {
    #[serde(default)]
    pub rewrites: Vec<RewriteRule>,
    #[serde(default)]
    pub redirects: Vec<RedirectRule>,
    #[serde(default)]
    pub headers: Vec<HeaderRule>,
    #[serde(default)]
    pub images: Vec<ImagePattern>,
}

const IMMUTABLE: &str = "public, max-age=31536000, immutable";

impl SiteRoutes {
    /// The rule set the site ships with.
    #[must_use]
    pub fn builtin() -> Self {
        let pattern = |raw: &str| PathPattern::parse(raw).unwrap_or(PathPattern::Exact(raw.to_string()));
        let header = |key: &str, value: &str| HeaderPair {
            key: key.to_string(),
            value: value.to_string(),
        };
        let image = |protocol: &str, hostname: &str| ImagePattern {
            protocol: protocol.to_string(),
            hostname: hostname.to_string(),
        };

        Self {
            rewrites: vec![
                RewriteRule {
                    source: pattern("/sitemap.xml"),
                    destination: "/api/sitemap.xml".to_string(),
                    host: None,
                },
                RewriteRule {
                    source: pattern("/robots.txt"),
                    destination: "/api/robots.txt".to_string(),
                    host: None,
                },
                RewriteRule {
                    source: pattern("/"),
                    destination: "/dashboard".to_string(),
                    host: Some("dashboard.connectingdotserp.com".to_string()),
                },
            ],
            redirects: vec![RedirectRule {
                source: pattern("/hr-courses-training-institute-in-pune"),
                destination: "/hr-training-course-in-pune".to_string(),
                permanent: true,
            }],
            headers: vec![
                HeaderRule {
                    source: pattern("/_next/static/*"),
                    headers: vec![header("Cache-Control", IMMUTABLE)],
                },
                HeaderRule {
                    source: pattern("*.(jpg|jpeg|gif|png|svg|webp|avif|ico|css|js)"),
                    headers: vec![header("Cache-Control", IMMUTABLE)],
                },
                HeaderRule {
                    source: pattern("/site.webmanifest"),
                    headers: vec![
                        header("Content-Type", "application/manifest+json"),
                        header("Cache-Control", "public, max-age=86400"),
                    ],
                },
            ],
            images: vec![
                image("http", "blog-page-panel.onrender.com"),
                image("https", "imgur.com"),
                image("https", "i.imgur.com"),
                image("https", "images.unsplash.com"),
                image("https", "plus.unsplash.com"),
                image("https", "res.cloudinary.com"),
            ],
        }
    }

    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a rule is invalid.
    pub fn from_toml(raw: &str) -> Result<Self, RoutesError> {
        let routes: Self = toml::from_str(raw)?;
        routes.validate()?;
        Ok(routes)
    }

    /// Load rules from `path`, or the built-in set when no file is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: Option<&Path>) -> Result<Self, RoutesError> {
        let Some(path) = path else {
            return Ok(Self::builtin());
        };
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| RoutesError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_toml(&raw)
    }

    fn validate(&self) -> Result<(), RoutesError> {
        for pair in self.headers.iter().flat_map(|r| &r.headers) {
            if HeaderName::from_bytes(pair.key.as_bytes()).is_err()
                || HeaderValue::from_str(&pair.value).is_err()
            {
                return Err(RoutesError::InvalidHeader {
                    key: pair.key.clone(),
                    value: pair.value.clone(),
                });
            }
        }
        Ok(())
    }

    /// Decide what happens to `path` requested on `host`.
    #[must_use]
    pub fn resolve(&self, host: Option<&str>, path: &str) -> Resolution {
        if let Some(rule) = self.redirects.iter().find(|r| r.source.matches(path)) {
            let status = if rule.permanent {
                StatusCode::PERMANENT_REDIRECT
            } else {
                StatusCode::TEMPORARY_REDIRECT
            };
            return Resolution::Redirect {
                location: rule.destination.clone(),
                status,
            };
        }

        let host = host.map(strip_port);
        let rewrite = self.rewrites.iter().find(|r| {
            r.source.matches(path)
                && r.host
                    .as_deref()
                    .map_or(true, |want| host.is_some_and(|h| h.eq_ignore_ascii_case(want)))
        });
        match rewrite {
            Some(rule) => Resolution::Rewrite(rule.destination.clone()),
            None => Resolution::PassThrough,
        }
    }

    /// Response headers for `path`. Later rules override earlier ones for the
    /// same header name.
    #[must_use]
    pub fn headers_for(&self, path: &str) -> Vec<(HeaderName, HeaderValue)> {
        let mut out: Vec<(HeaderName, HeaderValue)> = Vec::new();
        for pair in self
            .headers
            .iter()
            .filter(|r| r.source.matches(path))
            .flat_map(|r| &r.headers)
        {
            let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(pair.key.as_bytes()),
                HeaderValue::from_str(&pair.value),
            ) else {
                continue;
            };
            out.retain(|(existing, _)| *existing != name);
            out.push((name, value));
        }
        out
    }

    /// Whether a remote image URL is on the allowlist.
    #[must_use]
    pub fn allows_image(&self, url: &str) -> bool {
        Url::parse(url).is_ok_and(|parsed| self.images.iter().any(|p| p.matches(&parsed)))
    }
}

fn strip_port(host: &str) -> &str {
    host.rsplit_once(':')
        .filter(|(_, port)| port.chars().all(|c| c.is_ascii_digit()))
        .map_or(host, |(name, _)| name)
}
