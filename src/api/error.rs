use reqwest::StatusCode;
use thiserror::Error;

use super::schema::DecodeError;

/// Every way a backend call can fail.
///
/// The `Display` output carries the technical cause and is meant for logs.
/// What a reader sees comes from [`ApiError::user_message`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// No base URL configured for the backend this feature needs.
    #[error("{name} is not configured")]
    NotConfigured { name: &'static str },

    #[error("invalid endpoint URL {url}: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: StatusCode },

    #[error("not found: {url}")]
    NotFound { url: String },

    #[error("authorization rejected by {url}")]
    Unauthorized { url: String },

    /// No stored session token, so no request was sent.
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: DecodeError,
    },
}

impl ApiError {
    /// Whether asking again could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Status { .. } | Self::Decode { .. }
        )
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Message safe to show to a site visitor. `fallback` is used for
    /// transient failures and names what failed to load.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::NotConfigured { .. } | Self::InvalidEndpoint { .. } => {
                "API URL is not configured.".to_string()
            }
            Self::NotFound { .. } => {
                "The article you're looking for doesn't exist or has been removed.".to_string()
            }
            Self::Unauthorized { .. } | Self::NotAuthenticated => {
                "Session expired. Please login again.".to_string()
            }
            Self::Transport { .. } | Self::Status { .. } | Self::Decode { .. } => {
                fallback.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let status = ApiError::Status {
            url: "https://x/api/blogs".to_string(),
            status: StatusCode::BAD_GATEWAY,
        };
        assert!(status.is_retryable());

        let decode = ApiError::Decode {
            url: "https://x/api/blogs".to_string(),
            source: DecodeError::ExpectedArray("blogs"),
        };
        assert!(decode.is_retryable());

        assert!(!ApiError::NotConfigured { name: "SITE_BLOG_API_URL" }.is_retryable());
        assert!(!ApiError::NotAuthenticated.is_retryable());
        assert!(!ApiError::NotFound {
            url: "https://x".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_user_message_hides_cause() {
        let err = ApiError::Decode {
            url: "https://x/api/blogs".to_string(),
            source: DecodeError::MissingField("title"),
        };
        let msg = err.user_message("Failed to load blogs. Please try again later.");
        assert_eq!(msg, "Failed to load blogs. Please try again later.");
        assert!(!msg.contains("title"));
    }
}
