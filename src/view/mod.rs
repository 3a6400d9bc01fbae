//! The fetch-and-render contract shared by every content page.

pub mod controller;

pub use controller::{FetchController, Loader};

use crate::api::ApiError;

/// What a content page is currently showing. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
    Loading,
    Error { message: String, retryable: bool },
    NotFound,
    Ready(T),
}

impl<T> ViewState<T> {
    /// Map a terminated fetch attempt to the state it leads to.
    ///
    /// `failure_message` is shown for transient failures; the error itself is
    /// never shown.
    #[must_use]
    pub fn from_result(result: Result<T, ApiError>, failure_message: &str) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) if e.is_not_found() => Self::NotFound,
            Err(e) => Self::Error {
                message: e.user_message(failure_message),
                retryable: e.is_retryable(),
            },
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Error { retryable: true, .. })
    }

    #[must_use]
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }
}
