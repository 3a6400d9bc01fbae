use std::sync::{Mutex, PoisonError};

use tracing::info;

/// Where the session layer sends the user: an in-site path such as
/// `/AdminLogin`, or an absolute external URL.
pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: &str);
}

/// Reports navigations through the log. Used by the command line front end,
/// which has nowhere to go.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, destination: &str) {
        info!(destination = %destination, "Navigate");
    }
}

/// Remembers every navigation, in order.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.visited().pop()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, destination: &str) {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(destination.to_string());
    }
}
