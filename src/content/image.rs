use std::sync::Arc;

use tracing::warn;

use super::ImageRef;
use crate::routing::{ImagePattern, SiteRoutes};

/// Turns [`ImageRef`]s into URLs a page may display.
///
/// Relative paths are served by the blog backend and resolve against its base
/// URL. Absolute URLs must match one of the remote patterns; anything else is
/// dropped.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    base_url: Option<String>,
    remote: Arc<[ImagePattern]>,
}

impl ImageResolver {
    #[must_use]
    pub fn new(base_url: Option<&str>, remote: Vec<ImagePattern>) -> Self {
        Self {
            base_url: base_url.map(ToString::to_string),
            remote: remote.into(),
        }
    }

    /// Resolver using the built-in remote patterns.
    #[must_use]
    pub fn builtin(base_url: Option<&str>) -> Self {
        Self::new(base_url, SiteRoutes::builtin().images)
    }

    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    #[must_use]
    pub fn resolve(&self, image: &ImageRef) -> Option<String> {
        match image {
            ImageRef::Relative(_) => image.resolve(self.base_url.as_deref()),
            ImageRef::Absolute(url) if self.remote.iter().any(|p| p.matches(url)) => {
                Some(url.to_string())
            }
            ImageRef::Absolute(url) => {
                warn!(url = %url, "Dropping image from a host outside the allowlist");
                None
            }
        }
    }
}
