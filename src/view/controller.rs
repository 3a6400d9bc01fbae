use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use super::ViewState;
use crate::api::ApiError;

/// A page's data source: turns a dependency key (slug, category, ...) into
/// its view model.
#[async_trait]
pub trait Loader: Send + Sync + 'static {
    type Key: Clone + Debug + Send + Sync + 'static;
    type Output: Clone + Send + Sync + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Message shown when a fetch fails for a transient reason.
    fn failure_message(&self) -> &'static str {
        "Failed to load content. Please try again later."
    }

    async fn load(&self, key: &Self::Key) -> Result<Self::Output, ApiError>;
}

struct Inflight<K> {
    generation: u64,
    last_key: Option<K>,
}

/// Drives a [`Loader`] and publishes the resulting [`ViewState`].
///
/// Every call to [`FetchController::load`] or [`FetchController::retry`]
/// starts a new generation. A result is only applied if no newer generation
/// has started and the controller has not been torn down, so a slow response
/// for an old key can never overwrite a newer one.
pub struct FetchController<L: Loader> {
    loader: L,
    inflight: Mutex<Inflight<L::Key>>,
    state: watch::Sender<ViewState<L::Output>>,
    shutdown: CancellationToken,
}

impl<L: Loader> FetchController<L> {
    #[must_use]
    pub fn new(loader: L) -> Self {
        let (state, _) = watch::channel(ViewState::Loading);
        Self {
            loader,
            inflight: Mutex::new(Inflight {
                generation: 0,
                last_key: None,
            }),
            state,
            shutdown: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ViewState<L::Output> {
        self.state.borrow().clone()
    }

    /// Observe every state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ViewState<L::Output>> {
        self.state.subscribe()
    }

    /// Generation of the most recent load.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Fetch `key` and publish the outcome. Returns the state after this
    /// load settles, which is a newer load's state if this one went stale.
    pub async fn load(&self, key: L::Key) -> ViewState<L::Output> {
        if self.shutdown.is_cancelled() {
            debug!(loader = self.loader.name(), key = ?key, "Ignoring load after teardown");
            return self.state();
        }

        let generation = {
            let mut inflight = self.lock();
            inflight.generation += 1;
            inflight.last_key = Some(key.clone());
            self.state.send_replace(ViewState::Loading);
            inflight.generation
        };

        let result = tokio::select! {
            () = self.shutdown.cancelled() => {
                debug!(loader = self.loader.name(), key = ?key, "Load cancelled by teardown");
                return self.state();
            }
            result = self.loader.load(&key) => result,
        };

        if let Err(e) = &result {
            if !e.is_not_found() {
                error!(loader = self.loader.name(), key = ?key, error = %e, "Fetch failed");
            }
        }
        let next = ViewState::from_result(result, self.loader.failure_message());

        let inflight = self.lock();
        if inflight.generation != generation || self.shutdown.is_cancelled() {
            debug!(
                loader = self.loader.name(),
                key = ?key,
                generation,
                latest = inflight.generation,
                "Discarding stale result"
            );
            return self.state();
        }
        self.state.send_replace(next.clone());
        next
    }

    /// Re-run the last load. Returns the current state if nothing was loaded yet.
    pub async fn retry(&self) -> ViewState<L::Output> {
        let key = self.lock().last_key.clone();
        match key {
            Some(key) => {
                debug!(loader = self.loader.name(), key = ?key, "Retrying");
                self.load(key).await
            }
            None => self.state(),
        }
    }

    /// Stop applying results. Pending loads return without publishing.
    pub fn teardown(&self) {
        self.shutdown.cancel();
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn lock(&self) -> MutexGuard<'_, Inflight<L::Key>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
