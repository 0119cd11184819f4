//! Shared application state for route handlers.

use std::sync::Arc;

use crate::compositor::Compositor;
use crate::config::Config;
use crate::services::{AssetStore, CleanupQueue, TokenService};
use crate::store::Store;

/// Cheap-to-clone handle to everything handlers need.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Inner {
    config: Config,
    store: Arc<dyn Store>,
    tokens: TokenService,
    assets: AssetStore,
    compositor: Compositor,
    cleanup: CleanupQueue,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: Config,
        store: Arc<dyn Store>,
        tokens: TokenService,
        assets: AssetStore,
        cleanup: CleanupQueue,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                store,
                tokens,
                assets,
                compositor: Compositor::new(),
                cleanup,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Owned handle to the store, for spawned tasks.
    #[must_use]
    pub fn store_arc(&self) -> Arc<dyn Store> {
        Arc::clone(&self.inner.store)
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    #[must_use]
    pub fn assets(&self) -> &AssetStore {
        &self.inner.assets
    }

    #[must_use]
    pub fn compositor(&self) -> Compositor {
        self.inner.compositor
    }

    #[must_use]
    pub fn cleanup(&self) -> &CleanupQueue {
        &self.inner.cleanup
    }
}
