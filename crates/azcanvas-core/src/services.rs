//! Explicitly constructed service bundle
//!
//! One [`Services`] value is built at startup, initialized, shared by every
//! session through an `Arc`, and torn down at shutdown.

use crate::cache::DocumentCache;
use crate::config::CanvasConfig;
use crate::error::{CanvasError, Result};
use crate::store::{ConfigurationStore, InMemoryConfigurationStore};
use crate::token::{HttpTokenValidator, StaticTokenValidator, TokenValidator};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle of a [`Services`] bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Created,
    Running,
    Stopped,
}

/// Persistence, token validation and cache, wired together
pub struct Services {
    store: Arc<dyn ConfigurationStore>,
    tokens: Arc<dyn TokenValidator>,
    cache: DocumentCache,
    state: RwLock<ServiceState>,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("state", &*self.state.read())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl Services {
    /// Bundle explicit collaborators
    #[must_use]
    pub fn new(
        store: Arc<dyn ConfigurationStore>,
        tokens: Arc<dyn TokenValidator>,
        cache: DocumentCache,
    ) -> Self {
        Self {
            store,
            tokens,
            cache,
            state: RwLock::new(ServiceState::Created),
        }
    }

    /// In-memory store, the given validator and a default cache
    #[must_use]
    pub fn in_memory(tokens: Arc<dyn TokenValidator>) -> Self {
        Self::new(
            Arc::new(InMemoryConfigurationStore::new()),
            tokens,
            DocumentCache::default(),
        )
    }

    /// Collaborators described by `config`
    ///
    /// Uses the HTTP validator when `[tokens].endpoint` is set, otherwise a
    /// static allow-list.
    ///
    /// # Errors
    /// [`CanvasError::Token`] if the HTTP client cannot be built
    pub fn from_config(config: &CanvasConfig) -> Result<Self> {
        let tokens: Arc<dyn TokenValidator> = match &config.tokens.endpoint {
            Some(endpoint) => Arc::new(HttpTokenValidator::new(
                endpoint,
                Duration::from_secs(config.tokens.timeout_secs),
            )?),
            None => Arc::new(StaticTokenValidator::new(config.tokens.allow.iter().cloned())),
        };
        Ok(Self::new(
            Arc::new(InMemoryConfigurationStore::new()),
            tokens,
            DocumentCache::with_ttl(config.cache.capacity, config.cache.ttl()),
        ))
    }

    /// Mark running
    ///
    /// Idempotent while running. A stopped bundle cannot be restarted.
    ///
    /// # Errors
    /// [`CanvasError::ServicesNotRunning`] after teardown
    pub fn initialize(&self) -> Result<()> {
        let mut state = self.state.write();
        match *state {
            ServiceState::Stopped => Err(CanvasError::ServicesNotRunning),
            ServiceState::Running => Ok(()),
            ServiceState::Created => {
                *state = ServiceState::Running;
                tracing::info!("services initialized");
                Ok(())
            }
        }
    }

    /// Clear local state and stop
    pub fn teardown(&self) {
        let mut state = self.state.write();
        if *state != ServiceState::Stopped {
            self.cache.invalidate_all();
            *state = ServiceState::Stopped;
            tracing::info!("services torn down");
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> ServiceState {
        *self.state.read()
    }

    /// Error unless running
    ///
    /// # Errors
    /// [`CanvasError::ServicesNotRunning`]
    pub fn ensure_running(&self) -> Result<()> {
        if self.state() == ServiceState::Running {
            Ok(())
        } else {
            Err(CanvasError::ServicesNotRunning)
        }
    }

    /// Persistence collaborator
    ///
    /// # Errors
    /// [`CanvasError::ServicesNotRunning`]
    pub fn store(&self) -> Result<&dyn ConfigurationStore> {
        self.ensure_running()?;
        Ok(self.store.as_ref())
    }

    /// Token collaborator
    ///
    /// # Errors
    /// [`CanvasError::ServicesNotRunning`]
    pub fn tokens(&self) -> Result<&dyn TokenValidator> {
        self.ensure_running()?;
        Ok(self.tokens.as_ref())
    }

    /// Local cache
    ///
    /// # Errors
    /// [`CanvasError::ServicesNotRunning`]
    pub fn cache(&self) -> Result<&DocumentCache> {
        self.ensure_running()?;
        Ok(&self.cache)
    }
}
