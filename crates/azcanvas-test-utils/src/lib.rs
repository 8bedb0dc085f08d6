//! Testing utilities for the azcanvas workspace
//!
//! Shared fixtures and instrumented collaborators.

#![allow(missing_docs)]

use async_trait::async_trait;
use azcanvas_core::{
    CanvasConfig, ConfigurationStore, DesignSession, DocumentCache, InMemoryConfigurationStore,
    SaveRequest, SavedConfiguration, Services, StaticTokenValidator, StoreError,
    StoredConfiguration, TokenError, TokenValidator, TokenVerdict,
};
use azcanvas_model::{
    GlobalConfig, LandingZoneCatalog, Position, Resource, ResourceCollection, ResourceConfig,
    ResourceFactory,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const TEST_TOKEN: &str = "test-token";

pub fn resource_group(name: &str, location: &str) -> Resource {
    Resource::new(
        name,
        ResourceConfig::from_parts("resource_group", json!({ "location": location })).unwrap(),
    )
}

pub fn zone_canvas(zone: &str, global: &GlobalConfig) -> ResourceCollection {
    let mut canvas = ResourceCollection::new();
    let members = LandingZoneCatalog::builtin()
        .unwrap()
        .get(zone)
        .unwrap()
        .instantiate(&ResourceFactory::new(global), &canvas, Position::default())
        .unwrap();
    for member in members {
        canvas.insert(member);
    }
    canvas
}

pub fn module_config() -> CanvasConfig {
    CanvasConfig::from_toml_str(
        r#"
        [codegen.private_module]
        base = "git::https://example.com/azure-modules.git"
        reference = "v1.0.0"
        "#,
    )
    .unwrap()
}

pub fn running_services(
    store: Arc<dyn ConfigurationStore>,
    tokens: Arc<dyn TokenValidator>,
) -> Arc<Services> {
    let services = Services::new(store, tokens, DocumentCache::new(64));
    services.initialize().unwrap();
    Arc::new(services)
}

pub fn test_session(config: CanvasConfig) -> DesignSession {
    let services = running_services(
        Arc::new(InMemoryConfigurationStore::new()),
        Arc::new(StaticTokenValidator::new([TEST_TOKEN])),
    );
    DesignSession::new(services, config)
}

/// Token validator that counts calls
#[derive(Debug)]
pub struct CountingTokenValidator {
    inner: StaticTokenValidator,
    calls: AtomicUsize,
}

impl CountingTokenValidator {
    pub fn accepting(tokens: &[&str]) -> Self {
        Self {
            inner: StaticTokenValidator::new(tokens.iter().copied()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenValidator for CountingTokenValidator {
    async fn validate(&self, token: &str) -> Result<TokenVerdict, TokenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.validate(token).await
    }
}

/// Store that is unavailable for the first `outages` saves
#[derive(Debug)]
pub struct FlakyStore {
    inner: InMemoryConfigurationStore,
    outages: AtomicUsize,
}

impl FlakyStore {
    pub fn failing_first(outages: usize) -> Self {
        Self {
            inner: InMemoryConfigurationStore::new(),
            outages: AtomicUsize::new(outages),
        }
    }
}

#[async_trait]
impl ConfigurationStore for FlakyStore {
    async fn save(&self, request: SaveRequest) -> Result<SavedConfiguration, StoreError> {
        let remaining = self.outages.load(Ordering::SeqCst);
        if remaining > 0 {
            self.outages.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Unavailable("simulated outage".into()));
        }
        self.inner.save(request).await
    }

    async fn load(&self, id: &str) -> Result<StoredConfiguration, StoreError> {
        self.inner.load(id).await
    }

    async fn list(&self) -> Result<Vec<SavedConfiguration>, StoreError> {
        self.inner.list().await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.inner.delete(id).await
    }
}
