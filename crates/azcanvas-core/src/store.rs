//! Configuration persistence collaborator

use crate::error::StoreError;
use async_trait::async_trait;
use azcanvas_model::{GlobalConfig, ResourceRecord};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// A configuration to create (`id: None`) or overwrite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub id: Option<String>,
    pub name: String,
    pub resources: Vec<ResourceRecord>,
    pub global: GlobalConfig,
    pub generated_code: Option<String>,
}

/// Identity and timestamps of a saved configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedConfiguration {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A configuration as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConfiguration {
    #[serde(flatten)]
    pub saved: SavedConfiguration,
    pub resources: Vec<ResourceRecord>,
    pub global: GlobalConfig,
    pub generated_code: Option<String>,
}

/// CRUD over named configurations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    /// Create or overwrite a configuration
    async fn save(&self, request: SaveRequest) -> Result<SavedConfiguration, StoreError>;

    /// Fetch one configuration
    async fn load(&self, id: &str) -> Result<StoredConfiguration, StoreError>;

    /// All configurations, most recently updated first
    async fn list(&self) -> Result<Vec<SavedConfiguration>, StoreError>;

    /// Delete one configuration
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct InMemoryConfigurationStore {
    entries: DashMap<String, StoredConfiguration>,
}

impl InMemoryConfigurationStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored configurations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ConfigurationStore for InMemoryConfigurationStore {
    async fn save(&self, request: SaveRequest) -> Result<SavedConfiguration, StoreError> {
        let now = Utc::now();
        let (id, created_at) = match request.id {
            Some(id) => {
                let existing = self
                    .entries
                    .get(&id)
                    .ok_or_else(|| StoreError::NotFound(id.clone()))?;
                let created_at = existing.saved.created_at;
                drop(existing);
                (id, created_at)
            }
            None => (uuid::Uuid::new_v4().to_string(), now),
        };

        let saved = SavedConfiguration {
            id: id.clone(),
            name: request.name,
            created_at,
            updated_at: now,
        };
        self.entries.insert(
            id,
            StoredConfiguration {
                saved: saved.clone(),
                resources: request.resources,
                global: request.global,
                generated_code: request.generated_code,
            },
        );
        tracing::debug!(id = %saved.id, name = %saved.name, "configuration saved");
        Ok(saved)
    }

    async fn load(&self, id: &str) -> Result<StoredConfiguration, StoreError> {
        self.entries
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list(&self) -> Result<Vec<SavedConfiguration>, StoreError> {
        let mut all: Vec<_> = self
            .entries
            .iter()
            .map(|entry| entry.saved.clone())
            .collect();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.entries
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(name: &str) -> SaveRequest {
        SaveRequest {
            id: None,
            name: name.to_string(),
            resources: Vec::new(),
            global: GlobalConfig::new(),
            generated_code: None,
        }
    }

    #[tokio::test]
    async fn save_assigns_ids_and_overwrite_keeps_created_at() {
        let store = InMemoryConfigurationStore::new();
        let first = store.save(request("web")).await.unwrap();
        let second = store.save(request("data")).await.unwrap();
        assert_ne!(first.id, second.id);

        let updated = store
            .save(SaveRequest {
                id: Some(first.id.clone()),
                generated_code: Some("# code".into()),
                ..request("web v2")
            })
            .await
            .unwrap();
        assert_eq!(updated.created_at, first.created_at);
        assert!(updated.updated_at >= first.updated_at);

        let loaded = store.load(&first.id).await.unwrap();
        assert_eq!(loaded.saved.name, "web v2");
        assert_eq!(loaded.generated_code.as_deref(), Some("# code"));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = InMemoryConfigurationStore::new();
        let missing = SaveRequest {
            id: Some("nope".into()),
            ..request("x")
        };
        assert_eq!(
            store.save(missing).await,
            Err(StoreError::NotFound("nope".into()))
        );
        assert!(matches!(store.load("nope").await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete("nope").await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_from_list() {
        let store = InMemoryConfigurationStore::new();
        let saved = store.save(request("web")).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
        store.delete(&saved.id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }
}
