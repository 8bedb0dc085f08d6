//! The canvas resource collection
//!
//! Owned by a single session and mutated only through it. Insertion order
//! is preserved because code generation emits resources in that order.

use crate::error::ModelError;
use crate::id::ResourceId;
use crate::resource::{Position, Resource, ResourceRecord};
use azcanvas_naming::ResourceKind;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Insertion-ordered set of placed resources
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceCollection {
    resources: IndexMap<ResourceId, Resource>,
}

impl ResourceCollection {
    /// Create empty collection
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from resources in order; later duplicates of an id replace earlier ones
    #[must_use]
    pub fn from_resources(resources: impl IntoIterator<Item = Resource>) -> Self {
        Self {
            resources: resources.into_iter().map(|r| (r.id, r)).collect(),
        }
    }

    /// Import interchange records
    ///
    /// Records whose `resourceGroup` holds a group *name* instead of an id
    /// are linked to the first resource group with exactly that name.
    /// Unmatched names leave the reference empty.
    ///
    /// # Errors
    /// Any record that fails to decode
    pub fn import_records(records: Vec<ResourceRecord>) -> Result<Self, ModelError> {
        let mut pending_names = Vec::new();
        let mut resources = Vec::with_capacity(records.len());

        for mut record in records {
            let is_legacy = record
                .resource_group
                .as_deref()
                .is_some_and(|raw| raw.parse::<ResourceId>().is_err());
            let legacy_name = if is_legacy {
                record.resource_group.take()
            } else {
                None
            };
            let resource = Resource::try_from(record)?;
            if let Some(name) = legacy_name {
                pending_names.push((resource.id, name));
            }
            resources.push(resource);
        }

        let mut collection = Self::from_resources(resources);
        for (id, group_name) in pending_names {
            let group = collection
                .resources
                .values()
                .find(|r| r.is_resource_group() && r.name == group_name)
                .map(|r| r.id);
            if group.is_none() {
                tracing::debug!(%id, %group_name, "legacy resource group name did not resolve");
            }
            if let Some(resource) = collection.resources.get_mut(&id) {
                resource.resource_group = group;
            }
        }

        Ok(collection)
    }

    /// Interchange records in order
    #[must_use]
    pub fn to_records(&self) -> Vec<ResourceRecord> {
        self.resources.values().cloned().map(Into::into).collect()
    }

    /// Append a resource, returning its id
    pub fn insert(&mut self, resource: Resource) -> ResourceId {
        let id = resource.id;
        self.resources.insert(id, resource);
        id
    }

    /// Get resource by id
    #[inline]
    #[must_use]
    pub fn get(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(&id)
    }

    /// Get mutable resource by id
    #[inline]
    pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut Resource> {
        self.resources.get_mut(&id)
    }

    /// Remove one resource, keeping the order of the rest
    ///
    /// Nothing cascades: children of a removed resource group keep their
    /// (now dangling) reference.
    ///
    /// # Errors
    /// [`ModelError::NotFound`] if the id is absent
    pub fn remove(&mut self, id: ResourceId) -> Result<Resource, ModelError> {
        self.resources
            .shift_remove(&id)
            .ok_or(ModelError::NotFound(id))
    }

    /// Rename a resource
    ///
    /// # Errors
    /// [`ModelError::NotFound`] if the id is absent
    pub fn rename(&mut self, id: ResourceId, name: impl Into<String>) -> Result<(), ModelError> {
        let resource = self.get_mut(id).ok_or(ModelError::NotFound(id))?;
        resource.name = name.into();
        Ok(())
    }

    /// Move a resource on the canvas
    ///
    /// # Errors
    /// [`ModelError::NotFound`] if the id is absent
    pub fn move_to(&mut self, id: ResourceId, position: Position) -> Result<(), ModelError> {
        let resource = self.get_mut(id).ok_or(ModelError::NotFound(id))?;
        resource.position = position;
        Ok(())
    }

    /// Point a resource at a resource group, or clear the reference
    ///
    /// # Errors
    /// [`ModelError::NotFound`] for either id, [`ModelError::NotAResourceGroup`]
    /// if `group` is some other kind
    pub fn assign_group(
        &mut self,
        id: ResourceId,
        group: Option<ResourceId>,
    ) -> Result<(), ModelError> {
        if let Some(group_id) = group {
            let target = self.get(group_id).ok_or(ModelError::NotFound(group_id))?;
            if !target.is_resource_group() {
                return Err(ModelError::NotAResourceGroup(group_id));
            }
        }
        let resource = self.get_mut(id).ok_or(ModelError::NotFound(id))?;
        resource.resource_group = group;
        Ok(())
    }

    /// Resolve a resource's group at read time
    ///
    /// Returns `None` when unset, dangling, or pointing at a non-group.
    #[must_use]
    pub fn resource_group_of(&self, id: ResourceId) -> Option<&Resource> {
        self.get(id)?
            .resource_group
            .and_then(|group| self.get(group))
            .filter(|group| group.is_resource_group())
    }

    /// Resources referencing `group`
    pub fn children_of(&self, group: ResourceId) -> impl Iterator<Item = &Resource> {
        self.resources
            .values()
            .filter(move |r| r.resource_group == Some(group))
    }

    /// Number of resources of one kind
    #[must_use]
    pub fn count_of(&self, kind: ResourceKind) -> usize {
        self.resources
            .values()
            .filter(|r| r.kind() == Some(kind))
            .count()
    }

    /// Number of resources with a raw type key
    #[must_use]
    pub fn count_of_key(&self, type_key: &str) -> usize {
        self.resources
            .values()
            .filter(|r| r.type_key() == type_key)
            .count()
    }

    /// Resources in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Resources ordered for generation
    ///
    /// Resource groups move to the front; everything else keeps its
    /// relative order. No dependency analysis is performed.
    #[must_use]
    pub fn ordered_for_generation(&self) -> Vec<Resource> {
        let (groups, rest): (Vec<_>, Vec<_>) = self
            .resources
            .values()
            .cloned()
            .partition(Resource::is_resource_group);
        groups.into_iter().chain(rest).collect()
    }

    /// Number of resources
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Serialize for ResourceCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.resources.values())
    }
}

impl<'de> Deserialize<'de> for ResourceCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let records = Vec::<ResourceRecord>::deserialize(deserializer)?;
        Self::import_records(records).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a ResourceCollection {
    type Item = &'a Resource;
    type IntoIter = indexmap::map::Values<'a, ResourceId, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn group(name: &str) -> Resource {
        Resource::new(name, ResourceConfig::default_for(ResourceKind::ResourceGroup))
    }

    fn storage(name: &str) -> Resource {
        Resource::new(name, ResourceConfig::default_for(ResourceKind::StorageAccount))
    }

    #[test]
    fn removing_group_does_not_cascade() {
        let mut collection = ResourceCollection::new();
        let rg = collection.insert(group("app-rg"));
        let st = collection.insert(storage("stappdev01").in_group(rg));
        let kv = collection.insert(
            Resource::new("kv-app", ResourceConfig::default_for(ResourceKind::KeyVault)).in_group(rg),
        );

        let before = collection.len();
        collection.remove(rg).unwrap();

        assert_eq!(collection.len(), before - 1);
        assert_eq!(collection.get(st).unwrap().resource_group, Some(rg));
        assert!(collection.resource_group_of(st).is_none());
        assert!(collection.get(kv).is_some());
    }

    #[test]
    fn remove_preserves_order() {
        let mut collection = ResourceCollection::new();
        let a = collection.insert(storage("a"));
        let b = collection.insert(storage("b"));
        let c = collection.insert(storage("c"));
        collection.remove(b).unwrap();
        let ids: Vec<_> = collection.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn remove_missing_is_not_found() {
        let mut collection = ResourceCollection::new();
        assert!(matches!(
            collection.remove(ResourceId::new()),
            Err(ModelError::NotFound(_))
        ));
    }

    #[test]
    fn assign_group_requires_a_group() {
        let mut collection = ResourceCollection::new();
        let st = collection.insert(storage("a"));
        let other = collection.insert(storage("b"));
        assert!(matches!(
            collection.assign_group(st, Some(other)),
            Err(ModelError::NotAResourceGroup(_))
        ));

        let rg = collection.insert(group("rg"));
        collection.assign_group(st, Some(rg)).unwrap();
        assert_eq!(collection.resource_group_of(st).map(|r| r.id), Some(rg));
        assert_eq!(collection.children_of(rg).count(), 1);
    }

    #[test]
    fn generation_order_puts_groups_first() {
        let mut collection = ResourceCollection::new();
        let st = collection.insert(storage("st"));
        let rg = collection.insert(group("rg"));
        let kv = collection.insert(Resource::new("kv", ResourceConfig::default_for(ResourceKind::KeyVault)));

        let ids: Vec<_> = collection.ordered_for_generation().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![rg, st, kv]);
    }

    #[test]
    fn legacy_group_names_resolve_exactly() {
        let rg_id = ResourceId::new();
        let records: Vec<ResourceRecord> = serde_json::from_value(json!([
            {"id": rg_id.to_string(), "type": "resource_group", "name": "app-rg"},
            {"id": ResourceId::new().to_string(), "type": "storage_account", "name": "st1", "resourceGroup": "app-rg"},
            {"id": ResourceId::new().to_string(), "type": "storage_account", "name": "st2", "resourceGroup": "app"}
        ]))
        .unwrap();

        let collection = ResourceCollection::import_records(records).unwrap();
        let groups: Vec<_> = collection.iter().map(|r| r.resource_group).collect();
        assert_eq!(groups, vec![None, Some(rg_id), None]);
    }

    #[test]
    fn serde_round_trip() {
        let mut collection = ResourceCollection::new();
        let rg = collection.insert(group("rg"));
        collection.insert(storage("st").in_group(rg));

        let json = serde_json::to_string(&collection).unwrap();
        let back: ResourceCollection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, collection);
    }

    #[test]
    fn counts_by_kind() {
        let mut collection = ResourceCollection::new();
        collection.insert(storage("a"));
        collection.insert(storage("b"));
        collection.insert(group("rg"));
        assert_eq!(collection.count_of(ResourceKind::StorageAccount), 2);
        assert_eq!(collection.count_of_key("resource_group"), 1);
        assert_eq!(collection.count_of_key("cosmos_db"), 0);
    }
}
