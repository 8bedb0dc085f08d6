//! Placed canvas resources and their interchange form

use crate::config::ResourceConfig;
use crate::error::ModelError;
use crate::id::ResourceId;
use azcanvas_naming::ResourceKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canvas coordinate; no meaning to code generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create position
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// One placed infrastructure element
///
/// The resource-group relation is an optional id reference resolved when
/// read; deleting the group leaves the reference dangling rather than
/// removing the children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResourceRecord", into = "ResourceRecord")]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub config: ResourceConfig,
    pub position: Position,
    pub resource_group: Option<ResourceId>,
}

impl Resource {
    /// Create resource with a fresh id
    #[must_use]
    pub fn new(name: impl Into<String>, config: ResourceConfig) -> Self {
        Self {
            id: ResourceId::new(),
            name: name.into(),
            config,
            position: Position::default(),
            resource_group: None,
        }
    }

    /// Set canvas position
    #[inline]
    #[must_use]
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Set resource-group reference
    #[inline]
    #[must_use]
    pub fn in_group(mut self, group: ResourceId) -> Self {
        self.resource_group = Some(group);
        self
    }

    /// Known kind, `None` for pass-through types
    #[inline]
    #[must_use]
    pub fn kind(&self) -> Option<ResourceKind> {
        self.config.kind()
    }

    /// Type key as it appears on the wire
    #[inline]
    #[must_use]
    pub fn type_key(&self) -> &str {
        self.config.type_key()
    }

    /// Whether this resource is a resource group
    #[inline]
    #[must_use]
    pub fn is_resource_group(&self) -> bool {
        self.kind().is_some_and(|k| k.is_resource_group())
    }
}

/// Interchange shape of a resource
///
/// `{ id, type, name, config, position, resourceGroup? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub type_key: String,
    pub name: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
}

impl TryFrom<ResourceRecord> for Resource {
    type Error = ModelError;

    fn try_from(record: ResourceRecord) -> Result<Self, Self::Error> {
        let resource_group = record
            .resource_group
            .as_deref()
            .map(str::parse::<ResourceId>)
            .transpose()?;

        Ok(Self {
            id: record.id.parse()?,
            config: ResourceConfig::from_parts(&record.type_key, record.config)?,
            name: record.name,
            position: record.position,
            resource_group,
        })
    }
}

impl From<Resource> for ResourceRecord {
    fn from(resource: Resource) -> Self {
        Self {
            id: resource.id.to_string(),
            type_key: resource.type_key().to_string(),
            config: resource.config.to_value(),
            name: resource.name,
            position: resource.position,
            resource_group: resource.resource_group.map(|id| id.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn serializes_to_interchange_shape() {
        let group = ResourceId::new();
        let resource = Resource::new(
            "stprojdev01",
            ResourceConfig::from_parts("storage_account", json!({"location": "East US"})).unwrap(),
        )
        .at(Position::new(10.0, 20.0))
        .in_group(group);

        let value = serde_json::to_value(&resource).unwrap();
        assert_eq!(
            value,
            json!({
                "id": resource.id.to_string(),
                "type": "storage_account",
                "name": "stprojdev01",
                "config": {"location": "East US"},
                "position": {"x": 10.0, "y": 20.0},
                "resourceGroup": group.to_string(),
            })
        );
    }

    #[test]
    fn deserializes_from_interchange_shape() {
        let id = ResourceId::new();
        let json = json!({
            "id": id.to_string(),
            "type": "resource_group",
            "name": "app-rg",
            "config": {"location": "East US"},
            "position": {"x": 0.0, "y": 0.0}
        });

        let resource: Resource = serde_json::from_value(json).unwrap();
        assert_eq!(resource.id, id);
        assert!(resource.is_resource_group());
        assert_eq!(resource.config.location(), Some("East US"));
        assert_eq!(resource.resource_group, None);
    }

    #[test]
    fn malformed_group_reference_is_rejected() {
        let json = json!({
            "id": ResourceId::new().to_string(),
            "type": "subnet",
            "name": "snet-a",
            "resourceGroup": "app-rg"
        });
        assert!(serde_json::from_value::<Resource>(json).is_err());
    }

    #[test]
    fn unknown_type_round_trips() {
        let json = json!({
            "id": ResourceId::new().to_string(),
            "type": "cosmos_db",
            "name": "cosmos-1",
            "config": {"throughput": 400},
            "position": {"x": 1.0, "y": 2.0}
        });
        let resource: Resource = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(resource.kind(), None);
        assert_eq!(serde_json::to_value(&resource).unwrap(), json);
    }
}
