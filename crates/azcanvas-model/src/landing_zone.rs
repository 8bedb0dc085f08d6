//! Landing zones: predefined resource bundles
//!
//! The catalog is declared in `landing_zones.yaml`, compiled into the crate
//! and parsed on first use.

use crate::collection::ResourceCollection;
use crate::error::ModelError;
use crate::factory::ResourceFactory;
use crate::resource::{Position, Resource};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

const BUILTIN_YAML: &str = include_str!("landing_zones.yaml");

static BUILTIN: Lazy<Result<LandingZoneCatalog, String>> =
    Lazy::new(|| LandingZoneCatalog::from_yaml(BUILTIN_YAML).map_err(|e| e.to_string()));

/// Columns in the placement grid
pub const GRID_COLUMNS: usize = 4;
/// Horizontal spacing between placed members
pub const GRID_SPACING_X: f64 = 220.0;
/// Vertical spacing between placed members
pub const GRID_SPACING_Y: f64 = 140.0;

/// One resource inside a landing zone
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ZoneMember {
    /// Key unique within the zone, used by `links`
    pub key: String,
    /// Resource type key
    #[serde(rename = "type")]
    pub type_key: String,
    /// Field overrides by interchange key
    #[serde(default)]
    pub config: Map<String, Value>,
    /// Fields filled with another member's generated name
    #[serde(default)]
    pub links: IndexMap<String, String>,
}

/// A predefined bundle of resources
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LandingZone {
    /// Stable identifier, e.g. `basic-web`
    pub id: String,
    /// Display name
    pub name: String,
    /// One-line description
    #[serde(default)]
    pub description: String,
    /// Members in creation order
    pub members: Vec<ZoneMember>,
}

impl LandingZone {
    /// Create every member, ready to be inserted into `existing`
    ///
    /// Members get suggested names with ordinals continuing from what is
    /// already on the canvas. Every non-group member is linked to the first
    /// resource group of the zone. Positions fill a grid from `origin`.
    ///
    /// # Errors
    /// [`ModelError::InvalidConfig`] or [`ModelError::UnknownFields`] if a
    /// member override does not fit its kind
    pub fn instantiate(
        &self,
        factory: &ResourceFactory<'_>,
        existing: &ResourceCollection,
        origin: Position,
    ) -> Result<Vec<Resource>, ModelError> {
        let mut created: Vec<Resource> = Vec::with_capacity(self.members.len());
        let mut names: HashMap<&str, String> = HashMap::new();
        let mut per_type: HashMap<&str, usize> = HashMap::new();

        for (index, member) in self.members.iter().enumerate() {
            let seen = per_type.entry(member.type_key.as_str()).or_default();
            *seen += 1;
            let ordinal = existing.count_of_key(&member.type_key) + *seen;
            let ordinal = u32::try_from(ordinal).unwrap_or(u32::MAX);

            let mut resource =
                factory.create_nth(&member.type_key, ordinal, grid_position(origin, index));
            for (field, value) in &member.config {
                resource.config = resource.config.with_field(field, value.clone())?;
            }
            for (field, target) in &member.links {
                let linked = names.get(target.as_str()).ok_or_else(|| {
                    ModelError::LandingZoneDefinition(format!(
                        "{}: member '{}' links to unknown member '{target}'",
                        self.id, member.key
                    ))
                })?;
                resource.config = resource
                    .config
                    .with_field(field, Value::String(linked.clone()))?;
            }

            names.insert(member.key.as_str(), resource.name.clone());
            created.push(resource);
        }

        if let Some(group) = created.iter().find(|r| r.is_resource_group()).map(|r| r.id) {
            for resource in created.iter_mut().filter(|r| !r.is_resource_group()) {
                resource.resource_group = Some(group);
            }
        }

        tracing::debug!(zone = %self.id, members = created.len(), "instantiated landing zone");
        Ok(created)
    }
}

fn grid_position(origin: Position, index: usize) -> Position {
    let column = (index % GRID_COLUMNS) as f64;
    let row = (index / GRID_COLUMNS) as f64;
    Position::new(
        origin.x + column * GRID_SPACING_X,
        origin.y + row * GRID_SPACING_Y,
    )
}

/// Set of landing zones keyed by id
#[derive(Debug, Clone, PartialEq)]
pub struct LandingZoneCatalog {
    zones: IndexMap<String, LandingZone>,
}

impl LandingZoneCatalog {
    /// The built-in catalog
    ///
    /// # Errors
    /// [`ModelError::LandingZoneDefinition`] if the embedded YAML is malformed
    pub fn builtin() -> Result<&'static Self, ModelError> {
        BUILTIN
            .as_ref()
            .map_err(|reason| ModelError::LandingZoneDefinition(reason.clone()))
    }

    /// Parse a catalog from YAML
    ///
    /// # Errors
    /// [`ModelError::LandingZoneDefinition`] on parse failure, duplicate ids
    /// or member keys, and links that point backwards to nothing
    pub fn from_yaml(yaml: &str) -> Result<Self, ModelError> {
        let zones: Vec<LandingZone> = serde_yaml::from_str(yaml)
            .map_err(|e| ModelError::LandingZoneDefinition(e.to_string()))?;

        let mut catalog = IndexMap::with_capacity(zones.len());
        for zone in zones {
            check_zone(&zone)?;
            if catalog.contains_key(&zone.id) {
                return Err(ModelError::LandingZoneDefinition(format!(
                    "duplicate landing zone '{}'",
                    zone.id
                )));
            }
            catalog.insert(zone.id.clone(), zone);
        }
        Ok(Self { zones: catalog })
    }

    /// Look up a zone by id
    ///
    /// # Errors
    /// [`ModelError::UnknownLandingZone`]
    pub fn get(&self, id: &str) -> Result<&LandingZone, ModelError> {
        self.zones
            .get(id)
            .ok_or_else(|| ModelError::UnknownLandingZone(id.to_string()))
    }

    /// Zones in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &LandingZone> {
        self.zones.values()
    }

    /// Number of zones
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

fn check_zone(zone: &LandingZone) -> Result<(), ModelError> {
    let mut keys: Vec<&str> = Vec::with_capacity(zone.members.len());
    for member in &zone.members {
        if keys.contains(&member.key.as_str()) {
            return Err(ModelError::LandingZoneDefinition(format!(
                "{}: duplicate member key '{}'",
                zone.id, member.key
            )));
        }
        if let Some(target) = member.links.values().find(|t| !keys.contains(&t.as_str())) {
            return Err(ModelError::LandingZoneDefinition(format!(
                "{}: member '{}' links to '{target}', which is not declared before it",
                zone.id, member.key
            )));
        }
        keys.push(&member.key);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResourceConfig;
    use crate::global::GlobalConfig;
    use azcanvas_naming::ResourceKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_catalog_parses() {
        let catalog = LandingZoneCatalog::builtin().unwrap();
        let ids: Vec<_> = catalog.iter().map(|z| z.id.as_str()).collect();
        assert_eq!(ids, vec!["basic-web", "aks-baseline", "data-platform"]);
    }

    #[test]
    fn unknown_zone_is_an_error() {
        let catalog = LandingZoneCatalog::builtin().unwrap();
        assert!(matches!(
            catalog.get("hub-spoke"),
            Err(ModelError::UnknownLandingZone(id)) if id == "hub-spoke"
        ));
    }

    #[test]
    fn basic_web_links_members() {
        let global = GlobalConfig::new().with_project("shop");
        let factory = ResourceFactory::new(&global);
        let zone = LandingZoneCatalog::builtin().unwrap().get("basic-web").unwrap();
        let resources = zone
            .instantiate(&factory, &ResourceCollection::new(), Position::new(100.0, 50.0))
            .unwrap();

        assert_eq!(resources.len(), zone.members.len());
        let group = resources[0].id;
        assert!(resources[0].is_resource_group());
        assert!(resources[1..].iter().all(|r| r.resource_group == Some(group)));

        let plan = resources
            .iter()
            .find(|r| r.kind() == Some(ResourceKind::AppServicePlan))
            .unwrap();
        let ResourceConfig::WebApp(app) = &resources
            .iter()
            .find(|r| r.kind() == Some(ResourceKind::WebApp))
            .unwrap()
            .config
        else {
            panic!("web app missing");
        };
        assert_eq!(app.service_plan_name.as_deref(), Some(plan.name.as_str()));
        assert_eq!(app.https_only, Some(true));
        assert_eq!(app.common.location.as_deref(), Some("East US"));
    }

    #[test]
    fn members_fill_a_grid() {
        let global = GlobalConfig::new();
        let factory = ResourceFactory::new(&global);
        let zone = LandingZoneCatalog::builtin().unwrap().get("aks-baseline").unwrap();
        let resources = zone
            .instantiate(&factory, &ResourceCollection::new(), Position::new(10.0, 20.0))
            .unwrap();

        assert_eq!(resources[0].position, Position::new(10.0, 20.0));
        assert_eq!(resources[3].position, Position::new(670.0, 20.0));
        assert_eq!(resources[4].position, Position::new(10.0, 160.0));
    }

    #[test]
    fn ordinals_continue_from_canvas() {
        let global = GlobalConfig::new().with_project("inid");
        let factory = ResourceFactory::new(&global);
        let mut canvas = ResourceCollection::new();
        canvas.insert(factory.create_kind(ResourceKind::KeyVault, Position::default(), &canvas));

        let zone = LandingZoneCatalog::builtin().unwrap().get("data-platform").unwrap();
        let resources = zone.instantiate(&factory, &canvas, Position::default()).unwrap();
        let vault = resources
            .iter()
            .find(|r| r.kind() == Some(ResourceKind::KeyVault))
            .unwrap();
        assert_eq!(vault.name, "kv-inid-dev-eastus-02");
    }

    #[test]
    fn forward_links_are_rejected() {
        let yaml = r"
- id: broken
  name: Broken
  members:
    - key: app
      type: web_app
      links:
        servicePlanName: plan
    - key: plan
      type: app_service_plan
";
        assert!(matches!(
            LandingZoneCatalog::from_yaml(yaml),
            Err(ModelError::LandingZoneDefinition(_))
        ));
    }

    #[test]
    fn bad_override_surfaces_config_error() {
        let yaml = r"
- id: odd
  name: Odd
  members:
    - key: st
      type: storage_account
      config:
        colour: red
";
        let catalog = LandingZoneCatalog::from_yaml(yaml).unwrap();
        let global = GlobalConfig::new();
        let result = catalog.get("odd").unwrap().instantiate(
            &ResourceFactory::new(&global),
            &ResourceCollection::new(),
            Position::default(),
        );
        assert!(matches!(result, Err(ModelError::UnknownFields { .. })));
    }
}
