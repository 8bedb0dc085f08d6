//! Session-wide defaults

use crate::config::{CommonSettings, RoleAssignment};
use azcanvas_naming::NamingContext;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Location used when neither the resource nor the session names one
pub const DEFAULT_LOCATION: &str = "East US";

/// Defaults applied to newly created resources
///
/// Applied once, at creation. Editing the global config later does not
/// touch resources already on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalConfig {
    /// Target subscription
    pub subscription_id: Option<String>,
    /// Default location display name
    pub location: String,
    /// Environment token, e.g. `dev`
    pub environment: String,
    /// Project code token
    pub project_code: String,
    /// Region token used in names, e.g. `eastus`
    pub region: String,
    /// Tags added to every new resource
    pub tags: BTreeMap<String, String>,
    /// Role assignments added to every new resource
    pub default_role_assignments: Vec<RoleAssignment>,
}

impl GlobalConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With project code
    #[inline]
    #[must_use]
    pub fn with_project(mut self, project_code: impl Into<String>) -> Self {
        self.project_code = project_code.into();
        self
    }

    /// With environment
    #[inline]
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// With location display name and region token
    #[inline]
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>, region: impl Into<String>) -> Self {
        self.location = location.into();
        self.region = region.into();
        self
    }

    /// With subscription
    #[inline]
    #[must_use]
    pub fn with_subscription(mut self, subscription_id: impl Into<String>) -> Self {
        self.subscription_id = Some(subscription_id.into());
        self
    }

    /// With one default tag
    #[inline]
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// With one default role assignment
    #[inline]
    #[must_use]
    pub fn with_role_assignment(mut self, assignment: RoleAssignment) -> Self {
        self.default_role_assignments.push(assignment);
        self
    }

    /// Naming tokens for the suggester
    #[must_use]
    pub fn naming_context(&self) -> NamingContext {
        NamingContext::new(&self.project_code, &self.environment, &self.region)
    }

    /// Fill unset settings from these defaults
    ///
    /// Existing location and tag values win; role assignments are appended
    /// unless already present.
    pub fn apply_to(&self, common: &mut CommonSettings) {
        if common.location.is_none() {
            common.location = Some(self.location.clone());
        }
        for (key, value) in &self.tags {
            common
                .tags
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        for assignment in &self.default_role_assignments {
            if !common.role_assignments.contains(assignment) {
                common.role_assignments.push(assignment.clone());
            }
        }
    }

    /// Fill unset `location` and `tags` in an untyped config
    ///
    /// A `tags` value that is not an object is left alone.
    pub fn apply_to_fields(&self, fields: &mut Map<String, Value>) {
        fields
            .entry("location")
            .or_insert_with(|| Value::String(self.location.clone()));
        if self.tags.is_empty() {
            return;
        }
        let tags = fields
            .entry("tags")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(tags) = tags {
            for (key, value) in &self.tags {
                tags.entry(key.clone())
                    .or_insert_with(|| Value::String(value.clone()));
            }
        }
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            subscription_id: None,
            location: DEFAULT_LOCATION.to_string(),
            environment: "dev".to_string(),
            project_code: "proj".to_string(),
            region: "eastus".to_string(),
            tags: BTreeMap::new(),
            default_role_assignments: Vec::new(),
        }
    }
}
