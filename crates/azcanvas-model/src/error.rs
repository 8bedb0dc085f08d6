//! Error types for the resource model

use crate::id::ResourceId;

/// Model errors
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Config payload does not match the typed config for its kind
    #[error("invalid config for '{type_key}': {reason}")]
    InvalidConfig { type_key: String, reason: String },

    /// Config payload carries fields the kind does not define
    #[error("unknown fields for '{type_key}': {fields:?}")]
    UnknownFields {
        type_key: String,
        fields: Vec<String>,
    },

    /// Malformed resource identifier
    #[error("invalid resource id: '{0}'")]
    InvalidId(String),

    /// Resource not present in the collection
    #[error("resource not found: {0}")]
    NotFound(ResourceId),

    /// Referenced resource is not a resource group
    #[error("resource {0} is not a resource group")]
    NotAResourceGroup(ResourceId),

    /// Landing zone id not in the catalog
    #[error("unknown landing zone: '{0}'")]
    UnknownLandingZone(String),

    /// Embedded landing zone catalog failed to parse
    #[error("landing zone definition error: {0}")]
    LandingZoneDefinition(String),
}

impl ModelError {
    /// Create invalid config error
    pub fn invalid_config(type_key: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidConfig {
            type_key: type_key.into(),
            reason: reason.to_string(),
        }
    }
}
