//! Typed per-kind resource configuration
//!
//! Each known kind carries its own strongly typed field set. Optional fields
//! stay `None` until the user fills them in; the code assembler applies
//! defaults or placeholders. Types outside the known set are kept verbatim in
//! [`ResourceConfig::Other`].

use crate::error::ModelError;
use azcanvas_naming::ResourceKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Role assignment granted on a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    /// Built-in or custom role name, e.g. `Reader`
    pub role_definition_name: String,
    /// Object id of the user, group or service principal
    pub principal_id: String,
}

impl RoleAssignment {
    /// Create role assignment
    #[must_use]
    pub fn new(role: impl Into<String>, principal_id: impl Into<String>) -> Self {
        Self {
            role_definition_name: role.into(),
            principal_id: principal_id.into(),
        }
    }
}

/// Settings shared by every typed config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommonSettings {
    /// Azure region display name, e.g. `East US`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Resource tags
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    /// Role assignments scoped to this resource
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub role_assignments: Vec<RoleAssignment>,
    /// Fields no typed config claimed; must be empty for a valid config
    #[serde(flatten)]
    pub unrecognized: BTreeMap<String, Value>,
}

/// Resource group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceGroupConfig {
    #[serde(flatten)]
    pub common: CommonSettings,
}

/// Storage account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageAccountConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replication_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_tier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_tls_version: Option<String>,
    #[serde(flatten)]
    pub common: CommonSettings,
}

/// Key vault
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyVaultConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku_name: Option<String>,
    /// Required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_delete_retention_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purge_protection_enabled: Option<bool>,
    #[serde(flatten)]
    pub common: CommonSettings,
}

/// Virtual network
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VirtualNetworkConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub address_space: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dns_servers: Vec<String>,
    #[serde(flatten)]
    pub common: CommonSettings,
}

/// Subnet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubnetConfig {
    /// Required; name of the parent virtual network
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_network_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub address_prefixes: Vec<String>,
    #[serde(flatten)]
    pub common: CommonSettings,
}

/// Inbound or outbound rule of a network security group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRule {
    pub name: String,
    pub priority: u32,
    #[serde(default = "SecurityRule::default_direction")]
    pub direction: String,
    #[serde(default = "SecurityRule::default_access")]
    pub access: String,
    #[serde(default = "SecurityRule::default_wildcard")]
    pub protocol: String,
    #[serde(default = "SecurityRule::default_wildcard")]
    pub destination_port_range: String,
    #[serde(default = "SecurityRule::default_wildcard")]
    pub source_address_prefix: String,
}

impl SecurityRule {
    fn default_direction() -> String {
        "Inbound".to_string()
    }

    fn default_access() -> String {
        "Allow".to_string()
    }

    fn default_wildcard() -> String {
        "*".to_string()
    }
}

/// Network security group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkSecurityGroupConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_rules: Vec<SecurityRule>,
    #[serde(flatten)]
    pub common: CommonSettings,
}

/// Public IP address
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicIpConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(flatten)]
    pub common: CommonSettings,
}

/// App Service plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppServicePlanConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku_name: Option<String>,
    #[serde(flatten)]
    pub common: CommonSettings,
}

/// Linux web app
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebAppConfig {
    /// Required; name of the hosting App Service plan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_plan_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub always_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https_only: Option<bool>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub app_settings: BTreeMap<String, String>,
    #[serde(flatten)]
    pub common: CommonSettings,
}

/// SQL logical server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SqlServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administrator_login: Option<String>,
    /// Required
    #[serde(skip_serializing_if = "Option::is_none")]
    pub administrator_password: Option<String>,
    #[serde(flatten)]
    pub common: CommonSettings,
}

/// SQL database
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SqlDatabaseConfig {
    /// Required; name of the owning SQL server
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size_gb: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collation: Option<String>,
    #[serde(flatten)]
    pub common: CommonSettings,
}

/// Container registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerRegistryConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_enabled: Option<bool>,
    #[serde(flatten)]
    pub common: CommonSettings,
}

/// AKS cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KubernetesClusterConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kubernetes_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_size: Option<String>,
    #[serde(flatten)]
    pub common: CommonSettings,
}

/// Log Analytics workspace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogAnalyticsWorkspaceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_in_days: Option<u32>,
    #[serde(flatten)]
    pub common: CommonSettings,
}

/// Config of a type outside the known set, kept verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct OtherConfig {
    /// Raw type key
    pub type_key: String,
    /// Raw fields
    pub fields: Map<String, Value>,
}

/// Configuration tagged by resource kind
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceConfig {
    ResourceGroup(ResourceGroupConfig),
    StorageAccount(StorageAccountConfig),
    KeyVault(KeyVaultConfig),
    VirtualNetwork(VirtualNetworkConfig),
    Subnet(SubnetConfig),
    NetworkSecurityGroup(NetworkSecurityGroupConfig),
    PublicIp(PublicIpConfig),
    AppServicePlan(AppServicePlanConfig),
    WebApp(WebAppConfig),
    SqlServer(SqlServerConfig),
    SqlDatabase(SqlDatabaseConfig),
    ContainerRegistry(ContainerRegistryConfig),
    KubernetesCluster(KubernetesClusterConfig),
    LogAnalyticsWorkspace(LogAnalyticsWorkspaceConfig),
    /// Unknown type; passed through untouched
    Other(OtherConfig),
}

/// Expands `$body` once per known variant with `$cfg` bound to the inner config
macro_rules! for_each_typed {
    ($value:expr, $cfg:ident => $body:expr, other $other:ident => $fallback:expr) => {
        match $value {
            ResourceConfig::ResourceGroup($cfg) => $body,
            ResourceConfig::StorageAccount($cfg) => $body,
            ResourceConfig::KeyVault($cfg) => $body,
            ResourceConfig::VirtualNetwork($cfg) => $body,
            ResourceConfig::Subnet($cfg) => $body,
            ResourceConfig::NetworkSecurityGroup($cfg) => $body,
            ResourceConfig::PublicIp($cfg) => $body,
            ResourceConfig::AppServicePlan($cfg) => $body,
            ResourceConfig::WebApp($cfg) => $body,
            ResourceConfig::SqlServer($cfg) => $body,
            ResourceConfig::SqlDatabase($cfg) => $body,
            ResourceConfig::ContainerRegistry($cfg) => $body,
            ResourceConfig::KubernetesCluster($cfg) => $body,
            ResourceConfig::LogAnalyticsWorkspace($cfg) => $body,
            ResourceConfig::Other($other) => $fallback,
        }
    };
}

impl ResourceConfig {
    /// Empty config for a known kind
    #[must_use]
    pub fn default_for(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::ResourceGroup => Self::ResourceGroup(ResourceGroupConfig::default()),
            ResourceKind::StorageAccount => Self::StorageAccount(StorageAccountConfig::default()),
            ResourceKind::KeyVault => Self::KeyVault(KeyVaultConfig::default()),
            ResourceKind::VirtualNetwork => Self::VirtualNetwork(VirtualNetworkConfig::default()),
            ResourceKind::Subnet => Self::Subnet(SubnetConfig::default()),
            ResourceKind::NetworkSecurityGroup => {
                Self::NetworkSecurityGroup(NetworkSecurityGroupConfig::default())
            }
            ResourceKind::PublicIp => Self::PublicIp(PublicIpConfig::default()),
            ResourceKind::AppServicePlan => Self::AppServicePlan(AppServicePlanConfig::default()),
            ResourceKind::WebApp => Self::WebApp(WebAppConfig::default()),
            ResourceKind::SqlServer => Self::SqlServer(SqlServerConfig::default()),
            ResourceKind::SqlDatabase => Self::SqlDatabase(SqlDatabaseConfig::default()),
            ResourceKind::ContainerRegistry => {
                Self::ContainerRegistry(ContainerRegistryConfig::default())
            }
            ResourceKind::KubernetesCluster => {
                Self::KubernetesCluster(KubernetesClusterConfig::default())
            }
            ResourceKind::LogAnalyticsWorkspace => {
                Self::LogAnalyticsWorkspace(LogAnalyticsWorkspaceConfig::default())
            }
        }
    }

    /// Empty config for an arbitrary type key
    #[must_use]
    pub fn default_for_key(type_key: &str) -> Self {
        match type_key.parse::<ResourceKind>() {
            Ok(kind) => Self::default_for(kind),
            Err(_) => Self::Other(OtherConfig {
                type_key: type_key.to_string(),
                fields: Map::new(),
            }),
        }
    }

    /// Decode the interchange form `(type, config)`
    ///
    /// Unknown types are accepted as [`ResourceConfig::Other`]. Known types
    /// reject ill-typed values and fields the kind does not define.
    ///
    /// # Errors
    /// [`ModelError::InvalidConfig`] or [`ModelError::UnknownFields`]
    pub fn from_parts(type_key: &str, config: Value) -> Result<Self, ModelError> {
        let fields = match config {
            Value::Null => Map::new(),
            Value::Object(fields) => fields,
            other => {
                return Err(ModelError::invalid_config(
                    type_key,
                    format!("expected an object, got {other}"),
                ))
            }
        };

        let Ok(kind) = type_key.parse::<ResourceKind>() else {
            return Ok(Self::Other(OtherConfig {
                type_key: type_key.to_string(),
                fields,
            }));
        };
        let config = Value::Object(fields);

        let decoded = match kind {
            ResourceKind::ResourceGroup => Self::ResourceGroup(decode(type_key, config)?),
            ResourceKind::StorageAccount => Self::StorageAccount(decode(type_key, config)?),
            ResourceKind::KeyVault => Self::KeyVault(decode(type_key, config)?),
            ResourceKind::VirtualNetwork => Self::VirtualNetwork(decode(type_key, config)?),
            ResourceKind::Subnet => Self::Subnet(decode(type_key, config)?),
            ResourceKind::NetworkSecurityGroup => {
                Self::NetworkSecurityGroup(decode(type_key, config)?)
            }
            ResourceKind::PublicIp => Self::PublicIp(decode(type_key, config)?),
            ResourceKind::AppServicePlan => Self::AppServicePlan(decode(type_key, config)?),
            ResourceKind::WebApp => Self::WebApp(decode(type_key, config)?),
            ResourceKind::SqlServer => Self::SqlServer(decode(type_key, config)?),
            ResourceKind::SqlDatabase => Self::SqlDatabase(decode(type_key, config)?),
            ResourceKind::ContainerRegistry => Self::ContainerRegistry(decode(type_key, config)?),
            ResourceKind::KubernetesCluster => Self::KubernetesCluster(decode(type_key, config)?),
            ResourceKind::LogAnalyticsWorkspace => {
                Self::LogAnalyticsWorkspace(decode(type_key, config)?)
            }
        };

        if let Some(common) = decoded.common() {
            if !common.unrecognized.is_empty() {
                return Err(ModelError::UnknownFields {
                    type_key: type_key.to_string(),
                    fields: common.unrecognized.keys().cloned().collect(),
                });
            }
        }

        Ok(decoded)
    }

    /// Encode the config half of the interchange form
    #[must_use]
    pub fn to_value(&self) -> Value {
        for_each_typed!(self, cfg => serde_json::to_value(cfg).unwrap_or_default(),
            other o => Value::Object(o.fields.clone()))
    }

    /// Known kind, `None` for pass-through types
    #[must_use]
    pub fn kind(&self) -> Option<ResourceKind> {
        let kind = match self {
            Self::ResourceGroup(_) => ResourceKind::ResourceGroup,
            Self::StorageAccount(_) => ResourceKind::StorageAccount,
            Self::KeyVault(_) => ResourceKind::KeyVault,
            Self::VirtualNetwork(_) => ResourceKind::VirtualNetwork,
            Self::Subnet(_) => ResourceKind::Subnet,
            Self::NetworkSecurityGroup(_) => ResourceKind::NetworkSecurityGroup,
            Self::PublicIp(_) => ResourceKind::PublicIp,
            Self::AppServicePlan(_) => ResourceKind::AppServicePlan,
            Self::WebApp(_) => ResourceKind::WebApp,
            Self::SqlServer(_) => ResourceKind::SqlServer,
            Self::SqlDatabase(_) => ResourceKind::SqlDatabase,
            Self::ContainerRegistry(_) => ResourceKind::ContainerRegistry,
            Self::KubernetesCluster(_) => ResourceKind::KubernetesCluster,
            Self::LogAnalyticsWorkspace(_) => ResourceKind::LogAnalyticsWorkspace,
            Self::Other(_) => return None,
        };
        Some(kind)
    }

    /// Type key as it appears on the wire
    #[must_use]
    pub fn type_key(&self) -> &str {
        match self {
            Self::Other(o) => &o.type_key,
            typed => typed.kind().map_or("", |k| k.as_str()),
        }
    }

    /// Shared settings, `None` for pass-through types
    #[must_use]
    pub fn common(&self) -> Option<&CommonSettings> {
        for_each_typed!(self, cfg => Some(&cfg.common), other _o => None)
    }

    /// Mutable shared settings, `None` for pass-through types
    pub fn common_mut(&mut self) -> Option<&mut CommonSettings> {
        for_each_typed!(self, cfg => Some(&mut cfg.common), other _o => None)
    }

    /// Location, whether typed or carried as a raw field
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Other(o) => o.fields.get("location").and_then(Value::as_str),
            typed => typed.common().and_then(|c| c.location.as_deref()),
        }
    }

    /// Replace one field by its interchange key
    ///
    /// # Errors
    /// Same as [`ResourceConfig::from_parts`] for the updated payload
    pub fn with_field(&self, key: &str, value: Value) -> Result<Self, ModelError> {
        let mut payload = match self.to_value() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        payload.insert(key.to_string(), value);
        Self::from_parts(self.type_key(), Value::Object(payload))
    }
}

fn decode<T: DeserializeOwned>(type_key: &str, config: Value) -> Result<T, ModelError> {
    serde_json::from_value(config).map_err(|e| ModelError::invalid_config(type_key, e))
}
