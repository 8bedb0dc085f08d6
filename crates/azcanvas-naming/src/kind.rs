//! Known Azure resource kinds
//!
//! Every kind has a stable snake_case key. The key is what travels across
//! the interchange boundary (`"type": "storage_account"`) and what the rule
//! table and template registry are indexed by.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resource kinds with built-in naming rules and templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Resource group (container for everything else)
    ResourceGroup,
    /// Storage account
    StorageAccount,
    /// Key vault
    KeyVault,
    /// Virtual network
    VirtualNetwork,
    /// Subnet inside a virtual network
    Subnet,
    /// Network security group
    NetworkSecurityGroup,
    /// Public IP address
    PublicIp,
    /// App Service plan
    AppServicePlan,
    /// Linux web app
    WebApp,
    /// SQL logical server
    SqlServer,
    /// SQL database
    SqlDatabase,
    /// Container registry
    ContainerRegistry,
    /// AKS cluster
    KubernetesCluster,
    /// Log Analytics workspace
    LogAnalyticsWorkspace,
}

impl ResourceKind {
    /// All known kinds, in palette order
    pub const ALL: [ResourceKind; 14] = [
        ResourceKind::ResourceGroup,
        ResourceKind::StorageAccount,
        ResourceKind::KeyVault,
        ResourceKind::VirtualNetwork,
        ResourceKind::Subnet,
        ResourceKind::NetworkSecurityGroup,
        ResourceKind::PublicIp,
        ResourceKind::AppServicePlan,
        ResourceKind::WebApp,
        ResourceKind::SqlServer,
        ResourceKind::SqlDatabase,
        ResourceKind::ContainerRegistry,
        ResourceKind::KubernetesCluster,
        ResourceKind::LogAnalyticsWorkspace,
    ];

    /// Stable type key
    #[inline]
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::ResourceGroup => "resource_group",
            ResourceKind::StorageAccount => "storage_account",
            ResourceKind::KeyVault => "key_vault",
            ResourceKind::VirtualNetwork => "virtual_network",
            ResourceKind::Subnet => "subnet",
            ResourceKind::NetworkSecurityGroup => "network_security_group",
            ResourceKind::PublicIp => "public_ip",
            ResourceKind::AppServicePlan => "app_service_plan",
            ResourceKind::WebApp => "web_app",
            ResourceKind::SqlServer => "sql_server",
            ResourceKind::SqlDatabase => "sql_database",
            ResourceKind::ContainerRegistry => "container_registry",
            ResourceKind::KubernetesCluster => "kubernetes_cluster",
            ResourceKind::LogAnalyticsWorkspace => "log_analytics_workspace",
        }
    }

    /// Human-readable label shown in the palette
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            ResourceKind::ResourceGroup => "Resource Group",
            ResourceKind::StorageAccount => "Storage Account",
            ResourceKind::KeyVault => "Key Vault",
            ResourceKind::VirtualNetwork => "Virtual Network",
            ResourceKind::Subnet => "Subnet",
            ResourceKind::NetworkSecurityGroup => "Network Security Group",
            ResourceKind::PublicIp => "Public IP",
            ResourceKind::AppServicePlan => "App Service Plan",
            ResourceKind::WebApp => "Web App",
            ResourceKind::SqlServer => "SQL Server",
            ResourceKind::SqlDatabase => "SQL Database",
            ResourceKind::ContainerRegistry => "Container Registry",
            ResourceKind::KubernetesCluster => "Kubernetes Cluster",
            ResourceKind::LogAnalyticsWorkspace => "Log Analytics Workspace",
        }
    }

    /// Whether this kind is a resource group
    #[inline]
    #[must_use]
    pub const fn is_resource_group(&self) -> bool {
        matches!(self, ResourceKind::ResourceGroup)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type key that matches no known kind
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource kind: '{0}'")]
pub struct UnknownKind(pub String);

impl FromStr for ResourceKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
