//! Azure Canvas Model
//!
//! In-memory representation of what the user has placed on the canvas:
//! - Resources with a strongly typed, per-kind configuration
//! - An optional resource-group reference by id, resolved on read
//! - Session-wide defaults applied when a resource is created
//! - Landing zones that drop a whole bundle at once
//!
//! # Example
//!
//! ```rust
//! use azcanvas_model::{GlobalConfig, Position, ResourceCollection, ResourceFactory};
//! use azcanvas_naming::ResourceKind;
//!
//! let global = GlobalConfig::new().with_project("proj");
//! let factory = ResourceFactory::new(&global);
//! let mut canvas = ResourceCollection::new();
//!
//! let rg = factory.create_kind(ResourceKind::ResourceGroup, Position::new(0.0, 0.0), &canvas);
//! let rg_id = canvas.insert(rg);
//! let st = factory.create_kind(ResourceKind::StorageAccount, Position::new(220.0, 0.0), &canvas);
//! let st_id = canvas.insert(st.in_group(rg_id));
//!
//! assert_eq!(canvas.get(st_id).map(|r| r.name.as_str()), Some("stprojdev01"));
//! assert_eq!(canvas.resource_group_of(st_id).map(|r| r.id), Some(rg_id));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod collection;
pub mod config;
pub mod error;
pub mod factory;
pub mod global;
pub mod id;
pub mod landing_zone;
pub mod resource;

// Re-exports for convenience
pub use collection::ResourceCollection;
pub use config::{
    AppServicePlanConfig, CommonSettings, ContainerRegistryConfig, KeyVaultConfig,
    KubernetesClusterConfig, LogAnalyticsWorkspaceConfig, NetworkSecurityGroupConfig,
    OtherConfig, PublicIpConfig, ResourceConfig, ResourceGroupConfig, RoleAssignment,
    SecurityRule, SqlDatabaseConfig, SqlServerConfig, StorageAccountConfig, SubnetConfig,
    VirtualNetworkConfig, WebAppConfig,
};
pub use error::ModelError;
pub use factory::ResourceFactory;
pub use global::{GlobalConfig, DEFAULT_LOCATION};
pub use id::ResourceId;
pub use landing_zone::{LandingZone, LandingZoneCatalog, ZoneMember};
pub use resource::{Position, Resource, ResourceRecord};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the canvas model
    pub use crate::{
        GlobalConfig, LandingZoneCatalog, ModelError, Position, Resource, ResourceCollection,
        ResourceConfig, ResourceFactory, ResourceId,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
