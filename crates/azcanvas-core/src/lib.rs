//! Azure Canvas Core
//!
//! Sessions that own a canvas and the collaborators they talk to:
//! - Editing through [`DesignSession`] (resources, landing zones, renames, config)
//! - Terraform generation with a content-hash cache and optional private modules
//! - Saving and loading through a [`ConfigurationStore`]
//! - Simulated build and deployment pipelines
//!
//! Collaborators live in an explicitly constructed [`Services`] bundle with
//! an `initialize`/`teardown` lifecycle.
//!
//! # Example
//!
//! ```rust
//! use azcanvas_core::{CanvasConfig, DesignSession, GenerateOptions, Services, StaticTokenValidator};
//! use azcanvas_model::Position;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), azcanvas_core::CanvasError> {
//! let services = Services::in_memory(Arc::new(StaticTokenValidator::deny_all()));
//! services.initialize()?;
//!
//! let mut session = DesignSession::new(Arc::new(services), CanvasConfig::default());
//! session.add_landing_zone("basic-web", Position::default())?;
//!
//! let generated = session.generate(&GenerateOptions::inline()).await?;
//! println!("{}", generated.code);
//! session.save("web baseline").await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod cache;
pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod store;
pub mod token;

// Re-exports for convenience
pub use cache::{DocumentCache, LocalCache};
pub use config::{
    CacheSection, CanvasConfig, CodegenSection, NamingSection, PipelineSection,
    PrivateModuleSection, TokenSection,
};
pub use error::{CanvasError, ConfigError, Result, StoreError, TokenError};
pub use services::{ServiceState, Services};
pub use session::{DesignSession, GenerateOptions, Generated, ResourceValidation};
pub use store::{
    ConfigurationStore, InMemoryConfigurationStore, SaveRequest, SavedConfiguration,
    StoredConfiguration,
};
pub use token::{HttpTokenValidator, StaticTokenValidator, TokenValidator, TokenVerdict};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with design sessions
    pub use crate::{
        CanvasConfig, CanvasError, ConfigurationStore, DesignSession, GenerateOptions, Services,
        TokenValidator,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
