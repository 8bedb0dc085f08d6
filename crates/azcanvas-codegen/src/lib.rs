//! Azure Canvas Codegen
//!
//! Turns an ordered list of canvas resources into a Terraform document for
//! the `azurerm` provider.
//!
//! # Overview
//!
//! - **TemplateRegistry**: one [`Template`] per resource kind, passthrough for the rest
//! - **CodeAssembler**: header, per-resource blocks in input order, role assignments
//! - **Private modules**: module references instead of inline resources, gated on a token verdict
//! - **reverse**: reads literal attributes back out of generated text
//! - **content_hash**: Blake3 key of the assembly inputs
//!
//! Assembly is best effort. A resource with a missing required field still
//! produces a block, with an empty value and an [`AssemblyWarning`].
//!
//! # Example
//!
//! ```rust
//! use azcanvas_codegen::{AssemblyOptions, CodeAssembler};
//! use azcanvas_model::{GlobalConfig, Resource, ResourceConfig};
//! use serde_json::json;
//!
//! let rg = Resource::new(
//!     "app-rg",
//!     ResourceConfig::from_parts("resource_group", json!({"location": "East US"})).unwrap(),
//! );
//! let assembly = CodeAssembler::new().assemble(&[rg], &GlobalConfig::new(), &AssemblyOptions::new());
//!
//! assert!(assembly.code.contains("name     = \"app-rg\""));
//! assert!(assembly.code.contains("location = \"East US\""));
//! ```

#![warn(missing_docs)]

pub mod assembler;
pub mod error;
pub mod hash;
pub mod hcl;
pub mod label;
pub mod reverse;
pub mod template;
pub mod templates;
pub mod warning;

// Re-exports
pub use assembler::{
    Assembly, AssemblyOptions, CodeAssembler, PrivateModuleSource, DEFAULT_PROVIDER_VERSION,
};
pub use error::CodegenError;
pub use hash::{content_hash, options_hash, ContentHash};
pub use hcl::{Block, Expr};
pub use reverse::{parse_document, BlockKind, ParsedBlock};
pub use template::{PassthroughTemplate, RenderContext, Template, TemplateRegistry};
pub use warning::AssemblyWarning;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for code generation
    pub use crate::{
        content_hash, parse_document, Assembly, AssemblyOptions, AssemblyWarning, CodeAssembler,
        PrivateModuleSource, TemplateRegistry,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
