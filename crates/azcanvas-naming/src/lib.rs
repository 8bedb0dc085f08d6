//! Azure Canvas Naming
//!
//! Static naming rules for Azure resource types, plus the two pure functions
//! built on them.
//!
//! # Overview
//!
//! - **NamingRuleTable**: per-type length bounds, character classes and affix rules
//! - **NameValidator**: `(type, candidate) -> ValidationResult`
//! - **NameSuggester**: `(type, ordinal, context) -> name`
//!
//! # Example
//!
//! ```rust
//! use azcanvas_naming::{NameSuggester, NameValidator, NamingContext};
//!
//! let ctx = NamingContext::new("proj", "dev", "eastus");
//! let name = NameSuggester::azure().suggest("storage_account", 1, &ctx);
//! assert_eq!(name, "stprojdev01");
//!
//! let result = NameValidator::azure().validate("storage_account", &name);
//! assert!(result.is_valid());
//! ```

#![warn(missing_docs)]

pub mod kind;
pub mod rule;
pub mod suggester;
pub mod validator;

// Re-exports
pub use kind::{ResourceKind, UnknownKind};
pub use rule::{CharClass, NamingRule, NamingRuleTable, Uniqueness};
pub use suggester::{NameSuggester, NamingContext};
pub use validator::{NameValidator, NameViolation, NameWarning, ValidationResult};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for naming operations
    pub use crate::{
        NameSuggester, NameValidator, NamingContext, NamingRuleTable, ResourceKind,
        ValidationResult,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
