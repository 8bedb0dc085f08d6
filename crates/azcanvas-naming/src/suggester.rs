//! Default name generation
//!
//! Suggested names are a best-effort heuristic. They are not re-validated:
//! a long project code can push a hyphenated name past the type's maximum
//! length, and the caller is expected to run the validator and surface the
//! result.

use crate::rule::NamingRuleTable;
use crate::validator::{NameValidator, ValidationResult};
use serde::{Deserialize, Serialize};

/// Project-level tokens that go into every suggested name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamingContext {
    /// Short project code, e.g. `inid`
    pub project_code: String,
    /// Environment, e.g. `dev`
    pub environment: String,
    /// Region token, e.g. `eastus`
    pub region: String,
}

impl NamingContext {
    /// Create a context
    #[must_use]
    pub fn new(
        project_code: impl Into<String>,
        environment: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            project_code: project_code.into(),
            environment: environment.into(),
            region: region.into(),
        }
    }
}

impl Default for NamingContext {
    fn default() -> Self {
        Self::new("proj", "dev", "eastus")
    }
}

/// Generates default names from the rule table
#[derive(Debug, Clone, Copy)]
pub struct NameSuggester<'t> {
    table: &'t NamingRuleTable,
}

impl NameSuggester<'static> {
    /// Suggester over the built-in Azure table
    #[inline]
    #[must_use]
    pub fn azure() -> Self {
        Self {
            table: NamingRuleTable::azure(),
        }
    }
}

impl Default for NameSuggester<'static> {
    fn default() -> Self {
        Self::azure()
    }
}

impl<'t> NameSuggester<'t> {
    /// Suggester over a custom table
    #[inline]
    #[must_use]
    pub fn new(table: &'t NamingRuleTable) -> Self {
        Self { table }
    }

    /// Suggest a name for the `ordinal`-th resource (1-based) of `type_key`
    #[must_use]
    pub fn suggest(&self, type_key: &str, ordinal: u32, ctx: &NamingContext) -> String {
        let rule = self.table.lookup(type_key);
        let short_code = match rule {
            Some(rule) if !rule.short_code.is_empty() => rule.short_code.to_string(),
            _ => type_key.chars().take(3).collect(),
        };
        let padded = format!("{ordinal:02}");

        match rule {
            Some(rule) if rule.special_format => {
                let joined = format!(
                    "{short_code}{}{}{padded}",
                    ctx.project_code, ctx.environment
                );
                joined.chars().take(rule.max_length).collect()
            }
            _ => [
                short_code.as_str(),
                ctx.project_code.as_str(),
                ctx.environment.as_str(),
                ctx.region.as_str(),
                padded.as_str(),
            ]
            .join("-"),
        }
    }

    /// Suggest a name and validate it against the same table
    #[must_use]
    pub fn suggest_validated(
        &self,
        type_key: &str,
        ordinal: u32,
        ctx: &NamingContext,
    ) -> (String, ValidationResult) {
        let name = self.suggest(type_key, ordinal, ctx);
        let result = NameValidator::new(self.table).validate(type_key, &name);
        (name, result)
    }
}
