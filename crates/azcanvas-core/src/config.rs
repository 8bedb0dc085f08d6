//! TOML configuration
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration.
//!
//! ```toml
//! [naming]
//! project_code = "inid"
//! environment = "prod"
//! region = "westeurope"
//! location = "West Europe"
//!
//! [codegen]
//! provider_version = "~> 3.100"
//!
//! [codegen.private_module]
//! base = "git::https://dev.azure.com/org/modules.git"
//! reference = "v1.4.0"
//!
//! [pipeline]
//! seed = 42
//! failure_rate = 0.1
//! ```

use crate::error::ConfigError;
use azcanvas_codegen::{AssemblyOptions, PrivateModuleSource, DEFAULT_PROVIDER_VERSION};
use azcanvas_model::{GlobalConfig, DEFAULT_LOCATION};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    pub naming: NamingSection,
    pub codegen: CodegenSection,
    pub cache: CacheSection,
    pub pipeline: PipelineSection,
    pub tokens: TokenSection,
}

impl CanvasConfig {
    /// Read and validate a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`], [`ConfigError::Parse`] or [`ConfigError::Invalid`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    /// [`ConfigError::Parse`] or [`ConfigError::Invalid`]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] naming the first bad value
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pipeline = &self.pipeline;
        if !(0.0..=1.0).contains(&pipeline.failure_rate) {
            return Err(ConfigError::Invalid(format!(
                "pipeline.failure_rate must be within 0..=1, got {}",
                pipeline.failure_rate
            )));
        }
        if pipeline.min_step_ms > pipeline.max_step_ms {
            return Err(ConfigError::Invalid(format!(
                "pipeline.min_step_ms ({}) exceeds pipeline.max_step_ms ({})",
                pipeline.min_step_ms, pipeline.max_step_ms
            )));
        }
        if self.cache.capacity == 0 {
            return Err(ConfigError::Invalid("cache.capacity must be positive".into()));
        }
        if let Some(module) = &self.codegen.private_module {
            if module.base.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "codegen.private_module.base must not be empty".into(),
                ));
            }
        }
        Ok(())
    }

    /// Session defaults derived from `[naming]`
    #[must_use]
    pub fn global(&self) -> GlobalConfig {
        let naming = &self.naming;
        let mut global = GlobalConfig::new()
            .with_project(&naming.project_code)
            .with_environment(&naming.environment)
            .with_location(&naming.location, &naming.region);
        if let Some(subscription) = &naming.subscription_id {
            global = global.with_subscription(subscription);
        }
        global
    }
}

/// Naming and location defaults for new resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingSection {
    pub project_code: String,
    pub environment: String,
    pub region: String,
    pub location: String,
    pub subscription_id: Option<String>,
}

impl Default for NamingSection {
    fn default() -> Self {
        Self {
            project_code: "proj".into(),
            environment: "dev".into(),
            region: "eastus".into(),
            location: DEFAULT_LOCATION.into(),
            subscription_id: None,
        }
    }
}

/// Assembly settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodegenSection {
    pub provider_version: String,
    pub include_header: bool,
    pub private_module: Option<PrivateModuleSection>,
}

impl Default for CodegenSection {
    fn default() -> Self {
        Self {
            provider_version: DEFAULT_PROVIDER_VERSION.into(),
            include_header: true,
            private_module: None,
        }
    }
}

impl CodegenSection {
    /// Assembly options for inline output
    #[must_use]
    pub fn assembly_options(&self) -> AssemblyOptions {
        let options = AssemblyOptions::new().with_provider_version(&self.provider_version);
        if self.include_header {
            options
        } else {
            options.without_header()
        }
    }

    /// Configured private module source, if any
    #[must_use]
    pub fn module_source(&self) -> Option<PrivateModuleSource> {
        self.private_module
            .as_ref()
            .map(|m| PrivateModuleSource::new(&m.base, &m.reference))
    }
}

/// Location of the private module repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrivateModuleSection {
    pub base: String,
    #[serde(default = "default_module_reference")]
    pub reference: String,
}

fn default_module_reference() -> String {
    "main".into()
}

/// Local cache sizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSection {
    pub capacity: u64,
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            capacity: 256,
            ttl_secs: 15 * 60,
        }
    }
}

impl CacheSection {
    /// Entry time to live
    #[inline]
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Simulated pipeline timing
///
/// Without a `seed` every step takes `step_duration_ms` and succeeds.
/// With one, durations are drawn from `min_step_ms..=max_step_ms` and each
/// step fails with probability `failure_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSection {
    pub step_duration_ms: u64,
    pub min_step_ms: u64,
    pub max_step_ms: u64,
    pub seed: Option<u64>,
    pub failure_rate: f64,
    pub tick_ms: u64,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            step_duration_ms: 1500,
            min_step_ms: 500,
            max_step_ms: 3000,
            seed: None,
            failure_rate: 0.0,
            tick_ms: 250,
        }
    }
}

impl PipelineSection {
    /// Duration of each step in a fixed plan
    #[inline]
    #[must_use]
    pub fn step_duration(&self) -> Duration {
        Duration::from_millis(self.step_duration_ms)
    }

    /// Range randomized step durations are drawn from
    #[inline]
    #[must_use]
    pub fn step_range(&self) -> RangeInclusive<Duration> {
        Duration::from_millis(self.min_step_ms)..=Duration::from_millis(self.max_step_ms)
    }

    /// Driver poll interval
    #[inline]
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

/// Token validation collaborator
///
/// With an `endpoint`, tokens are checked over HTTP. Otherwise only tokens
/// listed in `allow` are valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenSection {
    pub endpoint: Option<String>,
    pub allow: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for TokenSection {
    fn default() -> Self {
        Self {
            endpoint: None,
            allow: Vec::new(),
            timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(CanvasConfig::from_toml_str("").unwrap(), CanvasConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = CanvasConfig::from_toml_str(
            r#"
            [naming]
            project_code = "inid"

            [codegen.private_module]
            base = "git::https://example.com/modules.git"
            "#,
        )
        .unwrap();

        assert_eq!(config.naming.project_code, "inid");
        assert_eq!(config.naming.environment, "dev");
        assert_eq!(config.codegen.provider_version, DEFAULT_PROVIDER_VERSION);
        let module = config.codegen.module_source().unwrap();
        assert_eq!(
            module.source_for("storage_account"),
            "git::https://example.com/modules.git//storage_account?ref=main"
        );
    }

    #[test]
    fn global_follows_naming_section() {
        let config = CanvasConfig::from_toml_str(
            r#"
            [naming]
            project_code = "inid"
            region = "westeurope"
            location = "West Europe"
            "#,
        )
        .unwrap();
        let global = config.global();
        assert_eq!(global.project_code, "inid");
        assert_eq!(global.region, "westeurope");
        assert_eq!(global.location, "West Europe");
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(matches!(
            CanvasConfig::from_toml_str("[pipeline]\nfailure_rate = 2.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CanvasConfig::from_toml_str("[pipeline]\nmin_step_ms = 10\nmax_step_ms = 5"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CanvasConfig::from_toml_str("[cache]\ncapacity = 0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        assert!(matches!(
            CanvasConfig::from_toml_str("[naming]\nproject = \"x\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nttl_secs = 60").unwrap();
        let config = CanvasConfig::load(file.path()).unwrap();
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));

        assert!(matches!(
            CanvasConfig::load("/nonexistent/canvas.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
