//! Design sessions
//!
//! A [`DesignSession`] is the single owner of one canvas. Every edit goes
//! through it; generation, persistence and pipeline runs read from it.

use crate::cache::CODEGEN_PREFIX;
use crate::config::CanvasConfig;
use crate::error::Result;
use crate::services::Services;
use crate::store::{SaveRequest, SavedConfiguration};
use azcanvas_codegen::{content_hash, options_hash, AssemblyWarning, CodeAssembler, ContentHash};
use azcanvas_model::{
    GlobalConfig, LandingZoneCatalog, ModelError, Position, Resource, ResourceCollection,
    ResourceFactory, ResourceId, ResourceRecord,
};
use azcanvas_naming::{NameValidator, ValidationResult};
use azcanvas_pipeline::{PipelinePlan, PipelineRun, PlanBuilder};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// How to generate a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Ask for private module references instead of inline resources
    pub private_module: bool,
    /// Bearer token presented for private module access
    pub token: Option<String>,
}

impl GenerateOptions {
    /// Inline resources
    #[inline]
    #[must_use]
    pub fn inline() -> Self {
        Self::default()
    }

    /// Private module references, authorized by `token`
    #[inline]
    #[must_use]
    pub fn private_module(token: impl Into<String>) -> Self {
        Self {
            private_module: true,
            token: Some(token.into()),
        }
    }
}

/// A generated document
///
/// A cache hit reports the same warnings as the assembly that filled it.
#[derive(Debug, Clone)]
pub struct Generated {
    pub code: Arc<str>,
    pub hash: ContentHash,
    pub used_private_module: bool,
    pub cached: bool,
    pub warnings: Vec<AssemblyWarning>,
}

/// Validation of one resource's name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceValidation {
    pub id: ResourceId,
    pub name: String,
    pub result: ValidationResult,
}

/// One user's canvas and its session defaults
#[derive(Debug)]
pub struct DesignSession {
    services: Arc<Services>,
    config: CanvasConfig,
    global: GlobalConfig,
    canvas: ResourceCollection,
    assembler: CodeAssembler,
    saved: Option<SavedConfiguration>,
    last_generated: Option<Arc<str>>,
}

impl DesignSession {
    /// Empty canvas with defaults from `config`
    #[must_use]
    pub fn new(services: Arc<Services>, config: CanvasConfig) -> Self {
        Self {
            global: config.global(),
            services,
            config,
            canvas: ResourceCollection::new(),
            assembler: CodeAssembler::new(),
            saved: None,
            last_generated: None,
        }
    }

    /// Resources on the canvas
    #[must_use]
    pub fn canvas(&self) -> &ResourceCollection {
        &self.canvas
    }

    /// Session defaults
    #[must_use]
    pub fn global(&self) -> &GlobalConfig {
        &self.global
    }

    /// Replace session defaults
    ///
    /// Only resources created afterwards pick them up.
    pub fn set_global(&mut self, global: GlobalConfig) {
        self.global = global;
    }

    /// Configuration last saved or loaded
    #[must_use]
    pub fn saved(&self) -> Option<&SavedConfiguration> {
        self.saved.as_ref()
    }

    /// Replace the canvas with interchange records
    ///
    /// # Errors
    /// [`ModelError`] for the first record that fails to decode
    pub fn import_records(&mut self, records: Vec<ResourceRecord>) -> Result<()> {
        self.canvas = ResourceCollection::import_records(records)?;
        self.last_generated = None;
        Ok(())
    }

    /// Drop a new resource of `type_key` on the canvas
    pub fn add_resource(&mut self, type_key: &str, position: Position) -> ResourceId {
        let resource = ResourceFactory::new(&self.global).create(type_key, position, &self.canvas);
        tracing::debug!(type_key, name = %resource.name, "resource added");
        self.canvas.insert(resource)
    }

    /// Insert every member of a landing zone, returning their ids in zone order
    ///
    /// # Errors
    /// [`ModelError::UnknownLandingZone`] or a bad member override
    pub fn add_landing_zone(&mut self, zone_id: &str, origin: Position) -> Result<Vec<ResourceId>> {
        let zone = LandingZoneCatalog::builtin()?.get(zone_id)?;
        let members =
            zone.instantiate(&ResourceFactory::new(&self.global), &self.canvas, origin)?;
        tracing::info!(zone = zone_id, members = members.len(), "landing zone added");
        Ok(members.into_iter().map(|r| self.canvas.insert(r)).collect())
    }

    /// Rename a resource and validate the new name
    ///
    /// The rename is applied even when the name is invalid so that the
    /// caller can show the messages next to it.
    ///
    /// # Errors
    /// [`ModelError::NotFound`]
    pub fn rename(&mut self, id: ResourceId, name: &str) -> Result<ValidationResult> {
        self.canvas.rename(id, name)?;
        let type_key = self.resource(id)?.type_key().to_string();
        Ok(NameValidator::azure().validate(&type_key, name))
    }

    /// Set one config field
    ///
    /// # Errors
    /// [`ModelError::NotFound`], or [`ModelError::InvalidConfig`] if the
    /// value does not fit the field
    pub fn update_config(&mut self, id: ResourceId, key: &str, value: Value) -> Result<()> {
        let resource = self.canvas.get_mut(id).ok_or(ModelError::NotFound(id))?;
        resource.config = resource.config.with_field(key, value)?;
        Ok(())
    }

    /// Move a resource on the canvas
    ///
    /// # Errors
    /// [`ModelError::NotFound`]
    pub fn move_resource(&mut self, id: ResourceId, position: Position) -> Result<()> {
        Ok(self.canvas.move_to(id, position)?)
    }

    /// Place a resource in a resource group, or take it out
    ///
    /// # Errors
    /// [`ModelError::NotFound`] or [`ModelError::NotAResourceGroup`]
    pub fn assign_resource_group(
        &mut self,
        id: ResourceId,
        group: Option<ResourceId>,
    ) -> Result<()> {
        Ok(self.canvas.assign_group(id, group)?)
    }

    /// Remove a resource; nothing cascades
    ///
    /// # Errors
    /// [`ModelError::NotFound`]
    pub fn remove_resource(&mut self, id: ResourceId) -> Result<Resource> {
        let removed = self.canvas.remove(id)?;
        tracing::debug!(name = %removed.name, "resource removed");
        Ok(removed)
    }

    /// Validate every resource name, in canvas order
    #[must_use]
    pub fn validate_all(&self) -> Vec<ResourceValidation> {
        let validator = NameValidator::azure();
        self.canvas
            .iter()
            .map(|r| ResourceValidation {
                id: r.id,
                name: r.name.clone(),
                result: validator.validate(r.type_key(), &r.name),
            })
            .collect()
    }

    /// Generate the Terraform document for the canvas
    ///
    /// The token validator is only consulted for private module output,
    /// and only when a module source is configured. Documents are cached
    /// by content hash, assembly options and requested output mode.
    ///
    /// # Errors
    /// - [`CanvasError::ServicesNotRunning`](crate::CanvasError::ServicesNotRunning)
    /// - [`CanvasError::Token`](crate::CanvasError::Token) if the validator fails
    /// - [`CanvasError::Codegen`](crate::CanvasError::Codegen) if hashing fails
    pub async fn generate(&mut self, options: &GenerateOptions) -> Result<Generated> {
        let resources = self.canvas.ordered_for_generation();
        let hash = content_hash(&resources, &self.global)?;

        let mut assembly_options = self.config.codegen.assembly_options();
        let module_source = self.config.codegen.module_source();
        if options.private_module {
            match module_source {
                Some(source) => {
                    let token_valid = match options.token.as_deref() {
                        Some(token) => self.services.tokens()?.validate(token).await?.valid,
                        None => false,
                    };
                    assembly_options = assembly_options.with_private_module(source, token_valid);
                }
                None => tracing::warn!("private module requested but no module source is configured"),
            }
        }

        let fingerprint = options_hash(&assembly_options)?;
        let requested = if options.private_module { "module" } else { "inline" };
        let key = format!("{CODEGEN_PREFIX}{hash}:{fingerprint}:{requested}");
        let cache = self.services.cache()?;
        let (assembly, cached) = match cache.get(&key).await {
            Some(assembly) => {
                tracing::debug!(%hash, requested, "generated document served from cache");
                (assembly, true)
            }
            None => {
                let assembly = Arc::new(self.assembler.assemble(
                    &resources,
                    &self.global,
                    &assembly_options,
                ));
                cache.insert(key, assembly.clone()).await;
                tracing::info!(
                    %hash,
                    resources = resources.len(),
                    warnings = assembly.warnings.len(),
                    private_module = assembly.used_private_module,
                    "document generated"
                );
                (assembly, false)
            }
        };

        let code: Arc<str> = assembly.code.as_str().into();
        self.last_generated = Some(code.clone());
        Ok(Generated {
            code,
            hash,
            used_private_module: assembly.used_private_module,
            cached,
            warnings: assembly.warnings.clone(),
        })
    }

    /// Save the canvas under `name`
    ///
    /// The first save creates a configuration; later saves overwrite it.
    ///
    /// # Errors
    /// [`CanvasError::Store`](crate::CanvasError::Store) from the collaborator
    pub async fn save(&mut self, name: &str) -> Result<SavedConfiguration> {
        let request = SaveRequest {
            id: self.saved.as_ref().map(|s| s.id.clone()),
            name: name.to_string(),
            resources: self.canvas.to_records(),
            global: self.global.clone(),
            generated_code: self.last_generated.as_deref().map(ToString::to_string),
        };
        let saved = self.services.store()?.save(request).await?;
        tracing::info!(id = %saved.id, name, resources = self.canvas.len(), "configuration saved");
        self.saved = Some(saved.clone());
        Ok(saved)
    }

    /// Replace the canvas with a saved configuration
    ///
    /// # Errors
    /// [`CanvasError::Store`](crate::CanvasError::Store) or a record that fails to decode
    pub async fn load(&mut self, id: &str) -> Result<()> {
        let stored = self.services.store()?.load(id).await?;
        self.canvas = ResourceCollection::import_records(stored.resources)?;
        self.global = stored.global;
        self.last_generated = stored.generated_code.map(Into::into);
        tracing::info!(id, resources = self.canvas.len(), "configuration loaded");
        self.saved = Some(stored.saved);
        Ok(())
    }

    /// Idle build pipeline
    ///
    /// # Errors
    /// [`CanvasError::Pipeline`](crate::CanvasError::Pipeline) if the plan settings are out of range
    pub fn build_pipeline(&self) -> Result<PipelineRun> {
        Ok(PipelineRun::new(self.plan(PlanBuilder::build())?))
    }

    /// Idle deployment pipeline
    ///
    /// # Errors
    /// [`CanvasError::Pipeline`](crate::CanvasError::Pipeline) if the plan settings are out of range
    pub fn deployment_pipeline(&self) -> Result<PipelineRun> {
        Ok(PipelineRun::new(self.plan(PlanBuilder::deployment())?))
    }

    fn plan(&self, builder: PlanBuilder) -> Result<PipelinePlan> {
        let settings = &self.config.pipeline;
        Ok(match settings.seed {
            Some(seed) => builder.randomized(seed, settings.step_range(), settings.failure_rate)?,
            None => builder.fixed(settings.step_duration()),
        })
    }

    fn resource(&self, id: ResourceId) -> Result<&Resource> {
        Ok(self.canvas.get(id).ok_or(ModelError::NotFound(id))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CanvasError, StoreError, TokenError};
    use crate::store::MockConfigurationStore;
    use crate::token::{MockTokenValidator, StaticTokenValidator, TokenVerdict};
    use crate::DocumentCache;
    use azcanvas_pipeline::PipelineStatus;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn module_config() -> CanvasConfig {
        CanvasConfig::from_toml_str(
            r#"
            [codegen.private_module]
            base = "git::https://example.com/modules.git"
            reference = "v1"
            "#,
        )
        .unwrap()
    }

    fn session_with(tokens: MockTokenValidator, config: CanvasConfig) -> DesignSession {
        let services = Services::new(
            Arc::new(crate::InMemoryConfigurationStore::new()),
            Arc::new(tokens),
            DocumentCache::new(64),
        );
        services.initialize().unwrap();
        DesignSession::new(Arc::new(services), config)
    }

    #[tokio::test]
    async fn inline_generation_never_asks_for_a_token() {
        let mut tokens = MockTokenValidator::new();
        tokens.expect_validate().never();
        let mut session = session_with(tokens, module_config());
        session.add_resource("resource_group", Position::default());

        let generated = session.generate(&GenerateOptions::inline()).await.unwrap();
        assert!(!generated.used_private_module);
        assert!(generated.code.contains("azurerm_resource_group"));
    }

    #[tokio::test]
    async fn valid_token_enables_modules() {
        let mut tokens = MockTokenValidator::new();
        tokens
            .expect_validate()
            .withf(|token| token == "secret")
            .times(1)
            .returning(|_| Ok(TokenVerdict { valid: true }));
        let mut session = session_with(tokens, module_config());
        session.add_landing_zone("basic-web", Position::default()).unwrap();

        let generated = session
            .generate(&GenerateOptions::private_module("secret"))
            .await
            .unwrap();
        assert!(generated.used_private_module);
        assert!(generated.code.contains("?ref=v1"));
    }

    #[tokio::test]
    async fn invalid_token_falls_back_to_inline() {
        let mut tokens = MockTokenValidator::new();
        tokens
            .expect_validate()
            .returning(|_| Ok(TokenVerdict { valid: false }));
        let mut session = session_with(tokens, module_config());
        session.add_resource("storage_account", Position::default());

        let generated = session
            .generate(&GenerateOptions::private_module("stale"))
            .await
            .unwrap();
        assert!(!generated.used_private_module);
        assert!(generated
            .warnings
            .iter()
            .any(|w| matches!(w, AssemblyWarning::PrivateModuleDenied)));
    }

    #[tokio::test]
    async fn token_service_failure_is_surfaced() {
        let mut tokens = MockTokenValidator::new();
        tokens
            .expect_validate()
            .returning(|_| Err(TokenError::Unreachable("connection refused".into())));
        let mut session = session_with(tokens, module_config());

        let err = session
            .generate(&GenerateOptions::private_module("t"))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn second_generation_is_cached_until_canvas_changes() {
        let mut session = session_with(MockTokenValidator::new(), CanvasConfig::default());
        let id = session.add_resource("key_vault", Position::default());

        let first = session.generate(&GenerateOptions::inline()).await.unwrap();
        let second = session.generate(&GenerateOptions::inline()).await.unwrap();
        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.code, second.code);

        session.move_resource(id, Position::new(500.0, 500.0)).unwrap();
        assert!(session.generate(&GenerateOptions::inline()).await.unwrap().cached);

        session.update_config(id, "skuName", json!("premium")).unwrap();
        let changed = session.generate(&GenerateOptions::inline()).await.unwrap();
        assert!(!changed.cached);
        assert_ne!(changed.hash, first.hash);
    }

    #[tokio::test]
    async fn cached_documents_report_the_same_warnings() {
        let mut tokens = MockTokenValidator::new();
        tokens
            .expect_validate()
            .returning(|_| Ok(TokenVerdict { valid: false }));
        let mut session = session_with(tokens, module_config());
        session.add_resource("cosmos_db", Position::default());

        let inline = session.generate(&GenerateOptions::inline()).await.unwrap();
        assert!(matches!(
            inline.warnings.as_slice(),
            [AssemblyWarning::UnknownType { type_key, .. }] if type_key == "cosmos_db"
        ));

        let denied = GenerateOptions::private_module("forged");
        let first = session.generate(&denied).await.unwrap();
        let second = session.generate(&denied).await.unwrap();
        assert!(!first.cached);
        assert!(second.cached);
        assert!(first
            .warnings
            .iter()
            .any(|w| matches!(w, AssemblyWarning::PrivateModuleDenied)));
        assert_eq!(second.warnings, first.warnings);

        let again = session.generate(&GenerateOptions::inline()).await.unwrap();
        assert!(again.cached);
        assert_eq!(again.warnings, inline.warnings);
    }

    #[tokio::test]
    async fn cached_module_flag_matches_fresh_assembly() {
        let mut tokens = MockTokenValidator::new();
        tokens
            .expect_validate()
            .returning(|_| Ok(TokenVerdict { valid: true }));
        let mut session = session_with(tokens, module_config());
        session.add_resource("resource_group", Position::default());

        let options = GenerateOptions::private_module("secret");
        let first = session.generate(&options).await.unwrap();
        let second = session.generate(&options).await.unwrap();
        assert!(second.cached);
        assert!(!first.used_private_module);
        assert_eq!(second.used_private_module, first.used_private_module);
    }

    #[tokio::test]
    async fn sessions_with_different_codegen_settings_do_not_share_documents() {
        let services = Services::new(
            Arc::new(crate::InMemoryConfigurationStore::new()),
            Arc::new(StaticTokenValidator::deny_all()),
            DocumentCache::new(16),
        );
        services.initialize().unwrap();
        let services = Arc::new(services);

        let pinned = |version: &str| {
            CanvasConfig::from_toml_str(&format!("[codegen]\nprovider_version = \"{version}\""))
                .unwrap()
        };
        let mut three = DesignSession::new(services.clone(), pinned("~> 3.0"));
        let mut four = DesignSession::new(services, pinned("~> 4.0"));
        three.add_resource("key_vault", Position::default());
        four.import_records(three.canvas().to_records()).unwrap();

        let a = three.generate(&GenerateOptions::inline()).await.unwrap();
        let b = four.generate(&GenerateOptions::inline()).await.unwrap();
        assert_eq!(a.hash, b.hash);
        assert!(!b.cached);
        assert!(a.code.contains("\"~> 3.0\""));
        assert!(b.code.contains("\"~> 4.0\""));
    }

    #[tokio::test]
    async fn store_outage_is_retryable() {
        let mut store = MockConfigurationStore::new();
        store
            .expect_save()
            .returning(|_| Err(StoreError::Unavailable("503".into())));
        let services = Services::new(
            Arc::new(store),
            Arc::new(StaticTokenValidator::deny_all()),
            DocumentCache::new(8),
        );
        services.initialize().unwrap();
        let mut session = DesignSession::new(Arc::new(services), CanvasConfig::default());

        let err = session.save("web").await.unwrap_err();
        assert!(matches!(err, CanvasError::Store(StoreError::Unavailable(_))));
        assert!(err.is_retryable());
        assert!(session.saved().is_none());
    }

    #[tokio::test]
    async fn torn_down_services_reject_generation() {
        let mut session = session_with(MockTokenValidator::new(), CanvasConfig::default());
        session.services.teardown();
        assert!(matches!(
            session.generate(&GenerateOptions::inline()).await,
            Err(CanvasError::ServicesNotRunning)
        ));
    }

    #[test]
    fn rename_applies_and_reports() {
        let mut session = session_with(MockTokenValidator::new(), CanvasConfig::default());
        let id = session.add_resource("storage_account", Position::default());

        let result = session.rename(id, "MyStorage1").unwrap();
        assert!(!result.is_valid());
        assert_eq!(session.canvas().get(id).unwrap().name, "MyStorage1");
    }

    #[test]
    fn seeded_pipelines_are_reproducible() {
        let config = CanvasConfig::from_toml_str("[pipeline]\nseed = 9\nfailure_rate = 0.5").unwrap();
        let session = session_with(MockTokenValidator::new(), config);
        let a = session.deployment_pipeline().unwrap();
        let b = session.deployment_pipeline().unwrap();
        assert_eq!(a.plan(), b.plan());
        assert_eq!(a.status(), PipelineStatus::Idle);

        let fixed = session_with(MockTokenValidator::new(), CanvasConfig::default())
            .build_pipeline()
            .unwrap();
        assert!(fixed
            .plan()
            .steps
            .iter()
            .all(|s| s.duration == Duration::from_millis(1500)));
    }
}
