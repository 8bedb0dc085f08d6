//! Document assembly
//!
//! Walks resources in the order given, renders each through its template
//! and concatenates the blocks. No dependency analysis happens here; callers
//! that want resource groups first use
//! `ResourceCollection::ordered_for_generation`.

use crate::hcl::{Block, Expr};
use crate::label::LabelAllocator;
use crate::template::{RenderContext, TemplateRegistry};
use crate::warning::AssemblyWarning;
use azcanvas_model::{GlobalConfig, Resource, ResourceId, DEFAULT_LOCATION};
use azcanvas_naming::ResourceKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default `azurerm` provider constraint
pub const DEFAULT_PROVIDER_VERSION: &str = "~> 3.0";

/// Where private modules are fetched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateModuleSource {
    /// Repository address, e.g. `git::https://dev.example.com/modules.git`
    pub base: String,
    /// Git ref pinned in every source
    pub reference: String,
}

impl PrivateModuleSource {
    /// Create source
    #[must_use]
    pub fn new(base: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            reference: reference.into(),
        }
    }

    /// Module source for one resource type
    #[must_use]
    pub fn source_for(&self, type_key: &str) -> String {
        format!("{}//{type_key}?ref={}", self.base, self.reference)
    }
}

/// Assembly switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyOptions {
    /// Emit the `terraform` and `provider` blocks
    pub include_header: bool,
    /// Provider version constraint in the header
    pub provider_version: String,
    /// Emit module references instead of inline resources
    pub private_module: Option<PrivateModuleSource>,
    /// Verdict of the token validator; private modules need `true`
    pub token_valid: bool,
}

impl AssemblyOptions {
    /// Inline output with header
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Without the header blocks
    #[inline]
    #[must_use]
    pub fn without_header(mut self) -> Self {
        self.include_header = false;
        self
    }

    /// With provider version constraint
    #[inline]
    #[must_use]
    pub fn with_provider_version(mut self, version: impl Into<String>) -> Self {
        self.provider_version = version.into();
        self
    }

    /// With private module source and the token verdict gating it
    #[inline]
    #[must_use]
    pub fn with_private_module(mut self, source: PrivateModuleSource, token_valid: bool) -> Self {
        self.private_module = Some(source);
        self.token_valid = token_valid;
        self
    }

    /// Module source to emit, present only when the token was accepted
    #[must_use]
    pub fn module_source(&self) -> Option<&PrivateModuleSource> {
        self.private_module.as_ref().filter(|_| self.token_valid)
    }
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            include_header: true,
            provider_version: DEFAULT_PROVIDER_VERSION.to_string(),
            private_module: None,
            token_valid: false,
        }
    }
}

/// Assembled document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assembly {
    /// Generated Terraform
    pub code: String,
    /// Whether module references were emitted
    pub used_private_module: bool,
    /// Everything papered over, in document order
    pub warnings: Vec<AssemblyWarning>,
    /// Number of `resource` and `module` blocks emitted
    pub blocks: usize,
}

impl Assembly {
    /// Whether assembly produced no warnings
    #[inline]
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Turns resources into a Terraform document
#[derive(Debug, Default)]
pub struct CodeAssembler {
    registry: TemplateRegistry,
}

impl CodeAssembler {
    /// Assembler with the built-in templates
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembler with a custom registry
    #[must_use]
    pub fn with_registry(registry: TemplateRegistry) -> Self {
        Self { registry }
    }

    /// Template registry in use
    #[must_use]
    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Assemble a document for `resources` in the given order
    ///
    /// Never fails. Missing required values, dangling references and
    /// unknown types degrade to placeholders and are listed in
    /// [`Assembly::warnings`].
    #[must_use]
    pub fn assemble(
        &self,
        resources: &[Resource],
        global: &GlobalConfig,
        options: &AssemblyOptions,
    ) -> Assembly {
        let mut allocator = LabelAllocator::new();
        let labels: Vec<String> = resources.iter().map(|r| allocator.allocate(&r.name)).collect();

        let mut by_name: HashMap<(ResourceKind, String), String> = HashMap::new();
        let mut groups: HashMap<ResourceId, &str> = HashMap::new();
        for (resource, label) in resources.iter().zip(&labels) {
            if let Some(kind) = resource.kind() {
                by_name
                    .entry((kind, resource.name.clone()))
                    .or_insert_with(|| label.clone());
            }
            if resource.is_resource_group() {
                groups.insert(resource.id, label.as_str());
            }
        }

        let mut warnings = Vec::new();
        let module_source = options.module_source();
        if options.private_module.is_some() && module_source.is_none() {
            tracing::warn!("private module requested without a valid token; emitting inline resources");
            warnings.push(AssemblyWarning::PrivateModuleDenied);
        }

        let mut sections: Vec<String> = Vec::with_capacity(resources.len() + 2);
        if options.include_header {
            sections.extend(header(global, &options.provider_version));
        }

        let mut blocks = 0;
        for (resource, label) in resources.iter().zip(&labels) {
            let location = resource
                .config
                .location()
                .or_else(|| Some(global.location.as_str()).filter(|l| !l.is_empty()))
                .unwrap_or(DEFAULT_LOCATION);
            let resource_group = resource
                .resource_group
                .and_then(|id| groups.get(&id))
                .map(|group| Expr::reference(format!("azurerm_resource_group.{group}.name")));

            let mut ctx = RenderContext::new(resource, label, location, resource_group, &by_name)
                .with_module_references(module_source.is_some());
            let inline = self.registry.render(&mut ctx);
            warnings.extend(ctx.into_warnings());

            let (block, scope) = match module_source {
                Some(source) if !resource.is_resource_group() => (
                    module_block(&inline, label, &source.source_for(resource.type_key())),
                    format!("module.{label}.id"),
                ),
                _ => (
                    inline,
                    format!("{}.{label}.id", self.registry.terraform_type_of(resource)),
                ),
            };
            sections.push(block.render());
            blocks += 1;

            for (index, assignment) in resource
                .config
                .common()
                .map(|c| c.role_assignments.as_slice())
                .unwrap_or_default()
                .iter()
                .enumerate()
            {
                let role = Block::resource("azurerm_role_assignment", &format!("{label}_role_{}", index + 1))
                    .attr("scope", Expr::reference(scope.clone()))
                    .attr("role_definition_name", assignment.role_definition_name.as_str())
                    .attr("principal_id", assignment.principal_id.as_str());
                sections.push(role.render());
                blocks += 1;
            }
        }

        tracing::info!(
            resources = resources.len(),
            blocks,
            warnings = warnings.len(),
            private_module = module_source.is_some(),
            "assembled document"
        );

        Assembly {
            code: sections.join("\n"),
            used_private_module: module_source.is_some() && resources.iter().any(|r| !r.is_resource_group()),
            warnings,
            blocks,
        }
    }
}

fn header(global: &GlobalConfig, provider_version: &str) -> [String; 2] {
    let terraform = Block::new("terraform").block(Block::new("required_providers").attr(
        "azurerm",
        Expr::Map(vec![
            ("source".to_string(), Expr::from("hashicorp/azurerm")),
            ("version".to_string(), Expr::from(provider_version)),
        ]),
    ));
    let provider = Block::new("provider")
        .with_label("azurerm")
        .block(Block::new("features"))
        .opt_attr("subscription_id", global.subscription_id.as_deref());
    [terraform.render(), provider.render()]
}

/// Re-express an inline resource block as a module call
///
/// Top-level attributes carry over as module inputs; nested blocks do not.
fn module_block(inline: &Block, label: &str, source: &str) -> Block {
    inline.attributes().fold(
        Block::new("module").with_label(label).attr("source", source),
        |block, (key, value)| block.attr(key, value.clone()),
    )
}
