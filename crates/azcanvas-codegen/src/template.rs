//! Per-kind templates and the registry that selects them

use crate::hcl::{Block, Expr};
use crate::reverse::ParsedBlock;
use crate::templates;
use crate::warning::AssemblyWarning;
use azcanvas_model::{Resource, ResourceConfig};
use azcanvas_naming::ResourceKind;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Everything a template may read while rendering one resource
#[derive(Debug)]
pub struct RenderContext<'a> {
    /// Resource being rendered
    pub resource: &'a Resource,
    /// Terraform local name allocated for it
    pub label: &'a str,
    /// Effective location after defaults
    pub location: &'a str,
    resource_group: Option<Expr>,
    labels: &'a HashMap<(ResourceKind, String), String>,
    module_references: bool,
    warnings: Vec<AssemblyWarning>,
}

impl<'a> RenderContext<'a> {
    /// Create context
    ///
    /// `labels` maps `(kind, resource name)` to the label of the first
    /// resource on the canvas with that name.
    #[must_use]
    pub fn new(
        resource: &'a Resource,
        label: &'a str,
        location: &'a str,
        resource_group: Option<Expr>,
        labels: &'a HashMap<(ResourceKind, String), String>,
    ) -> Self {
        Self {
            resource,
            label,
            location,
            resource_group,
            labels,
            module_references: false,
            warnings: Vec::new(),
        }
    }

    /// Point cross-resource references at module outputs instead of resources
    #[inline]
    #[must_use]
    pub fn with_module_references(mut self, enabled: bool) -> Self {
        self.module_references = enabled;
        self
    }

    /// Resource name literal
    #[must_use]
    pub fn name(&self) -> Expr {
        Expr::Str(self.resource.name.clone())
    }

    /// Location literal
    #[must_use]
    pub fn location(&self) -> Expr {
        Expr::Str(self.location.to_string())
    }

    /// Reference to the owning resource group's name
    ///
    /// Emits an empty string and records a warning when unresolved.
    pub fn resource_group_name(&mut self) -> Expr {
        if let Some(expr) = &self.resource_group {
            return expr.clone();
        }
        self.warnings.push(AssemblyWarning::UnresolvedResourceGroup {
            resource: self.resource.name.clone(),
        });
        Expr::Str(String::new())
    }

    /// Resource-group reference only if it resolved
    #[must_use]
    pub fn resource_group_if_resolved(&self) -> Option<Expr> {
        self.resource_group.clone()
    }

    /// Value of a required string field, or an empty placeholder plus a warning
    pub fn required(&mut self, field: &'static str, value: Option<&str>) -> Expr {
        match value {
            Some(value) if !value.is_empty() => Expr::Str(value.to_string()),
            _ => {
                self.warnings.push(AssemblyWarning::MissingField {
                    resource: self.resource.name.clone(),
                    field,
                });
                Expr::Str(String::new())
            }
        }
    }

    /// Reference to another canvas resource named by a config field
    ///
    /// Resolves to `<terraform_type>.<label>.<attribute>` (or
    /// `module.<label>.<attribute>`) when a resource of `kind` with that name
    /// is on the canvas. Otherwise `name` attributes
    /// fall back to the literal name; anything else becomes an empty
    /// placeholder with a warning.
    pub fn reference(
        &mut self,
        kind: ResourceKind,
        terraform_type: &str,
        attribute: &str,
        field: &'static str,
        target: Option<&str>,
    ) -> Expr {
        let Some(target) = target.filter(|t| !t.is_empty()) else {
            return self.required(field, None);
        };
        if let Some(label) = self.labels.get(&(kind, target.to_string())) {
            return if self.module_references && !kind.is_resource_group() {
                Expr::reference(format!("module.{label}.{attribute}"))
            } else {
                Expr::reference(format!("{terraform_type}.{label}.{attribute}"))
            };
        }
        if attribute == "name" {
            return Expr::Str(target.to_string());
        }
        self.warnings.push(AssemblyWarning::UnresolvedReference {
            resource: self.resource.name.clone(),
            field,
            target: target.to_string(),
        });
        Expr::Str(String::new())
    }

    /// Tags as an object, `None` when empty
    #[must_use]
    pub fn tags(&self) -> Option<Expr> {
        let tags = &self.resource.config.common()?.tags;
        if tags.is_empty() {
            return None;
        }
        Some(Expr::Map(
            tags.iter()
                .map(|(k, v)| (k.clone(), Expr::Str(v.clone())))
                .collect(),
        ))
    }

    /// Record a warning
    pub fn warn(&mut self, warning: AssemblyWarning) {
        self.warnings.push(warning);
    }

    /// Warnings recorded so far
    #[must_use]
    pub fn into_warnings(self) -> Vec<AssemblyWarning> {
        self.warnings
    }
}

/// Renders one kind of resource as a Terraform block
pub trait Template: Send + Sync {
    /// `azurerm_*` resource type this template emits
    fn terraform_type(&self) -> &'static str;

    /// Render the resource block
    ///
    /// Must not fail: missing required values become placeholders and are
    /// reported through the context.
    fn render(&self, ctx: &mut RenderContext<'_>) -> Block;

    /// `(config key, attribute)` pairs emitted verbatim from config, so they
    /// can be read back out of generated text
    fn reversible_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }
}

/// Attributes the passthrough template writes itself
const RESERVED_ATTRIBUTES: [&str; 4] = ["name", "resource_group_name", "location", "tags"];

/// Template for types outside the known set
///
/// Emits `resource "azurerm_<type>"` with the name, location and every
/// scalar config field as an attribute (camelCase keys become snake_case).
/// Fields that collide with a reserved attribute are dropped; fields whose
/// key is not an HCL identifier are dropped with a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTemplate;

impl PassthroughTemplate {
    /// Render any resource generically
    pub fn render(ctx: &mut RenderContext<'_>) -> Block {
        let resource = ctx.resource;
        let type_key = resource.type_key();
        ctx.warn(AssemblyWarning::UnknownType {
            resource: resource.name.clone(),
            type_key: type_key.to_string(),
        });

        let fields = match &resource.config {
            ResourceConfig::Other(other) => other.fields.clone(),
            typed => match typed.to_value() {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        };
        let tags = fields.get("tags").and_then(Value::as_object).and_then(|tags| {
            let entries: Vec<(String, Expr)> = tags
                .iter()
                .filter_map(|(k, v)| Some((k.clone(), Expr::Str(v.as_str()?.to_string()))))
                .collect();
            (!entries.is_empty()).then_some(Expr::Map(entries))
        });

        let mut block = Block::resource(&format!("azurerm_{type_key}"), ctx.label)
            .comment("unrecognised resource type")
            .attr("name", ctx.name())
            .opt_attr("resource_group_name", ctx.resource_group_if_resolved())
            .attr("location", ctx.location())
            .opt_attr("tags", tags);
        for (key, value) in fields {
            let attribute = snake_case(&key);
            if RESERVED_ATTRIBUTES.contains(&attribute.as_str()) {
                continue;
            }
            let expr = match value {
                Value::String(s) => Expr::Str(s),
                Value::Bool(b) => Expr::Bool(b),
                Value::Number(n) => Expr::Number(n),
                _ => continue,
            };
            if !is_identifier(&attribute) {
                ctx.warn(AssemblyWarning::SkippedField {
                    resource: resource.name.clone(),
                    field: key,
                });
                continue;
            }
            block = block.attr(attribute, expr);
        }
        block
    }
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Maps resource kinds to their templates
pub struct TemplateRegistry {
    templates: HashMap<ResourceKind, Box<dyn Template>>,
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("kinds", &self.templates.len())
            .finish()
    }
}

impl TemplateRegistry {
    /// Registry with no templates; every resource goes through passthrough
    #[must_use]
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Registry with a built-in template for every known kind
    #[must_use]
    pub fn builtin() -> Self {
        templates::builtin()
            .into_iter()
            .fold(Self::empty(), |registry, (kind, template)| {
                registry.with_template(kind, template)
            })
    }

    /// With a template for `kind`, replacing any existing one
    #[must_use]
    pub fn with_template(mut self, kind: ResourceKind, template: Box<dyn Template>) -> Self {
        self.templates.insert(kind, template);
        self
    }

    /// Template for a kind
    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> Option<&dyn Template> {
        self.templates.get(&kind).map(AsRef::as_ref)
    }

    /// Render one resource with its template, or passthrough
    pub fn render(&self, ctx: &mut RenderContext<'_>) -> Block {
        match ctx.resource.kind().and_then(|kind| self.get(kind)) {
            Some(template) => template.render(ctx),
            None => PassthroughTemplate::render(ctx),
        }
    }

    /// Terraform type a resource renders as
    #[must_use]
    pub fn terraform_type_of(&self, resource: &Resource) -> String {
        match resource.kind().and_then(|kind| self.get(kind)) {
            Some(template) => template.terraform_type().to_string(),
            None => format!("azurerm_{}", resource.type_key()),
        }
    }

    /// Recover the reversible config fields of a parsed `resource` block
    ///
    /// Returns `None` for blocks no template emits.
    #[must_use]
    pub fn recover(&self, block: &ParsedBlock) -> Option<(ResourceKind, Map<String, Value>)> {
        let terraform_type = block.terraform_type.as_deref()?;
        let (kind, template) = self
            .templates
            .iter()
            .find(|(_, t)| t.terraform_type() == terraform_type)?;

        let config = template
            .reversible_fields()
            .iter()
            .filter_map(|(key, attribute)| {
                block
                    .attributes
                    .get(*attribute)
                    .map(|value| ((*key).to_string(), value.clone()))
            })
            .collect();
        Some((*kind, config))
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
