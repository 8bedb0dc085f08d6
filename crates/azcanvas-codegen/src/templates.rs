//! Built-in `azurerm` templates, one per known kind

use crate::hcl::{Block, Expr};
use crate::template::{PassthroughTemplate, RenderContext, Template};
use azcanvas_model::ResourceConfig;
use azcanvas_naming::ResourceKind;

/// Bind `$cfg` to the typed config of `$variant`, or fall back to passthrough
macro_rules! typed {
    ($ctx:ident, $variant:ident => $cfg:ident) => {
        let resource = $ctx.resource;
        let ResourceConfig::$variant($cfg) = &resource.config else {
            return PassthroughTemplate::render($ctx);
        };
    };
}

pub(crate) fn builtin() -> Vec<(ResourceKind, Box<dyn Template>)> {
    vec![
        (ResourceKind::ResourceGroup, Box::new(ResourceGroupTemplate)),
        (ResourceKind::StorageAccount, Box::new(StorageAccountTemplate)),
        (ResourceKind::KeyVault, Box::new(KeyVaultTemplate)),
        (ResourceKind::VirtualNetwork, Box::new(VirtualNetworkTemplate)),
        (ResourceKind::Subnet, Box::new(SubnetTemplate)),
        (ResourceKind::NetworkSecurityGroup, Box::new(NetworkSecurityGroupTemplate)),
        (ResourceKind::PublicIp, Box::new(PublicIpTemplate)),
        (ResourceKind::AppServicePlan, Box::new(AppServicePlanTemplate)),
        (ResourceKind::WebApp, Box::new(WebAppTemplate)),
        (ResourceKind::SqlServer, Box::new(SqlServerTemplate)),
        (ResourceKind::SqlDatabase, Box::new(SqlDatabaseTemplate)),
        (ResourceKind::ContainerRegistry, Box::new(ContainerRegistryTemplate)),
        (ResourceKind::KubernetesCluster, Box::new(KubernetesClusterTemplate)),
        (ResourceKind::LogAnalyticsWorkspace, Box::new(LogAnalyticsWorkspaceTemplate)),
    ]
}

/// `name`, `resource_group_name` and `location`, the head of most blocks
fn located(terraform_type: &str, ctx: &mut RenderContext<'_>) -> Block {
    Block::resource(terraform_type, ctx.label)
        .attr("name", ctx.name())
        .attr("resource_group_name", ctx.resource_group_name())
        .attr("location", ctx.location())
}

fn with_tags(block: Block, ctx: &RenderContext<'_>) -> Block {
    block.opt_attr("tags", ctx.tags())
}

fn or<'v>(value: Option<&'v String>, default: &'v str) -> &'v str {
    value.map_or(default, String::as_str)
}

/// `azurerm_resource_group`
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceGroupTemplate;

impl Template for ResourceGroupTemplate {
    fn terraform_type(&self) -> &'static str {
        "azurerm_resource_group"
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> Block {
        let block = Block::resource(self.terraform_type(), ctx.label)
            .attr("name", ctx.name())
            .attr("location", ctx.location());
        with_tags(block, ctx)
    }

    fn reversible_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[("location", "location")]
    }
}

/// `azurerm_storage_account`
#[derive(Debug, Clone, Copy, Default)]
pub struct StorageAccountTemplate;

impl Template for StorageAccountTemplate {
    fn terraform_type(&self) -> &'static str {
        "azurerm_storage_account"
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> Block {
        typed!(ctx, StorageAccount => cfg);
        let block = located(self.terraform_type(), ctx)
            .attr("account_tier", or(cfg.account_tier.as_ref(), "Standard"))
            .attr(
                "account_replication_type",
                or(cfg.replication_type.as_ref(), "LRS"),
            )
            .opt_attr("access_tier", cfg.access_tier.as_deref())
            .attr(
                "https_traffic_only_enabled",
                cfg.https_only.unwrap_or(true),
            )
            .attr("min_tls_version", or(cfg.min_tls_version.as_ref(), "TLS1_2"));
        with_tags(block, ctx)
    }

    fn reversible_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("location", "location"),
            ("accountTier", "account_tier"),
            ("replicationType", "account_replication_type"),
            ("accessTier", "access_tier"),
            ("httpsOnly", "https_traffic_only_enabled"),
            ("minTlsVersion", "min_tls_version"),
        ]
    }
}

/// `azurerm_key_vault`
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyVaultTemplate;

impl Template for KeyVaultTemplate {
    fn terraform_type(&self) -> &'static str {
        "azurerm_key_vault"
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> Block {
        typed!(ctx, KeyVault => cfg);
        let tenant_id = ctx.required("tenantId", cfg.tenant_id.as_deref());
        let block = located(self.terraform_type(), ctx)
            .attr("tenant_id", tenant_id)
            .attr("sku_name", or(cfg.sku_name.as_ref(), "standard"))
            .attr(
                "soft_delete_retention_days",
                cfg.soft_delete_retention_days.unwrap_or(90),
            )
            .attr(
                "purge_protection_enabled",
                cfg.purge_protection_enabled.unwrap_or(false),
            );
        with_tags(block, ctx)
    }

    fn reversible_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("location", "location"),
            ("tenantId", "tenant_id"),
            ("skuName", "sku_name"),
            ("softDeleteRetentionDays", "soft_delete_retention_days"),
            ("purgeProtectionEnabled", "purge_protection_enabled"),
        ]
    }
}

/// `azurerm_virtual_network`
#[derive(Debug, Clone, Copy, Default)]
pub struct VirtualNetworkTemplate;

impl Template for VirtualNetworkTemplate {
    fn terraform_type(&self) -> &'static str {
        "azurerm_virtual_network"
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> Block {
        typed!(ctx, VirtualNetwork => cfg);
        let address_space = if cfg.address_space.is_empty() {
            Expr::strings(&["10.0.0.0/16"])
        } else {
            Expr::strings(&cfg.address_space)
        };
        let dns_servers = (!cfg.dns_servers.is_empty()).then(|| Expr::strings(&cfg.dns_servers));
        let block = located(self.terraform_type(), ctx)
            .attr("address_space", address_space)
            .opt_attr("dns_servers", dns_servers);
        with_tags(block, ctx)
    }

    fn reversible_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[("location", "location")]
    }
}

/// `azurerm_subnet`
#[derive(Debug, Clone, Copy, Default)]
pub struct SubnetTemplate;

impl Template for SubnetTemplate {
    fn terraform_type(&self) -> &'static str {
        "azurerm_subnet"
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> Block {
        typed!(ctx, Subnet => cfg);
        let virtual_network = ctx.reference(
            ResourceKind::VirtualNetwork,
            "azurerm_virtual_network",
            "name",
            "virtualNetworkName",
            cfg.virtual_network_name.as_deref(),
        );
        let prefixes = if cfg.address_prefixes.is_empty() {
            Expr::strings(&["10.0.1.0/24"])
        } else {
            Expr::strings(&cfg.address_prefixes)
        };
        Block::resource(self.terraform_type(), ctx.label)
            .attr("name", ctx.name())
            .attr("resource_group_name", ctx.resource_group_name())
            .attr("virtual_network_name", virtual_network)
            .attr("address_prefixes", prefixes)
    }
}

/// `azurerm_network_security_group`
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkSecurityGroupTemplate;

impl Template for NetworkSecurityGroupTemplate {
    fn terraform_type(&self) -> &'static str {
        "azurerm_network_security_group"
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> Block {
        typed!(ctx, NetworkSecurityGroup => cfg);
        let block = cfg.security_rules.iter().fold(
            located(self.terraform_type(), ctx),
            |block, rule| {
                block.block(
                    Block::new("security_rule")
                        .attr("name", rule.name.as_str())
                        .attr("priority", rule.priority)
                        .attr("direction", rule.direction.as_str())
                        .attr("access", rule.access.as_str())
                        .attr("protocol", rule.protocol.as_str())
                        .attr("source_port_range", "*")
                        .attr("destination_port_range", rule.destination_port_range.as_str())
                        .attr("source_address_prefix", rule.source_address_prefix.as_str())
                        .attr("destination_address_prefix", "*"),
                )
            },
        );
        with_tags(block, ctx)
    }

    fn reversible_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[("location", "location")]
    }
}

/// `azurerm_public_ip`
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicIpTemplate;

impl Template for PublicIpTemplate {
    fn terraform_type(&self) -> &'static str {
        "azurerm_public_ip"
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> Block {
        typed!(ctx, PublicIp => cfg);
        let block = located(self.terraform_type(), ctx)
            .attr("allocation_method", or(cfg.allocation_method.as_ref(), "Static"))
            .attr("sku", or(cfg.sku.as_ref(), "Standard"));
        with_tags(block, ctx)
    }

    fn reversible_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("location", "location"),
            ("allocationMethod", "allocation_method"),
            ("sku", "sku"),
        ]
    }
}

/// `azurerm_service_plan`
#[derive(Debug, Clone, Copy, Default)]
pub struct AppServicePlanTemplate;

impl Template for AppServicePlanTemplate {
    fn terraform_type(&self) -> &'static str {
        "azurerm_service_plan"
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> Block {
        typed!(ctx, AppServicePlan => cfg);
        let block = located(self.terraform_type(), ctx)
            .attr("os_type", or(cfg.os_type.as_ref(), "Linux"))
            .attr("sku_name", or(cfg.sku_name.as_ref(), "B1"));
        with_tags(block, ctx)
    }

    fn reversible_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("location", "location"),
            ("osType", "os_type"),
            ("skuName", "sku_name"),
        ]
    }
}

/// `azurerm_linux_web_app`
#[derive(Debug, Clone, Copy, Default)]
pub struct WebAppTemplate;

impl WebAppTemplate {
    fn application_stack(stack: &str, version: Option<&str>) -> Option<Block> {
        let (attribute, default) = match stack.to_ascii_lowercase().as_str() {
            "node" => ("node_version", "18-lts"),
            "python" => ("python_version", "3.11"),
            "dotnet" => ("dotnet_version", "8.0"),
            "java" => ("java_version", "17"),
            "php" => ("php_version", "8.2"),
            _ => return None,
        };
        Some(Block::new("application_stack").attr(attribute, version.unwrap_or(default)))
    }
}

impl Template for WebAppTemplate {
    fn terraform_type(&self) -> &'static str {
        "azurerm_linux_web_app"
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> Block {
        typed!(ctx, WebApp => cfg);
        let plan = ctx.reference(
            ResourceKind::AppServicePlan,
            "azurerm_service_plan",
            "id",
            "servicePlanName",
            cfg.service_plan_name.as_deref(),
        );

        let stack = or(cfg.runtime_stack.as_ref(), "node");
        let mut site_config =
            Block::new("site_config").attr("always_on", cfg.always_on.unwrap_or(true));
        site_config = match Self::application_stack(stack, cfg.runtime_version.as_deref()) {
            Some(block) => site_config.block(block),
            None => site_config.comment(format!("unsupported runtime stack '{stack}'")),
        };

        let app_settings = (!cfg.app_settings.is_empty()).then(|| {
            Expr::Map(
                cfg.app_settings
                    .iter()
                    .map(|(k, v)| (k.clone(), Expr::Str(v.clone())))
                    .collect(),
            )
        });

        let block = located(self.terraform_type(), ctx)
            .attr("service_plan_id", plan)
            .attr("https_only", cfg.https_only.unwrap_or(true))
            .opt_attr("app_settings", app_settings)
            .block(site_config);
        with_tags(block, ctx)
    }

    fn reversible_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[("location", "location"), ("httpsOnly", "https_only")]
    }
}

/// `azurerm_mssql_server`
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerTemplate;

impl Template for SqlServerTemplate {
    fn terraform_type(&self) -> &'static str {
        "azurerm_mssql_server"
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> Block {
        typed!(ctx, SqlServer => cfg);
        let login = ctx.required("administratorLogin", cfg.administrator_login.as_deref());
        let password = ctx.required(
            "administratorPassword",
            cfg.administrator_password.as_deref(),
        );
        let block = located(self.terraform_type(), ctx)
            .attr("version", or(cfg.version.as_ref(), "12.0"))
            .attr("administrator_login", login)
            .attr("administrator_login_password", password);
        with_tags(block, ctx)
    }

    fn reversible_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("location", "location"),
            ("version", "version"),
            ("administratorLogin", "administrator_login"),
            ("administratorPassword", "administrator_login_password"),
        ]
    }
}

/// `azurerm_mssql_database`
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlDatabaseTemplate;

impl Template for SqlDatabaseTemplate {
    fn terraform_type(&self) -> &'static str {
        "azurerm_mssql_database"
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> Block {
        typed!(ctx, SqlDatabase => cfg);
        let server = ctx.reference(
            ResourceKind::SqlServer,
            "azurerm_mssql_server",
            "id",
            "serverName",
            cfg.server_name.as_deref(),
        );
        let block = Block::resource(self.terraform_type(), ctx.label)
            .attr("name", ctx.name())
            .attr("server_id", server)
            .attr(
                "collation",
                or(cfg.collation.as_ref(), "SQL_Latin1_General_CP1_CI_AS"),
            )
            .attr("sku_name", or(cfg.sku_name.as_ref(), "S0"))
            .opt_attr("max_size_gb", cfg.max_size_gb);
        with_tags(block, ctx)
    }

    fn reversible_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("collation", "collation"),
            ("skuName", "sku_name"),
            ("maxSizeGb", "max_size_gb"),
        ]
    }
}

/// `azurerm_container_registry`
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerRegistryTemplate;

impl Template for ContainerRegistryTemplate {
    fn terraform_type(&self) -> &'static str {
        "azurerm_container_registry"
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> Block {
        typed!(ctx, ContainerRegistry => cfg);
        let block = located(self.terraform_type(), ctx)
            .attr("sku", or(cfg.sku.as_ref(), "Basic"))
            .attr("admin_enabled", cfg.admin_enabled.unwrap_or(false));
        with_tags(block, ctx)
    }

    fn reversible_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("location", "location"),
            ("sku", "sku"),
            ("adminEnabled", "admin_enabled"),
        ]
    }
}

/// `azurerm_kubernetes_cluster`
#[derive(Debug, Clone, Copy, Default)]
pub struct KubernetesClusterTemplate;

impl Template for KubernetesClusterTemplate {
    fn terraform_type(&self) -> &'static str {
        "azurerm_kubernetes_cluster"
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> Block {
        let owner = ctx.resource;
        typed!(ctx, KubernetesCluster => cfg);
        let dns_prefix = or(cfg.dns_prefix.as_ref(), &owner.name);
        let node_pool = Block::new("default_node_pool")
            .attr("name", "default")
            .attr("node_count", cfg.node_count.unwrap_or(1))
            .attr("vm_size", or(cfg.vm_size.as_ref(), "Standard_D2s_v3"));
        let block = located(self.terraform_type(), ctx)
            .attr("dns_prefix", dns_prefix)
            .opt_attr("kubernetes_version", cfg.kubernetes_version.as_deref())
            .block(node_pool)
            .block(Block::new("identity").attr("type", "SystemAssigned"));
        with_tags(block, ctx)
    }

    fn reversible_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("location", "location"),
            ("dnsPrefix", "dns_prefix"),
            ("kubernetesVersion", "kubernetes_version"),
        ]
    }
}

/// `azurerm_log_analytics_workspace`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAnalyticsWorkspaceTemplate;

impl Template for LogAnalyticsWorkspaceTemplate {
    fn terraform_type(&self) -> &'static str {
        "azurerm_log_analytics_workspace"
    }

    fn render(&self, ctx: &mut RenderContext<'_>) -> Block {
        typed!(ctx, LogAnalyticsWorkspace => cfg);
        let block = located(self.terraform_type(), ctx)
            .attr("sku", or(cfg.sku.as_ref(), "PerGB2018"))
            .attr("retention_in_days", cfg.retention_in_days.unwrap_or(30));
        with_tags(block, ctx)
    }

    fn reversible_fields(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("location", "location"),
            ("sku", "sku"),
            ("retentionInDays", "retention_in_days"),
        ]
    }
}
