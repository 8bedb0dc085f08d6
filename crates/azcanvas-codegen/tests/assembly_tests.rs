use azcanvas_codegen::prelude::*;
use azcanvas_codegen::BlockKind;
use azcanvas_model::prelude::*;
use azcanvas_naming::ResourceKind;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};

fn resource(type_key: &str, name: &str, config: Value) -> Resource {
    Resource::new(name, ResourceConfig::from_parts(type_key, config).unwrap())
}

fn assemble(resources: &[Resource]) -> Assembly {
    CodeAssembler::new().assemble(resources, &GlobalConfig::new(), &AssemblyOptions::new())
}

fn zone_canvas(zone: &str) -> ResourceCollection {
    let global = GlobalConfig::new().with_project("demo");
    let mut canvas = ResourceCollection::new();
    let members = LandingZoneCatalog::builtin()
        .unwrap()
        .get(zone)
        .unwrap()
        .instantiate(&ResourceFactory::new(&global), &canvas, Position::default())
        .unwrap();
    for member in members {
        canvas.insert(member);
    }
    canvas
}

#[test]
fn single_resource_group_renders_name_and_location() {
    let assembly = assemble(&[resource(
        "resource_group",
        "app-rg",
        json!({"location": "East US"}),
    )]);

    let blocks = parse_document(&assembly.code).unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].str_attr("name"), Some("app-rg"));
    assert_eq!(blocks[0].str_attr("location"), Some("East US"));
    assert!(assembly.code.contains("app-rg"));
    assert!(assembly.code.contains("East US"));
}

#[test]
fn unknown_type_goes_through_passthrough() {
    let assembly = assemble(&[resource(
        "cosmos_db",
        "cosmos-1",
        json!({"throughput": 400, "location": "West US"}),
    )]);

    let blocks = parse_document(&assembly.code).unwrap();
    assert_eq!(blocks[0].terraform_type.as_deref(), Some("azurerm_cosmos_db"));
    assert_eq!(blocks[0].attributes.get("throughput"), Some(&json!(400)));
    assert_eq!(blocks[0].str_attr("location"), Some("West US"));
    assert!(assembly.code.contains("# unrecognised resource type"));
    assert!(matches!(
        assembly.warnings.as_slice(),
        [AssemblyWarning::UnknownType { type_key, .. }] if type_key == "cosmos_db"
    ));
}

#[test]
fn missing_required_fields_do_not_abort() {
    let resources = vec![
        resource("sql_server", "sql-a", json!({})),
        resource("storage_account", "sta", json!({})),
    ];
    let assembly = assemble(&resources);

    assert_eq!(assembly.blocks, 2);
    let missing: Vec<_> = assembly
        .warnings
        .iter()
        .filter_map(|w| match w {
            AssemblyWarning::MissingField { field, .. } => Some(*field),
            _ => None,
        })
        .collect();
    assert_eq!(missing, vec!["administratorLogin", "administratorPassword"]);
}

#[test]
fn landing_zones_assemble_and_parse() {
    for zone in ["basic-web", "aks-baseline", "data-platform"] {
        let canvas = zone_canvas(zone);
        let ordered = canvas.ordered_for_generation();
        let assembly =
            CodeAssembler::new().assemble(&ordered, &GlobalConfig::new(), &AssemblyOptions::new());

        let blocks = parse_document(&assembly.code).unwrap();
        assert_eq!(blocks.len(), canvas.len(), "{zone}");
        assert_eq!(assembly.blocks, canvas.len(), "{zone}");
        assert!(
            !assembly
                .warnings
                .iter()
                .any(|w| matches!(w, AssemblyWarning::UnresolvedResourceGroup { .. })),
            "{zone}: {:?}",
            assembly.warnings
        );
    }
}

#[test]
fn basic_web_links_plan_by_reference() {
    let canvas = zone_canvas("basic-web");
    let assembly = CodeAssembler::new().assemble(
        &canvas.ordered_for_generation(),
        &GlobalConfig::new(),
        &AssemblyOptions::new(),
    );
    let plan_label = canvas
        .iter()
        .find(|r| r.kind() == Some(ResourceKind::AppServicePlan))
        .unwrap()
        .name
        .replace('-', "_");
    assert!(assembly
        .code
        .contains(&format!("= azurerm_service_plan.{plan_label}.id")));
}

#[test]
fn module_mode_parses_back_as_modules() {
    let canvas = zone_canvas("data-platform");
    let options = AssemblyOptions::new().with_private_module(
        PrivateModuleSource::new("git::https://example.com/modules.git", "v2"),
        true,
    );
    let assembly =
        CodeAssembler::new().assemble(&canvas.ordered_for_generation(), &GlobalConfig::new(), &options);

    assert!(assembly.used_private_module);
    let blocks = parse_document(&assembly.code).unwrap();
    let modules = blocks.iter().filter(|b| b.kind == BlockKind::Module).count();
    assert_eq!(modules, canvas.len() - 1);
    assert!(blocks
        .iter()
        .filter(|b| b.kind == BlockKind::Module)
        .all(|b| b.str_attr("source").is_some_and(|s| s.ends_with("?ref=v2"))));
    assert!(assembly
        .code
        .lines()
        .any(|l| l.trim_start().starts_with("server_id") && l.contains("= module.")));
    assert!(!assembly.code.contains("azurerm_mssql_server."));
}

#[test]
fn content_hash_is_stable_for_same_input() {
    let canvas = zone_canvas("aks-baseline");
    let resources: Vec<_> = canvas.iter().cloned().collect();
    let global = GlobalConfig::new();
    assert_eq!(
        content_hash(&resources, &global).unwrap(),
        content_hash(&resources, &global).unwrap()
    );
}

fn text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 _.\"\\\\-]{1,16}"
}

proptest! {
    #[test]
    fn reversible_fields_round_trip(
        location in text(),
        tier in text(),
        replication in text(),
        https_only in any::<bool>(),
        tenant in text(),
        retention in 7u32..=90,
    ) {
        let resources = vec![
            resource(
                "storage_account",
                "st",
                json!({
                    "location": location,
                    "accountTier": tier,
                    "replicationType": replication,
                    "httpsOnly": https_only,
                }),
            ),
            resource(
                "key_vault",
                "kv",
                json!({"tenantId": tenant, "softDeleteRetentionDays": retention}),
            ),
        ];
        let assembler = CodeAssembler::new();
        let assembly = assembler.assemble(&resources, &GlobalConfig::new(), &AssemblyOptions::new());
        let blocks = parse_document(&assembly.code).unwrap();
        prop_assert_eq!(blocks.len(), resources.len());

        for (original, block) in resources.iter().zip(&blocks) {
            prop_assert_eq!(block.str_attr("name"), Some(original.name.as_str()));
            let (kind, recovered) = assembler.registry().recover(block).unwrap();
            prop_assert_eq!(Some(kind), original.kind());

            let Value::Object(fields) = original.config.to_value() else {
                panic!("typed config encodes as an object");
            };
            for (key, value) in fields {
                prop_assert_eq!(recovered.get(&key), Some(&value), "{}", key);
            }
        }
    }
}

/// Config for `kind` with every reversible field set
fn reversible_sample(kind: ResourceKind, s: &str, flag: bool, n: u32) -> Value {
    match kind {
        ResourceKind::ResourceGroup
        | ResourceKind::VirtualNetwork
        | ResourceKind::NetworkSecurityGroup => json!({"location": s}),
        ResourceKind::Subnet => json!({}),
        ResourceKind::StorageAccount => json!({
            "location": s,
            "accountTier": s,
            "replicationType": s,
            "accessTier": s,
            "httpsOnly": flag,
            "minTlsVersion": s,
        }),
        ResourceKind::KeyVault => json!({
            "location": s,
            "tenantId": s,
            "skuName": s,
            "softDeleteRetentionDays": n,
            "purgeProtectionEnabled": flag,
        }),
        ResourceKind::PublicIp => json!({"location": s, "allocationMethod": s, "sku": s}),
        ResourceKind::AppServicePlan => json!({"location": s, "osType": s, "skuName": s}),
        ResourceKind::WebApp => json!({"location": s, "httpsOnly": flag}),
        ResourceKind::SqlServer => json!({
            "location": s,
            "version": s,
            "administratorLogin": s,
            "administratorPassword": s,
        }),
        ResourceKind::SqlDatabase => json!({"collation": s, "skuName": s, "maxSizeGb": n}),
        ResourceKind::ContainerRegistry => json!({"location": s, "sku": s, "adminEnabled": flag}),
        ResourceKind::KubernetesCluster => {
            json!({"location": s, "dnsPrefix": s, "kubernetesVersion": s})
        }
        ResourceKind::LogAnalyticsWorkspace => {
            json!({"location": s, "sku": s, "retentionInDays": n})
        }
    }
}

proptest! {
    #[test]
    fn every_kind_recovers_its_reversible_fields(
        kind in proptest::sample::select(ResourceKind::ALL.to_vec()),
        value in text(),
        flag in any::<bool>(),
        n in 1u32..=730,
    ) {
        let original = resource(kind.as_str(), "res-1", reversible_sample(kind, &value, flag, n));
        let assembler = CodeAssembler::new();
        let assembly = assembler.assemble(
            std::slice::from_ref(&original),
            &GlobalConfig::new(),
            &AssemblyOptions::new(),
        );
        let blocks = parse_document(&assembly.code).unwrap();
        prop_assert_eq!(blocks.len(), 1);

        let template = assembler.registry().get(kind).unwrap();
        let (recovered_kind, recovered) = assembler.registry().recover(&blocks[0]).unwrap();
        prop_assert_eq!(recovered_kind, kind);

        let sample = original.config.to_value();
        for (key, attribute) in template.reversible_fields() {
            let expected = sample.get(*key);
            prop_assert!(expected.is_some_and(|v| !v.is_null()), "{} has no sample for {}", kind, key);
            prop_assert_eq!(recovered.get(*key), expected, "{} -> {}", key, attribute);
        }
    }
}
