use azcanvas_naming::prelude::*;
use azcanvas_naming::{NameViolation, NamingRule};
use proptest::prelude::*;

fn rule(kind: ResourceKind) -> &'static NamingRule {
    NamingRuleTable::azure()
        .rule_for(kind)
        .expect("every kind has a rule")
}

fn any_kind() -> impl Strategy<Value = ResourceKind> {
    proptest::sample::select(ResourceKind::ALL.to_vec())
}

fn lowercase_only_kind() -> impl Strategy<Value = ResourceKind> {
    let kinds: Vec<_> = ResourceKind::ALL
        .into_iter()
        .filter(|k| rule(*k).case_sensitive)
        .collect();
    proptest::sample::select(kinds)
}

#[test]
fn storage_account_rejects_uppercase() {
    let result = NameValidator::azure().validate("storage_account", "MyStorage1");
    assert!(!result.is_valid());
    assert!(result.errors.contains(&NameViolation::NotLowercase));
}

#[test]
fn storage_account_suggestion_is_valid() {
    let ctx = NamingContext::new("proj", "dev", "eastus");
    assert_eq!(
        NameSuggester::azure().suggest("storage_account", 1, &ctx),
        "stprojdev01"
    );
}

#[test]
fn key_vault_suggestion_is_valid() {
    let ctx = NamingContext::new("inid", "dev", "eastus");
    assert_eq!(
        NameSuggester::azure().suggest("key_vault", 2, &ctx),
        "kv-inid-dev-eastus-02"
    );
}

#[test]
fn suggestions_for_default_context_are_fully_valid() {
    let ctx = NamingContext::default();
    for kind in ResourceKind::ALL {
        let (name, result) = NameSuggester::azure().suggest_validated(kind.as_str(), 1, &ctx);
        assert!(result.is_valid(), "{kind}: '{name}' -> {:?}", result.errors);
    }
}

proptest! {
    #[test]
    fn prop_shorter_than_minimum_is_invalid(kind in any_kind(), seed in 0usize..100) {
        let min = rule(kind).min_length;
        let len = seed % min;
        let candidate = "a".repeat(len);

        let result = NameValidator::azure().validate_kind(kind, &candidate);
        prop_assert!(!result.is_valid());
        prop_assert!(result.errors.iter().any(|e| matches!(e, NameViolation::TooShort { .. })), "expected a TooShort violation");
        prop_assert!(result.error_messages().iter().any(|m| m.contains("minimum length")));
    }

    #[test]
    fn prop_longer_than_maximum_is_invalid(kind in any_kind(), extra in 1usize..20) {
        let max = rule(kind).max_length;
        let candidate = "a".repeat(max + extra);

        let result = NameValidator::azure().validate_kind(kind, &candidate);
        prop_assert!(!result.is_valid());
        prop_assert!(result.errors.iter().any(|e| matches!(e, NameViolation::TooLong { .. })), "expected a TooLong violation");
        prop_assert!(result.error_messages().iter().any(|m| m.contains("maximum length")));
    }

    #[test]
    fn prop_uppercase_rejected_for_lowercase_kinds(
        kind in lowercase_only_kind(),
        candidate in "[a-z0-9]{0,6}[A-Z][a-z0-9]{0,6}",
    ) {
        let result = NameValidator::azure().validate_kind(kind, &candidate);
        prop_assert!(!result.is_valid());
    }

    #[test]
    fn prop_suggestions_fit_length_budget(
        kind in any_kind(),
        ordinal in 1u32..=99,
        project in "[a-z]{1,4}",
        environment in proptest::sample::select(vec!["dev", "test", "qa", "prod"]),
    ) {
        let ctx = NamingContext::new(project, environment, "eastus");
        let (name, result) = NameSuggester::azure().suggest_validated(kind.as_str(), ordinal, &ctx);
        prop_assert!(!result.has_length_error(), "{}: '{}' -> {:?}", kind, name, result.errors);
    }

    #[test]
    fn prop_unknown_types_never_error(candidate in ".{0,40}") {
        let result = NameValidator::azure().validate("not_a_real_type", &candidate);
        prop_assert!(result.is_valid());
        prop_assert!(result.warnings.is_empty());
    }
}
