//! Naming rule table
//!
//! Static per-type metadata constraining legal names. The table is built
//! once on first use and never mutated; lookups are by type key.

use crate::kind::ResourceKind;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Allowed-character predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CharClass {
    /// `a-z0-9`
    LowerAlphanumeric,
    /// `a-z0-9-`
    LowerAlphanumericHyphen,
    /// `A-Za-z0-9-`
    AlphanumericHyphen,
    /// `A-Za-z0-9-_`
    AlphanumericHyphenUnderscore,
    /// `A-Za-z0-9-_.`
    AlphanumericHyphenUnderscorePeriod,
    /// `A-Za-z0-9-_.()`
    ResourceGroup,
    /// Any printable character
    Printable,
}

impl CharClass {
    /// Test a single character
    #[must_use]
    pub fn allows(&self, c: char) -> bool {
        match self {
            CharClass::LowerAlphanumeric => c.is_ascii_lowercase() || c.is_ascii_digit(),
            CharClass::LowerAlphanumericHyphen => {
                c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'
            }
            CharClass::AlphanumericHyphen => c.is_ascii_alphanumeric() || c == '-',
            CharClass::AlphanumericHyphenUnderscore => {
                c.is_ascii_alphanumeric() || c == '-' || c == '_'
            }
            CharClass::AlphanumericHyphenUnderscorePeriod => {
                c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
            }
            CharClass::ResourceGroup => {
                c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '(' | ')')
            }
            CharClass::Printable => !c.is_control(),
        }
    }

    /// Test every character of a candidate
    #[inline]
    #[must_use]
    pub fn allows_all(&self, candidate: &str) -> bool {
        candidate.chars().all(|c| self.allows(c))
    }

    /// Whether `-` is a legal character
    #[inline]
    #[must_use]
    pub fn allows_hyphen(&self) -> bool {
        self.allows('-')
    }

    /// Short description used in error messages
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            CharClass::LowerAlphanumeric => "lowercase letters and numbers",
            CharClass::LowerAlphanumericHyphen => "lowercase letters, numbers and hyphens",
            CharClass::AlphanumericHyphen => "letters, numbers and hyphens",
            CharClass::AlphanumericHyphenUnderscore => "letters, numbers, hyphens and underscores",
            CharClass::AlphanumericHyphenUnderscorePeriod => {
                "letters, numbers, hyphens, underscores and periods"
            }
            CharClass::ResourceGroup => {
                "letters, numbers, hyphens, underscores, periods and parentheses"
            }
            CharClass::Printable => "printable characters",
        }
    }
}

/// Scope in which a name must be unique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Uniqueness {
    /// Unique across the whole platform (becomes part of a public DNS name)
    Global,
    /// Unique within the parent resource or resource group
    Container,
}

impl Uniqueness {
    /// Phrase used in the advisory warning
    #[must_use]
    pub fn phrase(&self) -> &'static str {
        match self {
            Uniqueness::Global => "globally unique across the platform",
            Uniqueness::Container => "unique within its container",
        }
    }
}

/// Naming constraints for one resource type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamingRule {
    /// Short code used as the first token of suggested names
    pub short_code: &'static str,
    /// Inclusive lower length bound
    pub min_length: usize,
    /// Inclusive upper length bound
    pub max_length: usize,
    /// Allowed-character predicate
    pub allowed_chars: CharClass,
    /// Candidate must equal its lowercase form
    pub case_sensitive: bool,
    /// Uniqueness scope surfaced as a warning
    pub uniqueness: Uniqueness,
    /// Suggested names are concatenated without separators
    pub special_format: bool,
    /// Prefixes that may not start a name
    pub forbidden_prefixes: &'static [&'static str],
    /// Suffixes that may not end a name
    pub forbidden_suffixes: &'static [&'static str],
    /// Substrings that may not appear anywhere
    pub forbidden_substrings: &'static [&'static str],
}

impl NamingRule {
    /// Rule applied to types missing from the table
    #[must_use]
    pub const fn permissive() -> Self {
        Self {
            short_code: "",
            min_length: 1,
            max_length: 256,
            allowed_chars: CharClass::Printable,
            case_sensitive: false,
            uniqueness: Uniqueness::Container,
            special_format: false,
            forbidden_prefixes: &[],
            forbidden_suffixes: &[],
            forbidden_substrings: &[],
        }
    }

    /// Whether the name must be unique platform-wide
    #[inline]
    #[must_use]
    pub fn globally_unique(&self) -> bool {
        self.uniqueness == Uniqueness::Global
    }

    const fn base(
        short_code: &'static str,
        min_length: usize,
        max_length: usize,
        allowed_chars: CharClass,
        uniqueness: Uniqueness,
    ) -> Self {
        Self {
            short_code,
            min_length,
            max_length,
            allowed_chars,
            case_sensitive: false,
            uniqueness,
            special_format: false,
            forbidden_prefixes: &[],
            forbidden_suffixes: &[],
            forbidden_substrings: &[],
        }
    }

    const fn lowercase_only(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    const fn concatenated(mut self) -> Self {
        self.special_format = true;
        self
    }

    const fn forbid(
        mut self,
        prefixes: &'static [&'static str],
        suffixes: &'static [&'static str],
        substrings: &'static [&'static str],
    ) -> Self {
        self.forbidden_prefixes = prefixes;
        self.forbidden_suffixes = suffixes;
        self.forbidden_substrings = substrings;
        self
    }
}

/// Immutable rule table keyed by type string
#[derive(Debug, Clone)]
pub struct NamingRuleTable {
    rules: HashMap<String, NamingRule>,
}

static AZURE_RULES: Lazy<NamingRuleTable> = Lazy::new(NamingRuleTable::build_azure);

impl NamingRuleTable {
    /// Create an empty table
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// The built-in Azure table, built on first use
    #[inline]
    #[must_use]
    pub fn azure() -> &'static NamingRuleTable {
        &AZURE_RULES
    }

    /// Add or replace a rule, returning the table
    #[must_use]
    pub fn with_rule(mut self, type_key: impl Into<String>, rule: NamingRule) -> Self {
        debug_assert!(rule.min_length > 0 && rule.min_length <= rule.max_length);
        self.rules.insert(type_key.into(), rule);
        self
    }

    /// Look up the rule for a type key
    #[inline]
    #[must_use]
    pub fn lookup(&self, type_key: &str) -> Option<&NamingRule> {
        self.rules.get(type_key)
    }

    /// Look up the rule for a known kind
    #[inline]
    #[must_use]
    pub fn rule_for(&self, kind: ResourceKind) -> Option<&NamingRule> {
        self.lookup(kind.as_str())
    }

    /// Number of rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the table is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn build_azure() -> Self {
        use CharClass as C;
        use Uniqueness::{Container, Global};

        let table = [
            (
                ResourceKind::ResourceGroup,
                NamingRule::base("rg", 1, 90, C::ResourceGroup, Container),
            ),
            (
                ResourceKind::StorageAccount,
                NamingRule::base("st", 3, 24, C::LowerAlphanumeric, Global)
                    .lowercase_only()
                    .concatenated(),
            ),
            (
                ResourceKind::KeyVault,
                NamingRule::base("kv", 3, 24, C::AlphanumericHyphen, Global)
                    .forbid(&["-"], &["-"], &["--"]),
            ),
            (
                ResourceKind::VirtualNetwork,
                NamingRule::base("vnet", 2, 64, C::AlphanumericHyphenUnderscorePeriod, Container)
                    .forbid(&["-", "."], &[".", "-"], &[]),
            ),
            (
                ResourceKind::Subnet,
                NamingRule::base("snet", 1, 80, C::AlphanumericHyphenUnderscorePeriod, Container)
                    .forbid(&[], &["."], &[]),
            ),
            (
                ResourceKind::NetworkSecurityGroup,
                NamingRule::base("nsg", 1, 80, C::AlphanumericHyphenUnderscorePeriod, Container)
                    .forbid(&[], &["."], &[]),
            ),
            (
                ResourceKind::PublicIp,
                NamingRule::base("pip", 1, 80, C::AlphanumericHyphenUnderscorePeriod, Container)
                    .forbid(&[], &["."], &[]),
            ),
            (
                ResourceKind::AppServicePlan,
                NamingRule::base("asp", 1, 60, C::AlphanumericHyphen, Container),
            ),
            (
                ResourceKind::WebApp,
                NamingRule::base("app", 2, 60, C::AlphanumericHyphen, Global)
                    .forbid(&["-"], &["-"], &[]),
            ),
            (
                ResourceKind::SqlServer,
                NamingRule::base("sql", 1, 63, C::LowerAlphanumericHyphen, Global)
                    .lowercase_only()
                    .forbid(&["-"], &["-"], &[]),
            ),
            (
                ResourceKind::SqlDatabase,
                NamingRule::base("sqldb", 1, 128, C::Printable, Container).forbid(
                    &[],
                    &[".", " "],
                    &["<", ">", "*", "%", "&", ":", "\\", "/", "?"],
                ),
            ),
            (
                ResourceKind::ContainerRegistry,
                NamingRule::base("cr", 5, 50, C::LowerAlphanumeric, Global)
                    .lowercase_only()
                    .concatenated(),
            ),
            (
                ResourceKind::KubernetesCluster,
                NamingRule::base("aks", 1, 63, C::AlphanumericHyphenUnderscore, Container)
                    .forbid(&["-", "_"], &["-", "_"], &[]),
            ),
            (
                ResourceKind::LogAnalyticsWorkspace,
                NamingRule::base("log", 4, 63, C::AlphanumericHyphen, Container)
                    .forbid(&["-"], &["-"], &[]),
            ),
        ];

        table
            .into_iter()
            .fold(Self::empty(), |t, (kind, rule)| t.with_rule(kind.as_str(), rule))
    }
}

impl Default for NamingRuleTable {
    fn default() -> Self {
        Self::azure().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn azure_table_covers_every_kind() {
        let table = NamingRuleTable::azure();
        assert_eq!(table.len(), ResourceKind::ALL.len());
        for kind in ResourceKind::ALL {
            assert!(table.rule_for(kind).is_some(), "missing rule for {kind}");
        }
    }

    #[test]
    fn bounds_are_positive_and_ordered() {
        for kind in ResourceKind::ALL {
            let rule = NamingRuleTable::azure().rule_for(kind).unwrap();
            assert!(rule.min_length > 0);
            assert!(rule.min_length <= rule.max_length);
        }
    }

    #[test]
    fn storage_account_rule() {
        let rule = NamingRuleTable::azure().lookup("storage_account").unwrap();
        assert_eq!((rule.min_length, rule.max_length), (3, 24));
        assert!(rule.case_sensitive);
        assert!(rule.globally_unique());
        assert!(rule.special_format);
        assert!(!rule.allowed_chars.allows_hyphen());
    }

    #[test]
    fn unknown_type_has_no_rule() {
        assert!(NamingRuleTable::azure().lookup("cosmos_db").is_none());
    }

    #[test]
    fn char_classes() {
        assert!(CharClass::LowerAlphanumeric.allows_all("abc123"));
        assert!(!CharClass::LowerAlphanumeric.allows_all("Abc"));
        assert!(CharClass::ResourceGroup.allows_all("my-rg_(1).x"));
        assert!(!CharClass::AlphanumericHyphen.allows_all("a_b"));
        assert!(CharClass::Printable.allows_all("any thing!"));
    }

    #[test]
    fn custom_table() {
        let table = NamingRuleTable::empty().with_rule("widget", NamingRule::permissive());
        assert_eq!(table.len(), 1);
        assert!(table.lookup("widget").is_some());
    }
}
