//! Name validation against the rule table
//!
//! Validation never fails: every violation is collected into the result so
//! a form can show all of them at once. Checks fire independently, so one
//! bad character may produce both a character-class error and a hyphen
//! error.

use crate::kind::ResourceKind;
use crate::rule::{NamingRule, NamingRuleTable, Uniqueness};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static STORAGE_ACCOUNT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+$").expect("literal pattern compiles"));

/// A blocking naming violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum NameViolation {
    /// Shorter than the minimum length
    #[error("name must be at least {min} characters long (minimum length), got {actual}")]
    TooShort { min: usize, actual: usize },

    /// Longer than the maximum length
    #[error("name must be at most {max} characters long (maximum length), got {actual}")]
    TooLong { max: usize, actual: usize },

    /// Contains uppercase letters where only lowercase is allowed
    #[error("name must be lowercase")]
    NotLowercase,

    /// Contains characters outside the allowed class
    #[error("name may only contain {allowed}")]
    InvalidCharacters { allowed: &'static str },

    /// Contains a hyphen where hyphens are not allowed
    #[error("name may not contain hyphens")]
    HyphenNotAllowed,

    /// Starts with a forbidden prefix
    #[error("name may not start with '{0}'")]
    ForbiddenPrefix(&'static str),

    /// Ends with a forbidden suffix
    #[error("name may not end with '{0}'")]
    ForbiddenSuffix(&'static str),

    /// Contains a forbidden substring
    #[error("name may not contain '{0}'")]
    ForbiddenSubstring(&'static str),

    /// Resource group names cannot end with a period
    #[error("resource group name may not end with a period")]
    TrailingPeriod,

    /// Storage account names must be strictly lowercase alphanumeric
    #[error("storage account name must match ^[a-z0-9]+$")]
    StorageAccountPattern,
}

impl NameViolation {
    /// Whether this is a length violation
    #[inline]
    #[must_use]
    pub fn is_length(&self) -> bool {
        matches!(self, Self::TooShort { .. } | Self::TooLong { .. })
    }
}

/// A non-blocking advisory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NameWarning {
    /// The name must be unique in the given scope; nothing checks it here
    Uniqueness { scope: Uniqueness },
}

impl std::fmt::Display for NameWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameWarning::Uniqueness { scope } => {
                write!(f, "name must be {}", scope.phrase())
            }
        }
    }
}

/// Outcome of validating one candidate name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Blocking violations, in check order
    pub errors: Vec<NameViolation>,
    /// Advisories, in check order
    pub warnings: Vec<NameWarning>,
}

impl ValidationResult {
    /// Valid when no errors were collected
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether any length violation was collected
    #[inline]
    #[must_use]
    pub fn has_length_error(&self) -> bool {
        self.errors.iter().any(NameViolation::is_length)
    }

    /// Error messages for display
    #[must_use]
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Warning messages for display
    #[must_use]
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }
}

/// Validates candidate names against a rule table
#[derive(Debug, Clone, Copy)]
pub struct NameValidator<'t> {
    table: &'t NamingRuleTable,
}

impl NameValidator<'static> {
    /// Validator over the built-in Azure table
    #[inline]
    #[must_use]
    pub fn azure() -> Self {
        Self {
            table: NamingRuleTable::azure(),
        }
    }
}

impl Default for NameValidator<'static> {
    fn default() -> Self {
        Self::azure()
    }
}

impl<'t> NameValidator<'t> {
    /// Validator over a custom table
    #[inline]
    #[must_use]
    pub fn new(table: &'t NamingRuleTable) -> Self {
        Self { table }
    }

    /// Validate `candidate` as a name for `type_key`
    ///
    /// Types missing from the table always validate cleanly.
    #[must_use]
    pub fn validate(&self, type_key: &str, candidate: &str) -> ValidationResult {
        let Some(rule) = self.table.lookup(type_key) else {
            return ValidationResult::default();
        };

        let mut result = ValidationResult::default();
        let errors = &mut result.errors;
        let length = candidate.chars().count();

        if length < rule.min_length {
            errors.push(NameViolation::TooShort {
                min: rule.min_length,
                actual: length,
            });
        }
        if length > rule.max_length {
            errors.push(NameViolation::TooLong {
                max: rule.max_length,
                actual: length,
            });
        }

        if rule.case_sensitive && candidate != candidate.to_lowercase() {
            errors.push(NameViolation::NotLowercase);
        }

        if !rule.allowed_chars.allows_all(candidate) {
            errors.push(NameViolation::InvalidCharacters {
                allowed: rule.allowed_chars.describe(),
            });
        }

        if !rule.allowed_chars.allows_hyphen() && candidate.contains('-') {
            errors.push(NameViolation::HyphenNotAllowed);
        }

        check_affixes(rule, candidate, errors);
        check_kind_specific(type_key, candidate, errors);

        if result.errors.is_empty() {
            result.warnings.push(NameWarning::Uniqueness {
                scope: rule.uniqueness,
            });
        }

        result
    }

    /// Validate a name for a known kind
    #[inline]
    #[must_use]
    pub fn validate_kind(&self, kind: ResourceKind, candidate: &str) -> ValidationResult {
        self.validate(kind.as_str(), candidate)
    }
}

fn check_affixes(rule: &NamingRule, candidate: &str, errors: &mut Vec<NameViolation>) {
    for &prefix in rule.forbidden_prefixes {
        if candidate.starts_with(prefix) {
            errors.push(NameViolation::ForbiddenPrefix(prefix));
        }
    }
    for &suffix in rule.forbidden_suffixes {
        if candidate.ends_with(suffix) {
            errors.push(NameViolation::ForbiddenSuffix(suffix));
        }
    }
    for &substring in rule.forbidden_substrings {
        if candidate.contains(substring) {
            errors.push(NameViolation::ForbiddenSubstring(substring));
        }
    }
}

fn check_kind_specific(type_key: &str, candidate: &str, errors: &mut Vec<NameViolation>) {
    match type_key.parse::<ResourceKind>() {
        Ok(ResourceKind::ResourceGroup) if candidate.ends_with('.') => {
            errors.push(NameViolation::TrailingPeriod);
        }
        Ok(ResourceKind::StorageAccount) if !STORAGE_ACCOUNT_PATTERN.is_match(candidate) => {
            errors.push(NameViolation::StorageAccountPattern);
        }
        _ => {}
    }
}
