//! Non-fatal assembly diagnostics

use serde::Serialize;
use std::fmt;

/// Something the assembler papered over while still producing output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssemblyWarning {
    /// A required field was empty; an empty string was emitted
    MissingField {
        resource: String,
        field: &'static str,
    },
    /// The resource-group reference was unset or did not resolve
    UnresolvedResourceGroup { resource: String },
    /// A by-name reference to another resource found no match
    UnresolvedReference {
        resource: String,
        field: &'static str,
        target: String,
    },
    /// Type outside the known set, emitted through the passthrough template
    UnknownType { resource: String, type_key: String },
    /// A passthrough field whose key is not a valid attribute name was dropped
    SkippedField { resource: String, field: String },
    /// Private-module output was requested but the token was not accepted
    PrivateModuleDenied,
}

impl AssemblyWarning {
    /// Name of the resource the warning is about, if any
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        match self {
            Self::MissingField { resource, .. }
            | Self::UnresolvedResourceGroup { resource }
            | Self::UnresolvedReference { resource, .. }
            | Self::UnknownType { resource, .. }
            | Self::SkippedField { resource, .. } => Some(resource),
            Self::PrivateModuleDenied => None,
        }
    }
}

impl fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { resource, field } => {
                write!(f, "{resource}: required field '{field}' is empty")
            }
            Self::UnresolvedResourceGroup { resource } => {
                write!(f, "{resource}: no resource group on the canvas")
            }
            Self::UnresolvedReference {
                resource,
                field,
                target,
            } => write!(f, "{resource}: '{field}' refers to '{target}', which is not on the canvas"),
            Self::UnknownType { resource, type_key } => {
                write!(f, "{resource}: unrecognised resource type '{type_key}'")
            }
            Self::SkippedField { resource, field } => {
                write!(f, "{resource}: field '{field}' is not a valid attribute name and was dropped")
            }
            Self::PrivateModuleDenied => {
                write!(f, "private module source requires a valid access token; emitted inline resources")
            }
        }
    }
}
