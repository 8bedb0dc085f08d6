//! Content hashing of assembly inputs
//!
//! The hash keys the per-configuration cache of generated documents. Canvas
//! positions are left out because they never change the output.

use crate::assembler::AssemblyOptions;
use crate::error::CodegenError;
use azcanvas_model::{GlobalConfig, Resource};
use serde::Serialize;
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte Blake3 hash
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash raw bytes
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Hash the JSON encoding of a value
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn compute_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self, CodegenError> {
        Ok(Self::compute(&serde_json::to_vec(value)?))
    }

    /// Underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First 16 hex characters
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ContentHash {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        let array: [u8; 32] =
            bytes
                .try_into()
                .map_err(|bytes: Vec<u8>| CodegenError::InvalidHashLength {
                    expected: 32,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }
}

impl Serialize for ContentHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Serialize)]
struct HashedResource<'a> {
    id: String,
    #[serde(rename = "type")]
    type_key: &'a str,
    name: &'a str,
    config: Value,
    resource_group: Option<String>,
}

/// Hash of everything that determines an assembled document
///
/// # Errors
/// [`CodegenError::Serialization`] if the input cannot be encoded
pub fn content_hash(resources: &[Resource], global: &GlobalConfig) -> Result<ContentHash, CodegenError> {
    let hashed: Vec<HashedResource<'_>> = resources
        .iter()
        .map(|r| HashedResource {
            id: r.id.to_string(),
            type_key: r.type_key(),
            name: &r.name,
            config: r.config.to_value(),
            resource_group: r.resource_group.map(|id| id.to_string()),
        })
        .collect();
    ContentHash::compute_serializable(&(hashed, global))
}

/// Hash of the options a document was assembled with
///
/// Covers the header switch, provider pin, module source and token verdict.
///
/// # Errors
/// [`CodegenError::Serialization`] if the options cannot be encoded
pub fn options_hash(options: &AssemblyOptions) -> Result<ContentHash, CodegenError> {
    ContentHash::compute_serializable(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use azcanvas_model::{Position, ResourceConfig};
    use azcanvas_naming::ResourceKind;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Resource> {
        vec![Resource::new(
            "app-rg",
            ResourceConfig::default_for(ResourceKind::ResourceGroup),
        )]
    }

    #[test]
    fn hex_round_trip() {
        let hash = ContentHash::compute(b"canvas");
        let parsed: ContentHash = hash.to_string().parse().unwrap();
        assert_eq!(parsed, hash);
        assert_eq!(hash.short().len(), 16);
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(matches!(
            "abcd".parse::<ContentHash>(),
            Err(CodegenError::InvalidHashLength { actual: 2, .. })
        ));
    }

    #[test]
    fn position_does_not_change_hash() {
        let global = GlobalConfig::new();
        let mut resources = sample();
        let before = content_hash(&resources, &global).unwrap();
        resources[0].position = Position::new(300.0, 400.0);
        assert_eq!(content_hash(&resources, &global).unwrap(), before);
    }

    #[test]
    fn options_hash_tracks_every_switch() {
        let base = AssemblyOptions::new();
        let source = crate::PrivateModuleSource::new("git::https://example.com/m.git", "v1");
        let variants = [
            base.clone().without_header(),
            base.clone().with_provider_version("~> 4.0"),
            base.clone().with_private_module(source.clone(), false),
            base.clone().with_private_module(source, true),
        ];

        let plain = options_hash(&base).unwrap();
        assert_eq!(options_hash(&AssemblyOptions::new()).unwrap(), plain);
        let mut seen = vec![plain];
        for options in &variants {
            let hash = options_hash(options).unwrap();
            assert!(!seen.contains(&hash), "{options:?}");
            seen.push(hash);
        }
    }

    #[test]
    fn name_and_globals_change_hash() {
        let global = GlobalConfig::new();
        let mut resources = sample();
        let before = content_hash(&resources, &global).unwrap();

        resources[0].name = "other-rg".to_string();
        assert_ne!(content_hash(&resources, &global).unwrap(), before);

        let moved = GlobalConfig::new().with_location("West Europe", "westeurope");
        assert_ne!(
            content_hash(&resources, &moved).unwrap(),
            content_hash(&resources, &global).unwrap()
        );
    }
}
