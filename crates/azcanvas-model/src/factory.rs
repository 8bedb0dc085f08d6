//! Resource creation on drop

use crate::collection::ResourceCollection;
use crate::config::ResourceConfig;
use crate::global::GlobalConfig;
use crate::resource::{Position, Resource};
use azcanvas_naming::{NameSuggester, ResourceKind};

/// Creates resources with suggested names and global defaults
#[derive(Debug, Clone, Copy)]
pub struct ResourceFactory<'a> {
    global: &'a GlobalConfig,
    suggester: NameSuggester<'static>,
}

impl<'a> ResourceFactory<'a> {
    /// Factory applying `global` to everything it creates
    #[inline]
    #[must_use]
    pub fn new(global: &'a GlobalConfig) -> Self {
        Self {
            global,
            suggester: NameSuggester::azure(),
        }
    }

    /// Create a resource of `type_key` at `position`
    ///
    /// The ordinal used for the suggested name is one more than the number
    /// of resources of that type already in `existing`. Unknown type keys
    /// produce a pass-through resource carrying the default location and tags.
    #[must_use]
    pub fn create(
        &self,
        type_key: &str,
        position: Position,
        existing: &ResourceCollection,
    ) -> Resource {
        let ordinal = u32::try_from(existing.count_of_key(type_key))
            .unwrap_or(u32::MAX - 1)
            + 1;
        self.create_nth(type_key, ordinal, position)
    }

    /// Create the `ordinal`-th resource of `type_key`
    #[must_use]
    pub fn create_nth(&self, type_key: &str, ordinal: u32, position: Position) -> Resource {
        let ctx = self.global.naming_context();
        let name = self.suggester.suggest(type_key, ordinal, &ctx);

        let mut config = ResourceConfig::default_for_key(type_key);
        match &mut config {
            ResourceConfig::Other(other) => self.global.apply_to_fields(&mut other.fields),
            typed => {
                if let Some(common) = typed.common_mut() {
                    self.global.apply_to(common);
                }
            }
        }

        tracing::debug!(type_key, %name, "created resource");
        Resource::new(name, config).at(position)
    }

    /// Create a resource of a known kind
    #[inline]
    #[must_use]
    pub fn create_kind(
        &self,
        kind: ResourceKind,
        position: Position,
        existing: &ResourceCollection,
    ) -> Resource {
        self.create(kind.as_str(), position, existing)
    }
}
