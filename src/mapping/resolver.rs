use super::{AliasMap, CategoryIndex};
use crate::config::ChannelCatalog;
use crate::config::defaults::DEFAULT_GROUP;

/// Alias map, category index and default group bundled for one run
#[derive(Debug, Clone)]
pub struct ChannelResolver {
    aliases: AliasMap,
    categories: CategoryIndex,
    default_group: String,
}

impl ChannelResolver {
    pub fn new(aliases: AliasMap, categories: CategoryIndex, default_group: impl Into<String>) -> Self {
        Self {
            aliases,
            categories,
            default_group: default_group.into(),
        }
    }

    pub fn from_catalog(catalog: &ChannelCatalog, default_group: impl Into<String>) -> Self {
        Self::new(
            AliasMap::from_mapping(&catalog.mapping),
            CategoryIndex::from_categories(&catalog.categories),
            default_group,
        )
    }

    /// Resolver without a catalog: names pass through, every channel lands in the default group
    pub fn permissive(default_group: impl Into<String>) -> Self {
        Self::new(AliasMap::default(), CategoryIndex::default(), default_group)
    }

    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.resolve(name)
    }

    /// Category for a standard name, falling back to the default group
    pub fn group_for(&self, standard_name: &str) -> &str {
        self.categories
            .lookup(standard_name)
            .unwrap_or(self.default_group.as_str())
    }

    pub fn default_group(&self) -> &str {
        &self.default_group
    }
}

impl Default for ChannelResolver {
    fn default() -> Self {
        Self::permissive(DEFAULT_GROUP)
    }
}
