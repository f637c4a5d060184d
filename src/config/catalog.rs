//! Channel catalog loading
//!
//! The catalog is static data with two ordered tables:
//!
//! ```toml
//! [categories]
//! "央视频道" = ["CCTV1", "CCTV2"]
//!
//! [mapping]
//! CCTV1 = ["CCTV-1", "CCTV1 HD"]
//! ```
//!
//! JSON catalogs use the same keys. Table order is significant: the first
//! category listing a channel wins, and later alias entries override earlier
//! ones, so both tables keep document order.

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::path::Path;
use tracing::info;

use crate::errors::{AppError, AppResult, CatalogError};

/// Ordered `(key, [names])` pairs as written in the catalog file
pub type OrderedGroups = Vec<(String, Vec<String>)>;

/// Category and alias tables for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChannelCatalog {
    /// Group title to member standard names
    #[serde(default, deserialize_with = "ordered_groups")]
    pub categories: OrderedGroups,
    /// Standard name to aliases
    #[serde(default, deserialize_with = "ordered_groups")]
    pub mapping: OrderedGroups,
}

impl ChannelCatalog {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Load a `.toml` or `.json` catalog file
    pub fn load(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Err(AppError::missing_file(path));
        }
        let content = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let catalog = match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&content).map_err(|source| CatalogError::Toml {
                path: path.to_path_buf(),
                source,
            })?,
            Some("json") => Self::from_json_str(&content).map_err(|source| CatalogError::Json {
                path: path.to_path_buf(),
                source,
            })?,
            _ => {
                return Err(CatalogError::UnsupportedFormat {
                    path: path.to_path_buf(),
                }
                .into());
            }
        };

        info!(
            "Loaded channel catalog path={} categories={} standard_names={}",
            path.display(),
            catalog.categories.len(),
            catalog.mapping.len()
        );
        Ok(catalog)
    }
}

/// Deserialize a table of string lists without losing key order
fn ordered_groups<'de, D>(deserializer: D) -> Result<OrderedGroups, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedGroupsVisitor;

    impl<'de> Visitor<'de> for OrderedGroupsVisitor {
        type Value = OrderedGroups;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a table mapping names to lists of names")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut groups = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, names)) = access.next_entry::<String, Vec<String>>()? {
                if key.is_empty() {
                    return Err(de::Error::custom("empty name in catalog table"));
                }
                groups.push((key, names));
            }
            Ok(groups)
        }
    }

    deserializer.deserialize_map(OrderedGroupsVisitor)
}
