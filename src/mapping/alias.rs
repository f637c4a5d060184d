//! Alias resolution to standard channel names

use std::collections::HashMap;
use tracing::warn;

/// Alias (including each standard name) to standard name
///
/// Built once per run from the catalog's `standard → [aliases]` table and
/// read-only afterwards. Resolution is a single lookup: alias chains are
/// collapsed while building, so `resolve(resolve(x)) == resolve(x)` for any
/// input.
#[derive(Debug, Clone, Default)]
pub struct AliasMap {
    entries: HashMap<String, String>,
}

impl AliasMap {
    /// Build from `(standard, aliases)` pairs in catalog order
    ///
    /// Aliases are registered before the standard name's identity entry, and
    /// later entries overwrite earlier ones for the same key.
    pub fn from_mapping(mapping: &[(String, Vec<String>)]) -> Self {
        let mut entries = HashMap::new();
        for (standard, aliases) in mapping {
            for alias in aliases {
                entries.insert(alias.clone(), standard.clone());
            }
            entries.insert(standard.clone(), standard.clone());
        }

        let mut map = Self { entries };
        map.collapse_chains();
        map
    }

    fn collapse_chains(&mut self) {
        let max_steps = self.entries.len();
        let mut updates = Vec::new();

        for (alias, target) in &self.entries {
            let mut current = target;
            let mut steps = 0;
            while let Some(next) = self.entries.get(current) {
                if next == current || steps >= max_steps {
                    break;
                }
                current = next;
                steps += 1;
            }
            if current != target {
                updates.push((alias.clone(), current.clone()));
            }
        }

        for (alias, target) in updates {
            warn!(
                "Alias chain collapsed: alias={} previous_target={} target={}",
                alias,
                self.entries.get(&alias).map(String::as_str).unwrap_or_default(),
                target
            );
            self.entries.insert(alias, target);
        }
    }

    /// Resolve a name; unknown names resolve to themselves
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.entries.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tracing_test::traced_test;

    fn mapping(pairs: &[(&str, &[&str])]) -> Vec<(String, Vec<String>)> {
        pairs
            .iter()
            .map(|(standard, aliases)| {
                (
                    standard.to_string(),
                    aliases.iter().map(|a| a.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn resolves_aliases_and_standard_names() {
        let map = AliasMap::from_mapping(&mapping(&[("CCTV1", &["CCTV-1"])]));

        assert_eq!(map.resolve("CCTV-1"), "CCTV1");
        assert_eq!(map.resolve("CCTV1"), "CCTV1");
        assert_eq!(map.resolve("Unknown"), "Unknown");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn later_entries_override_shared_aliases() {
        let map = AliasMap::from_mapping(&mapping(&[
            ("CCTV5", &["体育"]),
            ("CCTV5+", &["体育"]),
        ]));
        assert_eq!(map.resolve("体育"), "CCTV5+");
    }

    #[traced_test]
    #[test]
    fn alias_chains_collapse_to_final_standard() {
        // "CCTV1" is a standard name and also listed as an alias of "CCTV-1 综合".
        let map = AliasMap::from_mapping(&mapping(&[
            ("CCTV1", &["CCTV-1"]),
            ("CCTV-1 综合", &["CCTV1"]),
        ]));

        assert_eq!(map.resolve("CCTV1"), "CCTV-1 综合");
        assert_eq!(map.resolve("CCTV-1"), "CCTV-1 综合");
        assert!(logs_contain("Alias chain collapsed"));
    }

    fn arb_mapping() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
        let name = "[a-e]{1,2}";
        prop::collection::vec((name, prop::collection::vec(name, 0..4)), 0..6)
    }

    proptest! {
        #[test]
        fn resolution_is_idempotent(mapping in arb_mapping(), probe in "[a-f]{1,2}") {
            let map = AliasMap::from_mapping(&mapping);
            let once = map.resolve(&probe).to_string();
            prop_assert_eq!(map.resolve(&once), once.as_str());
        }

        #[test]
        fn standard_names_are_fixed_points(
            mapping in prop::collection::vec(
                ("[A-E]{1,2}", prop::collection::vec("[a-e]{1,2}", 0..4)),
                0..6,
            )
        ) {
            // Standard names never appear as aliases here.
            let map = AliasMap::from_mapping(&mapping);
            for (standard, aliases) in &mapping {
                prop_assert_eq!(map.resolve(standard), standard.as_str());
                for alias in aliases {
                    prop_assert_eq!(map.resolve(map.resolve(alias)), map.resolve(alias));
                }
            }
        }
    }
}
