use std::collections::HashMap;

/// Standard name to group title
///
/// Derived from the catalog's ordered `group → [members]` table. When a name
/// is listed under several groups the first group in catalog order wins.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    groups: HashMap<String, String>,
}

impl CategoryIndex {
    pub fn from_categories(categories: &[(String, Vec<String>)]) -> Self {
        let mut groups = HashMap::new();
        for (group, members) in categories {
            for member in members {
                groups
                    .entry(member.clone())
                    .or_insert_with(|| group.clone());
            }
        }
        Self { groups }
    }

    /// Group for an exact standard name, if any category lists it
    pub fn lookup(&self, standard_name: &str) -> Option<&str> {
        self.groups.get(standard_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_category_wins() {
        let index = CategoryIndex::from_categories(&[
            ("央视频道".to_string(), vec!["CCTV1".to_string(), "CCTV4K".to_string()]),
            ("4K频道".to_string(), vec!["CCTV4K".to_string()]),
        ]);

        assert_eq!(index.lookup("CCTV1"), Some("央视频道"));
        assert_eq!(index.lookup("CCTV4K"), Some("央视频道"));
        assert_eq!(index.lookup("cctv1"), None);
        assert_eq!(index.len(), 2);
    }
}
