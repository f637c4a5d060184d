//! Playlist differ
//!
//! Compares two playlists by standard name. Records are keyed by their
//! resolved lookup name; records without any name are ignored. Names are
//! visited in sorted order so results are deterministic.

pub mod report;

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::info;

use crate::mapping::ChannelResolver;
use crate::models::ChannelRecord;

/// A channel present on one side only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExclusiveEntry {
    pub name: String,
    pub group: String,
    pub stream_url: String,
}

/// A channel whose URL sets are identical on both sides
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SameEntry {
    pub name: String,
    pub group: String,
    /// Smallest URL of the shared set
    pub stream_url: String,
}

/// A channel present on both sides with different URL sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DifferingEntry {
    pub name: String,
    pub group: String,
    /// Sorted, deduplicated
    pub left_urls: Vec<String>,
    pub right_urls: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    pub left_total: usize,
    pub right_total: usize,
    pub only_in_left: Vec<ExclusiveEntry>,
    pub only_in_right: Vec<ExclusiveEntry>,
    pub same: Vec<SameEntry>,
    pub differing: Vec<DifferingEntry>,
}

impl ComparisonResult {
    pub fn only_in_left_count(&self) -> usize {
        self.only_in_left.len()
    }

    pub fn only_in_right_count(&self) -> usize {
        self.only_in_right.len()
    }

    pub fn same_count(&self) -> usize {
        self.same.len()
    }

    pub fn differing_count(&self) -> usize {
        self.differing.len()
    }

    /// Same comparison with the two sides exchanged
    pub fn swapped(self) -> Self {
        Self {
            left_total: self.right_total,
            right_total: self.left_total,
            only_in_left: self.only_in_right,
            only_in_right: self.only_in_left,
            same: self.same,
            differing: self
                .differing
                .into_iter()
                .map(|d| DifferingEntry {
                    left_urls: d.right_urls,
                    right_urls: d.left_urls,
                    ..d
                })
                .collect(),
        }
    }
}

/// Compares playlists by resolved channel name
#[derive(Debug, Clone)]
pub struct PlaylistComparator {
    resolver: Arc<ChannelResolver>,
}

impl PlaylistComparator {
    pub fn new(resolver: Arc<ChannelResolver>) -> Self {
        Self { resolver }
    }

    fn group_of(&self, name: &str, records: &[&ChannelRecord]) -> String {
        records
            .first()
            .map(|r| r.group_title.as_str())
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| self.resolver.group_for(name))
            .to_string()
    }

    fn index<'a>(&self, records: &'a [ChannelRecord]) -> BTreeMap<String, Vec<&'a ChannelRecord>> {
        let mut map: BTreeMap<String, Vec<&ChannelRecord>> = BTreeMap::new();
        for record in records {
            let raw = record.lookup_name();
            if raw.is_empty() {
                continue;
            }
            map.entry(self.resolver.resolve(raw).to_string())
                .or_default()
                .push(record);
        }
        map
    }

    pub fn compare(&self, left: &[ChannelRecord], right: &[ChannelRecord]) -> ComparisonResult {
        let left_map = self.index(left);
        let right_map = self.index(right);
        let names: BTreeSet<&String> = left_map.keys().chain(right_map.keys()).collect();

        let mut result = ComparisonResult {
            left_total: left.len(),
            right_total: right.len(),
            ..ComparisonResult::default()
        };

        for name in names {
            match (left_map.get(name), right_map.get(name)) {
                (Some(records), None) => {
                    let group = self.group_of(name, records);
                    result.only_in_left.extend(records.iter().map(|r| ExclusiveEntry {
                        name: name.clone(),
                        group: group.clone(),
                        stream_url: r.stream_url.clone(),
                    }));
                }
                (None, Some(records)) => {
                    let group = self.group_of(name, records);
                    result.only_in_right.extend(records.iter().map(|r| ExclusiveEntry {
                        name: name.clone(),
                        group: group.clone(),
                        stream_url: r.stream_url.clone(),
                    }));
                }
                (Some(left_records), Some(right_records)) => {
                    let left_urls: BTreeSet<&str> =
                        left_records.iter().map(|r| r.stream_url.as_str()).collect();
                    let right_urls: BTreeSet<&str> =
                        right_records.iter().map(|r| r.stream_url.as_str()).collect();
                    let group = self.group_of(name, left_records);

                    if left_urls == right_urls {
                        result.same.push(SameEntry {
                            name: name.clone(),
                            group,
                            stream_url: left_urls
                                .first()
                                .map(|u| u.to_string())
                                .unwrap_or_default(),
                        });
                    } else {
                        result.differing.push(DifferingEntry {
                            name: name.clone(),
                            group,
                            left_urls: left_urls.into_iter().map(str::to_string).collect(),
                            right_urls: right_urls.into_iter().map(str::to_string).collect(),
                        });
                    }
                }
                (None, None) => {}
            }
        }

        info!(
            "Compared playlists left={} right={} same={} differing={} only_left={} only_right={}",
            result.left_total,
            result.right_total,
            result.same_count(),
            result.differing_count(),
            result.only_in_left_count(),
            result.only_in_right_count()
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelCatalog;

    fn record(name: &str, url: &str) -> ChannelRecord {
        ChannelRecord {
            standard_name: name.to_string(),
            stream_url: url.to_string(),
            ..ChannelRecord::default()
        }
    }

    fn comparator() -> PlaylistComparator {
        let catalog = ChannelCatalog {
            categories: vec![("央视频道".into(), vec!["CCTV1".into(), "CCTV2".into()])],
            mapping: vec![("CCTV1".into(), vec!["CCTV-1".into()])],
        };
        PlaylistComparator::new(Arc::new(ChannelResolver::from_catalog(&catalog, "其他")))
    }

    #[test]
    fn partitions_by_resolved_name() {
        let left = vec![
            record("CCTV-1", "rtp://a"),
            record("CCTV2", "rtp://b"),
            record("CCTV2", "rtp://b2"),
            record("只在左", "rtp://l"),
            record("", "rtp://nameless"),
        ];
        let right = vec![
            record("CCTV1", "rtp://a"),
            record("CCTV2", "rtp://c"),
            record("只在右", "rtp://r1"),
            record("只在右", "rtp://r2"),
        ];

        let result = comparator().compare(&left, &right);

        assert_eq!(result.left_total, 5);
        assert_eq!(result.right_total, 4);
        assert_eq!(result.same.len(), 1);
        assert_eq!(result.same[0].name, "CCTV1");
        assert_eq!(result.same[0].group, "央视频道");
        assert_eq!(result.differing.len(), 1);
        assert_eq!(result.differing[0].left_urls, vec!["rtp://b", "rtp://b2"]);
        assert_eq!(result.differing[0].right_urls, vec!["rtp://c"]);
        assert_eq!(result.only_in_left.len(), 1);
        assert_eq!(result.only_in_left[0].group, "其他");
        assert_eq!(result.only_in_right.len(), 2);
    }

    #[test]
    fn duplicate_urls_count_as_same_set() {
        let left = vec![record("A", "rtp://x"), record("A", "rtp://x")];
        let right = vec![record("A", "rtp://x")];
        let result = comparator().compare(&left, &right);
        assert_eq!(result.same_count(), 1);
        assert_eq!(result.differing_count(), 0);
    }

    #[test]
    fn record_group_takes_precedence() {
        let mut left = record("CCTV2", "rtp://b");
        left.group_title = "自定义".to_string();
        let result = comparator().compare(&[left], &[]);
        assert_eq!(result.only_in_left[0].group, "自定义");
    }

    #[test]
    fn permissive_comparator_uses_raw_names() {
        let comparator =
            PlaylistComparator::new(Arc::new(ChannelResolver::permissive("Uncategorized")));
        let result = comparator.compare(&[record("CCTV-1", "rtp://a")], &[record("CCTV1", "rtp://a")]);
        assert_eq!(result.only_in_left_count(), 1);
        assert_eq!(result.only_in_right_count(), 1);
    }
}
