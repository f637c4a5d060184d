//! Template-filtered merge
//!
//! A template playlist defines the expected channels, their order and their
//! artwork. A stream source (usually a multicast scan in stream-list form)
//! supplies the current URLs, keyed by the raw channel name it was scanned
//! under.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use strum::{Display, EnumString};

use crate::mapping::ChannelResolver;
use crate::models::{ChannelRecord, DEFAULT_DURATION};

/// What happens to channels that only one side knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize)]
#[strum(serialize_all = "kebab-case")]
pub enum TemplateMode {
    /// Keep only template channels that found a source URL
    #[default]
    FilterOnly,
    /// Keep every template channel and append source channels the template never used
    AppendUnmatched,
}

/// Source URLs grouped by raw channel name, in first-appearance order
#[derive(Debug, Clone, Default)]
pub(crate) struct StreamIndex {
    entries: Vec<(String, Vec<String>)>,
    by_name: HashMap<String, usize>,
}

impl StreamIndex {
    pub fn from_records(records: &[ChannelRecord]) -> Self {
        let mut index = Self::default();
        for record in records {
            let name = record.lookup_name();
            if record.stream_url.is_empty() {
                continue;
            }
            match index.by_name.get(name) {
                Some(&pos) => index.entries[pos].1.push(record.stream_url.clone()),
                None => {
                    index.by_name.insert(name.to_string(), index.entries.len());
                    index
                        .entries
                        .push((name.to_string(), vec![record.stream_url.clone()]));
                }
            }
        }
        index
    }

    pub fn position(&self, raw_name: &str) -> Option<usize> {
        self.by_name.get(raw_name).copied()
    }

    pub fn name_at(&self, pos: usize) -> &str {
        &self.entries[pos].0
    }

    pub fn first_url_at(&self, pos: usize) -> Option<&str> {
        self.entries[pos].1.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Counts from one template merge, before deduplication
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateStats {
    pub template_records: usize,
    pub source_names: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub appended: usize,
}

/// Match template records against a stream index
///
/// Match priority for each template record with raw name `raw` and resolved
/// name `standard`:
/// 1. the first source name that itself resolves to `standard`
/// 2. `standard` used directly as a source name
/// 3. `raw` used directly as a source name
///
/// The matched source name contributes its first URL and is marked consumed.
pub(crate) fn match_template(
    resolver: &ChannelResolver,
    template: Vec<ChannelRecord>,
    source: &StreamIndex,
    mode: TemplateMode,
) -> (Vec<ChannelRecord>, TemplateStats) {
    let mut by_standard: HashMap<&str, usize> = HashMap::new();
    for pos in 0..source.len() {
        by_standard
            .entry(resolver.resolve(source.name_at(pos)))
            .or_insert(pos);
    }

    let mut stats = TemplateStats {
        template_records: template.len(),
        source_names: source.len(),
        ..TemplateStats::default()
    };
    let mut consumed: HashSet<usize> = HashSet::new();
    let mut output = Vec::with_capacity(template.len());

    for mut record in template {
        let raw = record.lookup_name().to_string();
        let standard = resolver.resolve(&raw).to_string();

        let matched = if raw.is_empty() {
            None
        } else {
            by_standard
                .get(standard.as_str())
                .copied()
                .or_else(|| source.position(&standard))
                .or_else(|| source.position(&raw))
        };

        let mut url_found = false;
        if let Some(pos) = matched {
            consumed.insert(pos);
            if let Some(url) = source.first_url_at(pos) {
                record.stream_url = url.to_string();
                url_found = true;
            }
        }

        if standard.is_empty() {
            if record.group_title.is_empty() {
                record.group_title = resolver.default_group().to_string();
            }
        } else {
            record.group_title = resolver.group_for(&standard).to_string();
            if record.display_name.is_empty() {
                record.display_name = standard.clone();
            }
            record.standard_name = standard;
        }

        if url_found {
            stats.matched += 1;
        } else {
            stats.unmatched += 1;
        }

        match mode {
            TemplateMode::FilterOnly if !url_found || record.stream_url.is_empty() => {}
            _ => output.push(record),
        }
    }

    if mode == TemplateMode::AppendUnmatched {
        for pos in (0..source.len()).filter(|pos| !consumed.contains(pos)) {
            let standard = resolver.resolve(source.name_at(pos)).to_string();
            output.push(ChannelRecord {
                display_name: standard.clone(),
                group_title: resolver.group_for(&standard).to_string(),
                standard_name: standard,
                artwork_ref: None,
                stream_url: source.first_url_at(pos).unwrap_or_default().to_string(),
                duration: DEFAULT_DURATION.to_string(),
                ..ChannelRecord::default()
            });
            stats.appended += 1;
        }
    }

    (output, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelCatalog;
    use std::str::FromStr;

    fn resolver() -> ChannelResolver {
        let catalog = ChannelCatalog {
            categories: vec![
                ("央视频道".into(), vec!["CCTV1".into(), "CCTV2".into()]),
                ("卫视频道".into(), vec!["湖南卫视".into()]),
            ],
            mapping: vec![
                ("CCTV1".into(), vec!["CCTV-1".into(), "CCTV1 HD".into()]),
                ("CCTV2".into(), vec!["CCTV-2".into()]),
            ],
        };
        ChannelResolver::from_catalog(&catalog, "其他")
    }

    fn template_record(name: &str, logo: &str, url: &str) -> ChannelRecord {
        ChannelRecord {
            standard_name: name.to_string(),
            display_name: name.to_string(),
            artwork_ref: Some(logo.to_string()),
            group_title: "stale".to_string(),
            stream_url: url.to_string(),
            ..ChannelRecord::default()
        }
    }

    fn source() -> StreamIndex {
        StreamIndex::from_records(&[
            ChannelRecord::from_stream("CCTV1 HD", "rtp://239.1.1.1:9000"),
            ChannelRecord::from_stream("CCTV1 HD", "rtp://239.1.1.9:9000"),
            ChannelRecord::from_stream("湖南卫视", "rtp://239.1.1.5:9000"),
            ChannelRecord::from_stream("本地新闻", "rtp://239.1.1.7:9000"),
        ])
    }

    #[test]
    fn stream_index_groups_urls_by_first_appearance() {
        let index = source();
        assert_eq!(index.len(), 3);
        assert_eq!(index.position("CCTV1 HD"), Some(0));
        assert_eq!(index.first_url_at(0), Some("rtp://239.1.1.1:9000"));
        assert_eq!(index.name_at(2), "本地新闻");
    }

    #[test]
    fn filter_only_keeps_matched_template_records() {
        let template = vec![
            template_record("CCTV-1", "http://logo/1.png", "http://old/1"),
            template_record("CCTV2", "http://logo/2.png", "http://old/2"),
            template_record("湖南卫视", "http://logo/hn.png", ""),
        ];

        let (records, stats) =
            match_template(&resolver(), template, &source(), TemplateMode::FilterOnly);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].standard_name, "CCTV1");
        assert_eq!(records[0].display_name, "CCTV-1");
        assert_eq!(records[0].stream_url, "rtp://239.1.1.1:9000");
        assert_eq!(records[0].group_title, "央视频道");
        assert_eq!(records[0].artwork_ref.as_deref(), Some("http://logo/1.png"));
        assert_eq!(records[1].standard_name, "湖南卫视");
        assert_eq!(records[1].group_title, "卫视频道");
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.unmatched, 1);
        assert_eq!(stats.appended, 0);
    }

    #[test]
    fn append_unmatched_keeps_template_and_appends_unused_sources() {
        let template = vec![
            template_record("CCTV2", "http://logo/2.png", "http://old/2"),
            template_record("CCTV1", "http://logo/1.png", ""),
        ];

        let (records, stats) =
            match_template(&resolver(), template, &source(), TemplateMode::AppendUnmatched);

        let names: Vec<_> = records.iter().map(|r| r.standard_name.as_str()).collect();
        assert_eq!(names, vec!["CCTV2", "CCTV1", "湖南卫视", "本地新闻"]);
        assert_eq!(records[0].stream_url, "http://old/2");
        assert_eq!(records[1].stream_url, "rtp://239.1.1.1:9000");

        let appended = &records[3];
        assert_eq!(appended.artwork_ref, None);
        assert_eq!(appended.group_title, "其他");
        assert_eq!(appended.duration, "-1");
        assert_eq!(appended.display_name, "本地新闻");
        assert_eq!(stats.appended, 2);
    }

    #[test]
    fn uncatalogued_names_match_verbatim() {
        let index = StreamIndex::from_records(&[ChannelRecord::from_stream(
            "CCTV-2",
            "rtp://239.1.1.2:9000",
        )]);
        let catalog = ChannelCatalog {
            categories: vec![],
            mapping: vec![("CCTV2".into(), vec![])],
        };
        let resolver = ChannelResolver::from_catalog(&catalog, "其他");

        let (records, _) = match_template(
            &resolver,
            vec![template_record("CCTV-2", "", "")],
            &index,
            TemplateMode::FilterOnly,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].stream_url, "rtp://239.1.1.2:9000");
    }

    #[test]
    fn nameless_template_record_keeps_its_group() {
        let mut nameless = template_record("", "", "http://old/x");
        nameless.group_title = String::new();

        let (records, _) = match_template(
            &resolver(),
            vec![nameless],
            &StreamIndex::default(),
            TemplateMode::AppendUnmatched,
        );
        assert_eq!(records[0].group_title, "其他");
        assert_eq!(records[0].stream_url, "http://old/x");
    }

    #[test]
    fn mode_names_parse() {
        assert_eq!(TemplateMode::from_str("filter-only").ok(), Some(TemplateMode::FilterOnly));
        assert_eq!(TemplateMode::AppendUnmatched.to_string(), "append-unmatched");
    }
}
