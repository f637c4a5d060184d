//! Merge and reconciliation engine
//!
//! Turns parsed records from one or more sources into a single canonical
//! record list: names are resolved through the [`ChannelResolver`], records
//! are combined in source order, duplicates by stream URL are collapsed and
//! the survivors are renumbered `1..N`.
//!
//! Two entry points exist:
//! - [`Reconciler::merge_sources`] concatenates any number of sources
//! - [`Reconciler::merge_template`] reconciles a template playlist against a
//!   stream source, see [`TemplateMode`]

pub mod dedup;
pub mod numbering;
pub mod template;

pub use dedup::{DedupReason, DedupReport, RemovedRecord, dedup_by_url};
pub use numbering::renumber;
pub use template::{TemplateMode, TemplateStats};

use template::StreamIndex;

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::mapping::ChannelResolver;
use crate::models::ChannelRecord;
use crate::utils::format_elapsed;

/// Records produced by one reconciliation plus what happened to the inputs
#[derive(Debug, Clone, Default, Serialize)]
pub struct Reconciliation {
    pub records: Vec<ChannelRecord>,
    pub dedup: DedupReport,
    /// Present for template merges only
    pub template: Option<TemplateStats>,
}

/// Reconciliation engine bound to one resolver
#[derive(Debug, Clone)]
pub struct Reconciler {
    resolver: Arc<ChannelResolver>,
}

impl Reconciler {
    pub fn new(resolver: Arc<ChannelResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ChannelResolver {
        &self.resolver
    }

    /// Resolve a record's standard name and fill empty group and display name
    pub fn canonicalize(&self, record: &mut ChannelRecord) {
        let standard = self.resolver.resolve(record.lookup_name()).to_string();
        if record.group_title.is_empty() {
            record.group_title = self.resolver.group_for(&standard).to_string();
        }
        if record.display_name.is_empty() {
            record.display_name = standard.clone();
        }
        record.standard_name = standard;
    }

    /// Merge sources in list order, deduplicate by URL and renumber
    pub fn merge_sources(&self, sources: Vec<Vec<ChannelRecord>>) -> Reconciliation {
        let start = Instant::now();
        let source_count = sources.len();

        let mut combined = Vec::with_capacity(sources.iter().map(Vec::len).sum());
        for (index, source) in sources.into_iter().enumerate() {
            debug!("Merging source index={} records={}", index, source.len());
            for mut record in source {
                self.canonicalize(&mut record);
                combined.push(record);
            }
        }

        let (mut records, dedup) = dedup_by_url(combined);
        renumber(&mut records);

        info!(
            "Merged sources sources={} records={} duplicates={} elapsed={}",
            source_count,
            records.len(),
            dedup.duplicates(),
            format_elapsed(start.elapsed())
        );
        Reconciliation {
            records,
            dedup,
            template: None,
        }
    }

    /// Reconcile a template playlist against a stream source
    ///
    /// The source is keyed by raw channel name. Deduplication and renumbering
    /// always run after matching, in both modes.
    pub fn merge_template(
        &self,
        template: Vec<ChannelRecord>,
        source: &[ChannelRecord],
        mode: TemplateMode,
    ) -> Reconciliation {
        let start = Instant::now();
        let index = StreamIndex::from_records(source);
        let (matched, stats) = template::match_template(&self.resolver, template, &index, mode);

        let (mut records, dedup) = dedup_by_url(matched);
        renumber(&mut records);

        info!(
            "Template merge mode={} template={} source_names={} matched={} unmatched={} appended={} records={} elapsed={}",
            mode,
            stats.template_records,
            stats.source_names,
            stats.matched,
            stats.unmatched,
            stats.appended,
            records.len(),
            format_elapsed(start.elapsed())
        );
        Reconciliation {
            records,
            dedup,
            template: Some(stats),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelCatalog;
    use crate::sources::StreamListParser;

    fn reconciler() -> Reconciler {
        let catalog = ChannelCatalog {
            categories: vec![("央视频道".into(), vec!["CCTV1".into(), "CCTV2".into()])],
            mapping: vec![
                ("CCTV1".into(), vec!["CCTV-1".into()]),
                ("CCTV2".into(), vec!["CCTV-2".into()]),
            ],
        };
        Reconciler::new(Arc::new(ChannelResolver::from_catalog(&catalog, "其他")))
    }

    #[test]
    fn merge_sources_resolves_dedups_and_renumbers() {
        let parser = StreamListParser::new();
        let first = parser.parse_records("CCTV-1,rtp://a\nCCTV-2,rtp://b\n");
        let second = parser.parse_records("CCTV1,rtp://a\n地方台,rtp://c\n坏行,\n");

        let result = reconciler().merge_sources(vec![first, second]);

        let names: Vec<_> = result.records.iter().map(|r| r.standard_name.as_str()).collect();
        assert_eq!(names, vec!["CCTV1", "CCTV2", "地方台"]);
        let ids: Vec<_> = result.records.iter().map(|r| r.sequence_id).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(result.records[0].display_name, "CCTV-1");
        assert_eq!(result.records[0].group_title, "央视频道");
        assert_eq!(result.records[2].group_title, "其他");
        assert_eq!(result.dedup.duplicates(), 1);
        assert_eq!(result.dedup.without_url, 1);
        assert!(result.template.is_none());
    }

    #[test]
    fn merge_sources_prefers_duplicate_with_artwork() {
        let without = ChannelRecord::from_stream("CCTV1", "X");
        let mut with = ChannelRecord::from_stream("CCTV1", "X");
        with.set_artwork(Some("L".to_string()));

        let result = reconciler().merge_sources(vec![vec![without], vec![with]]);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].artwork_ref.as_deref(), Some("L"));
    }

    #[test]
    fn existing_group_is_kept_in_general_merge() {
        let mut record = ChannelRecord::from_stream("CCTV1", "rtp://a");
        record.group_title = "自定义".to_string();

        let result = reconciler().merge_sources(vec![vec![record]]);
        assert_eq!(result.records[0].group_title, "自定义");
    }

    #[test]
    fn template_merge_dedups_shared_urls() {
        let template = vec![
            ChannelRecord {
                standard_name: "CCTV-1".into(),
                ..ChannelRecord::default()
            },
            ChannelRecord {
                standard_name: "CCTV1".into(),
                ..ChannelRecord::default()
            },
        ];
        let source = StreamListParser::new().parse_records("CCTV1,rtp://a\n");

        let result = reconciler().merge_template(template, &source, TemplateMode::FilterOnly);

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].sequence_id, Some(1));
        assert_eq!(result.records[0].display_name, "CCTV1");
        assert_eq!(result.template.map(|t| t.matched), Some(2));
    }
}
