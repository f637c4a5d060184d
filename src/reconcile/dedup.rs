//! URL deduplication
//!
//! Single pass over the records with a `url → position` index into the output
//! vector. The first record seen for a URL keeps its position; a later
//! duplicate replaces it only when the kept record has no artwork and the
//! duplicate does.

use serde::Serialize;
use std::collections::HashMap;
use strum::Display;
use tracing::{debug, info};

use crate::models::ChannelRecord;
use crate::utils::UrlUtils;

/// Why a record was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DedupReason {
    /// Same URL as an earlier record, which was kept
    DuplicateUrl,
    /// Earlier record without artwork, replaced by a later duplicate with artwork
    ReplacedByArtwork,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedRecord {
    pub name: String,
    pub stream_url: String,
    pub reason: DedupReason,
}

impl RemovedRecord {
    fn new(record: &ChannelRecord, reason: DedupReason) -> Self {
        Self {
            name: record.lookup_name().to_string(),
            stream_url: record.stream_url.clone(),
            reason,
        }
    }
}

/// Outcome of one dedup pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DedupReport {
    pub original: usize,
    pub kept: usize,
    /// Records dropped for having no stream URL
    pub without_url: usize,
    pub removed: Vec<RemovedRecord>,
}

impl DedupReport {
    pub fn duplicates(&self) -> usize {
        self.removed.len()
    }

    /// Plain-text listing of removed duplicates
    pub fn render(&self) -> String {
        let mut out = format!(
            "Deduplication: {} -> {} records ({} duplicates, {} without URL)\n",
            self.original,
            self.kept,
            self.duplicates(),
            self.without_url
        );
        for removed in &self.removed {
            out.push_str(&format!(
                "  - {} {} [{}]\n",
                removed.name,
                UrlUtils::obfuscate_credentials(&removed.stream_url),
                removed.reason
            ));
        }
        out
    }
}

/// Remove records without a URL and collapse records sharing a URL
pub fn dedup_by_url(records: Vec<ChannelRecord>) -> (Vec<ChannelRecord>, DedupReport) {
    let mut report = DedupReport {
        original: records.len(),
        ..DedupReport::default()
    };
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut kept: Vec<ChannelRecord> = Vec::with_capacity(records.len());

    for record in records {
        if record.stream_url.is_empty() {
            report.without_url += 1;
            continue;
        }

        match positions.get(&record.stream_url) {
            Some(&pos) => {
                if !kept[pos].has_artwork() && record.has_artwork() {
                    debug!(
                        "Replacing artwork-less duplicate name={} url={}",
                        kept[pos].lookup_name(),
                        UrlUtils::obfuscate_credentials(&record.stream_url)
                    );
                    let replaced = std::mem::replace(&mut kept[pos], record);
                    report
                        .removed
                        .push(RemovedRecord::new(&replaced, DedupReason::ReplacedByArtwork));
                } else {
                    report
                        .removed
                        .push(RemovedRecord::new(&record, DedupReason::DuplicateUrl));
                }
            }
            None => {
                positions.insert(record.stream_url.clone(), kept.len());
                kept.push(record);
            }
        }
    }

    report.kept = kept.len();
    info!(
        "Deduplicated records original={} kept={} duplicates={} without_url={}",
        report.original,
        report.kept,
        report.duplicates(),
        report.without_url
    );
    (kept, report)
}
