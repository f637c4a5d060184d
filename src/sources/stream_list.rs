//! Stream-list parser
//!
//! Stream lists are the CSV-like dumps produced by multicast scanners: one
//! `name,url` pair per line, optionally followed by `#<secondary-url>`, with
//! `Category,#genre#` section markers interleaved.

use tracing::debug;

use super::traits::PlaylistParser;
use crate::models::{ChannelRecord, PlaylistDocument};
use crate::utils::UrlUtils;

/// Parser for `name,url[#url]` stream lists
#[derive(Debug, Default, Clone, Copy)]
pub struct StreamListParser;

impl StreamListParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse stream-list content into records with an empty standard name
    pub fn parse_records(&self, content: &str) -> Vec<ChannelRecord> {
        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (line_num, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            let Some((name, rest)) = line.split_once(',') else {
                skipped += 1;
                debug!("Skipping stream-list line {} without a comma", line_num + 1);
                continue;
            };

            let name = name.trim();
            let rest = rest.trim();

            // Section marker such as `News,#genre#`
            if rest.starts_with('#') {
                skipped += 1;
                continue;
            }

            match rest.split_once('#') {
                Some((primary, secondary)) => {
                    let primary = primary.trim();
                    let secondary = secondary.trim();
                    records.push(ChannelRecord::from_stream(name, primary));
                    if UrlUtils::is_stream_url(secondary) {
                        records.push(ChannelRecord::from_stream(name, secondary));
                    }
                }
                None => records.push(ChannelRecord::from_stream(name, rest)),
            }
        }

        debug!(
            "Parsed stream list: records={} skipped_lines={}",
            records.len(),
            skipped
        );
        records
    }
}

impl PlaylistParser for StreamListParser {
    fn parse(&self, content: &str) -> PlaylistDocument {
        PlaylistDocument::new(Default::default(), self.parse_records(content))
    }
}
