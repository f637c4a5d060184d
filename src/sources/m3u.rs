//! M3U playlist parser
//!
//! Reads `#EXTM3U` header metadata and `#EXTINF` + URL pairs into a
//! [`PlaylistDocument`]. The parser never fails: malformed or orphaned lines
//! are skipped and counted.

use std::collections::HashMap;
use tracing::debug;

use super::traits::PlaylistParser;
use crate::models::{ChannelRecord, DEFAULT_DURATION, PlaylistDocument, PlaylistHeader};
use crate::utils::UrlUtils;

/// M3U / M3U8 playlist parser
#[derive(Debug, Default, Clone, Copy)]
pub struct M3uParser;

impl M3uParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse M3U content into a document
    pub fn parse_document(&self, content: &str) -> PlaylistDocument {
        let mut header = PlaylistHeader::default();
        let mut records = Vec::new();
        let mut current_channel: Option<ChannelRecord> = None;
        let mut orphaned = 0usize;

        for (line_num, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with("#EXTM3U") {
                let attributes = parse_attributes(line);
                if let Some(name) = attributes.get("name").filter(|v| !v.is_empty()) {
                    header.name = Some(name.clone());
                }
                if let Some(epg) = attributes.get("x-tvg-url").filter(|v| !v.is_empty()) {
                    header.epg_url = Some(epg.clone());
                }
            } else if line.starts_with("#EXTINF") {
                if current_channel.is_some() {
                    orphaned += 1;
                    debug!("Discarding #EXTINF without URL before line {}", line_num + 1);
                }
                current_channel = Some(self.parse_extinf_line(line));
            } else if UrlUtils::is_stream_url(line) {
                if let Some(mut channel) = current_channel.take() {
                    channel.stream_url = line.to_string();
                    records.push(channel);
                } else {
                    orphaned += 1;
                    debug!("Skipping stream URL without #EXTINF at line {}", line_num + 1);
                }
            }
        }

        if current_channel.is_some() {
            orphaned += 1;
        }

        debug!(
            "Parsed M3U playlist: records={} orphaned_lines={}",
            records.len(),
            orphaned
        );
        PlaylistDocument::new(header, records)
    }

    /// Parse one `#EXTINF` line into a pending record without a URL
    ///
    /// Attributes may appear in any order and are optional. The display name
    /// follows the last comma that is not inside a quoted value.
    pub fn parse_extinf_line(&self, line: &str) -> ChannelRecord {
        let body = line
            .strip_prefix("#EXTINF:")
            .or_else(|| line.strip_prefix("#EXTINF"))
            .unwrap_or(line);

        let attributes = parse_attributes(body);
        let display_name = display_name_of(body);
        let attr = |key: &str| attributes.get(key).cloned().unwrap_or_default();

        let mut standard_name = attr("tvg-name");
        if standard_name.is_empty() {
            standard_name = display_name.clone();
        }

        let mut record = ChannelRecord {
            standard_name,
            display_name,
            group_title: attr("group-title"),
            tvg_id: attributes.get("tvg-id").filter(|v| !v.is_empty()).cloned(),
            duration: duration_of(body),
            ..ChannelRecord::default()
        };
        record.set_artwork(attributes.get("tvg-logo").cloned());
        record
    }
}

impl PlaylistParser for M3uParser {
    fn parse(&self, content: &str) -> PlaylistDocument {
        self.parse_document(content)
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Extract `key="value"` pairs; the first occurrence of a key wins
fn parse_attributes(text: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();
    let mut rest = text;

    while let Some(eq) = rest.find("=\"") {
        let key_start = rest[..eq]
            .char_indices()
            .rev()
            .find(|(_, c)| !is_key_char(*c))
            .map_or(0, |(i, c)| i + c.len_utf8());
        let key = &rest[key_start..eq];

        let after = &rest[eq + 2..];
        let Some(close) = after.find('"') else {
            break;
        };

        if !key.is_empty() {
            attributes
                .entry(key.to_string())
                .or_insert_with(|| after[..close].to_string());
        }
        rest = &after[close + 1..];
    }

    attributes
}

/// Text after the last comma outside a `key="value"` span, unless that text
/// is itself an attribute list
fn display_name_of(body: &str) -> String {
    let mut last_comma = None;
    let mut i = 0;
    while let Some(c) = body[i..].chars().next() {
        if body[i..].starts_with("=\"")
            && body[..i].chars().next_back().is_some_and(is_key_char)
        {
            match body[i + 2..].find('"') {
                Some(close) => {
                    i += 2 + close + 1;
                    continue;
                }
                None => break,
            }
        }
        if c == ',' {
            last_comma = Some(i);
        }
        i += c.len_utf8();
    }

    match last_comma {
        Some(pos) => {
            let tail = body[pos + 1..].trim();
            if tail.contains("=\"") {
                String::new()
            } else {
                tail.to_string()
            }
        }
        None => String::new(),
    }
}

/// Leading `-?\d+` token of the `#EXTINF` body, `-1` when absent
fn duration_of(body: &str) -> String {
    let trimmed = body.trim_start();
    let sign = usize::from(trimmed.starts_with('-'));
    let digits = trimmed[sign..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .count();

    if digits == 0 {
        DEFAULT_DURATION.to_string()
    } else {
        trimmed[..sign + digits].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SAMPLE: &str = r#"#EXTM3U name="Beijing Unicom"
#EXTM3U x-tvg-url="http://epg.example/e.xml"
#EXTINF:-1 tvg-id="1" tvg-name="CCTV1" tvg-logo="http://logo/CCTV1.png" group-title="央视频道",CCTV-1 综合
rtp://239.3.1.129:8008
#EXTINF:-1 group-title="卫视频道",北京卫视
http://example.com/btv.m3u8
"#;

    #[test]
    fn parses_header_and_records() {
        let doc = M3uParser::new().parse_document(SAMPLE);

        assert_eq!(doc.header.name.as_deref(), Some("Beijing Unicom"));
        assert_eq!(doc.header.epg_url.as_deref(), Some("http://epg.example/e.xml"));
        assert_eq!(doc.records.len(), 2);

        let first = &doc.records[0];
        assert_eq!(first.standard_name, "CCTV1");
        assert_eq!(first.display_name, "CCTV-1 综合");
        assert_eq!(first.artwork_ref.as_deref(), Some("http://logo/CCTV1.png"));
        assert_eq!(first.group_title, "央视频道");
        assert_eq!(first.stream_url, "rtp://239.3.1.129:8008");
        assert_eq!(first.tvg_id.as_deref(), Some("1"));
        assert_eq!(first.sequence_id, None);

        let second = &doc.records[1];
        assert_eq!(second.standard_name, "北京卫视");
        assert_eq!(second.artwork_ref, None);
    }

    #[test]
    fn orphaned_extinf_is_replaced() {
        let content = "#EXTINF:-1,First\n#EXTINF:-1,Second\nrtp://239.1.1.1:9000\n";
        let doc = M3uParser::new().parse_document(content);

        assert_eq!(doc.records.len(), 1);
        assert_eq!(doc.records[0].display_name, "Second");
    }

    #[test]
    fn url_without_metadata_and_comments_are_ignored() {
        let content = "rtp://239.1.1.1:9000\n#EXTVLCOPT:network-caching=1000\n#EXTINF:-1,A\nudp://239.1.1.2:9000\n";
        let doc = M3uParser::new().parse_document(content);

        assert_eq!(doc.records.len(), 1);
        assert_eq!(doc.records[0].stream_url, "udp://239.1.1.2:9000");
    }

    #[rstest]
    #[case(r#"#EXTINF:-1 tvg-name="A, B" group-title="G",Label"#, "A, B", "Label")]
    #[case(r#"#EXTINF:-1,tvg-id="3" tvg-name="CCTV3" group-title="G",CCTV3"#, "CCTV3", "CCTV3")]
    #[case(r#"#EXTINF:-1,tvg-name="CCTV5" group-title="G""#, "CCTV5", "")]
    #[case("#EXTINF:-1,Plain Name", "Plain Name", "Plain Name")]
    #[case("#EXTINF:-1", "", "")]
    #[case(r#"#EXTINF:-1,12" Screen, HD"#, "HD", "HD")]
    #[case(r#"#EXTINF:-1 tvg-name="X" group-title="News, Local",Say "Hi", Now"#, "X", "Now")]
    fn extinf_names(#[case] line: &str, #[case] standard: &str, #[case] display: &str) {
        let record = M3uParser::new().parse_extinf_line(line);
        assert_eq!(record.standard_name, standard);
        assert_eq!(record.display_name, display);
    }

    #[rstest]
    #[case("#EXTINF:-1,A", "-1")]
    #[case("#EXTINF:0 tvg-id=\"1\",A", "0")]
    #[case("#EXTINF: 3600,A", "3600")]
    #[case("#EXTINF:,A", "-1")]
    fn extinf_duration(#[case] line: &str, #[case] expected: &str) {
        assert_eq!(M3uParser::new().parse_extinf_line(line).duration, expected);
    }

    #[test]
    fn attribute_keys_do_not_bleed_into_each_other() {
        let attributes = parse_attributes(r#"#EXTM3U x-tvg-name="epg" name="List""#);
        assert_eq!(attributes.get("name").map(String::as_str), Some("List"));
        assert_eq!(attributes.get("x-tvg-name").map(String::as_str), Some("epg"));
    }

    #[test]
    fn empty_logo_attribute_means_missing_artwork() {
        let record = M3uParser::new().parse_extinf_line(r#"#EXTINF:-1 tvg-logo="",A"#);
        assert!(!record.has_artwork());
    }
}
