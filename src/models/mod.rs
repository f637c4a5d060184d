//! Canonical channel records and playlist documents
//!
//! Every parser produces [`ChannelRecord`]s and every later stage consumes
//! them. The serde names match the M3U attribute names so that JSON exports
//! read like the playlist they came from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Duration marker used when a playlist entry does not carry one
pub const DEFAULT_DURATION: &str = "-1";

fn default_duration() -> String {
    DEFAULT_DURATION.to_string()
}

/// One entry in a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Canonical identity after alias resolution (`tvg-name`)
    #[serde(rename = "tvg-name", default)]
    pub standard_name: String,
    /// Label written after the last comma of `#EXTINF`
    #[serde(rename = "channel-name", default)]
    pub display_name: String,
    #[serde(rename = "tvg-logo", default, skip_serializing_if = "Option::is_none")]
    pub artwork_ref: Option<String>,
    #[serde(rename = "group-title", default)]
    pub group_title: String,
    #[serde(rename = "url", default)]
    pub stream_url: String,
    /// Assigned by renumbering only
    #[serde(rename = "tvg-id", default, skip_serializing_if = "Option::is_none")]
    pub sequence_id: Option<u32>,
    /// Raw `tvg-id` read from an input playlist
    #[serde(skip)]
    pub tvg_id: Option<String>,
    #[serde(default = "default_duration")]
    pub duration: String,
}

impl Default for ChannelRecord {
    fn default() -> Self {
        Self {
            standard_name: String::new(),
            display_name: String::new(),
            artwork_ref: None,
            group_title: String::new(),
            stream_url: String::new(),
            sequence_id: None,
            tvg_id: None,
            duration: default_duration(),
        }
    }
}

impl ChannelRecord {
    /// Record with a display name and stream URL only, as read from a stream list
    pub fn from_stream(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            display_name: name.into(),
            stream_url: url.into(),
            ..Self::default()
        }
    }

    /// Name used for alias resolution: the standard name, else the display name
    pub fn lookup_name(&self) -> &str {
        if self.standard_name.is_empty() {
            &self.display_name
        } else {
            &self.standard_name
        }
    }

    pub fn has_artwork(&self) -> bool {
        self.artwork_ref.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Set artwork, normalising an empty reference to `None`
    pub fn set_artwork(&mut self, artwork: Option<String>) {
        self.artwork_ref = artwork.filter(|s| !s.is_empty());
    }
}

/// Playlist-level metadata from `#EXTM3U` lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "x-tvg-url", default, skip_serializing_if = "Option::is_none")]
    pub epg_url: Option<String>,
}

impl PlaylistHeader {
    pub fn new(name: impl Into<String>, epg_url: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()).filter(|s: &String| !s.is_empty()),
            epg_url: Some(epg_url.into()).filter(|s: &String| !s.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.epg_url.is_none()
    }
}

/// Ordered records plus optional header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistDocument {
    pub header: PlaylistHeader,
    #[serde(rename = "channels")]
    pub records: Vec<ChannelRecord>,
}

impl PlaylistDocument {
    pub fn new(header: PlaylistHeader, records: Vec<ChannelRecord>) -> Self {
        Self { header, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> PlaylistSummary {
        PlaylistSummary::from_records(&self.records)
    }
}

/// Per-playlist statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaylistSummary {
    pub total: usize,
    pub with_name: usize,
    pub with_artwork: usize,
    pub with_url: usize,
    pub groups: BTreeMap<String, usize>,
}

impl PlaylistSummary {
    pub fn from_records(records: &[ChannelRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Self::default()
        };

        for record in records {
            if !record.lookup_name().is_empty() {
                summary.with_name += 1;
            }
            if record.has_artwork() {
                summary.with_artwork += 1;
            }
            if !record.stream_url.is_empty() {
                summary.with_url += 1;
            }
            if !record.group_title.is_empty() {
                *summary.groups.entry(record.group_title.clone()).or_insert(0) += 1;
            }
        }

        summary
    }

    /// Multi-line report in the same register as the other CLI reports
    pub fn render(&self) -> String {
        let mut out = format!(
            "Channels: {}\n  with name: {}\n  with artwork: {}\n  with url: {}\n",
            self.total, self.with_name, self.with_artwork, self.with_url
        );
        if !self.groups.is_empty() {
            out.push_str("Groups:\n");
            for (group, count) in &self.groups {
                out.push_str(&format!("  {group}: {count}\n"));
            }
        }
        out
    }
}
