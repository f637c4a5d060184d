//! JSON and CSV exports of a playlist document

use serde::Serialize;
use std::path::Path;
use strum::{Display, EnumString};
use tracing::info;

use super::M3uWriter;
use crate::errors::{AppError, AppResult};
use crate::models::{ChannelRecord, PlaylistDocument};

/// Output formats accepted by the `export` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    Json,
    Csv,
    M3u,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::M3u => "m3u",
        }
    }
}

pub const CSV_COLUMNS: [&str; 6] = [
    "tvg-name",
    "tvg-logo",
    "tvg-id",
    "group-title",
    "channel-name",
    "url",
];

#[derive(Serialize)]
struct JsonExport<'a> {
    header: &'a crate::models::PlaylistHeader,
    channels: &'a [ChannelRecord],
}

/// Pretty-printed `{ "header": ..., "channels": [...] }`
pub fn to_json(document: &PlaylistDocument) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(&JsonExport {
        header: &document.header,
        channels: &document.records,
    })?)
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// CSV with a header row and one row per record
pub fn to_csv(records: &[ChannelRecord]) -> String {
    let mut out = CSV_COLUMNS.join(",");
    out.push('\n');

    for record in records {
        let tvg_id = record
            .sequence_id
            .map(|id| id.to_string())
            .or_else(|| record.tvg_id.clone())
            .unwrap_or_default();
        let row = [
            record.standard_name.as_str(),
            record.artwork_ref.as_deref().unwrap_or_default(),
            tvg_id.as_str(),
            record.group_title.as_str(),
            record.display_name.as_str(),
            record.stream_url.as_str(),
        ];
        let fields: Vec<String> = row.iter().map(|f| csv_field(f)).collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

pub fn render(document: &PlaylistDocument, format: ExportFormat) -> AppResult<String> {
    match format {
        ExportFormat::Json => to_json(document),
        ExportFormat::Csv => Ok(to_csv(&document.records)),
        ExportFormat::M3u => Ok(M3uWriter::new().render(document)),
    }
}

/// Render in `format` and write to `path`
pub async fn write_export(
    document: &PlaylistDocument,
    format: ExportFormat,
    path: &Path,
) -> AppResult<()> {
    let content = render(document, format)?;
    tokio::fs::write(path, content.as_bytes())
        .await
        .map_err(|e| AppError::io(path, e))?;
    info!(
        "Exported playlist format={} path={} channels={}",
        format,
        path.display(),
        document.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlaylistHeader;
    use std::str::FromStr;

    fn document() -> PlaylistDocument {
        PlaylistDocument::new(
            PlaylistHeader::new("北京", "http://epg/e.xml"),
            vec![ChannelRecord {
                standard_name: "CCTV1".into(),
                display_name: "CCTV-1, 综合".into(),
                artwork_ref: Some("http://logo/1.png".into()),
                group_title: "央视频道".into(),
                stream_url: "rtp://a".into(),
                sequence_id: Some(1),
                ..ChannelRecord::default()
            }],
        )
    }

    #[test]
    fn json_export_uses_playlist_attribute_names() {
        let json: serde_json::Value = serde_json::from_str(&to_json(&document()).unwrap()).unwrap();

        assert_eq!(json["header"]["name"], "北京");
        assert_eq!(json["header"]["x-tvg-url"], "http://epg/e.xml");
        let channel = &json["channels"][0];
        assert_eq!(channel["tvg-name"], "CCTV1");
        assert_eq!(channel["tvg-logo"], "http://logo/1.png");
        assert_eq!(channel["tvg-id"], 1);
        assert_eq!(channel["group-title"], "央视频道");
        assert_eq!(channel["url"], "rtp://a");
        assert_eq!(channel["duration"], "-1");
    }

    #[test]
    fn csv_export_quotes_fields_with_commas() {
        let csv = to_csv(&document().records);
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[0], "tvg-name,tvg-logo,tvg-id,group-title,channel-name,url");
        assert_eq!(
            lines[1],
            "CCTV1,http://logo/1.png,1,央视频道,\"CCTV-1, 综合\",rtp://a"
        );
    }

    #[test]
    fn csv_field_escapes_quotes() {
        assert_eq!(csv_field(r#"say "hi""#), r#""say ""hi""""#);
        assert_eq!(csv_field("plain"), "plain");
    }

    #[test]
    fn format_from_str() {
        assert_eq!(ExportFormat::from_str("JSON").ok(), Some(ExportFormat::Json));
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert!(ExportFormat::from_str("xml").is_err());
    }
}
