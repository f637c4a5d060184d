//! M3U serializer

use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::models::{ChannelRecord, PlaylistDocument, PlaylistHeader};

/// Renders documents as M3U text
#[derive(Debug, Default, Clone, Copy)]
pub struct M3uWriter;

impl M3uWriter {
    pub fn new() -> Self {
        Self
    }

    /// Header lines: one per present field, or a bare `#EXTM3U`
    pub fn render_header(&self, header: &PlaylistHeader) -> String {
        let mut out = String::new();
        if let Some(name) = &header.name {
            out.push_str(&format!("#EXTM3U name=\"{name}\"\n"));
        }
        if let Some(epg) = &header.epg_url {
            out.push_str(&format!("#EXTM3U x-tvg-url=\"{epg}\"\n"));
        }
        if out.is_empty() {
            out.push_str("#EXTM3U\n");
        }
        out
    }

    /// `#EXTINF` line for one record, without trailing newline
    ///
    /// Non-empty attributes are written in the fixed order `tvg-id`,
    /// `tvg-name`, `tvg-logo`, `group-title`, followed by the display name
    /// after the last comma.
    pub fn render_extinf(&self, record: &ChannelRecord) -> String {
        let mut extinf_line = format!("#EXTINF:{}", record.duration);

        let tvg_id = record
            .sequence_id
            .map(|id| id.to_string())
            .or_else(|| record.tvg_id.clone())
            .unwrap_or_default();
        let attributes = [
            ("tvg-id", tvg_id.as_str()),
            ("tvg-name", record.standard_name.as_str()),
            ("tvg-logo", record.artwork_ref.as_deref().unwrap_or_default()),
            ("group-title", record.group_title.as_str()),
        ];
        let rendered: Vec<String> = attributes
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("{key}=\"{value}\""))
            .collect();
        if !rendered.is_empty() {
            extinf_line.push(',');
            extinf_line.push_str(&rendered.join(" "));
        }

        let display_name = if record.display_name.is_empty() {
            &record.standard_name
        } else {
            &record.display_name
        };
        if !display_name.is_empty() {
            extinf_line.push(',');
            extinf_line.push_str(display_name);
        }

        extinf_line
    }

    pub fn render(&self, document: &PlaylistDocument) -> String {
        let mut out = self.render_header(&document.header);
        for record in &document.records {
            out.push_str(&self.render_extinf(record));
            out.push('\n');
            if !record.stream_url.is_empty() {
                out.push_str(&record.stream_url);
                out.push('\n');
            }
        }
        out
    }

    /// Render and write to `path`, creating parent directories
    pub async fn write_to(&self, document: &PlaylistDocument, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::io(parent, e))?;
        }

        let content = self.render(document);
        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| AppError::io(path, e))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| AppError::io(path, e))?;
        file.flush().await.map_err(|e| AppError::io(path, e))?;

        info!(
            "Wrote M3U playlist path={} channels={} bytes={}",
            path.display(),
            document.len(),
            content.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::M3uParser;

    fn record() -> ChannelRecord {
        ChannelRecord {
            standard_name: "CCTV1".into(),
            display_name: "CCTV-1 综合".into(),
            artwork_ref: Some("http://logo/CCTV1.png".into()),
            group_title: "央视频道".into(),
            stream_url: "rtp://239.3.1.129:8008".into(),
            sequence_id: Some(1),
            ..ChannelRecord::default()
        }
    }

    #[test]
    fn renders_header_and_record() {
        let doc = PlaylistDocument::new(
            PlaylistHeader::new("北京联通", "http://epg/e.xml"),
            vec![record()],
        );

        assert_eq!(
            M3uWriter::new().render(&doc),
            "#EXTM3U name=\"北京联通\"\n\
             #EXTM3U x-tvg-url=\"http://epg/e.xml\"\n\
             #EXTINF:-1,tvg-id=\"1\" tvg-name=\"CCTV1\" tvg-logo=\"http://logo/CCTV1.png\" group-title=\"央视频道\",CCTV-1 综合\n\
             rtp://239.3.1.129:8008\n"
        );
    }

    #[test]
    fn bare_header_without_metadata() {
        let doc = PlaylistDocument::default();
        assert_eq!(M3uWriter::new().render(&doc), "#EXTM3U\n");
    }

    #[test]
    fn empty_attributes_are_omitted_and_display_falls_back() {
        let record = ChannelRecord {
            standard_name: "本地台".into(),
            stream_url: "rtp://x".into(),
            duration: "0".into(),
            artwork_ref: Some(String::new()),
            ..ChannelRecord::default()
        };
        assert_eq!(
            M3uWriter::new().render_extinf(&record),
            "#EXTINF:0,tvg-name=\"本地台\",本地台"
        );
    }

    #[test]
    fn raw_tvg_id_is_used_until_renumbered() {
        let mut record = record();
        record.sequence_id = None;
        record.tvg_id = Some("cctv1.cn".into());
        assert!(M3uWriter::new().render_extinf(&record).contains("tvg-id=\"cctv1.cn\""));
    }

    #[test]
    fn output_parses_back() {
        let doc = PlaylistDocument::new(PlaylistHeader::new("x", ""), vec![record()]);
        let text = M3uWriter::new().render(&doc);
        let parsed = M3uParser::new().parse_document(&text);

        assert_eq!(parsed.header, doc.header);
        let back = &parsed.records[0];
        assert_eq!(back.standard_name, "CCTV1");
        assert_eq!(back.display_name, "CCTV-1 综合");
        assert_eq!(back.group_title, "央视频道");
        assert_eq!(back.artwork_ref, doc.records[0].artwork_ref);
        assert_eq!(back.stream_url, doc.records[0].stream_url);
    }

    #[tokio::test]
    async fn write_to_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/list.m3u");

        let doc = PlaylistDocument::new(PlaylistHeader::default(), vec![record()]);
        M3uWriter::new().write_to(&doc, &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("#EXTM3U\n#EXTINF:-1,"));
    }
}
