//! Template playlist against many stream sources

use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{BatchContext, BatchReport, prepare_output_dir};
use crate::discovery::stem_of;
use crate::errors::{AppError, AppResult};
use crate::generator::M3uWriter;
use crate::models::{ChannelRecord, PlaylistDocument, PlaylistHeader};
use crate::reconcile::TemplateMode;
use crate::sources::{PlaylistFormat, load_playlist, load_playlist_as};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateItem {
    pub source: PathBuf,
    pub output: PathBuf,
    pub stem: String,
    pub channels: usize,
    /// Names still without artwork after backfill
    pub missing_artwork: Vec<String>,
}

/// Reconcile `template` against each source, writing `<output_dir>/<stem>.m3u`
///
/// The template's header is reused for every output.
pub async fn run_template_batch(
    ctx: &BatchContext,
    template: &Path,
    sources: &[PathBuf],
    output_dir: &Path,
    mode: TemplateMode,
) -> AppResult<BatchReport<TemplateItem>> {
    let template_doc = load_playlist_as(template, PlaylistFormat::M3u).await?;
    prepare_output_dir(output_dir).await?;

    info!(
        "Starting template batch template={} channels={} sources={} mode={}",
        template.display(),
        template_doc.len(),
        sources.len(),
        mode
    );

    let mut report = BatchReport::default();
    for source in sources {
        let outcome = process_source(ctx, &template_doc, source, output_dir, mode).await;
        report.record(source, outcome);
    }

    info!(
        "Template batch finished processed={} failed={}",
        report.processed.len(),
        report.failed.len()
    );
    Ok(report)
}

async fn process_source(
    ctx: &BatchContext,
    template: &PlaylistDocument,
    source: &Path,
    output_dir: &Path,
    mode: TemplateMode,
) -> AppResult<TemplateItem> {
    let stem = stem_of(source)
        .ok_or_else(|| AppError::validation(format!("No file stem: {}", source.display())))?;
    let source_doc = load_playlist(source).await?;

    let reconciliation =
        ctx.reconciler
            .merge_template(template.records.clone(), &source_doc.records, mode);
    let mut records = reconciliation.records;

    let missing_artwork = match ctx.backfill(&mut records).await {
        Some(backfill) => backfill.missing,
        None => names_without_artwork(&records),
    };

    let header = if template.header.is_empty() {
        PlaylistHeader::new(stem.clone(), ctx.epg_url.clone())
    } else {
        template.header.clone()
    };
    let document = PlaylistDocument::new(header, records);
    let output = output_dir.join(format!("{stem}.m3u"));
    M3uWriter::new().write_to(&document, &output).await?;

    info!(
        "Processed source={} channels={} missing_artwork={}",
        source.display(),
        document.len(),
        missing_artwork.len()
    );
    Ok(TemplateItem {
        source: source.to_path_buf(),
        output,
        stem,
        channels: document.len(),
        missing_artwork,
    })
}

/// Distinct non-empty lookup names lacking artwork, in first-appearance order
fn names_without_artwork(records: &[ChannelRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| !r.has_artwork())
        .map(ChannelRecord::lookup_name)
        .filter(|name| !name.is_empty() && seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Text listing of channels without artwork, one section per source
pub fn render_missing_artwork_report(items: &[TemplateItem]) -> String {
    let mut out = String::new();
    out.push_str("Channels without artwork\n");
    out.push_str(&format!("{}\n\n", "=".repeat(60)));
    for item in items.iter().filter(|i| !i.missing_artwork.is_empty()) {
        out.push_str(&format!("{} ({}):\n", item.stem, item.missing_artwork.len()));
        for name in &item.missing_artwork {
            out.push_str(&format!("  - {name}\n"));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_artwork_report_skips_complete_sources() {
        let items = vec![
            TemplateItem {
                source: "a.txt".into(),
                output: "out/a.m3u".into(),
                stem: "北京联通".into(),
                channels: 3,
                missing_artwork: vec!["本地台".into(), "教育台".into()],
            },
            TemplateItem {
                source: "b.txt".into(),
                output: "out/b.m3u".into(),
                stem: "天津电信".into(),
                channels: 2,
                missing_artwork: vec![],
            },
        ];

        let text = render_missing_artwork_report(&items);
        assert!(text.contains("北京联通 (2):\n  - 本地台\n  - 教育台\n"));
        assert!(!text.contains("天津电信"));
    }

    #[test]
    fn names_without_artwork_are_distinct_and_named() {
        let mut with_logo = ChannelRecord::from_stream("CCTV1", "rtp://239.0.0.1:5000");
        with_logo.set_artwork(Some("http://logo/CCTV1.png".into()));
        let records = vec![
            ChannelRecord::from_stream("本地台", "rtp://239.0.0.2:5000"),
            with_logo,
            ChannelRecord::from_stream("", "rtp://239.0.0.3:5000"),
            ChannelRecord::from_stream("本地台", "rtp://239.0.0.4:5000"),
            ChannelRecord::from_stream("教育台", "rtp://239.0.0.5:5000"),
        ];

        assert_eq!(names_without_artwork(&records), vec!["本地台", "教育台"]);
    }
}
