//! Merge same-stem playlists from several directories

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{BatchContext, BatchReport, prepare_output_dir};
use crate::errors::AppResult;
use crate::generator::M3uWriter;
use crate::models::{PlaylistDocument, PlaylistHeader};
use crate::sources::load_playlist;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupMergeItem {
    pub stem: String,
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub channels: usize,
    pub duplicates_removed: usize,
}

/// Merge each `(stem, files)` group into `<output_dir>/<stem>.m3u`
///
/// Files are merged in the given order, so earlier directories win URL
/// collisions unless a later record brings artwork.
pub async fn run_group_merge(
    ctx: &BatchContext,
    groups: &[(String, Vec<PathBuf>)],
    output_dir: &Path,
) -> AppResult<BatchReport<GroupMergeItem>> {
    prepare_output_dir(output_dir).await?;
    info!("Starting group merge groups={}", groups.len());

    let mut report = BatchReport::default();
    for (stem, inputs) in groups {
        let outcome = merge_group(ctx, stem, inputs, output_dir).await;
        report.record(Path::new(stem), outcome);
    }

    info!(
        "Group merge finished processed={} failed={}",
        report.processed.len(),
        report.failed.len()
    );
    Ok(report)
}

async fn merge_group(
    ctx: &BatchContext,
    stem: &str,
    inputs: &[PathBuf],
    output_dir: &Path,
) -> AppResult<GroupMergeItem> {
    let mut sources = Vec::with_capacity(inputs.len());
    for input in inputs {
        let document = load_playlist(input).await?;
        debug!("Loaded input path={} channels={}", input.display(), document.len());
        sources.push(document.records);
    }

    let reconciliation = ctx.reconciler.merge_sources(sources);
    let mut records = reconciliation.records;
    ctx.backfill(&mut records).await;

    let document = PlaylistDocument::new(PlaylistHeader::new(stem, ctx.epg_url.clone()), records);
    let output = output_dir.join(format!("{stem}.m3u"));
    M3uWriter::new().write_to(&document, &output).await?;

    Ok(GroupMergeItem {
        stem: stem.to_string(),
        inputs: inputs.to_vec(),
        output,
        channels: document.len(),
        duplicates_removed: reconciliation.dedup.duplicates(),
    })
}
