//! Refresh existing M3U playlists: optional dedup, then artwork backfill

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{BatchContext, BatchReport, prepare_output_dir};
use crate::errors::{AppError, AppResult};
use crate::generator::M3uWriter;
use crate::models::PlaylistDocument;
use crate::reconcile::{dedup_by_url, renumber};
use crate::sources::{PlaylistFormat, load_playlist_as};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshItem {
    pub input: PathBuf,
    pub output: PathBuf,
    pub channels: usize,
    pub duplicates_removed: usize,
    pub artwork_added: usize,
}

impl BatchReport<RefreshItem> {
    pub fn total_channels(&self) -> usize {
        self.processed.iter().map(|i| i.channels).sum()
    }

    pub fn total_artwork_added(&self) -> usize {
        self.processed.iter().map(|i| i.artwork_added).sum()
    }
}

/// Rewrite each input under the same file name in `output_dir`
pub async fn run_refresh_batch(
    ctx: &BatchContext,
    inputs: &[PathBuf],
    output_dir: &Path,
    dedup: bool,
) -> AppResult<BatchReport<RefreshItem>> {
    prepare_output_dir(output_dir).await?;
    info!(
        "Starting refresh batch inputs={} output={} dedup={}",
        inputs.len(),
        output_dir.display(),
        dedup
    );

    let mut report = BatchReport::default();
    for input in inputs {
        let outcome = refresh_one(ctx, input, output_dir, dedup).await;
        report.record(input, outcome);
    }

    info!(
        "Refresh batch finished processed={} failed={} channels={} artwork_added={}",
        report.processed.len(),
        report.failed.len(),
        report.total_channels(),
        report.total_artwork_added()
    );
    Ok(report)
}

async fn refresh_one(
    ctx: &BatchContext,
    input: &Path,
    output_dir: &Path,
    dedup: bool,
) -> AppResult<RefreshItem> {
    let file_name = input
        .file_name()
        .ok_or_else(|| AppError::validation(format!("No file name: {}", input.display())))?;
    let document = load_playlist_as(input, PlaylistFormat::M3u).await?;
    let PlaylistDocument { header, mut records } = document;

    let mut duplicates_removed = 0;
    if dedup {
        let (kept, dedup_report) = dedup_by_url(records);
        duplicates_removed = dedup_report.duplicates();
        records = kept;
        renumber(&mut records);
    }

    let artwork_added = ctx
        .backfill(&mut records)
        .await
        .map(|r| r.filled)
        .unwrap_or(0);

    let document = PlaylistDocument::new(header, records);
    let output = output_dir.join(file_name);
    M3uWriter::new().write_to(&document, &output).await?;

    Ok(RefreshItem {
        input: input.to_path_buf(),
        output,
        channels: document.len(),
        duplicates_removed,
        artwork_added,
    })
}
