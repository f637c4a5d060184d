//! Batch workflows over many playlist files
//!
//! Every workflow takes explicit input paths (see [`crate::discovery`]) and
//! returns a [`BatchReport`]. A failing item is logged and recorded in
//! `failed`; it never aborts the remaining items. Only preconditions of the
//! batch as a whole (missing template, unusable output directory) are fatal.

pub mod group_merge;
pub mod refresh;
pub mod template;

pub use group_merge::{GroupMergeItem, run_group_merge};
pub use refresh::{RefreshItem, run_refresh_batch};
pub use template::{TemplateItem, render_missing_artwork_report, run_template_batch};

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

use crate::artwork::{ArtworkBackfiller, BackfillReport};
use crate::errors::{AppError, AppResult};
use crate::models::ChannelRecord;
use crate::reconcile::Reconciler;

/// An item that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport<T> {
    pub processed: Vec<T>,
    pub failed: Vec<BatchFailure>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            processed: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> BatchReport<T> {
    /// Record the outcome of one item
    pub fn record(&mut self, path: &Path, outcome: AppResult<T>) {
        match outcome {
            Ok(item) => self.processed.push(item),
            Err(e) => {
                warn!("Batch item failed path={} error={}", path.display(), e);
                self.failed.push(BatchFailure {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                });
            }
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Shared collaborators for batch workflows
pub struct BatchContext {
    pub reconciler: Reconciler,
    /// `None` disables artwork backfill
    pub backfiller: Option<Arc<ArtworkBackfiller>>,
    /// `x-tvg-url` for playlists that have no header of their own
    pub epg_url: String,
}

impl BatchContext {
    pub async fn backfill(&self, records: &mut [ChannelRecord]) -> Option<BackfillReport> {
        match &self.backfiller {
            Some(backfiller) => Some(backfiller.backfill(records).await),
            None => None,
        }
    }
}

/// Create the output directory; failure is fatal for the batch
pub(crate) async fn prepare_output_dir(dir: &Path) -> AppResult<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::io(dir, e))
}
