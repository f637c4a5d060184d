//! Artwork backfill
//!
//! Records without a `tvg-logo` get one from the first candidate URL that an
//! [`ArtworkProbe`] accepts. Candidates come from the configured URL
//! templates (see [`candidate_urls`]). Distinct names are probed concurrently
//! up to `max_concurrent_probes`, each candidate with its own timeout. Results
//! are cached per name for the lifetime of the backfiller, so a batch run
//! probes every name once.

pub mod candidates;
pub mod probe;

pub use candidates::candidate_urls;
pub use probe::{ArtworkProbe, HttpArtworkProbe};

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::ArtworkConfig;
use crate::models::ChannelRecord;
use crate::utils::format_elapsed;

/// Outcome of looking up artwork for one name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkLookup {
    Found(String),
    NotFound,
}

impl ArtworkLookup {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Found(url) => Some(url),
            Self::NotFound => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    /// Records that had no artwork
    pub examined: usize,
    pub filled: usize,
    /// Names still without artwork, in first-appearance order
    pub missing: Vec<String>,
}

pub struct ArtworkBackfiller {
    probe: Arc<dyn ArtworkProbe>,
    templates: Vec<String>,
    timeout: Duration,
    max_concurrent: usize,
    cache: Mutex<HashMap<String, ArtworkLookup>>,
}

impl ArtworkBackfiller {
    pub fn new(
        probe: Arc<dyn ArtworkProbe>,
        templates: Vec<String>,
        timeout: Duration,
        max_concurrent: usize,
    ) -> Self {
        Self {
            probe,
            templates,
            timeout,
            max_concurrent: max_concurrent.max(1),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(probe: Arc<dyn ArtworkProbe>, config: &ArtworkConfig) -> Self {
        Self::new(
            probe,
            config.templates.clone(),
            config.probe_timeout,
            config.max_concurrent_probes,
        )
    }

    fn cached(&self, name: &str) -> Option<ArtworkLookup> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned()
    }

    fn remember(&self, name: &str, lookup: &ArtworkLookup) {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name.to_string(), lookup.clone());
    }

    /// Probe candidates for one name in order; the first accepted one wins
    pub async fn lookup(&self, name: &str) -> ArtworkLookup {
        if let Some(hit) = self.cached(name) {
            return hit;
        }

        let mut lookup = ArtworkLookup::NotFound;
        for candidate in candidate_urls(&self.templates, name) {
            if self.probe.probe(&candidate, self.timeout).await {
                debug!("Found artwork name={} url={}", name, candidate);
                lookup = ArtworkLookup::Found(candidate);
                break;
            }
        }

        self.remember(name, &lookup);
        lookup
    }

    /// Fill missing artwork in place
    pub async fn backfill(&self, records: &mut [ChannelRecord]) -> BackfillReport {
        let start = Instant::now();
        let mut report = BackfillReport::default();

        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for record in records.iter().filter(|r| !r.has_artwork()) {
            report.examined += 1;
            let name = record.lookup_name();
            if !name.is_empty() && seen.insert(name.to_string()) {
                names.push(name.to_string());
            }
        }

        let results: HashMap<String, ArtworkLookup> = stream::iter(names.iter().cloned())
            .map(|name| async move {
                let lookup = self.lookup(&name).await;
                (name, lookup)
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        for record in records.iter_mut().filter(|r| !r.has_artwork()) {
            if let Some(url) = results.get(record.lookup_name()).and_then(ArtworkLookup::url) {
                record.set_artwork(Some(url.to_string()));
                report.filled += 1;
            }
        }

        report.missing = names
            .into_iter()
            .filter(|name| matches!(results.get(name), Some(ArtworkLookup::NotFound)))
            .collect();

        info!(
            "Artwork backfill examined={} filled={} missing_names={} elapsed={}",
            report.examined,
            report.filled,
            report.missing.len(),
            format_elapsed(start.elapsed())
        );
        report
    }
}
