//! Parser selection and playlist file loading
//!
//! Formats are chosen from the file extension: `.txt`/`.csv` files are stream
//! lists, `.m3u`/`.m3u8` files are M3U playlists.

use std::path::Path;
use strum::{Display, EnumString};
use tracing::debug;

use super::m3u::M3uParser;
use super::stream_list::StreamListParser;
use super::traits::PlaylistParser;
use crate::errors::{AppError, AppResult};
use crate::models::PlaylistDocument;

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PlaylistFormat {
    StreamList,
    M3u,
}

impl PlaylistFormat {
    /// Detect the format from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "txt" | "csv" => Some(Self::StreamList),
            "m3u" | "m3u8" => Some(Self::M3u),
            _ => None,
        }
    }

    pub fn parser(self) -> Box<dyn PlaylistParser> {
        match self {
            Self::StreamList => Box::new(StreamListParser::new()),
            Self::M3u => Box::new(M3uParser::new()),
        }
    }
}

/// Read a playlist file and parse it with the parser for its extension
///
/// A missing file is a precondition error; an unknown extension is a
/// validation error.
pub async fn load_playlist(path: &Path) -> AppResult<PlaylistDocument> {
    let format = PlaylistFormat::from_path(path).ok_or_else(|| {
        AppError::validation(format!("Unsupported playlist extension: {}", path.display()))
    })?;
    load_playlist_as(path, format).await
}

/// Read a playlist file with an explicit format
pub async fn load_playlist_as(path: &Path, format: PlaylistFormat) -> AppResult<PlaylistDocument> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(AppError::missing_file(path));
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::io(path, e))?;
    let document = format.parser().parse(&content);

    debug!(
        "Loaded playlist path={} format={} records={}",
        path.display(),
        format,
        document.len()
    );
    Ok(document)
}
