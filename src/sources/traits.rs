//! Parser trait shared by all playlist formats

use crate::models::PlaylistDocument;

/// Infallible line-oriented playlist parser
///
/// Implementations skip anything they cannot interpret; a parser never
/// rejects a whole file because of a malformed line.
pub trait PlaylistParser: Send + Sync {
    fn parse(&self, content: &str) -> PlaylistDocument;
}
