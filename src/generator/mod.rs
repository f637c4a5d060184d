//! Playlist output: M3U rendering plus JSON/CSV exports

pub mod export;
pub mod m3u;

pub use export::{ExportFormat, write_export};
pub use m3u::M3uWriter;
