//! Playlist format parsers
//!
//! Each input format has its own parser implementing [`PlaylistParser`].
//! Parsers turn raw text into [`crate::models::ChannelRecord`]s without any
//! alias resolution; that happens later in [`crate::mapping`].
//!
//! # Usage
//!
//! ```rust
//! use m3u_reconcile::sources::{PlaylistFormat, PlaylistParser};
//!
//! let parser = PlaylistFormat::StreamList.parser();
//! let doc = parser.parse("CCTV1,rtp://239.1.1.1:9000");
//! assert_eq!(doc.records[0].display_name, "CCTV1");
//! ```

pub mod factory;
pub mod m3u;
pub mod stream_list;
pub mod traits;

pub use factory::{PlaylistFormat, load_playlist, load_playlist_as};
pub use m3u::M3uParser;
pub use stream_list::StreamListParser;
pub use traits::PlaylistParser;
