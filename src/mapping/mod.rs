//! Channel name canonicalization
//!
//! [`AliasMap`] maps raw names to standard names, [`CategoryIndex`] maps
//! standard names to groups, and [`ChannelResolver`] combines both with the
//! configured default group. All three are built once and shared read-only
//! (behind an `Arc` where a stage needs to own one).

pub mod alias;
pub mod category;
pub mod resolver;

pub use alias::AliasMap;
pub use category::CategoryIndex;
pub use resolver::ChannelResolver;
