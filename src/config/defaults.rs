/// Configuration default values
///
/// All default values for configuration options live here so they can be
/// changed in one place.
// Catalog defaults
pub const DEFAULT_GROUP: &str = "Uncategorized";

// Artwork defaults
pub const DEFAULT_ARTWORK_ENABLED: bool = true;
pub const DEFAULT_ARTWORK_TEMPLATES: [&str; 2] = [
    "https://epg.112114.xyz/logo/{name}.png",
    "https://live.fanmingming.com/tv/{name}.png",
];
pub const DEFAULT_PROBE_TIMEOUT: &str = "5s";
pub const DEFAULT_MAX_CONCURRENT_PROBES: usize = 8;
pub const DEFAULT_PROBE_USER_AGENT: &str = concat!("m3u-reconcile/", env!("CARGO_PKG_VERSION"));

// Output defaults
pub const DEFAULT_EPG_URL: &str = "https://epg.112114.xyz/pp.xml,http://epg.51zmt.top:8000/e.xml";

// Coverage defaults
pub const DEFAULT_OPERATORS: [&str; 3] = ["移动", "联通", "电信"];
