pub mod human_format;
pub mod url;

pub use human_format::{format_elapsed, format_percentage};
pub use url::UrlUtils;
