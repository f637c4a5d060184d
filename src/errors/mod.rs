//! Centralized error handling for the playlist reconciler
//!
//! # Error Categories
//!
//! - **Precondition Errors**: missing input files or directories
//! - **I/O Errors**: read/write failures, tagged with the offending path
//! - **Catalog Errors**: unreadable channel catalog files
//! - **Configuration Errors**: invalid runtime configuration
//!
//! # Usage
//!
//! ```rust
//! use m3u_reconcile::errors::{AppError, AppResult};
//!
//! fn require(path: &std::path::Path) -> AppResult<()> {
//!     if !path.exists() {
//!         return Err(AppError::missing_file(path));
//!     }
//!     Ok(())
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

