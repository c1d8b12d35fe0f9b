//! Session-history synchronization for the stack navigator
//!
//! This crate is the only place that talks to the platform's history API.
//! It persists full stack snapshots into history entries, reads them back
//! when the user navigates with back/forward, and optionally mirrors the
//! active route into the URL.
//!
//! # Modules
//!
//! - [`platform`] - The platform history trait and an in-memory implementation
//! - [`bridge`] - Snapshot persistence and reconciliation
//! - [`url`] - URL mode (path and query mirroring)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bridge;
pub mod platform;
pub mod url;

pub use bridge::{read_snapshot, write_snapshot, HistoryBridge, HistoryError, InitialSource, InitialState};
pub use platform::{MemoryHistory, PlatformHistory, PopStateListener};
pub use url::UrlMode;
