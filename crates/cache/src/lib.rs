//! Download and extraction cache for d2
//!
//! This crate owns the on-disk cache tree used by the cluster tooling:
//! - Fetch-or-reuse of remote archives, unpacked under a namespace
//! - Forced refetch that replaces content only after a successful download
//! - Small raw/JSON records keyed by logical path
//! - Idempotent recursive purge of a namespace
//!
//! # Layout
//!
//! All paths handed to [`CacheStore`] are logical, relative to the store
//! root (`clusters/<name>/config.json`). Paths that are absolute or contain
//! `..` are rejected.
//!
//! Policy (when to force a refresh) belongs to callers; the store only
//! answers "is something there" and "go get it".

mod archive;
mod error;
mod fetch;
mod store;

// Re-export error types at crate root
pub use error::{Error, Result};

pub use fetch::{Fetcher, HttpFetcher};
pub use store::{CacheStore, EntryState, GetOptions};
