//! The on-disk cache store.

use crate::archive::{is_tar_gz, store_file, unpack_tar_gz};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Observed state of a cache entry for a given request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Nothing is stored at the path
    Absent,
    /// Content is present but the caller asked for a refresh
    Stale,
    /// Content is present and may be reused
    Fresh,
}

impl EntryState {
    /// Whether a fetch is needed to satisfy the request.
    #[must_use]
    pub const fn needs_fetch(self) -> bool {
        !matches!(self, Self::Fresh)
    }
}

/// Options for [`CacheStore::get`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GetOptions {
    /// Refetch even when the entry is present
    pub force: bool,
}

impl GetOptions {
    /// Options forcing a refetch.
    #[must_use]
    pub const fn forced() -> Self {
        Self { force: true }
    }
}

/// Cache of downloaded payloads and small JSON records, keyed by logical path.
///
/// Logical paths are relative and `/`-separated (`clusters/2.38/config.json`).
/// The store only checks existence; it never expires entries on its own.
#[derive(Clone)]
pub struct CacheStore {
    root: PathBuf,
    fetcher: Arc<dyn Fetcher>,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl CacheStore {
    /// Open a store rooted at `root` that downloads over HTTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::with_fetcher(root, Arc::new(HttpFetcher::new()?)))
    }

    /// Create a store rooted at `root` using a custom fetcher.
    #[must_use]
    pub fn with_fetcher(root: impl Into<PathBuf>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            root: root.into(),
            fetcher,
        }
    }

    /// Absolute location for a logical path. Pure join, no I/O.
    #[must_use]
    pub fn location(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Whether anything is stored at `path`, regardless of freshness.
    #[must_use]
    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.checked(path.as_ref())
            .map(|p| p.exists())
            .unwrap_or(false)
    }

    /// State of the entry at `path` for a request with the given options.
    #[must_use]
    pub fn state(&self, path: impl AsRef<Path>, options: GetOptions) -> EntryState {
        match (self.exists(path), options.force) {
            (false, _) => EntryState::Absent,
            (true, true) => EntryState::Stale,
            (true, false) => EntryState::Fresh,
        }
    }

    /// Fetch `url` into `namespace`, or reuse what is already there.
    ///
    /// Gzipped tarballs are unpacked into the `namespace` directory; any other
    /// payload is stored as a single file at `namespace`. Existing content is
    /// replaced only after the new payload was fetched and extracted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Fetch`] on network or extraction failure.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn get(&self, url: &str, namespace: &str, options: GetOptions) -> Result<PathBuf> {
        let dest = self.checked(Path::new(namespace))?;

        let state = self.state(namespace, options);
        if !state.needs_fetch() {
            debug!(%namespace, "Reusing cached entry");
            return Ok(dest);
        }

        info!(%url, %namespace, ?state, "Populating cache entry");
        let data = self.fetcher.fetch(url).await?;

        if is_tar_gz(url) {
            unpack_tar_gz(url, &data, &dest)?;
        } else {
            store_file(&data, &dest)?;
        }

        debug!(location = %dest.display(), bytes = data.len(), "Cache entry populated");
        Ok(dest)
    }

    /// Read the raw bytes stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when nothing is stored at `path`.
    pub fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let logical = path.as_ref();
        let location = self.checked(logical)?;
        match std::fs::read(&location) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::not_found(logical.display().to_string()))
            }
            Err(e) => Err(Error::io(e, &location, "read")),
        }
    }

    /// Store raw bytes at `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn write(&self, path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
        let location = self.checked(path.as_ref())?;
        if let Some(parent) = location.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(e, parent, "create_dir_all"))?;
        }
        std::fs::write(&location, bytes).map_err(|e| Error::io(e, &location, "write"))
    }

    /// Store `value` as JSON pretty-printed with a 4-space indent.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_json<T: Serialize>(&self, path: impl AsRef<Path>, value: &T) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value
            .serialize(&mut ser)
            .map_err(|e| Error::configuration(format!("Failed to serialize JSON: {e}")))?;
        self.write(path, &buf)
    }

    /// Recursively delete everything under `namespace`. Absent is fine.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if removal fails for a reason other than absence.
    pub fn purge(&self, namespace: impl AsRef<Path>) -> Result<()> {
        let location = self.checked(namespace.as_ref())?;
        let result = if location.is_dir() {
            std::fs::remove_dir_all(&location)
        } else {
            std::fs::remove_file(&location)
        };
        match result {
            Ok(()) => {
                debug!(location = %location.display(), "Purged cache namespace");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io(e, &location, "purge")),
        }
    }

    /// Resolve a logical path, refusing anything that escapes the root.
    fn checked(&self, logical: &Path) -> Result<PathBuf> {
        if logical.as_os_str().is_empty() {
            return Err(Error::configuration("Empty cache path"));
        }
        for component in logical.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(Error::configuration(format!(
                        "Cache path must be relative and stay inside the cache: {}",
                        logical.display()
                    )));
                }
            }
        }
        Ok(self.root.join(logical))
    }
}
