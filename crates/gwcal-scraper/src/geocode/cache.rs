//! Disk-backed geocode response cache.
//!
//! One file per distinct query string, named by the hex encoding of the
//! query's UTF-8 bytes, holding the geocoder's response body verbatim. The
//! cache is best-effort: a missing, unreadable or corrupt file is a miss,
//! and a failed write is reported to the caller, who is free to ignore it.
//! Entries are never expired.
//!
//! Hex doubles the byte length, so queries longer than about 120 bytes
//! exceed common file name limits; storing them fails and they are simply
//! never cached.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use gwcal_core::Coordinates;

use super::response;

const ENTRY_EXTENSION: &str = "json";

/// A decoded cache file, as listed by [`GeocodeCache::entries`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub query: String,
    /// `None` when the file could not be read or is not valid JSON.
    pub body: Option<String>,
}

impl CacheEntry {
    /// Coordinates of the stored first candidate, if any.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        let value = serde_json::from_str::<serde_json::Value>(self.body.as_deref()?).ok()?;
        response::first_candidate(&value)
    }
}

#[derive(Debug, Clone)]
pub struct GeocodeCache {
    dir: PathBuf,
}

impl GeocodeCache {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the cache directory if needed.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error; callers usually log and continue.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Lower-case hex of the query's UTF-8 bytes. Casing and punctuation are
    /// preserved, so distinct queries never share a key.
    #[must_use]
    pub fn key_for(query: &str) -> String {
        query
            .as_bytes()
            .iter()
            .fold(String::with_capacity(query.len() * 2), |mut out, b| {
                let _ = write!(out, "{b:02x}");
                out
            })
    }

    /// Inverse of [`GeocodeCache::key_for`].
    #[must_use]
    pub fn query_for_key(key: &str) -> Option<String> {
        if key.len() % 2 != 0 || !key.is_ascii() {
            return None;
        }
        let bytes = (0..key.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&key[i..i + 2], 16).ok())
            .collect::<Option<Vec<u8>>>()?;
        String::from_utf8(bytes).ok()
    }

    #[must_use]
    pub fn path_for(&self, query: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{ENTRY_EXTENSION}", Self::key_for(query)))
    }

    /// Returns the stored body for `query` if it exists and parses as JSON.
    pub async fn lookup(&self, query: &str) -> Option<String> {
        let path = self.path_for(query);
        let body = match tokio::fs::read_to_string(&path).await {
            Ok(body) => body,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    tracing::debug!(query, path = %path.display(), error = %err, "geocode cache read failed");
                }
                return None;
            }
        };
        if let Err(err) = serde_json::from_str::<serde_json::Value>(&body) {
            tracing::debug!(query, path = %path.display(), error = %err, "ignoring corrupt geocode cache entry");
            return None;
        }
        Some(body)
    }

    /// Writes `body` for `query`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error. The cache is an optimisation, so
    /// callers are expected to log and carry on.
    pub async fn store(&self, query: &str, body: &str) -> io::Result<()> {
        tokio::fs::write(self.path_for(query), body).await
    }

    /// Every entry in the cache directory, sorted by query. Files whose name
    /// is not a hex-encoded query are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory itself cannot be read.
    pub async fn entries(&self) -> io::Result<Vec<CacheEntry>> {
        let mut dir = tokio::fs::read_dir(&self.dir).await?;
        let mut entries = Vec::new();
        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            let Some(query) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(Self::query_for_key)
            else {
                continue;
            };
            let body = self.lookup(&query).await;
            entries.push(CacheEntry { query, body });
        }
        entries.sort_by(|a, b| a.query.cmp(&b.query));
        Ok(entries)
    }
}
