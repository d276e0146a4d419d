//! Immediate-mode persistence.
//!
//! Every file write in the crate, from a producer thread or from the
//! consumer, goes through [`SyncWriter`] and its lock, so two writers never
//! interleave bytes in the same file.

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

use crate::entry::LogEntry;
use crate::error::{self, ErrorHandler, LogError, Result};
use crate::paths::PathResolver;

/// Appends rendered entries to their per-severity files.
pub struct SyncWriter {
    resolver: PathResolver,
    lock: Mutex<()>,
    error_handler: Option<ErrorHandler>,
}

impl SyncWriter {
    /// Creates a writer over `resolver`, reporting failures to `error_handler`.
    pub fn new(resolver: PathResolver, error_handler: Option<ErrorHandler>) -> Self {
        Self {
            resolver,
            lock: Mutex::new(()),
            error_handler,
        }
    }

    /// The resolver used to locate files.
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Appends `entry` to its file and flushes.
    ///
    /// # Errors
    ///
    /// Returns the first failure among directory creation, open, and write.
    pub fn persist(&self, entry: &LogEntry) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.append(entry)
    }

    /// Persists `entry`, reporting a failure instead of returning it.
    ///
    /// Returns whether the entry reached disk.
    pub fn store(&self, entry: &LogEntry) -> bool {
        match self.persist(entry) {
            Ok(()) => true,
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    /// Persists entries in order. A failed entry is reported and skipped.
    ///
    /// Returns how many entries reached disk.
    pub fn store_batch<I>(&self, entries: I) -> usize
    where
        I: IntoIterator<Item = LogEntry>,
    {
        entries
            .into_iter()
            .filter(|entry| self.store(entry))
            .count()
    }

    pub(crate) fn report(&self, err: &LogError) {
        error::report(self.error_handler.as_ref(), err);
    }

    fn append(&self, entry: &LogEntry) -> Result<()> {
        let path = self.resolver.resolve(entry.severity())?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LogError::Open {
                path: path.clone(),
                source,
            })?;

        file.write_all(entry.rendered().as_bytes())
            .and_then(|()| file.flush())
            .map_err(|source| LogError::Write { path, source })
    }
}
