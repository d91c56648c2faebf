//! Durable, append-only crawl ledgers
//!
//! A [`Ledger`] records which entities have been processed (or have
//! failed) so that a re-run skips them. The file is append-only for the
//! lifetime of the process; the in-memory index is rebuilt from the file
//! contents every time a ledger is opened, so opening and appending are
//! the same operation.
//!
//! Re-recording an existing key is a no-op for the index but still
//! appends a line. This duplication is deliberate (the file doubles as a
//! cheap audit trail); consumers that need exactness keep the last record
//! per key.

mod category_log;

pub use category_log::{CategoryLog, CategoryRecord};

use crate::hierarchy::ScopeKey;
use crate::{CatalogError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// The durable unit recording one processed (or failed) entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub scope: ScopeKey,
    pub name: String,

    /// Address the entity resolved to when it was processed; empty for
    /// failure records
    pub resolved_address: String,

    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    /// Creates an entry stamped with the current time
    pub fn new(scope: ScopeKey, name: impl Into<String>, resolved_address: impl Into<String>) -> Self {
        Self {
            scope,
            name: name.into(),
            resolved_address: resolved_address.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Append-only record store with an O(1) membership index
pub struct Ledger {
    writer: csv::Writer<File>,
    index: HashSet<(ScopeKey, String)>,
    path: PathBuf,
}

impl Ledger {
    /// Opens (or creates) a ledger file, replaying every persisted record
    /// into the in-memory index
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut index = HashSet::new();
        if path.exists() {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_path(&path)?;
            for result in reader.records() {
                let record = result?;
                if record.len() < 2 {
                    return Err(CatalogError::Ledger {
                        path: path.display().to_string(),
                        message: format!("short record: {:?}", record),
                    });
                }
                let scope: ScopeKey =
                    record[0].trim().parse().map_err(|_| CatalogError::Ledger {
                        path: path.display().to_string(),
                        message: format!("non-numeric scope key '{}'", &record[0]),
                    })?;
                index.insert((scope, record[1].to_string()));
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            writer: csv::Writer::from_writer(file),
            index,
            path,
        })
    }

    /// O(1) lookup: has this entity been recorded?
    pub fn exists(&self, scope: ScopeKey, name: &str) -> bool {
        self.index.contains(&(scope, name.to_string()))
    }

    /// Appends the entry to the file and inserts it into the index
    ///
    /// Always appends, even for an already-indexed key. Returns whether
    /// the key was newly inserted into the index.
    pub fn record(&mut self, entry: &LedgerEntry) -> Result<bool> {
        self.writer.write_record([
            entry.scope.to_string().as_str(),
            &entry.name,
            &entry.resolved_address,
            &entry.timestamp.to_rfc3339(),
        ])?;
        self.writer.flush()?;
        Ok(self.index.insert((entry.scope, entry.name.clone())))
    }

    /// Number of distinct keys in the index
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
