//! Write-only category audit log
//!
//! Records every (entity, category, resolved address) triple discovered
//! during a scope's traversal. Never read back by the crawler; no index.

use crate::hierarchy::ScopeKey;
use crate::Result;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// One discovered sub-entity and the address it resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRecord {
    pub scope: ScopeKey,
    pub entity_name: String,
    pub category_name: String,
    pub resolved_address: String,
}

/// Append-only log of discovered categories
pub struct CategoryLog {
    writer: csv::Writer<File>,
}

impl CategoryLog {
    /// Opens (or creates) the log file for appending
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: csv::Writer::from_writer(file),
        })
    }

    /// Appends a batch of records and flushes
    pub fn append_batch(&mut self, records: &[CategoryRecord]) -> Result<()> {
        for record in records {
            self.writer.write_record([
                record.scope.to_string().as_str(),
                &record.entity_name,
                &record.category_name,
                &record.resolved_address,
            ])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_batch_writes_one_line_per_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("categories-2016.csv");
        let mut log = CategoryLog::open(&path).unwrap();

        log.append_batch(&[
            CategoryRecord {
                scope: 2016,
                entity_name: "Mechanical".to_string(),
                category_name: "Compulsory".to_string(),
                resolved_address: "http://example.edu/cat?c=1".to_string(),
            },
            CategoryRecord {
                scope: 2016,
                entity_name: "Mechanical".to_string(),
                category_name: "Elective".to_string(),
                resolved_address: "http://example.edu/cat?c=2".to_string(),
            },
        ])
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.starts_with("2016,Mechanical,Compulsory,"));
    }

    #[test]
    fn test_appends_accumulate_across_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("categories-2016.csv");

        let record = CategoryRecord {
            scope: 2016,
            entity_name: "Mechanical".to_string(),
            category_name: "Compulsory".to_string(),
            resolved_address: String::new(),
        };

        CategoryLog::open(&path).unwrap().append_batch(&[record.clone()]).unwrap();
        CategoryLog::open(&path).unwrap().append_batch(&[record]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
