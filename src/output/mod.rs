//! Output files
//!
//! Everything a scope worker persists besides its ledgers: per-category
//! course record CSVs and the scope-level hierarchy dump. File names are
//! derived deterministically from the scope, entity, and category so a
//! re-run overwrites rather than duplicates.

use crate::hierarchy::{EntityNode, ScopeKey};
use crate::records::CourseRecord;
use crate::Result;
use std::path::{Path, PathBuf};

/// Derives the record file name for one (scope, entity, category) triple
pub fn record_file_name(scope: ScopeKey, entity: &str, category: &str) -> String {
    let stem = sanitize_filename::sanitize(format!("{}-{}-{}", scope, entity, category));
    format!("{}.csv", stem)
}

/// Writes a category's course records as one CSV row per record
///
/// Empty record sets produce no file; the category still counts toward
/// its entity's completion.
///
/// # Returns
///
/// * `Ok(Some(path))` - File written
/// * `Ok(None)` - Nothing to write
pub fn write_records(
    dir: &Path,
    scope: ScopeKey,
    entity: &str,
    category: &str,
    records: &[CourseRecord],
) -> Result<Option<PathBuf>> {
    if records.is_empty() {
        return Ok(None);
    }
    std::fs::create_dir_all(dir)?;

    let path = dir.join(record_file_name(scope, entity, category));
    let mut writer = csv::Writer::from_path(&path)?;
    for record in records {
        writer.write_record(record.fields())?;
    }
    writer.flush()?;
    Ok(Some(path))
}

/// Dumps a scope's flat hierarchy: one row per leaf entity, the name
/// followed by its full path
pub fn write_hierarchy(dir: &Path, scope: ScopeKey, leaves: &[EntityNode]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join(format!("hierarchy-{}.csv", scope));
    // Paths vary in depth, so rows vary in width
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(&path)?;
    for leaf in leaves {
        let row = std::iter::once(leaf.name.as_str()).chain(leaf.path.iter().map(String::as_str));
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(path)
}
