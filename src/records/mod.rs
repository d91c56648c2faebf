//! Course record parsing
//!
//! The record table is fixed-arity: 13 ordered fields per row. Two fields
//! (course code and module) additionally carry a link. Blank or
//! whitespace cells in the hour columns are a defined normalization (they
//! mean zero), not an error; any other shape violation is structural and
//! skips the entity in progress.

use crate::markup::Cell;
use crate::{CatalogError, Result};

/// Number of fields in every record-table row
pub const RECORD_FIELD_COUNT: usize = 13;

/// One line-item of a category's course table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRecord {
    pub sequence: String,
    pub code: String,
    pub code_link: Option<String>,
    pub name: String,
    pub credit: String,
    pub hours_total: u32,
    pub hours_lecture: u32,
    pub hours_experiment: u32,
    pub hours_practice: u32,
    pub hours_computer: u32,
    pub design_hours: u32,
    pub semester: String,
    pub attribute: String,
    pub module: String,
    pub module_link: Option<String>,
}

impl CourseRecord {
    /// The record as 13 ordered text fields, ready for CSV output
    pub fn fields(&self) -> [String; RECORD_FIELD_COUNT] {
        [
            self.sequence.clone(),
            self.code.clone(),
            self.name.clone(),
            self.credit.clone(),
            self.hours_total.to_string(),
            self.hours_lecture.to_string(),
            self.hours_experiment.to_string(),
            self.hours_practice.to_string(),
            self.hours_computer.to_string(),
            self.design_hours.to_string(),
            self.semester.clone(),
            self.attribute.clone(),
            self.module.clone(),
        ]
    }
}

/// Parses the record table's rows into course records
///
/// The first cell-bearing row is the header; it and every data row must
/// carry exactly [`RECORD_FIELD_COUNT`] cells. Rows without `<td>` cells
/// (header rows built from `<th>`) are ignored.
///
/// # Errors
///
/// `StructuralRow` when a row's arity is wrong or a numeric column holds
/// non-blank, non-numeric text. Fatal for the category in progress.
pub fn parse_record_table(rows: &[Vec<Cell>]) -> Result<Vec<CourseRecord>> {
    let mut cell_rows = rows.iter().filter(|r| !r.is_empty());

    let Some(header) = cell_rows.next() else {
        return Ok(Vec::new());
    };
    if header.len() != RECORD_FIELD_COUNT {
        return Err(CatalogError::StructuralRow(format!(
            "header has {} cells, expected {}",
            header.len(),
            RECORD_FIELD_COUNT
        )));
    }

    let mut records = Vec::new();
    for (idx, row) in cell_rows.enumerate() {
        if row.len() != RECORD_FIELD_COUNT {
            return Err(CatalogError::StructuralRow(format!(
                "data row {} has {} cells, expected {}",
                idx,
                row.len(),
                RECORD_FIELD_COUNT
            )));
        }
        records.push(parse_row(row)?);
    }
    Ok(records)
}

fn parse_row(row: &[Cell]) -> Result<CourseRecord> {
    Ok(CourseRecord {
        sequence: row[0].text.clone(),
        code: row[1].text.clone(),
        code_link: row[1].link.as_ref().map(|l| l.address.clone()),
        name: row[2].text.clone(),
        credit: row[3].text.clone(),
        hours_total: parse_hours(&row[4].text, "total hours")?,
        hours_lecture: parse_hours(&row[5].text, "lecture hours")?,
        hours_experiment: parse_hours(&row[6].text, "experiment hours")?,
        hours_practice: parse_hours(&row[7].text, "practice hours")?,
        hours_computer: parse_hours(&row[8].text, "computer hours")?,
        design_hours: parse_hours(&row[9].text, "design hours")?,
        semester: row[10].text.clone(),
        attribute: row[11].text.clone(),
        module: row[12].text.clone(),
        module_link: row[12].link.as_ref().map(|l| l.address.clone()),
    })
}

/// Coerces a numeric cell: blank or whitespace means zero
fn parse_hours(text: &str, field: &str) -> Result<u32> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse::<u32>().map_err(|_| {
        CatalogError::StructuralRow(format!("non-numeric {} cell '{}'", field, text))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Cell;

    fn header() -> Vec<Cell> {
        [
            "No.", "Code", "Course", "Credit", "Hours", "Lecture", "Experiment", "Practice",
            "Computer", "Design", "Semester", "Attribute", "Module",
        ]
        .iter()
        .map(|t| Cell::text(*t))
        .collect()
    }

    fn data_row() -> Vec<Cell> {
        vec![
            Cell::text("1"),
            Cell::linked("MA101", "course.aspx?c=MA101"),
            Cell::text("Calculus I"),
            Cell::text("5"),
            Cell::text("80"),
            Cell::text("80"),
            Cell::text(""),
            Cell::text(""),
            Cell::text(""),
            Cell::text(""),
            Cell::text("1"),
            Cell::text("Compulsory"),
            Cell::linked("Maths", "module.aspx?m=1"),
        ]
    }

    #[test]
    fn test_parse_happy_path() {
        let rows = vec![header(), data_row()];
        let records = parse_record_table(&rows).unwrap();

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.code, "MA101");
        assert_eq!(r.code_link.as_deref(), Some("course.aspx?c=MA101"));
        assert_eq!(r.hours_total, 80);
        assert_eq!(r.module_link.as_deref(), Some("module.aspx?m=1"));
    }

    #[test]
    fn test_blank_hours_coerce_to_zero() {
        let rows = vec![header(), data_row()];
        let records = parse_record_table(&rows).unwrap();
        let r = &records[0];
        assert_eq!(r.hours_experiment, 0);
        assert_eq!(r.hours_practice, 0);
        assert_eq!(r.design_hours, 0);
    }

    #[test]
    fn test_th_header_rows_are_ignored() {
        // A <th>-built header yields a cell-less row
        let rows = vec![vec![], header(), data_row()];
        let records = parse_record_table(&rows).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_empty_table_yields_no_records() {
        assert!(parse_record_table(&[]).unwrap().is_empty());
        // Header only: a category with no courses
        assert!(parse_record_table(&[header()]).unwrap().is_empty());
    }

    #[test]
    fn test_wrong_arity_is_structural() {
        let mut short = data_row();
        short.pop();
        let rows = vec![header(), short];
        let err = parse_record_table(&rows).unwrap_err();
        assert!(matches!(err, CatalogError::StructuralRow(_)));
    }

    #[test]
    fn test_wrong_header_arity_is_structural() {
        let rows = vec![vec![Cell::text("unexpected")], data_row()];
        let err = parse_record_table(&rows).unwrap_err();
        assert!(matches!(err, CatalogError::StructuralRow(_)));
    }

    #[test]
    fn test_garbage_numeric_is_structural() {
        let mut row = data_row();
        row[4] = Cell::text("eighty");
        let rows = vec![header(), row];
        let err = parse_record_table(&rows).unwrap_err();
        assert!(matches!(err, CatalogError::StructuralRow(_)));
    }

    #[test]
    fn test_fields_ordering() {
        let rows = vec![header(), data_row()];
        let records = parse_record_table(&rows).unwrap();
        let fields = records[0].fields();
        assert_eq!(fields.len(), RECORD_FIELD_COUNT);
        assert_eq!(fields[0], "1");
        assert_eq!(fields[1], "MA101");
        assert_eq!(fields[12], "Maths");
    }
}
