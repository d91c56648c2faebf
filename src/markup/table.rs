//! Table and cell extraction
//!
//! The source serves three table shapes: the entity listing (merged-cell
//! rows, filtered by a row class), the category link table, and the course
//! record table. All extraction here is positional; interpreting the cells
//! is the caller's job.

use super::{Cell, Link};
use scraper::{ElementRef, Html, Selector};

/// Extracts the merged-cell entity rows from a table
///
/// Only cells carrying text are considered physically present, matching
/// the source's markup where spanned-over positions are simply absent.
///
/// # Arguments
///
/// * `html` - The raw page markup
/// * `table_id` - The id attribute of the target table
/// * `row_class` - Class attribute that marks data rows (headers lack it)
///
/// # Returns
///
/// * `Some(rows)` - Ordered rows of physically present cells
/// * `None` - The table is absent from the markup
pub fn hierarchy_rows(html: &str, table_id: &str, row_class: &str) -> Option<Vec<Vec<Cell>>> {
    extract_rows(html, table_id, Some(row_class), false)
}

/// Extracts every row of a record table, keeping empty cells
///
/// Record tables are fixed-arity; blank cells are meaningful (they coerce
/// to zero downstream) and must keep their column position.
pub fn record_rows(html: &str, table_id: &str) -> Option<Vec<Vec<Cell>>> {
    extract_rows(html, table_id, None, true)
}

fn extract_rows(
    html: &str,
    table_id: &str,
    row_class: Option<&str>,
    keep_empty: bool,
) -> Option<Vec<Vec<Cell>>> {
    let document = Html::parse_document(html);

    let row_selector = match row_class {
        Some(class) => Selector::parse(&format!("table#{} tr.{}", table_id, class)).ok()?,
        None => Selector::parse(&format!("table#{} tr", table_id)).ok()?,
    };
    let table_selector = Selector::parse(&format!("table#{}", table_id)).ok()?;
    document.select(&table_selector).next()?;

    let cell_selector = Selector::parse("td").ok()?;

    let mut rows = Vec::new();
    for tr in document.select(&row_selector) {
        let mut cells = Vec::new();
        for td in tr.select(&cell_selector) {
            let text = element_text(&td);
            if text.is_empty() && !keep_empty {
                continue;
            }
            cells.push(Cell {
                text,
                link: cell_link(&td),
                span: cell_span(&td),
            });
        }
        rows.push(cells);
    }
    Some(rows)
}

/// Extracts every labeled link inside a table
///
/// # Returns
///
/// * `Some(links)` - Links with non-empty labels, in document order
/// * `None` - The table is absent from the markup
pub fn table_links(html: &str, table_id: &str) -> Option<Vec<Link>> {
    let document = Html::parse_document(html);

    let table_selector = Selector::parse(&format!("table#{}", table_id)).ok()?;
    let table = document.select(&table_selector).next()?;

    let link_selector = Selector::parse("a[href]").ok()?;

    let mut links = Vec::new();
    for a in table.select(&link_selector) {
        let name = element_text(&a);
        if name.is_empty() {
            continue;
        }
        if let Some(href) = a.value().attr("href") {
            links.push(Link {
                name,
                address: href.to_string(),
            });
        }
    }
    Some(links)
}

/// Collects an element's text content, trimmed
fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Reads the rowspan attribute, defaulting to 1 on absence or garbage
fn cell_span(td: &ElementRef) -> u32 {
    td.value()
        .attr("rowspan")
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(1)
}

/// Finds the first link inside a cell, if any
fn cell_link(td: &ElementRef) -> Option<Link> {
    let selector = Selector::parse("a[href]").ok()?;
    let a = td.select(&selector).next()?;
    let href = a.value().attr("href")?;
    Some(Link {
        name: element_text(&a),
        address: href.to_string(),
    })
}
