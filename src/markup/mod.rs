//! Markup collaborator: table, cell, and link extraction
//!
//! Pure parsing facilities over a raw HTML blob. Nothing in this module
//! performs I/O or holds session state; the crawler hands in the current
//! page markup and gets back rows, cells, and links.

mod form;
mod table;

pub use form::{form_action, hidden_inputs, input_value, select_option_labels, select_option_value};
pub use table::{hierarchy_rows, record_rows, table_links};

/// A clickable reference plus its human label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Display text of the link
    pub name: String,

    /// Raw href as served by the source (resolved lazily on navigation)
    pub address: String,
}

/// A physically present table cell
///
/// `span >= 1` means this cell's value also covers the next `span - 1`
/// rows at its column position; those rows omit the cell entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Display text, trimmed
    pub text: String,

    /// Outgoing link, if the cell wraps one
    pub link: Option<Link>,

    /// Rowspan count
    pub span: u32,
}

impl Cell {
    /// Convenience constructor for a plain cell with span 1
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: None,
            span: 1,
        }
    }

    /// Convenience constructor for a spanning cell
    pub fn spanning(text: impl Into<String>, span: u32) -> Self {
        Self {
            text: text.into(),
            link: None,
            span,
        }
    }

    /// Convenience constructor for a linked cell
    pub fn linked(text: impl Into<String>, address: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            link: Some(Link {
                name: text.clone(),
                address: address.into(),
            }),
            text,
            span: 1,
        }
    }
}
