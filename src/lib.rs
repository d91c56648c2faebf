//! Catalog-Crawl: a resumable academic catalog extractor
//!
//! This crate extracts a hierarchical catalog (enrollment year → program
//! variant → course category → course records) from a session-based,
//! form-driven source, persisting results incrementally so an interrupted
//! extraction can be resumed without re-fetching completed work.

pub mod config;
pub mod crawler;
pub mod hierarchy;
pub mod ledger;
pub mod markup;
pub mod output;
pub mod records;
pub mod session;

use thiserror::Error;

/// Main error type for Catalog-Crawl operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Form control '{control}' not found on query page")]
    FormInteraction { control: String },

    #[error("Option label '{label}' not offered by selector '{selector}'")]
    UnknownOption { label: String, selector: String },

    #[error("Navigation failed for '{target}': {message}")]
    Navigation { target: String, message: String },

    #[error("Session window stack is empty; cannot leave the root view")]
    WindowStackUnderflow,

    #[error("Expected table '{id}' not found in page markup")]
    MissingTable { id: String },

    #[error("Malformed hierarchy table: {0}")]
    MalformedHierarchyTable(String),

    #[error("Structural error in record table: {0}")]
    StructuralRow(String),

    #[error("Ledger error in {path}: {message}")]
    Ledger { path: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

impl CatalogError {
    /// Whether this error is structural: a parse failure scoped to one
    /// entity or category. Structural failures skip the item with a
    /// diagnostic and leave no ledger record, so the item is eligible
    /// again on the next run.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            CatalogError::MissingTable { .. }
                | CatalogError::MalformedHierarchyTable(_)
                | CatalogError::StructuralRow(_)
        )
    }
}

/// Result type alias for Catalog-Crawl operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use hierarchy::{reconstruct, EntityNode, HierarchyTree, ScopeKey};
pub use ledger::{CategoryLog, CategoryRecord, Ledger, LedgerEntry};
pub use markup::{Cell, Link};
pub use records::CourseRecord;
pub use session::{PageSession, SessionFactory};
