//! Fill error types

use thiserror::Error;

/// Result type for fill operations
pub type FillResult<T> = std::result::Result<T, FillError>;

/// Errors that can occur while filling a document template
#[derive(Debug, Error)]
pub enum FillError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// The template contains no table
    #[error("Template document contains no table")]
    NoTable,

    /// The template table has too few rows
    #[error("Template table must have at least 2 rows, found {found}")]
    TooFewRows {
        /// Number of rows found
        found: usize,
    },

    /// The template table has too few columns
    #[error("Template table must have at least 11 columns, found {found}")]
    TooFewColumns {
        /// Number of columns found
        found: usize,
    },
}
