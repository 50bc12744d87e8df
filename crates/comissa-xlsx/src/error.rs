//! Extraction error types

use thiserror::Error;

/// Result type for extraction operations
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Errors that can occur while extracting records from a source sheet
#[derive(Debug, Error)]
pub enum ExtractError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Invalid file format
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// The sheet had no retained data rows
    #[error("No data rows found in sheet '{sheet}' (data starts at row 4)")]
    NoDataRows {
        /// Name of the scanned sheet
        sheet: String,
    },
}
