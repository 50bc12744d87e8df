//! # comissa-core
//!
//! Core data model and commission calculator for the comissa pipeline.
//!
//! This crate provides the types shared by the extractor and the filler:
//! - [`SourceValue`] - Normalized cell values (empty, number, text)
//! - [`RawRecord`] - One extracted source row (columns A..I of the sheet)
//! - [`DerivedRecord`] - The fully calculated and display-formatted row
//! - [`layout`] - The fixed source-column and output-column mapping tables
//!
//! The calculator ([`calculate`]) is a total function: malformed field
//! values degrade to zeroed/defaulted output instead of failing, so a bad
//! row never aborts a batch.
//!
//! ## Example
//!
//! ```rust
//! use comissa_core::{calculate, RawRecord, SourceValue};
//!
//! let raw = RawRecord {
//!     client_name: SourceValue::text("acme ltda"),
//!     term: SourceValue::text("10/30/60"),
//!     order_value: SourceValue::Number(1000.0),
//!     percentage: SourceValue::Number(7.0),
//!     ..RawRecord::at_row(4)
//! };
//!
//! let derived = calculate(&raw);
//! assert_eq!(derived.commission_value, 890.0);
//! assert_eq!(derived.client_name, "Acme Ltda");
//! ```

pub mod calc;
pub mod format;
pub mod layout;
pub mod record;
pub mod value;

// Re-exports for convenience
pub use calc::{calculate, term_tier, to_number};
pub use layout::{CellFormat, OutputColumn, SourceField, DATA_START_ROW, OUTPUT_COLUMNS, SOURCE_COLUMNS};
pub use record::{DerivedRecord, RawRecord};
pub use value::SourceValue;

/// Number of columns in the output table layout
pub const OUTPUT_COLUMN_COUNT: usize = 11;

/// Maximum display length of the order number (output column 1)
pub const ORDER_NUMBER_MAX_LEN: usize = 40;

/// Maximum display length of the client name
pub const CLIENT_NAME_MAX_LEN: usize = 37;

/// Fixed payment-method label written to every output row
pub const PAYMENT_METHOD: &str = "BOLETOS";
