//! # comissa
//!
//! Reads a commission-tracking spreadsheet, derives a commission value
//! per order row, and writes the results into the fixed-layout table of a
//! DOCX template.
//!
//! Three components, consumed in order by the pipeline:
//!
//! - [`SheetExtractor`] pulls one [`RawRecord`] per non-blank row from
//!   the first sheet (row 4 down, fixed column bindings)
//! - [`calculate`] derives the commission fields for each record; it is
//!   total, so a malformed row degrades instead of failing the batch
//! - [`DocxFiller`] writes one table row per record into the template's
//!   first table
//!
//! ## Example
//!
//! ```rust,no_run
//! use comissa::prelude::*;
//!
//! let output = process_file("pedidos.xlsx", "modelo.docx", "resultado.docx")?;
//! println!("{} rows from sheet '{}'", output.rows_written, output.sheet_name);
//! # Ok::<(), comissa::ProcessError>(())
//! ```

pub mod pipeline;
pub mod prelude;

pub use pipeline::{
    derive_records, output_name, process_batch, process_file, BatchOutput, FileOutcome,
    ProcessError, ProcessResult,
};

// Re-export core types
pub use comissa_core::{
    calculate, layout, term_tier, to_number, DerivedRecord, RawRecord, SourceValue,
    CLIENT_NAME_MAX_LEN, ORDER_NUMBER_MAX_LEN, OUTPUT_COLUMN_COUNT, PAYMENT_METHOD,
};

// Re-export the I/O endpoints
pub use comissa_docx::{DocumentModel, DocxFiller, FillError, FillResult, TableModel};
pub use comissa_xlsx::{ExtractError, ExtractResult, Extraction, SheetExtractor};
