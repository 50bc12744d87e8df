//! Convenient imports for typical use
//!
//! ```rust
//! use comissa::prelude::*;
//! ```

pub use crate::pipeline::{
    derive_records, process_batch, process_file, BatchOutput, FileOutcome, ProcessError,
    ProcessResult,
};

pub use comissa_core::{calculate, DerivedRecord, RawRecord, SourceValue};
pub use comissa_docx::{DocumentModel, DocxFiller, FillError};
pub use comissa_xlsx::{ExtractError, Extraction, SheetExtractor};
