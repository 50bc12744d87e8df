//! # comissa-xlsx
//!
//! Record extractor for the comissa pipeline: reads the first sheet of an
//! XLSX source, applies the fixed column bindings from
//! [`comissa_core::layout`], and yields one [`RawRecord`] per non-blank
//! row starting at row 4.
//!
//! Only the XLSX subset the commission sheets actually use is parsed:
//! shared strings, inline strings, plain numbers, booleans, and
//! date-formatted cells (rendered to `dd/mm` text at extraction time).
//!
//! [`RawRecord`]: comissa_core::RawRecord

pub mod error;
pub mod reader;

pub use error::{ExtractError, ExtractResult};
pub use reader::{Extraction, SheetExtractor};
