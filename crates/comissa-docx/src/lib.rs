//! # comissa-docx
//!
//! Table filler for the comissa pipeline: takes an ordered batch of
//! [`DerivedRecord`]s and writes them into the first table of a DOCX
//! template, one row per record, with the fixed 11-column layout from
//! [`comissa_core::layout`].
//!
//! The template's structure is validated first (a table with at least 2
//! rows and 11 columns); structural violations are [`FillError`]s, never
//! panics. The filler mutates a copy of the template - persistence of the
//! result is the caller's concern.
//!
//! [`DerivedRecord`]: comissa_core::DerivedRecord

pub mod error;
pub mod filler;
pub mod template;

pub use error::{FillError, FillResult};
pub use filler::DocxFiller;
pub use template::{DocumentModel, TableModel};
