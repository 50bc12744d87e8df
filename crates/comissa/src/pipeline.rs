//! Batch pipeline: extract, calculate, fill.
//!
//! One source file plus one template produce one filled document. In a
//! multi-file batch, each file is processed independently; a fatal error
//! in one file becomes that file's outcome and the rest continue.

use std::path::{Path, PathBuf};

use thiserror::Error;

use comissa_core::{calculate, DerivedRecord};
use comissa_docx::{DocxFiller, FillError};
use comissa_xlsx::{ExtractError, SheetExtractor};

/// Result type for pipeline operations
pub type ProcessResult<T> = std::result::Result<T, ProcessError>;

/// Batch-fatal errors for one source/template pair
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The source sheet could not be extracted
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    /// The template could not be filled
    #[error("fill failed: {0}")]
    Fill(#[from] FillError),

    /// IO error outside the extract/fill steps
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Summary of one successfully processed batch
#[derive(Debug, Clone)]
pub struct BatchOutput {
    /// Name of the source sheet the records came from
    pub sheet_name: String,
    /// Number of data rows written into the output table
    pub rows_written: usize,
    /// Where the filled document was written
    pub output: PathBuf,
}

/// Outcome of one file in a multi-file batch
#[derive(Debug)]
pub struct FileOutcome {
    /// The source file this outcome belongs to
    pub input: PathBuf,
    /// Success summary or the error that stopped this file
    pub result: ProcessResult<BatchOutput>,
}

/// Extract and calculate, without filling anything.
///
/// Returns the sheet name and the derived records in row order.
pub fn derive_records<P: AsRef<Path>>(source: P) -> ProcessResult<(String, Vec<DerivedRecord>)> {
    let extraction = SheetExtractor::extract_file(source)?;
    let derived = extraction.records.iter().map(calculate).collect();
    Ok((extraction.sheet_name, derived))
}

/// Process one source file into one filled document
pub fn process_file<P, Q, O>(source: P, template: Q, output: O) -> ProcessResult<BatchOutput>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    O: AsRef<Path>,
{
    let (sheet_name, records) = derive_records(&source)?;
    DocxFiller::fill_file(&template, &records, &sheet_name, &output)?;
    Ok(BatchOutput {
        sheet_name,
        rows_written: records.len(),
        output: output.as_ref().to_path_buf(),
    })
}

/// Process a batch of source files against one template.
///
/// Output files land in `out_dir`, named after each input. Failures are
/// per-file: they are logged and recorded, and processing continues.
pub fn process_batch(inputs: &[PathBuf], template: &Path, out_dir: &Path) -> Vec<FileOutcome> {
    inputs
        .iter()
        .map(|input| {
            let output = out_dir.join(output_name(input));
            let result = process_file(input, template, &output);
            if let Err(e) = &result {
                log::warn!("Skipping '{}': {e}", input.display());
            }
            FileOutcome {
                input: input.clone(),
                result,
            }
        })
        .collect()
}

/// Output file name for a source file: `resultado_<stem>.docx`
pub fn output_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "saida".to_string());
    format!("resultado_{stem}.docx")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_names_keep_the_input_stem() {
        assert_eq!(
            output_name(Path::new("uploads/pedidos março.xlsx")),
            "resultado_pedidos março.docx"
        );
        assert_eq!(output_name(Path::new("a.b.xlsx")), "resultado_a.b.docx");
    }
}
