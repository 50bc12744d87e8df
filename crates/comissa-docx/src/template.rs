//! Template document inspection.
//!
//! Parses `word/document.xml` into a lightweight model of its first
//! top-level table: the grid column count and the text of every cell.
//! The filler uses it for structural validation; the CLI and tests use
//! it to look at what a document actually contains.

use std::io::{Read, Seek};

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{FillError, FillResult};

/// First top-level table of a document
#[derive(Debug, Clone, Default)]
pub struct TableModel {
    /// Column count from the table grid (falls back to the first row's
    /// cell count when the grid is absent)
    pub cols: usize,
    /// Cell texts, one inner vec per row; nested tables are skipped
    pub rows: Vec<Vec<String>>,
}

impl TableModel {
    /// Header texts (first row), if the table has any rows
    pub fn headers(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Structural summary of a document
#[derive(Debug, Clone, Default)]
pub struct DocumentModel {
    /// Number of top-level tables in the body
    pub table_count: usize,
    /// Model of the first top-level table, if any
    pub first_table: Option<TableModel>,
}

impl DocumentModel {
    /// Read the model from a DOCX container
    pub fn from_docx<R: Read + Seek>(reader: R) -> FillResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let doc_xml = read_document_part(&mut archive)?;
        parse_document_xml(&doc_xml)
    }
}

/// Read `word/document.xml` out of an open archive
pub(crate) fn read_document_part<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
) -> FillResult<Vec<u8>> {
    let mut file = archive
        .by_name("word/document.xml")
        .map_err(|_| FillError::MissingPart("word/document.xml".into()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Parse `word/document.xml` into a [`DocumentModel`]
pub fn parse_document_xml(doc_xml: &[u8]) -> FillResult<DocumentModel> {
    let mut xml_reader = Reader::from_reader(doc_xml);
    xml_reader.trim_text(false);

    let mut buf = Vec::new();

    let mut depth = 0usize; // w:tbl nesting depth
    let mut table_count = 0usize;
    let mut in_target = false; // inside the first top-level table
    let mut grid_cols = 0usize;
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut current_row: Option<Vec<String>> = None;
    let mut current_cell: Option<String> = None;
    let mut in_text = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().local_name().as_ref() {
                b"tbl" => {
                    depth += 1;
                    if depth == 1 {
                        table_count += 1;
                        if table_count == 1 {
                            in_target = true;
                        }
                    }
                }
                b"tr" if in_target && depth == 1 => current_row = Some(Vec::new()),
                b"tc" if in_target && depth == 1 && current_row.is_some() => {
                    current_cell = Some(String::new());
                }
                b"t" if in_target && depth == 1 && current_cell.is_some() => in_text = true,
                b"gridCol" if in_target && depth == 1 => grid_cols += 1,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.name().local_name().as_ref() == b"gridCol" && in_target && depth == 1 {
                    grid_cols += 1;
                }
            }
            Ok(Event::Text(e)) if in_text => {
                if let (Some(cell), Ok(text)) = (current_cell.as_mut(), e.unescape()) {
                    cell.push_str(&text);
                }
            }
            Ok(Event::End(e)) => match e.name().local_name().as_ref() {
                b"tbl" => {
                    if depth == 1 {
                        in_target = false;
                    }
                    depth = depth.saturating_sub(1);
                }
                b"tr" if in_target && depth == 1 => {
                    if let Some(row) = current_row.take() {
                        rows.push(row);
                    }
                }
                b"tc" if in_target && depth == 1 => {
                    if let (Some(row), Some(cell)) = (current_row.as_mut(), current_cell.take()) {
                        row.push(cell);
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(FillError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    let first_table = (table_count > 0).then(|| {
        let cols = if grid_cols > 0 {
            grid_cols
        } else {
            rows.first().map(Vec::len).unwrap_or(0)
        };
        TableModel { cols, rows }
    });

    Ok(DocumentModel {
        table_count,
        first_table,
    })
}
