//! Table filler: writes derived records into the template's first table.
//!
//! The rewrite is a single streaming pass over `word/document.xml`:
//! every event outside the first table is copied through unchanged, so
//! headings, styling, and anything after the table survive byte-for-byte
//! at the event level. Inside the table, data-row cells keep their
//! properties (`w:tcPr`) and get fresh paragraphs; rows the template does
//! not have are appended before the table closes.

use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::{FillError, FillResult};
use crate::template::{parse_document_xml, read_document_part};
use comissa_core::{DerivedRecord, OUTPUT_COLUMNS, OUTPUT_COLUMN_COUNT};

/// DOCX table filler
pub struct DocxFiller;

impl DocxFiller {
    /// Fill a template file and write the result to an output path.
    ///
    /// The document is assembled in memory first, so a failed fill leaves
    /// no partial output file behind.
    pub fn fill_file<P: AsRef<Path>, Q: AsRef<Path>>(
        template: P,
        records: &[DerivedRecord],
        sheet_name: &str,
        output: Q,
    ) -> FillResult<()> {
        let template = File::open(template)?;
        let mut buffer = Cursor::new(Vec::new());
        Self::fill(template, records, sheet_name, &mut buffer)?;
        std::fs::write(output, buffer.into_inner())?;
        Ok(())
    }

    /// Fill a template read from `template` and write the filled
    /// document to `output`.
    ///
    /// `sheet_name` labels the batch in diagnostics; the document layout
    /// has no slot for it.
    pub fn fill<R: Read + Seek, W: Write + Seek>(
        template: R,
        records: &[DerivedRecord],
        sheet_name: &str,
        output: W,
    ) -> FillResult<()> {
        let mut archive = zip::ZipArchive::new(template)?;
        let doc_xml = read_document_part(&mut archive)?;

        // Structural validation before touching anything
        let model = parse_document_xml(&doc_xml)?;
        let table = model.first_table.ok_or(FillError::NoTable)?;
        if table.rows.len() < 2 {
            return Err(FillError::TooFewRows {
                found: table.rows.len(),
            });
        }
        if table.cols < OUTPUT_COLUMN_COUNT {
            return Err(FillError::TooFewColumns { found: table.cols });
        }

        log::debug!(
            "Filling table for sheet '{sheet_name}': {} record(s), template has {} row(s)",
            records.len(),
            table.rows.len()
        );

        let rewritten = rewrite_document(&doc_xml, records, table.rows.len())?;

        // Copy the container, swapping in the rewritten document part
        let mut zip = zip::ZipWriter::new(output);
        let options = zip::write::SimpleFileOptions::default();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();
            if entry.is_dir() {
                zip.add_directory(name, options)?;
                continue;
            }
            zip.start_file(name.as_str(), options)?;
            if name == "word/document.xml" {
                zip.write_all(&rewritten)?;
            } else {
                let mut data = Vec::new();
                entry.read_to_end(&mut data)?;
                zip.write_all(&data)?;
            }
        }
        zip.finish()?;
        Ok(())
    }
}

/// Rewrite `word/document.xml`, filling one table row per record.
///
/// Record `i` targets row `i + 1` (row 0 is the header and is never
/// touched). Rows present in the template are overwritten in place; the
/// rest are appended before `</w:tbl>`. Template rows beyond the record
/// count are left as they are.
fn rewrite_document(
    doc_xml: &[u8],
    records: &[DerivedRecord],
    template_rows: usize,
) -> FillResult<Vec<u8>> {
    let mut xml_reader = Reader::from_reader(doc_xml);
    xml_reader.trim_text(false);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut buf = Vec::new();

    let mut seen_table = false; // first top-level table reached
    let mut in_target = false;
    let mut nested = 0usize; // table nesting below the target table
    let mut row_idx: i64 = -1;
    let mut cell_idx = 0usize;
    let mut row_cells: Option<[String; OUTPUT_COLUMN_COUNT]> = None;
    let mut in_cell = false; // inside a cell being overwritten
    let mut tcpr_depth = 0usize; // copying a w:tcPr subtree
    let mut skip_depth = 0usize; // dropping replaced cell content

    loop {
        let event = match xml_reader.read_event_into(&mut buf) {
            Ok(ev) => ev,
            Err(e) => return Err(FillError::Xml(e)),
        };
        let mut copy = true;

        match &event {
            Event::Eof => break,
            _ if skip_depth > 0 => {
                match &event {
                    Event::Start(_) => skip_depth += 1,
                    Event::End(_) => skip_depth -= 1,
                    _ => {}
                }
                copy = false;
            }
            Event::Start(e) => {
                let name = e.name();
                let local = name.local_name();
                if tcpr_depth > 0 {
                    tcpr_depth += 1;
                } else if in_cell {
                    if local.as_ref() == b"tcPr" {
                        tcpr_depth = 1;
                    } else {
                        // Existing cell content is replaced wholesale
                        skip_depth = 1;
                        copy = false;
                    }
                } else if local.as_ref() == b"tbl" {
                    if !seen_table {
                        seen_table = true;
                        in_target = true;
                        row_idx = -1;
                    } else if in_target {
                        nested += 1;
                    }
                } else if local.as_ref() == b"tr" && in_target && nested == 0 {
                    row_idx += 1;
                    cell_idx = 0;
                    let record_idx = row_idx - 1;
                    row_cells = (record_idx >= 0)
                        .then(|| records.get(record_idx as usize))
                        .flatten()
                        .map(DerivedRecord::rendered_columns);
                } else if local.as_ref() == b"tc"
                    && in_target
                    && nested == 0
                    && row_cells.is_some()
                {
                    in_cell = cell_idx < OUTPUT_COLUMN_COUNT;
                }
            }
            Event::Empty(e) => {
                // Bare elements inside an overwritten cell (e.g. <w:p/>)
                // are dropped with the rest of its content
                if in_cell && tcpr_depth == 0 && e.name().local_name().as_ref() != b"tcPr" {
                    copy = false;
                }
            }
            Event::Text(_) | Event::CData(_) => {
                if in_cell && tcpr_depth == 0 {
                    copy = false;
                }
            }
            Event::End(e) => {
                let local = e.name().local_name();
                if tcpr_depth > 0 {
                    tcpr_depth -= 1;
                } else if local.as_ref() == b"tc" && in_target && nested == 0 {
                    if in_cell {
                        if let Some(cells) = &row_cells {
                            let column = OUTPUT_COLUMNS[cell_idx];
                            write_cell_paragraph(
                                &mut writer,
                                &cells[cell_idx],
                                u32::from(column.font_points) * 2,
                            )?;
                        }
                        in_cell = false;
                    }
                    cell_idx += 1;
                } else if local.as_ref() == b"tr" && in_target && nested == 0 {
                    row_cells = None;
                } else if local.as_ref() == b"tbl" {
                    if in_target && nested > 0 {
                        nested -= 1;
                    } else if in_target {
                        // Records the template had no rows for
                        for record in records.iter().skip(template_rows.saturating_sub(1)) {
                            write_new_row(&mut writer, record)?;
                        }
                        in_target = false;
                    }
                }
            }
            _ => {}
        }

        if copy {
            writer.write_event(event)?;
        }
        buf.clear();
    }

    Ok(writer.into_inner().into_inner())
}

/// Append a complete table row for one record
fn write_new_row<W: Write>(writer: &mut Writer<W>, record: &DerivedRecord) -> FillResult<()> {
    let cells = record.rendered_columns();
    writer.write_event(Event::Start(BytesStart::new("w:tr")))?;
    for (text, column) in cells.iter().zip(OUTPUT_COLUMNS.iter()) {
        writer.write_event(Event::Start(BytesStart::new("w:tc")))?;
        writer.write_event(Event::Start(BytesStart::new("w:tcPr")))?;
        let mut tcw = BytesStart::new("w:tcW");
        tcw.push_attribute(("w:w", "0"));
        tcw.push_attribute(("w:type", "auto"));
        writer.write_event(Event::Empty(tcw))?;
        writer.write_event(Event::End(BytesEnd::new("w:tcPr")))?;
        write_cell_paragraph(writer, text, u32::from(column.font_points) * 2)?;
        writer.write_event(Event::End(BytesEnd::new("w:tc")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:tr")))?;
    Ok(())
}

/// Write one cell paragraph with the column's font size.
///
/// The size goes on the paragraph mark as well as the run, so an empty
/// cell still carries it.
fn write_cell_paragraph<W: Write>(
    writer: &mut Writer<W>,
    text: &str,
    half_points: u32,
) -> FillResult<()> {
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;
    writer.write_event(Event::Start(BytesStart::new("w:pPr")))?;
    write_run_props(writer, half_points)?;
    writer.write_event(Event::End(BytesEnd::new("w:pPr")))?;
    if !text.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("w:r")))?;
        write_run_props(writer, half_points)?;
        let mut t = BytesStart::new("w:t");
        t.push_attribute(("xml:space", "preserve"));
        writer.write_event(Event::Start(t))?;
        writer.write_event(Event::Text(BytesText::new(text)))?;
        writer.write_event(Event::End(BytesEnd::new("w:t")))?;
        writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn write_run_props<W: Write>(writer: &mut Writer<W>, half_points: u32) -> FillResult<()> {
    let size = half_points.to_string();
    writer.write_event(Event::Start(BytesStart::new("w:rPr")))?;
    let mut sz = BytesStart::new("w:sz");
    sz.push_attribute(("w:val", size.as_str()));
    writer.write_event(Event::Empty(sz))?;
    let mut szcs = BytesStart::new("w:szCs");
    szcs.push_attribute(("w:val", size.as_str()));
    writer.write_event(Event::Empty(szcs))?;
    writer.write_event(Event::End(BytesEnd::new("w:rPr")))?;
    Ok(())
}
