//! XLSX sheet extractor

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{ExtractError, ExtractResult};
use comissa_core::layout::{source_field, SourceField, DATA_START_ROW};
use comissa_core::{RawRecord, SourceValue};

/// Result of extracting a source sheet: the sheet's name and the retained
/// records in row order.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Name of the first (active) sheet
    pub sheet_name: String,
    /// Retained records, ordered by source row
    pub records: Vec<RawRecord>,
}

/// Extracts commission records from the first sheet of an XLSX file
pub struct SheetExtractor;

impl SheetExtractor {
    /// Extract records from a file path
    pub fn extract_file<P: AsRef<Path>>(path: P) -> ExtractResult<Extraction> {
        let file = File::open(path)?;
        Self::extract(file)
    }

    /// Extract records from a reader
    pub fn extract<R: Read + Seek>(reader: R) -> ExtractResult<Extraction> {
        let mut archive = zip::ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(ExtractError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let date_styles = Self::read_date_styles(&mut archive)?;

        let sheets = Self::read_workbook_xml(&mut archive)?;
        let (sheet_name, r_id) = sheets
            .into_iter()
            .next()
            .ok_or_else(|| ExtractError::InvalidFormat("Workbook has no sheets".into()))?;

        let sheet_paths = Self::read_workbook_rels(&mut archive)?;
        let sheet_path = sheet_paths
            .get(&r_id)
            .ok_or_else(|| ExtractError::MissingPart(format!("worksheet part for {r_id}")))?;

        let rows =
            Self::read_worksheet(&mut archive, sheet_path, &shared_strings, &date_styles)?;

        let records: Vec<RawRecord> = rows
            .into_values()
            .filter(RawRecord::is_retained)
            .collect();

        log::debug!(
            "Extracted {} record(s) from sheet '{sheet_name}'",
            records.len()
        );

        if records.is_empty() {
            return Err(ExtractError::NoDataRows { sheet: sheet_name });
        }

        Ok(Extraction {
            sheet_name,
            records,
        })
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> ExtractResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"t" if in_si => {
                        in_t = true;
                    }
                    _ => {}
                },
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(current_string.clone());
                        current_string.clear();
                        in_si = false;
                    }
                    b"t" => {
                        in_t = false;
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current_string.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ExtractError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read xl/styles.xml and flag which cell xf indexes are date formats.
    ///
    /// Only the numFmtId of each cellXfs entry matters here; the extractor
    /// needs it to tell date serials apart from plain numbers.
    fn read_date_styles<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> ExtractResult<Vec<bool>> {
        let file = match archive.by_name("xl/styles.xml") {
            Ok(f) => f,
            Err(_) => return Ok(Vec::new()), // No styles part is valid
        };

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut custom_formats: HashMap<u32, String> = HashMap::new();
        let mut xf_num_fmts: Vec<u32> = Vec::new();
        let mut in_cell_xfs = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"cellXfs" => in_cell_xfs = true,
                    b"numFmt" => {
                        let mut id = None;
                        let mut code = None;
                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"numFmtId" => {
                                    id = attr
                                        .unescape_value()
                                        .ok()
                                        .and_then(|v| v.parse::<u32>().ok());
                                }
                                b"formatCode" => {
                                    code = attr.unescape_value().ok().map(|v| v.to_string());
                                }
                                _ => {}
                            }
                        }
                        if let (Some(id), Some(code)) = (id, code) {
                            custom_formats.insert(id, code);
                        }
                    }
                    b"xf" if in_cell_xfs => {
                        let mut num_fmt_id = 0u32;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"numFmtId" {
                                num_fmt_id = attr
                                    .unescape_value()
                                    .ok()
                                    .and_then(|v| v.parse::<u32>().ok())
                                    .unwrap_or(0);
                            }
                        }
                        xf_num_fmts.push(num_fmt_id);
                    }
                    _ => {}
                },
                Ok(Event::End(e)) if e.name().as_ref() == b"cellXfs" => in_cell_xfs = false,
                Ok(Event::Eof) => break,
                Err(e) => return Err(ExtractError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(xf_num_fmts
            .iter()
            .map(|id| is_date_format(*id, custom_formats.get(id).map(String::as_str)))
            .collect())
    }

    /// Read workbook.xml to get sheet names and rIds, in workbook order
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> ExtractResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| ExtractError::MissingPart("xl/workbook.xml".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                    let mut name = None;
                    let mut r_id = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"name" => {
                                name = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"r:id" => {
                                r_id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        sheets.push((name, r_id));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ExtractError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> ExtractResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| ExtractError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut target = None;
                    let mut rel_type = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"Id" => {
                                id = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"Target" => {
                                target = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"Type" => {
                                rel_type = attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            _ => {}
                        }
                    }

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Target is relative to xl/ folder
                            let full_path = if let Some(stripped) = target.strip_prefix('/') {
                                stripped.to_string()
                            } else {
                                format!("xl/{target}")
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ExtractError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Scan a worksheet part, keeping only cells in mapped columns from
    /// the data start row down.
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        shared_strings: &[String],
        date_styles: &[bool],
    ) -> ExtractResult<BTreeMap<u32, RawRecord>> {
        let file = archive
            .by_name(path)
            .map_err(|_| ExtractError::MissingPart(path.to_string()))?;

        let reader = BufReader::new(file);
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut rows: BTreeMap<u32, RawRecord> = BTreeMap::new();

        // Current cell state
        let mut current_ref: Option<String> = None;
        let mut current_type: Option<String> = None;
        let mut current_style: Option<usize> = None;
        let mut current_value: Option<String> = None;
        let mut in_value = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"c" => {
                    current_ref = None;
                    current_type = None;
                    current_style = None;
                    current_value = None;

                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"r" => {
                                current_ref =
                                    attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"t" => {
                                current_type =
                                    attr.unescape_value().ok().map(|s| s.to_string());
                            }
                            b"s" => {
                                current_style = attr
                                    .unescape_value()
                                    .ok()
                                    .and_then(|s| s.parse::<usize>().ok());
                            }
                            _ => {}
                        }
                    }
                }
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"v" => in_value = true,
                    b"t" => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_value || in_inline_text => {
                    if let Ok(text) = e.unescape() {
                        current_value
                            .get_or_insert_with(String::new)
                            .push_str(&text);
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"v" => in_value = false,
                    b"t" => in_inline_text = false,
                    b"c" => {
                        Self::finish_cell(
                            &mut rows,
                            current_ref.take(),
                            current_type.take(),
                            current_style.take(),
                            current_value.take(),
                            shared_strings,
                            date_styles,
                        );
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(ExtractError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rows)
    }

    /// Fold one finished cell into the row map, if it lands on a mapped
    /// column at or below the data start row.
    fn finish_cell(
        rows: &mut BTreeMap<u32, RawRecord>,
        cell_ref: Option<String>,
        cell_type: Option<String>,
        style: Option<usize>,
        raw_value: Option<String>,
        shared_strings: &[String],
        date_styles: &[bool],
    ) {
        let Some(cell_ref) = cell_ref else { return };
        let Some((column, row)) = split_cell_ref(&cell_ref) else {
            log::warn!("Skipping cell with unparseable reference '{cell_ref}'");
            return;
        };
        if row < DATA_START_ROW {
            return;
        }
        let Some(field) = source_field(column) else {
            return;
        };

        let value = convert_cell(
            cell_type.as_deref(),
            style,
            raw_value,
            shared_strings,
            date_styles,
        );
        if value.is_empty() {
            return;
        }

        let record = rows.entry(row).or_insert_with(|| RawRecord::at_row(row));
        match field {
            SourceField::OrderDate => record.order_date = value,
            SourceField::OrderNumber => record.order_number = value,
            SourceField::ClientName => record.client_name = value,
            SourceField::Term => record.term = value,
            SourceField::OrderValue => record.order_value = value,
            SourceField::Percentage => record.percentage = value,
            SourceField::FreightRatio => record.freight_ratio = value,
        }
    }
}

/// Convert one cell's raw XML content into a [`SourceValue`].
///
/// Date-typed and date-styled cells are rendered to `dd/mm` text here,
/// so downstream code never sees a date serial.
fn convert_cell(
    cell_type: Option<&str>,
    style: Option<usize>,
    raw_value: Option<String>,
    shared_strings: &[String],
    date_styles: &[bool],
) -> SourceValue {
    let Some(raw) = raw_value else {
        return SourceValue::Empty;
    };

    match cell_type {
        Some("s") => {
            let text = raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| shared_strings.get(idx))
                .cloned()
                .unwrap_or_default();
            SourceValue::text(text)
        }
        Some("str") | Some("inlineStr") => SourceValue::text(raw),
        Some("b") => SourceValue::Number(if raw.trim() == "1" { 1.0 } else { 0.0 }),
        Some("d") => match parse_iso_date(raw.trim()) {
            Some(date) => SourceValue::text(date.format("%d/%m").to_string()),
            None => SourceValue::text(raw),
        },
        Some("e") => SourceValue::Empty,
        _ => match raw.trim().parse::<f64>() {
            Ok(number) => {
                let is_date = style.is_some_and(|s| date_styles.get(s).copied().unwrap_or(false));
                match is_date.then(|| serial_to_date(number)).flatten() {
                    Some(date) => SourceValue::text(date.format("%d/%m").to_string()),
                    None => SourceValue::Number(number),
                }
            }
            Err(_) => SourceValue::text(raw),
        },
    }
}

/// Split a cell reference like `F12` into its column letters and row
fn split_cell_ref(cell_ref: &str) -> Option<(&str, u32)> {
    let digit_pos = cell_ref.find(|c: char| c.is_ascii_digit())?;
    if digit_pos == 0 {
        return None;
    }
    let (letters, digits) = cell_ref.split_at(digit_pos);
    let row = digits.parse().ok()?;
    Some((letters, row))
}

/// Convert an Excel date serial (1900 date system) to a calendar date
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(0.0..=2_958_465.0).contains(&serial) {
        return None; // Outside Excel's representable date range
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(chrono::Duration::days(serial as i64))
}

/// Parse an ISO 8601 date cell (`2024-03-05` or `2024-03-05T10:30:00`)
fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Check whether a numFmtId (or its custom format code) is a date format
fn is_date_format(num_fmt_id: u32, custom_code: Option<&str>) -> bool {
    match num_fmt_id {
        14..=22 | 27..=36 | 45..=47 | 50..=58 => true,
        0..=163 => false,
        _ => custom_code.is_some_and(code_looks_like_date),
    }
}

/// Heuristic for custom format codes: date codes contain day/month/year or
/// time tokens once quoted literals and color/locale brackets are removed.
fn code_looks_like_date(code: &str) -> bool {
    let mut in_quote = false;
    let mut in_bracket = false;
    for c in code.chars() {
        match c {
            '"' => in_quote = !in_quote,
            '[' if !in_quote => in_bracket = true,
            ']' if !in_quote => in_bracket = false,
            'd' | 'm' | 'y' | 'h' | 's' | 'D' | 'M' | 'Y' | 'H' | 'S'
                if !in_quote && !in_bracket =>
            {
                return true;
            }
            _ => {}
        }
    }
    false
}
