//! End-to-end fill tests against in-memory DOCX templates

use std::io::{Cursor, Read, Write};

use comissa_docx::{DocumentModel, DocxFiller, FillError};
use comissa_core::DerivedRecord;
use pretty_assertions::assert_eq;

/// Build a minimal DOCX container around the given `word/document.xml`
fn build_docx(document_xml: &str) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#,
        )
        .unwrap();

        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(
            br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#,
        )
        .unwrap();

        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(document_xml.as_bytes()).unwrap();

        zip.finish().unwrap();
    }
    cursor.into_inner()
}

/// A template with one table: a header row plus one blank data row,
/// `cols` columns wide.
fn template_with_table(cols: usize, rows: usize) -> Vec<u8> {
    let mut grid = String::new();
    for _ in 0..cols {
        grid.push_str("<w:gridCol/>");
    }
    let mut body_rows = String::new();
    for row in 0..rows {
        body_rows.push_str("<w:tr>");
        for col in 0..cols {
            if row == 0 {
                body_rows.push_str(&format!(
                    "<w:tc><w:tcPr><w:shd w:fill=\"DDDDDD\"/></w:tcPr><w:p><w:r><w:t>H{col}</w:t></w:r></w:p></w:tc>"
                ));
            } else {
                body_rows.push_str("<w:tc><w:tcPr/><w:p/></w:tc>");
            }
        }
        body_rows.push_str("</w:tr>");
    }
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Pedidos - Comissão</w:t></w:r></w:p>
    <w:tbl>
      <w:tblGrid>{grid}</w:tblGrid>
      {body_rows}
    </w:tbl>
    <w:p><w:r><w:t>Rodapé</w:t></w:r></w:p>
  </w:body>
</w:document>"#
    );
    build_docx(&document)
}

fn record(client: &str, order_value: f64, commission: f64) -> DerivedRecord {
    DerivedRecord {
        order_date: "05/03".into(),
        order_number: "PED-001".into(),
        client_name: client.into(),
        term_display: "30 a 120".into(),
        order_value,
        percentage: 7.0,
        commission_value: commission,
        freight_value: 5.0,
        commission_reference: commission * 0.05,
        payment_method: "BOLETOS".into(),
    }
}

fn fill_to_model(template: Vec<u8>, records: &[DerivedRecord]) -> DocumentModel {
    let mut output = Cursor::new(Vec::new());
    DocxFiller::fill(Cursor::new(template), records, "Planilha1", &mut output).unwrap();
    DocumentModel::from_docx(Cursor::new(output.into_inner())).unwrap()
}

#[test]
fn three_records_grow_the_table_to_four_rows() {
    let records = vec![
        record("Cliente Um", 1234.56, 1098.76),
        record("Cliente Dois", 500.0, 445.0),
        record("Cliente Três", 0.0, 0.0),
    ];
    let model = fill_to_model(template_with_table(11, 2), &records);

    let table = model.first_table.unwrap();
    assert_eq!(table.rows.len(), 4, "1 header + 3 data rows");

    // Header row preserved untouched
    assert_eq!(table.rows[0][0], "H0");
    assert_eq!(table.rows[0][10], "H10");

    // Row 1 overwrote the template's blank data row
    assert_eq!(table.rows[1][2], "Cliente Um");
    assert_eq!(table.rows[1][4], "1.234,56");
    assert_eq!(table.rows[1][9], "BOLETOS");
    assert_eq!(table.rows[1][10], "", "reserved column stays blank");

    // Rows 2 and 3 were appended
    assert_eq!(table.rows[2][2], "Cliente Dois");
    assert_eq!(table.rows[3][2], "Cliente Três");
    assert_eq!(table.rows[3][6], "0,00");
}

#[test]
fn decimal_columns_render_with_comma_separator() {
    let model = fill_to_model(template_with_table(11, 2), &[record("X", 1000.0, 890.0)]);
    let table = model.first_table.unwrap();
    assert_eq!(table.rows[1][4], "1.000,00");
    assert_eq!(table.rows[1][6], "890,00");
    assert_eq!(table.rows[1][8], "44,50");
    // Integer columns carry no decimals
    assert_eq!(table.rows[1][5], "7");
    assert_eq!(table.rows[1][7], "5");
}

#[test]
fn filled_cells_carry_the_layout_font_sizes() {
    let template = template_with_table(11, 2);
    let mut output = Cursor::new(Vec::new());
    DocxFiller::fill(
        Cursor::new(template),
        &[record("X", 1000.0, 890.0)],
        "Planilha1",
        &mut output,
    )
    .unwrap();

    let mut archive = zip::ZipArchive::new(Cursor::new(output.into_inner())).unwrap();
    let mut doc = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut doc)
        .unwrap();

    // 8pt -> 16 half-points, 9pt -> 18 half-points
    assert!(doc.contains(r#"<w:sz w:val="16"/>"#));
    assert!(doc.contains(r#"<w:sz w:val="18"/>"#));
    // Content outside the table is untouched
    assert!(doc.contains("Rodapé"));
    assert!(doc.contains("Pedidos - Comissão"));
}

#[test]
fn container_entries_survive_the_rewrite() {
    let template = template_with_table(11, 2);
    let mut output = Cursor::new(Vec::new());
    DocxFiller::fill(
        Cursor::new(template),
        &[record("X", 1.0, 1.0)],
        "Planilha1",
        &mut output,
    )
    .unwrap();

    let mut archive = zip::ZipArchive::new(Cursor::new(output.into_inner())).unwrap();
    assert!(archive.by_name("[Content_Types].xml").is_ok());
    assert!(archive.by_name("_rels/.rels").is_ok());
}

#[test]
fn template_without_a_table_is_rejected() {
    let doc = build_docx(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p/></w:body></w:document>"#,
    );
    let err = DocxFiller::fill(
        Cursor::new(doc),
        &[record("X", 1.0, 1.0)],
        "Planilha1",
        Cursor::new(Vec::new()),
    )
    .unwrap_err();
    assert!(matches!(err, FillError::NoTable));
}

#[test]
fn undersized_templates_are_rejected() {
    let one_row = template_with_table(11, 1);
    let err = DocxFiller::fill(
        Cursor::new(one_row),
        &[record("X", 1.0, 1.0)],
        "Planilha1",
        Cursor::new(Vec::new()),
    )
    .unwrap_err();
    assert!(matches!(err, FillError::TooFewRows { found: 1 }));

    let ten_cols = template_with_table(10, 2);
    let err = DocxFiller::fill(
        Cursor::new(ten_cols),
        &[record("X", 1.0, 1.0)],
        "Planilha1",
        Cursor::new(Vec::new()),
    )
    .unwrap_err();
    assert!(matches!(err, FillError::TooFewColumns { found: 10 }));
}

#[test]
fn extra_template_rows_beyond_the_records_are_left_alone() {
    // Template with header + 3 data rows, but only one record
    let model = fill_to_model(template_with_table(11, 4), &[record("Só Um", 10.0, 10.0)]);
    let table = model.first_table.unwrap();
    assert_eq!(table.rows.len(), 4);
    assert_eq!(table.rows[1][2], "Só Um");
    // Rows 2 and 3 keep their (blank) template content
    assert_eq!(table.rows[2][2], "");
    assert_eq!(table.rows[3][2], "");
}
