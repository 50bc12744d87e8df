//! Fixed positional mappings between the source sheet and the output table.
//!
//! The column bindings are business constants, not configuration: the
//! source spreadsheet and the document template both have a frozen layout.
//! They are gathered here as named tables so the whole mapping is a single
//! reviewable artifact instead of cell addresses scattered through the
//! extractor and filler.

/// First data row of the source sheet (1-based; rows 1-3 are title/header)
pub const DATA_START_ROW: u32 = 4;

/// Semantic fields extracted from the source sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceField {
    OrderDate,
    OrderNumber,
    ClientName,
    Term,
    OrderValue,
    Percentage,
    FreightRatio,
}

/// Source column letter -> field bindings.
///
/// Columns C and H are reserved/unused in the source layout and are
/// intentionally absent.
pub const SOURCE_COLUMNS: [(&str, SourceField); 7] = [
    ("A", SourceField::OrderDate),
    ("B", SourceField::OrderNumber),
    ("D", SourceField::ClientName),
    ("E", SourceField::Term),
    ("F", SourceField::OrderValue),
    ("G", SourceField::Percentage),
    ("I", SourceField::FreightRatio),
];

/// Look up the field bound to a source column letter, if any
pub fn source_field(column: &str) -> Option<SourceField> {
    SOURCE_COLUMNS
        .iter()
        .find(|(letter, _)| *letter == column)
        .map(|(_, field)| *field)
}

/// Fields of the output table, in column order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputField {
    OrderDate,
    OrderNumber,
    ClientName,
    TermDisplay,
    OrderValue,
    Percentage,
    CommissionValue,
    FreightValue,
    CommissionReference,
    PaymentMethod,
    Reserved,
}

/// Display format applied to an output column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFormat {
    /// Trimmed text, written as-is
    Text,
    /// Two decimals, `.` thousands separator, `,` decimal separator
    Decimal2,
    /// Integer, truncated toward zero, no decimals
    Integer,
    /// Always blank
    Blank,
}

/// One column of the output table: field, format, and font size
#[derive(Debug, Clone, Copy)]
pub struct OutputColumn {
    pub field: OutputField,
    pub format: CellFormat,
    pub font_points: u8,
}

const fn col(field: OutputField, format: CellFormat, font_points: u8) -> OutputColumn {
    OutputColumn {
        field,
        format,
        font_points,
    }
}

/// The fixed 11-column output table layout (0-based column order)
pub const OUTPUT_COLUMNS: [OutputColumn; 11] = [
    col(OutputField::OrderDate, CellFormat::Text, 8),
    col(OutputField::OrderNumber, CellFormat::Text, 8),
    col(OutputField::ClientName, CellFormat::Text, 9),
    col(OutputField::TermDisplay, CellFormat::Text, 8),
    col(OutputField::OrderValue, CellFormat::Decimal2, 9),
    col(OutputField::Percentage, CellFormat::Integer, 8),
    col(OutputField::CommissionValue, CellFormat::Decimal2, 9),
    col(OutputField::FreightValue, CellFormat::Integer, 8),
    col(OutputField::CommissionReference, CellFormat::Decimal2, 9),
    col(OutputField::PaymentMethod, CellFormat::Text, 8),
    col(OutputField::Reserved, CellFormat::Blank, 8),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_source_columns_are_unbound() {
        assert_eq!(source_field("C"), None);
        assert_eq!(source_field("H"), None);
        assert_eq!(source_field("A"), Some(SourceField::OrderDate));
        assert_eq!(source_field("I"), Some(SourceField::FreightRatio));
    }

    #[test]
    fn output_layout_has_eleven_columns() {
        assert_eq!(OUTPUT_COLUMNS.len(), 11);
        // The trailing column is always blank
        assert_eq!(OUTPUT_COLUMNS[10].format, CellFormat::Blank);
        // Money columns carry the larger font
        for idx in [2, 4, 6, 8] {
            assert_eq!(OUTPUT_COLUMNS[idx].font_points, 9);
        }
    }
}
