//! Raw and derived record types

use crate::format;
use crate::layout::{CellFormat, OutputField, OUTPUT_COLUMNS};
use crate::value::SourceValue;
use crate::{ORDER_NUMBER_MAX_LEN, OUTPUT_COLUMN_COUNT};

/// One row extracted from the source sheet, before calculation.
///
/// Every field is optionally absent ([`SourceValue::Empty`]); the
/// calculator is responsible for coercing whatever shape arrives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub order_date: SourceValue,
    pub order_number: SourceValue,
    pub client_name: SourceValue,
    pub term: SourceValue,
    pub order_value: SourceValue,
    pub percentage: SourceValue,
    pub freight_ratio: SourceValue,
    /// 1-based row number in the source sheet, for diagnostics only
    pub row_number: u32,
}

impl RawRecord {
    /// Create an empty record tagged with its source row number
    pub fn at_row(row_number: u32) -> Self {
        RawRecord {
            row_number,
            ..RawRecord::default()
        }
    }

    /// Retention rule: a row is kept when it has a non-zero/non-null
    /// order value or a non-blank client name. Everything else is a
    /// blank row and is dropped silently.
    pub fn is_retained(&self) -> bool {
        let has_value = match &self.order_value {
            SourceValue::Empty => false,
            SourceValue::Number(n) => *n != 0.0,
            SourceValue::Text(t) => !t.trim().is_empty(),
        };
        let has_name = self
            .client_name
            .as_text()
            .is_some_and(|t| !t.trim().is_empty());
        has_value || has_name
    }
}

/// Fully calculated and display-formatted row, ready for the filler
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRecord {
    pub order_date: String,
    pub order_number: String,
    pub client_name: String,
    pub term_display: String,
    pub order_value: f64,
    pub percentage: f64,
    pub commission_value: f64,
    pub freight_value: f64,
    pub commission_reference: f64,
    pub payment_method: String,
}

impl DerivedRecord {
    /// Render the eleven output-column display strings for this record,
    /// applying the per-column format from the layout table.
    pub fn rendered_columns(&self) -> [String; OUTPUT_COLUMN_COUNT] {
        OUTPUT_COLUMNS.map(|column| {
            let text = match column.field {
                OutputField::OrderDate => self.order_date.clone(),
                OutputField::OrderNumber => {
                    format::truncate_chars(self.order_number.trim(), ORDER_NUMBER_MAX_LEN)
                }
                OutputField::ClientName => self.client_name.clone(),
                OutputField::TermDisplay => self.term_display.clone(),
                OutputField::PaymentMethod => self.payment_method.clone(),
                OutputField::OrderValue => return render_number(column.format, self.order_value),
                OutputField::Percentage => return render_number(column.format, self.percentage),
                OutputField::CommissionValue => {
                    return render_number(column.format, self.commission_value)
                }
                OutputField::FreightValue => {
                    return render_number(column.format, self.freight_value)
                }
                OutputField::CommissionReference => {
                    return render_number(column.format, self.commission_reference)
                }
                OutputField::Reserved => return String::new(),
            };
            text.trim().to_string()
        })
    }
}

fn render_number(cell_format: CellFormat, value: f64) -> String {
    match cell_format {
        CellFormat::Decimal2 => format::decimal_comma(value),
        CellFormat::Integer => format::integer(value),
        CellFormat::Text => value.to_string(),
        CellFormat::Blank => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_rows_are_dropped() {
        let blank = RawRecord::at_row(5);
        assert!(!blank.is_retained());

        let zero_value_no_name = RawRecord {
            order_value: SourceValue::Number(0.0),
            ..RawRecord::at_row(5)
        };
        assert!(!zero_value_no_name.is_retained());
    }

    #[test]
    fn named_rows_are_retained_even_with_zero_value() {
        let record = RawRecord {
            client_name: SourceValue::text("X"),
            order_value: SourceValue::Number(0.0),
            ..RawRecord::at_row(6)
        };
        assert!(record.is_retained());
    }

    #[test]
    fn valued_rows_are_retained_without_a_name() {
        let record = RawRecord {
            order_value: SourceValue::Number(150.0),
            ..RawRecord::at_row(7)
        };
        assert!(record.is_retained());
    }

    #[test]
    fn rendered_columns_apply_layout_formats() {
        let derived = DerivedRecord {
            order_date: "05/03".into(),
            order_number: format!("P-{}", "9".repeat(50)),
            client_name: "Acme Ltda".into(),
            term_display: "30 a 120".into(),
            order_value: 1234.56,
            percentage: 7.0,
            commission_value: 890.0,
            freight_value: 5.0,
            commission_reference: 44.5,
            payment_method: "BOLETOS".into(),
        };

        let cols = derived.rendered_columns();
        assert_eq!(cols[0], "05/03");
        assert_eq!(cols[1].chars().count(), 40);
        assert_eq!(cols[4], "1.234,56");
        assert_eq!(cols[5], "7");
        assert_eq!(cols[6], "890,00");
        assert_eq!(cols[7], "5");
        assert_eq!(cols[8], "44,50");
        assert_eq!(cols[9], "BOLETOS");
        assert_eq!(cols[10], "");
    }
}
