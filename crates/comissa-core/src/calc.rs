//! Commission calculation pipeline.
//!
//! [`calculate`] is deliberately total: every step coerces or degrades
//! malformed input to a zero/default instead of returning an error, so a
//! single bad row never aborts a batch.

use lazy_regex::regex;

use crate::format;
use crate::record::{DerivedRecord, RawRecord};
use crate::value::SourceValue;
use crate::{CLIENT_NAME_MAX_LEN, PAYMENT_METHOD};

/// Coerce a source value to a number, defaulting to 0 on any failure.
///
/// Text is interpreted with Brazilian currency conventions: `R$`/`$`
/// markers stripped, `.` treated as thousands separator, `,` as decimal
/// separator, then anything that is not a digit, a dot, or a minus sign
/// discarded before parsing.
pub fn to_number(value: &SourceValue) -> f64 {
    match value {
        SourceValue::Empty => 0.0,
        SourceValue::Number(n) => *n,
        SourceValue::Text(t) => parse_decimal_text(t),
    }
}

fn parse_decimal_text(text: &str) -> f64 {
    let cleaned = text.trim().replace("R$", "").replace('$', "");
    let cleaned = cleaned.replace('.', "").replace(',', ".");
    let cleaned: String = cleaned
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

/// Discount tier derived from the term's final day count.
///
/// A term with no `/` has no tier. Otherwise the first run of digits in
/// the last `/`-separated segment selects the bucket. The boundaries are
/// strict as observed in the business rule: exactly 30 days is tier 0.
pub fn term_tier(term: &str) -> f64 {
    if !term.contains('/') {
        return 0.0;
    }
    let last_segment = match term.rsplit('/').next() {
        Some(s) => s.trim(),
        None => return 0.0,
    };
    let days: i64 = match digit_run(last_segment).and_then(|d| d.parse().ok()) {
        Some(n) => n,
        None => return 0.0,
    };
    match days {
        31..=59 => 4.0,
        60..=89 => 4.0,
        90..=119 => 5.0,
        n if n >= 120 => 7.0,
        _ => 0.0,
    }
}

/// First run of decimal digits in a string, if any
fn digit_run(s: &str) -> Option<&str> {
    regex!(r"[0-9]+").find(s).map(|m| m.as_str())
}

/// Collapse a four-segment term into range notation.
///
/// `"30/60/90/120"` renders as `"30 a 120"`; every other shape passes
/// through unchanged.
pub fn format_term_display(term: &str) -> String {
    if !term.contains('/') {
        return term.to_string();
    }
    let segments: Vec<&str> = term.split('/').collect();
    if segments.len() != 4 {
        return term.to_string();
    }
    match (digit_run(segments[0]), digit_run(segments[3])) {
        (Some(first), Some(last)) => format!("{first} a {last}"),
        _ => term.to_string(),
    }
}

/// Format an order date for display as day/month.
///
/// Date cells are already rendered to `dd/mm` text at extraction time;
/// free-form text keeps only its first two `/`-separated segments (the
/// year, if present, is dropped).
pub fn format_date_display(value: &SourceValue) -> String {
    match value {
        SourceValue::Text(t) if t.contains('/') => {
            let t = t.trim();
            t.splitn(3, '/').take(2).collect::<Vec<_>>().join("/")
        }
        other => other.display_text().trim().to_string(),
    }
}

/// Calculate the derived record for one raw row.
///
/// Steps: numeric coercion, term-tier lookup, the percentage-discount
/// commission formula, freight rescaling, the commission reference, and
/// the display formatting of every text field.
pub fn calculate(raw: &RawRecord) -> DerivedRecord {
    let order_value = to_number(&raw.order_value);
    let percentage = to_number(&raw.percentage);

    let term_text = raw.term.display_text();
    let tier = term_tier(term_text.trim());

    // Percentage and tier are both discount magnitudes; historical sign
    // conventions are irrelevant to the combined discount.
    let discount = percentage.abs() + tier;
    let commission_value = if order_value <= 0.0 {
        0.0
    } else {
        (order_value - order_value * discount / 100.0).max(0.0)
    };

    // Freight arrives as a fraction (0.05), displays as points (5)
    let freight_value = to_number(&raw.freight_ratio).abs() * 100.0;
    let commission_reference = commission_value * (freight_value / 100.0);

    DerivedRecord {
        order_date: format_date_display(&raw.order_date),
        order_number: raw.order_number.display_text().trim().to_string(),
        client_name: format::title_case_truncated(
            &raw.client_name.display_text(),
            CLIENT_NAME_MAX_LEN,
        ),
        term_display: format_term_display(term_text.trim()),
        order_value,
        percentage,
        commission_value,
        freight_value,
        commission_reference,
        payment_method: PAYMENT_METHOD.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(fields: impl FnOnce(&mut RawRecord)) -> RawRecord {
        let mut record = RawRecord::at_row(4);
        fields(&mut record);
        record
    }

    #[test]
    fn coercion_handles_currency_text() {
        assert_eq!(to_number(&SourceValue::text("R$ 1.234,56")), 1234.56);
        assert_eq!(to_number(&SourceValue::text("1.000")), 1000.0);
        assert_eq!(to_number(&SourceValue::text("-12,5")), -12.5);
        assert_eq!(to_number(&SourceValue::text("abc")), 0.0);
        assert_eq!(to_number(&SourceValue::text("")), 0.0);
        assert_eq!(to_number(&SourceValue::Empty), 0.0);
        assert_eq!(to_number(&SourceValue::Number(42.5)), 42.5);
    }

    #[test]
    fn tier_is_zero_without_slash() {
        assert_eq!(term_tier(""), 0.0);
        assert_eq!(term_tier("30"), 0.0);
        assert_eq!(term_tier("a vista"), 0.0);
    }

    #[test]
    fn tier_boundaries_are_strict() {
        // Exactly 30 days stays in tier 0 (strict > boundary)
        assert_eq!(term_tier("15/30"), 0.0);
        assert_eq!(term_tier("30/31"), 4.0);
        assert_eq!(term_tier("30/59"), 4.0);
        assert_eq!(term_tier("30/60"), 4.0);
        assert_eq!(term_tier("30/89"), 4.0);
        assert_eq!(term_tier("30/90"), 5.0);
        assert_eq!(term_tier("30/119"), 5.0);
        assert_eq!(term_tier("30/120"), 7.0);
        assert_eq!(term_tier("30/180"), 7.0);
        assert_eq!(term_tier("30/0"), 0.0);
    }

    #[test]
    fn tier_reads_first_digit_run_of_last_segment() {
        assert_eq!(term_tier("30/60/90 dias"), 5.0);
        assert_eq!(term_tier("30/sem numero"), 0.0);
    }

    #[test]
    fn term_display_collapses_four_segments_only() {
        assert_eq!(format_term_display("30/60/90/120"), "30 a 120");
        assert_eq!(format_term_display("30/60/90"), "30/60/90");
        assert_eq!(format_term_display("30/60"), "30/60");
        assert_eq!(format_term_display("a vista"), "a vista");
    }

    #[test]
    fn date_display_drops_year_segment() {
        assert_eq!(
            format_date_display(&SourceValue::text("01/02/2025")),
            "01/02"
        );
        assert_eq!(format_date_display(&SourceValue::text("05/03")), "05/03");
        assert_eq!(format_date_display(&SourceValue::text("amanhã")), "amanhã");
        assert_eq!(format_date_display(&SourceValue::Empty), "");
    }

    #[test]
    fn documented_round_trip() {
        // 1000 at 7% with term "10/30/60": last segment 60 -> tier 4,
        // combined discount 11% -> commission 890.00
        let record = raw(|r| {
            r.order_value = SourceValue::Number(1000.0);
            r.percentage = SourceValue::Number(7.0);
            r.term = SourceValue::text("10/30/60");
        });
        let derived = calculate(&record);
        assert_eq!(derived.commission_value, 890.0);
        assert_eq!(derived.term_display, "10/30/60");
    }

    #[test]
    fn commission_is_floored_at_zero() {
        let record = raw(|r| {
            r.order_value = SourceValue::Number(100.0);
            r.percentage = SourceValue::Number(150.0);
        });
        assert_eq!(calculate(&record).commission_value, 0.0);
    }

    #[test]
    fn non_positive_order_value_forces_zero_commission() {
        for value in [0.0, -500.0] {
            let record = raw(|r| {
                r.order_value = SourceValue::Number(value);
                r.percentage = SourceValue::Number(5.0);
            });
            assert_eq!(calculate(&record).commission_value, 0.0);
        }
    }

    #[test]
    fn negative_percentage_discounts_by_magnitude() {
        let record = raw(|r| {
            r.order_value = SourceValue::Number(1000.0);
            r.percentage = SourceValue::Number(-7.0);
        });
        assert_eq!(calculate(&record).commission_value, 930.0);
    }

    #[test]
    fn freight_fraction_rescales_to_points() {
        let record = raw(|r| {
            r.order_value = SourceValue::Number(1000.0);
            r.freight_ratio = SourceValue::Number(0.05);
        });
        let derived = calculate(&record);
        assert_eq!(derived.freight_value, 5.0);
        assert_eq!(derived.commission_reference, 50.0);
    }

    #[test]
    fn calculate_is_total_on_empty_input() {
        let derived = calculate(&RawRecord::default());
        assert_eq!(derived.commission_value, 0.0);
        assert_eq!(derived.order_date, "");
        assert_eq!(derived.client_name, "");
        assert_eq!(derived.payment_method, "BOLETOS");
    }

    #[test]
    fn calculate_is_total_on_garbage_input() {
        let record = raw(|r| {
            r.order_date = SourceValue::text("///");
            r.order_number = SourceValue::Number(123456.0);
            r.client_name = SourceValue::text("  loja DA esquina  ");
            r.term = SourceValue::text("///sem/numeros///");
            r.order_value = SourceValue::text("not a number");
            r.percentage = SourceValue::text("%%");
            r.freight_ratio = SourceValue::text("??");
        });
        let derived = calculate(&record);
        assert_eq!(derived.commission_value, 0.0);
        assert_eq!(derived.freight_value, 0.0);
        assert_eq!(derived.client_name, "Loja Da Esquina");
        assert_eq!(derived.order_number, "123456");
    }

    #[test]
    fn client_name_is_truncated_to_37_chars() {
        let record = raw(|r| {
            r.order_value = SourceValue::Number(10.0);
            r.client_name = SourceValue::text("b".repeat(45));
        });
        assert_eq!(calculate(&record).client_name.chars().count(), 37);
    }
}
