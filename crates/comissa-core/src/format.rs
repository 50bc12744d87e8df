//! Display formatting helpers for output table cells

/// Format a number with two decimals, `.` as thousands separator and `,`
/// as decimal separator (the inverse of US conventions).
///
/// The number is rendered in the neutral `1234.56` form first, then
/// regrouped with the separators swapped.
pub fn decimal_comma(value: f64) -> String {
    let negative = value < 0.0;
    let neutral = format!("{:.2}", value.abs());
    let (int_part, frac_part) = match neutral.split_once('.') {
        Some((i, f)) => (i, f),
        None => (neutral.as_str(), "00"),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if negative {
        grouped.push('-');
    }
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }
    grouped.push(',');
    grouped.push_str(frac_part);
    grouped
}

/// Format a number as an integer, truncating toward zero
pub fn integer(value: f64) -> String {
    format!("{}", value.trunc() as i64)
}

/// Title-case a name: trim, capitalize the first letter of every
/// whitespace-separated word, lowercase the rest, and cap the result at
/// `max_len` characters.
pub fn title_case_truncated(name: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(name.len());
    for word in name.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            for c in chars {
                out.extend(c.to_lowercase());
            }
        }
    }
    truncate_chars(&out, max_len)
}

/// Truncate a string to at most `max_len` characters (not bytes)
pub fn truncate_chars(s: &str, max_len: usize) -> String {
    s.chars().take(max_len).collect()
}
