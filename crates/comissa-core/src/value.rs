//! Normalized source cell values

use std::fmt;

/// A cell value as produced by the extractor.
///
/// Blank or whitespace-only text is normalized to [`SourceValue::Empty`]
/// at extraction time. Date-styled cells are rendered to `Text("dd/mm")`
/// before they reach this type, so downstream code only sees these three
/// shapes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SourceValue {
    /// Empty cell (no value, or blank text)
    #[default]
    Empty,

    /// Numeric value (all numbers stored as f64)
    Number(f64),

    /// String value (non-blank)
    Text(String),
}

impl SourceValue {
    /// Create a text value, normalizing blank input to `Empty`
    pub fn text<S: Into<String>>(s: S) -> Self {
        let s = s.into();
        if s.trim().is_empty() {
            SourceValue::Empty
        } else {
            SourceValue::Text(s)
        }
    }

    /// Check if the value is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, SourceValue::Empty)
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SourceValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as a string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SourceValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Render the value for display.
    ///
    /// Numbers with no fractional part print without a decimal point
    /// (a term cell holding `30` displays as `"30"`, not `"30.0"`).
    pub fn display_text(&self) -> String {
        match self {
            SourceValue::Empty => String::new(),
            SourceValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            SourceValue::Number(n) => n.to_string(),
            SourceValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for SourceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_text())
    }
}

impl From<f64> for SourceValue {
    fn from(n: f64) -> Self {
        SourceValue::Number(n)
    }
}

impl From<&str> for SourceValue {
    fn from(s: &str) -> Self {
        SourceValue::text(s)
    }
}
