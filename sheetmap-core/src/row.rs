//! Raw tabular rows and their scalar cells.

use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A single scalar cell taken from a data source.
///
/// # Examples
/// ```
/// use sheetmap_core::Value;
///
/// assert_eq!(Value::from("51.5").to_f64(), 51.5);
/// assert!(Value::Null.is_blank());
/// assert_eq!(Value::Number(2.0).to_string(), "2");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum Value {
    /// An empty cell.
    #[default]
    Null,
    /// A boolean cell.
    Bool(bool),
    /// A numeric cell.
    Number(f64),
    /// A text cell.
    Text(String),
}

impl Value {
    /// Return `true` for `Null` and empty text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    /// Interpret the cell as a floating-point number.
    ///
    /// Text is parsed with [`parse_leading_float`]; anything without a
    /// numeric reading yields `NaN`.
    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Number(number) => *number,
            Self::Text(text) => parse_leading_float(text),
            Self::Null | Self::Bool(_) => f64::NAN,
        }
    }

    /// Borrow the text payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<f64> for Value {
    fn from(number: f64) -> Self {
        Self::Number(number)
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Self::Bool(flag)
    }
}

/// Normalise a field name for lookup: lower-case with whitespace removed.
///
/// # Examples
/// ```
/// use sheetmap_core::normalize_field_name;
///
/// assert_eq!(normalize_field_name("Icon URL"), "iconurl");
/// assert_eq!(normalize_field_name("ICONURL"), "iconurl");
/// ```
pub fn normalize_field_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parse the longest numeric prefix of `text`.
///
/// Leading whitespace is skipped and trailing characters are ignored, so
/// `"12.5 km"` reads as `12.5`. Text without a numeric prefix yields `NaN`.
///
/// # Examples
/// ```
/// use sheetmap_core::parse_leading_float;
///
/// assert_eq!(parse_leading_float(" -0.09"), -0.09);
/// assert_eq!(parse_leading_float("51.5N"), 51.5);
/// assert!(parse_leading_float("north").is_nan());
/// ```
pub fn parse_leading_float(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let unsigned = trimmed.trim_start_matches(['+', '-']);
    let sign_len = trimmed.len() - unsigned.len();
    if sign_len > 1 {
        return f64::NAN;
    }
    if unsigned.starts_with("Infinity") {
        return if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }
    let len = numeric_prefix_len(trimmed.as_bytes());
    trimmed
        .get(..len)
        .and_then(|prefix| prefix.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn count_digits(bytes: &[u8], start: usize) -> usize {
    bytes
        .get(start..)
        .map_or(0, |rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
}

fn numeric_prefix_len(bytes: &[u8]) -> usize {
    let mut pos = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = count_digits(bytes, pos);
    pos += int_digits;
    let mut mantissa_digits = int_digits;
    if bytes.get(pos) == Some(&b'.') {
        let frac_digits = count_digits(bytes, pos + 1);
        mantissa_digits += frac_digits;
        if mantissa_digits > 0 {
            pos += 1 + frac_digits;
        }
    }
    if mantissa_digits == 0 {
        return 0;
    }
    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(pos + 1), Some(b'+' | b'-')));
        let exp_digits = count_digits(bytes, pos + 1 + sign);
        if exp_digits > 0 {
            pos += 1 + sign + exp_digits;
        }
    }
    pos
}

/// One record of tabular source data keyed by normalised field name.
///
/// Keys are expected to be normalised already (see
/// [`normalize_field_name`]); use [`Row::normalized`] when building a row
/// from raw headers.
///
/// # Examples
/// ```
/// use sheetmap_core::{Row, Value};
///
/// let row = Row::normalized([("Icon URL", Value::from("pin.png"))]);
/// assert_eq!(row.get("icon url"), Some(&Value::from("pin.png")));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Row {
    cells: BTreeMap<String, Value>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from raw headers, normalising every key.
    pub fn normalized<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        pairs
            .into_iter()
            .map(|(key, value)| (normalize_field_name(key.as_ref()), value.into()))
            .collect()
    }

    /// Look up a field after normalising `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.cells.get(&normalize_field_name(name))
    }

    /// Insert a cell under an already-normalised key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.cells.insert(key.into(), value.into())
    }

    /// Number of cells in the row.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Return `true` when the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", 1.0)]
    #[case("  -73.98", -73.98)]
    #[case("+2.5e2", 250.0)]
    #[case(".5", 0.5)]
    #[case("7.", 7.0)]
    #[case("12.5abc", 12.5)]
    #[case("3e", 3.0)]
    #[case("1.2.3", 1.2)]
    fn parses_numeric_prefix(#[case] text: &str, #[case] expected: f64) {
        assert_eq!(parse_leading_float(text), expected);
    }

    #[rstest]
    #[case("")]
    #[case("x")]
    #[case("-")]
    #[case(".")]
    #[case("--1")]
    #[case("e5")]
    fn rejects_text_without_numeric_prefix(#[case] text: &str) {
        assert!(parse_leading_float(text).is_nan());
    }

    #[rstest]
    fn parses_infinity_like_a_spreadsheet_export() {
        assert_eq!(parse_leading_float("Infinity"), f64::INFINITY);
        assert_eq!(parse_leading_float("-Infinity"), f64::NEG_INFINITY);
    }

    #[rstest]
    fn non_numeric_values_are_nan() {
        assert!(Value::Null.to_f64().is_nan());
        assert!(Value::Bool(true).to_f64().is_nan());
        assert_eq!(Value::Number(4.25).to_f64(), 4.25);
    }

    #[rstest]
    #[case(Value::Null, "")]
    #[case(Value::Bool(false), "false")]
    #[case(Value::Number(1.5), "1.5")]
    #[case(Value::from("text"), "text")]
    fn display_renders_plain_text(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[rstest]
    fn normalized_rows_lower_case_and_strip_spaces() {
        let row = Row::normalized([("Hex Color", "#fff"), ("NAME", "Cafe")]);
        assert_eq!(row.get("hexcolor"), Some(&Value::from("#fff")));
        assert_eq!(row.get("Name"), Some(&Value::from("Cafe")));
        assert_eq!(row.len(), 2);
    }

    #[rstest]
    fn collected_rows_keep_keys_verbatim() {
        let row: Row = [("Mixed".to_owned(), Value::from("x"))].into_iter().collect();
        assert_eq!(row.get("Mixed"), None);
        assert_eq!(row.iter().next().map(|(key, _)| key), Some("Mixed"));
    }
}
