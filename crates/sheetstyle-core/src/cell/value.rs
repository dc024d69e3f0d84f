//! Cell value types

use crate::style::Font;
use crate::time;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// A run of text with an optional partial font
///
/// Run fonts only carry the properties the run overrides; they are never
/// interned in the workbook font table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextRun {
    pub text: String,
    pub font: Option<Font>,
}

impl TextRun {
    /// Create an unformatted run
    pub fn plain<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            font: None,
        }
    }

    /// Create a run with its own font
    pub fn with_font<S: Into<String>>(text: S, font: Font) -> Self {
        Self {
            text: text.into(),
            font: Some(font),
        }
    }
}

/// Text of a shared string, plain or made of formatted runs
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RichString {
    runs: Vec<TextRun>,
}

impl RichString {
    /// A string with a single unformatted run
    pub fn plain<S: Into<String>>(text: S) -> Self {
        Self {
            runs: vec![TextRun::plain(text)],
        }
    }

    pub fn from_runs(runs: Vec<TextRun>) -> Self {
        Self { runs }
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    /// Whether any run carries a font
    pub fn is_rich(&self) -> bool {
        self.runs.iter().any(|run| run.font.is_some())
    }

    /// Plain text when the string has no formatted runs
    pub fn as_plain(&self) -> Option<&str> {
        match self.runs.as_slice() {
            [run] if run.font.is_none() => Some(&run.text),
            [] => Some(""),
            _ => None,
        }
    }

    /// Concatenated text of every run
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    /// Append a run
    pub fn push(&mut self, run: TextRun) {
        self.runs.push(run);
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|run| run.text.is_empty())
    }
}

impl fmt::Display for RichString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for run in &self.runs {
            f.write_str(&run.text)?;
        }
        Ok(())
    }
}

/// Represents the value stored in a cell
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    /// No value
    #[default]
    Blank,

    /// TRUE/FALSE
    Boolean(bool),

    /// Numeric value; dates are stored as serial numbers
    Number(f64),

    /// Text kept in the workbook shared string table (`t="s"`)
    SharedString(RichString),

    /// Inline formula string result (`t="str"`)
    String(String),
}

impl CellValue {
    /// Shared string value; empty text gives a blank value
    pub fn text<S: Into<String>>(s: S) -> Self {
        let s = s.into();
        if s.is_empty() {
            CellValue::Blank
        } else {
            CellValue::SharedString(RichString::plain(s))
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Blank => true,
            CellValue::SharedString(s) => s.is_empty(),
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to read the value as a date
    ///
    /// Returns `None` for non-numbers and serials outside the valid range.
    pub fn as_date_time(&self) -> Option<NaiveDateTime> {
        self.as_number().and_then(|n| time::to_date_time(n).ok())
    }

    /// Rich text of a shared string value
    pub fn as_rich_string(&self) -> Option<&RichString> {
        match self {
            CellValue::SharedString(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Blank => Ok(()),
            CellValue::Boolean(true) => write!(f, "TRUE"),
            CellValue::Boolean(false) => write!(f, "FALSE"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::SharedString(s) => write!(f, "{s}"),
            CellValue::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::text(s)
    }
}

impl From<RichString> for CellValue {
    fn from(s: RichString) -> Self {
        CellValue::SharedString(s)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::Number(time::from_date_time(value))
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Number(time::from_date(value))
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}
