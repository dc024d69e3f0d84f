//! Workbook-level configuration

/// Separators and currency symbol used when rendering formatted values
///
/// These come from the caller, not from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Locale {
    pub decimal_separator: String,
    pub thousands_separator: String,
    pub currency_symbol: String,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            decimal_separator: ".".to_string(),
            thousands_separator: ",".to_string(),
            currency_symbol: "$".to_string(),
        }
    }
}

impl Locale {
    pub fn new(
        decimal_separator: impl Into<String>,
        thousands_separator: impl Into<String>,
        currency_symbol: impl Into<String>,
    ) -> Self {
        Self {
            decimal_separator: decimal_separator.into(),
            thousands_separator: thousands_separator.into(),
            currency_symbol: currency_symbol.into(),
        }
    }
}

/// Default row height in points for new worksheets
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// Workbook settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkbookSettings {
    /// Locale used to render number formats
    pub locale: Locale,
    /// Default row height given to new worksheets
    pub default_row_height: f64,
    /// Column width cap given to new worksheets (0 = no cap)
    pub max_column_width: f64,
}

impl Default for WorkbookSettings {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            default_row_height: DEFAULT_ROW_HEIGHT,
            max_column_width: 0.0,
        }
    }
}
