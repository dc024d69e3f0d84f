//! Number formats
//!
//! A number format is identified by its Excel format code. The code is
//! classified into a small set of kinds and turned into a display pattern
//! on first use, using the caller's locale for separators and the currency
//! symbol. Classification only looks at the first `;` section and is
//! deliberately approximate.

use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::settings::Locale;
use crate::time;
use crate::FIRST_CUSTOM_NUMBER_FORMAT_ID;
use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// 0 - General
pub const ID_GENERAL: u32 = 0;
/// 12 - # ?/?
pub const ID_FRACTION: u32 = 12;
/// 13 - # ??/??
pub const ID_FRACTION2: u32 = 13;
/// 49 - @
pub const ID_TEXT: u32 = 49;

/// Built-in formats, implicit unless a package overrides them
///
/// Ids 5-8 and 41-44 are currency and accounting formats whose code depends
/// on the locale; Excel writes them out, so a package usually overrides them.
const BUILTIN_FORMATS: &[(u32, &str)] = &[
    (0, "General"),
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (5, "$#,##0_);($#,##0)"),
    (6, "$#,##0_);[Red]($#,##0)"),
    (7, "$#,##0.00_);($#,##0.00)"),
    (8, "$#,##0.00_);[Red]($#,##0.00)"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "mm-dd-yy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yy h:mm"),
    (37, "#,##0 ;(#,##0)"),
    (38, "#,##0 ;[Red](#,##0)"),
    (39, "#,##0.00 ;(#,##0.00)"),
    (40, "#,##0.00 ;[Red](#,##0.00)"),
    (41, r#"_(* #,##0_);_(* \(#,##0\);_(* "-"_);_(@_)"#),
    (42, r#"_("$"* #,##0_);_("$"* \(#,##0\);_("$"* "-"_);_(@_)"#),
    (43, r#"_(* #,##0.00_);_(* \(#,##0.00\);_(* "-"??_);_(@_)"#),
    (44, r#"_("$"* #,##0.00_);_("$"* \(#,##0.00\);_("$"* "-"??_);_(@_)"#),
    (45, "mm:ss"),
    (46, "[h]:mm:ss"),
    (47, "mmss.0"),
    (48, "##0.0E+0"),
    (49, "@"),
];

/// Code of a built-in format id
pub fn builtin_code(id: u32) -> Option<&'static str> {
    BUILTIN_FORMATS
        .iter()
        .find(|(builtin, _)| *builtin == id)
        .map(|(_, code)| *code)
}

/// Id of a built-in format code
pub fn builtin_id(code: &str) -> Option<u32> {
    BUILTIN_FORMATS
        .iter()
        .find(|(_, builtin)| *builtin == code)
        .map(|(id, _)| *id)
}

const CURRENCY_CODE: &str = r"(\\\s+)?\[\$.+-[\d\w]+\](\\\s+)?";

static FRACTION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#\s\?+/\?+").expect("valid regex"));

static CURRENCY_SYMBOL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<s1>\\\s+)?\[\$(?P<symbol>.+)-[\d\w]+\](?P<s2>\\\s+)?")
        .expect("valid regex")
});

/// Quoted currency symbol, thousands, decimals, exponent and percent parts
static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"(?P<c1>{CURRENCY_CODE})?(?:"(?P<c2>[^"]*)")?(?P<t>#,##)?0(?P<d>\.0+)?(?P<c3>{CURRENCY_CODE})?(?P<e>E\+0+)?(?P<p>%)?"#
    ))
    .expect("valid regex")
});

static BRACKET_PREFIX_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[.+\]").expect("valid regex"));

/// Kinds of number format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumberFormatType {
    General,
    Text,
    Numeric,
    Fraction,
    DateTime,
}

/// Layout of a numeric format
#[derive(Debug, Clone, PartialEq)]
pub struct NumericPattern {
    pub prefix: String,
    pub suffix: String,
    pub thousands: bool,
    pub decimals: usize,
    /// Minimum exponent digits when scientific
    pub exponent: Option<usize>,
    pub percent: bool,
    pub decimal_separator: String,
    pub thousands_separator: String,
}

impl NumericPattern {
    fn digits(&self, value: f64) -> String {
        let fixed = format!("{:.*}", self.decimals, value);
        let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

        let mut out = if self.thousands {
            group_thousands(integer, &self.thousands_separator)
        } else {
            integer.to_string()
        };
        if !fraction.is_empty() {
            out.push_str(&self.decimal_separator);
            out.push_str(fraction);
        }
        out
    }

    /// Render a number with this pattern
    pub fn render(&self, value: f64) -> String {
        let value = if self.percent { value * 100.0 } else { value };
        let negative = value < 0.0;
        let value = value.abs();

        let body = match self.exponent {
            Some(width) => {
                let (mantissa, exponent) = split_exponent(value, self.decimals);
                let sign = if exponent < 0 { "-" } else { "" };
                format!(
                    "{}E{sign}{:0width$}",
                    self.digits(mantissa),
                    exponent.unsigned_abs(),
                )
            }
            None => self.digits(value),
        };

        let mut out = String::new();
        if negative && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
            out.push('-');
        }
        out.push_str(&self.prefix);
        out.push_str(&body);
        out.push_str(&self.suffix);
        if self.percent {
            out.push('%');
        }
        out
    }
}

fn group_thousands(integer: &str, separator: &str) -> String {
    let len = integer.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(c);
    }
    out
}

fn split_exponent(value: f64, decimals: usize) -> (f64, i32) {
    if value == 0.0 || !value.is_finite() {
        return (value, 0);
    }
    let mut exponent = value.log10().floor() as i32;
    let mut mantissa = value / 10f64.powi(exponent);
    let scale = 10f64.powi(decimals as i32);
    if (mantissa * scale).round() / scale >= 10.0 {
        mantissa /= 10.0;
        exponent += 1;
    }
    (mantissa, exponent)
}

/// Display pattern derived from a format code
#[derive(Debug, Clone, PartialEq)]
pub enum FormatPattern {
    General,
    Text,
    Fraction,
    Numeric(NumericPattern),
    /// chrono `strftime` pattern
    DateTime(String),
}

impl FormatPattern {
    /// Classify a format code and build its pattern
    pub fn parse(code: &str, locale: &Locale) -> Self {
        let section = code.split(';').next().unwrap_or_default();

        if FRACTION_REGEX.is_match(section) {
            return FormatPattern::Fraction;
        }
        if section == "@" {
            return FormatPattern::Text;
        }
        if let Some(pattern) = parse_numeric(section, locale) {
            return FormatPattern::Numeric(pattern);
        }
        if is_date_code(section) {
            return FormatPattern::DateTime(translate_date_code(section));
        }
        FormatPattern::General
    }

    pub fn format_type(&self) -> NumberFormatType {
        match self {
            FormatPattern::General => NumberFormatType::General,
            FormatPattern::Text => NumberFormatType::Text,
            FormatPattern::Fraction => NumberFormatType::Fraction,
            FormatPattern::Numeric(_) => NumberFormatType::Numeric,
            FormatPattern::DateTime(_) => NumberFormatType::DateTime,
        }
    }

    /// Render a number
    pub fn render_number(&self, value: f64) -> Result<String> {
        match self {
            FormatPattern::Fraction => {
                Err(Error::Unimplemented("fraction number formats".into()))
            }
            FormatPattern::Numeric(pattern) => Ok(pattern.render(value)),
            FormatPattern::DateTime(pattern) => Ok(render_date(value, pattern)),
            FormatPattern::General | FormatPattern::Text => Ok(value.to_string()),
        }
    }
}

fn parse_numeric(section: &str, locale: &Locale) -> Option<NumericPattern> {
    let captures = NUMERIC_REGEX.captures(section)?;
    let group = |name: &str| captures.name(name).map(|m| m.as_str());
    // only the locale's own symbol counts as a quoted currency
    let quoted_currency = group("c2") == Some(locale.currency_symbol.as_str());
    let any_group = quoted_currency
        || ["c1", "t", "d", "c3", "e", "p"]
            .iter()
            .any(|name| group(name).is_some());
    if !any_group && section.trim() != "0" {
        return None;
    }

    let mut prefix = String::new();
    if let Some(code) = group("c1") {
        prefix.push_str(&currency_symbol(code));
    }
    if quoted_currency {
        prefix.push_str(&locale.currency_symbol);
    }

    Some(NumericPattern {
        prefix,
        suffix: group("c3").map(currency_symbol).unwrap_or_default(),
        thousands: group("t").is_some(),
        decimals: group("d").map_or(0, |d| d.len() - 1),
        exponent: group("e").map(|e| e.len() - 2),
        percent: group("p").is_some(),
        decimal_separator: locale.decimal_separator.clone(),
        thousands_separator: locale.thousands_separator.clone(),
    })
}

/// Symbol of an Excel currency code like `\ [$€-407]`
fn currency_symbol(code: &str) -> String {
    let Some(captures) = CURRENCY_SYMBOL_REGEX.captures(code) else {
        return String::new();
    };
    let mut symbol = String::new();
    for name in ["s1", "symbol", "s2"] {
        if let Some(part) = captures.name(name) {
            symbol.push_str(&part.as_str().replace('\\', ""));
        }
    }
    symbol
}

fn is_date_code(section: &str) -> bool {
    let body = match BRACKET_PREFIX_REGEX.find(section) {
        Some(prefix) => &section[prefix.end()..],
        None => section,
    };
    body.chars().any(|c| matches!(c, 'y' | 'm' | 'd' | 'h' | 's'))
}

#[derive(Debug, Clone, PartialEq)]
enum DateToken {
    Part(char, usize),
    AmPm,
    Literal(String),
}

fn tokenize_date_code(code: &str) -> Vec<DateToken> {
    let chars: Vec<char> = code.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&q| q == '"')
                    .map_or(chars.len(), |p| i + 1 + p);
                tokens.push(DateToken::Literal(chars[i + 1..end].iter().collect()));
                i = end + 1;
            }
            '\\' => {
                if let Some(&next) = chars.get(i + 1) {
                    tokens.push(DateToken::Literal(next.to_string()));
                }
                i += 2;
            }
            '_' | '*' => i += 2,
            '[' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&b| b == ']')
                    .map_or(chars.len(), |p| i + 1 + p);
                let inner: String = chars[i + 1..end].iter().collect::<String>().to_lowercase();
                if let Some(first) = inner.chars().next() {
                    if matches!(first, 'h' | 'm' | 's') && inner.chars().all(|x| x == first) {
                        tokens.push(DateToken::Part(first, inner.len()));
                    }
                }
                i = end + 1;
            }
            'A' | 'a' if code[code.char_indices().nth(i).map_or(0, |(b, _)| b)..]
                .to_ascii_uppercase()
                .starts_with("AM/PM") =>
            {
                tokens.push(DateToken::AmPm);
                i += 5;
            }
            '.' if matches!(tokens.last(), Some(DateToken::Part('s', _))) => {
                i += 1;
                while chars.get(i) == Some(&'0') {
                    i += 1;
                }
            }
            _ => {
                let lower = c.to_ascii_lowercase();
                if matches!(lower, 'y' | 'm' | 'd' | 'h' | 's') {
                    let mut len = 0;
                    while chars.get(i + len).map(|x| x.to_ascii_lowercase()) == Some(lower) {
                        len += 1;
                    }
                    tokens.push(DateToken::Part(lower, len));
                    i += len;
                } else {
                    tokens.push(DateToken::Literal(c.to_string()));
                    i += 1;
                }
            }
        }
    }
    tokens
}

/// Translate an Excel date/time code into a chrono pattern
///
/// `m` means minutes right after an hour or right before a second,
/// month otherwise.
pub fn translate_date_code(code: &str) -> String {
    let tokens = tokenize_date_code(code);
    let twelve_hour = tokens.contains(&DateToken::AmPm);
    let parts: Vec<(usize, char)> = tokens
        .iter()
        .enumerate()
        .filter_map(|(i, t)| match t {
            DateToken::Part(c, _) => Some((i, *c)),
            _ => None,
        })
        .collect();

    let is_minute = |index: usize| {
        let pos = parts.iter().position(|(i, _)| *i == index).unwrap_or_default();
        let previous = pos.checked_sub(1).and_then(|p| parts.get(p)).map(|(_, c)| *c);
        let next = parts.get(pos + 1).map(|(_, c)| *c);
        previous == Some('h') || next == Some('s')
    };

    let mut out = String::new();
    for (index, token) in tokens.iter().enumerate() {
        match token {
            DateToken::Part('y', len) => out.push_str(if *len <= 2 { "%y" } else { "%Y" }),
            DateToken::Part('m', len) if is_minute(index) => {
                out.push_str(if *len == 1 { "%-M" } else { "%M" })
            }
            DateToken::Part('m', len) => out.push_str(match len {
                1 => "%-m",
                2 => "%m",
                4 => "%B",
                _ => "%b",
            }),
            DateToken::Part('d', len) => out.push_str(match len {
                1 => "%-d",
                2 => "%d",
                3 => "%a",
                _ => "%A",
            }),
            DateToken::Part('h', len) => out.push_str(match (twelve_hour, *len == 1) {
                (true, true) => "%-I",
                (true, false) => "%I",
                (false, true) => "%-H",
                (false, false) => "%H",
            }),
            DateToken::Part('s', len) => out.push_str(if *len == 1 { "%-S" } else { "%S" }),
            DateToken::Part(_, _) => {}
            DateToken::AmPm => out.push_str("%p"),
            DateToken::Literal(text) => out.push_str(&text.replace('%', "%%")),
        }
    }
    out
}

fn render_date(value: f64, pattern: &str) -> String {
    if value >= 0.0 {
        if let Ok(date) = time::to_date_time(value) {
            let mut out = String::new();
            if write!(out, "{}", date.format(pattern)).is_ok() {
                return out;
            }
        }
    }
    value.to_string()
}

/// A number format, compared by its code
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumberFormat {
    code: String,
    #[cfg_attr(feature = "serde", serde(skip))]
    pattern: OnceCell<(Locale, FormatPattern)>,
}

impl PartialEq for NumberFormat {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl NumberFormat {
    /// Create a number format from a code
    pub fn new<S: Into<String>>(code: S) -> Self {
        Self {
            code: code.into(),
            pattern: OnceCell::new(),
        }
    }

    /// The General format
    pub fn general() -> Self {
        Self::new("General")
    }

    /// Format code
    pub fn code(&self) -> &str {
        &self.code
    }

    fn with_pattern<R>(&self, locale: &Locale, f: impl FnOnce(&FormatPattern) -> R) -> R {
        if let Some((cached_locale, pattern)) = self.pattern.get() {
            if cached_locale == locale {
                return f(pattern);
            }
            return f(&FormatPattern::parse(&self.code, locale));
        }
        let (_, pattern) = self
            .pattern
            .get_or_init(|| (locale.clone(), FormatPattern::parse(&self.code, locale)));
        f(pattern)
    }

    /// Display pattern for a locale
    pub fn pattern(&self, locale: &Locale) -> FormatPattern {
        self.with_pattern(locale, Clone::clone)
    }

    /// Kind of format
    pub fn format_type(&self, locale: &Locale) -> NumberFormatType {
        self.with_pattern(locale, FormatPattern::format_type)
    }

    /// Render a cell value
    ///
    /// Fails with `Unimplemented` for fraction formats.
    pub fn formatted_value(&self, value: &CellValue, locale: &Locale) -> Result<String> {
        if value.is_blank() {
            return Ok(String::new());
        }
        self.with_pattern(locale, |pattern| match (pattern, value) {
            (FormatPattern::Fraction, _) => {
                Err(Error::Unimplemented("fraction number formats".into()))
            }
            (_, CellValue::Number(n)) => pattern.render_number(*n),
            (_, other) => Ok(other.to_string()),
        })
    }

    /// Drop the cached display pattern
    pub fn reset_pattern(&mut self) {
        self.pattern = OnceCell::new();
    }
}

/// Number format table
///
/// Built-in formats occupy fixed ids below 164. A package may override a
/// built-in id with its own code; overrides are stored and written with the
/// custom formats, which take the first free id from 164.
#[derive(Debug, Clone)]
pub struct NumberFormatTable {
    builtins: BTreeMap<u32, NumberFormat>,
    custom: BTreeMap<u32, NumberFormat>,
}

impl Default for NumberFormatTable {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberFormatTable {
    /// Create a table holding only the built-in formats
    pub fn new() -> Self {
        Self {
            builtins: BUILTIN_FORMATS
                .iter()
                .map(|&(id, code)| (id, NumberFormat::new(code)))
                .collect(),
            custom: BTreeMap::new(),
        }
    }

    /// Find the id of a format with the same code
    pub fn lookup(&self, format: &NumberFormat) -> Option<u32> {
        self.builtins
            .iter()
            .filter(|(id, _)| !self.custom.contains_key(id))
            .chain(self.custom.iter())
            .find(|(_, existing)| *existing == format)
            .map(|(&id, _)| id)
    }

    /// Intern a format, returning a built-in or existing id when the code matches
    pub fn insert(&mut self, format: NumberFormat) -> u32 {
        if let Some(id) = self.lookup(&format) {
            return id;
        }
        let mut id = FIRST_CUSTOM_NUMBER_FORMAT_ID;
        while self.custom.contains_key(&id) {
            id += 1;
        }
        self.custom.insert(id, format);
        id
    }

    /// Store a format under the id it had in a package
    ///
    /// Ids below 164 override the built-in code for that id.
    pub fn insert_at(&mut self, id: u32, format: NumberFormat) {
        if id < FIRST_CUSTOM_NUMBER_FORMAT_ID {
            log::debug!("package overrides number format {id} with '{}'", format.code());
        }
        self.custom.insert(id, format);
    }

    /// Get a format by id, package overrides first
    pub fn get(&self, id: u32) -> Option<&NumberFormat> {
        self.custom.get(&id).or_else(|| self.builtins.get(&id))
    }

    /// Remove a custom format
    pub fn delete(&mut self, id: u32) -> Option<NumberFormat> {
        self.custom.remove(&id)
    }

    /// Remove all custom formats
    pub fn clear(&mut self) {
        self.custom.clear();
    }

    /// Number of custom and overriding formats
    pub fn len(&self) -> usize {
        self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.custom.is_empty()
    }

    /// Custom and overriding formats in id order; these are written to `numFmts`
    pub fn custom(&self) -> impl Iterator<Item = (u32, &NumberFormat)> {
        self.custom.iter().map(|(&id, format)| (id, format))
    }

    /// Forget cached display patterns, e.g. after a locale change
    pub fn reset_patterns(&mut self) {
        self.builtins
            .values_mut()
            .chain(self.custom.values_mut())
            .for_each(NumberFormat::reset_pattern);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kind(code: &str) -> NumberFormatType {
        NumberFormat::new(code).format_type(&Locale::default())
    }

    fn render(code: &str, value: f64) -> String {
        NumberFormat::new(code)
            .formatted_value(&CellValue::Number(value), &Locale::default())
            .unwrap()
    }

    #[test]
    fn test_classification() {
        assert_eq!(kind("General"), NumberFormatType::General);
        assert_eq!(kind("@"), NumberFormatType::Text);
        assert_eq!(kind("0"), NumberFormatType::Numeric);
        assert_eq!(kind("0.00"), NumberFormatType::Numeric);
        assert_eq!(kind("#,##0 ;(#,##0)"), NumberFormatType::Numeric);
        assert_eq!(kind("0.00E+00"), NumberFormatType::Numeric);
        assert_eq!(kind("\"$\"#,##0.00"), NumberFormatType::Numeric);
        assert_eq!(kind("# ?/?"), NumberFormatType::Fraction);
        assert_eq!(kind("# ??/??"), NumberFormatType::Fraction);
        assert_eq!(kind("mm-dd-yy"), NumberFormatType::DateTime);
        assert_eq!(kind("h:mm AM/PM"), NumberFormatType::DateTime);
        assert_eq!(kind("[$-F800]dddd, mmmm dd, yyyy"), NumberFormatType::DateTime);
        assert_eq!(kind("mmss.0"), NumberFormatType::DateTime);
    }

    #[test]
    fn test_numeric_rendering() {
        assert_eq!(render("0", 3.6), "4");
        assert_eq!(render("0.00", 3.14159), "3.14");
        assert_eq!(render("#,##0", 1234567.0), "1,234,567");
        assert_eq!(render("#,##0.00", -1234.5), "-1,234.50");
        assert_eq!(render("0%", 0.256), "26%");
        assert_eq!(render("0.00%", 0.5), "50.00%");
        assert_eq!(render("0.00E+00", 12345.0), "1.23E04");
        assert_eq!(render("0.00E+00", 0.00012), "1.20E-04");
        assert_eq!(render("\"$\"#,##0.00", 1000.0), "$1,000.00");
        assert_eq!(render("[$€-407]\\ #,##0.00", 5.0), "€ 5.00");
        assert_eq!(render("#,##0.00\\ [$€-407]", 5.0), "5.00 €");
    }

    #[test]
    fn test_locale_separators() {
        let locale = Locale::new(",", ".", "€");
        let format = NumberFormat::new("#,##0.00");
        let value = CellValue::Number(1234.5);
        assert_eq!(format.formatted_value(&value, &locale).unwrap(), "1.234,50");
        assert_eq!(
            format.formatted_value(&value, &Locale::default()).unwrap(),
            "1,234.50"
        );

        let quoted = NumberFormat::new("\"€\"#,##0");
        let whole = CellValue::Number(1234.0);
        assert_eq!(quoted.formatted_value(&whole, &locale).unwrap(), "€1.234");
        // another locale's symbol is not a currency prefix
        assert_eq!(
            quoted.formatted_value(&whole, &Locale::default()).unwrap(),
            "1,234"
        );
    }

    #[test]
    fn test_date_rendering() {
        assert_eq!(render("yyyy-mm-dd", 41440.0), "2013-06-15");
        assert_eq!(render("d-mmm-yy", 41440.0), "15-Jun-13");
        assert_eq!(render("h:mm", 0.75), "18:00");
        assert_eq!(render("h:mm AM/PM", 0.75), "6:00 PM");
        assert_eq!(render("mm:ss", 0.5 / 24.0), "30:00");
        assert_eq!(render("yyyy-mm-dd", -1.0), "-1");
    }

    #[test]
    fn test_translate_date_code() {
        assert_eq!(translate_date_code("mm-dd-yy"), "%m-%d-%y");
        assert_eq!(translate_date_code("m/d/yy h:mm"), "%-m/%-d/%y %-H:%M");
        assert_eq!(translate_date_code("[h]:mm:ss"), "%-H:%M:%S");
        assert_eq!(translate_date_code("dddd\", \"mmmm"), "%A, %B");
        assert_eq!(translate_date_code("[$-409]mmm"), "%b");
    }

    #[test]
    fn test_fraction_is_unimplemented() {
        let format = NumberFormat::new("# ?/?");
        let result = format.formatted_value(&CellValue::Number(0.5), &Locale::default());
        assert!(matches!(result, Err(Error::Unimplemented(_))));
    }

    #[test]
    fn test_non_numbers_render_as_text() {
        let format = NumberFormat::new("0.00");
        let locale = Locale::default();
        assert_eq!(
            format
                .formatted_value(&CellValue::String("abc".into()), &locale)
                .unwrap(),
            "abc"
        );
        assert_eq!(
            format
                .formatted_value(&CellValue::Boolean(true), &locale)
                .unwrap(),
            "TRUE"
        );
        assert_eq!(format.formatted_value(&CellValue::Blank, &locale).unwrap(), "");
    }

    #[test]
    fn test_table_prefers_builtins() {
        let mut table = NumberFormatTable::new();
        assert_eq!(table.insert(NumberFormat::new("0.00%")), 10);
        assert_eq!(table.insert(NumberFormat::new("@")), ID_TEXT);
        assert!(table.is_empty());

        let custom = table.insert(NumberFormat::new("0.000"));
        assert_eq!(custom, FIRST_CUSTOM_NUMBER_FORMAT_ID);
        assert_eq!(table.insert(NumberFormat::new("0.000")), custom);
        assert_eq!(table.insert(NumberFormat::new("0.0000")), 165);
        assert_eq!(table.get(custom).map(NumberFormat::code), Some("0.000"));
        assert_eq!(table.get(14).map(NumberFormat::code), Some("mm-dd-yy"));
    }

    #[test]
    fn test_table_reuses_freed_ids() {
        let mut table = NumberFormatTable::new();
        table.insert_at(164, NumberFormat::new("a"));
        table.insert_at(165, NumberFormat::new("b"));
        table.insert_at(170, NumberFormat::new("c"));

        assert_eq!(table.len(), 3);
        assert_eq!(table.insert(NumberFormat::new("d")), 166);
        table.delete(164);
        assert_eq!(table.insert(NumberFormat::new("e")), 164);
    }

    #[test]
    fn test_package_overrides_builtin_id() {
        let mut table = NumberFormatTable::new();
        let accounting = r#"_-* #,##0.00\ "€"_-;\-* #,##0.00\ "€"_-;_-* "-"??\ "€"_-;_-@_-"#;
        table.insert_at(44, NumberFormat::new(accounting));

        assert_eq!(table.get(44).map(NumberFormat::code), Some(accounting));
        assert_eq!(table.lookup(&NumberFormat::new(accounting)), Some(44));
        assert_eq!(table.custom().map(|(id, _)| id).collect::<Vec<_>>(), vec![44]);

        let standard = builtin_code(44).unwrap();
        assert_eq!(table.insert(NumberFormat::new(standard)), FIRST_CUSTOM_NUMBER_FORMAT_ID);
    }

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(builtin_code(ID_GENERAL), Some("General"));
        assert_eq!(builtin_id("h:mm:ss"), Some(21));
        assert_eq!(builtin_code(50), None);
        assert_eq!(builtin_code(7), Some("$#,##0.00_);($#,##0.00)"));
        assert!(builtin_code(44).is_some_and(|code| code.starts_with("_(\"$\"*")));
        assert_eq!(builtin_code(ID_FRACTION2), Some("# ??/??"));
        assert_eq!(builtin_id("# ?/?"), Some(ID_FRACTION));
    }
}
