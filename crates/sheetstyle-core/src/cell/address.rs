//! Cell address and range types
//!
//! Rows and columns are 1-based throughout, matching the A1 notation.

use crate::error::{Axis, Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// Convert a 1-based column index to letters (1 = A, 26 = Z, 27 = AA)
pub fn column_name(column: u32) -> String {
    let mut result = String::new();
    let mut n = column;

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Convert column letters to a 1-based index (A = 1, Z = 26, AA = 27)
pub fn column_index(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidAddress("empty column letters".into()));
    }

    let mut column: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidAddress(format!("invalid column letter '{c}'")));
        }
        column = column
            .saturating_mul(26)
            .saturating_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }

    Error::check_bounds(Axis::Column, column, 1, MAX_COLS)?;
    Ok(column)
}

/// Quote a sheet name for use in a reference when it needs it
///
/// Names made of letters, digits, dots and underscores are left bare;
/// anything else is wrapped in apostrophes with inner apostrophes doubled.
pub fn quote_sheet_name(name: &str) -> String {
    let bare = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.');
    if bare {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// Strip the apostrophes from a quoted sheet name
pub fn unquote_sheet_name(name: &str) -> String {
    if name.len() >= 2 && name.starts_with('\'') && name.ends_with('\'') {
        name[1..name.len() - 1].replace("''", "'")
    } else {
        name.to_string()
    }
}

/// Split a `Sheet!A1` reference into the unquoted sheet name and local part
pub fn split_sheet_reference(reference: &str) -> (Option<String>, &str) {
    match reference.rfind('!') {
        Some(pos) => (
            Some(unquote_sheet_name(&reference[..pos])),
            &reference[pos + 1..],
        ),
        None => (None, reference),
    }
}

/// A cell address (e.g., "A1", "$B$2")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (1-based)
    pub row: u32,
    /// Column index (1-based, A=1, XFD=16384)
    pub column: u32,
    /// Whether the row reference is absolute ($)
    pub row_absolute: bool,
    /// Whether the column reference is absolute ($)
    pub column_absolute: bool,
}

impl CellAddress {
    /// Create a new cell address with relative references
    pub fn new(row: u32, column: u32) -> Self {
        Self {
            row,
            column,
            row_absolute: false,
            column_absolute: false,
        }
    }

    /// Create an absolute cell address ($A$1 style)
    pub fn absolute(row: u32, column: u32) -> Self {
        Self {
            row,
            column,
            row_absolute: true,
            column_absolute: true,
        }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use sheetstyle_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("$B$2").unwrap();
    /// assert_eq!(addr.row, 2);
    /// assert_eq!(addr.column, 2);
    /// assert!(addr.row_absolute);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        let column_absolute = if bytes.get(pos) == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        let column_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if pos == column_start {
            return Err(Error::InvalidAddress(format!("no column letters in '{s}'")));
        }
        let column = column_index(&s[column_start..pos])?;

        let row_absolute = if bytes.get(pos) == Some(&b'$') {
            pos += 1;
            true
        } else {
            false
        };

        let row_str = &s[pos..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{s}'")));
        }
        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{s}'")))?;
        Error::check_bounds(Axis::Row, row, 1, MAX_ROWS)?;

        Ok(Self {
            row,
            column,
            row_absolute,
            column_absolute,
        })
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        let mut result = String::new();
        if self.column_absolute {
            result.push('$');
        }
        result.push_str(&column_name(self.column));
        if self.row_absolute {
            result.push('$');
        }
        result.push_str(&self.row.to_string());
        result
    }

    /// Address moved by a row and column offset, if it stays on the grid
    pub fn offset(&self, rows: i64, columns: i64) -> Option<Self> {
        let row = i64::from(self.row) + rows;
        let column = i64::from(self.column) + columns;
        if !(1..=i64::from(MAX_ROWS)).contains(&row) || !(1..=i64::from(MAX_COLS)).contains(&column)
        {
            return None;
        }
        Some(Self {
            row: row as u32,
            column: column as u32,
            ..*self
        })
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A range of cells (e.g., "A1:B10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range, normalized so start is top-left
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        Self {
            start: CellAddress {
                row: start.row.min(end.row),
                column: start.column.min(end.column),
                ..start
            },
            end: CellAddress {
                row: start.row.max(end.row),
                column: start.column.max(end.column),
                ..end
            },
        }
    }

    /// Create a single-cell range
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse a range from A1:B10 notation
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once(':') {
            Some((start, end)) => Ok(Self::new(
                CellAddress::parse(start)?,
                CellAddress::parse(end)?,
            )),
            None => Ok(Self::single(CellAddress::parse(s)?)),
        }
    }

    /// Check if a cell is within this range
    pub fn contains(&self, row: u32, column: u32) -> bool {
        row >= self.start.row
            && row <= self.end.row
            && column >= self.start.column
            && column <= self.end.column
    }

    /// Number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Number of columns in the range
    pub fn column_count(&self) -> u32 {
        self.end.column - self.start.column + 1
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
