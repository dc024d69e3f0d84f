//! # sheetstyle
//!
//! Read, restyle and rewrite `.xlsx` workbooks.
//!
//! Every formatting change goes through the workbook's [`StyleRegistry`],
//! which keeps one entry per distinct font, fill, border set, number format
//! and cell format. Cells, rows and columns only hold a format id.
//!
//! ## Features
//!
//! - Open and save `.xlsx` packages, keeping parts it does not model
//! - Per-cell, row and column formatting through [`Range`]
//! - Sparse rows and columns with insert/delete shifting
//! - Shared and rich strings, merges, internal hyperlinks, defined names
//! - Column auto-fit
//!
//! ## Example
//!
//! ```rust
//! use sheetstyle::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! workbook.set_value(1, 1, 1, "Total").unwrap();
//! workbook.cell_range(1, 1, 1).unwrap().set_bold(true);
//!
//! let bold = workbook.worksheet(1).unwrap().cell(1, 1).unwrap().style_index;
//! assert!(workbook.styles.effective_font(bold).bold());
//!
//! // workbook.save("report.xlsx").unwrap();
//! ```

pub mod prelude;

pub use sheetstyle_core::{
    // Cells and addressing
    Cell,
    CellAddress,
    CellRange,
    CellValue,
    HyperlinkTarget,
    RichString,
    TextRun,
    // Grids
    Column,
    ColumnCollection,
    Row,
    RowCollection,
    // Styles
    Alignment,
    Border,
    BorderEdge,
    BorderStyle,
    Borders,
    CellFormat,
    Color,
    Fill,
    Font,
    HorizontalAlignment,
    NumberFormat,
    NumberFormatType,
    PatternType,
    Range,
    StyleRegistry,
    VerticalAlignment,
    // Workbook
    DefinedName,
    DefinedNames,
    Locale,
    NameScope,
    SharedStringTable,
    SheetView,
    SheetVisibility,
    Workbook,
    WorkbookSettings,
    Worksheet,
    // Errors
    Error,
    Result,
    // Limits
    MAX_COLS,
    MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

pub use sheetstyle_core::time;

pub use sheetstyle_xlsx::{OpenOptions, XlsxError, XlsxFile, XlsxReader, XlsxWriter};

use std::path::Path;

/// Map a package error onto the core taxonomy
fn from_xlsx(error: XlsxError) -> Error {
    match error {
        XlsxError::NotFound(path) => Error::NotFound(path),
        XlsxError::InvalidFormat(reason) | XlsxError::MissingPart(reason) => {
            Error::InvalidFormat(reason)
        }
        XlsxError::TransientLock(reason) => Error::TransientLock(reason),
        XlsxError::ReadOnly(path) => {
            Error::UnsupportedOperation(format!("{path} was opened read-only"))
        }
        XlsxError::Core(error) => error,
        other => Error::other(other.to_string()),
    }
}

/// Extension trait for Workbook to add file I/O
pub trait WorkbookExt {
    /// Open a workbook from a file
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook>;

    /// Save the workbook to a new file
    ///
    /// Use [`XlsxFile`] to rewrite an existing package and keep the parts
    /// the model does not cover.
    fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()>;
}

impl WorkbookExt for Workbook {
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook> {
        XlsxFile::open(path)
            .map(XlsxFile::into_workbook)
            .map_err(from_xlsx)
    }

    fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let is_xlsx = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
        if !is_xlsx {
            return Err(Error::InvalidFormat(format!(
                "Unsupported file format: {}",
                path.display()
            )));
        }
        XlsxWriter::write_file(self, path).map_err(from_xlsx)
    }
}
