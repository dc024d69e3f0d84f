//! # sheetstyle-core
//!
//! In-memory model of a spreadsheet's formatting for the sheetstyle library.
//!
//! This crate provides the types the package reader and writer work on:
//! - [`StyleRegistry`] - Interned fonts, fills, borders, number formats and cell formats
//! - [`Range`] - Style view over one cell, row or column
//! - [`CellValue`], [`CellAddress`] and [`CellRange`] - Cell values and addressing
//! - [`Workbook`], [`Worksheet`] - The document structures
//!
//! Rows, columns and worksheets are 1-based throughout.
//!
//! ## Example
//!
//! ```rust
//! use sheetstyle_core::Workbook;
//!
//! let mut workbook = Workbook::new();
//! workbook.set_value(1, 1, 1, "Total").unwrap();
//! workbook.cell_range(1, 1, 1).unwrap().set_bold(true);
//!
//! let style_index = workbook.worksheet(1).unwrap().cell(1, 1).unwrap().style_index;
//! assert!(workbook.styles.effective_font(style_index).bold());
//! ```

pub mod cell;
pub mod column;
pub mod error;
pub mod named_range;
pub mod range;
pub mod row;
pub mod settings;
pub mod shared_strings;
pub mod style;
pub mod time;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{Cell, CellAddress, CellRange, CellValue, HyperlinkTarget, RichString, TextRun};
pub use column::{Column, ColumnCollection, ColumnRange};
pub use error::{Axis, Error, Result};
pub use named_range::{DefinedName, DefinedNames, NameScope};
pub use range::Range;
pub use row::{Row, RowCollection};
pub use settings::{Locale, WorkbookSettings};
pub use shared_strings::SharedStringTable;
pub use workbook::Workbook;
pub use worksheet::{SheetView, SheetVisibility, Worksheet};

pub use style::{
    Alignment, Border, BorderEdge, BorderStyle, Borders, CellFormat, Color, Fill, Font,
    HorizontalAlignment, NumberFormat, NumberFormatType, PatternType, StyleRegistry,
    VerticalAlignment,
};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u32 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// First id available to custom number formats; lower ids are built in
pub const FIRST_CUSTOM_NUMBER_FORMAT_ID: u32 = 164;
