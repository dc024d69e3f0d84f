//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The value stored in a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A range of cells (e.g., "A1:B10")
//! - [`Cell`] and [`CellCollection`] - Cell data and the sparse per-row store

mod address;
pub mod measure;
mod storage;
mod value;

pub use address::{
    column_index, column_name, quote_sheet_name, split_sheet_reference, unquote_sheet_name,
    CellAddress, CellRange,
};
pub use storage::{Cell, CellCollection, HyperlinkTarget};
pub use value::{CellValue, RichString, TextRun};
