//! Prelude module - common imports for sheetstyle users
//!
//! ```rust
//! use sheetstyle::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellAddress,
    CellRange,
    CellValue,
    HyperlinkTarget,
    RichString,
    // Style types
    Alignment,
    BorderStyle,
    Color,
    Fill,
    Font,
    HorizontalAlignment,
    PatternType,
    Range,
    VerticalAlignment,
    // Error types
    Error,
    Result,
    // Main types
    NameScope,
    SheetVisibility,
    Workbook,
    WorkbookSettings,
    Worksheet,
    // Extension traits
    WorkbookExt,
    // I/O types
    OpenOptions,
    XlsxFile,
    XlsxReader,
    XlsxWriter,
};
