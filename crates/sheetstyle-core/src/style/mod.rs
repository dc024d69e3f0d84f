//! Cell styling and the style registry
//!
//! Formatting resources are interned: each distinct font, fill, border set
//! and number format is stored once and referenced by id. A cell format
//! ties one of each together with an inline alignment, and cells, rows and
//! columns hold only a cell format id.

mod alignment;
mod border;
mod cell_format;
mod color;
mod fill;
mod font;
pub mod number_format;
mod registry;
mod table;

pub use alignment::{Alignment, HorizontalAlignment, VerticalAlignment};
pub use border::{Border, BorderEdge, BorderStyle, Borders};
pub use cell_format::CellFormat;
pub use color::Color;
pub use fill::{Fill, PatternType};
pub use font::{character_height, character_width, Font, FontProperty};
pub use number_format::{FormatPattern, NumberFormat, NumberFormatTable, NumberFormatType};
pub use registry::StyleRegistry;
pub use table::InternTable;
pub(crate) use table::first_unused_key;
