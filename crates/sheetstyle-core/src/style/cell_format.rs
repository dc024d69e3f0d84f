//! Composite cell formats

use super::Alignment;

/// A composite format: inline alignment plus ids into the resource tables
///
/// A part that is `None` is not applied by this format; it resolves to the
/// workbook default (id 0, General, default alignment). Equality compares
/// the resolved parts.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellFormat {
    pub alignment: Option<Alignment>,
    pub borders_id: Option<u32>,
    pub fill_id: Option<u32>,
    pub font_id: Option<u32>,
    pub number_format_id: Option<u32>,
}

impl CellFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn with_borders(mut self, id: u32) -> Self {
        self.borders_id = Some(id);
        self
    }

    pub fn with_fill(mut self, id: u32) -> Self {
        self.fill_id = Some(id);
        self
    }

    pub fn with_font(mut self, id: u32) -> Self {
        self.font_id = Some(id);
        self
    }

    pub fn with_number_format(mut self, id: u32) -> Self {
        self.number_format_id = Some(id);
        self
    }

    pub fn alignment(&self) -> Alignment {
        self.alignment.unwrap_or_default()
    }

    pub fn borders(&self) -> u32 {
        self.borders_id.unwrap_or(0)
    }

    pub fn fill(&self) -> u32 {
        self.fill_id.unwrap_or(0)
    }

    pub fn font(&self) -> u32 {
        self.font_id.unwrap_or(0)
    }

    pub fn number_format(&self) -> u32 {
        self.number_format_id.unwrap_or(0)
    }
}

impl PartialEq for CellFormat {
    fn eq(&self, other: &Self) -> bool {
        self.alignment() == other.alignment()
            && self.borders() == other.borders()
            && self.fill() == other.fill()
            && self.font() == other.font()
            && self.number_format() == other.number_format()
    }
}
