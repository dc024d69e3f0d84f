//! Style registry
//!
//! Owns every formatting table of one workbook. Grid elements only hold a
//! cell format id; all new formats are registered through here.

use super::{
    Alignment, Borders, CellFormat, Color, Fill, Font, InternTable, NumberFormat,
    NumberFormatTable, PatternType,
};
use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::settings::Locale;

/// Style registry for one workbook
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    pub fonts: InternTable<Font>,
    pub fills: InternTable<Fill>,
    pub borders: InternTable<Borders>,
    pub number_formats: NumberFormatTable,
    pub cell_formats: InternTable<CellFormat>,
    /// Custom indexed palette as 8-digit ARGB codes; empty means the default palette
    pub indexed_colors: Vec<String>,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleRegistry {
    /// Create a registry holding the workbook defaults
    ///
    /// Font 0 is Calibri 11 in theme color 1. Fills 0 and 1 are the two
    /// fills every package reserves (none and gray125).
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.ensure_defaults();
        registry
    }

    /// Create a registry with no entries, to be filled from a package
    pub fn empty() -> Self {
        Self {
            fonts: InternTable::new(),
            fills: InternTable::new(),
            borders: InternTable::new(),
            number_formats: NumberFormatTable::new(),
            cell_formats: InternTable::new(),
            indexed_colors: Vec::new(),
        }
    }

    /// Add the default entries that are missing
    pub fn ensure_defaults(&mut self) {
        if !self.fonts.contains(0) {
            self.fonts.insert_at(
                0,
                Font::new()
                    .with_size(11.0)
                    .with_color(Color::theme(1))
                    .with_name("Calibri"),
            );
        }
        if !self.fills.contains(0) {
            self.fills.insert_at(0, Fill::new());
        }
        if !self.fills.contains(1) {
            self.fills.insert_at(1, Fill::pattern(PatternType::Gray125));
        }
        if !self.borders.contains(0) {
            self.borders.insert_at(0, Borders::empty_edges());
        }
        if !self.cell_formats.contains(0) {
            self.cell_formats.insert_at(0, CellFormat::new());
        }
    }

    /// Cell format by id
    pub fn cell_format(&self, style_index: u32) -> Result<&CellFormat> {
        self.cell_formats
            .get(style_index)
            .ok_or(Error::InvalidStyleIndex(style_index))
    }

    fn format_or_default(&self, style_index: u32) -> CellFormat {
        self.cell_formats
            .get(style_index)
            .copied()
            .unwrap_or_default()
    }

    /// The workbook default font
    pub fn default_font(&self) -> Font {
        self.fonts.get(0).cloned().unwrap_or_default()
    }

    /// Size of the default font, or 0 when it has none
    pub fn default_font_size(&self) -> f64 {
        self.fonts.get(0).and_then(Font::size).unwrap_or(0.0)
    }

    /// Font a cell format resolves to
    pub fn effective_font(&self, style_index: u32) -> Font {
        let id = self.format_or_default(style_index).font();
        self.fonts.get(id).cloned().unwrap_or_else(|| self.default_font())
    }

    /// Font size a cell format resolves to, falling back to the default font
    pub fn effective_font_size(&self, style_index: u32) -> f64 {
        self.effective_font(style_index)
            .size()
            .unwrap_or_else(|| self.default_font_size())
    }

    pub fn effective_fill(&self, style_index: u32) -> Fill {
        let id = self.format_or_default(style_index).fill();
        self.fills.get(id).cloned().unwrap_or_default()
    }

    pub fn effective_borders(&self, style_index: u32) -> Borders {
        let id = self.format_or_default(style_index).borders();
        self.borders.get(id).cloned().unwrap_or_default()
    }

    pub fn effective_alignment(&self, style_index: u32) -> Alignment {
        self.format_or_default(style_index).alignment()
    }

    pub fn effective_number_format(&self, style_index: u32) -> NumberFormat {
        let id = self.format_or_default(style_index).number_format();
        self.number_formats
            .get(id)
            .cloned()
            .unwrap_or_else(NumberFormat::general)
    }

    /// Render a value through the number format of a cell format
    ///
    /// Borrows the stored format so its display pattern stays cached.
    pub fn formatted_value(
        &self,
        style_index: u32,
        value: &CellValue,
        locale: &Locale,
    ) -> Result<String> {
        let id = self.format_or_default(style_index).number_format();
        match self.number_formats.get(id) {
            Some(format) => format.formatted_value(value, locale),
            None => NumberFormat::general().formatted_value(value, locale),
        }
    }

    /// Whether two formats look the same, ignoring the number format
    pub fn equals_style(&self, a: u32, b: u32) -> bool {
        a == b
            || (self.effective_alignment(a) == self.effective_alignment(b)
                && self.effective_borders(a) == self.effective_borders(b)
                && self.effective_fill(a) == self.effective_fill(b)
                && self.effective_font(a) == self.effective_font(b))
    }

    // ==================== Update propagation ====================
    //
    // Each update reads the current composite, replaces exactly one part
    // and interns the result. The returned id replaces the caller's.

    fn replace_part(&mut self, style_index: u32, f: impl FnOnce(&mut CellFormat)) -> u32 {
        let mut format = self.format_or_default(style_index);
        f(&mut format);
        self.cell_formats.insert(format)
    }

    /// Apply a change to the font of a format
    pub fn update_font(&mut self, style_index: u32, f: impl FnOnce(&mut Font)) -> u32 {
        let mut font = self.effective_font(style_index);
        f(&mut font);
        let id = self.fonts.insert(font);
        self.replace_part(style_index, |format| format.font_id = Some(id))
    }

    /// Apply a change to the fill of a format
    pub fn update_fill(&mut self, style_index: u32, f: impl FnOnce(&mut Fill)) -> u32 {
        let mut fill = self.effective_fill(style_index);
        f(&mut fill);
        let id = self.fills.insert(fill);
        self.replace_part(style_index, |format| format.fill_id = Some(id))
    }

    /// Apply a change to the borders of a format
    pub fn update_borders(&mut self, style_index: u32, f: impl FnOnce(&mut Borders)) -> u32 {
        let mut borders = self.effective_borders(style_index);
        f(&mut borders);
        let id = self.borders.insert(borders);
        self.replace_part(style_index, |format| format.borders_id = Some(id))
    }

    /// Apply a change to the alignment of a format
    pub fn update_alignment(&mut self, style_index: u32, f: impl FnOnce(&mut Alignment)) -> u32 {
        let mut alignment = self.effective_alignment(style_index);
        f(&mut alignment);
        self.replace_part(style_index, |format| format.alignment = Some(alignment))
    }

    /// Give a format a new number format code
    pub fn update_number_format(&mut self, style_index: u32, code: &str) -> u32 {
        let id = self.number_formats.insert(NumberFormat::new(code));
        self.replace_part(style_index, |format| format.number_format_id = Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{BorderStyle, HorizontalAlignment};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let registry = StyleRegistry::new();
        assert_eq!(registry.fonts.len(), 1);
        assert_eq!(registry.fills.len(), 2);
        assert_eq!(registry.borders.len(), 1);
        assert_eq!(registry.cell_formats.len(), 1);
        assert_eq!(registry.default_font().name(), Some("Calibri"));
        assert_eq!(registry.default_font_size(), 11.0);
        assert_eq!(registry.effective_number_format(0).code(), "General");
    }

    #[test]
    fn test_update_changes_one_part() {
        let mut registry = StyleRegistry::new();
        let filled = registry.update_fill(0, |fill| fill.set_foreground(Color::rgb("#FFFF00")));
        let bold = registry.update_font(filled, |font| font.set_bold(true));

        assert_ne!(filled, 0);
        assert_ne!(bold, filled);
        assert!(registry.effective_font(bold).bold());
        assert_eq!(registry.effective_fill(bold), registry.effective_fill(filled));
        assert!(!registry.effective_font(filled).bold());
        assert!(!registry.effective_font(0).bold());
    }

    #[test]
    fn test_updates_remerge() {
        let mut registry = StyleRegistry::new();
        let bold = registry.update_font(0, |font| font.set_bold(true));
        let again = registry.update_font(0, |font| font.set_bold(true));
        assert_eq!(bold, again);
        assert_eq!(registry.cell_formats.len(), 2);
    }

    #[test]
    fn test_number_format_update() {
        let mut registry = StyleRegistry::new();
        let percent = registry.update_number_format(0, "0.00%");
        assert_eq!(registry.cell_format(percent).unwrap().number_format_id, Some(10));

        let custom = registry.update_number_format(percent, "0.000");
        assert_eq!(registry.effective_number_format(custom).code(), "0.000");
        assert_eq!(registry.number_formats.len(), 1);
    }

    #[test]
    fn test_equals_style_ignores_number_format() {
        let mut registry = StyleRegistry::new();
        let percent = registry.update_number_format(0, "0%");
        assert!(registry.equals_style(0, percent));

        let centered =
            registry.update_alignment(0, |a| a.horizontal = HorizontalAlignment::Center);
        assert!(!registry.equals_style(0, centered));

        let bordered = registry.update_borders(0, |b| b.set_outer_style(BorderStyle::Thin));
        assert!(!registry.equals_style(0, bordered));
    }

    #[test]
    fn test_formatted_value_uses_cell_format() {
        let mut registry = StyleRegistry::new();
        let percent = registry.update_number_format(0, "0.00%");
        let locale = Locale::default();
        let value = CellValue::Number(0.125);
        assert_eq!(registry.formatted_value(percent, &value, &locale).unwrap(), "12.50%");
        assert_eq!(registry.formatted_value(0, &value, &locale).unwrap(), "0.125");
    }

    #[test]
    fn test_invalid_style_index() {
        let registry = StyleRegistry::new();
        assert!(matches!(
            registry.cell_format(42),
            Err(Error::InvalidStyleIndex(42))
        ));
    }
}
