//! Style view over one cell, row or column
//!
//! A [`Range`] borrows the workbook registry and the style slot of a grid
//! element. Reads resolve the slot's cell format once and cache the parts;
//! every update registers a new composite through the registry and writes
//! the resulting id back into the slot.

use once_cell::unsync::OnceCell;

use crate::style::{
    Alignment, BorderStyle, Borders, Color, Fill, Font, HorizontalAlignment, NumberFormat,
    PatternType, StyleRegistry, VerticalAlignment,
};

/// Mutable style view over a grid element's format id
pub struct Range<'a> {
    registry: &'a mut StyleRegistry,
    style_index: &'a mut u32,
    alignment: OnceCell<Alignment>,
    borders: OnceCell<Borders>,
    fill: OnceCell<Fill>,
    font: OnceCell<Font>,
    number_format: OnceCell<NumberFormat>,
}

impl<'a> Range<'a> {
    /// View the format id stored in `style_index`
    pub fn new(registry: &'a mut StyleRegistry, style_index: &'a mut u32) -> Self {
        Self {
            registry,
            style_index,
            alignment: OnceCell::new(),
            borders: OnceCell::new(),
            fill: OnceCell::new(),
            font: OnceCell::new(),
            number_format: OnceCell::new(),
        }
    }

    /// Current cell format id
    pub fn style_index(&self) -> u32 {
        *self.style_index
    }

    /// Whether this range looks like the format `other`
    pub fn equals_style(&self, other: u32) -> bool {
        self.registry.equals_style(*self.style_index, other)
    }

    // ==================== Resolved parts ====================

    pub fn alignment(&self) -> &Alignment {
        self.alignment
            .get_or_init(|| self.registry.effective_alignment(*self.style_index))
    }

    pub fn borders(&self) -> &Borders {
        self.borders
            .get_or_init(|| self.registry.effective_borders(*self.style_index))
    }

    pub fn fill(&self) -> &Fill {
        self.fill
            .get_or_init(|| self.registry.effective_fill(*self.style_index))
    }

    pub fn font(&self) -> &Font {
        self.font
            .get_or_init(|| self.registry.effective_font(*self.style_index))
    }

    pub fn number_format(&self) -> &NumberFormat {
        self.number_format
            .get_or_init(|| self.registry.effective_number_format(*self.style_index))
    }

    /// Number format code
    pub fn number_format_code(&self) -> &str {
        self.number_format().code()
    }

    /// Font size, falling back to the workbook default
    pub fn font_size(&self) -> f64 {
        self.font()
            .size()
            .unwrap_or_else(|| self.registry.default_font_size())
    }

    // ==================== Updates ====================

    pub fn update_alignment(&mut self, f: impl FnOnce(&mut Alignment)) {
        *self.style_index = self.registry.update_alignment(*self.style_index, f);
        self.alignment = OnceCell::new();
    }

    pub fn update_borders(&mut self, f: impl FnOnce(&mut Borders)) {
        *self.style_index = self.registry.update_borders(*self.style_index, f);
        self.borders = OnceCell::new();
    }

    pub fn update_fill(&mut self, f: impl FnOnce(&mut Fill)) {
        *self.style_index = self.registry.update_fill(*self.style_index, f);
        self.fill = OnceCell::new();
    }

    pub fn update_font(&mut self, f: impl FnOnce(&mut Font)) {
        *self.style_index = self.registry.update_font(*self.style_index, f);
        self.font = OnceCell::new();
    }

    pub fn set_number_format(&mut self, code: &str) {
        *self.style_index = self.registry.update_number_format(*self.style_index, code);
        self.number_format = OnceCell::new();
    }

    // ==================== Shorthands ====================

    pub fn set_bold(&mut self, bold: bool) {
        self.update_font(|font| font.set_bold(bold));
    }

    pub fn set_italic(&mut self, italic: bool) {
        self.update_font(|font| font.set_italic(italic));
    }

    pub fn set_underline(&mut self, underline: bool) {
        self.update_font(|font| font.set_underline(underline));
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.update_font(|font| font.set_size(size));
    }

    pub fn set_font_name(&mut self, name: &str) {
        self.update_font(|font| font.set_name(name));
    }

    pub fn set_font_color(&mut self, color: Color) {
        self.update_font(|font| font.set_color(color));
    }

    /// Solid fill in a color
    pub fn set_fill_color(&mut self, color: Color) {
        self.update_fill(|fill| fill.set_foreground(color));
    }

    pub fn set_pattern_type(&mut self, pattern_type: PatternType) {
        self.update_fill(|fill| fill.set_pattern_type(pattern_type));
    }

    pub fn set_horizontal_alignment(&mut self, horizontal: HorizontalAlignment) {
        self.update_alignment(|alignment| alignment.horizontal = horizontal);
    }

    pub fn set_vertical_alignment(&mut self, vertical: VerticalAlignment) {
        self.update_alignment(|alignment| alignment.vertical = vertical);
    }

    pub fn set_wrap_text(&mut self, wrap: bool) {
        self.update_alignment(|alignment| alignment.wrap_text = wrap);
    }

    /// Same line style on the four outer edges
    pub fn set_outer_border_style(&mut self, style: BorderStyle) {
        self.update_borders(|borders| borders.set_outer_style(style));
    }
}
