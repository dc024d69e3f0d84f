//! Font style types
//!
//! Every property is independently set or unset. Equality compares the set
//! of properties in use as well as their values, so a partial font built
//! for one rich text run never matches a complete font unless both use the
//! same properties.

use super::Color;

/// Font properties that can be set or cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontProperty {
    Size,
    Color,
    Name,
    Bold,
    Italic,
    Underline,
}

/// Font settings
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Font {
    size: Option<f64>,
    color: Option<Color>,
    name: Option<String>,
    bold: Option<bool>,
    italic: Option<bool>,
    underline: Option<bool>,
}

impl Font {
    /// Create a font with no properties set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set font name
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.set_name(name);
        self
    }

    /// Set font size
    pub fn with_size(mut self, size: f64) -> Self {
        self.set_size(size);
        self
    }

    /// Set color
    pub fn with_color(mut self, color: Color) -> Self {
        self.set_color(color);
        self
    }

    /// Set bold
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.set_bold(bold);
        self
    }

    /// Set italic
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.set_italic(italic);
        self
    }

    /// Set underline
    pub fn with_underline(mut self, underline: bool) -> Self {
        self.set_underline(underline);
        self
    }

    pub fn size(&self) -> Option<f64> {
        self.size
    }

    pub fn color(&self) -> Option<&Color> {
        self.color.as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn bold(&self) -> bool {
        self.bold.unwrap_or(false)
    }

    pub fn italic(&self) -> bool {
        self.italic.unwrap_or(false)
    }

    pub fn underline(&self) -> bool {
        self.underline.unwrap_or(false)
    }

    /// Sizes of zero or less are ignored
    pub fn set_size(&mut self, size: f64) {
        if size > 0.0 {
            self.size = Some(size);
        }
    }

    /// An unused color is ignored
    pub fn set_color(&mut self, color: Color) {
        if color.is_used() {
            self.color = Some(color);
        }
    }

    /// Edit the current color in place, starting from an unused one
    pub fn update_color(&mut self, f: impl FnOnce(&mut Color)) {
        let mut color = self.color.clone().unwrap_or_default();
        f(&mut color);
        self.color = if color.is_used() { Some(color) } else { None };
    }

    /// Empty names are ignored
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        let name = name.into();
        if !name.is_empty() {
            self.name = Some(name);
        }
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.bold = Some(bold);
    }

    pub fn set_italic(&mut self, italic: bool) {
        self.italic = Some(italic);
    }

    pub fn set_underline(&mut self, underline: bool) {
        self.underline = Some(underline);
    }

    /// Whether a property has been explicitly set
    pub fn is_set(&self, property: FontProperty) -> bool {
        match property {
            FontProperty::Size => self.size.is_some(),
            FontProperty::Color => self.color.is_some(),
            FontProperty::Name => self.name.is_some(),
            FontProperty::Bold => self.bold.is_some(),
            FontProperty::Italic => self.italic.is_some(),
            FontProperty::Underline => self.underline.is_some(),
        }
    }

    /// Clear a property back to unset
    pub fn unset(&mut self, property: FontProperty) {
        match property {
            FontProperty::Size => self.size = None,
            FontProperty::Color => self.color = None,
            FontProperty::Name => self.name = None,
            FontProperty::Bold => self.bold = None,
            FontProperty::Italic => self.italic = None,
            FontProperty::Underline => self.underline = None,
        }
    }
}

fn character_dimension(size: f64, offset: f64, divisor: f64) -> f64 {
    if size <= 0.0 {
        return 0.0;
    }
    (offset + size.powf(1.35)) / divisor
}

/// Approximate width of one character at a font size
///
/// Empirically fitted, not derived from font metrics.
pub fn character_width(size: f64) -> f64 {
    character_dimension(size, 5.0, 20.0)
}

/// Approximate height of one line at a font size
pub fn character_height(size: f64) -> f64 {
    character_dimension(size, 10.0, 2.5)
}
