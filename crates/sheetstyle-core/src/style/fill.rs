//! Fill style types

use super::Color;

/// Pattern fill types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatternType {
    #[default]
    None,
    Solid,
    MediumGray,
    DarkGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
    Gray125,
    Gray0625,
}

/// Cell fill
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fill {
    pattern_type: PatternType,
    foreground: Color,
    background: Color,
}

impl Fill {
    /// Create an empty fill
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pattern fill with no colors
    pub fn pattern(pattern_type: PatternType) -> Self {
        Self {
            pattern_type,
            ..Self::default()
        }
    }

    /// Create a solid fill
    pub fn solid(color: Color) -> Self {
        let mut fill = Self::new();
        fill.set_foreground(color);
        fill
    }

    pub fn pattern_type(&self) -> PatternType {
        self.pattern_type
    }

    pub fn foreground(&self) -> &Color {
        &self.foreground
    }

    pub fn background(&self) -> &Color {
        &self.background
    }

    pub fn set_pattern_type(&mut self, pattern_type: PatternType) {
        self.pattern_type = pattern_type;
    }

    /// A foreground color on an empty fill turns it solid
    pub fn set_foreground(&mut self, color: Color) {
        self.foreground = color;
        if self.pattern_type == PatternType::None {
            self.pattern_type = PatternType::Solid;
        }
    }

    pub fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    /// Edit the foreground color in place
    pub fn update_foreground(&mut self, f: impl FnOnce(&mut Color)) {
        let mut color = self.foreground.clone();
        f(&mut color);
        self.set_foreground(color);
    }

    /// Edit the background color in place
    pub fn update_background(&mut self, f: impl FnOnce(&mut Color)) {
        f(&mut self.background);
    }
}
