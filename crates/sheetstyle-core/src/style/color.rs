//! Color representation
//!
//! A color is sourced from exactly one channel at a time: an indexed palette
//! entry, a theme slot, an RGB value or "automatic". Setting any of them
//! clears the others.

/// Color used by fonts, fills and borders
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    indexed: Option<u32>,
    theme: Option<u32>,
    /// `#RRGGBB`
    rgb: Option<String>,
    tint: f64,
    auto: bool,
}

impl Color {
    /// An unused color
    pub fn new() -> Self {
        Self::default()
    }

    /// Legacy palette color
    pub fn indexed(index: u32) -> Self {
        let mut color = Self::new();
        color.set_indexed(index);
        color
    }

    /// Theme color
    pub fn theme(index: u32) -> Self {
        let mut color = Self::new();
        color.set_theme(index);
        color
    }

    /// RGB color from a `#RRGGBB` (or `RRGGBB`) code
    pub fn rgb(code: &str) -> Self {
        let mut color = Self::new();
        color.set_rgb(code);
        color
    }

    /// RGB color from components
    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgb(&format!("#{red:02X}{green:02X}{blue:02X}"))
    }

    /// Automatic color
    pub fn auto() -> Self {
        let mut color = Self::new();
        color.set_auto(true);
        color
    }

    /// Build from an 8-digit ARGB code as stored in the package
    pub fn from_argb(argb: &str) -> Self {
        Self::rgb(argb)
    }

    pub fn indexed_value(&self) -> Option<u32> {
        self.indexed
    }

    pub fn theme_value(&self) -> Option<u32> {
        self.theme
    }

    /// `#RRGGBB` code, if the color is RGB
    pub fn rgb_value(&self) -> Option<&str> {
        self.rgb.as_deref()
    }

    pub fn tint(&self) -> f64 {
        self.tint
    }

    pub fn is_auto(&self) -> bool {
        self.auto
    }

    /// 8-digit ARGB code with an opaque alpha, if the color is RGB
    pub fn to_argb(&self) -> Option<String> {
        self.rgb
            .as_deref()
            .map(|rgb| format!("FF{}", rgb.trim_start_matches('#')))
    }

    pub fn set_indexed(&mut self, index: u32) {
        self.reset();
        self.indexed = Some(index);
    }

    pub fn set_theme(&mut self, index: u32) {
        self.reset();
        self.theme = Some(index);
    }

    /// Set an RGB code (`RRGGBB`, or `AARRGGBB` with the alpha dropped).
    ///
    /// An empty code clears the RGB channel only; anything that is not six
    /// or eight hex digits leaves the color unchanged.
    pub fn set_rgb(&mut self, code: &str) {
        let code = code.trim().trim_start_matches('#');
        if code.is_empty() {
            self.rgb = None;
            return;
        }
        if !code.bytes().all(|b| b.is_ascii_hexdigit()) {
            log::debug!("ignoring invalid RGB code '{code}'");
            return;
        }
        let code = match code.len() {
            6 => code,
            8 => &code[2..],
            _ => {
                log::debug!("ignoring RGB code '{code}' of unexpected length");
                return;
            }
        };
        self.reset();
        self.rgb = Some(format!("#{}", code.to_ascii_uppercase()));
    }

    /// Tint is applied on top of the current channel
    pub fn set_tint(&mut self, tint: f64) {
        self.tint = tint;
    }

    pub fn set_auto(&mut self, auto: bool) {
        if auto {
            self.reset();
        }
        self.auto = auto;
    }

    /// Whether any channel is set
    pub fn is_used(&self) -> bool {
        self.indexed.is_some()
            || self.theme.is_some()
            || self.rgb.is_some()
            || self.tint != 0.0
            || self.auto
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_used(), other.is_used()) {
            (true, true) => {
                self.indexed == other.indexed
                    && self.theme == other.theme
                    && self.rgb == other.rgb
                    && self.tint == other.tint
                    && self.auto == other.auto
            }
            (used, other_used) => used == other_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_channels_are_exclusive() {
        let mut color = Color::theme(1);
        color.set_tint(-0.25);
        color.set_rgb("#ff0000");

        assert_eq!(color.theme_value(), None);
        assert_eq!(color.tint(), 0.0);
        assert_eq!(color.rgb_value(), Some("#FF0000"));

        color.set_auto(true);
        assert_eq!(color.rgb_value(), None);
        assert!(color.is_auto());

        color.set_indexed(64);
        assert!(!color.is_auto());
        assert_eq!(color.indexed_value(), Some(64));
    }

    #[test]
    fn test_equality() {
        assert_eq!(Color::new(), Color::default());
        assert_eq!(Color::rgb("00FF00"), Color::from_rgb(0, 255, 0));
        assert_ne!(Color::theme(1), Color::new());
        assert_ne!(Color::theme(1), Color::indexed(1));

        let mut tinted = Color::theme(4);
        tinted.set_tint(0.4);
        assert_ne!(tinted, Color::theme(4));
    }

    #[test]
    fn test_argb_conversion() {
        let color = Color::from_argb("FF1F497D");
        assert_eq!(color.rgb_value(), Some("#1F497D"));
        assert_eq!(color.to_argb().as_deref(), Some("FF1F497D"));
        assert_eq!(Color::theme(1).to_argb(), None);
    }

    #[test]
    fn test_empty_rgb_is_ignored() {
        let mut color = Color::theme(2);
        color.set_rgb("");
        assert_eq!(color.theme_value(), Some(2));
        assert!(!Color::rgb("").is_used());
    }

    #[test]
    fn test_invalid_codes_are_ignored() {
        assert!(!Color::from_argb("€12345").is_used());
        assert!(!Color::from_argb("FFGG0000").is_used());
        assert!(!Color::rgb("#12345").is_used());

        let mut color = Color::theme(3);
        color.set_rgb("zzzzzz");
        assert_eq!(color.theme_value(), Some(3));
        assert_eq!(color.rgb_value(), None);

        assert_eq!(Color::rgb("80ff8000").rgb_value(), Some("#FF8000"));
    }
}
