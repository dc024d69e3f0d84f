//! Border style types

use super::Color;

/// Border line styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BorderStyle {
    #[default]
    None,
    Thin,
    Medium,
    Dashed,
    Dotted,
    Thick,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

/// A single border edge
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Border {
    /// Line style
    pub style: BorderStyle,
    /// Line color, written only when the style is not `None`
    pub color: Color,
}

impl Border {
    /// Create a new border edge
    pub fn new(style: BorderStyle, color: Color) -> Self {
        Self { style, color }
    }
}

/// Edges of a border set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderEdge {
    Left,
    Right,
    Top,
    Bottom,
    Diagonal,
}

/// The five edges of a cell's border
///
/// An edge that is `None` is distinct from an edge set to
/// [`BorderStyle::None`].
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Borders {
    pub left: Option<Border>,
    pub right: Option<Border>,
    pub top: Option<Border>,
    pub bottom: Option<Border>,
    pub diagonal: Option<Border>,
}

impl Borders {
    /// Create a border set with no edges
    pub fn new() -> Self {
        Self::default()
    }

    /// All five edges present with no line
    pub fn empty_edges() -> Self {
        Self {
            left: Some(Border::default()),
            right: Some(Border::default()),
            top: Some(Border::default()),
            bottom: Some(Border::default()),
            diagonal: Some(Border::default()),
        }
    }

    pub fn edge(&self, edge: BorderEdge) -> Option<&Border> {
        match edge {
            BorderEdge::Left => self.left.as_ref(),
            BorderEdge::Right => self.right.as_ref(),
            BorderEdge::Top => self.top.as_ref(),
            BorderEdge::Bottom => self.bottom.as_ref(),
            BorderEdge::Diagonal => self.diagonal.as_ref(),
        }
    }

    /// Mutable edge, created with no line if missing
    pub fn edge_mut(&mut self, edge: BorderEdge) -> &mut Border {
        let slot = match edge {
            BorderEdge::Left => &mut self.left,
            BorderEdge::Right => &mut self.right,
            BorderEdge::Top => &mut self.top,
            BorderEdge::Bottom => &mut self.bottom,
            BorderEdge::Diagonal => &mut self.diagonal,
        };
        slot.get_or_insert_with(Border::default)
    }

    pub fn set_edge(&mut self, edge: BorderEdge, border: Border) {
        *self.edge_mut(edge) = border;
    }

    /// Set left, right, top and bottom to the same line
    pub fn set_outer(&mut self, style: BorderStyle, color: Color) {
        for edge in [
            BorderEdge::Left,
            BorderEdge::Right,
            BorderEdge::Top,
            BorderEdge::Bottom,
        ] {
            self.set_edge(edge, Border::new(style, color.clone()));
        }
    }

    /// Set the line style of the four outer edges, keeping their colors
    pub fn set_outer_style(&mut self, style: BorderStyle) {
        for edge in [
            BorderEdge::Left,
            BorderEdge::Right,
            BorderEdge::Top,
            BorderEdge::Bottom,
        ] {
            self.edge_mut(edge).style = style;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_edge_is_distinct() {
        assert_ne!(Borders::new(), Borders::empty_edges());

        let mut borders = Borders::new();
        borders.edge_mut(BorderEdge::Top);
        assert_eq!(borders.top, Some(Border::default()));
        assert_eq!(borders.left, None);
    }

    #[test]
    fn test_outer() {
        let mut borders = Borders::empty_edges();
        borders.set_outer(BorderStyle::Thin, Color::indexed(64));

        assert_eq!(
            borders.edge(BorderEdge::Bottom),
            Some(&Border::new(BorderStyle::Thin, Color::indexed(64)))
        );
        assert_eq!(borders.diagonal, Some(Border::default()));

        borders.set_outer_style(BorderStyle::Thick);
        assert_eq!(borders.left.as_ref().map(|b| b.style), Some(BorderStyle::Thick));
        assert_eq!(
            borders.left.as_ref().map(|b| b.color.clone()),
            Some(Color::indexed(64))
        );
    }
}
