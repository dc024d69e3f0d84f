//! Cell storage
//!
//! Cells of one row live in a sparse `BTreeMap` keyed by 1-based column.
//! Accessing a missing cell materializes it; enumeration through
//! [`CellCollection::iter_padded`] first fills every gap below the highest
//! used column so callers always see a contiguous run.

use std::collections::BTreeMap;
use std::fmt;

use super::{quote_sheet_name, split_sheet_reference, CellAddress, CellValue, RichString, TextRun};
use crate::error::{Axis, Error, Result};
use crate::style::Font;
use crate::MAX_COLS;

/// Internal hyperlink target (`Sheet!A1`)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HyperlinkTarget {
    /// Target worksheet name
    pub sheet: String,
    /// Target cell
    pub cell: CellAddress,
}

impl HyperlinkTarget {
    pub fn new<S: Into<String>>(sheet: S, cell: CellAddress) -> Self {
        Self {
            sheet: sheet.into(),
            cell,
        }
    }

    /// Parse a `location` attribute; links without a sheet part are not internal
    pub fn parse(location: &str) -> Result<Self> {
        match split_sheet_reference(location) {
            (Some(sheet), local) => Ok(Self::new(sheet, CellAddress::parse(local)?)),
            (None, _) => Err(Error::InvalidAddress(format!(
                "hyperlink location '{location}' has no sheet"
            ))),
        }
    }
}

impl fmt::Display for HyperlinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", quote_sheet_name(&self.sheet), self.cell)
    }
}

/// Complete data for a single cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    /// The cell's value
    pub value: CellValue,
    /// Cell format id (0 = default format)
    pub style_index: u32,
    /// Number of cells below merged with this one
    pub merge_down: u32,
    /// Number of cells to the right merged with this one
    pub merge_across: u32,
    /// Internal link to another cell
    pub hyperlink: Option<HyperlinkTarget>,
}

impl Cell {
    /// Create a new cell with a value and default style
    pub fn new<V: Into<CellValue>>(value: V) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Create a new cell with a value and style
    pub fn with_style<V: Into<CellValue>>(value: V, style_index: u32) -> Self {
        Self {
            value: value.into(),
            style_index,
            ..Self::default()
        }
    }

    /// Whether the cell has anything worth saving
    pub fn is_used(&self) -> bool {
        !self.value.is_blank()
            || self.style_index > 0
            || self.merge_down > 0
            || self.merge_across > 0
            || self.hyperlink.is_some()
    }

    /// Clear the value and format
    pub fn clear(&mut self) {
        self.value = CellValue::Blank;
        self.style_index = 0;
    }

    /// Copy value and format, leaving merges and links behind
    pub fn copy_content(&self) -> Cell {
        Cell::with_style(self.value.clone(), self.style_index)
    }

    /// Append text with its own font, turning the value into rich text
    ///
    /// An existing non-text value becomes the first, unformatted run.
    pub fn append_font_string<S: Into<String>>(&mut self, font: Font, text: S) {
        let mut rich = match std::mem::take(&mut self.value) {
            CellValue::SharedString(s) => s,
            CellValue::Blank => RichString::default(),
            other => RichString::plain(other.to_string()),
        };
        rich.push(TextRun::with_font(text, font));
        self.value = CellValue::SharedString(rich);
    }
}

/// Sparse cells of one row, keyed by 1-based column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellCollection {
    cells: BTreeMap<u32, Cell>,
}

impl CellCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_index(column: u32) -> Result<()> {
        Error::check_bounds(Axis::Column, column, 1, MAX_COLS)
    }

    /// Get a cell without materializing it
    pub fn get(&self, column: u32) -> Option<&Cell> {
        self.cells.get(&column)
    }

    /// Get a cell, creating a blank one on first access
    pub fn get_mut(&mut self, column: u32) -> Result<&mut Cell> {
        Self::check_index(column)?;
        Ok(self.cells.entry(column).or_default())
    }

    /// Replace the cell at a column
    pub fn set(&mut self, column: u32, cell: Cell) -> Result<()> {
        Self::check_index(column)?;
        self.cells.insert(column, cell);
        Ok(())
    }

    /// Remove a cell without shifting its neighbours
    pub fn remove(&mut self, column: u32) -> Option<Cell> {
        self.cells.remove(&column)
    }

    pub fn contains(&self, column: u32) -> bool {
        self.cells.contains_key(&column)
    }

    /// Insert a blank cell, shifting cells at or after `column` right
    ///
    /// Fails without changing anything when a cell would move past the last
    /// column.
    pub fn insert(&mut self, column: u32) -> Result<&mut Cell> {
        self.insert_cell(column, Cell::default())
    }

    /// Insert a given cell, shifting cells at or after `column` right
    pub fn insert_cell(&mut self, column: u32, cell: Cell) -> Result<&mut Cell> {
        Self::check_index(column)?;
        if let Some(last) = self.max_index() {
            if last >= column {
                Self::check_index(last + 1)?;
            }
        }

        let tail = self.cells.split_off(&column);
        self.cells
            .extend(tail.into_iter().map(|(index, cell)| (index + 1, cell)));
        Ok(self.cells.entry(column).or_insert(cell))
    }

    /// Delete the cell at `column`, shifting later cells left, then pad
    pub fn delete(&mut self, column: u32) -> Result<Option<Cell>> {
        Self::check_index(column)?;
        let mut tail = self.cells.split_off(&column);
        let deleted = tail.remove(&column);
        self.cells
            .extend(tail.into_iter().map(|(index, cell)| (index - 1, cell)));
        self.pad();
        Ok(deleted)
    }

    /// Materialize blank cells in every gap below the highest column
    pub fn pad(&mut self) {
        if let Some(last) = self.max_index() {
            for column in 1..=last {
                self.cells.entry(column).or_default();
            }
        }
    }

    /// Iterate over stored cells in column order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Cell)> {
        self.cells.iter().map(|(&column, cell)| (column, cell))
    }

    /// Iterate over stored cells mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut Cell)> {
        self.cells.iter_mut().map(|(&column, cell)| (column, cell))
    }

    /// Pad, then iterate over every column from 1
    pub fn iter_padded(&mut self) -> impl Iterator<Item = (u32, &Cell)> {
        self.pad();
        self.iter()
    }

    /// Clear the value and format of every cell
    pub fn clear(&mut self) {
        for cell in self.cells.values_mut() {
            cell.clear();
        }
    }

    /// Copy of every cell's value and format
    pub fn copy_content(&self) -> CellCollection {
        CellCollection {
            cells: self
                .cells
                .iter()
                .map(|(&column, cell)| (column, cell.copy_content()))
                .collect(),
        }
    }

    /// First cell whose value is not blank
    pub fn first_non_blank(&self) -> Option<(u32, &Cell)> {
        self.iter().find(|(_, cell)| !cell.value.is_blank())
    }

    /// Cells holding a value equal to `value`
    pub fn find_by_value<'a>(
        &'a self,
        value: &'a CellValue,
    ) -> impl Iterator<Item = (u32, &'a Cell)> + 'a {
        self.iter().filter(move |(_, cell)| &cell.value == value)
    }

    /// Whether any cell is used
    pub fn is_used(&self) -> bool {
        self.cells.values().any(Cell::is_used)
    }

    /// Highest stored column
    pub fn max_index(&self) -> Option<u32> {
        self.cells.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn collection(columns: &[u32]) -> CellCollection {
        let mut cells = CellCollection::new();
        for &column in columns {
            cells.get_mut(column).unwrap().value = CellValue::Number(column as f64);
        }
        cells
    }

    fn keys(cells: &CellCollection) -> Vec<u32> {
        cells.iter().map(|(column, _)| column).collect()
    }

    #[test]
    fn test_access_materializes() {
        let mut cells = CellCollection::new();
        assert!(!cells.contains(3));
        cells.get_mut(3).unwrap();
        assert!(cells.contains(3));
        assert_eq!(cells.len(), 1);
    }

    #[test]
    fn test_out_of_range() {
        let mut cells = CellCollection::new();
        assert!(matches!(
            cells.get_mut(0),
            Err(Error::OutOfRange {
                axis: Axis::Column,
                ..
            })
        ));
        assert!(cells.get_mut(MAX_COLS + 1).is_err());
        assert!(cells.get_mut(MAX_COLS).is_ok());
    }

    #[test]
    fn test_padding() {
        let mut cells = collection(&[5, 2]);
        let padded: Vec<u32> = cells.iter_padded().map(|(column, _)| column).collect();
        assert_eq!(padded, vec![1, 2, 3, 4, 5]);
        assert!(cells.get(3).unwrap().value.is_blank());
    }

    #[test]
    fn test_insert_shifts_right() {
        let mut cells = collection(&[1, 2, 4]);
        cells.insert(2).unwrap();
        assert_eq!(keys(&cells), vec![1, 2, 3, 5]);
        assert!(cells.get(2).unwrap().value.is_blank());
        assert_eq!(cells.get(3).unwrap().value, CellValue::Number(2.0));
        assert_eq!(cells.get(5).unwrap().value, CellValue::Number(4.0));
    }

    #[test]
    fn test_insert_overflow_leaves_state() {
        let mut cells = collection(&[1, MAX_COLS]);
        let before = cells.clone();
        assert!(cells.insert(1).is_err());
        assert_eq!(cells, before);
        assert!(cells.insert(MAX_COLS).is_err());
    }

    #[test]
    fn test_delete_shifts_left() {
        let mut cells = collection(&[1, 2, 3, 7]);
        let deleted = cells.delete(2).unwrap();
        assert_eq!(deleted.unwrap().value, CellValue::Number(2.0));
        assert_eq!(keys(&cells), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(cells.get(2).unwrap().value, CellValue::Number(3.0));
        assert_eq!(cells.get(6).unwrap().value, CellValue::Number(7.0));
        assert!(!cells.get(4).unwrap().is_used());

        let deleted = cells.delete(6).unwrap();
        assert_eq!(deleted.unwrap().value, CellValue::Number(7.0));
        assert_eq!(keys(&cells), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_is_used() {
        let mut cell = Cell::default();
        assert!(!cell.is_used());
        cell.merge_across = 1;
        assert!(cell.is_used());
        cell.merge_across = 0;
        cell.style_index = 2;
        assert!(cell.is_used());
        cell.clear();
        assert!(!cell.is_used());
    }

    #[test]
    fn test_append_font_string() {
        let mut cell = Cell::new(12.5);
        cell.append_font_string(Font::new().with_bold(true), " kg");
        let rich = cell.value.as_rich_string().unwrap();
        assert_eq!(rich.runs().len(), 2);
        assert_eq!(rich.text(), "12.5 kg");
        assert!(rich.runs()[0].font.is_none());
    }

    #[test]
    fn test_hyperlink_target() {
        let target = HyperlinkTarget::new("My Sheet", CellAddress::new(3, 2));
        assert_eq!(target.to_string(), "'My Sheet'!B3");
        assert_eq!(HyperlinkTarget::parse("'My Sheet'!B3").unwrap(), target);
        assert!(HyperlinkTarget::parse("B3").is_err());
    }

    proptest! {
        #[test]
        fn insert_then_delete_round_trips(
            columns in proptest::collection::btree_set(1u32..200, 0..30),
            at in 1u32..220,
        ) {
            let columns: Vec<u32> = columns.into_iter().collect();
            let original = collection(&columns);
            let mut cells = original.clone();

            cells.insert(at).unwrap();
            for &column in &columns {
                let expected = if column >= at { column + 1 } else { column };
                prop_assert_eq!(
                    &cells.get(expected).unwrap().value,
                    &CellValue::Number(column as f64)
                );
            }

            cells.delete(at).unwrap();
            for &column in &columns {
                prop_assert_eq!(
                    &cells.get(column).unwrap().value,
                    &CellValue::Number(column as f64)
                );
            }
            let last = columns.last().copied().unwrap_or(0);
            prop_assert_eq!(keys(&cells), (1..=last).collect::<Vec<_>>());
        }
    }
}
