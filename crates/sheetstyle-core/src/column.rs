//! Column types
//!
//! Columns are stored one per index while editing and compacted into
//! `<col min max>` ranges only when written.

use std::collections::BTreeMap;

use crate::error::{Axis, Error, Result};
use crate::MAX_COLS;

/// Width of a column nobody has resized, in characters
pub const DEFAULT_COLUMN_WIDTH: f64 = 9.140625;

/// Added to widths set through the API to match the rendered width
const WIDTH_ADJUSTMENT: f64 = 0.83;

/// Column metadata
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Column {
    /// Column-level cell format id
    pub style_index: u32,
    width: f64,
    /// Width was sized to fit the content
    pub best_fit: bool,
    /// Width differs from the sheet default
    pub custom_width: bool,
}

impl Default for Column {
    fn default() -> Self {
        Self {
            style_index: 0,
            width: DEFAULT_COLUMN_WIDTH,
            best_fit: false,
            custom_width: false,
        }
    }
}

impl Column {
    /// Create a new column with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored width, before any sheet cap
    pub fn raw_width(&self) -> f64 {
        self.width
    }

    /// Set the width in characters as a user would
    ///
    /// A fixed adjustment is added to get nearer the rendered width; widths
    /// of zero or less are ignored.
    pub fn set_width(&mut self, width: f64) {
        if width > 0.0 {
            self.width = width + WIDTH_ADJUSTMENT;
        }
    }

    /// Set the stored width exactly, as read from a package
    pub fn set_raw_width(&mut self, width: f64) {
        self.width = width;
    }
}

/// A run of adjacent columns sharing one `<col>` record
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRange {
    pub min: u32,
    pub max: u32,
    pub style_index: u32,
    pub width: f64,
    pub best_fit: bool,
    pub custom_width: bool,
}

impl ColumnRange {
    fn starting_at(index: u32, column: &Column, width: f64) -> Self {
        Self {
            min: index,
            max: index,
            style_index: column.style_index,
            width,
            best_fit: column.best_fit,
            custom_width: column.custom_width,
        }
    }

    /// Whether this is the default run `to_ranges` adds after `previous`
    fn is_sheet_tail(&self, previous: Option<&ColumnRange>) -> bool {
        self.max >= MAX_COLS
            && (self.width <= 0.0 || self.width == DEFAULT_COLUMN_WIDTH)
            && !self.best_fit
            && !self.custom_width
            && self.style_index == previous.map_or(0, |p| p.style_index)
    }

    fn accepts(&self, column: &Column, width: f64) -> bool {
        self.style_index == column.style_index
            && self.width == width
            && self.best_fit == column.best_fit
            && self.custom_width == column.custom_width
    }
}

/// Columns of a worksheet, keyed by 1-based index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnCollection {
    columns: BTreeMap<u32, Column>,
    max_width: f64,
}

impl ColumnCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_index(index: u32) -> Result<()> {
        Error::check_bounds(Axis::Column, index, 1, MAX_COLS)
    }

    /// Width cap applied to every column (0 = none)
    pub fn max_width(&self) -> f64 {
        self.max_width
    }

    /// Negative caps are ignored
    pub fn set_max_width(&mut self, max_width: f64) {
        if max_width >= 0.0 {
            self.max_width = max_width;
        }
    }

    /// Column width with the sheet cap applied
    pub fn width_of(&self, column: &Column) -> f64 {
        if self.max_width == 0.0 || column.width <= self.max_width {
            column.width
        } else {
            self.max_width
        }
    }

    /// Effective width at an index, default for missing columns
    pub fn width(&self, index: u32) -> f64 {
        match self.columns.get(&index) {
            Some(column) => self.width_of(column),
            None => self.width_of(&Column::default()),
        }
    }

    /// Get a column without materializing it
    pub fn get(&self, index: u32) -> Option<&Column> {
        self.columns.get(&index)
    }

    /// Get a column, creating a default one on first access
    pub fn get_mut(&mut self, index: u32) -> Result<&mut Column> {
        Self::check_index(index)?;
        Ok(self.columns.entry(index).or_default())
    }

    pub fn contains(&self, index: u32) -> bool {
        self.columns.contains_key(&index)
    }

    /// Insert a column, shifting columns at or after `index` right
    pub fn insert_column(&mut self, index: u32, column: Column) -> Result<&mut Column> {
        Self::check_index(index)?;
        if let Some(last) = self.max_index() {
            if last >= index {
                Self::check_index(last + 1)?;
            }
        }

        let tail = self.columns.split_off(&index);
        self.columns
            .extend(tail.into_iter().map(|(i, column)| (i + 1, column)));
        Ok(self.columns.entry(index).or_insert(column))
    }

    /// Insert a default column, shifting columns at or after `index` right
    pub fn insert(&mut self, index: u32) -> Result<&mut Column> {
        self.insert_column(index, Column::default())
    }

    /// Delete the column at `index`, shifting later columns left, then pad
    pub fn delete(&mut self, index: u32) -> Result<Option<Column>> {
        Self::check_index(index)?;
        let mut tail = self.columns.split_off(&index);
        let deleted = tail.remove(&index);
        self.columns
            .extend(tail.into_iter().map(|(i, column)| (i - 1, column)));
        self.pad();
        Ok(deleted)
    }

    /// Materialize default columns in every gap below the highest column
    pub fn pad(&mut self) {
        if let Some(last) = self.max_index() {
            for index in 1..=last {
                self.columns.entry(index).or_default();
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Column)> {
        self.columns.iter().map(|(&index, column)| (index, column))
    }

    /// Pad, then iterate over every column from 1
    pub fn iter_padded(&mut self) -> impl Iterator<Item = (u32, &Column)> {
        self.pad();
        self.iter()
    }

    /// Whether two columns would share a `<col>` record
    ///
    /// Compares format id, capped width and the two width flags; the
    /// resolved style is not consulted.
    pub fn similar(&self, a: &Column, b: &Column) -> bool {
        a.style_index == b.style_index
            && self.width_of(a) == self.width_of(b)
            && a.best_fit == b.best_fit
            && a.custom_width == b.custom_width
    }

    /// Compact columns into ranges covering every column up to the last one
    ///
    /// Gaps are treated as default columns. When the last range stops short
    /// of the maximum column a trailing default-width range carrying the last
    /// format id is added.
    pub fn to_ranges(&self) -> Vec<ColumnRange> {
        let Some(last) = self.max_index() else {
            return Vec::new();
        };

        let default = Column::default();
        let mut ranges: Vec<ColumnRange> = Vec::new();
        for index in 1..=last {
            let column = self.columns.get(&index).unwrap_or(&default);
            let width = self.width_of(column);
            match ranges.last_mut() {
                Some(range) if range.accepts(column, width) => range.max = index,
                _ => ranges.push(ColumnRange::starting_at(index, column, width)),
            }
        }

        if let Some(tail) = ranges.last() {
            if tail.max < MAX_COLS {
                let trailing = ColumnRange {
                    min: tail.max + 1,
                    max: MAX_COLS,
                    style_index: tail.style_index,
                    width: DEFAULT_COLUMN_WIDTH,
                    best_fit: false,
                    custom_width: false,
                };
                ranges.push(trailing);
            }
        }
        ranges
    }

    /// Rebuild columns from ranges read from a package
    ///
    /// Widths are kept as stored. A default run reaching the maximum column
    /// with the format of the run before it is the sheet tail and is not
    /// materialized; every other range is expanded in full.
    pub fn from_ranges(ranges: &[ColumnRange]) -> Self {
        let mut collection = Self::new();
        let mut previous: Option<&ColumnRange> = None;
        for range in ranges {
            let tail = range.is_sheet_tail(previous);
            previous = Some(range);
            if tail {
                continue;
            }
            for index in range.min.max(1)..=range.max.min(MAX_COLS) {
                let mut column = Column {
                    style_index: range.style_index,
                    best_fit: range.best_fit,
                    custom_width: range.custom_width,
                    ..Column::default()
                };
                if range.width > 0.0 {
                    column.set_raw_width(range.width);
                }
                collection.columns.insert(index, column);
            }
        }
        collection
    }

    /// Highest stored column
    pub fn max_index(&self) -> Option<u32> {
        self.columns.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_width_adjustment_and_cap() {
        let mut columns = ColumnCollection::new();
        columns.get_mut(1).unwrap().set_width(20.0);
        assert_eq!(columns.width(1), 20.83);
        assert_eq!(columns.width(2), DEFAULT_COLUMN_WIDTH);

        columns.set_max_width(15.0);
        assert_eq!(columns.width(1), 15.0);
        columns.set_max_width(-1.0);
        assert_eq!(columns.max_width(), 15.0);

        columns.get_mut(1).unwrap().set_width(0.0);
        assert_eq!(columns.get(1).unwrap().raw_width(), 20.83);
    }

    #[test]
    fn test_compaction() {
        let mut columns = ColumnCollection::new();
        for index in 1..=3 {
            columns.get_mut(index).unwrap().set_raw_width(20.0);
        }
        columns.get_mut(5).unwrap().style_index = 2;

        let ranges = columns.to_ranges();
        let spans: Vec<(u32, u32)> = ranges.iter().map(|r| (r.min, r.max)).collect();
        assert_eq!(spans, vec![(1, 3), (4, 4), (5, 5), (6, MAX_COLS)]);
        assert_eq!(ranges[0].width, 20.0);
        assert_eq!(ranges[1].width, DEFAULT_COLUMN_WIDTH);
        assert_eq!(ranges[3].style_index, 2);
        assert_eq!(ranges[3].width, DEFAULT_COLUMN_WIDTH);
    }

    #[test]
    fn test_no_columns_no_ranges() {
        assert!(ColumnCollection::new().to_ranges().is_empty());
    }

    #[test]
    fn test_ranges_round_trip() {
        let mut columns = ColumnCollection::new();
        columns.get_mut(2).unwrap().set_raw_width(30.5);
        columns.get_mut(2).unwrap().custom_width = true;
        columns.get_mut(4).unwrap().style_index = 3;

        let ranges = columns.to_ranges();
        let mut reread = ColumnCollection::from_ranges(&ranges);
        assert_eq!(reread.to_ranges(), ranges);
        assert_eq!(reread.get(2).unwrap().raw_width(), 30.5);
        assert_eq!(reread.iter_padded().count(), 4);
    }

    #[test]
    fn test_last_column_round_trip() {
        let mut columns = ColumnCollection::new();
        columns.get_mut(MAX_COLS).unwrap().style_index = 5;

        let ranges = columns.to_ranges();
        let reread = ColumnCollection::from_ranges(&ranges);
        assert_eq!(reread.get(MAX_COLS).map(|c| c.style_index), Some(5));
        assert_eq!(reread.to_ranges(), ranges);
    }

    #[test]
    fn test_whole_sheet_range_is_expanded() {
        let range = ColumnRange {
            min: 1,
            max: MAX_COLS,
            style_index: 4,
            width: 12.0,
            best_fit: false,
            custom_width: true,
        };
        let columns = ColumnCollection::from_ranges(&[range.clone()]);
        assert_eq!(columns.len(), MAX_COLS as usize);
        assert_eq!(columns.get(1).unwrap().style_index, 4);
        assert_eq!(columns.get(MAX_COLS).unwrap().raw_width(), 12.0);
        assert_eq!(columns.to_ranges(), vec![range]);
    }

    #[test]
    fn test_similar_ignores_index() {
        let columns = ColumnCollection::new();
        let mut a = Column::new();
        let b = Column::new();
        assert!(columns.similar(&a, &b));
        a.best_fit = true;
        assert!(!columns.similar(&a, &b));
    }

    #[test]
    fn test_shift() {
        let mut columns = ColumnCollection::new();
        columns.get_mut(2).unwrap().style_index = 7;
        columns.insert(1).unwrap();
        assert_eq!(columns.get(3).unwrap().style_index, 7);
        columns.delete(1).unwrap();
        assert_eq!(columns.get(2).unwrap().style_index, 7);
        assert!(columns.insert(MAX_COLS + 1).is_err());

        columns.get_mut(6).unwrap().style_index = 9;
        columns.delete(4).unwrap();
        let indexes: Vec<u32> = columns.iter().map(|(i, _)| i).collect();
        assert_eq!(indexes, vec![1, 2, 3, 4, 5]);
        assert_eq!(columns.get(5).unwrap().style_index, 9);
    }
}
