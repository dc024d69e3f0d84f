//! Row types

use std::collections::BTreeMap;

use crate::cell::{Cell, CellCollection};
use crate::error::{Axis, Error, Result};
use crate::MAX_ROWS;

/// A row and its cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// Cells keyed by column
    pub cells: CellCollection,
    /// Row-level cell format id (0 = none)
    pub style_index: u32,
    /// Custom height in points
    height: Option<f64>,
}

impl Row {
    /// Create a new row with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom height, or `default` when the row has none
    pub fn height(&self, default: f64) -> f64 {
        self.height.unwrap_or(default)
    }

    /// Custom height if one is set
    pub fn custom_height(&self) -> Option<f64> {
        self.height
    }

    /// Set a custom height; zero or less resets to the sheet default
    pub fn set_height(&mut self, height: f64) {
        self.height = if height > 0.0 { Some(height) } else { None };
    }

    /// Whether any cell in the row is used
    pub fn is_used(&self) -> bool {
        self.cells.is_used()
    }

    /// Copy of the row with every cell's value and format
    pub fn copy_content(&self) -> Row {
        Row {
            cells: self.cells.copy_content(),
            style_index: self.style_index,
            height: self.height,
        }
    }
}

/// Sparse rows of a worksheet, keyed by 1-based index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowCollection {
    rows: BTreeMap<u32, Row>,
}

impl RowCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_index(index: u32) -> Result<()> {
        Error::check_bounds(Axis::Row, index, 1, MAX_ROWS)
    }

    /// Get a row without materializing it
    pub fn get(&self, index: u32) -> Option<&Row> {
        self.rows.get(&index)
    }

    /// Get a row, creating an empty one on first access
    pub fn get_mut(&mut self, index: u32) -> Result<&mut Row> {
        Self::check_index(index)?;
        Ok(self.rows.entry(index).or_default())
    }

    /// Replace the row at an index
    pub fn set(&mut self, index: u32, row: Row) -> Result<()> {
        Self::check_index(index)?;
        self.rows.insert(index, row);
        Ok(())
    }

    pub fn contains(&self, index: u32) -> bool {
        self.rows.contains_key(&index)
    }

    /// Cell at a position without materializing it
    pub fn cell(&self, row: u32, column: u32) -> Option<&Cell> {
        self.get(row).and_then(|r| r.cells.get(column))
    }

    /// Cell at a position, materializing the row and cell
    pub fn cell_mut(&mut self, row: u32, column: u32) -> Result<&mut Cell> {
        self.get_mut(row)?.cells.get_mut(column)
    }

    /// Insert an empty row, shifting rows at or after `index` down
    pub fn insert(&mut self, index: u32) -> Result<&mut Row> {
        self.insert_row(index, Row::default())
    }

    /// Insert a given row, shifting rows at or after `index` down
    pub fn insert_row(&mut self, index: u32, row: Row) -> Result<&mut Row> {
        Self::check_index(index)?;
        if let Some(last) = self.max_index() {
            if last >= index {
                Self::check_index(last + 1)?;
            }
        }

        let tail = self.rows.split_off(&index);
        self.rows
            .extend(tail.into_iter().map(|(i, row)| (i + 1, row)));
        Ok(self.rows.entry(index).or_insert(row))
    }

    /// Delete the row at `index`, shifting later rows up, then pad
    pub fn delete(&mut self, index: u32) -> Result<Option<Row>> {
        Self::check_index(index)?;
        let mut tail = self.rows.split_off(&index);
        let deleted = tail.remove(&index);
        self.rows
            .extend(tail.into_iter().map(|(i, row)| (i - 1, row)));
        self.pad();
        Ok(deleted)
    }

    /// Materialize empty rows in every gap below the highest row
    pub fn pad(&mut self) {
        if let Some(last) = self.max_index() {
            for index in 1..=last {
                self.rows.entry(index).or_default();
            }
        }
    }

    /// Iterate over stored rows in order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Row)> {
        self.rows.iter().map(|(&index, row)| (index, row))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut Row)> {
        self.rows.iter_mut().map(|(&index, row)| (index, row))
    }

    /// Pad, then iterate over every row from 1
    pub fn iter_padded(&mut self) -> impl Iterator<Item = (u32, &Row)> {
        self.pad();
        self.iter()
    }

    /// View of the cells of one column across all rows
    pub fn column_cells(&mut self, column: u32) -> ColumnCells<'_> {
        ColumnCells { rows: self, column }
    }

    /// First row holding a non-blank cell
    pub fn first_non_blank(&self) -> Option<(u32, &Row)> {
        self.iter()
            .find(|(_, row)| row.cells.first_non_blank().is_some())
    }

    /// Highest stored row
    pub fn max_index(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }

    /// Highest stored column in any row
    pub fn max_column(&self) -> Option<u32> {
        self.rows
            .values()
            .filter_map(|row| row.cells.max_index())
            .max()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Cells of one column, read through the rows that own them
///
/// Cells are stored row-major; shifting along a column is not supported.
pub struct ColumnCells<'a> {
    rows: &'a mut RowCollection,
    column: u32,
}

impl<'a> ColumnCells<'a> {
    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn get(&self, row: u32) -> Option<&Cell> {
        self.rows.cell(row, self.column)
    }

    pub fn get_mut(&mut self, row: u32) -> Result<&mut Cell> {
        self.rows.cell_mut(row, self.column)
    }

    /// Iterate over the stored cells of the column in row order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Cell)> {
        let column = self.column;
        self.rows
            .iter()
            .filter_map(move |(index, row)| row.cells.get(column).map(|cell| (index, cell)))
    }

    pub fn insert(&mut self, _row: u32) -> Result<&mut Cell> {
        Err(Error::UnsupportedOperation(
            "cells cannot be inserted along a column".into(),
        ))
    }

    pub fn delete(&mut self, _row: u32) -> Result<Option<Cell>> {
        Err(Error::UnsupportedOperation(
            "cells cannot be deleted along a column".into(),
        ))
    }
}
