//! Worksheet type

use crate::cell::{Cell, CellAddress, CellRange, CellValue, HyperlinkTarget};
use crate::column::ColumnCollection;
use crate::error::{Axis, Error, Result};
use crate::row::RowCollection;
use crate::settings::DEFAULT_ROW_HEIGHT;
use crate::{MAX_COLS, MAX_ROWS};

/// Sheet visibility (`state` attribute of `<sheet>`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SheetVisibility {
    #[default]
    Visible,
    Hidden,
    /// Only reachable programmatically
    VeryHidden,
}

/// Sheet view settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SheetView {
    /// Tab is selected
    pub selected: bool,
    /// Number of rows frozen at the top (0 = none)
    pub frozen_row: u32,
    /// Number of columns frozen at the left (0 = none)
    pub frozen_column: u32,
}

impl SheetView {
    /// Whether the view needs writing at all
    pub fn is_used(&self) -> bool {
        self.selected || self.frozen_row > 0 || self.frozen_column > 0
    }
}

/// A worksheet (single sheet in a workbook)
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    visibility: SheetVisibility,
    /// Rows and their cells
    pub rows: RowCollection,
    /// Column metadata
    pub columns: ColumnCollection,
    /// View settings
    pub view: SheetView,
    default_row_height: f64,
    /// Package part the sheet was loaded from
    pub source: Option<String>,
}

impl Worksheet {
    /// Create a new empty worksheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            visibility: SheetVisibility::Visible,
            rows: RowCollection::new(),
            columns: ColumnCollection::new(),
            view: SheetView::default(),
            default_row_height: DEFAULT_ROW_HEIGHT,
            source: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the name without any checks; use `Workbook::rename` to keep
    /// references in step
    pub(crate) fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    pub fn visibility(&self) -> SheetVisibility {
        self.visibility
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == SheetVisibility::Visible
    }

    pub(crate) fn set_visibility(&mut self, visibility: SheetVisibility) {
        self.visibility = visibility;
    }

    /// Height of rows without a custom height
    pub fn default_row_height(&self) -> f64 {
        self.default_row_height
    }

    /// Heights of zero or less are ignored
    pub fn set_default_row_height(&mut self, height: f64) {
        if height > 0.0 {
            self.default_row_height = height;
        }
    }

    /// Height of a row, falling back to the sheet default
    pub fn row_height(&self, row: u32) -> f64 {
        self.rows
            .get(row)
            .map(|r| r.height(self.default_row_height))
            .unwrap_or(self.default_row_height)
    }

    /// Width cap applied to every column (0 = none)
    pub fn max_column_width(&self) -> f64 {
        self.columns.max_width()
    }

    pub fn set_max_column_width(&mut self, max_width: f64) {
        self.columns.set_max_width(max_width);
    }

    /// Freeze rows above and columns left of a split (0 = no split)
    pub fn set_frozen(&mut self, rows: u32, columns: u32) {
        self.view.frozen_row = rows;
        self.view.frozen_column = columns;
    }

    // ==================== Cells ====================

    /// Cell at a position without materializing it
    pub fn cell(&self, row: u32, column: u32) -> Option<&Cell> {
        self.rows.cell(row, column)
    }

    /// Cell at a position, materializing the row and cell
    pub fn cell_mut(&mut self, row: u32, column: u32) -> Result<&mut Cell> {
        self.rows.cell_mut(row, column)
    }

    /// Cell at an A1 address
    pub fn cell_at(&self, address: &str) -> Result<Option<&Cell>> {
        let address = CellAddress::parse(address)?;
        Ok(self.cell(address.row, address.column))
    }

    /// Value at a position; blank when the cell does not exist
    pub fn value(&self, row: u32, column: u32) -> CellValue {
        self.cell(row, column)
            .map(|cell| cell.value.clone())
            .unwrap_or_default()
    }

    pub fn set_value<V: Into<CellValue>>(&mut self, row: u32, column: u32, value: V) -> Result<()> {
        self.cell_mut(row, column)?.value = value.into();
        Ok(())
    }

    /// Clear the value and format of a cell, if it exists
    pub fn clear_cell(&mut self, row: u32, column: u32) {
        if self.cell(row, column).is_none() {
            return;
        }
        if let Ok(cell) = self.cell_mut(row, column) {
            cell.clear();
        }
    }

    /// Copy a cell's value and format to another position
    pub fn copy_cell(&mut self, from: CellAddress, to: CellAddress) -> Result<()> {
        let copy = self
            .cell(from.row, from.column)
            .map(Cell::copy_content)
            .unwrap_or_default();
        let target = self.cell_mut(to.row, to.column)?;
        target.value = copy.value;
        target.style_index = copy.style_index;
        Ok(())
    }

    /// Merge a rectangle into its top-left cell
    pub fn merge(&mut self, range: &CellRange) -> Result<()> {
        Error::check_bounds(Axis::Row, range.end.row, 1, MAX_ROWS)?;
        Error::check_bounds(Axis::Column, range.end.column, 1, MAX_COLS)?;
        let cell = self.cell_mut(range.start.row, range.start.column)?;
        cell.merge_down = range.row_count() - 1;
        cell.merge_across = range.column_count() - 1;
        Ok(())
    }

    /// Merged rectangles, one per anchor cell
    pub fn merges(&self) -> Vec<CellRange> {
        self.rows
            .iter()
            .flat_map(|(row, r)| {
                r.cells
                    .iter()
                    .filter(|(_, cell)| cell.merge_down > 0 || cell.merge_across > 0)
                    .map(move |(column, cell)| {
                        CellRange::new(
                            CellAddress::new(row, column),
                            CellAddress::new(row + cell.merge_down, column + cell.merge_across),
                        )
                    })
            })
            .collect()
    }

    /// Cells carrying an internal link
    pub fn hyperlinks(&self) -> Vec<(CellAddress, &HyperlinkTarget)> {
        self.rows
            .iter()
            .flat_map(|(row, r)| {
                r.cells.iter().filter_map(move |(column, cell)| {
                    cell.hyperlink
                        .as_ref()
                        .map(|target| (CellAddress::new(row, column), target))
                })
            })
            .collect()
    }

    /// Point links at a renamed worksheet
    pub(crate) fn rename_link_targets(&mut self, old: &str, new: &str) {
        for (_, row) in self.rows.iter_mut() {
            for (_, cell) in row.cells.iter_mut() {
                if let Some(target) = cell.hyperlink.as_mut() {
                    if target.sheet.to_lowercase() == old.to_lowercase() {
                        target.sheet = new.to_string();
                    }
                }
            }
        }
    }

    // ==================== Used range ====================

    /// Bottom-right corner of the used cells
    fn used_extent(&self) -> Option<(u32, u32)> {
        let mut extent: Option<(u32, u32)> = None;
        for (row, r) in self.rows.iter() {
            for (column, cell) in r.cells.iter() {
                if cell.is_used() {
                    let (max_row, max_column) = extent.unwrap_or((row, column));
                    extent = Some((max_row.max(row), max_column.max(column)));
                }
            }
        }
        extent
    }

    /// Range from A1 to the last used row and column
    pub fn used_range(&self) -> CellRange {
        let (row, column) = self.used_extent().unwrap_or((1, 1));
        CellRange::new(CellAddress::new(1, 1), CellAddress::new(row, column))
    }

    /// Text of the `<dimension ref>` element
    pub fn dimension(&self) -> String {
        self.used_range().to_a1_string()
    }

    // ==================== Shifting ====================

    /// Insert an empty row; frozen rows grow when the row lands inside them
    pub fn insert_row(&mut self, index: u32) -> Result<()> {
        self.rows.insert(index)?;
        if index <= self.view.frozen_row {
            self.view.frozen_row += 1;
        }
        Ok(())
    }

    /// Delete a row; frozen rows shrink when the row was inside them
    pub fn delete_row(&mut self, index: u32) -> Result<()> {
        self.rows.delete(index)?;
        if self.view.frozen_row > 0 && index <= self.view.frozen_row {
            self.view.frozen_row -= 1;
        }
        Ok(())
    }

    /// Insert an empty column, shifting column metadata and cells right
    pub fn insert_column(&mut self, index: u32) -> Result<()> {
        Error::check_bounds(Axis::Column, index, 1, MAX_COLS)?;
        let last = self.columns.max_index().max(self.rows.max_column());
        if let Some(last) = last {
            if last >= index {
                Error::check_bounds(Axis::Column, last + 1, 1, MAX_COLS)?;
            }
        }

        self.columns.insert(index)?;
        for (_, row) in self.rows.iter_mut() {
            if row.cells.max_index().is_some_and(|max| max >= index) {
                row.cells.insert(index)?;
            }
        }
        if index <= self.view.frozen_column {
            self.view.frozen_column += 1;
        }
        Ok(())
    }

    /// Delete a column, shifting column metadata and cells left
    pub fn delete_column(&mut self, index: u32) -> Result<()> {
        self.columns.delete(index)?;
        for (_, row) in self.rows.iter_mut() {
            row.cells.delete(index)?;
        }
        if self.view.frozen_column > 0 && index <= self.view.frozen_column {
            self.view.frozen_column -= 1;
        }
        Ok(())
    }

    /// Copy of the sheet under a new name, not tied to any package part
    pub fn copy<S: Into<String>>(&self, name: S) -> Worksheet {
        Worksheet {
            name: name.into(),
            source: None,
            view: SheetView {
                selected: false,
                ..self.view
            },
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_values_and_lazy_cells() {
        let mut sheet = Worksheet::new("Data");
        assert!(sheet.cell(1, 1).is_none());
        assert_eq!(sheet.value(1, 1), CellValue::Blank);

        sheet.set_value(2, 3, 42).unwrap();
        assert_eq!(sheet.value(2, 3), CellValue::Number(42.0));
        assert_eq!(
            sheet.cell_at("C2").unwrap().map(|c| c.value.clone()),
            Some(CellValue::Number(42.0))
        );
        assert!(sheet.set_value(0, 1, 1).is_err());
    }

    #[test]
    fn test_dimension() {
        let mut sheet = Worksheet::new("Data");
        assert_eq!(sheet.dimension(), "A1");

        sheet.set_value(4, 2, "x").unwrap();
        sheet.cell_mut(10, 1).unwrap();
        assert_eq!(sheet.dimension(), "A1:B4");
        assert_eq!(sheet.used_range().to_a1_string(), "A1:B4");
    }

    #[test]
    fn test_frozen_rows_follow_shifts() {
        let mut sheet = Worksheet::new("Data");
        sheet.set_frozen(2, 0);

        sheet.insert_row(1).unwrap();
        assert_eq!(sheet.view.frozen_row, 3);
        sheet.insert_row(10).unwrap();
        assert_eq!(sheet.view.frozen_row, 3);

        sheet.delete_row(10).unwrap();
        assert_eq!(sheet.view.frozen_row, 3);
        sheet.delete_row(2).unwrap();
        assert_eq!(sheet.view.frozen_row, 2);
    }

    #[test]
    fn test_column_shift_moves_cells_and_metadata() {
        let mut sheet = Worksheet::new("Data");
        sheet.set_value(1, 2, "b").unwrap();
        sheet.set_value(3, 1, "a").unwrap();
        sheet.columns.get_mut(2).unwrap().set_raw_width(30.0);

        sheet.insert_column(2).unwrap();
        assert_eq!(sheet.value(1, 3), CellValue::from("b"));
        assert_eq!(sheet.value(3, 1), CellValue::from("a"));
        assert_eq!(sheet.columns.width(3), 30.0);

        sheet.delete_column(2).unwrap();
        assert_eq!(sheet.value(1, 2), CellValue::from("b"));
        assert_eq!(sheet.columns.width(2), 30.0);
        let columns: Vec<u32> = sheet.rows.get(1).unwrap().cells.iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec![1, 2]);
    }

    #[test]
    fn test_column_insert_overflow_leaves_sheet_unchanged() {
        let mut sheet = Worksheet::new("Data");
        sheet.set_value(1, MAX_COLS, "edge").unwrap();
        sheet.set_value(1, 1, "start").unwrap();
        assert!(sheet.insert_column(1).is_err());
        assert_eq!(sheet.value(1, 1), CellValue::from("start"));
        assert_eq!(sheet.value(1, MAX_COLS), CellValue::from("edge"));
    }

    #[test]
    fn test_merges() {
        let mut sheet = Worksheet::new("Data");
        sheet.merge(&CellRange::parse("B2:D3").unwrap()).unwrap();
        let cell = sheet.cell(2, 2).unwrap();
        assert_eq!((cell.merge_down, cell.merge_across), (1, 2));
        assert!(cell.is_used());

        let merges: Vec<String> = sheet.merges().iter().map(CellRange::to_a1_string).collect();
        assert_eq!(merges, vec!["B2:D3"]);
    }

    #[test]
    fn test_copy_cell_and_clear() {
        let mut sheet = Worksheet::new("Data");
        sheet.cell_mut(1, 1).unwrap().style_index = 3;
        sheet.set_value(1, 1, 7).unwrap();
        let from = CellAddress::new(1, 1);
        let to = from.offset(2, 1).unwrap();
        sheet.copy_cell(from, to).unwrap();
        assert_eq!(sheet.cell(3, 2).unwrap().style_index, 3);
        assert_eq!(sheet.value(3, 2), CellValue::Number(7.0));

        sheet.clear_cell(1, 1);
        assert!(!sheet.cell(1, 1).unwrap().is_used());
    }

    #[test]
    fn test_row_height_fallback() {
        let mut sheet = Worksheet::new("Data");
        sheet.set_default_row_height(20.0);
        assert_eq!(sheet.row_height(5), 20.0);
        sheet.rows.get_mut(5).unwrap().set_height(40.0);
        assert_eq!(sheet.row_height(5), 40.0);
    }
}
