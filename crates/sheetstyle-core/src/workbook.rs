//! Workbook type - the main document structure
//!
//! Worksheets are addressed by 1-based position. The workbook owns the
//! style registry, so every formatting change goes through here: the
//! `*_range` methods split-borrow the registry and one grid element's style
//! slot into a [`Range`].

use crate::cell::measure;
use crate::cell::{Cell, CellValue, HyperlinkTarget};
use crate::column::DEFAULT_COLUMN_WIDTH;
use crate::error::{Axis, Error, Result};
use crate::named_range::DefinedNames;
use crate::range::Range;
use crate::settings::{Locale, WorkbookSettings};
use crate::shared_strings::SharedStringTable;
use crate::style::{Color, Font, StyleRegistry};
use crate::worksheet::{SheetVisibility, Worksheet};
use crate::{MAX_COLS, MAX_SHEET_NAME_LEN};

/// Characters that cannot appear in a sheet name
const ILLEGAL_SHEET_NAME_CHARS: &[char] = &['/', '\\', ':', '[', ']', '?', '*'];

/// Reserved sheet name
const RESERVED_SHEET_NAME: &str = "history";

/// Make a name legal as a sheet name
///
/// Illegal characters become underscores, surrounding apostrophes are
/// dropped, the reserved name gets a trailing space and the result is cut to
/// the maximum length.
pub fn legal_sheet_name(name: &str) -> String {
    let mut name: String = name
        .chars()
        .map(|c| if ILLEGAL_SHEET_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect();
    if name.starts_with('\'') {
        name.remove(0);
    }
    if name.ends_with('\'') {
        name.pop();
    }
    if name.eq_ignore_ascii_case(RESERVED_SHEET_NAME) {
        name.push(' ');
    }
    name.chars().take(MAX_SHEET_NAME_LEN).collect()
}

/// A workbook (spreadsheet document)
#[derive(Debug, Clone)]
pub struct Workbook {
    /// Formatting tables shared by every worksheet
    pub styles: StyleRegistry,
    worksheets: Vec<Worksheet>,
    /// Defined names, including print areas and titles
    pub defined_names: DefinedNames,
    shared_strings: SharedStringTable,
    settings: WorkbookSettings,
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    /// Create a new workbook with one worksheet
    pub fn new() -> Self {
        Self::with_settings(WorkbookSettings::default())
    }

    /// Create a new workbook with one worksheet and the given settings
    pub fn with_settings(settings: WorkbookSettings) -> Self {
        let mut workbook = Self::empty(settings);
        workbook.push_worksheet(Worksheet::new("Sheet1"));
        workbook.set_active_sheet_unchecked(1);
        workbook
    }

    /// Create a workbook with no worksheets, to be filled from a package
    pub fn empty(settings: WorkbookSettings) -> Self {
        Self {
            styles: StyleRegistry::new(),
            worksheets: Vec::new(),
            defined_names: DefinedNames::new(),
            shared_strings: SharedStringTable::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &WorkbookSettings {
        &self.settings
    }

    /// Locale used to render formatted text
    pub fn locale(&self) -> &Locale {
        &self.settings.locale
    }

    /// Change the locale; cached display patterns are dropped
    pub fn set_locale(&mut self, locale: Locale) {
        self.settings.locale = locale;
        self.styles.number_formats.reset_patterns();
    }

    /// Shared string pool as last loaded or rebuilt
    pub fn shared_strings(&self) -> &SharedStringTable {
        &self.shared_strings
    }

    pub fn shared_strings_mut(&mut self) -> &mut SharedStringTable {
        &mut self.shared_strings
    }

    /// Rebuild the shared string pool from the cells, in sheet and row order
    pub fn rebuild_shared_strings(&mut self) -> &SharedStringTable {
        self.shared_strings.clear();
        for sheet in &self.worksheets {
            for (_, row) in sheet.rows.iter() {
                for (_, cell) in row.cells.iter() {
                    if let CellValue::SharedString(text) = &cell.value {
                        if !text.is_empty() {
                            self.shared_strings.insert(text.clone());
                        }
                    }
                }
            }
        }
        &self.shared_strings
    }

    // ==================== Worksheets ====================

    pub fn sheet_count(&self) -> u32 {
        self.worksheets.len() as u32
    }

    fn position(&self, index: u32) -> Result<usize> {
        Error::check_bounds(Axis::Worksheet, index, 1, self.sheet_count())?;
        Ok(index as usize - 1)
    }

    /// Worksheet by 1-based position
    pub fn worksheet(&self, index: u32) -> Result<&Worksheet> {
        let pos = self.position(index)?;
        Ok(&self.worksheets[pos])
    }

    pub fn worksheet_mut(&mut self, index: u32) -> Result<&mut Worksheet> {
        let pos = self.position(index)?;
        Ok(&mut self.worksheets[pos])
    }

    /// 1-based position of a worksheet, matching names case-insensitively
    pub fn sheet_index(&self, name: &str) -> Option<u32> {
        let name = name.to_lowercase();
        self.worksheets
            .iter()
            .position(|sheet| sheet.name().to_lowercase() == name)
            .map(|pos| pos as u32 + 1)
    }

    pub fn worksheet_by_name(&self, name: &str) -> Result<&Worksheet> {
        let index = self
            .sheet_index(name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))?;
        self.worksheet(index)
    }

    pub fn worksheet_by_name_mut(&mut self, name: &str) -> Result<&mut Worksheet> {
        let index = self
            .sheet_index(name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))?;
        self.worksheet_mut(index)
    }

    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Legal name not used by any other worksheet
    ///
    /// An empty name becomes `SheetN`; clashes get a ` (n)` suffix that
    /// stays within the length limit.
    pub fn unique_sheet_name(&self, name: &str) -> String {
        self.unique_sheet_name_excluding(name, None)
    }

    fn unique_sheet_name_excluding(&self, name: &str, exclude: Option<usize>) -> String {
        let taken = |candidate: &str| {
            let candidate = candidate.to_lowercase();
            self.worksheets
                .iter()
                .enumerate()
                .any(|(pos, sheet)| Some(pos) != exclude && sheet.name().to_lowercase() == candidate)
        };

        let name = legal_sheet_name(name);
        if name.is_empty() {
            let mut n = self.worksheets.len() + 1;
            while taken(&format!("Sheet{n}")) {
                n += 1;
            }
            return format!("Sheet{n}");
        }

        let mut candidate = name.clone();
        let mut version = 2;
        while taken(&candidate) {
            let suffix = format!(" ({version})");
            let keep = MAX_SHEET_NAME_LEN.saturating_sub(suffix.chars().count());
            candidate = name.chars().take(keep).collect::<String>() + &suffix;
            version += 1;
        }
        candidate
    }

    fn new_worksheet(&self, name: &str) -> Worksheet {
        let mut sheet = Worksheet::new(self.unique_sheet_name(name));
        sheet.set_default_row_height(self.settings.default_row_height);
        sheet.set_max_column_width(self.settings.max_column_width);
        sheet
    }

    /// Append a worksheet as is; used when loading a package
    pub fn push_worksheet(&mut self, worksheet: Worksheet) -> u32 {
        self.worksheets.push(worksheet);
        self.sheet_count()
    }

    /// Add a blank worksheet after the last one
    pub fn add(&mut self, name: &str) -> u32 {
        let sheet = self.new_worksheet(name);
        self.push_worksheet(sheet)
    }

    /// Insert a blank worksheet at a 1-based position
    pub fn insert(&mut self, index: u32, name: &str) -> Result<u32> {
        Error::check_bounds(Axis::Worksheet, index, 1, self.sheet_count() + 1)?;
        let sheet = self.new_worksheet(name);
        self.worksheets.insert(index as usize - 1, sheet);
        Ok(index)
    }

    /// Delete a worksheet and the names pointing at it
    pub fn delete(&mut self, index: u32) -> Result<Worksheet> {
        let pos = self.position(index)?;
        if self.worksheets.len() == 1 {
            return Err(Error::UnsupportedOperation(
                "cannot delete the last worksheet".into(),
            ));
        }

        let was_active = self.active_sheet() == index;
        let removed = self.worksheets.remove(pos);
        self.defined_names.delete_sheet_names(removed.name());
        if was_active {
            let next = self.first_visible().unwrap_or(1);
            self.set_active_sheet_unchecked(next);
        }
        log::debug!("deleted worksheet '{}'", removed.name());
        Ok(removed)
    }

    /// Rename a worksheet, keeping names and links pointing at it
    ///
    /// The new name is made legal and unique first; the name actually used
    /// is returned.
    pub fn rename(&mut self, index: u32, name: &str) -> Result<String> {
        let pos = self.position(index)?;
        let new = self.unique_sheet_name_excluding(name, Some(pos));
        let old = self.worksheets[pos].name().to_string();

        self.worksheets[pos].set_name(new.clone());
        self.defined_names.rename_sheet(&old, &new);
        for sheet in &mut self.worksheets {
            sheet.rename_link_targets(&old, &new);
        }
        Ok(new)
    }

    /// Append a copy of a worksheet under a new name
    pub fn copy_worksheet(&mut self, index: u32, name: &str) -> Result<u32> {
        let pos = self.position(index)?;
        let copy = self.worksheets[pos].copy(self.unique_sheet_name(name));
        Ok(self.push_worksheet(copy))
    }

    fn first_visible(&self) -> Option<u32> {
        self.worksheets
            .iter()
            .position(Worksheet::is_visible)
            .map(|pos| pos as u32 + 1)
    }

    /// Show or hide a worksheet
    ///
    /// At least one worksheet must stay visible. Hiding the active sheet
    /// activates the first visible one.
    pub fn set_visibility(&mut self, index: u32, visibility: SheetVisibility) -> Result<()> {
        let pos = self.position(index)?;
        if visibility != SheetVisibility::Visible {
            let others_visible = self
                .worksheets
                .iter()
                .enumerate()
                .any(|(other, sheet)| other != pos && sheet.is_visible());
            if !others_visible {
                return Err(Error::UnsupportedOperation(
                    "cannot hide the last visible worksheet".into(),
                ));
            }
        }

        let was_active = self.active_sheet() == index;
        self.worksheets[pos].set_visibility(visibility);
        if was_active && visibility != SheetVisibility::Visible {
            if let Some(next) = self.first_visible() {
                self.set_active_sheet_unchecked(next);
            }
        }
        Ok(())
    }

    /// 1-based position of the selected tab, the first sheet if none is
    pub fn active_sheet(&self) -> u32 {
        self.worksheets
            .iter()
            .position(|sheet| sheet.view.selected)
            .map(|pos| pos as u32 + 1)
            .unwrap_or(1)
    }

    pub fn set_active_sheet(&mut self, index: u32) -> Result<()> {
        self.position(index)?;
        self.set_active_sheet_unchecked(index);
        Ok(())
    }

    fn set_active_sheet_unchecked(&mut self, index: u32) {
        for (pos, sheet) in self.worksheets.iter_mut().enumerate() {
            sheet.view.selected = pos as u32 + 1 == index;
        }
    }

    // ==================== Cells ====================

    /// Set a cell value
    pub fn set_value<V: Into<CellValue>>(
        &mut self,
        sheet: u32,
        row: u32,
        column: u32,
        value: V,
    ) -> Result<()> {
        self.worksheet_mut(sheet)?.set_value(row, column, value)
    }

    fn cell_mut(&mut self, sheet: u32, row: u32, column: u32) -> Result<&mut Cell> {
        self.worksheet_mut(sheet)?.cell_mut(row, column)
    }

    /// Style view over a cell
    pub fn cell_range(&mut self, sheet: u32, row: u32, column: u32) -> Result<Range<'_>> {
        let pos = self.position(sheet)?;
        let cell = self.worksheets[pos].cell_mut(row, column)?;
        Ok(Range::new(&mut self.styles, &mut cell.style_index))
    }

    /// Style view over a row's own format
    pub fn row_range(&mut self, sheet: u32, row: u32) -> Result<Range<'_>> {
        let pos = self.position(sheet)?;
        let row = self.worksheets[pos].rows.get_mut(row)?;
        Ok(Range::new(&mut self.styles, &mut row.style_index))
    }

    /// Style view over a column's own format
    pub fn column_range(&mut self, sheet: u32, column: u32) -> Result<Range<'_>> {
        let pos = self.position(sheet)?;
        let column = self.worksheets[pos].columns.get_mut(column)?;
        Ok(Range::new(&mut self.styles, &mut column.style_index))
    }

    /// Cell value rendered through its number format
    pub fn cell_text(&self, sheet: u32, row: u32, column: u32) -> Result<String> {
        match self.worksheet(sheet)?.cell(row, column) {
            Some(cell) => {
                self.styles
                    .formatted_value(cell.style_index, &cell.value, &self.settings.locale)
            }
            None => Ok(String::new()),
        }
    }

    /// Append a run of text with its own font to a cell
    pub fn append_font_string(
        &mut self,
        sheet: u32,
        row: u32,
        column: u32,
        font: Font,
        text: &str,
    ) -> Result<()> {
        self.cell_mut(sheet, row, column)?
            .append_font_string(font, text);
        Ok(())
    }

    /// Link a cell to another cell; the link is shown blue and underlined
    pub fn set_hyperlink(
        &mut self,
        sheet: u32,
        row: u32,
        column: u32,
        target: HyperlinkTarget,
    ) -> Result<()> {
        let pos = self.position(sheet)?;
        let cell = self.worksheets[pos].cell_mut(row, column)?;
        cell.hyperlink = Some(target);
        cell.style_index = self.styles.update_font(cell.style_index, |font| {
            font.set_color(Color::rgb("#0000FF"));
            font.set_underline(true);
        });
        Ok(())
    }

    // ==================== AutoFit ====================

    /// Width a cell's formatted text needs at its font size
    pub fn required_width(&self, sheet: u32, row: u32, column: u32) -> Result<f64> {
        let worksheet = self.worksheet(sheet)?;
        let Some(cell) = worksheet.cell(row, column) else {
            return Ok(0.0);
        };
        let text = self
            .styles
            .formatted_value(cell.style_index, &cell.value, &self.settings.locale)?;
        Ok(measure::required_width(
            text.chars().count(),
            self.styles.effective_font_size(cell.style_index),
            worksheet.row_height(row),
        ))
    }

    /// Height a cell's formatted text needs when it wraps in its column
    pub fn required_height(&self, sheet: u32, row: u32, column: u32) -> Result<f64> {
        let worksheet = self.worksheet(sheet)?;
        let Some(cell) = worksheet.cell(row, column) else {
            return Ok(0.0);
        };
        let text = self
            .styles
            .formatted_value(cell.style_index, &cell.value, &self.settings.locale)?;
        Ok(measure::required_height(
            text.chars().count(),
            self.styles.effective_font_size(cell.style_index),
            worksheet.columns.width(column),
            self.styles.effective_alignment(cell.style_index).wrap_text,
        ))
    }

    /// Size a column to its widest cell
    ///
    /// Nothing changes when no cell needs room or the widest one needs
    /// exactly the default width.
    pub fn autofit_column(&mut self, sheet: u32, column: u32) -> Result<()> {
        Error::check_bounds(Axis::Column, column, 1, MAX_COLS)?;
        let rows: Vec<u32> = self
            .worksheet(sheet)?
            .rows
            .iter()
            .filter(|(_, row)| row.cells.contains(column))
            .map(|(index, _)| index)
            .collect();

        let mut widest = 0.0_f64;
        for row in rows {
            widest = widest.max(self.required_width(sheet, row, column)?);
        }

        if widest > 0.0 && widest != DEFAULT_COLUMN_WIDTH {
            let column = self.worksheet_mut(sheet)?.columns.get_mut(column)?;
            column.set_width(widest);
            column.best_fit = true;
            column.custom_width = true;
        }
        Ok(())
    }

    /// Size every column holding cells or metadata
    pub fn autofit(&mut self, sheet: u32) -> Result<()> {
        let worksheet = self.worksheet(sheet)?;
        let last = worksheet
            .columns
            .max_index()
            .max(worksheet.rows.max_column())
            .unwrap_or(0);
        for column in 1..=last {
            self.autofit_column(sheet, column)?;
        }
        Ok(())
    }

    // ==================== Print names ====================

    /// Print area of a worksheet as local addresses
    pub fn print_area(&self, sheet: u32) -> Result<Option<String>> {
        let name = self.worksheet(sheet)?.name();
        Ok(self.defined_names.print_area(name))
    }

    pub fn set_print_area(&mut self, sheet: u32, local_addresses: &str) -> Result<()> {
        let name = self.worksheet(sheet)?.name().to_string();
        self.defined_names.set_print_area(&name, local_addresses);
        Ok(())
    }

    /// Rows or columns repeated on every printed page
    pub fn print_titles(&self, sheet: u32) -> Result<Option<String>> {
        let name = self.worksheet(sheet)?.name();
        Ok(self.defined_names.print_titles(name))
    }

    pub fn set_print_titles(&mut self, sheet: u32, local_addresses: &str) -> Result<()> {
        let name = self.worksheet(sheet)?.name().to_string();
        self.defined_names.set_print_titles(&name, local_addresses);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CellAddress, RichString};
    use crate::named_range::{DefinedName, NameScope};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_workbook() {
        let workbook = Workbook::new();
        assert_eq!(workbook.sheet_count(), 1);
        assert_eq!(workbook.worksheet(1).unwrap().name(), "Sheet1");
        assert_eq!(workbook.active_sheet(), 1);
        assert!(matches!(
            workbook.worksheet(0),
            Err(Error::OutOfRange {
                axis: Axis::Worksheet,
                ..
            })
        ));
    }

    #[test]
    fn test_legal_sheet_names() {
        assert_eq!(legal_sheet_name("a/b\\c:d[e]f?g*h"), "a_b_c_d_e_f_g_h");
        assert_eq!(legal_sheet_name("'quoted'"), "quoted");
        assert_eq!(legal_sheet_name("History"), "History ");
        assert_eq!(legal_sheet_name(&"x".repeat(40)).len(), MAX_SHEET_NAME_LEN);
    }

    #[test]
    fn test_unique_sheet_names() {
        let mut workbook = Workbook::new();
        assert_eq!(workbook.add("Data"), 2);
        workbook.add("data");
        workbook.add("DATA");
        let names: Vec<&str> = workbook.worksheets().map(Worksheet::name).collect();
        assert_eq!(names, vec!["Sheet1", "Data", "data (2)", "DATA (3)"]);

        let long = "y".repeat(31);
        workbook.add(&long);
        let index = workbook.add(&long);
        let name = workbook.worksheet(index).unwrap().name().to_string();
        assert_eq!(name.chars().count(), MAX_SHEET_NAME_LEN);
        assert!(name.ends_with(" (2)"));

        assert_eq!(workbook.unique_sheet_name(""), "Sheet7");
    }

    #[test]
    fn test_cannot_delete_last_sheet() {
        let mut workbook = Workbook::new();
        assert!(matches!(
            workbook.delete(1),
            Err(Error::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_delete_removes_names_and_moves_active() {
        let mut workbook = Workbook::new();
        workbook.add("Report");
        workbook.set_print_area(2, "$A$1:$C$3").unwrap();
        workbook.set_active_sheet(2).unwrap();

        workbook.delete(2).unwrap();
        assert!(workbook.defined_names.is_empty());
        assert_eq!(workbook.active_sheet(), 1);
    }

    #[test]
    fn test_rename_updates_references() {
        let mut workbook = Workbook::new();
        workbook.add("Data");
        workbook.defined_names.insert(DefinedName::parse(
            "Totals",
            "Data!$A$1",
            NameScope::Workbook,
        ));
        workbook
            .set_hyperlink(1, 1, 1, HyperlinkTarget::new("Data", CellAddress::new(1, 1)))
            .unwrap();

        let name = workbook.rename(2, "Q1: Data").unwrap();
        assert_eq!(name, "Q1_ Data");
        let (_, totals) = workbook.defined_names.iter().next().unwrap();
        assert_eq!(totals.refers_to(), "'Q1_ Data'!$A$1");
        let link = workbook.worksheet(1).unwrap().cell(1, 1).unwrap();
        assert_eq!(link.hyperlink.as_ref().unwrap().to_string(), "'Q1_ Data'!A1");

        assert_eq!(workbook.rename(2, "q1_ data").unwrap(), "q1_ data");
    }

    #[test]
    fn test_visibility_guard() {
        let mut workbook = Workbook::new();
        assert!(matches!(
            workbook.set_visibility(1, SheetVisibility::Hidden),
            Err(Error::UnsupportedOperation(_))
        ));

        workbook.add("Other");
        workbook.set_visibility(1, SheetVisibility::VeryHidden).unwrap();
        assert_eq!(workbook.active_sheet(), 2);
        assert!(workbook.set_visibility(2, SheetVisibility::Hidden).is_err());
    }

    #[test]
    fn test_insert_shifts_sheets() {
        let mut workbook = Workbook::new();
        workbook.insert(1, "First").unwrap();
        assert_eq!(workbook.worksheet(1).unwrap().name(), "First");
        assert_eq!(workbook.sheet_index("sheet1"), Some(2));
        assert!(workbook.insert(4, "Late").is_err());
    }

    #[test]
    fn test_bold_cell() {
        let mut workbook = Workbook::new();
        workbook.set_value(1, 1, 1, "Hello").unwrap();
        workbook.cell_range(1, 1, 1).unwrap().set_bold(true);

        let style_index = workbook.worksheet(1).unwrap().cell(1, 1).unwrap().style_index;
        assert_eq!(style_index, 1);
        assert!(workbook.styles.effective_font(style_index).bold());
        assert_eq!(workbook.styles.fonts.len(), 2);
        assert_eq!(workbook.styles.cell_formats.len(), 2);
        assert_eq!(workbook.cell_text(1, 1, 1).unwrap(), "Hello");

        let neighbour = workbook.worksheet(1).unwrap().cell(1, 2).map_or(0, |c| c.style_index);
        assert_ne!(neighbour, style_index);
        assert!(!workbook.styles.effective_font(neighbour).bold());
        assert!(!workbook.styles.default_font().bold());
    }

    #[test]
    fn test_bold_leaves_sharing_cell_alone() {
        let mut workbook = Workbook::new();
        workbook.cell_range(1, 1, 1).unwrap().set_fill_color(Color::rgb("#00FF00"));
        workbook.cell_range(1, 2, 1).unwrap().set_fill_color(Color::rgb("#00FF00"));
        let shared = workbook.worksheet(1).unwrap().cell(1, 1).unwrap().style_index;
        assert_eq!(workbook.worksheet(1).unwrap().cell(2, 1).unwrap().style_index, shared);
        let font_before = workbook.styles.effective_font(shared);

        workbook.cell_range(1, 2, 1).unwrap().set_bold(true);

        let sheet = workbook.worksheet(1).unwrap();
        let first = sheet.cell(1, 1).unwrap().style_index;
        let second = sheet.cell(2, 1).unwrap().style_index;
        assert_eq!(first, shared);
        assert_ne!(first, second);
        assert_eq!(workbook.styles.effective_font(first), font_before);
        assert!(!workbook.styles.effective_font(first).bold());
        assert!(workbook.styles.effective_font(second).bold());
        assert_eq!(
            workbook.styles.effective_fill(second).foreground().rgb_value(),
            Some("#00FF00")
        );
    }

    #[test]
    fn test_row_and_column_ranges() {
        let mut workbook = Workbook::new();
        workbook.row_range(1, 3).unwrap().set_italic(true);
        workbook.column_range(1, 2).unwrap().set_fill_color(Color::rgb("#FFFF00"));

        let sheet = workbook.worksheet(1).unwrap();
        let row_style = sheet.rows.get(3).unwrap().style_index;
        let column_style = sheet.columns.get(2).unwrap().style_index;
        assert!(workbook.styles.effective_font(row_style).italic());
        assert!(!workbook.styles.equals_style(row_style, column_style));
    }

    #[test]
    fn test_hyperlink_styles_cell() {
        let mut workbook = Workbook::new();
        workbook
            .set_hyperlink(1, 2, 2, HyperlinkTarget::new("Sheet1", CellAddress::new(9, 1)))
            .unwrap();
        let style_index = workbook.worksheet(1).unwrap().cell(2, 2).unwrap().style_index;
        let font = workbook.styles.effective_font(style_index);
        assert!(font.underline());
        assert_eq!(font.color().and_then(Color::rgb_value), Some("#0000FF"));
    }

    #[test]
    fn test_autofit() {
        let mut workbook = Workbook::new();
        workbook.set_value(1, 1, 1, "a fairly long piece of text").unwrap();
        workbook.set_value(1, 2, 1, "short").unwrap();
        workbook.set_value(1, 1, 3, "").unwrap();
        workbook.autofit(1).unwrap();

        let sheet = workbook.worksheet(1).unwrap();
        let column = sheet.columns.get(1).unwrap();
        assert!(column.best_fit && column.custom_width);
        let expected = measure::required_width(27, 11.0, 15.0) + 0.83;
        assert!((column.raw_width() - expected).abs() < 1e-9);
        assert!(sheet.columns.get(3).is_none());
    }

    #[test]
    fn test_rebuild_shared_strings() {
        let mut workbook = Workbook::new();
        workbook.set_value(1, 1, 1, "a").unwrap();
        workbook.set_value(1, 2, 1, "b").unwrap();
        workbook.set_value(1, 3, 1, "a").unwrap();
        workbook.set_value(1, 4, 1, 5).unwrap();
        workbook
            .append_font_string(1, 5, 1, Font::new().with_bold(true), "c")
            .unwrap();

        let strings = workbook.rebuild_shared_strings();
        assert_eq!(strings.len(), 3);
        assert_eq!(strings.lookup(&RichString::plain("b")), Some(1));
    }

    #[test]
    fn test_locale_change_rerenders() {
        let mut workbook = Workbook::new();
        workbook.set_value(1, 1, 1, 1234.5).unwrap();
        workbook.cell_range(1, 1, 1).unwrap().set_number_format("#,##0.00");
        assert_eq!(workbook.cell_text(1, 1, 1).unwrap(), "1,234.50");

        workbook.set_locale(Locale::new(",", ".", "€"));
        assert_eq!(workbook.cell_text(1, 1, 1).unwrap(), "1.234,50");
    }
}
