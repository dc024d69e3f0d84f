//! Defined names
//!
//! A defined name maps a name to one or more addresses on a single
//! worksheet, e.g. `'Q1 Sales'!$A$1:$D$10,'Q1 Sales'!$F$1`. Print areas and
//! print titles are defined names with reserved `_xlnm.` names and
//! worksheet scope.

use std::collections::BTreeMap;

use crate::cell::{quote_sheet_name, split_sheet_reference};
use crate::style::first_unused_key;

/// Reserved name of a worksheet's print area
pub const PRINT_AREA: &str = "_xlnm.Print_Area";

/// Reserved name of a worksheet's repeated print titles
pub const PRINT_TITLES: &str = "_xlnm.Print_Titles";

/// Scope of a defined name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NameScope {
    /// Visible throughout the workbook
    #[default]
    Workbook,
    /// Local to the worksheet its addresses point at (`localSheetId`)
    Worksheet,
}

/// A defined name
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefinedName {
    /// The name; compared case-insensitively
    pub name: String,
    /// Worksheet the addresses refer to
    pub sheet: Option<String>,
    /// Addresses without the sheet part
    pub addresses: Vec<String>,
    pub scope: NameScope,
}

/// Split a reference list on commas outside quoted sheet names
///
/// Apostrophes inside a quoted name are doubled, so toggling on every
/// apostrophe keeps track of whether a comma is quoted.
fn split_references(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    for (pos, c) in text.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            ',' if !quoted => {
                parts.push(&text[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

impl DefinedName {
    /// Parse a name from its reference text
    ///
    /// Names cannot span worksheets; the sheet of the first address is the
    /// sheet of the name.
    pub fn parse<S: Into<String>>(name: S, refers_to: &str, scope: NameScope) -> Self {
        let mut sheet = None;
        let mut addresses = Vec::new();
        for reference in split_references(refers_to.trim_start_matches('=')) {
            let (reference_sheet, local) = split_sheet_reference(reference.trim());
            if sheet.is_none() {
                sheet = reference_sheet;
            }
            addresses.push(local.to_string());
        }
        Self {
            name: name.into(),
            sheet,
            addresses,
            scope,
        }
    }

    /// Build a name from local addresses on a worksheet
    pub fn on_sheet<S: Into<String>>(
        name: S,
        sheet: &str,
        local_addresses: &str,
        scope: NameScope,
    ) -> Self {
        Self {
            name: name.into(),
            sheet: Some(sheet.to_string()),
            addresses: split_references(local_addresses)
                .into_iter()
                .map(|a| a.trim().to_string())
                .collect(),
            scope,
        }
    }

    /// Fully qualified reference text, as written to the package
    pub fn refers_to(&self) -> String {
        match &self.sheet {
            Some(sheet) => {
                let sheet = quote_sheet_name(sheet);
                self.addresses
                    .iter()
                    .map(|address| format!("{sheet}!{address}"))
                    .collect::<Vec<_>>()
                    .join(",")
            }
            None => self.local_addresses(),
        }
    }

    /// Addresses without sheet names
    pub fn local_addresses(&self) -> String {
        self.addresses.join(",")
    }

    fn is_on_sheet(&self, sheet: &str) -> bool {
        self.sheet
            .as_deref()
            .is_some_and(|own| own.to_lowercase() == sheet.to_lowercase())
    }

    /// Whether two names collide: same sheet, name and scope
    pub fn same_name(&self, other: &DefinedName) -> bool {
        self.name.to_lowercase() == other.name.to_lowercase()
            && self.scope == other.scope
            && match &other.sheet {
                Some(sheet) => self.is_on_sheet(sheet),
                None => self.sheet.is_none(),
            }
    }
}

/// Defined names of a workbook, keyed by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinedNames {
    names: BTreeMap<u32, DefinedName>,
}

impl DefinedNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of a name with the same sheet, name and scope
    pub fn find(&self, name: &DefinedName) -> Option<u32> {
        self.names
            .iter()
            .find(|(_, existing)| existing.same_name(name))
            .map(|(&id, _)| id)
    }

    /// Add a name, or replace the addresses of the name it collides with
    pub fn insert(&mut self, name: DefinedName) -> u32 {
        if let Some(id) = self.find(&name) {
            if let Some(existing) = self.names.get_mut(&id) {
                existing.addresses = name.addresses;
            }
            return id;
        }
        let id = first_unused_key(&self.names);
        self.names.insert(id, name);
        id
    }

    /// Store a name under a given id
    pub fn insert_at(&mut self, id: u32, name: DefinedName) {
        self.names.insert(id, name);
    }

    pub fn get(&self, id: u32) -> Option<&DefinedName> {
        self.names.get(&id)
    }

    pub fn delete(&mut self, id: u32) -> Option<DefinedName> {
        self.names.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &DefinedName)> {
        self.names.iter().map(|(&id, name)| (id, name))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Remove every name pointing at a worksheet
    pub fn delete_sheet_names(&mut self, sheet: &str) {
        self.names.retain(|_, name| !name.is_on_sheet(sheet));
    }

    /// Point names at a renamed worksheet
    pub fn rename_sheet(&mut self, old: &str, new: &str) {
        for name in self.names.values_mut() {
            if name.is_on_sheet(old) {
                name.sheet = Some(new.to_string());
            }
        }
    }

    fn reserved(&self, sheet: &str, reserved: &str) -> Option<&DefinedName> {
        self.names
            .values()
            .find(|name| name.is_on_sheet(sheet) && name.name == reserved)
    }

    /// Print area of a worksheet as local addresses
    pub fn print_area(&self, sheet: &str) -> Option<String> {
        self.reserved(sheet, PRINT_AREA)
            .map(DefinedName::local_addresses)
    }

    /// Set the print area of a worksheet from local addresses
    pub fn set_print_area(&mut self, sheet: &str, local_addresses: &str) -> u32 {
        self.insert(DefinedName::on_sheet(
            PRINT_AREA,
            sheet,
            local_addresses,
            NameScope::Worksheet,
        ))
    }

    /// Print titles of a worksheet as local addresses
    pub fn print_titles(&self, sheet: &str) -> Option<String> {
        self.reserved(sheet, PRINT_TITLES)
            .map(DefinedName::local_addresses)
    }

    /// Set the rows or columns repeated on every printed page
    pub fn set_print_titles(&mut self, sheet: &str, local_addresses: &str) -> u32 {
        self.insert(DefinedName::on_sheet(
            PRINT_TITLES,
            sheet,
            local_addresses,
            NameScope::Worksheet,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_quoted_sheet_with_commas() {
        let name = DefinedName::parse(
            "Data",
            "'it''s, here'!$A$1:$B$2,'it''s, here'!$D$1",
            NameScope::Workbook,
        );
        assert_eq!(name.sheet.as_deref(), Some("it's, here"));
        assert_eq!(name.addresses, vec!["$A$1:$B$2", "$D$1"]);
        assert_eq!(name.refers_to(), "'it''s, here'!$A$1:$B$2,'it''s, here'!$D$1");
    }

    #[test]
    fn test_bare_sheet_names_stay_bare() {
        let name = DefinedName::parse("Data", "Sheet1!$A$1", NameScope::Workbook);
        assert_eq!(name.refers_to(), "Sheet1!$A$1");
        assert_eq!(name.local_addresses(), "$A$1");
    }

    #[test]
    fn test_insert_dedupes_case_insensitively() {
        let mut names = DefinedNames::new();
        let id = names.insert(DefinedName::parse("Rate", "Sheet1!$B$1", NameScope::Workbook));
        let again = names.insert(DefinedName::parse("RATE", "sheet1!$C$1", NameScope::Workbook));
        assert_eq!(id, again);
        assert_eq!(names.len(), 1);
        assert_eq!(names.get(id).unwrap().addresses, vec!["$C$1"]);

        let local = names.insert(DefinedName::parse("Rate", "Sheet1!$B$1", NameScope::Worksheet));
        assert_ne!(local, id);
    }

    #[test]
    fn test_ids_reuse_gaps() {
        let mut names = DefinedNames::new();
        names.insert(DefinedName::parse("a", "S!$A$1", NameScope::Workbook));
        let b = names.insert(DefinedName::parse("b", "S!$A$1", NameScope::Workbook));
        names.insert(DefinedName::parse("c", "S!$A$1", NameScope::Workbook));
        names.delete(b);
        assert_eq!(
            names.insert(DefinedName::parse("d", "S!$A$1", NameScope::Workbook)),
            b
        );
    }

    #[test]
    fn test_print_names() {
        let mut names = DefinedNames::new();
        names.set_print_area("Report", "$A$1:$F$40");
        names.set_print_titles("Report", "$1:$2");
        names.set_print_area("Report", "$A$1:$F$50");

        assert_eq!(names.len(), 2);
        assert_eq!(names.print_area("Report").as_deref(), Some("$A$1:$F$50"));
        assert_eq!(names.print_titles("report").as_deref(), Some("$1:$2"));
        assert_eq!(names.print_area("Other"), None);
    }

    #[test]
    fn test_sheet_bookkeeping() {
        let mut names = DefinedNames::new();
        names.set_print_area("Old", "$A$1");
        names.insert(DefinedName::parse("Keep", "Other!$A$1", NameScope::Workbook));

        names.rename_sheet("Old", "New");
        assert!(names.print_area("New").is_some());

        names.delete_sheet_names("New");
        assert_eq!(names.len(), 1);
        assert_eq!(names.print_area("New"), None);
    }
}
