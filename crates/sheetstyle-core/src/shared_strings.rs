//! Workbook shared string pool

use ahash::AHashMap;

use crate::cell::RichString;

/// Shared strings in `sharedStrings.xml` order
///
/// Plain strings are found through a hash index; rich strings are compared
/// run by run.
#[derive(Debug, Clone, Default)]
pub struct SharedStringTable {
    items: Vec<RichString>,
    index: AHashMap<String, u32>,
}

impl SharedStringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of an equal string
    pub fn lookup(&self, value: &RichString) -> Option<u32> {
        match value.as_plain() {
            Some(text) => self.index.get(text).copied(),
            None => self
                .items
                .iter()
                .position(|item| item == value)
                .map(|index| index as u32),
        }
    }

    /// Add a string, returning the index of an equal one if present
    pub fn insert(&mut self, value: RichString) -> u32 {
        if let Some(index) = self.lookup(&value) {
            return index;
        }
        let index = self.items.len() as u32;
        if let Some(text) = value.as_plain() {
            self.index.insert(text.to_string(), index);
        }
        self.items.push(value);
        index
    }

    /// Append a string read from a package without deduplicating
    ///
    /// Cells refer to strings by position, so duplicates in a package must
    /// keep their own slots.
    pub fn push(&mut self, value: RichString) -> u32 {
        let index = self.items.len() as u32;
        if let Some(text) = value.as_plain() {
            self.index.entry(text.to_string()).or_insert(index);
        }
        self.items.push(value);
        index
    }

    pub fn get(&self, index: u32) -> Option<&RichString> {
        self.items.get(index as usize)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RichString> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::TextRun;
    use crate::style::Font;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_strings_dedupe() {
        let mut table = SharedStringTable::new();
        assert_eq!(table.insert(RichString::plain("a")), 0);
        assert_eq!(table.insert(RichString::plain("b")), 1);
        assert_eq!(table.insert(RichString::plain("a")), 0);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_rich_strings_dedupe_structurally() {
        let mut table = SharedStringTable::new();
        let rich = RichString::from_runs(vec![
            TextRun::plain("x"),
            TextRun::with_font("y", Font::new().with_bold(true)),
        ]);
        let first = table.insert(rich.clone());
        assert_eq!(table.insert(rich), first);

        let italic = RichString::from_runs(vec![
            TextRun::plain("x"),
            TextRun::with_font("y", Font::new().with_italic(true)),
        ]);
        assert_ne!(table.insert(italic), first);
        assert_eq!(table.get(first).map(RichString::text), Some("xy".to_string()));
    }

    #[test]
    fn test_push_keeps_duplicates() {
        let mut table = SharedStringTable::new();
        table.push(RichString::plain("a"));
        assert_eq!(table.push(RichString::plain("a")), 1);
        assert_eq!(table.insert(RichString::plain("a")), 0);
    }
}
