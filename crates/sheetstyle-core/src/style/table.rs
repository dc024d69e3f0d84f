//! Interning table for formatting resources

use std::collections::BTreeMap;

/// Smallest key not present in a map, starting from zero
pub(crate) fn first_unused_key<V>(map: &BTreeMap<u32, V>) -> u32 {
    let mut candidate = 0;
    for &key in map.keys() {
        if key != candidate {
            break;
        }
        candidate += 1;
    }
    candidate
}

/// Deduplicating table mapping values to small integer ids
///
/// Lookups compare values structurally. New ids fill the first gap in the
/// key space, so deleting an entry frees its id for the next insert. Id 0
/// is the workbook default and survives [`InternTable::clear`].
#[derive(Debug, Clone)]
pub struct InternTable<T> {
    entries: BTreeMap<u32, T>,
}

impl<T> Default for InternTable<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<T: PartialEq> InternTable<T> {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table whose id 0 holds `default`
    pub fn with_default(default: T) -> Self {
        let mut table = Self::new();
        table.entries.insert(0, default);
        table
    }

    /// Find the id of an equal value
    pub fn lookup(&self, value: &T) -> Option<u32> {
        self.entries
            .iter()
            .find(|(_, existing)| *existing == value)
            .map(|(&id, _)| id)
    }

    /// Intern a value, returning the id of an equal entry if one exists
    pub fn insert(&mut self, value: T) -> u32 {
        if let Some(id) = self.lookup(&value) {
            return id;
        }
        let id = first_unused_key(&self.entries);
        self.entries.insert(id, value);
        id
    }

    /// Store a value under a fixed id, as read from a package
    ///
    /// Duplicates are kept so ids referenced by the file stay valid.
    pub fn insert_at(&mut self, id: u32, value: T) {
        self.entries.insert(id, value);
    }

    /// Get a value by id
    pub fn get(&self, id: u32) -> Option<&T> {
        self.entries.get(&id)
    }

    /// Whether an id is present
    pub fn contains(&self, id: u32) -> bool {
        self.entries.contains_key(&id)
    }

    /// Remove an entry; id 0 is never removed
    pub fn delete(&mut self, id: u32) -> Option<T> {
        if id == 0 {
            log::debug!("ignoring delete of default table entry");
            return None;
        }
        self.entries.remove(&id)
    }

    /// Remove everything except id 0
    pub fn clear(&mut self) {
        self.entries.retain(|&id, _| id == 0);
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.entries.iter().map(|(&id, value)| (id, value))
    }

    /// Highest id in use
    pub fn max_id(&self) -> Option<u32> {
        self.entries.keys().next_back().copied()
    }
}
