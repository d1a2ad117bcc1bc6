//! In-memory talk table
//!
//! Ordered records of `(id, position, data)`. An id may appear twice: the
//! first occurrence belongs to the primary (male) table, the second to the
//! secondary (female) table. Negative ids are literal entries whose data is
//! a plain integer rather than encoded text.

use crate::error::{Error, Result};
use indexmap::IndexMap;

/// Payload of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringData {
    /// Decoded or edited text
    Text(String),
    /// Stored integer of a negative-id entry
    Literal(i32),
    /// No string could be decoded at the entry's offset
    Missing,
}

/// One record of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlkString {
    pub id: i32,
    /// Index across both entry tables; sets output order
    pub position: usize,
    pub data: StringData,
}

impl TlkString {
    #[must_use]
    pub fn text(id: i32, position: usize, text: impl Into<String>) -> Self {
        Self {
            id,
            position,
            data: StringData::Text(text.into()),
        }
    }

    #[must_use]
    pub fn literal(id: i32, position: usize, value: i32) -> Self {
        Self {
            id,
            position,
            data: StringData::Literal(value),
        }
    }

    /// Negative ids never carry Huffman-coded text.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.id < 0
    }

    /// Text to encode for a non-literal entry (missing text encodes as empty)
    #[must_use]
    pub fn encodable_text(&self) -> std::borrow::Cow<'_, str> {
        match &self.data {
            StringData::Text(text) => std::borrow::Cow::Borrowed(text.as_str()),
            StringData::Literal(value) => std::borrow::Cow::Owned(value.to_string()),
            StringData::Missing => std::borrow::Cow::Borrowed(""),
        }
    }

    /// Value stored in the entry table for a literal entry
    ///
    /// # Errors
    /// Returns [`Error::InvalidLiteral`] if the data is not an integer.
    pub fn literal_value(&self) -> Result<i32> {
        match &self.data {
            StringData::Literal(value) => Ok(*value),
            StringData::Text(text) => text.trim().parse().map_err(|_| Error::InvalidLiteral {
                id: self.id,
                value: text.clone(),
            }),
            StringData::Missing => Err(Error::InvalidLiteral {
                id: self.id,
                value: String::new(),
            }),
        }
    }
}

/// Which entry table each record lands in, as indices into
/// [`StringTable::entries`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TablePlacement {
    pub primary: Vec<usize>,
    pub secondary: Vec<usize>,
}

/// Summary numbers for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub entries: usize,
    pub primary: usize,
    pub secondary: usize,
    pub literals: usize,
    pub missing: usize,
    pub characters: usize,
}

/// A talk table document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    pub entries: Vec<TlkString>,
}

impl StringTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_entries(entries: Vec<TlkString>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TlkString> {
        self.entries.iter()
    }

    fn next_position(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.position + 1)
            .max()
            .unwrap_or(0)
    }

    /// Append a text entry after the current last position. Returns the position.
    pub fn add_text(&mut self, id: i32, text: impl Into<String>) -> usize {
        let position = self.next_position();
        self.entries.push(TlkString::text(id, position, text));
        position
    }

    /// Append a literal entry after the current last position. Returns the position.
    pub fn add_literal(&mut self, id: i32, value: i32) -> usize {
        let position = self.next_position();
        self.entries.push(TlkString::literal(id, position, value));
        position
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&TlkString> {
        self.entries.iter().find(|e| e.position == position)
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut TlkString> {
        self.entries.iter_mut().find(|e| e.position == position)
    }

    /// All records carrying `id` (at most one per table in a valid table)
    pub fn find_by_id(&self, id: i32) -> impl Iterator<Item = &TlkString> {
        self.entries.iter().filter(move |e| e.id == id)
    }

    /// Replace the text at `position`
    ///
    /// # Returns
    /// `true` if the entry was found and updated
    pub fn update_text(&mut self, position: usize, text: impl Into<String>) -> bool {
        if let Some(entry) = self.get_mut(position) {
            entry.data = StringData::Text(text.into());
            true
        } else {
            false
        }
    }

    /// Remove the record at `position`
    pub fn remove(&mut self, position: usize) -> Option<TlkString> {
        let index = self.entries.iter().position(|e| e.position == position)?;
        Some(self.entries.remove(index))
    }

    /// Stable sort by position
    pub fn sort_by_position(&mut self) {
        self.entries.sort_by_key(|e| e.position);
    }

    /// Renumber positions 0.. in current order
    pub fn renumber(&mut self) {
        for (position, entry) in self.entries.iter_mut().enumerate() {
            entry.position = position;
        }
    }

    /// Split records into the two entry tables, visiting them in position
    /// order. The first occurrence of an id goes to the primary table, the
    /// second to the secondary one.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateStringId`] if an id occurs a third time.
    pub fn placement(&self) -> Result<TablePlacement> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by_key(|&i| self.entries[i].position);

        let mut primary: IndexMap<i32, usize> = IndexMap::new();
        let mut secondary: IndexMap<i32, usize> = IndexMap::new();

        for index in order {
            let id = self.entries[index].id;
            if !primary.contains_key(&id) {
                primary.insert(id, index);
            } else if !secondary.contains_key(&id) {
                secondary.insert(id, index);
            } else {
                return Err(Error::DuplicateStringId { id });
            }
        }

        Ok(TablePlacement {
            primary: primary.into_values().collect(),
            secondary: secondary.into_values().collect(),
        })
    }

    /// Number of records in the primary (male) table
    #[must_use]
    pub fn primary_len(&self) -> usize {
        let mut seen = std::collections::HashSet::new();
        self.entries.iter().filter(|e| seen.insert(e.id)).count()
    }

    #[must_use]
    pub fn stats(&self) -> TableStats {
        let primary = self.primary_len();
        let mut stats = TableStats {
            entries: self.entries.len(),
            primary,
            secondary: self.entries.len() - primary,
            ..TableStats::default()
        };
        for entry in &self.entries {
            match &entry.data {
                StringData::Text(text) => stats.characters += text.chars().count(),
                StringData::Literal(_) => stats.literals += 1,
                StringData::Missing => stats.missing += 1,
            }
        }
        stats
    }
}

impl<'a> IntoIterator for &'a StringTable {
    type Item = &'a TlkString;
    type IntoIter = std::slice::Iter<'a, TlkString>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
