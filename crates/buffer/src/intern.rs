//! Interned-value table
//!
//! Deduplicates byte payloads (mostly bone and tag names) shared by many
//! records. Identical bytes always map to the same [`InternRef`]; refs are
//! only meaningful within the buffer that produced them.

use std::collections::HashMap;

/// Back-reference to an interned value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InternRef(pub u32);

impl InternRef {
    /// Table index
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Per-pass table of interned values
#[derive(Debug, Default, Clone)]
pub struct InternTable {
    values: Vec<Vec<u8>>,
    lookup: HashMap<Vec<u8>, InternRef>,
}

impl InternTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `bytes`, returning the existing ref if already present
    pub fn intern(&mut self, bytes: &[u8]) -> InternRef {
        if let Some(existing) = self.lookup.get(bytes) {
            return *existing;
        }
        let iref = InternRef(self.values.len() as u32);
        self.values.push(bytes.to_vec());
        self.lookup.insert(bytes.to_vec(), iref);
        iref
    }

    /// Value behind `iref`
    pub fn get(&self, iref: InternRef) -> Option<&[u8]> {
        self.values.get(iref.index()).map(Vec::as_slice)
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drop every value interned after the first `len`
    pub fn truncate(&mut self, len: usize) {
        for value in self.values.drain(len.min(self.values.len())..) {
            self.lookup.remove(&value);
        }
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.values.clear();
        self.lookup.clear();
    }

    /// Values in ref order
    pub fn values(&self) -> impl Iterator<Item = &[u8]> {
        self.values.iter().map(Vec::as_slice)
    }
}
