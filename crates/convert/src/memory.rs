//! Target allocator for conversions
//!
//! Converted assets are re-homed through a [`ZoneMemory`] owned by the
//! conversion pass. Every string and array copied into the target schema is
//! charged against a byte budget; strings are deduplicated so a bone name
//! shared by a hundred models is charged once.

use zonekit_buffer::InternTable;
use zonekit_core::{Error, Result};

/// Default budget of one conversion pass (256MB)
pub const DEFAULT_MEMORY_LIMIT: usize = 256 * 1024 * 1024;

/// Budgeted allocator for one conversion pass
#[derive(Debug)]
pub struct ZoneMemory {
    limit: usize,
    used: usize,
    strings: InternTable,
}

impl ZoneMemory {
    /// Allocator with a budget of `limit` bytes
    pub fn new(limit: usize) -> Self {
        ZoneMemory {
            limit,
            used: 0,
            strings: InternTable::new(),
        }
    }

    /// Bytes charged so far
    pub fn used(&self) -> usize {
        self.used
    }

    /// Budget in bytes
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of distinct strings held
    pub fn string_count(&self) -> usize {
        self.strings.len()
    }

    /// Charge `bytes` against the budget
    ///
    /// Exhaustion is fatal: the pass cannot continue with a partial target.
    pub fn charge(&mut self, bytes: usize) -> Result<()> {
        let used = self.used.saturating_add(bytes);
        if used > self.limit {
            return Err(Error::fatal(format!(
                "conversion memory exhausted: {} of {} bytes in use, {} requested",
                self.used, self.limit, bytes
            )));
        }
        self.used = used;
        Ok(())
    }

    /// Copy a string into the target, charging it only the first time
    pub fn string(&mut self, s: &str) -> Result<String> {
        let before = self.strings.len();
        self.strings.intern(s.as_bytes());
        if self.strings.len() != before {
            if let Err(e) = self.charge(s.len() + 1) {
                self.strings.truncate(before);
                return Err(e);
            }
        }
        Ok(s.to_string())
    }

    /// Copy an optional string
    pub fn opt_string(&mut self, s: Option<&String>) -> Result<Option<String>> {
        s.map(|s| self.string(s)).transpose()
    }

    /// Copy a string array
    pub fn strings(&mut self, values: &[String]) -> Result<Vec<String>> {
        self.charge(values.len() * std::mem::size_of::<usize>())?;
        values.iter().map(|s| self.string(s)).collect()
    }

    /// Copy a plain array
    pub fn array<T: Clone>(&mut self, values: &[T]) -> Result<Vec<T>> {
        self.charge(std::mem::size_of_val(values))?;
        Ok(values.to_vec())
    }

    /// Drop everything, keeping the budget
    pub fn reset(&mut self) {
        self.used = 0;
        self.strings.clear();
    }
}

impl Default for ZoneMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_are_charged_once() {
        let mut mem = ZoneMemory::new(1024);
        mem.string("j_head").unwrap();
        mem.string("j_head").unwrap();
        assert_eq!(mem.used(), 7);
        assert_eq!(mem.string_count(), 1);
    }

    #[test]
    fn test_exhaustion_is_fatal() {
        let mut mem = ZoneMemory::new(16);
        mem.array(&[0u32; 4]).unwrap();
        let err = mem.string("x").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(mem.used(), 16);
        assert_eq!(mem.string_count(), 0);
    }

    #[test]
    fn test_reset_keeps_limit() {
        let mut mem = ZoneMemory::new(64);
        mem.array(&[1u8; 40]).unwrap();
        mem.reset();
        assert_eq!(mem.used(), 0);
        assert_eq!(mem.limit(), 64);
        mem.array(&[1u8; 40]).unwrap();
    }
}
