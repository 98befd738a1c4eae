//! Growable character buffer.
//!
//! [`GrowBuffer`] backs every string the engine edits. Capacity is counted in
//! characters and always leaves room for one terminator slot past the logical
//! content. Growth allocates fresh storage of exactly the requested size,
//! copies the content across and drops the old storage; capacity never
//! shrinks in place.

use std::ops::Range;

use tracing::trace;

use crate::error::BufferError;

/// Character buffer that grows on demand.
#[derive(Debug, Default)]
pub struct GrowBuffer {
    text: String,
    capacity: usize,
}

impl GrowBuffer {
    /// Create an empty buffer with no capacity.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text: String::new(),
            capacity: 0,
        }
    }

    /// Allocate a buffer that holds at least `min_chars` characters.
    pub fn allocate(min_chars: usize) -> Result<Self, BufferError> {
        Ok(Self {
            text: reserve_exact(min_chars)?,
            capacity: min_chars,
        })
    }

    /// Grow to `min_chars` characters unless the buffer is already that large.
    ///
    /// Returns `true` when new storage was allocated.
    pub fn ensure_capacity(&mut self, min_chars: usize) -> Result<bool, BufferError> {
        if self.capacity >= min_chars {
            return Ok(false);
        }
        let mut grown = reserve_exact(min_chars.max(self.text.len() + 1))?;
        grown.push_str(&self.text);
        self.text = grown;
        trace!(from = self.capacity, to = min_chars, "grew buffer");
        self.capacity = min_chars;
        Ok(true)
    }

    /// Capacity in characters, terminator slot included.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Length of the logical content in characters.
    #[inline]
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Replace the content, growing if needed.
    pub fn set(&mut self, value: &str) -> Result<(), BufferError> {
        self.ensure_capacity(value.chars().count() + 1)?;
        self.text.clear();
        self.push_bytes(value)
    }

    /// Append `value`, growing if needed.
    pub fn push_str(&mut self, value: &str) -> Result<(), BufferError> {
        self.ensure_capacity(self.len() + value.chars().count() + 1)?;
        self.push_bytes(value)
    }

    pub fn push_char(&mut self, c: char) -> Result<(), BufferError> {
        let mut encoded = [0u8; 4];
        self.push_str(c.encode_utf8(&mut encoded))
    }

    /// Remove the last character if it equals `c`.
    pub fn pop_if(&mut self, c: char) -> bool {
        if self.text.ends_with(c) {
            self.text.pop();
            true
        } else {
            false
        }
    }

    /// Cut the byte range out of the content, shifting the tail left.
    ///
    /// Returns `false` and leaves the content untouched when the range is out
    /// of bounds or does not fall on character boundaries.
    pub fn remove_range(&mut self, range: Range<usize>) -> bool {
        if range.start > range.end || self.text.get(range.clone()).is_none() {
            return false;
        }
        self.text.replace_range(range, "");
        true
    }

    /// Drop the content, keeping the capacity.
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Release the storage. Safe to call more than once; the buffer is empty
    /// with zero capacity afterwards and regrows on the next write.
    pub fn release(&mut self) {
        self.text = String::new();
        self.capacity = 0;
    }

    fn push_bytes(&mut self, value: &str) -> Result<(), BufferError> {
        self.text
            .try_reserve(value.len())
            .map_err(|source| BufferError::Allocation {
                requested: self.capacity,
                source,
            })?;
        self.text.push_str(value);
        Ok(())
    }
}

fn reserve_exact(chars: usize) -> Result<String, BufferError> {
    let mut text = String::new();
    text.try_reserve_exact(chars)
        .map_err(|source| BufferError::Allocation {
            requested: chars,
            source,
        })?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_is_empty() {
        let buf = GrowBuffer::allocate(16).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 16);
    }

    #[test]
    fn test_ensure_capacity_noop_when_large_enough() {
        let mut buf = GrowBuffer::allocate(16).unwrap();
        buf.set("abc").unwrap();
        assert!(!buf.ensure_capacity(8).unwrap());
        assert_eq!(buf.capacity(), 16);
        assert_eq!(buf.as_str(), "abc");
    }

    #[test]
    fn test_ensure_capacity_grows_and_keeps_content() {
        let mut buf = GrowBuffer::allocate(4).unwrap();
        buf.set("abc").unwrap();
        assert!(buf.ensure_capacity(32).unwrap());
        assert_eq!(buf.capacity(), 32);
        assert_eq!(buf.as_str(), "abc");
    }

    #[test]
    fn test_push_keeps_terminator_slot() {
        let mut buf = GrowBuffer::new();
        buf.push_str("C:\\tools").unwrap();
        assert!(buf.capacity() > buf.len());
        buf.push_char(';').unwrap();
        assert_eq!(buf.as_str(), "C:\\tools;");
        assert!(buf.capacity() > buf.len());
    }

    #[test]
    fn test_capacity_counts_characters() {
        let mut buf = GrowBuffer::new();
        buf.set("äöü").unwrap();
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.capacity(), 4);
    }

    #[test]
    fn test_pop_if() {
        let mut buf = GrowBuffer::new();
        buf.set("a;").unwrap();
        assert!(buf.pop_if(';'));
        assert!(!buf.pop_if(';'));
        assert_eq!(buf.as_str(), "a");
    }

    #[test]
    fn test_remove_range_compacts() {
        let mut buf = GrowBuffer::new();
        buf.set("a;b;c").unwrap();
        assert!(buf.remove_range(2..4));
        assert_eq!(buf.as_str(), "a;c");
    }

    #[test]
    fn test_remove_range_out_of_bounds() {
        let mut buf = GrowBuffer::new();
        buf.set("ab").unwrap();
        assert!(!buf.remove_range(1..9));
        assert_eq!(buf.as_str(), "ab");
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut buf = GrowBuffer::allocate(64).unwrap();
        buf.set("x").unwrap();
        buf.release();
        buf.release();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 0);
        buf.set("again").unwrap();
        assert_eq!(buf.as_str(), "again");
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut buf = GrowBuffer::allocate(10).unwrap();
        buf.set("abc").unwrap();
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 10);
    }
}
