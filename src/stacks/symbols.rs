//! Offset-indexed symbol table.
//!
//! The benchmark harness emits span frames as byte offsets into a blob of
//! null-terminated strings. Resolution failures are routine (truncated
//! tables, stale offsets) and are reported to the caller rather than
//! aborting anything.

use std::io;
use std::path::Path;

use crate::utils::error::SymbolError;

/// A binary string table addressed by byte offset
///
/// **Public** - supplied to the stack collapser for span resolution
#[derive(Debug, Clone)]
pub struct SymbolTable {
    data: Vec<u8>,
}

impl SymbolTable {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Load a symbol table blob from disk.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(std::fs::read(path)?))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Resolve the null-terminated string starting at `offset`.
    ///
    /// # Errors
    /// * `SymbolError::OffsetOutOfBounds` - offset past the end of the blob
    /// * `SymbolError::MissingTerminator` - no null byte before end of buffer
    /// * `SymbolError::InvalidUtf8` - the symbol bytes are not UTF-8
    pub fn resolve(&self, offset: usize) -> Result<&str, SymbolError> {
        if offset >= self.data.len() {
            return Err(SymbolError::OffsetOutOfBounds(offset, self.data.len()));
        }
        let rest = &self.data[offset..];
        let end = rest
            .iter()
            .position(|&byte| byte == 0)
            .ok_or(SymbolError::MissingTerminator(offset))?;
        std::str::from_utf8(&rest[..end]).map_err(|_| SymbolError::InvalidUtf8(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_at_offsets() {
        let table = SymbolTable::new(b"main\0helper\0".to_vec());
        assert_eq!(table.resolve(0).unwrap(), "main");
        assert_eq!(table.resolve(5).unwrap(), "helper");
    }

    #[test]
    fn test_resolve_mid_symbol() {
        let table = SymbolTable::new(b"main\0".to_vec());
        assert_eq!(table.resolve(2).unwrap(), "in");
    }

    #[test]
    fn test_resolve_out_of_bounds() {
        let table = SymbolTable::new(b"main\0helper\0".to_vec());
        assert!(matches!(
            table.resolve(100),
            Err(SymbolError::OffsetOutOfBounds(100, 12))
        ));
    }

    #[test]
    fn test_resolve_missing_terminator() {
        let table = SymbolTable::new(b"main".to_vec());
        assert!(matches!(
            table.resolve(0),
            Err(SymbolError::MissingTerminator(0))
        ));
    }

    #[test]
    fn test_resolve_invalid_utf8() {
        let table = SymbolTable::new(vec![0xff, 0xfe, 0x00]);
        assert!(matches!(table.resolve(0), Err(SymbolError::InvalidUtf8(0))));
    }
}
