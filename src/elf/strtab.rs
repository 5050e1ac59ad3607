//! Null-terminated string lookup inside a string table.

use crate::{
    Result,
    elf::SectionHeader,
    error::to_usize,
    input::ByteSource,
    out_of_range,
};

/// A string table: a byte range holding null-terminated strings that are
/// referenced by their start offset.
#[derive(Debug, Clone, Copy)]
pub struct StringTable<'data> {
    data: &'data [u8],
}

impl<'data> StringTable<'data> {
    /// Wraps an already extracted string table blob.
    #[inline]
    pub const fn new(data: &'data [u8]) -> Self {
        Self { data }
    }

    /// Loads the contents of `section` from `source` as a string table.
    pub fn from_section(source: &ByteSource<'data>, section: &SectionHeader) -> Result<Self> {
        let offset = to_usize("string table offset", section.sh_offset, source.len())?;
        let size = to_usize("string table size", section.sh_size, source.len())?;
        Ok(Self::new(source.read(offset, size)?))
    }

    /// Returns the size of the table in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the bytes of the string starting at `offset`, without its
    /// terminator.
    ///
    /// A string that runs to the end of the table without a terminator is
    /// returned as is; the lookup never reads past the table.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if `offset` is not inside the table.
    pub fn resolve(&self, offset: usize) -> Result<&'data [u8]> {
        let data = self.data;
        if offset >= data.len() {
            return Err(out_of_range(
                "string table offset",
                offset as u64,
                1,
                data.len() as u64,
            ));
        }
        let tail = &data[offset..];
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        Ok(&tail[..end])
    }

    /// Returns the raw table bytes.
    #[inline]
    pub fn as_bytes(&self) -> &'data [u8] {
        self.data
    }
}
