use crate::{Result, out_of_range};

/// A bounds-checked, read-only view over an ELF image in memory.
///
/// Reads either return exactly the requested number of bytes or fail with
/// [`Error::OutOfRange`](crate::Error::OutOfRange); there are no partial
/// reads and no silent truncation.
///
/// # Examples
/// ```rust
/// use elf_inspect::input::ByteSource;
///
/// let source = ByteSource::new(b"\x7fELF");
/// assert_eq!(source.read(1, 3).unwrap(), b"ELF");
/// assert!(source.read(2, 3).is_err());
/// ```
#[derive(Clone, Copy)]
pub struct ByteSource<'data> {
    /// A name used in diagnostics.
    name: &'data str,
    /// The raw image.
    bytes: &'data [u8],
}

impl core::fmt::Debug for ByteSource<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ByteSource")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl<'data> ByteSource<'data> {
    /// Creates a source over `bytes` with the name `<memory>`.
    #[inline]
    pub const fn new(bytes: &'data [u8]) -> Self {
        Self {
            name: "<memory>",
            bytes,
        }
    }

    /// Creates a named source, e.g. with the path the bytes were read from.
    #[inline]
    pub const fn with_name(name: &'data str, bytes: &'data [u8]) -> Self {
        Self { name, bytes }
    }

    /// Returns the diagnostic name of this source.
    #[inline]
    pub fn name(&self) -> &'data str {
        self.name
    }

    /// Returns the total number of bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the source holds no bytes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns exactly `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`](crate::Error::OutOfRange) if
    /// `offset + len` overflows or exceeds the source length.
    #[inline]
    pub fn read(&self, offset: usize, len: usize) -> Result<&'data [u8]> {
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| out_of_range("read", offset as u64, len as u64, self.len() as u64))?;
        Ok(&self.bytes[offset..end])
    }

    /// Reads a fixed-size array starting at `offset`.
    #[inline]
    pub fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let bytes = self.read(offset, N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Returns a source over `len` bytes at `offset`, keeping this source's name.
    #[inline]
    pub fn slice(&self, offset: usize, len: usize) -> Result<ByteSource<'data>> {
        Ok(ByteSource {
            name: self.name,
            bytes: self.read(offset, len)?,
        })
    }

    /// Returns the whole underlying buffer.
    #[inline]
    pub fn as_bytes(&self) -> &'data [u8] {
        self.bytes
    }
}
