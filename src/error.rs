//! Error types for ELF decoding.

use alloc::borrow::Cow;
use core::fmt::{Display, Formatter};

/// The error type returned by every decoding operation in `elf_inspect`.
///
/// Each variant carries the values that made the input unacceptable so the
/// caller can report them. Decoding never yields a partially filled record:
/// a function either returns a complete value or one of these errors.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The first four bytes are not `\x7fELF`.
    InvalidMagic {
        /// The bytes found at offset 0.
        found: [u8; 4],
    },
    /// The class byte (`e_ident[EI_CLASS]`) is neither 32-bit nor 64-bit.
    UnsupportedClass {
        /// The class byte found in the identity block.
        found: u8,
    },
    /// The data-encoding byte (`e_ident[EI_DATA]`) is neither little nor big endian.
    UnsupportedEndianness {
        /// The encoding byte found in the identity block.
        found: u8,
    },
    /// A declared entry size disagrees with the record width of the file class,
    /// or a table size is not a whole number of entries.
    SizeMismatch {
        /// The table or field being checked.
        what: &'static str,
        /// The size the layout requires.
        expected: u64,
        /// The size the file declares.
        found: u64,
    },
    /// A read or an index falls outside of its container.
    OutOfRange {
        /// The kind of access that failed.
        what: &'static str,
        /// The requested offset or index.
        offset: u64,
        /// The number of bytes (or entries) requested.
        len: u64,
        /// The size of the container.
        size: u64,
    },
    /// No section matches the requested type or name.
    SectionNotFound {
        /// A description of the lookup that failed.
        msg: Cow<'static, str>,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidMagic { found } => {
                write!(f, "invalid ELF magic: {:02x?}", found)
            }
            Error::UnsupportedClass { found } => {
                write!(f, "unsupported ELF class: {}", found)
            }
            Error::UnsupportedEndianness { found } => {
                write!(f, "unsupported ELF data encoding: {}", found)
            }
            Error::SizeMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "{} size mismatch: expected {}, found {}",
                what, expected, found
            ),
            Error::OutOfRange {
                what,
                offset,
                len,
                size,
            } => write!(
                f,
                "{} out of range: offset 0x{:x} + {} exceeds size {}",
                what, offset, len, size
            ),
            Error::SectionNotFound { msg } => write!(f, "section not found: {}", msg),
        }
    }
}

impl core::error::Error for Error {}

#[cold]
#[inline(never)]
pub(crate) fn out_of_range(what: &'static str, offset: u64, len: u64, size: u64) -> Error {
    Error::OutOfRange {
        what,
        offset,
        len,
        size,
    }
}

#[cold]
#[inline(never)]
pub(crate) fn size_mismatch(what: &'static str, expected: u64, found: u64) -> Error {
    Error::SizeMismatch {
        what,
        expected,
        found,
    }
}

#[cold]
#[inline(never)]
pub(crate) fn section_not_found(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::SectionNotFound { msg: msg.into() }
}

/// Converts a file-declared 64-bit quantity into a `usize`, reporting values
/// the host cannot address as out of range.
#[inline]
pub(crate) fn to_usize(what: &'static str, value: u64, size: usize) -> crate::Result<usize> {
    usize::try_from(value).map_err(|_| out_of_range(what, value, 0, size as u64))
}
