//! Class and data-encoding dependent field layout.
//!
//! The identity block selects one [`Layout`] for the whole file. Every
//! record decoder reads its fields through a [`FieldReader`] built from that
//! layout instead of hard-coding field widths or byte order.

use crate::{Error, Result, input::ByteSource};
use elf::abi::{ELFCLASS32, ELFCLASS64, ELFDATA2LSB, ELFDATA2MSB};

/// The file class: the width of addresses and offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElfClass {
    /// `ELFCLASS32`: 4-byte addresses and offsets.
    Elf32,
    /// `ELFCLASS64`: 8-byte addresses and offsets.
    Elf64,
}

impl ElfClass {
    /// Decodes the `EI_CLASS` byte.
    pub fn from_ident(class: u8) -> Result<Self> {
        match class {
            ELFCLASS32 => Ok(ElfClass::Elf32),
            ELFCLASS64 => Ok(ElfClass::Elf64),
            found => Err(Error::UnsupportedClass { found }),
        }
    }

    /// Returns the `EI_CLASS` byte for this class.
    pub fn to_ident(self) -> u8 {
        match self {
            ElfClass::Elf32 => ELFCLASS32,
            ElfClass::Elf64 => ELFCLASS64,
        }
    }

    /// Width in bytes of an address, offset or size field.
    #[inline]
    pub fn word_size(self) -> usize {
        match self {
            ElfClass::Elf32 => 4,
            ElfClass::Elf64 => 8,
        }
    }
}

/// The byte order of every multi-byte field in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    /// `ELFDATA2LSB`
    Little,
    /// `ELFDATA2MSB`
    Big,
}

impl Endian {
    /// Decodes the `EI_DATA` byte.
    pub fn from_ident(data: u8) -> Result<Self> {
        match data {
            ELFDATA2LSB => Ok(Endian::Little),
            ELFDATA2MSB => Ok(Endian::Big),
            found => Err(Error::UnsupportedEndianness { found }),
        }
    }

    /// Returns the `EI_DATA` byte for this encoding.
    pub fn to_ident(self) -> u8 {
        match self {
            Endian::Little => ELFDATA2LSB,
            Endian::Big => ELFDATA2MSB,
        }
    }
}

/// The layout descriptor chosen once while decoding the identity block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Layout {
    /// Width of address, offset and size fields.
    pub class: ElfClass,
    /// Byte order of multi-byte fields.
    pub endian: Endian,
}

impl Layout {
    /// Creates a layout from a class and a byte order.
    pub const fn new(class: ElfClass, endian: Endian) -> Self {
        Self { class, endian }
    }

    /// Size of the file header (`Elf32_Ehdr` / `Elf64_Ehdr`).
    #[inline]
    pub fn ehdr_size(&self) -> usize {
        match self.class {
            ElfClass::Elf32 => 52,
            ElfClass::Elf64 => 64,
        }
    }

    /// Size of a program header (`Elf32_Phdr` / `Elf64_Phdr`).
    #[inline]
    pub fn phdr_size(&self) -> usize {
        match self.class {
            ElfClass::Elf32 => 32,
            ElfClass::Elf64 => 56,
        }
    }

    /// Size of a section header (`Elf32_Shdr` / `Elf64_Shdr`).
    #[inline]
    pub fn shdr_size(&self) -> usize {
        match self.class {
            ElfClass::Elf32 => 40,
            ElfClass::Elf64 => 64,
        }
    }

    /// Size of a symbol entry (`Elf32_Sym` / `Elf64_Sym`).
    #[inline]
    pub fn sym_size(&self) -> usize {
        match self.class {
            ElfClass::Elf32 => 16,
            ElfClass::Elf64 => 24,
        }
    }
}

/// Sequential field decoder over a [`ByteSource`].
///
/// Each accessor reads through the source, so a record that is shorter than
/// its layout requires fails with `OutOfRange` instead of reading past it.
pub struct FieldReader<'data> {
    source: ByteSource<'data>,
    pos: usize,
    layout: Layout,
}

impl<'data> FieldReader<'data> {
    /// Creates a reader positioned at `pos` within `source`.
    pub fn new(source: ByteSource<'data>, pos: usize, layout: Layout) -> Self {
        Self {
            source,
            pos,
            layout,
        }
    }

    /// Returns the layout fields are decoded with.
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.source.read_array::<N>(self.pos)?;
        self.pos += N;
        Ok(bytes)
    }

    /// Reads a single byte.
    pub fn u8(&mut self) -> Result<u8> {
        let [b] = self.take::<1>()?;
        Ok(b)
    }

    /// Reads a 16-bit field in the file's byte order.
    pub fn u16(&mut self) -> Result<u16> {
        let bytes = self.take::<2>()?;
        Ok(match self.layout.endian {
            Endian::Little => u16::from_le_bytes(bytes),
            Endian::Big => u16::from_be_bytes(bytes),
        })
    }

    /// Reads a 32-bit field in the file's byte order.
    pub fn u32(&mut self) -> Result<u32> {
        let bytes = self.take::<4>()?;
        Ok(match self.layout.endian {
            Endian::Little => u32::from_le_bytes(bytes),
            Endian::Big => u32::from_be_bytes(bytes),
        })
    }

    /// Reads a 64-bit field in the file's byte order.
    pub fn u64(&mut self) -> Result<u64> {
        let bytes = self.take::<8>()?;
        Ok(match self.layout.endian {
            Endian::Little => u64::from_le_bytes(bytes),
            Endian::Big => u64::from_be_bytes(bytes),
        })
    }

    /// Reads an address, offset or size field, widened to `u64`.
    pub fn word(&mut self) -> Result<u64> {
        match self.layout.class {
            ElfClass::Elf32 => self.u32().map(u64::from),
            ElfClass::Elf64 => self.u64(),
        }
    }
}
