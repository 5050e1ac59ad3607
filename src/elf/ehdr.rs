//! ELF header parsing and validation
//!
//! This module decodes the identity block and the fixed file header, which
//! select the field layout for the rest of the file and locate the program
//! and section header tables.

use crate::{
    Error, Result,
    elf::{ElfClass, Endian, FieldReader, Layout},
    input::ByteSource,
    out_of_range, size_mismatch,
};
use elf::abi::{
    EI_ABIVERSION, EI_CLASS, EI_DATA, EI_NIDENT, EI_OSABI, EI_VERSION, ELFMAGIC, ET_DYN, ET_EXEC,
    ET_REL,
};

/// The decoded 16-byte identity block (`e_ident`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident {
    /// The field layout selected by `EI_CLASS` and `EI_DATA`.
    pub layout: Layout,
    /// `EI_VERSION`, stored as found.
    pub version: u8,
    /// `EI_OSABI`
    pub os_abi: u8,
    /// `EI_ABIVERSION`
    pub abi_version: u8,
}

impl Ident {
    /// Decodes and validates the identity block at the start of `source`.
    ///
    /// The magic is checked before anything else, on however many of its
    /// four bytes are present. Input whose leading bytes differ from the magic
    /// fails with `InvalidMagic` even when it is shorter than four bytes; only
    /// a truncated but matching prefix fails with `OutOfRange`.
    pub fn decode(source: &ByteSource<'_>) -> Result<Self> {
        let bytes = source.as_bytes();
        let present = bytes.len().min(ELFMAGIC.len());
        if bytes[..present] != ELFMAGIC[..present] {
            let mut found = [0u8; 4];
            found[..present].copy_from_slice(&bytes[..present]);
            return Err(Error::InvalidMagic { found });
        }

        let ident = source.read_array::<EI_NIDENT>(0)?;
        let class = ElfClass::from_ident(ident[EI_CLASS])?;
        let endian = Endian::from_ident(ident[EI_DATA])?;

        Ok(Self {
            layout: Layout::new(class, endian),
            version: ident[EI_VERSION],
            os_abi: ident[EI_OSABI],
            abi_version: ident[EI_ABIVERSION],
        })
    }
}

/// The decoded ELF file header.
///
/// A successfully decoded header guarantees that its non-empty tables have
/// entry sizes matching the file class and lie entirely within the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElfHeader {
    ident: Ident,
    e_type: u16,
    e_machine: u16,
    e_version: u32,
    e_entry: u64,
    e_phoff: u64,
    e_shoff: u64,
    e_flags: u32,
    e_ehsize: u16,
    e_phentsize: u16,
    e_phnum: u16,
    e_shentsize: u16,
    e_shnum: u16,
    e_shstrndx: u16,
}

impl ElfHeader {
    /// Decodes the file header from `source`.
    ///
    /// # Errors
    ///
    /// * `InvalidMagic`, `UnsupportedClass`, `UnsupportedEndianness` for a bad
    ///   identity block.
    /// * `SizeMismatch` if a table declares an entry size other than the
    ///   record size of the file class. An empty table may also declare `0`.
    /// * `OutOfRange` if the header or a table does not fit in the source.
    pub fn decode(source: &ByteSource<'_>) -> Result<Self> {
        let ident = Ident::decode(source)?;
        let layout = ident.layout;
        let mut fields = FieldReader::new(*source, EI_NIDENT, layout);

        let header = Self {
            ident,
            e_type: fields.u16()?,
            e_machine: fields.u16()?,
            e_version: fields.u32()?,
            e_entry: fields.word()?,
            e_phoff: fields.word()?,
            e_shoff: fields.word()?,
            e_flags: fields.u32()?,
            e_ehsize: fields.u16()?,
            e_phentsize: fields.u16()?,
            e_phnum: fields.u16()?,
            e_shentsize: fields.u16()?,
            e_shnum: fields.u16()?,
            e_shstrndx: fields.u16()?,
        };
        header.validate(source.len())?;

        #[cfg(feature = "log")]
        log::debug!(
            "[{}] ELF header: {:?} {:?}, type {}, machine {}, {} phdrs, {} shdrs",
            source.name(),
            layout.class,
            layout.endian,
            header.e_type,
            header.machine_name(),
            header.e_phnum,
            header.e_shnum,
        );

        Ok(header)
    }

    /// Checks the table entry sizes and spans against the layout and the
    /// length of the source.
    fn validate(&self, source_len: usize) -> Result<()> {
        let layout = self.layout();
        check_entsize(
            "program header entry",
            self.e_phnum,
            self.e_phentsize,
            layout.phdr_size(),
        )?;
        check_entsize(
            "section header entry",
            self.e_shnum,
            self.e_shentsize,
            layout.shdr_size(),
        )?;
        check_span(
            "program header table",
            self.e_phoff,
            self.e_phnum,
            self.e_phentsize,
            source_len,
        )?;
        check_span(
            "section header table",
            self.e_shoff,
            self.e_shnum,
            self.e_shentsize,
            source_len,
        )
    }

    /// Returns the decoded identity block.
    #[inline]
    pub fn ident(&self) -> &Ident {
        &self.ident
    }

    /// Returns the field layout used by every record in this file.
    #[inline]
    pub fn layout(&self) -> Layout {
        self.ident.layout
    }

    /// Returns the object file type (`ET_*`).
    #[inline]
    pub fn e_type(&self) -> u16 {
        self.e_type
    }

    /// Returns the target architecture (`EM_*`).
    #[inline]
    pub fn e_machine(&self) -> u16 {
        self.e_machine
    }

    /// Returns the object file version.
    #[inline]
    pub fn e_version(&self) -> u32 {
        self.e_version
    }

    /// Returns the entry point virtual address.
    #[inline]
    pub fn e_entry(&self) -> u64 {
        self.e_entry
    }

    /// Returns the processor-specific flags.
    #[inline]
    pub fn e_flags(&self) -> u32 {
        self.e_flags
    }

    /// Returns the header size declared by the file.
    #[inline]
    pub fn e_ehsize(&self) -> u16 {
        self.e_ehsize
    }

    /// Returns the file offset of the program header table.
    #[inline]
    pub fn e_phoff(&self) -> u64 {
        self.e_phoff
    }

    /// Returns the number of program headers.
    #[inline]
    pub fn e_phnum(&self) -> usize {
        self.e_phnum as usize
    }

    /// Returns the size of each program header entry.
    #[inline]
    pub fn e_phentsize(&self) -> usize {
        self.e_phentsize as usize
    }

    /// Returns the file offset of the section header table.
    #[inline]
    pub fn e_shoff(&self) -> u64 {
        self.e_shoff
    }

    /// Returns the number of section headers.
    #[inline]
    pub fn e_shnum(&self) -> usize {
        self.e_shnum as usize
    }

    /// Returns the size of each section header entry.
    #[inline]
    pub fn e_shentsize(&self) -> usize {
        self.e_shentsize as usize
    }

    /// Returns the index of the section holding section names.
    #[inline]
    pub fn e_shstrndx(&self) -> usize {
        self.e_shstrndx as usize
    }

    /// Returns `true` if the file is a relocatable object.
    #[inline]
    pub fn is_relocatable(&self) -> bool {
        self.e_type == ET_REL
    }

    /// Returns `true` if the file is a dynamic library (shared object).
    #[inline]
    pub fn is_dylib(&self) -> bool {
        self.e_type == ET_DYN
    }

    /// Returns `true` if the file is an executable, position independent or not.
    #[inline]
    pub fn is_executable(&self) -> bool {
        self.e_type == ET_EXEC || self.e_type == ET_DYN
    }

    /// Returns the `(start, end)` file offsets of the program header table.
    ///
    /// When `e_phnum` is non-zero both values are within the source the
    /// header was decoded from. An empty table's offset is not validated and
    /// is truncated to `usize` as found.
    #[inline]
    pub fn phdr_range(&self) -> (usize, usize) {
        let start = self.e_phoff as usize;
        (start, start + self.e_phentsize() * self.e_phnum())
    }

    /// Returns the `(start, end)` file offsets of the section header table.
    ///
    /// The same bound as [`phdr_range`](Self::phdr_range) applies, keyed on
    /// `e_shnum`.
    #[inline]
    pub fn shdr_range(&self) -> (usize, usize) {
        let start = self.e_shoff as usize;
        (start, start + self.e_shentsize() * self.e_shnum())
    }

    /// Returns a short name for the target architecture.
    pub fn machine_name(&self) -> &'static str {
        machine_to_str(self.e_machine)
    }
}

/// Checks a table's declared entry size against the record size of the class.
///
/// An empty table may also declare `0`, as relocatable objects do for the
/// program header table.
fn check_entsize(what: &'static str, count: u16, entsize: u16, expected: usize) -> Result<()> {
    let entsize = usize::from(entsize);
    if entsize == expected || (count == 0 && entsize == 0) {
        return Ok(());
    }
    Err(size_mismatch(what, expected as u64, entsize as u64))
}

/// Checks that `count` entries of `entsize` bytes at `offset` fit in `source_len`.
fn check_span(
    what: &'static str,
    offset: u64,
    count: u16,
    entsize: u16,
    source_len: usize,
) -> Result<()> {
    if count == 0 {
        return Ok(());
    }
    let len = u64::from(count) * u64::from(entsize);
    match offset.checked_add(len) {
        Some(end) if end <= source_len as u64 => Ok(()),
        _ => Err(out_of_range(what, offset, len, source_len as u64)),
    }
}

fn machine_to_str(machine: u16) -> &'static str {
    match machine {
        elf::abi::EM_X86_64 => "x86_64",
        elf::abi::EM_AARCH64 => "AArch64",
        elf::abi::EM_RISCV => "RISC-V",
        elf::abi::EM_386 => "x86",
        elf::abi::EM_ARM => "ARM",
        elf::abi::EM_MIPS => "MIPS",
        elf::abi::EM_PPC => "PowerPC",
        elf::abi::EM_PPC64 => "PowerPC64",
        258 => "LoongArch",
        _ => "unknown",
    }
}
