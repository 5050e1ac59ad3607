//! Section headers.

use crate::{
    Result,
    elf::{FieldReader, Layout, Record},
};
use bitflags::bitflags;
use elf::abi::{
    SHF_ALLOC, SHF_COMPRESSED, SHF_EXECINSTR, SHF_GROUP, SHF_INFO_LINK, SHF_LINK_ORDER, SHF_MERGE,
    SHF_STRINGS, SHF_TLS, SHF_WRITE, SHT_DYNAMIC, SHT_DYNSYM, SHT_FINI_ARRAY, SHT_HASH,
    SHT_INIT_ARRAY, SHT_NOBITS, SHT_NOTE, SHT_NULL, SHT_PROGBITS, SHT_REL, SHT_RELA, SHT_STRTAB,
    SHT_SYMTAB,
};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    /// Section attribute flags (`sh_flags`).
    ///
    /// Unknown and processor-specific bits are kept as found.
    pub struct SectionFlags: u64 {
        const WRITE = SHF_WRITE as u64;
        const ALLOC = SHF_ALLOC as u64;
        const EXECINSTR = SHF_EXECINSTR as u64;
        const MERGE = SHF_MERGE as u64;
        const STRINGS = SHF_STRINGS as u64;
        const INFO_LINK = SHF_INFO_LINK as u64;
        const LINK_ORDER = SHF_LINK_ORDER as u64;
        const GROUP = SHF_GROUP as u64;
        const TLS = SHF_TLS as u64;
        const COMPRESSED = SHF_COMPRESSED as u64;
    }
}

/// The kind of a section (`sh_type`). Unknown codes are kept in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionType {
    Null,
    ProgBits,
    SymTab,
    StrTab,
    Rela,
    Hash,
    Dynamic,
    Note,
    /// Occupies no file bytes; zero-filled in memory.
    NoBits,
    Rel,
    DynSym,
    InitArray,
    FiniArray,
    Other(u32),
}

impl From<u32> for SectionType {
    fn from(sh_type: u32) -> Self {
        match sh_type {
            SHT_NULL => SectionType::Null,
            SHT_PROGBITS => SectionType::ProgBits,
            SHT_SYMTAB => SectionType::SymTab,
            SHT_STRTAB => SectionType::StrTab,
            SHT_RELA => SectionType::Rela,
            SHT_HASH => SectionType::Hash,
            SHT_DYNAMIC => SectionType::Dynamic,
            SHT_NOTE => SectionType::Note,
            SHT_NOBITS => SectionType::NoBits,
            SHT_REL => SectionType::Rel,
            SHT_DYNSYM => SectionType::DynSym,
            SHT_INIT_ARRAY => SectionType::InitArray,
            SHT_FINI_ARRAY => SectionType::FiniArray,
            other => SectionType::Other(other),
        }
    }
}

impl From<SectionType> for u32 {
    fn from(ty: SectionType) -> Self {
        match ty {
            SectionType::Null => SHT_NULL,
            SectionType::ProgBits => SHT_PROGBITS,
            SectionType::SymTab => SHT_SYMTAB,
            SectionType::StrTab => SHT_STRTAB,
            SectionType::Rela => SHT_RELA,
            SectionType::Hash => SHT_HASH,
            SectionType::Dynamic => SHT_DYNAMIC,
            SectionType::Note => SHT_NOTE,
            SectionType::NoBits => SHT_NOBITS,
            SectionType::Rel => SHT_REL,
            SectionType::DynSym => SHT_DYNSYM,
            SectionType::InitArray => SHT_INIT_ARRAY,
            SectionType::FiniArray => SHT_FINI_ARRAY,
            SectionType::Other(raw) => raw,
        }
    }
}

/// A raw section header, with address-sized fields widened to `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    /// Offset of the name in the section-name string table.
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    pub sh_addr: u64,
    pub sh_offset: u64,
    pub sh_size: u64,
    /// Index of an associated section; its meaning depends on `sh_type`.
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u64,
    /// Size of one entry for table-shaped sections, zero otherwise.
    pub sh_entsize: u64,
}

impl SectionHeader {
    /// Returns the typed section kind.
    #[inline]
    pub fn section_type(&self) -> SectionType {
        self.sh_type.into()
    }

    /// Returns the attribute flags.
    #[inline]
    pub fn flags(&self) -> SectionFlags {
        SectionFlags::from_bits_retain(self.sh_flags)
    }

    /// Returns `true` if the section occupies no bytes in the file.
    #[inline]
    pub fn is_nobits(&self) -> bool {
        self.sh_type == SHT_NOBITS
    }
}

impl Record for SectionHeader {
    const KIND: &'static str = "section header";

    fn record_size(layout: Layout) -> usize {
        layout.shdr_size()
    }

    fn decode(fields: &mut FieldReader<'_>) -> Result<Self> {
        Ok(Self {
            sh_name: fields.u32()?,
            sh_type: fields.u32()?,
            sh_flags: fields.word()?,
            sh_addr: fields.word()?,
            sh_offset: fields.word()?,
            sh_size: fields.word()?,
            sh_link: fields.u32()?,
            sh_info: fields.u32()?,
            sh_addralign: fields.word()?,
            sh_entsize: fields.word()?,
        })
    }
}
