//! Raw symbol table entries and the sub-fields packed into them.

use crate::{
    Result,
    elf::{ElfClass, FieldReader, Layout, Record},
};
use elf::abi::{
    SHN_ABS, SHN_COMMON, SHN_UNDEF, STB_GLOBAL, STB_LOCAL, STB_WEAK, STT_COMMON, STT_FILE,
    STT_FUNC, STT_NOTYPE, STT_OBJECT, STT_SECTION, STT_TLS, STV_HIDDEN,
    STV_INTERNAL, STV_PROTECTED,
};

/// Extracts the binding from a symbol's `st_info` byte (high four bits).
#[inline]
pub const fn st_bind(info: u8) -> u8 {
    info >> 4
}

/// Extracts the type from a symbol's `st_info` byte (low four bits).
#[inline]
pub const fn st_type(info: u8) -> u8 {
    info & 0xf
}

/// Extracts the visibility from a symbol's `st_other` byte (low two bits).
#[inline]
pub const fn st_visibility(other: u8) -> u8 {
    other & 0x3
}

/// Symbol binding. Unknown values are kept in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolBind {
    Local,
    Global,
    Weak,
    Other(u8),
}

impl From<u8> for SymbolBind {
    fn from(bind: u8) -> Self {
        match bind {
            STB_LOCAL => SymbolBind::Local,
            STB_GLOBAL => SymbolBind::Global,
            STB_WEAK => SymbolBind::Weak,
            other => SymbolBind::Other(other),
        }
    }
}

/// Symbol type. Unknown values are kept in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolType {
    NoType,
    Object,
    Func,
    Section,
    File,
    Common,
    Tls,
    Other(u8),
}

impl From<u8> for SymbolType {
    fn from(ty: u8) -> Self {
        match ty {
            STT_NOTYPE => SymbolType::NoType,
            STT_OBJECT => SymbolType::Object,
            STT_FUNC => SymbolType::Func,
            STT_SECTION => SymbolType::Section,
            STT_FILE => SymbolType::File,
            STT_COMMON => SymbolType::Common,
            STT_TLS => SymbolType::Tls,
            other => SymbolType::Other(other),
        }
    }
}

/// Symbol visibility, from the low two bits of `st_other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolVisibility {
    Default,
    Internal,
    Hidden,
    Protected,
}

impl From<u8> for SymbolVisibility {
    fn from(other: u8) -> Self {
        match st_visibility(other) {
            STV_INTERNAL => SymbolVisibility::Internal,
            STV_HIDDEN => SymbolVisibility::Hidden,
            STV_PROTECTED => SymbolVisibility::Protected,
            _ => SymbolVisibility::Default,
        }
    }
}

/// A raw symbol table entry, with address-sized fields widened to `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolEntry {
    /// Offset of the name in the linked string table.
    pub st_name: u32,
    pub st_value: u64,
    pub st_size: u64,
    pub st_info: u8,
    pub st_other: u8,
    /// Index of the section the symbol is defined in.
    pub st_shndx: u16,
}

impl SymbolEntry {
    #[inline]
    pub fn bind(&self) -> SymbolBind {
        st_bind(self.st_info).into()
    }

    #[inline]
    pub fn sym_type(&self) -> SymbolType {
        st_type(self.st_info).into()
    }

    #[inline]
    pub fn visibility(&self) -> SymbolVisibility {
        self.st_other.into()
    }

    /// Returns `true` if the symbol is not defined in this file.
    #[inline]
    pub fn is_undefined(&self) -> bool {
        self.st_shndx == SHN_UNDEF
    }

    /// Returns `true` if the symbol has an absolute value.
    #[inline]
    pub fn is_absolute(&self) -> bool {
        self.st_shndx == SHN_ABS
    }

    /// Returns `true` for an unallocated common block.
    #[inline]
    pub fn is_common(&self) -> bool {
        self.st_shndx == SHN_COMMON
    }

    /// Returns `true` for global and weak symbols.
    #[inline]
    pub fn is_global(&self) -> bool {
        matches!(self.bind(), SymbolBind::Global | SymbolBind::Weak)
    }
}

impl Record for SymbolEntry {
    const KIND: &'static str = "symbol entry";

    fn record_size(layout: Layout) -> usize {
        layout.sym_size()
    }

    fn decode(fields: &mut FieldReader<'_>) -> Result<Self> {
        match fields.layout().class {
            ElfClass::Elf32 => Ok(Self {
                st_name: fields.u32()?,
                st_value: fields.word()?,
                st_size: fields.word()?,
                st_info: fields.u8()?,
                st_other: fields.u8()?,
                st_shndx: fields.u16()?,
            }),
            ElfClass::Elf64 => {
                let st_name = fields.u32()?;
                let st_info = fields.u8()?;
                let st_other = fields.u8()?;
                let st_shndx = fields.u16()?;
                let st_value = fields.word()?;
                let st_size = fields.word()?;
                Ok(Self {
                    st_name,
                    st_value,
                    st_size,
                    st_info,
                    st_other,
                    st_shndx,
                })
            }
        }
    }
}
