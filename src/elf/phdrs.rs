//! Program headers (segments).

use crate::{
    Result,
    elf::{ElfClass, FieldReader, Layout, Record},
};
use bitflags::bitflags;
use elf::abi::{
    PF_R, PF_W, PF_X, PT_DYNAMIC, PT_GNU_EH_FRAME, PT_GNU_RELRO, PT_GNU_STACK, PT_INTERP, PT_LOAD,
    PT_NOTE, PT_NULL, PT_PHDR, PT_SHLIB, PT_TLS,
};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    /// Segment permission flags (`p_flags`).
    ///
    /// Bits outside of R/W/X are kept as found.
    pub struct SegmentFlags: u32 {
        /// Executable.
        const EXEC = PF_X;
        /// Writable.
        const WRITE = PF_W;
        /// Readable.
        const READ = PF_R;
    }
}

/// The kind of a segment (`p_type`). Unknown codes are kept in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentType {
    Null,
    Load,
    Dynamic,
    Interp,
    Note,
    Shlib,
    Phdr,
    Tls,
    GnuEhFrame,
    GnuStack,
    GnuRelro,
    Other(u32),
}

impl From<u32> for SegmentType {
    fn from(p_type: u32) -> Self {
        match p_type {
            PT_NULL => SegmentType::Null,
            PT_LOAD => SegmentType::Load,
            PT_DYNAMIC => SegmentType::Dynamic,
            PT_INTERP => SegmentType::Interp,
            PT_NOTE => SegmentType::Note,
            PT_SHLIB => SegmentType::Shlib,
            PT_PHDR => SegmentType::Phdr,
            PT_TLS => SegmentType::Tls,
            PT_GNU_EH_FRAME => SegmentType::GnuEhFrame,
            PT_GNU_STACK => SegmentType::GnuStack,
            PT_GNU_RELRO => SegmentType::GnuRelro,
            other => SegmentType::Other(other),
        }
    }
}

impl From<SegmentType> for u32 {
    fn from(ty: SegmentType) -> Self {
        match ty {
            SegmentType::Null => PT_NULL,
            SegmentType::Load => PT_LOAD,
            SegmentType::Dynamic => PT_DYNAMIC,
            SegmentType::Interp => PT_INTERP,
            SegmentType::Note => PT_NOTE,
            SegmentType::Shlib => PT_SHLIB,
            SegmentType::Phdr => PT_PHDR,
            SegmentType::Tls => PT_TLS,
            SegmentType::GnuEhFrame => PT_GNU_EH_FRAME,
            SegmentType::GnuStack => PT_GNU_STACK,
            SegmentType::GnuRelro => PT_GNU_RELRO,
            SegmentType::Other(raw) => raw,
        }
    }
}

/// A decoded program header, with address-sized fields widened to `u64`.
///
/// `p_filesz` may be smaller than `p_memsz`; the difference is zero-filled
/// by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub p_type: u32,
    pub p_flags: u32,
    pub p_offset: u64,
    pub p_vaddr: u64,
    /// Physical address. Informational only.
    pub p_paddr: u64,
    pub p_filesz: u64,
    pub p_memsz: u64,
    pub p_align: u64,
}

impl Segment {
    /// Returns the typed segment kind.
    #[inline]
    pub fn segment_type(&self) -> SegmentType {
        self.p_type.into()
    }

    /// Returns the permission flags.
    #[inline]
    pub fn flags(&self) -> SegmentFlags {
        SegmentFlags::from_bits_retain(self.p_flags)
    }

    /// Returns `true` if `p_align` is zero or a power of two.
    #[inline]
    pub fn has_valid_align(&self) -> bool {
        self.p_align == 0 || self.p_align.is_power_of_two()
    }
}

impl Record for Segment {
    const KIND: &'static str = "program header";

    fn record_size(layout: Layout) -> usize {
        layout.phdr_size()
    }

    fn decode(fields: &mut FieldReader<'_>) -> Result<Self> {
        // The flags word moves ahead of the offset in the 64-bit layout.
        match fields.layout().class {
            ElfClass::Elf32 => {
                let p_type = fields.u32()?;
                let p_offset = fields.word()?;
                let p_vaddr = fields.word()?;
                let p_paddr = fields.word()?;
                let p_filesz = fields.word()?;
                let p_memsz = fields.word()?;
                let p_flags = fields.u32()?;
                let p_align = fields.word()?;
                Ok(Self {
                    p_type,
                    p_flags,
                    p_offset,
                    p_vaddr,
                    p_paddr,
                    p_filesz,
                    p_memsz,
                    p_align,
                })
            }
            ElfClass::Elf64 => Ok(Self {
                p_type: fields.u32()?,
                p_flags: fields.u32()?,
                p_offset: fields.word()?,
                p_vaddr: fields.word()?,
                p_paddr: fields.word()?,
                p_filesz: fields.word()?,
                p_memsz: fields.word()?,
                p_align: fields.word()?,
            }),
        }
    }
}
