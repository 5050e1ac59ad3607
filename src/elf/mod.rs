//! ELF (Executable and Linkable Format) record decoding.
//!
//! This module contains the fixed-layout pieces of the format as defined in
//! the System V gABI: the identity block and file header, the layout
//! descriptor they select, the generic record table reader, and the raw
//! program header, section header and symbol records it decodes.

mod ehdr;
mod layout;
mod phdrs;
mod shdrs;
mod strtab;
mod symbol;
mod table;

/// ELF ABI constants from the `elf` crate.
pub use elf::abi;

pub use ehdr::{ElfHeader, Ident};
pub use layout::{ElfClass, Endian, FieldReader, Layout};
pub use phdrs::{Segment, SegmentFlags, SegmentType};
pub use shdrs::{SectionFlags, SectionHeader, SectionType};
pub use strtab::StringTable;
pub use symbol::{
    SymbolBind, SymbolEntry, SymbolType, SymbolVisibility, st_bind, st_type, st_visibility,
};
pub use table::{Record, read_table};
