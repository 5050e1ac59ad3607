//! Synthetic ELF images for tests.
//!
//! [`ElfWriter`] lays out a header, program headers, section contents, symbol
//! tables and a section header table for either class and byte order. It
//! writes exactly what it is told, including inconsistent values, so tests
//! can exercise the decoder's error paths.

mod emit;
mod writer;

pub use writer::{ElfOutput, ElfWriter};

use elf::abi::{
    EM_X86_64, ET_DYN, PT_INTERP, PT_LOAD, SHT_NOBITS, SHT_PROGBITS, STB_GLOBAL, STB_LOCAL,
    STB_WEAK, STT_FUNC, STT_NOTYPE, STT_OBJECT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Elf32,
    Elf64,
}

impl Class {
    pub fn word_size(self) -> usize {
        match self {
            Class::Elf32 => 4,
            Class::Elf64 => 8,
        }
    }

    pub fn ehdr_size(self) -> usize {
        match self {
            Class::Elf32 => 52,
            Class::Elf64 => 64,
        }
    }

    pub fn phdr_size(self) -> usize {
        match self {
            Class::Elf32 => 32,
            Class::Elf64 => 56,
        }
    }

    pub fn shdr_size(self) -> usize {
        match self {
            Class::Elf32 => 40,
            Class::Elf64 => 64,
        }
    }

    pub fn sym_size(self) -> usize {
        match self {
            Class::Elf32 => 16,
            Class::Elf64 => 24,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// File-level settings for [`ElfWriter`].
#[derive(Debug, Clone)]
pub struct ElfWriterConfig {
    pub class: Class,
    pub endian: Endian,
    pub e_type: u16,
    pub machine: u16,
    pub entry: u64,
    pub flags: u32,
    /// Overrides the `e_phentsize` written to the header.
    pub phentsize: Option<u16>,
    /// Overrides the `e_shentsize` written to the header.
    pub shentsize: Option<u16>,
}

impl Default for ElfWriterConfig {
    fn default() -> Self {
        Self {
            class: Class::Elf64,
            endian: Endian::Little,
            e_type: ET_DYN,
            machine: EM_X86_64,
            entry: 0,
            flags: 0,
            phentsize: None,
            shentsize: None,
        }
    }
}

impl ElfWriterConfig {
    pub fn with_class(mut self, class: Class) -> Self {
        self.class = class;
        self
    }

    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn with_type(mut self, e_type: u16) -> Self {
        self.e_type = e_type;
        self
    }

    pub fn with_machine(mut self, machine: u16) -> Self {
        self.machine = machine;
        self
    }

    pub fn with_entry(mut self, entry: u64) -> Self {
        self.entry = entry;
        self
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_phentsize(mut self, phentsize: u16) -> Self {
        self.phentsize = Some(phentsize);
        self
    }

    pub fn with_shentsize(mut self, shentsize: u16) -> Self {
        self.shentsize = Some(shentsize);
        self
    }
}

/// A program header and the file bytes it covers.
#[derive(Debug, Clone)]
pub struct SegmentDesc {
    pub p_type: u32,
    pub flags: u32,
    pub vaddr: u64,
    pub paddr: u64,
    pub data: Vec<u8>,
    /// Memory size; `None` means the length of `data`.
    pub memsz: Option<u64>,
    pub align: u64,
}

impl SegmentDesc {
    pub fn new(p_type: u32, data: &[u8]) -> Self {
        Self {
            p_type,
            flags: 0,
            vaddr: 0,
            paddr: 0,
            data: data.to_vec(),
            memsz: None,
            align: 0,
        }
    }

    pub fn load(flags: u32, vaddr: u64, data: &[u8]) -> Self {
        Self {
            flags,
            vaddr,
            paddr: vaddr,
            align: 0x1000,
            ..Self::new(PT_LOAD, data)
        }
    }

    /// A `PT_INTERP` segment holding `path` and its terminator.
    pub fn interp(path: &str) -> Self {
        let mut data = path.as_bytes().to_vec();
        data.push(0);
        Self {
            align: 1,
            ..Self::new(PT_INTERP, &data)
        }
    }

    pub fn with_memsz(mut self, memsz: u64) -> Self {
        self.memsz = Some(memsz);
        self
    }

    pub fn with_align(mut self, align: u64) -> Self {
        self.align = align;
        self
    }
}

/// A section header and its contents.
#[derive(Debug, Clone)]
pub struct SectionDesc {
    pub name: String,
    pub sh_type: u32,
    pub flags: u64,
    pub addr: u64,
    pub data: Vec<u8>,
    /// `sh_size` for sections without file bytes.
    pub nobits_size: u64,
    pub link: u32,
    pub info: u32,
    pub align: u64,
    pub entsize: u64,
}

impl SectionDesc {
    pub fn new(name: &str, sh_type: u32) -> Self {
        Self {
            name: name.to_string(),
            sh_type,
            flags: 0,
            addr: 0,
            data: Vec::new(),
            nobits_size: 0,
            link: 0,
            info: 0,
            align: 1,
            entsize: 0,
        }
    }

    pub fn progbits(name: &str, data: &[u8]) -> Self {
        Self::new(name, SHT_PROGBITS).with_data(data)
    }

    pub fn nobits(name: &str, size: u64) -> Self {
        Self {
            nobits_size: size,
            ..Self::new(name, SHT_NOBITS)
        }
    }

    pub fn with_data(mut self, data: &[u8]) -> Self {
        self.data = data.to_vec();
        self
    }

    pub fn with_flags(mut self, flags: u64) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_addr(mut self, addr: u64) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_link(mut self, link: u32) -> Self {
        self.link = link;
        self
    }

    pub fn with_info(mut self, info: u32) -> Self {
        self.info = info;
        self
    }

    pub fn with_align(mut self, align: u64) -> Self {
        self.align = align;
        self
    }

    pub fn with_entsize(mut self, entsize: u64) -> Self {
        self.entsize = entsize;
        self
    }
}

/// Which symbol table [`ElfWriter::symbols`] emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// `.symtab` linked to `.strtab`.
    Static,
    /// `.dynsym` linked to `.dynstr`.
    Dynamic,
}

/// One symbol to place in a generated symbol table.
#[derive(Debug, Clone)]
pub struct SymbolDesc {
    pub name: String,
    pub value: u64,
    pub size: u64,
    pub info: u8,
    pub other: u8,
    pub shndx: u16,
    /// Overrides the `st_name` offset written for this symbol.
    pub name_offset: Option<u32>,
}

impl SymbolDesc {
    pub fn new(name: &str, bind: u8, sym_type: u8, shndx: u16, value: u64) -> Self {
        Self {
            name: name.to_string(),
            value,
            size: 0,
            info: (bind << 4) | (sym_type & 0xf),
            other: 0,
            shndx,
            name_offset: None,
        }
    }

    pub fn global_func(name: &str, shndx: u16, value: u64) -> Self {
        Self::new(name, STB_GLOBAL, STT_FUNC, shndx, value)
    }

    pub fn weak_func(name: &str, shndx: u16, value: u64) -> Self {
        Self::new(name, STB_WEAK, STT_FUNC, shndx, value)
    }

    pub fn global_object(name: &str, shndx: u16, value: u64) -> Self {
        Self::new(name, STB_GLOBAL, STT_OBJECT, shndx, value)
    }

    pub fn local_object(name: &str, shndx: u16, value: u64) -> Self {
        Self::new(name, STB_LOCAL, STT_OBJECT, shndx, value)
    }

    pub fn undefined_func(name: &str) -> Self {
        Self::new(name, STB_GLOBAL, STT_FUNC, 0, 0)
    }

    pub fn undefined(name: &str) -> Self {
        Self::new(name, STB_GLOBAL, STT_NOTYPE, 0, 0)
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_other(mut self, other: u8) -> Self {
        self.other = other;
        self
    }

    pub fn with_name_offset(mut self, offset: u32) -> Self {
        self.name_offset = Some(offset);
        self
    }
}
