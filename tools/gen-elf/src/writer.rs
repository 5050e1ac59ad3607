use crate::{
    Class, ElfWriterConfig, Endian, SectionDesc, SegmentDesc, SymbolDesc, SymbolKind,
    emit::Emitter,
};
use elf::abi::{
    ELFMAGIC, EV_CURRENT, SHF_ALLOC, SHT_DYNSYM, SHT_NOBITS, SHT_STRTAB, SHT_SYMTAB, STB_LOCAL,
};

/// Builds a synthetic ELF image.
///
/// Section index 0 is the null section; sections added with
/// [`section`](Self::section) and [`symbols`](Self::symbols) follow in call
/// order, and `.shstrtab` is appended last. An image with no sections gets
/// no section header table at all.
#[derive(Debug, Clone, Default)]
pub struct ElfWriter {
    config: ElfWriterConfig,
    segments: Vec<SegmentDesc>,
    sections: Vec<SectionDesc>,
}

/// The generated image and where its parts were placed.
#[derive(Debug, Clone)]
pub struct ElfOutput {
    pub data: Vec<u8>,
    pub class: Class,
    pub endian: Endian,
    pub phoff: u64,
    pub shoff: u64,
    pub shnum: usize,
    pub shstrndx: usize,
    /// File offset of each segment's bytes.
    pub segment_offsets: Vec<u64>,
    /// File offset of each section's bytes, indexed by section index.
    pub section_offsets: Vec<u64>,
}

impl ElfOutput {
    /// File offset of the section header at `index`.
    pub fn section_header_offset(&self, index: usize) -> usize {
        self.shoff as usize + index * self.class.shdr_size()
    }

    /// File offset of the `sh_size` field of the section header at `index`.
    pub fn sh_size_offset(&self, index: usize) -> usize {
        self.section_header_offset(index) + 8 + 3 * self.class.word_size()
    }

    /// File offset of the `sh_link` field of the section header at `index`.
    pub fn sh_link_offset(&self, index: usize) -> usize {
        self.section_header_offset(index) + 8 + 4 * self.class.word_size()
    }

    /// File offset of the `sh_entsize` field of the section header at `index`.
    pub fn sh_entsize_offset(&self, index: usize) -> usize {
        self.section_header_offset(index) + 16 + 5 * self.class.word_size()
    }

    /// File offset of the `e_shstrndx` field of the file header.
    pub fn e_shstrndx_offset(&self) -> usize {
        self.class.ehdr_size() - 2
    }

    pub fn patch_u16(&mut self, offset: usize, value: u16) {
        let bytes = match self.endian {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        };
        self.data[offset..offset + 2].copy_from_slice(&bytes);
    }

    pub fn patch_u32(&mut self, offset: usize, value: u32) {
        let bytes = match self.endian {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        };
        self.data[offset..offset + 4].copy_from_slice(&bytes);
    }

    /// Writes an address-sized field.
    pub fn patch_word(&mut self, offset: usize, value: u64) {
        match self.class {
            Class::Elf32 => self.patch_u32(offset, value as u32),
            Class::Elf64 => {
                let bytes = match self.endian {
                    Endian::Little => value.to_le_bytes(),
                    Endian::Big => value.to_be_bytes(),
                };
                self.data[offset..offset + 8].copy_from_slice(&bytes);
            }
        }
    }
}

impl ElfWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ElfWriterConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The index the next added section will receive.
    pub fn next_section_index(&self) -> u32 {
        self.sections.len() as u32 + 1
    }

    pub fn segment(mut self, segment: SegmentDesc) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn section(mut self, section: SectionDesc) -> Self {
        self.sections.push(section);
        self
    }

    /// Adds a string table followed by a symbol table linked to it.
    ///
    /// The reserved null symbol is written first; `symbols` follow in order.
    pub fn symbols(self, kind: SymbolKind, symbols: &[SymbolDesc]) -> Self {
        let class = self.config.class;
        let mut strtab = vec![0u8];
        let mut entries = Emitter::new(class, self.config.endian);
        write_symbol(&mut entries, class, 0, &SymbolDesc::new("", 0, 0, 0, 0));
        for symbol in symbols {
            let st_name = if symbol.name.is_empty() {
                0
            } else {
                let offset = strtab.len() as u32;
                strtab.extend_from_slice(symbol.name.as_bytes());
                strtab.push(0);
                offset
            };
            write_symbol(
                &mut entries,
                class,
                symbol.name_offset.unwrap_or(st_name),
                symbol,
            );
        }
        let locals = symbols
            .iter()
            .take_while(|symbol| symbol.info >> 4 == STB_LOCAL)
            .count();

        let (strtab_name, symtab_name, sh_type, flags) = match kind {
            SymbolKind::Static => (".strtab", ".symtab", SHT_SYMTAB, 0),
            SymbolKind::Dynamic => (".dynstr", ".dynsym", SHT_DYNSYM, SHF_ALLOC as u64),
        };
        let strtab_index = self.next_section_index();
        self.section(
            SectionDesc::new(strtab_name, SHT_STRTAB)
                .with_data(&strtab)
                .with_flags(flags),
        )
        .section(
            SectionDesc::new(symtab_name, sh_type)
                .with_data(&entries.buf)
                .with_flags(flags)
                .with_link(strtab_index)
                .with_info(locals as u32 + 1)
                .with_align(class.word_size() as u64)
                .with_entsize(class.sym_size() as u64),
        )
    }

    pub fn write(self) -> ElfOutput {
        let config = self.config;
        let class = config.class;
        let mut sections = self.sections;

        let shstrndx = if sections.is_empty() {
            0
        } else {
            sections.push(SectionDesc::new(".shstrtab", SHT_STRTAB));
            sections.len()
        };
        let mut shstrtab = vec![0u8];
        let mut name_offsets = Vec::with_capacity(sections.len());
        for section in &sections {
            name_offsets.push(shstrtab.len() as u32);
            shstrtab.extend_from_slice(section.name.as_bytes());
            shstrtab.push(0);
        }
        if let Some(last) = sections.last_mut() {
            last.data = shstrtab;
        }

        // Place the header, program headers, segment bytes, section bytes and
        // finally the section header table.
        let phoff = if self.segments.is_empty() {
            0
        } else {
            class.ehdr_size()
        };
        let mut cursor = class.ehdr_size() + self.segments.len() * class.phdr_size();
        let mut segment_offsets = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            cursor = cursor.next_multiple_of(8);
            segment_offsets.push(cursor as u64);
            cursor += segment.data.len();
        }
        let mut section_offsets = vec![0u64];
        for section in &sections {
            cursor = cursor.next_multiple_of(section.align.max(1) as usize);
            section_offsets.push(cursor as u64);
            if section.sh_type != SHT_NOBITS {
                cursor += section.data.len();
            }
        }
        let shoff = if sections.is_empty() {
            0
        } else {
            cursor.next_multiple_of(8)
        };
        let shnum = if sections.is_empty() {
            0
        } else {
            sections.len() + 1
        };

        let mut out = Emitter::new(class, config.endian);
        out.bytes(&ELFMAGIC);
        out.u8(match class {
            Class::Elf32 => elf::abi::ELFCLASS32,
            Class::Elf64 => elf::abi::ELFCLASS64,
        });
        out.u8(match config.endian {
            Endian::Little => elf::abi::ELFDATA2LSB,
            Endian::Big => elf::abi::ELFDATA2MSB,
        });
        out.u8(EV_CURRENT);
        out.bytes(&[0; 9]);
        out.u16(config.e_type);
        out.u16(config.machine);
        out.u32(u32::from(EV_CURRENT));
        out.word(config.entry);
        out.word(phoff as u64);
        out.word(shoff as u64);
        out.u32(config.flags);
        out.u16(class.ehdr_size() as u16);
        out.u16(config.phentsize.unwrap_or(class.phdr_size() as u16));
        out.u16(self.segments.len() as u16);
        out.u16(config.shentsize.unwrap_or(class.shdr_size() as u16));
        out.u16(shnum as u16);
        out.u16(shstrndx as u16);

        for (segment, &offset) in self.segments.iter().zip(&segment_offsets) {
            write_phdr(&mut out, class, segment, offset);
        }
        for (segment, &offset) in self.segments.iter().zip(&segment_offsets) {
            out.buf.resize(offset as usize, 0);
            out.bytes(&segment.data);
        }
        for (section, &offset) in sections.iter().zip(&section_offsets[1..]) {
            if section.sh_type != SHT_NOBITS {
                out.buf.resize(offset as usize, 0);
                out.bytes(&section.data);
            }
        }

        if shnum != 0 {
            out.buf.resize(shoff, 0);
            out.bytes(&vec![0u8; class.shdr_size()]);
            for ((section, &offset), &name) in sections
                .iter()
                .zip(&section_offsets[1..])
                .zip(&name_offsets)
            {
                write_shdr(&mut out, section, name, offset);
            }
        }
        debug_assert!(shnum == 0 || out.len() == shoff + shnum * class.shdr_size());

        ElfOutput {
            data: out.buf,
            class,
            endian: config.endian,
            phoff: phoff as u64,
            shoff: shoff as u64,
            shnum,
            shstrndx,
            segment_offsets,
            section_offsets,
        }
    }
}

fn write_phdr(out: &mut Emitter, class: Class, segment: &SegmentDesc, offset: u64) {
    let filesz = segment.data.len() as u64;
    let memsz = segment.memsz.unwrap_or(filesz);
    match class {
        Class::Elf32 => {
            out.u32(segment.p_type);
            out.word(offset);
            out.word(segment.vaddr);
            out.word(segment.paddr);
            out.word(filesz);
            out.word(memsz);
            out.u32(segment.flags);
            out.word(segment.align);
        }
        Class::Elf64 => {
            out.u32(segment.p_type);
            out.u32(segment.flags);
            out.word(offset);
            out.word(segment.vaddr);
            out.word(segment.paddr);
            out.word(filesz);
            out.word(memsz);
            out.word(segment.align);
        }
    }
}

fn write_shdr(out: &mut Emitter, section: &SectionDesc, name: u32, offset: u64) {
    let size = if section.sh_type == SHT_NOBITS {
        section.nobits_size
    } else {
        section.data.len() as u64
    };
    out.u32(name);
    out.u32(section.sh_type);
    out.word(section.flags);
    out.word(section.addr);
    out.word(offset);
    out.word(size);
    out.u32(section.link);
    out.u32(section.info);
    out.word(section.align);
    out.word(section.entsize);
}

fn write_symbol(out: &mut Emitter, class: Class, st_name: u32, symbol: &SymbolDesc) {
    match class {
        Class::Elf32 => {
            out.u32(st_name);
            out.word(symbol.value);
            out.word(symbol.size);
            out.u8(symbol.info);
            out.u8(symbol.other);
            out.u16(symbol.shndx);
        }
        Class::Elf64 => {
            out.u32(st_name);
            out.u8(symbol.info);
            out.u8(symbol.other);
            out.u16(symbol.shndx);
            out.word(symbol.value);
            out.word(symbol.size);
        }
    }
}
