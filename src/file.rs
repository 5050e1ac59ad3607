use crate::{
    Result,
    elf::{ElfHeader, SectionHeader, Segment, SegmentType, read_table},
    error::to_usize,
    input::{ByteSource, IntoByteSource},
    section::SectionIndex,
    symbol::{SymbolTable, SymbolTableKind, load_symbols},
};
use alloc::vec::Vec;

/// A decoded view of an ELF image.
///
/// Parsing decodes the file header, the program headers and the section
/// header table in one pass. Symbol tables are decoded on request.
///
/// # Examples
/// ```rust,no_run
/// use elf_inspect::ElfFile;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let bytes = std::fs::read("/bin/true")?;
///     let file = ElfFile::parse(&bytes)?;
///     for section in file.sections().iter() {
///         println!("{:?}", section.name_str());
///     }
///     if let Some(main) = file.symbols()?.lookup("main") {
///         println!("main at 0x{:x}", main.st_value);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ElfFile<'data> {
    source: ByteSource<'data>,
    header: ElfHeader,
    segments: Vec<Segment>,
    sections: SectionIndex<'data>,
}

impl<'data> ElfFile<'data> {
    /// Decodes the header, program headers and section headers of `source`.
    pub fn parse(source: impl IntoByteSource<'data>) -> Result<Self> {
        let source = source.into_source();
        #[cfg(feature = "log")]
        log::debug!("Parsing ELF image: {} ({} bytes)", source.name(), source.len());

        Self::parse_inner(source).map_err(|e| {
            #[cfg(feature = "log")]
            log::error!("Failed to parse ELF image {}: {}", source.name(), e);
            e
        })
    }

    fn parse_inner(source: ByteSource<'data>) -> Result<Self> {
        let header = ElfHeader::decode(&source)?;
        let (phdr_start, _) = header.phdr_range();
        let segments = read_table(
            &source,
            header.layout(),
            phdr_start,
            header.e_phnum(),
            header.e_phentsize(),
        )?;
        let sections = SectionIndex::build(&source, &header)?;
        Ok(Self {
            source,
            header,
            segments,
            sections,
        })
    }

    /// Returns the source the file was parsed from.
    #[inline]
    pub fn source(&self) -> &ByteSource<'data> {
        &self.source
    }

    #[inline]
    pub fn header(&self) -> &ElfHeader {
        &self.header
    }

    /// Returns the program headers in file order.
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn sections(&self) -> &SectionIndex<'data> {
        &self.sections
    }

    /// Decodes the `SHT_SYMTAB` symbol table.
    pub fn symbols(&self) -> Result<SymbolTable<'data>> {
        load_symbols(&self.source, &self.sections, SymbolTableKind::Static)
    }

    /// Decodes the `SHT_DYNSYM` symbol table.
    pub fn dynamic_symbols(&self) -> Result<SymbolTable<'data>> {
        load_symbols(&self.source, &self.sections, SymbolTableKind::Dynamic)
    }

    /// Returns the file bytes of `section`; empty for `SHT_NOBITS` sections.
    pub fn section_data(&self, section: &SectionHeader) -> Result<&'data [u8]> {
        self.sections.data(&self.source, section)
    }

    /// Returns the file bytes of `segment` (`p_filesz` bytes at `p_offset`).
    pub fn segment_data(&self, segment: &Segment) -> Result<&'data [u8]> {
        let source = &self.source;
        let offset = to_usize("segment offset", segment.p_offset, source.len())?;
        let size = to_usize("segment size", segment.p_filesz, source.len())?;
        source.read(offset, size)
    }

    /// Returns the interpreter path named by the `PT_INTERP` segment, without
    /// its terminator.
    pub fn interp(&self) -> Result<Option<&'data [u8]>> {
        let Some(segment) = self
            .segments
            .iter()
            .find(|segment| segment.segment_type() == SegmentType::Interp)
        else {
            return Ok(None);
        };
        let data = self.segment_data(segment)?;
        let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        Ok(Some(&data[..end]))
    }
}
