//! Named section headers and lookups over them.

use crate::{
    Result,
    elf::{ElfHeader, Layout, SectionHeader, SectionType, StringTable, abi::SHN_UNDEF, read_table},
    error::to_usize,
    input::ByteSource,
    out_of_range, section_not_found,
};
use alloc::{format, vec::Vec};
use core::{fmt::Debug, ops::Deref};
use hashbrown::HashMap;

/// A section header together with its resolved name.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Section<'data> {
    index: usize,
    name: &'data [u8],
    header: SectionHeader,
}

impl Deref for Section<'_> {
    type Target = SectionHeader;

    fn deref(&self) -> &Self::Target {
        &self.header
    }
}

impl Debug for Section<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Section")
            .field("index", &self.index)
            .field("name", &self.name.escape_ascii())
            .field("type", &self.section_type())
            .field("offset", &format_args!("0x{:x}", self.sh_offset))
            .field("size", &self.sh_size)
            .field("link", &self.sh_link)
            .finish()
    }
}

impl<'data> Section<'data> {
    /// Returns the position of this section in the section header table.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the raw name bytes.
    #[inline]
    pub fn name(&self) -> &'data [u8] {
        self.name
    }

    /// Returns the name if it is valid UTF-8.
    #[inline]
    pub fn name_str(&self) -> Option<&'data str> {
        core::str::from_utf8(self.name).ok()
    }

    /// Returns the raw header.
    #[inline]
    pub fn header(&self) -> &SectionHeader {
        &self.header
    }
}

/// The decoded section header table, with names resolved once at build time.
///
/// Lookups by type return sections in file order, so when several sections
/// share a type the one with the lowest index is reported first.
pub struct SectionIndex<'data> {
    layout: Layout,
    sections: Vec<Section<'data>>,
    by_name: HashMap<&'data [u8], usize>,
    by_type: HashMap<u32, Vec<usize>>,
}

impl Debug for SectionIndex<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SectionIndex")
            .field("layout", &self.layout)
            .field("sections", &self.sections)
            .finish()
    }
}

impl<'data> SectionIndex<'data> {
    /// Decodes the section header table described by `header` and resolves
    /// section names through the table at `e_shstrndx`.
    ///
    /// A file without a section-name table (`e_shstrndx == SHN_UNDEF`) yields
    /// sections with empty names.
    pub fn build(source: &ByteSource<'data>, header: &ElfHeader) -> Result<Self> {
        let layout = header.layout();
        let (shdr_start, _) = header.shdr_range();
        let headers: Vec<SectionHeader> = read_table(
            source,
            layout,
            shdr_start,
            header.e_shnum(),
            header.e_shentsize(),
        )?;
        Self::from_headers(source, layout, headers, header.e_shstrndx())
    }

    /// Builds the index from already decoded headers.
    pub fn from_headers(
        source: &ByteSource<'data>,
        layout: Layout,
        headers: Vec<SectionHeader>,
        shstrndx: usize,
    ) -> Result<Self> {
        let names = if headers.is_empty() || shstrndx == usize::from(SHN_UNDEF) {
            None
        } else {
            let shstrtab = headers.get(shstrndx).ok_or_else(|| {
                out_of_range(
                    "section name table index",
                    shstrndx as u64,
                    1,
                    headers.len() as u64,
                )
            })?;
            Some(StringTable::from_section(source, shstrtab)?)
        };

        let mut sections = Vec::with_capacity(headers.len());
        let mut by_name = HashMap::with_capacity(headers.len());
        let mut by_type: HashMap<u32, Vec<usize>> = HashMap::new();
        for (index, header) in headers.into_iter().enumerate() {
            let name = match &names {
                Some(strtab) => strtab.resolve(header.sh_name as usize)?,
                None => &[],
            };
            if !name.is_empty() {
                by_name.entry(name).or_insert(index);
            }
            by_type.entry(header.sh_type).or_default().push(index);
            sections.push(Section {
                index,
                name,
                header,
            });
        }

        #[cfg(feature = "log")]
        log::debug!(
            "[{}] indexed {} section(s), {} distinct type(s)",
            source.name(),
            sections.len(),
            by_type.len()
        );

        Ok(Self {
            layout,
            sections,
            by_name,
            by_type,
        })
    }

    /// Returns the layout of the file the sections were decoded from.
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Returns the number of sections, including the null section at index 0.
    #[inline]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Returns the section at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Section<'data>> {
        self.sections.get(index)
    }

    /// Iterates over all sections in file order.
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Section<'data>> {
        self.sections.iter()
    }

    /// Returns all sections in file order.
    #[inline]
    pub fn as_slice(&self) -> &[Section<'data>] {
        &self.sections
    }

    /// Returns the name of `section`.
    #[inline]
    pub fn name_of(&self, section: &Section<'data>) -> &'data [u8] {
        section.name
    }

    /// Returns the first section, in file order, of type `ty`.
    pub fn find_by_type(&self, ty: SectionType) -> Result<&Section<'data>> {
        self.by_type
            .get(&u32::from(ty))
            .and_then(|indices| indices.first())
            .map(|&index| &self.sections[index])
            .ok_or_else(|| section_not_found(format!("no section of type {:?}", ty)))
    }

    /// Iterates over every section of type `ty`, in file order.
    pub fn find_all_by_type(&self, ty: SectionType) -> impl Iterator<Item = &Section<'data>> {
        self.by_type
            .get(&u32::from(ty))
            .into_iter()
            .flatten()
            .map(|&index| &self.sections[index])
    }

    /// Returns the first section, in file order, named `name`.
    pub fn find_by_name(&self, name: &str) -> Result<&Section<'data>> {
        self.by_name
            .get(name.as_bytes())
            .map(|&index| &self.sections[index])
            .ok_or_else(|| section_not_found(format!("no section named {:?}", name)))
    }

    /// Returns the section referenced by the `sh_link` field of `section`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if the link is not a valid section index.
    pub fn linked(&self, section: &SectionHeader) -> Result<&Section<'data>> {
        let link = section.sh_link as usize;
        self.sections
            .get(link)
            .ok_or_else(|| out_of_range("section link", link as u64, 1, self.len() as u64))
    }

    /// Returns the file bytes of `section`; empty for `SHT_NOBITS` sections.
    pub fn data(&self, source: &ByteSource<'data>, section: &SectionHeader) -> Result<&'data [u8]> {
        if section.is_nobits() {
            return Ok(&[]);
        }
        let offset = to_usize("section offset", section.sh_offset, source.len())?;
        let size = to_usize("section size", section.sh_size, source.len())?;
        source.read(offset, size)
    }
}
