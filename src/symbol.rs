//! Symbol table loading.
//!
//! A symbol table section is located through the [`SectionIndex`], its
//! entries are decoded with the generic table reader and every name is
//! resolved against the string table the section links to.

use crate::{
    Result,
    elf::{SectionType, StringTable, SymbolEntry, read_table},
    error::to_usize,
    input::ByteSource,
    section::SectionIndex,
    size_mismatch,
};
use alloc::vec::Vec;
use core::{fmt::Debug, ops::Deref};
use hashbrown::HashMap;

/// Which of the two symbol tables to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolTableKind {
    /// The full link-time table (`SHT_SYMTAB`, usually `.symtab`).
    Static,
    /// The dynamic linking table (`SHT_DYNSYM`, usually `.dynsym`).
    Dynamic,
}

impl SymbolTableKind {
    /// Returns the section type holding this table.
    #[inline]
    pub fn section_type(self) -> SectionType {
        match self {
            SymbolTableKind::Static => SectionType::SymTab,
            SymbolTableKind::Dynamic => SectionType::DynSym,
        }
    }
}

/// A symbol entry together with its resolved name.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Symbol<'data> {
    index: usize,
    name: &'data [u8],
    entry: SymbolEntry,
}

impl Deref for Symbol<'_> {
    type Target = SymbolEntry;

    fn deref(&self) -> &Self::Target {
        &self.entry
    }
}

impl Debug for Symbol<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Symbol")
            .field("index", &self.index)
            .field("name", &self.name.escape_ascii())
            .field("value", &format_args!("0x{:x}", self.st_value))
            .field("size", &self.st_size)
            .field("bind", &self.bind())
            .field("type", &self.sym_type())
            .field("shndx", &self.st_shndx)
            .finish()
    }
}

impl<'data> Symbol<'data> {
    /// Returns the position of this symbol in its table.
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

    /// Returns the raw entry.
    #[inline]
    pub fn entry(&self) -> &SymbolEntry {
        &self.entry
    }
}

/// The decoded symbols of one symbol table, in file order.
///
/// Index 0 is the reserved undefined symbol and is always present when the
/// table is not empty.
pub struct SymbolTable<'data> {
    kind: SymbolTableKind,
    symbols: Vec<Symbol<'data>>,
    by_name: HashMap<&'data [u8], usize>,
}

impl Debug for SymbolTable<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SymbolTable")
            .field("kind", &self.kind)
            .field("symbols", &self.symbols)
            .finish()
    }
}

impl<'data> SymbolTable<'data> {
    fn new(kind: SymbolTableKind, symbols: Vec<Symbol<'data>>) -> Self {
        let mut by_name = HashMap::with_capacity(symbols.len());
        for symbol in symbols.iter().skip(1) {
            if !symbol.name.is_empty() {
                by_name.entry(symbol.name).or_insert(symbol.index);
            }
        }
        Self {
            kind,
            symbols,
            by_name,
        }
    }

    #[inline]
    pub fn kind(&self) -> SymbolTableKind {
        self.kind
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Symbol<'data>> {
        self.symbols.get(index)
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, Symbol<'data>> {
        self.symbols.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Symbol<'data>] {
        &self.symbols
    }

    /// Returns the first symbol, in file order, named `name`.
    ///
    /// The reserved symbol at index 0 never matches.
    pub fn lookup(&self, name: &str) -> Option<&Symbol<'data>> {
        self.by_name
            .get(name.as_bytes())
            .map(|&index| &self.symbols[index])
    }
}

impl<'data> IntoIterator for SymbolTable<'data> {
    type Item = Symbol<'data>;
    type IntoIter = alloc::vec::IntoIter<Symbol<'data>>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.into_iter()
    }
}

impl<'a, 'data> IntoIterator for &'a SymbolTable<'data> {
    type Item = &'a Symbol<'data>;
    type IntoIter = core::slice::Iter<'a, Symbol<'data>>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.iter()
    }
}

/// Decodes the symbol table of the given kind.
///
/// # Errors
///
/// * `SectionNotFound` if the file has no section of the table's type.
/// * `OutOfRange` if the section's `sh_link` is not a valid section index, if
///   the table does not fit in `source`, or if a name offset lies outside the
///   linked string table.
/// * `SizeMismatch` if `sh_entsize` is zero, differs from the symbol size of
///   the file class, or does not divide `sh_size`.
pub fn load_symbols<'data>(
    source: &ByteSource<'data>,
    index: &SectionIndex<'data>,
    kind: SymbolTableKind,
) -> Result<SymbolTable<'data>> {
    let layout = index.layout();
    let section = index.find_by_type(kind.section_type())?;
    let strtab = StringTable::from_section(source, index.linked(section)?)?;

    let entsize = section.sh_entsize;
    let expected = layout.sym_size() as u64;
    if entsize != expected {
        return Err(size_mismatch("symbol table entry", expected, entsize));
    }
    if section.sh_size % entsize != 0 {
        return Err(size_mismatch(
            "symbol table",
            section.sh_size - section.sh_size % entsize,
            section.sh_size,
        ));
    }

    let entries: Vec<SymbolEntry> = read_table(
        source,
        layout,
        to_usize("symbol table offset", section.sh_offset, source.len())?,
        to_usize("symbol count", section.sh_size / entsize, source.len())?,
        to_usize("symbol table entry", entsize, source.len())?,
    )?;

    let symbols = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            Ok(Symbol {
                index,
                name: strtab.resolve(entry.st_name as usize)?,
                entry,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    #[cfg(feature = "log")]
    log::debug!(
        "[{}] loaded {} symbol(s) from {:?} section {}",
        source.name(),
        symbols.len(),
        kind,
        section.index()
    );

    Ok(SymbolTable::new(kind, symbols))
}
