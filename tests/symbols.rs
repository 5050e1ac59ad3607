use elf_inspect::{
    ElfFile, Error,
    elf::{SymbolBind, SymbolType, SymbolVisibility, abi, st_bind, st_type, st_visibility},
    symbol::{SymbolTableKind, load_symbols},
};
use gen_elf::{Class, ElfWriter, ElfWriterConfig, SectionDesc, SymbolDesc, SymbolKind};

const TEXT: u16 = 1;

fn with_symbols(class: Class, endian: gen_elf::Endian, kind: SymbolKind) -> gen_elf::ElfOutput {
    let config = ElfWriterConfig::default()
        .with_class(class)
        .with_endian(endian);
    ElfWriter::with_config(config)
        .section(SectionDesc::progbits(".text", &[0x90; 64]).with_addr(0x1000))
        .symbols(
            kind,
            &[
                SymbolDesc::local_object("counter", TEXT, 0x1030).with_size(4),
                SymbolDesc::global_func("main", TEXT, 0x1000).with_size(0x20),
                SymbolDesc::weak_func("helper", TEXT, 0x1020)
                    .with_size(0x10)
                    .with_other(abi::STV_HIDDEN),
                SymbolDesc::undefined_func("puts"),
                SymbolDesc::global_func("main", TEXT, 0x2000),
            ],
        )
        .write()
}

#[test]
fn symbols_decode_in_file_order() {
    for class in [Class::Elf32, Class::Elf64] {
        for endian in [gen_elf::Endian::Little, gen_elf::Endian::Big] {
            let output = with_symbols(class, endian, SymbolKind::Static);
            let file = ElfFile::parse(&output.data).unwrap();
            let symbols = file.symbols().unwrap();
            assert_eq!(symbols.kind(), SymbolTableKind::Static);
            assert_eq!(symbols.len(), 6);

            let null = symbols.get(0).unwrap();
            assert_eq!(null.name(), b"");
            assert_eq!(null.st_value, 0);
            assert!(null.is_undefined());

            let names: Vec<_> = symbols.iter().map(|s| s.name_str().unwrap()).collect();
            assert_eq!(names, ["", "counter", "main", "helper", "puts", "main"]);

            let counter = symbols.get(1).unwrap();
            assert_eq!(counter.bind(), SymbolBind::Local);
            assert_eq!(counter.sym_type(), SymbolType::Object);
            assert_eq!(counter.st_size, 4);
            assert!(!counter.is_global());

            let main = symbols.lookup("main").unwrap();
            assert_eq!(main.index(), 2);
            assert_eq!(main.st_value, 0x1000);
            assert_eq!(main.st_size, 0x20);
            assert_eq!(main.st_shndx, TEXT);
            assert_eq!(main.bind(), SymbolBind::Global);
            assert_eq!(main.sym_type(), SymbolType::Func);
            assert_eq!(main.visibility(), SymbolVisibility::Default);

            let helper = symbols.lookup("helper").unwrap();
            assert_eq!(helper.bind(), SymbolBind::Weak);
            assert_eq!(helper.visibility(), SymbolVisibility::Hidden);
            assert!(helper.is_global());

            let puts = symbols.lookup("puts").unwrap();
            assert!(puts.is_undefined());
            assert!(symbols.lookup("").is_none());
            assert!(symbols.lookup("printf").is_none());
        }
    }
}

#[test]
fn dynamic_symbols_use_dynsym() {
    let output = with_symbols(Class::Elf64, gen_elf::Endian::Little, SymbolKind::Dynamic);
    let file = ElfFile::parse(&output.data).unwrap();
    assert!(matches!(file.symbols(), Err(Error::SectionNotFound { .. })));

    let dynsym = file.dynamic_symbols().unwrap();
    assert_eq!(dynsym.kind(), SymbolTableKind::Dynamic);
    assert_eq!(dynsym.len(), 6);
    let owned: Vec<_> = dynsym.into_iter().map(|s| s.index()).collect();
    assert_eq!(owned, [0, 1, 2, 3, 4, 5]);
}

#[test]
fn absolute_and_common_symbols() {
    let output = ElfWriter::new()
        .section(SectionDesc::progbits(".text", &[0x90; 16]))
        .symbols(
            SymbolKind::Static,
            &[
                SymbolDesc::new(
                    "PAGE_SIZE",
                    abi::STB_GLOBAL,
                    abi::STT_NOTYPE,
                    abi::SHN_ABS,
                    0x1000,
                ),
                SymbolDesc::new(
                    "shared_buf",
                    abi::STB_GLOBAL,
                    abi::STT_OBJECT,
                    abi::SHN_COMMON,
                    16,
                )
                .with_size(64),
                SymbolDesc::global_func("entry", TEXT, 0),
            ],
        )
        .write();
    let file = ElfFile::parse(&output.data).unwrap();
    let symbols = file.symbols().unwrap();

    let page_size = symbols.lookup("PAGE_SIZE").unwrap();
    assert!(page_size.is_absolute());
    assert!(!page_size.is_common());
    assert!(!page_size.is_undefined());
    assert_eq!(page_size.entry().st_value, 0x1000);

    let shared = symbols.lookup("shared_buf").unwrap();
    assert!(shared.is_common());
    assert!(!shared.is_absolute());
    assert_eq!(shared.entry().st_shndx, abi::SHN_COMMON);
    assert_eq!(shared.entry().st_size, 64);

    let entry = symbols.lookup("entry").unwrap();
    assert!(!entry.is_absolute());
    assert!(!entry.is_common());
    assert_eq!(entry.entry(), &**entry);
}

#[test]
fn file_without_symbols() {
    let output = ElfWriter::new()
        .section(SectionDesc::progbits(".text", &[0]))
        .write();
    let file = ElfFile::parse(&output.data).unwrap();
    assert!(matches!(
        load_symbols(file.source(), file.sections(), SymbolTableKind::Static),
        Err(Error::SectionNotFound { .. })
    ));
}

#[test]
fn symbol_table_link_past_section_array() {
    // Sections: null, .symtab, .shstrtab.
    let output = ElfWriter::new()
        .section(
            SectionDesc::new(".symtab", abi::SHT_SYMTAB)
                .with_data(&[0; 24])
                .with_link(5)
                .with_entsize(24),
        )
        .write();
    let file = ElfFile::parse(&output.data).unwrap();
    assert_eq!(file.sections().len(), 3);
    assert_eq!(
        file.symbols().unwrap_err(),
        Error::OutOfRange {
            what: "section link",
            offset: 5,
            len: 1,
            size: 3,
        }
    );
}

#[test]
fn name_offset_at_end_of_string_table() {
    // The generated .strtab is "\0main\0": six bytes.
    let output = ElfWriter::new()
        .symbols(
            SymbolKind::Static,
            &[SymbolDesc::global_func("main", 0, 0).with_name_offset(6)],
        )
        .write();
    let file = ElfFile::parse(&output.data).unwrap();
    assert_eq!(
        file.sections().find_by_name(".strtab").unwrap().sh_size,
        6
    );
    assert_eq!(
        file.symbols().unwrap_err(),
        Error::OutOfRange {
            what: "string table offset",
            offset: 6,
            len: 1,
            size: 6,
        }
    );
}

#[test]
fn symbol_entry_size_must_match_class() {
    for (class, wrong) in [(Class::Elf64, 16), (Class::Elf32, 24), (Class::Elf64, 0)] {
        let mut output = with_symbols(class, gen_elf::Endian::Little, SymbolKind::Static);
        // Sections: null, .text, .strtab, .symtab, .shstrtab.
        let offset = output.sh_entsize_offset(3);
        output.patch_word(offset, wrong);
        let file = ElfFile::parse(&output.data).unwrap();
        assert_eq!(
            file.symbols().unwrap_err(),
            Error::SizeMismatch {
                what: "symbol table entry",
                expected: class.sym_size() as u64,
                found: wrong,
            }
        );
    }
}

#[test]
fn symbol_table_size_must_be_whole_entries() {
    let mut output = with_symbols(Class::Elf64, gen_elf::Endian::Little, SymbolKind::Static);
    let offset = output.sh_size_offset(3);
    output.patch_word(offset, 6 * 24 - 1);
    let file = ElfFile::parse(&output.data).unwrap();
    assert!(matches!(
        file.symbols(),
        Err(Error::SizeMismatch {
            what: "symbol table",
            ..
        })
    ));
}

#[test]
fn symbol_table_past_end_of_file() {
    let mut output = with_symbols(Class::Elf32, gen_elf::Endian::Big, SymbolKind::Static);
    let offset = output.sh_size_offset(3);
    output.patch_word(offset, 16 * 4096);
    let file = ElfFile::parse(&output.data).unwrap();
    assert!(matches!(file.symbols(), Err(Error::OutOfRange { .. })));
}

#[test]
fn info_byte_decomposition() {
    for info in 0..=u8::MAX {
        assert_eq!(st_bind(info), info >> 4);
        assert_eq!(st_type(info), info & 0xf);
        assert_eq!(
            SymbolBind::from(st_bind(info)),
            match info >> 4 {
                0 => SymbolBind::Local,
                1 => SymbolBind::Global,
                2 => SymbolBind::Weak,
                other => SymbolBind::Other(other),
            }
        );
    }
    assert_eq!(SymbolType::from(st_type(0x1a)), SymbolType::Other(0xa));
    assert_eq!(SymbolType::from(st_type(0x16)), SymbolType::Tls);
}

#[test]
fn other_byte_visibility() {
    for other in 0..=u8::MAX {
        let expected = match other & 0x3 {
            0 => SymbolVisibility::Default,
            1 => SymbolVisibility::Internal,
            2 => SymbolVisibility::Hidden,
            _ => SymbolVisibility::Protected,
        };
        assert_eq!(st_visibility(other), other & 0x3);
        assert_eq!(SymbolVisibility::from(other), expected);
    }
}
