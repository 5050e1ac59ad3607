use elf_inspect::{
    ElfFile, Error,
    elf::{SectionFlags, SectionType, StringTable, abi},
    input::ByteSource,
    section::SectionIndex,
};
use gen_elf::{Class, ElfWriter, ElfWriterConfig, SectionDesc};

fn sample(class: Class) -> gen_elf::ElfOutput {
    ElfWriter::with_config(ElfWriterConfig::default().with_class(class))
        .section(
            SectionDesc::progbits(".text", &[0x90; 12])
                .with_flags((abi::SHF_ALLOC | abi::SHF_EXECINSTR) as u64)
                .with_addr(0x1000)
                .with_align(16),
        )
        .section(
            SectionDesc::progbits(".rodata", b"hello\0")
                .with_flags(abi::SHF_ALLOC as u64)
                .with_align(8),
        )
        .section(
            SectionDesc::nobits(".bss", 0x400)
                .with_flags((abi::SHF_ALLOC | abi::SHF_WRITE) as u64)
                .with_align(32),
        )
        .section(SectionDesc::new(".init_array", abi::SHT_INIT_ARRAY).with_data(&[0; 8]))
        .section(SectionDesc::new(".note.gnu", abi::SHT_NOTE).with_data(&[0; 16]))
        .write()
}

#[test]
fn names_are_resolved_from_shstrtab() {
    for class in [Class::Elf32, Class::Elf64] {
        let output = sample(class);
        let file = ElfFile::parse(&output.data).unwrap();
        let sections = file.sections();
        let names: Vec<&[u8]> = sections.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            [
                b"".as_slice(),
                b".text",
                b".rodata",
                b".bss",
                b".init_array",
                b".note.gnu",
                b".shstrtab",
            ]
        );
        assert_eq!(sections.get(0).unwrap().section_type(), SectionType::Null);
        for (index, section) in sections.iter().enumerate() {
            assert_eq!(section.index(), index);
            assert_eq!(sections.name_of(section), section.name());
            assert_eq!(section.header(), &**section);
        }
    }
}

#[test]
fn section_fields_and_data() {
    let output = sample(Class::Elf64);
    let file = ElfFile::parse(&output.data).unwrap();
    let sections = file.sections();

    let text = sections.find_by_name(".text").unwrap();
    assert_eq!(text.index(), 1);
    assert_eq!(text.name_str(), Some(".text"));
    assert_eq!(text.sh_addr, 0x1000);
    assert_eq!(text.sh_addralign, 16);
    assert_eq!(text.sh_offset, output.section_offsets[1]);
    assert_eq!(text.flags(), SectionFlags::ALLOC | SectionFlags::EXECINSTR);
    assert_eq!(file.section_data(text).unwrap(), &[0x90; 12]);

    let rodata = sections.find_by_name(".rodata").unwrap();
    assert_eq!(file.section_data(rodata).unwrap(), b"hello\0");

    let bss = sections.find_by_type(SectionType::NoBits).unwrap();
    assert_eq!(bss.name(), b".bss");
    assert!(bss.is_nobits());
    assert_eq!(bss.sh_size, 0x400);
    assert_eq!(file.section_data(bss).unwrap(), b"");

    assert_eq!(
        sections.find_by_type(SectionType::InitArray).unwrap().index(),
        4
    );
    assert_eq!(sections.find_by_type(SectionType::Note).unwrap().index(), 5);
    assert_eq!(sections.find_by_type(SectionType::StrTab).unwrap().index(), 6);
}

#[test]
fn missing_sections_are_reported() {
    let output = sample(Class::Elf64);
    let file = ElfFile::parse(&output.data).unwrap();
    assert!(matches!(
        file.sections().find_by_type(SectionType::Dynamic),
        Err(Error::SectionNotFound { .. })
    ));
    assert!(matches!(
        file.sections().find_by_name(".data"),
        Err(Error::SectionNotFound { .. })
    ));
    assert!(matches!(
        file.sections().find_by_name(""),
        Err(Error::SectionNotFound { .. })
    ));
    assert_eq!(file.sections().find_all_by_type(SectionType::Rela).count(), 0);
}

#[test]
fn lowest_index_wins_for_shared_type() {
    let output = ElfWriter::new()
        .section(SectionDesc::progbits(".text", &[1]))
        .section(SectionDesc::progbits(".data", &[2]))
        .section(SectionDesc::nobits(".bss", 4))
        .section(SectionDesc::progbits(".text", &[3]))
        .write();
    let file = ElfFile::parse(&output.data).unwrap();
    let sections = file.sections();

    for _ in 0..8 {
        let first = sections.find_by_type(SectionType::ProgBits).unwrap();
        assert_eq!(first.index(), 1);
        assert_eq!(first.name(), b".text");
    }
    let all: Vec<usize> = sections
        .find_all_by_type(SectionType::ProgBits)
        .map(|s| s.index())
        .collect();
    assert_eq!(all, [1, 2, 4]);
    // Duplicate names resolve to the first occurrence as well.
    assert_eq!(sections.find_by_name(".text").unwrap().index(), 1);
}

#[test]
fn undefined_name_table_leaves_names_empty() {
    let mut output = ElfWriter::new()
        .section(SectionDesc::progbits(".text", &[1]))
        .write();
    let offset = output.e_shstrndx_offset();
    output.patch_u16(offset, abi::SHN_UNDEF);
    let file = ElfFile::parse(&output.data).unwrap();
    assert_eq!(file.sections().len(), 3);
    assert!(file.sections().iter().all(|s| s.name().is_empty()));
}

#[test]
fn name_table_index_out_of_range() {
    let mut output = ElfWriter::new()
        .section(SectionDesc::progbits(".text", &[1]))
        .write();
    let offset = output.e_shstrndx_offset();
    output.patch_u16(offset, 7);
    assert_eq!(
        ElfFile::parse(&output.data).unwrap_err(),
        Error::OutOfRange {
            what: "section name table index",
            offset: 7,
            len: 1,
            size: 3,
        }
    );
}

#[test]
fn name_offset_past_name_table() {
    let mut output = ElfWriter::new()
        .section(SectionDesc::progbits(".text", &[1]))
        .write();
    // sh_name is the first field of the header.
    let offset = output.section_header_offset(1);
    output.patch_u32(offset, 0x1000);
    assert!(matches!(
        ElfFile::parse(&output.data),
        Err(Error::OutOfRange {
            what: "string table offset",
            ..
        })
    ));
}

#[test]
fn linked_section_is_validated() {
    let output = ElfWriter::new()
        .section(SectionDesc::new(".rela.text", abi::SHT_RELA).with_link(2))
        .section(SectionDesc::new(".hash", abi::SHT_HASH).with_link(9))
        .write();
    let source = ByteSource::new(&output.data);
    let header = elf_inspect::elf::ElfHeader::decode(&source).unwrap();
    let index = SectionIndex::build(&source, &header).unwrap();

    let rela = index.find_by_type(SectionType::Rela).unwrap();
    assert_eq!(index.linked(rela).unwrap().name(), b".hash");

    let hash = index.find_by_type(SectionType::Hash).unwrap();
    assert!(matches!(
        index.linked(hash),
        Err(Error::OutOfRange { what: "section link", offset: 9, .. })
    ));
}

#[test]
fn string_table_from_section() {
    let output = ElfWriter::new()
        .section(SectionDesc::new(".names", abi::SHT_STRTAB).with_data(b"\0alpha\0beta"))
        .write();
    let file = ElfFile::parse(&output.data).unwrap();
    let section = file.sections().find_by_name(".names").unwrap();
    let strtab = StringTable::from_section(file.source(), section).unwrap();
    assert_eq!(strtab.len(), 11);
    assert_eq!(strtab.resolve(1).unwrap(), b"alpha");
    assert_eq!(strtab.resolve(7).unwrap(), b"beta");
    assert!(matches!(strtab.resolve(11), Err(Error::OutOfRange { .. })));
}
