use elf_inspect::{
    ElfFile, Error,
    elf::{ElfClass, ElfHeader, Endian, abi},
    input::ByteSource,
};
use gen_elf::{Class, ElfWriter, ElfWriterConfig, SectionDesc, SegmentDesc};

const ALL_LAYOUTS: [(Class, gen_elf::Endian); 4] = [
    (Class::Elf32, gen_elf::Endian::Little),
    (Class::Elf32, gen_elf::Endian::Big),
    (Class::Elf64, gen_elf::Endian::Little),
    (Class::Elf64, gen_elf::Endian::Big),
];

fn expected_layout(class: Class, endian: gen_elf::Endian) -> (ElfClass, Endian) {
    let class = match class {
        Class::Elf32 => ElfClass::Elf32,
        Class::Elf64 => ElfClass::Elf64,
    };
    let endian = match endian {
        gen_elf::Endian::Little => Endian::Little,
        gen_elf::Endian::Big => Endian::Big,
    };
    (class, endian)
}

#[test]
fn header_fields_round_trip() {
    for (class, endian) in ALL_LAYOUTS {
        let config = ElfWriterConfig::default()
            .with_class(class)
            .with_endian(endian)
            .with_type(abi::ET_EXEC)
            .with_machine(abi::EM_RISCV)
            .with_entry(0x8000_1234)
            .with_flags(0x5);
        let output = ElfWriter::with_config(config)
            .segment(SegmentDesc::load(abi::PF_R | abi::PF_X, 0x8000_0000, &[0x13; 32]))
            .segment(SegmentDesc::interp("/lib/ld.so"))
            .section(SectionDesc::progbits(".text", &[0x13; 32]))
            .write();

        let header = ElfHeader::decode(&ByteSource::new(&output.data)).unwrap();
        let (want_class, want_endian) = expected_layout(class, endian);
        assert_eq!(header.layout().class, want_class);
        assert_eq!(header.layout().endian, want_endian);
        assert_eq!(header.ident().version, abi::EV_CURRENT);
        assert_eq!(header.e_type(), abi::ET_EXEC);
        assert_eq!(header.e_machine(), abi::EM_RISCV);
        assert_eq!(header.machine_name(), "RISC-V");
        assert_eq!(header.e_version(), 1);
        assert_eq!(header.e_entry(), 0x8000_1234);
        assert_eq!(header.e_flags(), 0x5);
        assert_eq!(header.e_ehsize() as usize, class.ehdr_size());
        assert_eq!(header.e_ehsize() as usize, header.layout().ehdr_size());
        assert_eq!(header.layout().class.word_size(), class.word_size());
        assert_eq!(header.layout().class.to_ident(), output.data[abi::EI_CLASS]);
        assert_eq!(header.layout().endian.to_ident(), output.data[abi::EI_DATA]);
        assert_eq!(header.e_phoff(), output.phoff);
        assert_eq!(header.e_phnum(), 2);
        assert_eq!(header.e_phentsize(), class.phdr_size());
        assert_eq!(header.e_shoff(), output.shoff);
        assert_eq!(header.e_shnum(), output.shnum);
        assert_eq!(header.e_shentsize(), class.shdr_size());
        assert_eq!(header.e_shstrndx(), output.shstrndx);
        let (ph_start, ph_end) = header.phdr_range();
        assert_eq!(ph_start as u64, output.phoff);
        assert_eq!(ph_end - ph_start, 2 * class.phdr_size());
        let (sh_start, sh_end) = header.shdr_range();
        assert_eq!(sh_start as u64, output.shoff);
        assert_eq!(sh_end, output.data.len());
        assert!(header.is_executable());
        assert!(!header.is_dylib());
    }
}

#[test]
fn empty_file_has_no_tables() {
    let output = ElfWriter::new().write();
    let file = ElfFile::parse(&output.data).unwrap();
    assert_eq!(file.header().e_phnum(), 0);
    assert_eq!(file.header().e_shnum(), 0);
    assert!(file.segments().is_empty());
    assert!(file.sections().is_empty());
    assert_eq!(file.interp().unwrap(), None);
}

#[test]
fn wrong_magic_is_rejected_first() {
    let output = ElfWriter::new().write();
    for magic in [*b"\x7fELG", *b"ELF\x7f", [0; 4], [0xff; 4]] {
        let mut data = output.data.clone();
        data[..4].copy_from_slice(&magic);
        assert_eq!(
            ElfHeader::decode(&ByteSource::new(&data)),
            Err(Error::InvalidMagic { found: magic })
        );
        // Too short for an identity block, but the magic is still checked first.
        assert!(matches!(
            ElfHeader::decode(&ByteSource::new(&magic)),
            Err(Error::InvalidMagic { .. })
        ));
    }

    // Fewer than four bytes that already differ from the magic.
    for (data, found) in [
        (&b"MZ"[..], *b"MZ\0\0"),
        (&b"\0"[..], [0; 4]),
        (&b"ELF"[..], *b"ELF\0"),
        (&b"\x7fEX"[..], *b"\x7fEX\0"),
    ] {
        assert_eq!(
            ElfHeader::decode(&ByteSource::new(data)),
            Err(Error::InvalidMagic { found })
        );
    }
}

#[test]
fn short_input_is_out_of_range() {
    let prefixes: [&[u8]; 5] = [b"", b"\x7f", b"\x7fE", b"\x7fEL", b"\x7fELF"];
    for prefix in prefixes {
        assert!(matches!(
            ElfHeader::decode(&ByteSource::new(prefix)),
            Err(Error::OutOfRange { .. })
        ));
    }
    let output = ElfWriter::new().write();
    assert!(matches!(
        ElfHeader::decode(&ByteSource::new(&output.data[..40])),
        Err(Error::OutOfRange { .. })
    ));
}

#[test]
fn unknown_class_and_encoding() {
    let output = ElfWriter::new().write();

    let mut data = output.data.clone();
    data[abi::EI_CLASS] = 3;
    assert_eq!(
        ElfFile::parse(&data).unwrap_err(),
        Error::UnsupportedClass { found: 3 }
    );

    let mut data = output.data.clone();
    data[abi::EI_DATA] = 0;
    assert_eq!(
        ElfFile::parse(&data).unwrap_err(),
        Error::UnsupportedEndianness { found: 0 }
    );
}

#[test]
fn entry_size_must_match_class() {
    let config = ElfWriterConfig::default().with_shentsize(40);
    let output = ElfWriter::with_config(config)
        .section(SectionDesc::progbits(".data", &[1, 2, 3, 4]))
        .write();
    assert_eq!(
        ElfFile::parse(&output.data).unwrap_err(),
        Error::SizeMismatch {
            what: "section header entry",
            expected: 64,
            found: 40,
        }
    );

    let config = ElfWriterConfig::default()
        .with_class(Class::Elf32)
        .with_phentsize(56);
    let output = ElfWriter::with_config(config)
        .segment(SegmentDesc::load(abi::PF_R, 0, &[0; 8]))
        .write();
    assert!(matches!(
        ElfFile::parse(&output.data),
        Err(Error::SizeMismatch { expected: 32, found: 56, .. })
    ));
}

#[test]
fn empty_table_may_declare_zero_entry_size() {
    let config = ElfWriterConfig::default()
        .with_type(abi::ET_REL)
        .with_phentsize(0);
    let output = ElfWriter::with_config(config)
        .section(SectionDesc::progbits(".text", &[0x90]))
        .write();
    let file = ElfFile::parse(&output.data).unwrap();
    assert!(file.header().is_relocatable());
    assert_eq!(file.header().e_phentsize(), 0);
}

#[test]
fn truncated_section_table_is_out_of_range() {
    let output = ElfWriter::new()
        .section(SectionDesc::progbits(".text", &[0x90; 16]))
        .write();
    let truncated = &output.data[..output.data.len() - 1];
    assert!(matches!(
        ElfHeader::decode(&ByteSource::new(truncated)),
        Err(Error::OutOfRange {
            what: "section header table",
            ..
        })
    ));
}

#[test]
fn empty_table_with_wrong_entry_size_is_rejected() {
    let config = ElfWriterConfig::default().with_shentsize(40);
    let output = ElfWriter::with_config(config).write();
    assert_eq!(output.shnum, 0);
    assert_eq!(
        ElfHeader::decode(&ByteSource::new(&output.data)),
        Err(Error::SizeMismatch {
            what: "section header entry",
            expected: 64,
            found: 40,
        })
    );

    let config = ElfWriterConfig::default()
        .with_class(Class::Elf32)
        .with_phentsize(56);
    let output = ElfWriter::with_config(config).write();
    assert!(matches!(
        ElfHeader::decode(&ByteSource::new(&output.data)),
        Err(Error::SizeMismatch { expected: 32, found: 56, .. })
    ));
}
