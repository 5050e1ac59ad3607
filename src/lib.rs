//! # elf_inspect
//!
//! A bounds-safe reader for the metadata of ELF (Executable and Linkable
//! Format) images: the file header, program headers, section headers and
//! symbol tables, for both 32-bit and 64-bit files in either byte order.
//!
//! Every read goes through a bounds-checked [`ByteSource`](input::ByteSource),
//! every table's entry size is checked against the file class, and every
//! decoding function returns either a complete record or an [`Error`]. The
//! library never loads or executes the image.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use elf_inspect::{ElfFile, elf::SectionType};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bytes = std::fs::read("liba.so")?;
//!     let file = ElfFile::parse(&bytes)?;
//!
//!     println!("entry: 0x{:x}", file.header().e_entry());
//!     let text = file.sections().find_by_name(".text")?;
//!     let code = file.section_data(text)?;
//!     println!(".text: {} bytes", code.len());
//!
//!     for symbol in &file.dynamic_symbols()? {
//!         println!("{:?} {:?}", symbol.name_str(), symbol.bind());
//!     }
//!     let _ = file.sections().find_by_type(SectionType::Dynamic)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! * `log`: emit `log` records at parse milestones.
#![no_std]
#![warn(
    clippy::unnecessary_wraps,
    clippy::unnecessary_lazy_evaluations,
    clippy::collapsible_if,
    clippy::cast_lossless,
    clippy::explicit_iter_loop,
    clippy::manual_assert,
    clippy::needless_question_mark,
    clippy::needless_return,
    clippy::needless_update,
    clippy::redundant_clone,
    clippy::redundant_else,
    clippy::redundant_static_lifetimes
)]
#![allow(clippy::len_without_is_empty, clippy::unnecessary_cast)]
extern crate alloc;

pub mod elf;
mod error;
mod file;
pub mod input;
pub mod section;
pub mod symbol;

pub(crate) use error::*;

pub use error::Error;
pub use file::ElfFile;

/// A type alias for `Result`s returned by `elf_inspect` functions.
///
/// This is a convenience alias that eliminates the need to repeatedly specify
/// the `Error` type in function signatures.
pub type Result<T> = core::result::Result<T, Error>;
