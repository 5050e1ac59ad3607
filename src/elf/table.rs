//! Generic decoding of fixed-stride record tables.

use crate::{
    Result,
    elf::{FieldReader, Layout},
    input::ByteSource,
    out_of_range, size_mismatch,
};
use alloc::vec::Vec;

/// A fixed-width record stored in a table of the ELF file.
pub trait Record: Sized {
    /// Name used in error messages.
    const KIND: &'static str;

    /// The on-disk size of one record for `layout`.
    fn record_size(layout: Layout) -> usize;

    /// Decodes one record from `fields`, which is positioned at its start.
    fn decode(fields: &mut FieldReader<'_>) -> Result<Self>;
}

/// Decodes `count` records of `entry_size` bytes starting at `offset`.
///
/// An empty table is not an error. Records are returned in file order.
///
/// # Errors
///
/// * `SizeMismatch` if `entry_size` is not the record size for `layout`.
/// * `OutOfRange` if the table does not fit in `source`.
pub fn read_table<R: Record>(
    source: &ByteSource<'_>,
    layout: Layout,
    offset: usize,
    count: usize,
    entry_size: usize,
) -> Result<Vec<R>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    let expected = R::record_size(layout);
    if entry_size != expected {
        return Err(size_mismatch(R::KIND, expected as u64, entry_size as u64));
    }
    let total = count
        .checked_mul(entry_size)
        .ok_or_else(|| out_of_range(R::KIND, offset as u64, u64::MAX, source.len() as u64))?;
    let table = source.slice(offset, total)?;

    let mut records = Vec::with_capacity(count);
    for idx in 0..count {
        let entry = table.slice(idx * entry_size, entry_size)?;
        let mut fields = FieldReader::new(entry, 0, layout);
        records.push(R::decode(&mut fields)?);
    }

    #[cfg(feature = "log")]
    log::trace!(
        "[{}] decoded {} {} record(s) at 0x{:x}",
        source.name(),
        count,
        R::KIND,
        offset
    );

    Ok(records)
}
