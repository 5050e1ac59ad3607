use super::ByteSource;
use alloc::vec::Vec;

/// Conversion into a [`ByteSource`].
///
/// Lets the decoding entry points accept byte slices, vectors and arrays
/// directly as well as an already constructed source.
pub trait IntoByteSource<'data> {
    /// Converts `self` into a byte source.
    fn into_source(self) -> ByteSource<'data>;
}

impl<'data> IntoByteSource<'data> for ByteSource<'data> {
    fn into_source(self) -> ByteSource<'data> {
        self
    }
}

impl<'data> IntoByteSource<'data> for &'data [u8] {
    fn into_source(self) -> ByteSource<'data> {
        ByteSource::new(self)
    }
}

impl<'data> IntoByteSource<'data> for &'data Vec<u8> {
    fn into_source(self) -> ByteSource<'data> {
        ByteSource::new(self.as_slice())
    }
}

impl<'data, const N: usize> IntoByteSource<'data> for &'data [u8; N] {
    fn into_source(self) -> ByteSource<'data> {
        ByteSource::new(self.as_slice())
    }
}
