//! Byte sources for ELF decoding.
//!
//! Every multi-byte read performed by the decoders goes through
//! [`ByteSource`], which checks each request against the length of the
//! underlying buffer. Acquiring the bytes (reading a file, mapping it, or
//! embedding it) is left to the caller.

pub use source::ByteSource;
pub use traits::IntoByteSource;

mod source;
mod traits;
