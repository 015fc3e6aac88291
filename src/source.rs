//! Sequential byte streams consumed by the record decoders.
//!
//! Decoders only ever read forward, one byte at a time or in blocks, and never
//! close or rewind their stream. Slices are sources as-is; wrap a
//! [`std::io::Read`] in an [`IoSource`] (_requires Cargo feature `std`_).
//!
//! Passing `&mut source` instead of `source` leaves the caller owning the
//! stream, so it can be resumed after the decoder is dropped.

#[cfg(feature = "std")]
pub mod reader;

#[cfg(feature = "std")]
pub use reader::IoSource;

use crate::Error;

/// A sequential, forward-only stream of bytes.
pub trait ByteSource {
    /// Take the next byte, or `None` once the stream is exhausted.
    fn next_byte(&mut self) -> Result<Option<u8>, Error>;

    /// Fill as much of `buf` as the stream allows, returning the number of
    /// bytes written. A short count means the stream is exhausted.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        for (n, b) in buf.iter_mut().enumerate() {
            match self.next_byte()? {
                Some(v) => *b = v,
                None => return Ok(n),
            }
        }
        Ok(buf.len())
    }
}

impl ByteSource for &[u8] {
    fn next_byte(&mut self) -> Result<Option<u8>, Error> {
        Ok(self.split_first().map(|(b, rest)| {
            *self = rest;
            *b
        }))
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let n = buf.len().min(self.len());
        let (head, rest) = self.split_at(n);
        buf[..n].copy_from_slice(head);
        *self = rest;
        Ok(n)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn next_byte(&mut self) -> Result<Option<u8>, Error> {
        (**self).next_byte()
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        (**self).read_into(buf)
    }
}
