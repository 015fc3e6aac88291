//! Reader-based byte source.
//!
//! _Requires Cargo feature `std`._

use std::io::{ErrorKind, Read};

use super::ByteSource;
use crate::Error;

/// A [`ByteSource`] over any [`Read`] implementation.
///
/// Every call to [`next_byte`](ByteSource::next_byte) reads from the inner
/// reader, so wrap files and sockets in a [`std::io::BufReader`] first.
#[derive(Debug)]
pub struct IoSource<R>(R);

impl<R: Read> IoSource<R> {
    /// Wrap a reader.
    pub fn new(r: R) -> Self {
        Self(r)
    }

    /// Recover the wrapped reader.
    pub fn into_inner(self) -> R {
        self.0
    }
}

impl<R: Read> ByteSource for IoSource<R> {
    fn next_byte(&mut self) -> Result<Option<u8>, Error> {
        let mut buf = [0; 1];
        loop {
            match self.0.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let mut n = 0;
        while n < buf.len() {
            match self.0.read(&mut buf[n..]) {
                Ok(0) => break,
                Ok(k) => n += k,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(n)
    }
}
