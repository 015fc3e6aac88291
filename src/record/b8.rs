//! The `b8` format: bits packed eight to a byte, least significant bit first.
//!
//! There is no separator. Successive records are successive windows of
//! `bits_per_record` bits over one continuous byte stream.

use log::trace;

use super::{RecordReader, check_record_size, read_bytes_bitwise};
use crate::{Error, source::ByteSource};

/// Decoder for the `b8` format.
#[derive(Debug)]
pub struct FormatB8<S> {
    source: S,
    bits_per_record: usize,
    position: usize,
    /// Unconsumed bits of the last byte read, in the low bits.
    payload: u8,
    bits_available: u8,
}

impl<S: ByteSource> FormatB8<S> {
    /// Begin decoding records of `bits_per_record` bits from `source`.
    pub fn new(source: S, bits_per_record: usize) -> Result<Self, Error> {
        let bits_per_record = check_record_size(bits_per_record)?;
        if bits_per_record == 0 {
            Err(Error::InvalidArgument("b8 records must hold at least one bit"))?;
        }

        Ok(Self {
            source,
            bits_per_record,
            position: 0,
            payload: 0,
            bits_available: 0,
        })
    }

    /// Recover the underlying byte source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Ensure the payload holds at least one bit, returning `false` if the
    /// input is exhausted.
    fn refill(&mut self) -> Result<bool, Error> {
        if self.bits_available > 0 {
            return Ok(true);
        }

        match self.source.next_byte()? {
            Some(b) => {
                self.payload = b;
                self.bits_available = 8;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<S: ByteSource> RecordReader for FormatB8<S> {
    fn read_bit(&mut self) -> Result<bool, Error> {
        if self.position >= self.bits_per_record {
            Err(Error::EndOfRecord)?;
        }
        if !self.refill()? {
            Err(Error::EndOfInput)?;
        }

        let bit = self.payload & 1 != 0;
        self.payload >>= 1;
        self.bits_available -= 1;
        self.position += 1;

        Ok(bit)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        if self.position >= self.bits_per_record {
            return Ok(0);
        }

        // A partially consumed byte leaves the stream unaligned.
        if self.bits_available > 0 {
            return read_bytes_bitwise(self, buf);
        }

        let wanted = buf
            .len()
            .saturating_mul(8)
            .min(self.bits_per_record - self.position);
        let n_bytes = wanted.div_ceil(8);
        let got = self.source.read_into(&mut buf[..n_bytes])?;
        let n_bits = wanted.min(got * 8);

        // Hold back bits of the last byte that belong to the next record.
        let tail = n_bits % 8;
        if tail != 0 {
            let last = &mut buf[n_bits / 8];
            self.payload = *last >> tail;
            self.bits_available = 8 - tail as u8;
            *last &= (1 << tail) - 1;
        }

        self.position += n_bits;

        Ok(n_bits)
    }

    fn next_record(&mut self) -> Result<bool, Error> {
        // Discard the unread remainder of the window.
        while self.position < self.bits_per_record && self.refill()? {
            let skip = (self.bits_per_record - self.position).min(self.bits_available as usize);
            self.payload = self.payload.checked_shr(skip as u32).unwrap_or(0);
            self.bits_available -= skip as u8;
            self.position += skip;
        }
        self.position = 0;

        trace!("b8: advanced to next record");

        self.refill()
    }

    fn is_end_of_record(&mut self) -> Result<bool, Error> {
        Ok(self.position >= self.bits_per_record || !self.refill()?)
    }

    fn has_record(&mut self) -> Result<bool, Error> {
        Ok(self.position > 0 || self.refill()?)
    }

    fn is_truncated(&self) -> bool {
        self.position < self.bits_per_record && self.bits_available == 0
    }

    fn position(&self) -> usize {
        self.position
    }

    fn bits_per_record(&self) -> usize {
        self.bits_per_record
    }
}
