//! The `01` format: one ASCII digit per bit, newline-terminated records.

use log::trace;

use super::{RecordReader, check_record_size};
use crate::{Error, source::ByteSource};

/// Decoder for the `01` format.
///
/// Records may be shorter than the record size, ending at their newline.
#[derive(Debug)]
pub struct Format01<S> {
    source: S,
    bits_per_record: usize,
    position: usize,
    /// The next unconsumed byte, `None` once the input is exhausted.
    lookahead: Option<u8>,
}

impl<S: ByteSource> Format01<S> {
    /// Begin decoding records of `bits_per_record` bits from `source`.
    pub fn new(mut source: S, bits_per_record: usize) -> Result<Self, Error> {
        let bits_per_record = check_record_size(bits_per_record)?;
        let lookahead = source.next_byte()?;

        Ok(Self {
            source,
            bits_per_record,
            position: 0,
            lookahead,
        })
    }

    /// Recover the underlying byte source.
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: ByteSource> RecordReader for Format01<S> {
    fn read_bit(&mut self) -> Result<bool, Error> {
        if self.position >= self.bits_per_record {
            Err(Error::EndOfRecord)?;
        }

        let bit = match self.lookahead {
            None => Err(Error::EndOfInput)?,
            Some(b'\n') => Err(Error::EndOfRecord)?,
            Some(b'0') => false,
            Some(b'1') => true,
            Some(_) => Err(Error::MalformedInput("expected '0' or '1'"))?,
        };

        self.lookahead = self.source.next_byte()?;
        self.position += 1;

        Ok(bit)
    }

    fn next_record(&mut self) -> Result<bool, Error> {
        // Skip unread bits without validating them.
        while let Some(b) = self.lookahead {
            if b == b'\n' {
                break;
            }
            if self.position >= self.bits_per_record {
                Err(Error::RecordTooLong {
                    bits_per_record: self.bits_per_record,
                })?;
            }
            self.position += 1;
            self.lookahead = self.source.next_byte()?;
        }

        if self.lookahead == Some(b'\n') {
            self.lookahead = self.source.next_byte()?;
        }
        self.position = 0;

        trace!("01: advanced to next record");

        Ok(self.lookahead.is_some())
    }

    fn is_end_of_record(&mut self) -> Result<bool, Error> {
        Ok(matches!(self.lookahead, None | Some(b'\n')) || self.position >= self.bits_per_record)
    }

    fn has_record(&mut self) -> Result<bool, Error> {
        Ok(self.position > 0 || self.lookahead.is_some())
    }

    fn position(&self) -> usize {
        self.position
    }

    fn bits_per_record(&self) -> usize {
        self.bits_per_record
    }
}
