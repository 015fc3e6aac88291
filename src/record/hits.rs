//! The `hits` format: comma-separated indices of set bits.
//!
//! Each record is a strictly increasing list of decimal indices terminated by
//! a newline. Unlisted bits are zero, so a record always runs to the record
//! size regardless of where its list ends.

use either::Either::{Left, Right};
use log::trace;

use super::{RecordReader, check_record_size};
use crate::{Error, scan::read_unsigned, source::ByteSource};

/// Decoder for the `hits` format.
#[derive(Debug)]
pub struct FormatHits<S> {
    source: S,
    bits_per_record: usize,
    position: usize,
    next_hit: Option<usize>,
    /// The byte that followed `next_hit`: `,` if more indices follow.
    separator: Option<u8>,
    has_record: bool,
}

impl<S: ByteSource> FormatHits<S> {
    /// Begin decoding records of `bits_per_record` bits from `source`.
    pub fn new(source: S, bits_per_record: usize) -> Result<Self, Error> {
        let mut reader = Self {
            source,
            bits_per_record: check_record_size(bits_per_record)?,
            position: 0,
            next_hit: None,
            separator: None,
            has_record: false,
        };
        reader.start_record()?;
        Ok(reader)
    }

    /// Recover the underlying byte source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Reset to the beginning of a record and read its first index.
    fn start_record(&mut self) -> Result<(), Error> {
        self.position = 0;
        self.next_hit = None;

        match read_unsigned(&mut self.source)? {
            Left((index, separator)) => {
                self.has_record = true;
                self.accept(index, separator)?;
            }
            Right(None) => {
                self.has_record = false;
                self.separator = None;
            }
            Right(Some(b'\n')) => {
                self.has_record = true;
                self.separator = Some(b'\n');
            }
            Right(Some(_)) => Err(Error::MalformedInput("expected an index or a newline"))?,
        }

        Ok(())
    }

    /// Read the index following a comma.
    fn update_next_hit(&mut self) -> Result<(), Error> {
        match read_unsigned(&mut self.source)? {
            Left((index, separator)) => self.accept(index, separator),
            Right(separator @ (None | Some(b'\n'))) => {
                self.separator = separator;
                Ok(())
            }
            Right(Some(_)) => Err(Error::MalformedInput("expected an index")),
        }
    }

    fn accept(&mut self, index: usize, separator: Option<u8>) -> Result<(), Error> {
        if !matches!(separator, Some(b',' | b'\n')) {
            Err(Error::InvalidSeparator(separator))?;
        }

        let floor = self
            .next_hit
            .map_or(self.position, |hit| self.position.max(hit + 1));
        if index < floor {
            Err(Error::OutOfOrderIndex {
                index,
                position: self.position,
            })?;
        }
        if index >= self.bits_per_record {
            Err(Error::IndexOutOfRange {
                index,
                bits_per_record: self.bits_per_record,
            })?;
        }

        self.next_hit = Some(index);
        self.separator = separator;

        Ok(())
    }
}

impl<S: ByteSource> RecordReader for FormatHits<S> {
    fn read_bit(&mut self) -> Result<bool, Error> {
        if self.position >= self.bits_per_record {
            Err(Error::EndOfRecord)?;
        }
        if !self.has_record {
            Err(Error::EndOfInput)?;
        }

        if self.separator == Some(b',') && self.next_hit.is_some_and(|hit| self.position > hit) {
            self.update_next_hit()?;
        }

        let bit = self.next_hit == Some(self.position);
        self.position += 1;

        Ok(bit)
    }

    fn next_record(&mut self) -> Result<bool, Error> {
        while self.separator == Some(b',') {
            self.update_next_hit()?;
        }
        if !self.has_record {
            return Ok(false);
        }

        self.start_record()?;

        trace!("hits: advanced to next record");

        Ok(self.has_record)
    }

    fn is_end_of_record(&mut self) -> Result<bool, Error> {
        Ok(!self.has_record || self.position >= self.bits_per_record)
    }

    fn has_record(&mut self) -> Result<bool, Error> {
        Ok(self.has_record)
    }

    fn position(&self) -> usize {
        self.position
    }

    fn bits_per_record(&self) -> usize {
        self.bits_per_record
    }
}
