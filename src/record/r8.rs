//! The `r8` format: run lengths of zeros between set bits.
//!
//! The input encodes one unbounded bit stream as a sequence of run headers.
//! A header is any number of `0xFF` bytes, each worth 255 zeros, followed by a
//! byte `0..=254` giving the remaining zeros. The first header gives the zeros
//! leading the stream; every later header contributes a one followed by its
//! zeros. Records are windows of `bits_per_record` bits over this stream, so
//! runs straddle record boundaries freely.

use log::trace;

use super::{RecordReader, check_record_size};
use crate::{Error, source::ByteSource};

/// Decoder for the `r8` format.
#[derive(Debug)]
pub struct FormatR8<S> {
    source: S,
    bits_per_record: usize,
    position: usize,
    run_zeros: usize,
    run_ones: usize,
    emitted_zeros: usize,
    emitted_ones: usize,
}

impl<S: ByteSource> FormatR8<S> {
    /// Begin decoding records of `bits_per_record` bits from `source`.
    pub fn new(source: S, bits_per_record: usize) -> Result<Self, Error> {
        if bits_per_record == 0 {
            Err(Error::InvalidArgument("r8 records must hold at least one bit"))?;
        }

        let mut reader = Self {
            source,
            bits_per_record: check_record_size(bits_per_record)?,
            position: 0,
            run_zeros: 0,
            run_ones: 0,
            emitted_zeros: 0,
            emitted_ones: 0,
        };

        // The leading run has no one before it.
        reader.update_run_length()?;
        reader.run_ones = 0;

        Ok(reader)
    }

    /// Recover the underlying byte source.
    pub fn into_inner(self) -> S {
        self.source
    }

    fn is_run_pending(&self) -> bool {
        self.emitted_ones < self.run_ones || self.emitted_zeros < self.run_zeros
    }

    /// Decode the next run header, returning `false` if the input is
    /// exhausted and no further one exists.
    fn update_run_length(&mut self) -> Result<bool, Error> {
        let Some(first) = self.source.next_byte()? else {
            return Ok(false);
        };

        let mut zeros = 0usize;
        let mut next = Some(first);
        while next == Some(0xFF) {
            zeros = zeros.saturating_add(0xFF);
            next = self.source.next_byte()?;
        }
        zeros = zeros.saturating_add(next.unwrap_or(0) as usize);

        self.run_zeros = zeros;
        self.run_ones = 1;
        self.emitted_zeros = 0;
        self.emitted_ones = 0;

        Ok(true)
    }
}

impl<S: ByteSource> RecordReader for FormatR8<S> {
    fn read_bit(&mut self) -> Result<bool, Error> {
        if self.position >= self.bits_per_record {
            Err(Error::EndOfRecord)?;
        }

        if self.emitted_ones < self.run_ones {
            self.emitted_ones += 1;
            self.position += 1;
            return Ok(true);
        }
        if self.emitted_zeros < self.run_zeros {
            self.emitted_zeros += 1;
            self.position += 1;
            return Ok(false);
        }

        if !self.update_run_length()? {
            Err(Error::EndOfInput)?;
        }
        self.emitted_ones += 1;
        self.position += 1;

        Ok(true)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        if self.position >= self.bits_per_record {
            return Ok(0);
        }

        let mut n = 0;
        for b in buf.iter_mut() {
            *b = 0;

            // Whole bytes of a known run of zeros need no bit assembly.
            if self.emitted_ones >= self.run_ones
                && self.run_zeros - self.emitted_zeros >= 8
                && self.bits_per_record - self.position >= 8
            {
                self.emitted_zeros += 8;
                self.position += 8;
                n += 8;
                continue;
            }

            for k in 0..8 {
                if self.is_end_of_record()? {
                    return Ok(n);
                }
                *b |= u8::from(self.read_bit()?) << k;
                n += 1;
            }
        }

        Ok(n)
    }

    fn next_record(&mut self) -> Result<bool, Error> {
        // Discard the unread remainder of the window, a run at a time.
        while self.position < self.bits_per_record {
            if !self.is_run_pending() && !self.update_run_length()? {
                break;
            }
            if self.emitted_ones < self.run_ones {
                self.emitted_ones += 1;
                self.position += 1;
                continue;
            }
            let skip =
                (self.run_zeros - self.emitted_zeros).min(self.bits_per_record - self.position);
            self.emitted_zeros += skip;
            self.position += skip;
        }
        self.position = 0;

        trace!("r8: advanced to next record");

        Ok(self.is_run_pending() || self.update_run_length()?)
    }

    fn is_end_of_record(&mut self) -> Result<bool, Error> {
        if self.position >= self.bits_per_record {
            return Ok(true);
        }
        Ok(!self.is_run_pending() && !self.update_run_length()?)
    }

    fn has_record(&mut self) -> Result<bool, Error> {
        Ok(self.position > 0 || self.is_run_pending() || self.update_run_length()?)
    }

    fn is_truncated(&self) -> bool {
        self.position < self.bits_per_record && !self.is_run_pending()
    }

    fn position(&self) -> usize {
        self.position
    }

    fn bits_per_record(&self) -> usize {
        self.bits_per_record
    }
}
