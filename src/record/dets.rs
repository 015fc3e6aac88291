//! The `dets` format: tagged indices of set bits.
//!
//! Each record starts with the keyword `shot`, followed by space-separated
//! entries and a newline, for example `shot M0 D1 L0`. An entry is a category
//! tag (`M` measurement, `D` detector, `L` logical observable) and an index
//! counted from the start of that category. Categories occupy contiguous
//! ranges of the record, in that order, as described by a [`RecordShape`].

use either::Either::{Left, Right};
use log::trace;

use super::{RecordReader, RecordShape, ResultType};
use crate::{
    Error,
    scan::{consume_keyword, read_unsigned},
    source::ByteSource,
};

/// Decoder for the `dets` format.
#[derive(Debug)]
pub struct FormatDets<S> {
    source: S,
    shape: RecordShape,
    bits_per_record: usize,
    position: usize,
    next_hit: Option<usize>,
    /// The byte that followed `next_hit`: a space if more entries follow.
    separator: Option<u8>,
    has_record: bool,
}

impl<S: ByteSource> FormatDets<S> {
    /// Begin decoding records of the given shape from `source`.
    pub fn new(source: S, shape: RecordShape) -> Result<Self, Error> {
        let mut reader = Self {
            source,
            shape,
            bits_per_record: shape.bits_per_record()?,
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

    /// The range of absolute positions holding a category, as (start, len).
    fn category_range(&self, t: ResultType) -> (usize, usize) {
        let RecordShape {
            measurements: m,
            detectors: d,
            observables: l,
        } = self.shape;

        match t {
            ResultType::Measurement => (0, m),
            ResultType::Detector => (m, d),
            ResultType::Observable => (m + d, l),
        }
    }

    /// Consume the keyword opening a record and read its first entry.
    fn start_record(&mut self) -> Result<(), Error> {
        self.position = 0;
        self.next_hit = None;

        if !consume_keyword(&mut self.source, b"shot")? {
            self.has_record = false;
            self.separator = None;
            return Ok(());
        }
        self.has_record = true;

        match self.source.next_byte()? {
            Some(b' ') => self.update_next_hit(),
            separator @ (None | Some(b'\n')) => {
                self.separator = separator;
                Ok(())
            }
            Some(_) => Err(Error::MalformedInput("expected a space or newline after \"shot\"")),
        }
    }

    /// Read the entry following a space.
    fn update_next_hit(&mut self) -> Result<(), Error> {
        let t = match self.source.next_byte()? {
            tag @ (None | Some(b'\n')) => {
                self.separator = tag;
                return Ok(());
            }
            Some(tag) => ResultType::try_from(tag)?,
        };

        let (relative, separator) = match read_unsigned(&mut self.source)? {
            Left(entry) => entry,
            Right(_) => Err(Error::MalformedInput("expected an index after the result type"))?,
        };
        if !matches!(separator, Some(b' ' | b'\n')) {
            Err(Error::InvalidSeparator(separator))?;
        }

        let (start, len) = self.category_range(t);
        let index = start.saturating_add(relative);

        let floor = self
            .next_hit
            .map_or(self.position, |hit| self.position.max(hit + 1));
        if index < floor {
            Err(Error::OutOfOrderIndex {
                index,
                position: self.position,
            })?;
        }
        if relative >= len {
            Err(Error::CategoryIndexOutOfRange {
                tag: t.into(),
                index: relative,
                len,
            })?;
        }

        self.next_hit = Some(index);
        self.separator = separator;

        Ok(())
    }
}

impl<S: ByteSource> RecordReader for FormatDets<S> {
    fn read_bit(&mut self) -> Result<bool, Error> {
        if self.position >= self.bits_per_record {
            Err(Error::EndOfRecord)?;
        }
        if !self.has_record {
            Err(Error::EndOfInput)?;
        }

        if self.separator == Some(b' ') && self.next_hit.is_some_and(|hit| self.position > hit) {
            self.update_next_hit()?;
        }

        let bit = self.next_hit == Some(self.position);
        self.position += 1;

        Ok(bit)
    }

    fn next_record(&mut self) -> Result<bool, Error> {
        while self.separator == Some(b' ') {
            self.update_next_hit()?;
        }
        if !self.has_record {
            return Ok(false);
        }

        self.start_record()?;

        trace!("dets: advanced to next record");

        Ok(self.has_record)
    }

    fn is_end_of_record(&mut self) -> Result<bool, Error> {
        Ok(!self.has_record || self.position >= self.bits_per_record)
    }

    fn has_record(&mut self) -> Result<bool, Error> {
        Ok(self.has_record)
    }

    /// The category owning the next bit, or the last non-empty category once
    /// the record is complete.
    fn current_result_type(&self) -> ResultType {
        let (observables, _) = self.category_range(ResultType::Observable);
        let (detectors, _) = self.category_range(ResultType::Detector);

        if self.position >= observables && self.shape.observables > 0 {
            ResultType::Observable
        } else if self.position >= detectors && self.shape.detectors > 0 {
            ResultType::Detector
        } else {
            ResultType::Measurement
        }
    }

    fn position(&self) -> usize {
        self.position
    }

    fn bits_per_record(&self) -> usize {
        self.bits_per_record
    }
}
