//! Streaming decoders for measurement records.
//!
//! Every wire format is decoded by its own finite-state machine implementing
//! [`RecordReader`]. A record is a fixed-length sequence of bits whose length
//! is supplied upfront; the decoders never buffer more than the bits a single
//! call asks for.
//!
//! | Format | Record separator | Bit encoding |
//! |---|---|---|
//! | `01` | `\n` | ASCII `'0'`/`'1'` per bit |
//! | `b8` | none | packed bytes, least significant bit first |
//! | `hits` | `\n` | comma-separated ascending indices of set bits |
//! | `r8` | none | run lengths of zeros, `0xFF`-continued |
//! | `dets` | `shot` keyword | space-separated `M`/`D`/`L`-tagged indices |
//!
//! Most users should construct a decoder with [`make`], which selects the
//! implementation for a [`SampleFormat`] and validates the [`RecordShape`].

pub mod b8;
pub mod dets;
pub mod format_01;
pub mod hits;
pub mod r8;

use core::{fmt, str::FromStr};

use log::debug;

use crate::{Error, source::ByteSource};

pub use b8::FormatB8;
pub use dets::FormatDets;
pub use format_01::Format01;
pub use hits::FormatHits;
pub use r8::FormatR8;

/// Uniform access to the records of a stream, one bit at a time.
pub trait RecordReader {
    /// Read the next bit of the current record.
    ///
    /// Fails with [`Error::EndOfRecord`] once the record is complete and with
    /// [`Error::EndOfInput`] if the input ends before a bit is available. If
    /// [`is_end_of_record`](Self::is_end_of_record) just returned `false`, a
    /// bit is available.
    fn read_bit(&mut self) -> Result<bool, Error>;

    /// Read bits of the current record, packed least significant bit first
    /// into `buf` (bit `k` of byte `n` is the bit read `8n + k`th).
    ///
    /// Returns the number of bits read, which is short only when the record
    /// ends, and zero if it already has.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        read_bytes_bitwise(self, buf)
    }

    /// Skip the remainder of the current record and advance to the next one.
    ///
    /// Returns `false` if the input holds no further record.
    fn next_record(&mut self) -> Result<bool, Error>;

    /// Whether the current record has ended. Repeated calls are idempotent.
    fn is_end_of_record(&mut self) -> Result<bool, Error>;

    /// Whether the current record ended short of
    /// [`bits_per_record`](Self::bits_per_record) because the input ran out.
    /// Only formats without a record separator can be truncated.
    ///
    /// Meaningful once [`is_end_of_record`](Self::is_end_of_record) has
    /// returned `true`.
    fn is_truncated(&self) -> bool {
        false
    }

    /// Whether a current record exists, i.e. the input was not exhausted
    /// before it began.
    fn has_record(&mut self) -> Result<bool, Error>;

    /// The category of the next bit. Only the DETS format has categories
    /// other than [`ResultType::Measurement`].
    fn current_result_type(&self) -> ResultType {
        ResultType::Measurement
    }

    /// Number of bits produced from the current record.
    fn position(&self) -> usize;

    /// The length of every record, in bits.
    fn bits_per_record(&self) -> usize;
}

/// Assemble bytes from repeated single-bit reads.
pub(crate) fn read_bytes_bitwise<R: RecordReader + ?Sized>(
    r: &mut R,
    buf: &mut [u8],
) -> Result<usize, Error> {
    if r.is_end_of_record()? {
        return Ok(0);
    }

    let mut n = 0;
    for b in buf.iter_mut() {
        *b = 0;
        for k in 0..8 {
            *b |= u8::from(r.read_bit()?) << k;
            n += 1;
            if r.is_end_of_record()? {
                return Ok(n);
            }
        }
    }

    Ok(n)
}

/// Reject record sizes that cannot be addressed as a signed offset.
pub(crate) fn check_record_size(bits_per_record: usize) -> Result<usize, Error> {
    if bits_per_record > isize::MAX as usize {
        Err(Error::InvalidArgument("record size is too big"))?;
    }
    Ok(bits_per_record)
}

/// The category of a bit in a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResultType {
    /// A measurement result, tagged `M`.
    Measurement,
    /// A detection event, tagged `D`.
    Detector,
    /// A logical observable, tagged `L`.
    Observable,
}

impl ResultType {
    /// The tag of this category in the DETS format.
    pub fn tag(self) -> u8 {
        match self {
            Self::Measurement => b'M',
            Self::Detector => b'D',
            Self::Observable => b'L',
        }
    }
}

impl TryFrom<u8> for ResultType {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self, Error> {
        match tag {
            b'M' => Ok(Self::Measurement),
            b'D' => Ok(Self::Detector),
            b'L' => Ok(Self::Observable),
            _ => Err(Error::UnknownCategory(tag)),
        }
    }
}

impl From<ResultType> for char {
    fn from(t: ResultType) -> Self {
        t.tag() as char
    }
}

/// A wire format for measurement records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    /// One ASCII digit per bit, newline-terminated records.
    Format01,
    /// Packed bytes, least significant bit first.
    B8,
    /// Bits transposed across 64 shots. Not decodable one record at a time.
    Ptb64,
    /// Comma-separated indices of set bits, newline-terminated records.
    Hits,
    /// Run lengths of zeros between set bits.
    R8,
    /// Tagged indices of set bits, `shot`-prefixed records.
    Dets,
}

impl SampleFormat {
    /// The conventional lowercase name of this format.
    pub fn name(self) -> &'static str {
        match self {
            Self::Format01 => "01",
            Self::B8 => "b8",
            Self::Ptb64 => "ptb64",
            Self::Hits => "hits",
            Self::R8 => "r8",
            Self::Dets => "dets",
        }
    }
}

impl FromStr for SampleFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        const FORMATS: [SampleFormat; 6] = [
            SampleFormat::Format01,
            SampleFormat::B8,
            SampleFormat::Ptb64,
            SampleFormat::Hits,
            SampleFormat::R8,
            SampleFormat::Dets,
        ];

        FORMATS
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or(Error::InvalidArgument("sample format not recognized"))
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The number of bits of each category in a record.
///
/// Categories occupy contiguous ranges of a record in the order measurements,
/// detectors, observables. Only the DETS format has detectors or observables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RecordShape {
    pub measurements: usize,
    pub detectors: usize,
    pub observables: usize,
}

impl RecordShape {
    /// A record consisting only of measurement results.
    pub fn measurements(measurements: usize) -> Self {
        Self {
            measurements,
            ..Self::default()
        }
    }

    /// The total record length in bits.
    pub fn bits_per_record(&self) -> Result<usize, Error> {
        let total = self
            .measurements
            .checked_add(self.detectors)
            .and_then(|n| n.checked_add(self.observables))
            .ok_or(Error::InvalidArgument("record size is too big"))?;
        check_record_size(total)
    }
}

/// A decoder for any of the per-record formats, selected by [`make`].
#[derive(Debug)]
pub enum AnyReader<S> {
    Format01(Format01<S>),
    B8(FormatB8<S>),
    Hits(FormatHits<S>),
    R8(FormatR8<S>),
    Dets(FormatDets<S>),
}

/// Construct a decoder for `format` reading records of `shape` from `source`.
///
/// Fails with [`Error::InvalidArgument`] if the format cannot be decoded one
/// record at a time, if a format other than DETS is given detectors or
/// observables, or if the record is too big.
pub fn make<S: ByteSource>(
    source: S,
    format: SampleFormat,
    shape: RecordShape,
) -> Result<AnyReader<S>, Error> {
    if format != SampleFormat::Dets && shape.detectors != 0 {
        Err(Error::InvalidArgument(
            "only the DETS format supports detection event records",
        ))?;
    }
    if format != SampleFormat::Dets && shape.observables != 0 {
        Err(Error::InvalidArgument(
            "only the DETS format supports logical observable records",
        ))?;
    }

    let bits_per_record = shape.bits_per_record()?;

    debug!("decoding {format} records of {bits_per_record} bits ({shape:?})");

    Ok(match format {
        SampleFormat::Format01 => AnyReader::Format01(Format01::new(source, bits_per_record)?),
        SampleFormat::B8 => AnyReader::B8(FormatB8::new(source, bits_per_record)?),
        SampleFormat::Hits => AnyReader::Hits(FormatHits::new(source, bits_per_record)?),
        SampleFormat::R8 => AnyReader::R8(FormatR8::new(source, bits_per_record)?),
        SampleFormat::Dets => AnyReader::Dets(FormatDets::new(source, shape)?),
        SampleFormat::Ptb64 => Err(Error::InvalidArgument(
            "the ptb64 format cannot be decoded one record at a time",
        ))?,
    })
}

macro_rules! dispatch {
    ($self:ident, $r:ident => $e:expr) => {
        match $self {
            AnyReader::Format01($r) => $e,
            AnyReader::B8($r) => $e,
            AnyReader::Hits($r) => $e,
            AnyReader::R8($r) => $e,
            AnyReader::Dets($r) => $e,
        }
    };
}

impl<S: ByteSource> AnyReader<S> {
    /// Recover the underlying byte source.
    pub fn into_inner(self) -> S {
        dispatch!(self, r => r.into_inner())
    }
}

impl<S: ByteSource> RecordReader for AnyReader<S> {
    fn read_bit(&mut self) -> Result<bool, Error> {
        dispatch!(self, r => r.read_bit())
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        dispatch!(self, r => r.read_bytes(buf))
    }

    fn next_record(&mut self) -> Result<bool, Error> {
        dispatch!(self, r => r.next_record())
    }

    fn is_end_of_record(&mut self) -> Result<bool, Error> {
        dispatch!(self, r => r.is_end_of_record())
    }

    fn has_record(&mut self) -> Result<bool, Error> {
        dispatch!(self, r => r.has_record())
    }

    fn is_truncated(&self) -> bool {
        dispatch!(self, r => r.is_truncated())
    }

    fn current_result_type(&self) -> ResultType {
        dispatch!(self, r => r.current_result_type())
    }

    fn position(&self) -> usize {
        dispatch!(self, r => r.position())
    }

    fn bits_per_record(&self) -> usize {
        dispatch!(self, r => r.bits_per_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_round_trip() {
        for name in ["01", "b8", "ptb64", "hits", "r8", "dets"] {
            let format: SampleFormat = name.parse().unwrap();
            assert_eq!(format.name(), name);
        }
        assert_eq!("HITS".parse::<SampleFormat>().unwrap(), SampleFormat::Hits);
        assert!(matches!(
            "csv".parse::<SampleFormat>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn result_type_tags() {
        assert_eq!(ResultType::try_from(b'D').unwrap(), ResultType::Detector);
        assert_eq!(char::from(ResultType::Observable), 'L');
        assert!(matches!(
            ResultType::try_from(b'X'),
            Err(Error::UnknownCategory(b'X'))
        ));
    }

    #[test]
    fn make_rejects_categories_outside_dets() {
        let shape = RecordShape {
            measurements: 3,
            detectors: 1,
            observables: 0,
        };
        let r = make(&b""[..], SampleFormat::Hits, shape);
        assert!(matches!(r, Err(Error::InvalidArgument(_))));

        let shape = RecordShape {
            observables: 1,
            ..RecordShape::measurements(3)
        };
        let r = make(&b""[..], SampleFormat::B8, shape);
        assert!(matches!(r, Err(Error::InvalidArgument(_))));

        assert!(make(&b""[..], SampleFormat::Dets, shape).is_ok());
    }

    #[test]
    fn make_rejects_ptb64() {
        let r = make(&b""[..], SampleFormat::Ptb64, RecordShape::measurements(64));
        assert!(matches!(r, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn make_rejects_huge_records() {
        let shape = RecordShape::measurements(usize::MAX);
        let r = make(&b""[..], SampleFormat::Format01, shape);
        assert!(matches!(r, Err(Error::InvalidArgument(_))));

        let shape = RecordShape {
            measurements: usize::MAX,
            detectors: 1,
            observables: 0,
        };
        let r = make(&b""[..], SampleFormat::Dets, shape);
        assert!(matches!(r, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn make_rejects_empty_windows() {
        for format in [SampleFormat::B8, SampleFormat::R8] {
            let r = make(&b"\x01"[..], format, RecordShape::measurements(0));
            assert!(matches!(r, Err(Error::InvalidArgument(_))), "{format}");
        }
    }

    #[test]
    fn make_dispatches_by_format() {
        let mut r = make(&b"1,3\n"[..], SampleFormat::Hits, RecordShape::measurements(4)).unwrap();
        let mut buf = [0; 1];
        assert_eq!(r.read_bytes(&mut buf).unwrap(), 4);
        assert_eq!(buf[0], 0b1010);
        assert_eq!(r.current_result_type(), ResultType::Measurement);
        assert!(!r.next_record().unwrap());
    }
}
