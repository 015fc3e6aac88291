//! Errors surfaced by the record decoders.

use thiserror::Error;

/// Errors occurring while constructing a decoder or decoding records.
///
/// Every error is fatal to the decoder that produced it. Reaching the end of
/// a record or of the input through [`RecordReader::next_record`] is not an
/// error; it is reported through its return value.
///
/// [`RecordReader::next_record`]: crate::record::RecordReader::next_record
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied reader.
    #[cfg(feature = "std")]
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The input ended where a value was required.
    #[error("Attempted to read past the end of the input.")]
    EndOfInput,
    /// A read was attempted past the end of the current record.
    #[error("Attempted to read past the end of the record.")]
    EndOfRecord,
    /// A token did not match the grammar of the format.
    #[error("Malformed input: {0}.")]
    MalformedInput(&'static str),
    /// An index list entry was terminated by an unexpected character.
    #[error("Invalid separator ({0:?}).")]
    InvalidSeparator(Option<u8>),
    /// An index lies in the past of the current position.
    #[error("Index {index} is in the past of position {position}.")]
    OutOfOrderIndex { index: usize, position: usize },
    /// An index lies outside of the record.
    #[error("Index {index} is outside of the record size ({bits_per_record}).")]
    IndexOutOfRange { index: usize, bits_per_record: usize },
    /// A tagged index lies outside of its category.
    #[error("Index {tag}{index} is outside of its category ({len} bits).")]
    CategoryIndexOutOfRange { tag: char, index: usize, len: usize },
    /// No record terminator was found within the record size.
    #[error("Record is longer than {bits_per_record} bits.")]
    RecordTooLong { bits_per_record: usize },
    /// A tagged index had a category other than `M`, `D` or `L`.
    #[error("Unknown result type ({0:#04x}), expected M, D or L.")]
    UnknownCategory(u8),
    /// A decoder was requested with unsupported parameters.
    #[error("Invalid argument: {0}.")]
    InvalidArgument(&'static str),
}
