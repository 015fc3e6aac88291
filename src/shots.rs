//! Convenience interfaces for decoding every shot of a stream.
//!
//! The functions in this module walk all records of an input, publishing each
//! bit to the [`FromShots`] and [`FromShot`] traits.

use crate::{
    Error,
    record::{RecordReader, RecordShape, ResultType, SampleFormat, make},
};

/// Produce shot receivers for a stream.
pub trait FromShots {
    /// Retrieve a receiver for the shot numbered `index`, if one exists.
    fn add_shot(&mut self, index: usize) -> Option<&mut dyn FromShot>;
}

/// Receive the bits of a single shot.
///
/// The default implementation ignores received bits.
#[allow(unused_variables)]
pub trait FromShot {
    /// Add the bit at absolute `position` of the shot, belonging to the
    /// category `result_type`.
    fn add_bit(&mut self, result_type: ResultType, position: usize, bit: bool) {}
}

/// Decode every remaining shot from a reader, publishing to a receiver.
///
/// Returns the number of shots decoded. Fails with [`Error::EndOfInput`] if
/// the input ends partway through a fixed-width record.
pub fn decode(r: &mut impl RecordReader, o: &mut impl FromShots) -> Result<usize, Error> {
    if !r.has_record()? {
        return Ok(0);
    }

    let mut shots = 0;
    loop {
        // Shadow the stream receiver with that of a single shot.
        let mut o = o.add_shot(shots);

        while !r.is_end_of_record()? {
            let result_type = r.current_result_type();
            let position = r.position();
            let bit = r.read_bit()?;

            if let Some(o) = &mut o {
                o.add_bit(result_type, position, bit);
            }
        }
        if r.is_truncated() {
            Err(Error::EndOfInput)?;
        }

        shots += 1;

        if !r.next_record()? {
            break;
        }
    }

    Ok(shots)
}

/// Decode every shot of a slice in the given format, publishing to a receiver.
pub fn decode_slice(
    data: &[u8],
    format: SampleFormat,
    shape: RecordShape,
    o: &mut impl FromShots,
) -> Result<usize, Error> {
    decode(&mut make(data, format, shape)?, o)
}

/// Decode every shot of a reader in the given format, publishing to a
/// receiver.
///
/// Bytes are pulled one at a time, so wrap unbuffered readers in a
/// [`std::io::BufReader`].
///
/// _Requires Cargo feature `std`._
#[cfg(feature = "std")]
pub fn decode_reader(
    r: &mut impl std::io::Read,
    format: SampleFormat,
    shape: RecordShape,
    o: &mut impl FromShots,
) -> Result<usize, Error> {
    let source = crate::source::IoSource::new(r);
    decode(&mut make(source, format, shape)?, o)
}
