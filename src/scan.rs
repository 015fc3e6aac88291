//! Token scanners shared by the sparse formats.

use either::Either::{self, Left, Right};

use crate::{Error, source::ByteSource};

/// Consume an exact literal from the stream.
///
/// Returns `false` if the stream is exhausted where the literal would begin.
/// Any other mismatch is malformed input.
pub(crate) fn consume_keyword(s: &mut impl ByteSource, keyword: &[u8]) -> Result<bool, Error> {
    let mut next = s.next_byte()?;
    if next.is_none() {
        return Ok(false);
    }

    for (i, &k) in keyword.iter().enumerate() {
        if i != 0 {
            next = s.next_byte()?;
        }
        if next != Some(k) {
            Err(Error::MalformedInput("expected keyword not found"))?;
        }
    }

    Ok(true)
}

/// Parse a maximal run of decimal digits.
///
/// Returns the value and the byte terminating the run, or, if no digit was
/// found, the byte that was found instead.
pub(crate) fn read_unsigned(
    s: &mut impl ByteSource,
) -> Result<Either<(usize, Option<u8>), Option<u8>>, Error> {
    let mut next = s.next_byte()?;
    if !matches!(next, Some(b'0'..=b'9')) {
        return Ok(Right(next));
    }

    let mut value: usize = 0;
    while let Some(d @ b'0'..=b'9') = next {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add((d - b'0') as usize))
            .ok_or(Error::MalformedInput("index does not fit in a machine word"))?;
        next = s.next_byte()?;
    }

    Ok(Left((value, next)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_found() {
        let mut s: &[u8] = b"shot M1";
        assert!(consume_keyword(&mut s, b"shot").unwrap());
        assert_eq!(s, b" M1");
    }

    #[test]
    fn keyword_absent_at_end() {
        let mut s: &[u8] = b"";
        assert!(!consume_keyword(&mut s, b"shot").unwrap());
    }

    #[test]
    fn keyword_mismatch() {
        let mut s: &[u8] = b"shoe";
        assert!(matches!(
            consume_keyword(&mut s, b"shot"),
            Err(Error::MalformedInput(_))
        ));

        let mut s: &[u8] = b"sh";
        assert!(matches!(
            consume_keyword(&mut s, b"shot"),
            Err(Error::MalformedInput(_))
        ));
    }

    #[test]
    fn unsigned_with_terminator() {
        let mut s: &[u8] = b"1234,5";
        assert_eq!(read_unsigned(&mut s).unwrap(), Left((1234, Some(b','))));
        assert_eq!(read_unsigned(&mut s).unwrap(), Left((5, None)));
        assert_eq!(read_unsigned(&mut s).unwrap(), Right(None));
    }

    #[test]
    fn unsigned_absent() {
        let mut s: &[u8] = b"\nx";
        assert_eq!(read_unsigned(&mut s).unwrap(), Right(Some(b'\n')));
        assert_eq!(read_unsigned(&mut s).unwrap(), Right(Some(b'x')));
    }

    #[test]
    fn unsigned_overflow() {
        let mut s: &[u8] = b"99999999999999999999999999\n";
        assert!(matches!(read_unsigned(&mut s), Err(Error::MalformedInput(_))));
    }
}
