//! The length octets of a DER value.
//!
//! ```text
//! 0x00 ..= 0x7F             short form, the octet is the length
//! 0x81 nn                   0x80 ..= 0xFF
//! 0x82 nn nn                0x100 ..= 0x7FFF
//! ```
//!
//! Everything else is rejected: the indefinite form `0x80` isn’t allowed in
//! DER at all, lengths from 0x8000 on as well as the longer long forms are
//! not supported by this codec, and long forms that could have been
//! shorter aren’t DER.

use super::error::{DecodeError, EncodeError};


/// The largest content length this codec handles.
pub const MAX_LEN: usize = 0x7FFF;


/// Returns the number of octets needed to encode a length.
///
/// This is also correct for unsupported lengths so that length
/// calculations never fail. Encoding those will fail, though.
pub fn encoded_len(len: usize) -> usize {
    if len < 0x80 {
        1
    }
    else if len < 0x100 {
        2
    }
    else {
        3
    }
}

/// Appends the length octets for `len` to `target`.
pub fn write(len: usize, target: &mut Vec<u8>) -> Result<(), EncodeError> {
    if len < 0x80 {
        target.push(len as u8);
    }
    else if len < 0x100 {
        target.push(0x81);
        target.push(len as u8);
    }
    else if len <= MAX_LEN {
        target.push(0x82);
        target.push((len >> 8) as u8);
        target.push(len as u8);
    }
    else {
        return Err(EncodeError::length(len))
    }
    Ok(())
}

/// Reads length octets from the beginning of `data`.
///
/// Returns the length and the number of octets it occupied.
pub fn read(data: &[u8]) -> Result<(usize, usize), DecodeError> {
    let first = match data.first() {
        Some(first) => *first,
        None => return Err(DecodeError::malformed("missing length"))
    };
    match first {
        0x00..=0x7F => Ok((usize::from(first), 1)),
        0x80 => Err(DecodeError::malformed("indefinite length")),
        0x81 => {
            let len = match data.get(1) {
                Some(len) => usize::from(*len),
                None => return Err(DecodeError::malformed("truncated length"))
            };
            if len < 0x80 {
                return Err(DecodeError::malformed("non-minimal length"))
            }
            Ok((len, 2))
        }
        0x82 => {
            if data.len() < 3 {
                return Err(DecodeError::malformed("truncated length"))
            }
            let len = usize::from(data[1]) << 8 | usize::from(data[2]);
            if len < 0x100 {
                return Err(DecodeError::malformed("non-minimal length"))
            }
            if len > MAX_LEN {
                return Err(DecodeError::unsupported("length too large"))
            }
            Ok((len, 3))
        }
        _ => Err(DecodeError::unsupported("length too large"))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn encoded(len: usize) -> Vec<u8> {
        let mut res = Vec::new();
        write(len, &mut res).unwrap();
        res
    }

    #[test]
    fn round_trip_boundaries() {
        for &len in &[0, 0x7F, 0x80, 0xFF, 0x100, 0x7FFF] {
            let octets = encoded(len);
            assert_eq!(octets.len(), encoded_len(len));
            assert_eq!(read(&octets).unwrap(), (len, octets.len()));
        }
    }

    #[test]
    fn encodings() {
        assert_eq!(encoded(0), b"\x00");
        assert_eq!(encoded(0x7F), b"\x7F");
        assert_eq!(encoded(0x80), b"\x81\x80");
        assert_eq!(encoded(0xFF), b"\x81\xFF");
        assert_eq!(encoded(0x100), b"\x82\x01\x00");
        assert_eq!(encoded(0x7FFF), b"\x82\x7F\xFF");
    }

    #[test]
    fn unsupported_lengths() {
        assert!(write(0x8000, &mut Vec::new()).is_err());
        assert!(read(b"\x82\x80\x00").is_err());
        assert!(read(b"\x83\x01\x00\x00").is_err());
        assert!(read(b"\x80").is_err());
    }

    #[test]
    fn malformed_lengths() {
        assert!(read(b"").is_err());
        assert!(read(b"\x81").is_err());
        assert!(read(b"\x82\x01").is_err());
        assert!(read(b"\x81\x05").is_err());
        assert!(read(b"\x82\x00\xFF").is_err());
    }
}
