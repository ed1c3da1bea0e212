//! Unsigned integers of arbitrary size.

use std::{cmp, fmt};
use bytes::Bytes;
use super::decode::Decoder;
use super::encode::PrimitiveContent;
use super::error::DecodeError;
use super::tag::Tag;


//------------ Unsigned ------------------------------------------------------

/// A non-negative INTEGER of arbitrary size.
///
/// The value is kept as its big-endian magnitude without any leading zero
/// octets, except for the value zero which is a single zero octet. This
/// makes comparing two values a matter of comparing their octets.
///
/// DER encodes integers in two’s complement, so when encoding, a zero octet
/// is prepended if the most significant bit of the magnitude is set. When
/// decoding, such a zero octet is removed again. Negative values are
/// rejected.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Unsigned(Bytes);

impl Unsigned {
    /// Creates a value from big-endian octets.
    ///
    /// Leading zeros are stripped. An empty slice is zero.
    pub fn from_slice(slice: &[u8]) -> Self {
        let start = slice.iter().position(|&x| x != 0).unwrap_or(
            slice.len()
        );
        if start == slice.len() {
            Unsigned(Bytes::from_static(b"\0"))
        }
        else {
            Unsigned(Bytes::copy_from_slice(&slice[start..]))
        }
    }

    /// Returns the big-endian magnitude.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns whether the value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.as_ref() == b"\0"
    }

    /// Takes an INTEGER value from the beginning of the decoder.
    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        cons.take_value_if(Tag::INTEGER, Self::from_content)
    }

    /// Takes an optional INTEGER value from the beginning of the decoder.
    pub fn take_opt_from(
        cons: &mut Decoder
    ) -> Result<Option<Self>, DecodeError> {
        cons.take_opt_value_if(Tag::INTEGER, Self::from_content)
    }

    /// Parses the content octets of an INTEGER.
    pub fn from_content(cons: &mut Decoder) -> Result<Self, DecodeError> {
        let content = cons.take_rest();
        match content.len() {
            0 => Err(cons.malformed("empty integer")),
            1 => {
                if content[0] & 0x80 != 0 {
                    Err(cons.malformed("negative integer"))
                }
                else {
                    Ok(Unsigned(content))
                }
            }
            _ => {
                if content[0] & 0x80 != 0 {
                    Err(cons.malformed("negative integer"))
                }
                else if content[0] == 0 {
                    if content[1] & 0x80 == 0 {
                        Err(cons.malformed("non-minimal integer"))
                    }
                    else {
                        Ok(Unsigned(content.slice(1..)))
                    }
                }
                else {
                    Ok(Unsigned(content))
                }
            }
        }
    }

    /// Returns whether the encoding needs a leading zero octet.
    fn needs_zero(&self) -> bool {
        self.0[0] & 0x80 != 0
    }
}


//--- From

impl From<u64> for Unsigned {
    fn from(value: u64) -> Self {
        Self::from_slice(&value.to_be_bytes())
    }
}

impl From<u32> for Unsigned {
    fn from(value: u32) -> Self {
        Self::from(u64::from(value))
    }
}


//--- PartialOrd and Ord

impl PartialOrd for Unsigned {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Unsigned {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.0.len().cmp(&other.0.len()).then_with(|| {
            self.0.as_ref().cmp(other.0.as_ref())
        })
    }
}


//--- PrimitiveContent

impl PrimitiveContent for Unsigned {
    const TAG: Tag = Tag::INTEGER;

    fn encoded_len(&self) -> usize {
        if self.needs_zero() {
            self.0.len() + 1
        }
        else {
            self.0.len()
        }
    }

    fn write_encoded(&self, target: &mut Vec<u8>) {
        if self.needs_zero() {
            target.push(0);
        }
        target.extend_from_slice(self.0.as_ref())
    }
}


//--- Display and Debug

impl fmt::Display for Unsigned {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, octet) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02X}", octet)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Unsigned {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Unsigned({})", self)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::der::Values;

    fn decode(data: &'static [u8]) -> Result<Unsigned, DecodeError> {
        Decoder::decode(data, Unsigned::take_from)
    }

    fn encode(value: &Unsigned) -> Vec<u8> {
        value.encode_ref().to_vec().unwrap()
    }

    #[test]
    fn high_bit_gets_zero() {
        let value = Unsigned::from_slice(b"\x80");
        assert_eq!(encode(&value), b"\x02\x02\x00\x80");
        assert_eq!(decode(b"\x02\x02\x00\x80").unwrap(), value);
        assert_eq!(value.as_slice(), b"\x80");
    }

    #[test]
    fn leading_zeros_are_normalized() {
        let value = Unsigned::from_slice(b"\x00\x00\x01\x02");
        assert_eq!(value.as_slice(), b"\x01\x02");
        assert_eq!(encode(&value), b"\x02\x02\x01\x02");
        assert_eq!(Unsigned::from_slice(b""), Unsigned::from(0u64));
        assert!(Unsigned::from_slice(b"\0\0").is_zero());
        assert_eq!(encode(&Unsigned::from(0u32)), b"\x02\x01\x00");
    }

    #[test]
    fn rejects_bad_content() {
        assert!(decode(b"\x02\x00").is_err());
        assert!(decode(b"\x02\x01\xFF").is_err());
        assert!(decode(b"\x02\x02\x00\x7F").is_err());
    }

    #[test]
    fn ordering() {
        assert!(Unsigned::from(255u64) < Unsigned::from(256u64));
        assert!(Unsigned::from(0x1000u64) > Unsigned::from(0x0FFFu64));
    }

    #[test]
    fn display() {
        let value = decode(b"\x02\x03\x00\xC0\xFF").unwrap();
        assert_eq!(format!("{}", value), "C0:FF");
    }
}
