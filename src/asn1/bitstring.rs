//! Bit strings.

use bytes::Bytes;
use crate::der::{Decoder, DecodeError, PrimitiveContent, Tag};


//------------ BitString -----------------------------------------------------

/// A BIT STRING value.
///
/// The content of a bit string starts with an octet giving the number of
/// unused bits in the last octet, followed by the octets of the string.
/// The number of unused bits must be between 0 and 7, and must be 0 if
/// there are no octets. DER also requires the unused bits to be zero.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BitString {
    unused: u8,
    bits: Bytes,
}

impl BitString {
    /// Creates a new bit string.
    ///
    /// # Panics
    ///
    /// The function panics if `unused` is larger than 7 or if it isn’t
    /// zero for empty `bits`.
    pub fn new(unused: u8, bits: Bytes) -> Self {
        assert!(unused < 8 && (unused == 0 || !bits.is_empty()));
        BitString { unused, bits }
    }

    /// Creates a bit string from a whole number of octets.
    pub fn from_octets(bits: Bytes) -> Self {
        BitString { unused: 0, bits }
    }

    /// Takes a bit string from the beginning of the decoder.
    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        cons.take_value_if(Tag::BIT_STRING, Self::from_content)
    }

    /// Takes an optional bit string with the given tag.
    pub fn take_opt_from_as(
        cons: &mut Decoder, tag: Tag
    ) -> Result<Option<Self>, DecodeError> {
        cons.take_opt_value_if(tag, Self::from_content)
    }

    /// Parses the content octets of a bit string.
    pub fn from_content(cons: &mut Decoder) -> Result<Self, DecodeError> {
        let unused = cons.take_octet()?;
        let bits = cons.take_rest();
        if unused > 7 {
            return Err(cons.malformed("invalid bit string"))
        }
        if bits.is_empty() {
            if unused > 0 {
                return Err(cons.malformed("invalid bit string"))
            }
        }
        else if bits[bits.len() - 1] & ((1u8 << unused) - 1) != 0 {
            return Err(cons.malformed("non-zero unused bits"))
        }
        Ok(BitString { unused, bits })
    }

    /// Returns the number of unused bits in the last octet.
    pub fn unused(&self) -> u8 {
        self.unused
    }

    /// Returns the octets of the bit string.
    pub fn octets(&self) -> &Bytes {
        &self.bits
    }

    /// Returns the octets if the string has no unused bits.
    ///
    /// Signatures and public keys are always a whole number of octets.
    pub fn octet_bytes(&self) -> Option<Bytes> {
        if self.unused == 0 {
            Some(self.bits.clone())
        }
        else {
            None
        }
    }

    /// Returns the number of bits in the string.
    pub fn bit_len(&self) -> usize {
        self.bits.len() * 8 - usize::from(self.unused)
    }

    /// Returns the value of the given bit.
    ///
    /// Bits are counted from the most significant bit of the first octet.
    /// Bits beyond the end of the string are false.
    pub fn bit(&self, bit: usize) -> bool {
        if bit >= self.bit_len() {
            return false
        }
        self.bits[bit / 8] & (0x80 >> (bit % 8)) != 0
    }
}


//--- PrimitiveContent

impl PrimitiveContent for BitString {
    const TAG: Tag = Tag::BIT_STRING;

    fn encoded_len(&self) -> usize {
        self.bits.len() + 1
    }

    fn write_encoded(&self, target: &mut Vec<u8>) {
        target.push(self.unused);
        target.extend_from_slice(self.bits.as_ref())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::der::Values;

    fn decode(data: &'static [u8]) -> Result<BitString, DecodeError> {
        Decoder::decode(data, BitString::take_from)
    }

    #[test]
    fn bits() {
        let bits = decode(b"\x03\x02\x05\xA0").unwrap();
        assert_eq!(bits.unused(), 5);
        assert_eq!(bits.bit_len(), 3);
        assert!(bits.bit(0));
        assert!(!bits.bit(1));
        assert!(bits.bit(2));
        assert!(!bits.bit(3));
        assert!(!bits.bit(100));
        assert_eq!(bits.octet_bytes(), None);
        assert_eq!(bits.encode_ref().to_vec().unwrap(), b"\x03\x02\x05\xA0");
    }

    #[test]
    fn invalid() {
        assert!(decode(b"\x03\x00").is_err());
        assert!(decode(b"\x03\x01\x01").is_err());
        assert!(decode(b"\x03\x02\x08\x00").is_err());
        assert!(decode(b"\x03\x02\x01\x01").is_err());
        assert_eq!(decode(b"\x03\x01\x00").unwrap().bit_len(), 0);
    }
}
