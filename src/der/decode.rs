//! Decoding DER data.
//!
//! The central type of this module is [`Decoder`], a forward-only cursor
//! over an immutable byte region. Nested values are parsed by handing a
//! closure a scoped sub-decoder that covers exactly the content of the
//! value. Once the closure returns, the sub-decoder checks that all its
//! content has been consumed. This way, trailing data inside a structure is
//! always detected without the individual parsing functions having to
//! worry about it.

use bytes::Bytes;
use super::captured::Captured;
use super::error::DecodeError;
use super::length;
use super::tag::Tag;


//------------ decode --------------------------------------------------------

/// Decodes a single value with the expected tag starting at `pos`.
///
/// Returns the content of the value and the position right after the
/// value. This is the stateless version of [`Decoder::take_tlv`].
pub fn decode(
    expected: Tag, data: &[u8], pos: usize
) -> Result<(&[u8], usize), DecodeError> {
    let rest = match data.get(pos..) {
        Some(rest) => rest,
        None => return Err(DecodeError::malformed("position out of range"))
    };
    let (tag, hdr_len, content_len) = read_header(rest).map_err(|err| {
        err.shifted(pos)
    })?;
    if tag != expected {
        return Err(DecodeError::malformed("unexpected tag").at(pos))
    }
    let start = pos + hdr_len;
    Ok((&data[start..start + content_len], start + content_len))
}

/// Reads the tag and length of the value at the beginning of `data`.
///
/// Returns the tag, the length of tag and length octets, and the content
/// length. Checks that the content is fully present in `data`.
fn read_header(data: &[u8]) -> Result<(Tag, usize, usize), DecodeError> {
    let tag = match data.first() {
        Some(octet) => {
            match Tag::from_octet(*octet) {
                Some(tag) => tag,
                None => {
                    return Err(DecodeError::unsupported(
                        "high tag number form"
                    ))
                }
            }
        }
        None => return Err(DecodeError::malformed("unexpected end of data"))
    };
    let (content_len, len_len) = length::read(&data[1..]).map_err(|err| {
        err.at(1)
    })?;
    let hdr_len = 1 + len_len;
    if data.len() - hdr_len < content_len {
        return Err(DecodeError::malformed("truncated data"))
    }
    Ok((tag, hdr_len, content_len))
}


//------------ Decoder -------------------------------------------------------

/// A cursor over DER encoded data.
///
/// A decoder covers a region of data. Values are taken from the front of
/// this region one by one. Taking a value with an unexpected tag, a value
/// that extends beyond the region, or a value with broken length octets
/// results in an error.
///
/// Methods come in two flavors. The `take_*` methods require the next
/// value to be present and to have the right tag. The `take_opt_*`
/// methods return `Ok(None)` if the decoder is at its end or the next value
/// has a different tag. Both return an error if the next value has the
/// right tag but is broken.
#[derive(Clone, Debug)]
pub struct Decoder {
    /// The data of this decoder’s region.
    data: Bytes,

    /// The current position in `data`.
    pos: usize,

    /// The offset of `data` in the outermost decoder.
    ///
    /// This is only used for reporting error positions.
    offset: usize,
}

impl Decoder {
    /// Creates a new decoder for the given data.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Decoder { data: data.into(), pos: 0, offset: 0 }
    }

    /// Decodes the complete data using the closure.
    ///
    /// The closure receives a decoder for `data`. After it returned
    /// successfully, the decoder must have been fully consumed.
    pub fn decode<F, T>(data: impl Into<Bytes>, op: F) -> Result<T, DecodeError>
    where F: FnOnce(&mut Decoder) -> Result<T, DecodeError> {
        let mut decoder = Decoder::new(data);
        let res = op(&mut decoder)?;
        decoder.assert_at_end()?;
        Ok(res)
    }

    /// Returns the current position within the decoder’s region.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of octets left in the region.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns whether all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns an error if there is data left.
    pub fn assert_at_end(&self) -> Result<(), DecodeError> {
        if self.is_empty() {
            Ok(())
        }
        else {
            Err(self.malformed("trailing data"))
        }
    }

    /// Creates an error for malformed data at the current position.
    pub fn malformed(&self, msg: &'static str) -> DecodeError {
        DecodeError::malformed(msg).at(self.offset + self.pos)
    }

    /// Creates an error for unsupported data at the current position.
    pub fn unsupported(&self, msg: &'static str) -> DecodeError {
        DecodeError::unsupported(msg).at(self.offset + self.pos)
    }

    /// Returns the tag of the next value without taking it.
    ///
    /// Returns `Ok(None)` if the decoder is at its end.
    pub fn peek_tag(&self) -> Result<Option<Tag>, DecodeError> {
        match self.data.get(self.pos) {
            Some(octet) => {
                match Tag::from_octet(*octet) {
                    Some(tag) => Ok(Some(tag)),
                    None => Err(self.unsupported("high tag number form"))
                }
            }
            None => Ok(None)
        }
    }

    /// Reads the header of the next value.
    fn header(&self) -> Result<(Tag, usize, usize), DecodeError> {
        read_header(&self.data[self.pos..]).map_err(|err| {
            err.shifted(self.offset + self.pos)
        })
    }

    /// Takes the next value and returns its tag and content.
    pub fn take_any(&mut self) -> Result<(Tag, Bytes), DecodeError> {
        let (tag, hdr_len, content_len) = self.header()?;
        let start = self.pos + hdr_len;
        let content = self.data.slice(start..start + content_len);
        self.pos = start + content_len;
        Ok((tag, content))
    }

    /// Takes the next value with the given tag and returns its content.
    pub fn take_tlv(&mut self, expected: Tag) -> Result<Bytes, DecodeError> {
        let (tag, hdr_len, content_len) = self.header()?;
        if tag != expected {
            return Err(self.malformed("unexpected tag"))
        }
        let start = self.pos + hdr_len;
        let content = self.data.slice(start..start + content_len);
        self.pos = start + content_len;
        Ok(content)
    }

    /// Takes the next value if it has the given tag.
    pub fn take_opt_tlv(
        &mut self, expected: Tag
    ) -> Result<Option<Bytes>, DecodeError> {
        if self.peek_tag()? == Some(expected) {
            self.take_tlv(expected).map(Some)
        }
        else {
            Ok(None)
        }
    }

    /// Takes a value with the given tag and processes its content.
    ///
    /// The closure receives a decoder limited to the content of the value.
    /// It has to consume all of it.
    pub fn take_value_if<F, T>(
        &mut self, expected: Tag, op: F
    ) -> Result<T, DecodeError>
    where F: FnOnce(&mut Decoder) -> Result<T, DecodeError> {
        let (tag, hdr_len, content_len) = self.header()?;
        if tag != expected {
            return Err(self.malformed("unexpected tag"))
        }
        let start = self.pos + hdr_len;
        let mut inner = Decoder {
            data: self.data.slice(start..start + content_len),
            pos: 0,
            offset: self.offset + start,
        };
        let res = op(&mut inner)?;
        inner.assert_at_end()?;
        self.pos = start + content_len;
        Ok(res)
    }

    /// Takes an optional value with the given tag and processes its content.
    pub fn take_opt_value_if<F, T>(
        &mut self, expected: Tag, op: F
    ) -> Result<Option<T>, DecodeError>
    where F: FnOnce(&mut Decoder) -> Result<T, DecodeError> {
        if self.peek_tag()? == Some(expected) {
            self.take_value_if(expected, op).map(Some)
        }
        else {
            Ok(None)
        }
    }

    /// Takes a value of any tag and processes it.
    ///
    /// This is useful for choices where the tag decides how to interpret
    /// the content.
    pub fn take_value<F, T>(&mut self, op: F) -> Result<T, DecodeError>
    where F: FnOnce(Tag, &mut Decoder) -> Result<T, DecodeError> {
        let tag = match self.peek_tag()? {
            Some(tag) => tag,
            None => return Err(self.malformed("unexpected end of data"))
        };
        self.take_value_if(tag, |cons| op(tag, cons))
    }

    /// Takes a constructed value with the given tag.
    pub fn take_constructed_if<F, T>(
        &mut self, expected: Tag, op: F
    ) -> Result<T, DecodeError>
    where F: FnOnce(&mut Decoder) -> Result<T, DecodeError> {
        debug_assert!(expected.is_constructed());
        self.take_value_if(expected, op)
    }

    /// Takes an optional constructed value with the given tag.
    pub fn take_opt_constructed_if<F, T>(
        &mut self, expected: Tag, op: F
    ) -> Result<Option<T>, DecodeError>
    where F: FnOnce(&mut Decoder) -> Result<T, DecodeError> {
        debug_assert!(expected.is_constructed());
        self.take_opt_value_if(expected, op)
    }

    /// Takes a sequence.
    pub fn take_sequence<F, T>(&mut self, op: F) -> Result<T, DecodeError>
    where F: FnOnce(&mut Decoder) -> Result<T, DecodeError> {
        self.take_value_if(Tag::SEQUENCE, op)
    }

    /// Takes an optional sequence.
    pub fn take_opt_sequence<F, T>(
        &mut self, op: F
    ) -> Result<Option<T>, DecodeError>
    where F: FnOnce(&mut Decoder) -> Result<T, DecodeError> {
        self.take_opt_value_if(Tag::SEQUENCE, op)
    }

    /// Takes a set.
    pub fn take_set<F, T>(&mut self, op: F) -> Result<T, DecodeError>
    where F: FnOnce(&mut Decoder) -> Result<T, DecodeError> {
        self.take_value_if(Tag::SET, op)
    }

    /// Takes an optional set.
    pub fn take_opt_set<F, T>(
        &mut self, op: F
    ) -> Result<Option<T>, DecodeError>
    where F: FnOnce(&mut Decoder) -> Result<T, DecodeError> {
        self.take_opt_value_if(Tag::SET, op)
    }

    /// Takes the next value and returns its complete encoding.
    pub fn capture_one(&mut self) -> Result<Captured, DecodeError> {
        let (_, hdr_len, content_len) = self.header()?;
        let end = self.pos + hdr_len + content_len;
        let res = self.data.slice(self.pos..end);
        self.pos = end;
        Ok(Captured::from_der(res))
    }

    /// Processes the next value and returns its complete encoding as well.
    ///
    /// The closure receives this decoder and must consume exactly one
    /// value. The encoding of that value is returned along side the
    /// closure’s result.
    pub fn capture<F, T>(
        &mut self, op: F
    ) -> Result<(T, Captured), DecodeError>
    where F: FnOnce(&mut Decoder) -> Result<T, DecodeError> {
        let (_, hdr_len, content_len) = self.header()?;
        let start = self.pos;
        let end = start + hdr_len + content_len;
        let res = op(self)?;
        if self.pos != end {
            return Err(self.malformed("capture consumed more than one value"))
        }
        Ok((res, Captured::from_der(self.data.slice(start..end))))
    }

    /// Skips over the next value.
    pub fn skip_one(&mut self) -> Result<(), DecodeError> {
        self.take_any().map(|_| ())
    }

    /// Skips over all remaining values.
    ///
    /// Each value is still checked for a correct tag and length.
    pub fn skip_all(&mut self) -> Result<(), DecodeError> {
        while !self.is_empty() {
            self.skip_one()?;
        }
        Ok(())
    }


    //--- Raw content access
    //
    // These are used when processing the content of primitive values.

    /// Takes a single octet.
    pub fn take_octet(&mut self) -> Result<u8, DecodeError> {
        match self.data.get(self.pos) {
            Some(octet) => {
                self.pos += 1;
                Ok(*octet)
            }
            None => Err(self.malformed("unexpected end of data"))
        }
    }

    /// Takes all the remaining octets.
    pub fn take_rest(&mut self) -> Bytes {
        let res = self.data.slice(self.pos..);
        self.pos = self.data.len();
        res
    }


    //--- Simple types

    /// Takes a BOOLEAN value.
    ///
    /// DER only allows the content octets 0xFF for true and 0x00 for
    /// false.
    pub fn take_bool(&mut self) -> Result<bool, DecodeError> {
        self.take_value_if(Tag::BOOLEAN, Self::bool_content)
    }

    /// Takes an optional BOOLEAN value.
    pub fn take_opt_bool(&mut self) -> Result<Option<bool>, DecodeError> {
        self.take_opt_value_if(Tag::BOOLEAN, Self::bool_content)
    }

    fn bool_content(cons: &mut Decoder) -> Result<bool, DecodeError> {
        match cons.take_octet()? {
            0xFF => Ok(true),
            0x00 => Ok(false),
            _ => Err(cons.malformed("invalid boolean"))
        }
    }

    /// Takes a NULL value.
    pub fn take_null(&mut self) -> Result<(), DecodeError> {
        self.take_value_if(Tag::NULL, |_| Ok(()))
    }

    /// Takes an optional NULL value.
    pub fn take_opt_null(&mut self) -> Result<Option<()>, DecodeError> {
        self.take_opt_value_if(Tag::NULL, |_| Ok(()))
    }

    /// Takes an INTEGER that fits into a `u64`.
    pub fn take_u64(&mut self) -> Result<u64, DecodeError> {
        self.take_value_if(Tag::INTEGER, Self::u64_content)
    }

    /// Takes an optional INTEGER that fits into a `u64`.
    pub fn take_opt_u64(&mut self) -> Result<Option<u64>, DecodeError> {
        self.take_opt_value_if(Tag::INTEGER, Self::u64_content)
    }

    /// Takes an INTEGER that must have the given value.
    pub fn skip_u64_if(&mut self, expected: u64) -> Result<(), DecodeError> {
        let pos = self.pos;
        if self.take_u64()? != expected {
            return Err(
                DecodeError::malformed("unexpected integer value").at(
                    self.offset + pos
                )
            )
        }
        Ok(())
    }

    fn u64_content(cons: &mut Decoder) -> Result<u64, DecodeError> {
        let content = super::int::Unsigned::from_content(cons)?;
        let slice = content.as_slice();
        if slice.len() > 8 {
            return Err(cons.unsupported("integer too large"))
        }
        Ok(slice.iter().fold(0u64, |res, octet| {
            res << 8 | u64::from(*octet)
        }))
    }
}


//============ Tests =========================================================
