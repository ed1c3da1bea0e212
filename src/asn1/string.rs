//! Character strings.

use std::{fmt, str};
use bytes::Bytes;
use crate::der::{Decoder, DecodeError, Primitive, PrimitiveContent, Tag};


//------------ StringEncoding ------------------------------------------------

/// The encoding of a character string.
///
/// Only the three string types used in certificates and certification
/// requests are supported.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StringEncoding {
    /// PrintableString, a restricted subset of ASCII.
    Printable,

    /// UTF8String.
    Utf8,

    /// IA5String, i.e., ASCII.
    Ia5,
}

impl StringEncoding {
    /// Returns the encoding for a tag if it is one of the supported.
    pub fn from_tag(tag: Tag) -> Option<Self> {
        match tag {
            Tag::PRINTABLE_STRING => Some(StringEncoding::Printable),
            Tag::UTF8_STRING => Some(StringEncoding::Utf8),
            Tag::IA5_STRING => Some(StringEncoding::Ia5),
            _ => None
        }
    }

    /// Returns the tag used for this encoding.
    pub fn tag(self) -> Tag {
        match self {
            StringEncoding::Printable => Tag::PRINTABLE_STRING,
            StringEncoding::Utf8 => Tag::UTF8_STRING,
            StringEncoding::Ia5 => Tag::IA5_STRING,
        }
    }

    /// Checks whether `value` can be expressed in this encoding.
    pub fn check(self, value: &[u8]) -> bool {
        match self {
            StringEncoding::Printable => {
                value.iter().all(|&ch| is_printable(ch))
            }
            StringEncoding::Utf8 => str::from_utf8(value).is_ok(),
            StringEncoding::Ia5 => value.is_ascii(),
        }
    }
}

/// Returns whether a character is allowed in a PrintableString.
fn is_printable(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || matches!(
        ch,
        b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/'
        | b':' | b'=' | b'?'
    )
}


//------------ AsnString -----------------------------------------------------

/// A character string together with its encoding.
///
/// When decoded, the encoding is the one indicated by the tag of the value
/// and it is kept so that encoding the string again produces the same
/// tag. All three supported encodings are subsets of UTF-8, so the string
/// can always be accessed as a `&str`.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct AsnString {
    encoding: StringEncoding,
    content: Bytes,
}

impl AsnString {
    /// Creates a new string with the given encoding.
    ///
    /// Returns `None` if `value` cannot be expressed in `encoding`.
    pub fn new(encoding: StringEncoding, value: &str) -> Option<Self> {
        if encoding.check(value.as_bytes()) {
            Some(AsnString {
                encoding,
                content: Bytes::copy_from_slice(value.as_bytes()),
            })
        }
        else {
            None
        }
    }

    /// Creates a new UTF8String.
    pub fn utf8(value: &str) -> Self {
        AsnString {
            encoding: StringEncoding::Utf8,
            content: Bytes::copy_from_slice(value.as_bytes()),
        }
    }

    /// Creates a new string preferring the given encoding.
    ///
    /// Falls back to UTF8String if `value` doesn’t fit the encoding.
    pub fn preferring(encoding: StringEncoding, value: &str) -> Self {
        Self::new(encoding, value).unwrap_or_else(|| Self::utf8(value))
    }

    /// Takes a string value of any supported encoding.
    ///
    /// Unknown string tags result in an unsupported error.
    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        cons.take_value(|tag, cons| {
            let encoding = match StringEncoding::from_tag(tag) {
                Some(encoding) => encoding,
                None => return Err(cons.unsupported("unsupported string type"))
            };
            let content = cons.take_rest();
            if !encoding.check(content.as_ref()) {
                return Err(cons.malformed("invalid string content"))
            }
            Ok(AsnString { encoding, content })
        })
    }

    /// Returns the encoding of the string.
    pub fn encoding(&self) -> StringEncoding {
        self.encoding
    }

    /// Returns the string.
    pub fn as_str(&self) -> &str {
        // All encodings are checked to be valid UTF-8 upon creation.
        str::from_utf8(self.content.as_ref()).unwrap_or_default()
    }

    /// Returns the raw content octets.
    pub fn as_slice(&self) -> &[u8] {
        self.content.as_ref()
    }

    /// Returns a value encoder using the string’s encoding.
    pub fn encode_ref(&self) -> Primitive<&Self> {
        self.encode_ref_as(self.encoding.tag())
    }
}


//--- PrimitiveContent

impl PrimitiveContent for AsnString {
    const TAG: Tag = Tag::UTF8_STRING;

    fn encoded_len(&self) -> usize {
        self.content.len()
    }

    fn write_encoded(&self, target: &mut Vec<u8>) {
        target.extend_from_slice(self.content.as_ref())
    }
}


//--- Display and Debug

impl fmt::Display for AsnString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for AsnString {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AsnString({:?}, {:?})", self.encoding, self.as_str())
    }
}


//============ Tests =========================================================
