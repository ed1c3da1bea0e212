//! The identifier octet of a DER value.

use std::fmt;


//------------ Tag -----------------------------------------------------------

/// The tag of a DER encoded value.
///
/// Only the low-tag-number form is supported, i.e., a tag is always
/// exactly one octet. That octet carries the class in its two most
/// significant bits, the constructed flag in bit 5 and the tag number in
/// the remaining five bits. Tag numbers of 31 and above would need the
/// high-tag-number form and are rejected when decoding.
///
/// The associated constants cover all the tags needed for certificates
/// and certification requests. Context specific tags are provided both
/// in their constructed (`CTX_n`) and primitive (`CTX_PRIM_n`) form.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Tag(u8);

impl Tag {
    /// The mask for the class bits.
    const CLASS_MASK: u8 = 0xC0;

    /// The bit marking a constructed value.
    const CONSTRUCTED: u8 = 0x20;

    /// The mask for the tag number.
    const NUMBER_MASK: u8 = 0x1F;

    const UNIVERSAL: u8 = 0x00;
    const CONTEXT_SPECIFIC: u8 = 0x80;

    pub const BOOLEAN: Self = Tag(0x01);
    pub const INTEGER: Self = Tag(0x02);
    pub const BIT_STRING: Self = Tag(0x03);
    pub const OCTET_STRING: Self = Tag(0x04);
    pub const NULL: Self = Tag(0x05);
    pub const OID: Self = Tag(0x06);
    pub const UTF8_STRING: Self = Tag(0x0C);
    pub const PRINTABLE_STRING: Self = Tag(0x13);
    pub const IA5_STRING: Self = Tag(0x16);
    pub const UTC_TIME: Self = Tag(0x17);
    pub const GENERALIZED_TIME: Self = Tag(0x18);
    pub const SEQUENCE: Self = Tag(0x30);
    pub const SET: Self = Tag(0x31);

    pub const CTX_0: Self = Tag(0xA0);
    pub const CTX_1: Self = Tag(0xA1);
    pub const CTX_2: Self = Tag(0xA2);
    pub const CTX_3: Self = Tag(0xA3);

    pub const CTX_PRIM_0: Self = Tag(0x80);
    pub const CTX_PRIM_1: Self = Tag(0x81);
    pub const CTX_PRIM_2: Self = Tag(0x82);

    /// Creates a tag from its identifier octet.
    ///
    /// Returns `None` if the octet would start a high-tag-number form.
    pub fn from_octet(octet: u8) -> Option<Self> {
        if octet & Self::NUMBER_MASK == Self::NUMBER_MASK {
            None
        }
        else {
            Some(Tag(octet))
        }
    }

    /// Returns the identifier octet.
    pub fn to_octet(self) -> u8 {
        self.0
    }

    /// Returns the tag number.
    pub fn number(self) -> u8 {
        self.0 & Self::NUMBER_MASK
    }

    /// Returns whether the tag marks a constructed value.
    pub fn is_constructed(self) -> bool {
        self.0 & Self::CONSTRUCTED != 0
    }

    /// Returns whether the tag is of the universal class.
    pub fn is_universal(self) -> bool {
        self.0 & Self::CLASS_MASK == Self::UNIVERSAL
    }

    /// Returns whether the tag is of the context specific class.
    pub fn is_context_specific(self) -> bool {
        self.0 & Self::CLASS_MASK == Self::CONTEXT_SPECIFIC
    }

    /// Returns the primitive context specific tag with the given number.
    ///
    /// # Panics
    ///
    /// The function panics if `number` is 31 or larger.
    pub const fn ctx(number: u8) -> Self {
        assert!(number < 31);
        Tag(Self::CONTEXT_SPECIFIC | number)
    }

    /// Returns the constructed version of this tag.
    pub fn constructed(self) -> Self {
        Tag(self.0 | Self::CONSTRUCTED)
    }
}


//--- Display and Debug

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tag::BOOLEAN => f.write_str("BOOLEAN"),
            Tag::INTEGER => f.write_str("INTEGER"),
            Tag::BIT_STRING => f.write_str("BIT STRING"),
            Tag::OCTET_STRING => f.write_str("OCTET STRING"),
            Tag::NULL => f.write_str("NULL"),
            Tag::OID => f.write_str("OBJECT IDENTIFIER"),
            Tag::UTF8_STRING => f.write_str("UTF8String"),
            Tag::PRINTABLE_STRING => f.write_str("PrintableString"),
            Tag::IA5_STRING => f.write_str("IA5String"),
            Tag::UTC_TIME => f.write_str("UTCTime"),
            Tag::GENERALIZED_TIME => f.write_str("GeneralizedTime"),
            Tag::SEQUENCE => f.write_str("SEQUENCE"),
            Tag::SET => f.write_str("SET"),
            tag if tag.is_context_specific() => {
                write!(f, "[{}]", tag.number())
            }
            tag => write!(f, "tag 0x{:02x}", tag.0)
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag(0x{:02x})", self.0)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn high_tag_number_form() {
        assert_eq!(Tag::from_octet(0x1F), None);
        assert_eq!(Tag::from_octet(0xBF), None);
        assert_eq!(Tag::from_octet(0x30), Some(Tag::SEQUENCE));
    }

    #[test]
    fn flags() {
        assert!(Tag::SEQUENCE.is_constructed());
        assert!(Tag::SEQUENCE.is_universal());
        assert!(!Tag::INTEGER.is_constructed());
        assert!(Tag::CTX_3.is_context_specific());
        assert!(Tag::CTX_3.is_constructed());
        assert_eq!(Tag::CTX_3.number(), 3);
        assert_eq!(Tag::ctx(1), Tag::CTX_PRIM_1);
        assert_eq!(Tag::ctx(0).constructed(), Tag::CTX_0);
    }
}
