//! Object identifiers.

use std::{error, fmt, hash};
use std::convert::TryFrom;
use std::str::FromStr;
use bytes::Bytes;
use crate::der::{Decoder, DecodeError, PrimitiveContent, Tag};


//------------ Oid -----------------------------------------------------------

/// An object identifier.
///
/// Object identifiers are globally unique, hierarchical values that are
/// used to identify objects or their type. When written, they are
/// represented as a sequence of non-negative integers separated by dots,
/// e.g., `2.5.4.3` for the common name attribute type.
///
/// The type keeps the identifier in its encoded form, i.e., the content
/// octets of an OBJECT IDENTIFIER value. The first two arcs are combined
/// into a single sub-identifier `40 * arc0 + arc1`. Each sub-identifier is
/// then written in base 128, most significant group first, with the top
/// bit set on all but the last octet.
///
/// The octets are generic over `T` so that constants can be kept in
/// static slices. The alias [`ConstOid`] is used for those. Values decoded
/// from data use the default `Bytes`.
#[derive(Clone, Copy)]
pub struct Oid<T: AsRef<[u8]> = Bytes>(pub T);

/// A type alias for `Oid<&'static [u8]>`.
///
/// This is useful for defining object identifier constants.
pub type ConstOid = Oid<&'static [u8]>;

impl Oid<Bytes> {
    /// Creates an object identifier from its arcs.
    pub fn from_arcs(arcs: &[u32]) -> Result<Self, InvalidOid> {
        if arcs.len() < 2 || arcs[0] > 2 || (arcs[0] < 2 && arcs[1] >= 40) {
            return Err(InvalidOid)
        }
        let first = u64::from(arcs[0]) * 40 + u64::from(arcs[1]);
        let mut res = Vec::new();
        push_subidentifier(first, &mut res);
        for arc in &arcs[2..] {
            push_subidentifier(u64::from(*arc), &mut res);
        }
        Ok(Oid(res.into()))
    }

    /// Takes an object identifier from the beginning of the decoder.
    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        cons.take_value_if(Tag::OID, Self::from_content)
    }

    /// Takes an optional object identifier.
    pub fn take_opt_from(
        cons: &mut Decoder
    ) -> Result<Option<Self>, DecodeError> {
        cons.take_opt_value_if(Tag::OID, Self::from_content)
    }

    fn from_content(cons: &mut Decoder) -> Result<Self, DecodeError> {
        let content = cons.take_rest();
        if let Err(msg) = check_content(content.as_ref()) {
            return Err(cons.malformed(msg))
        }
        Ok(Oid(content))
    }
}

impl<T: AsRef<[u8]>> Oid<T> {
    /// Skips over an object identifier that must have the given value.
    pub fn skip_if(&self, cons: &mut Decoder) -> Result<(), DecodeError> {
        let oid = Oid::take_from(cons)?;
        if oid != *self {
            return Err(cons.malformed("unexpected object identifier"))
        }
        Ok(())
    }

    /// Returns the encoded content octets.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns an owned version of the identifier.
    pub fn to_owned(&self) -> Oid<Bytes> {
        Oid(Bytes::copy_from_slice(self.0.as_ref()))
    }

    /// Returns an iterator over the arcs of the identifier.
    ///
    /// Arcs that don’t fit into a `u32` are returned as `None`. This can
    /// only happen for identifiers that weren’t decoded or constructed by
    /// this crate.
    pub fn arcs(&self) -> Arcs {
        Arcs { data: self.0.as_ref(), first: true, second: None }
    }
}

fn push_subidentifier(mut value: u64, target: &mut Vec<u8>) {
    let mut groups = [0u8; 10];
    let mut len = 0;
    loop {
        groups[len] = (value & 0x7F) as u8;
        len += 1;
        value >>= 7;
        if value == 0 {
            break
        }
    }
    for i in (0..len).rev() {
        if i > 0 {
            target.push(groups[i] | 0x80);
        }
        else {
            target.push(groups[i]);
        }
    }
}

/// Checks that the content octets form a valid identifier.
fn check_content(content: &[u8]) -> Result<(), &'static str> {
    if content.is_empty() {
        return Err("empty object identifier")
    }
    let mut start = true;
    let mut value = 0u64;
    let mut first = true;
    for &octet in content {
        if start && octet == 0x80 {
            return Err("non-minimal object identifier")
        }
        value = value << 7 | u64::from(octet & 0x7F);
        let limit = if first {
            80 + u64::from(u32::MAX)
        }
        else {
            u64::from(u32::MAX)
        };
        if value > limit {
            return Err("object identifier arc too large")
        }
        if octet & 0x80 == 0 {
            start = true;
            first = false;
            value = 0;
        }
        else {
            start = false;
        }
    }
    if !start {
        return Err("truncated object identifier")
    }
    Ok(())
}


//--- FromStr

impl FromStr for Oid<Bytes> {
    type Err = InvalidOid;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arcs = s.split('.').map(|arc| {
            if arc.is_empty() || arc.starts_with('+') {
                Err(InvalidOid)
            }
            else {
                u32::from_str(arc).map_err(|_| InvalidOid)
            }
        }).collect::<Result<Vec<_>, _>>()?;
        Self::from_arcs(&arcs)
    }
}


//--- PartialEq, Eq, and Hash

impl<T: AsRef<[u8]>, U: AsRef<[u8]>> PartialEq<Oid<U>> for Oid<T> {
    fn eq(&self, other: &Oid<U>) -> bool {
        self.0.as_ref() == other.0.as_ref()
    }
}

impl<T: AsRef<[u8]>> Eq for Oid<T> { }

impl<T: AsRef<[u8]>> hash::Hash for Oid<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.as_ref().hash(state)
    }
}


//--- PrimitiveContent

impl<T: AsRef<[u8]>> PrimitiveContent for Oid<T> {
    const TAG: Tag = Tag::OID;

    fn encoded_len(&self) -> usize {
        self.0.as_ref().len()
    }

    fn write_encoded(&self, target: &mut Vec<u8>) {
        target.extend_from_slice(self.0.as_ref())
    }
}


//--- Display and Debug

impl<T: AsRef<[u8]>> fmt::Display for Oid<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, arc) in self.arcs().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match arc {
                Some(arc) => write!(f, "{}", arc)?,
                None => f.write_str("?")?,
            }
        }
        Ok(())
    }
}

impl<T: AsRef<[u8]>> fmt::Debug for Oid<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl<T: AsRef<[u8]>> serde::Serialize for Oid<T> {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Oid<Bytes> {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        use serde::de;

        let s = String::deserialize(deserializer)?;
        Oid::from_str(&s).map_err(de::Error::custom)
    }
}


//------------ Arcs ----------------------------------------------------------

/// An iterator over the arcs of an object identifier.
#[derive(Clone, Debug)]
pub struct Arcs<'a> {
    data: &'a [u8],
    first: bool,
    second: Option<Option<u32>>,
}

impl<'a> Arcs<'a> {
    fn next_subidentifier(&mut self) -> Option<u64> {
        if self.data.is_empty() {
            return None
        }
        let mut res = 0u64;
        while let Some((&octet, tail)) = self.data.split_first() {
            self.data = tail;
            if res > u64::MAX >> 7 {
                return None
            }
            res = res << 7 | u64::from(octet & 0x7F);
            if octet & 0x80 == 0 {
                break
            }
        }
        Some(res)
    }
}

impl<'a> Iterator for Arcs<'a> {
    type Item = Option<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(second) = self.second.take() {
            return Some(second)
        }
        let value = self.next_subidentifier()?;
        if self.first {
            self.first = false;
            let (arc0, arc1) = if value < 40 {
                (0, value)
            }
            else if value < 80 {
                (1, value - 40)
            }
            else {
                (2, value - 80)
            };
            self.second = Some(u32::try_from(arc1).ok());
            Some(Some(arc0))
        }
        else {
            Some(u32::try_from(value).ok())
        }
    }
}


//------------ InvalidOid ----------------------------------------------------

/// A textual or numerical object identifier was invalid.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InvalidOid;

impl fmt::Display for InvalidOid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid object identifier")
    }
}

impl error::Error for InvalidOid { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::der::{DecodeErrorKind, Values};

    fn decode(data: &'static [u8]) -> Result<Oid, DecodeError> {
        Decoder::decode(data, Oid::take_from)
    }

    #[test]
    fn common_name() {
        let oid = Oid::from_arcs(&[2, 5, 4, 3]).unwrap();
        assert_eq!(oid.encode_ref().to_vec().unwrap(), b"\x06\x03\x55\x04\x03");
        assert_eq!(decode(b"\x06\x03\x55\x04\x03").unwrap(), oid);
        assert_eq!(oid.to_string(), "2.5.4.3");
    }

    #[test]
    fn multi_octet_arcs() {
        let oid = Oid::from_str("1.2.840.113549.1.1.11").unwrap();
        assert_eq!(
            oid.as_slice(),
            b"\x2A\x86\x48\x86\xF7\x0D\x01\x01\x0B"
        );
        assert_eq!(
            oid.arcs().collect::<Vec<_>>(),
            [1, 2, 840, 113549, 1, 1, 11].iter().map(|x| Some(*x))
                .collect::<Vec<_>>()
        );
        let big = Oid::from_arcs(&[2, 999, u32::MAX]).unwrap();
        assert_eq!(big.to_string(), format!("2.999.{}", u32::MAX));
    }

    #[test]
    fn invalid_content() {
        for data in &[
            &b"\x06\x00"[..],
            &b"\x06\x02\x55\x84"[..],
            &b"\x06\x03\x55\x80\x03"[..],
            &b"\x06\x07\x55\x90\x80\x80\x80\x80\x03"[..],
        ] {
            let err = Decoder::decode(*data, Oid::take_from).unwrap_err();
            assert_eq!(err.kind(), DecodeErrorKind::Malformed);
        }
    }

    #[test]
    fn invalid_text() {
        assert!(Oid::from_str("").is_err());
        assert!(Oid::from_str("2").is_err());
        assert!(Oid::from_str("3.1").is_err());
        assert!(Oid::from_str("1.40").is_err());
        assert!(Oid::from_str("1..2").is_err());
        assert!(Oid::from_str("1.2.x").is_err());
    }

    #[test]
    fn const_oid_equality() {
        const CN: ConstOid = Oid(&[85, 4, 3]);
        assert_eq!(decode(b"\x06\x03\x55\x04\x03").unwrap(), CN);
        assert_eq!(CN.to_string(), "2.5.4.3");
        assert!(
            Decoder::decode(&b"\x06\x03\x55\x04\x03"[..], |cons| {
                CN.skip_if(cons)
            }).is_ok()
        );
    }

    #[test]
    #[cfg(feature = "serde")]
    fn serde_dotted_string() {
        use serde_test::{assert_de_tokens_error, assert_tokens, Token};

        assert_tokens(
            &Oid::from_arcs(&[2, 5, 4, 3]).unwrap(), &[Token::Str("2.5.4.3")]
        );
        assert_tokens(
            &Oid::from_arcs(&[1, 2, 840, 113549, 1, 9, 14]).unwrap(),
            &[Token::Str("1.2.840.113549.1.9.14")]
        );
        assert_de_tokens_error::<Oid>(
            &[Token::Str("2.5.4.")], "invalid object identifier"
        );
    }
}
