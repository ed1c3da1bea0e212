//! Distinguished names.

use std::fmt;
use bytes::Bytes;
use log::debug;
use crate::asn1::{AsnString, ConstOid, Oid, StringEncoding};
use crate::der::{
    self, Captured, Choice2, Decoder, DecodeError, EncodeError,
    PrimitiveContent, Values,
};
use crate::oid;
#[cfg(feature = "serde")] use crate::util::base64;


//------------ NameAttribute -------------------------------------------------

/// The attribute types of a name understood by this crate.
///
/// The order of the variants is the order in which attributes appear in
/// names encoded by this crate.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum NameAttribute {
    Country,
    StateOrProvince,
    Locality,
    Organization,
    OrganizationalUnit,
    CommonName,
    EmailAddress,
}

impl NameAttribute {
    /// All attributes in encoding order.
    pub const ALL: [NameAttribute; 7] = [
        NameAttribute::Country,
        NameAttribute::StateOrProvince,
        NameAttribute::Locality,
        NameAttribute::Organization,
        NameAttribute::OrganizationalUnit,
        NameAttribute::CommonName,
        NameAttribute::EmailAddress,
    ];

    /// Returns the attribute type’s object identifier.
    pub fn oid(self) -> ConstOid {
        match self {
            NameAttribute::Country => oid::AT_COUNTRY_NAME,
            NameAttribute::StateOrProvince => oid::AT_STATE_OR_PROVINCE_NAME,
            NameAttribute::Locality => oid::AT_LOCALITY_NAME,
            NameAttribute::Organization => oid::AT_ORGANIZATION_NAME,
            NameAttribute::OrganizationalUnit => {
                oid::AT_ORGANIZATIONAL_UNIT_NAME
            }
            NameAttribute::CommonName => oid::AT_COMMON_NAME,
            NameAttribute::EmailAddress => oid::EMAIL_ADDRESS,
        }
    }

    /// Returns the attribute for an object identifier.
    pub fn from_oid<T: AsRef<[u8]>>(oid: &Oid<T>) -> Option<Self> {
        Self::ALL.iter().copied().find(|attr| *oid == attr.oid())
    }

    /// Returns the string encoding used for new values.
    pub fn default_encoding(self) -> StringEncoding {
        match self {
            NameAttribute::Country => StringEncoding::Printable,
            NameAttribute::EmailAddress => StringEncoding::Ia5,
            _ => StringEncoding::Utf8,
        }
    }

    /// Returns the short label used when displaying names.
    pub fn label(self) -> &'static str {
        match self {
            NameAttribute::Country => "C",
            NameAttribute::StateOrProvince => "ST",
            NameAttribute::Locality => "L",
            NameAttribute::Organization => "O",
            NameAttribute::OrganizationalUnit => "OU",
            NameAttribute::CommonName => "CN",
            NameAttribute::EmailAddress => "emailAddress",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}


//------------ Name ----------------------------------------------------------

/// A distinguished name.
///
/// ```txt
/// Name ::= RDNSequence
/// RDNSequence ::= SEQUENCE OF RelativeDistinguishedName
/// RelativeDistinguishedName ::= SET SIZE (1..MAX) OF AttributeTypeAndValue
/// AttributeTypeAndValue ::= SEQUENCE {
///     type     AttributeType,
///     value    AttributeValue }
/// ```
///
/// The name only models the attributes listed in [`NameAttribute`]. Other
/// attributes are skipped when decoding. If an attribute appears more than
/// once, the first value is used.
///
/// A decoded name keeps its original encoding and uses it when encoded
/// again, so other attributes and the original order survive. Changing
/// any attribute drops the original encoding. Freshly encoded names
/// contain one relative distinguished name per attribute.
///
/// Two names are equal if their encodings are equal.
#[derive(Clone, Debug, Default)]
pub struct Name {
    /// The attribute values indexed by `NameAttribute::index`.
    values: [Option<AsnString>; 7],

    /// The original encoding if the name was decoded.
    raw: Option<Captured>,
}

impl Name {
    /// Creates a new, empty name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a name with only a common name.
    pub fn from_common_name(cn: &str) -> Self {
        let mut res = Self::new();
        res.set(NameAttribute::CommonName, cn);
        res
    }

    /// Returns the value of an attribute.
    pub fn get(&self, attr: NameAttribute) -> Option<&AsnString> {
        self.values[attr.index()].as_ref()
    }

    /// Returns the common name as a string.
    pub fn common_name(&self) -> Option<&str> {
        self.get(NameAttribute::CommonName).map(AsnString::as_str)
    }

    /// Sets an attribute using the attribute’s default encoding.
    ///
    /// If the value cannot be expressed in the default encoding,
    /// UTF8String is used instead.
    pub fn set(&mut self, attr: NameAttribute, value: &str) {
        self.set_string(
            attr, AsnString::preferring(attr.default_encoding(), value)
        )
    }

    /// Sets an attribute to a string with a specific encoding.
    pub fn set_string(&mut self, attr: NameAttribute, value: AsnString) {
        self.values[attr.index()] = Some(value);
        self.raw = None;
    }

    /// Removes an attribute.
    pub fn clear(&mut self, attr: NameAttribute) {
        self.values[attr.index()] = None;
        self.raw = None;
    }

    /// Returns whether the name still has its original encoding.
    pub fn is_original(&self) -> bool {
        self.raw.is_some()
    }

    /// Returns an iterator over the present attributes in encoding order.
    pub fn iter(&self) -> impl Iterator<Item = (NameAttribute, &AsnString)> {
        let all: &'static [NameAttribute] = &NameAttribute::ALL;
        all.iter().filter_map(move |attr| {
            self.get(*attr).map(|value| (*attr, value))
        })
    }
}

/// # Decoding and Encoding
impl Name {
    pub fn decode(source: impl Into<Bytes>) -> Result<Self, DecodeError> {
        Decoder::decode(source, Self::take_from)
    }

    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        let mut values: [Option<AsnString>; 7] = Default::default();
        let ((), raw) = cons.capture(|cons| {
            cons.take_sequence(|cons| { // RDNSequence
                while let Some(()) = cons.take_opt_set(|cons| {
                    let mut empty_set = true;
                    while let Some(()) = cons.take_opt_sequence(|cons| {
                        empty_set = false;
                        Self::take_attribute(cons, &mut values)
                    })? { }
                    if empty_set {
                        return Err(cons.malformed(
                            "empty relative distinguished name"
                        ))
                    }
                    Ok(())
                })? { }
                Ok(())
            })
        })?;
        Ok(Name { values, raw: Some(raw) })
    }

    fn take_attribute(
        cons: &mut Decoder,
        values: &mut [Option<AsnString>; 7],
    ) -> Result<(), DecodeError> {
        let id = Oid::take_from(cons)?;
        match NameAttribute::from_oid(&id) {
            Some(attr) => {
                super::update_first(&mut values[attr.index()], || {
                    AsnString::take_from(cons).map(Some)
                })
            }
            None => {
                debug!("Skipping unknown name attribute {}.", id);
                cons.skip_one()
            }
        }
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        match self.raw {
            Some(ref raw) => Choice2::One(raw),
            None => {
                Choice2::Two(der::sequence(
                    self.iter().map(|(attr, value)| {
                        der::set(der::sequence((
                            attr.oid().encode(),
                            value.encode_ref(),
                        )))
                    }).collect::<Vec<_>>()
                ))
            }
        }
    }

    pub fn to_captured(&self) -> Result<Captured, EncodeError> {
        match self.raw {
            Some(ref raw) => Ok(raw.clone()),
            None => self.encode_ref().to_captured()
        }
    }
}


//--- PartialEq and Eq

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        match (self.to_captured(), other.to_captured()) {
            (Ok(left), Ok(right)) => left == right,
            _ => false
        }
    }
}

impl Eq for Name { }


//--- Display

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for (attr, value) in self.iter() {
            if first {
                first = false;
            }
            else {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", attr.label(), value)?;
        }
        Ok(())
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for Name {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        let captured = self.to_captured().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&base64::Serde.encode(captured.as_slice()))
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Name {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        use serde::de;

        let string = <String as serde::Deserialize>::deserialize(
            deserializer
        )?;
        let decoded = base64::Serde.decode(&string).map_err(de::Error::custom)?;
        Name::decode(Bytes::from(decoded)).map_err(de::Error::custom)
    }
}


//============ Tests =========================================================
