//! Certificate extensions.
//!
//! The extensions understood by this crate are collected in
//! [`Extensions`]. Certification requests can ask for extensions, too, and
//! use the same type.

use bytes::Bytes;
use log::debug;
use crate::asn1::{BitString, ConstOid, Oid};
use crate::crypto::KeyIdentifier;
use crate::der::{
    self, Decoder, DecodeError, PrimitiveContent, Tag, Values,
};
use crate::oid;


//------------ Extension -----------------------------------------------------

/// A single extension this crate doesn’t know anything about.
///
/// ```txt
/// Extension  ::=  SEQUENCE  {
///      extnID      OBJECT IDENTIFIER,
///      critical    BOOLEAN DEFAULT FALSE,
///      extnValue   OCTET STRING }
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Extension {
    id: Oid,
    critical: bool,
    value: Bytes,
}

impl Extension {
    pub fn new(id: Oid, critical: bool, value: Bytes) -> Self {
        Extension { id, critical, value }
    }

    pub fn id(&self) -> &Oid {
        &self.id
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// Returns the content of the value’s octet string.
    pub fn value(&self) -> &Bytes {
        &self.value
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        der::sequence((
            self.id.encode_ref(),
            if self.critical { Some(true.encode()) } else { None },
            self.value.encode_ref(),
        ))
    }
}

/// Returns an encoder for an extension with the given content.
fn encode_extension<V: Values>(
    id: ConstOid,
    critical: bool,
    content: V,
) -> impl Values {
    der::sequence((
        id.encode(),
        if critical { Some(true.encode()) } else { None },
        // An OCTET STRING wrapping the encoded content.
        der::sequence_as(Tag::OCTET_STRING, content),
    ))
}


//------------ BasicConstraints ----------------------------------------------

/// The basic constraints extension.
///
/// ```txt
/// BasicConstraints ::= SEQUENCE {
///      cA                      BOOLEAN DEFAULT FALSE,
///      pathLenConstraint       INTEGER (0..MAX) OPTIONAL }
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct BasicConstraints {
    ca: bool,
    path_len: Option<u64>,
}

impl BasicConstraints {
    pub fn new(ca: bool, path_len: Option<u64>) -> Self {
        BasicConstraints { ca, path_len }
    }

    /// Returns whether the subject is a certification authority.
    pub fn ca(self) -> bool {
        self.ca
    }

    /// Returns the maximum number of intermediates below the subject.
    pub fn path_len(self) -> Option<u64> {
        self.path_len
    }

    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        cons.take_sequence(|cons| {
            Ok(BasicConstraints {
                ca: take_default_false(cons)?,
                path_len: cons.take_opt_u64()?,
            })
        })
    }

    pub fn encode(self) -> impl Values {
        der::sequence((
            if self.ca { Some(true.encode()) } else { None },
            self.path_len.map(|len| len.encode()),
        ))
    }
}


//------------ KeyUsage ------------------------------------------------------

/// The key usage extension.
///
/// ```txt
/// KeyUsage ::= BIT STRING {
///      digitalSignature        (0),
///      nonRepudiation          (1),
///      keyEncipherment         (2),
///      dataEncipherment        (3),
///      keyAgreement            (4),
///      keyCertSign             (5),
///      cRLSign                 (6),
///      encipherOnly            (7),
///      decipherOnly            (8) }
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct KeyUsage {
    pub digital_signature: bool,
    pub non_repudiation: bool,
    pub key_encipherment: bool,
    pub data_encipherment: bool,
    pub key_agreement: bool,
    pub key_cert_sign: bool,
    pub crl_sign: bool,
    pub encipher_only: bool,
    pub decipher_only: bool,
}

impl KeyUsage {
    /// The usage of a certification authority’s key.
    pub fn ca() -> Self {
        KeyUsage {
            key_cert_sign: true, crl_sign: true, ..Default::default()
        }
    }

    /// The usual usage of a TLS end entity’s RSA key.
    pub fn tls() -> Self {
        KeyUsage {
            digital_signature: true, key_encipherment: true,
            ..Default::default()
        }
    }

    fn flags(self) -> [bool; 9] {
        [
            self.digital_signature, self.non_repudiation,
            self.key_encipherment, self.data_encipherment,
            self.key_agreement, self.key_cert_sign, self.crl_sign,
            self.encipher_only, self.decipher_only,
        ]
    }

    fn from_flags(flags: [bool; 9]) -> Self {
        KeyUsage {
            digital_signature: flags[0],
            non_repudiation: flags[1],
            key_encipherment: flags[2],
            data_encipherment: flags[3],
            key_agreement: flags[4],
            key_cert_sign: flags[5],
            crl_sign: flags[6],
            encipher_only: flags[7],
            decipher_only: flags[8],
        }
    }

    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        let bits = BitString::take_from(cons)?;
        let mut flags = [false; 9];
        for (i, flag) in flags.iter_mut().enumerate() {
            *flag = bits.bit(i);
        }
        Ok(Self::from_flags(flags))
    }

    /// Returns the key usage as a bit string.
    ///
    /// As required for named bit lists in DER, trailing zero bits are
    /// removed.
    pub fn to_bit_string(self) -> BitString {
        let flags = self.flags();
        let len = match flags.iter().rposition(|flag| *flag) {
            Some(pos) => pos + 1,
            None => return BitString::from_octets(Bytes::new())
        };
        let mut octets = vec![0u8; (len + 7) / 8];
        for (i, flag) in flags[..len].iter().enumerate() {
            if *flag {
                octets[i / 8] |= 0x80 >> (i % 8);
            }
        }
        // len is at least one, so the result is in 0..8.
        let unused = (octets.len() * 8 - len) as u8;
        BitString::new(unused, octets.into())
    }

    pub fn encode(self) -> impl Values {
        self.to_bit_string().encode()
    }
}


//------------ ExtendedKeyUsage ----------------------------------------------

/// The extended key usage extension.
///
/// ```txt
/// ExtKeyUsageSyntax ::= SEQUENCE SIZE (1..MAX) OF KeyPurposeId
/// KeyPurposeId ::= OBJECT IDENTIFIER
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExtendedKeyUsage(Vec<Oid>);

impl ExtendedKeyUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, purpose: Oid) {
        self.0.push(purpose)
    }

    pub fn contains<T: AsRef<[u8]>>(&self, purpose: &Oid<T>) -> bool {
        self.0.iter().any(|item| item == purpose)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Oid> {
        self.0.iter()
    }

    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        cons.take_sequence(|cons| {
            let mut res = Vec::new();
            while let Some(purpose) = Oid::take_opt_from(cons)? {
                res.push(purpose)
            }
            if res.is_empty() {
                return Err(cons.malformed("empty extended key usage"))
            }
            Ok(ExtendedKeyUsage(res))
        })
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        der::sequence(
            self.0.iter().map(|purpose| purpose.encode_ref())
                .collect::<Vec<_>>()
        )
    }
}

impl<'a> From<&'a [ConstOid]> for ExtendedKeyUsage {
    fn from(purposes: &'a [ConstOid]) -> Self {
        ExtendedKeyUsage(purposes.iter().map(ConstOid::to_owned).collect())
    }
}


//------------ Extensions ----------------------------------------------------

/// The extensions of a certificate or requested in a certification request.
///
/// ```txt
/// Extensions  ::=  SEQUENCE SIZE (1..MAX) OF Extension
/// ```
///
/// Unknown critical extensions are rejected when decoding. Unknown
/// non-critical extensions are kept as they are and available via
/// [`other`][Self::other]. Each known extension may only appear once.
///
/// When encoding, basic constraints and key usage are marked as critical,
/// all other known extensions aren’t.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Extensions {
    basic_constraints: Option<BasicConstraints>,
    key_usage: Option<KeyUsage>,
    extended_key_usage: Option<ExtendedKeyUsage>,
    subject_key_identifier: Option<KeyIdentifier>,
    authority_key_identifier: Option<KeyIdentifier>,
    other: Vec<Extension>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn basic_constraints(&self) -> Option<BasicConstraints> {
        self.basic_constraints
    }

    pub fn set_basic_constraints(&mut self, value: Option<BasicConstraints>) {
        self.basic_constraints = value
    }

    /// Returns whether the basic constraints allow the key to be a CA.
    pub fn is_ca(&self) -> bool {
        self.basic_constraints.map(BasicConstraints::ca).unwrap_or(false)
    }

    pub fn key_usage(&self) -> Option<KeyUsage> {
        self.key_usage
    }

    pub fn set_key_usage(&mut self, value: Option<KeyUsage>) {
        self.key_usage = value
    }

    pub fn extended_key_usage(&self) -> Option<&ExtendedKeyUsage> {
        self.extended_key_usage.as_ref()
    }

    pub fn set_extended_key_usage(
        &mut self, value: Option<ExtendedKeyUsage>
    ) {
        self.extended_key_usage = value
    }

    pub fn subject_key_identifier(&self) -> Option<&KeyIdentifier> {
        self.subject_key_identifier.as_ref()
    }

    pub fn set_subject_key_identifier(
        &mut self, value: Option<KeyIdentifier>
    ) {
        self.subject_key_identifier = value
    }

    pub fn authority_key_identifier(&self) -> Option<&KeyIdentifier> {
        self.authority_key_identifier.as_ref()
    }

    pub fn set_authority_key_identifier(
        &mut self, value: Option<KeyIdentifier>
    ) {
        self.authority_key_identifier = value
    }

    /// Returns the unknown non-critical extensions.
    pub fn other(&self) -> &[Extension] {
        &self.other
    }

    pub fn push_other(&mut self, ext: Extension) {
        self.other.push(ext)
    }

    pub fn is_empty(&self) -> bool {
        self.basic_constraints.is_none()
            && self.key_usage.is_none()
            && self.extended_key_usage.is_none()
            && self.subject_key_identifier.is_none()
            && self.authority_key_identifier.is_none()
            && self.other.is_empty()
    }
}

/// # Decoding and Encoding
impl Extensions {
    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        cons.take_sequence(Self::from_constructed)
    }

    /// Parses the content of the extensions sequence.
    ///
    /// The sequence must contain at least one extension.
    pub fn from_constructed(cons: &mut Decoder) -> Result<Self, DecodeError> {
        if cons.is_empty() {
            return Err(cons.malformed("empty extensions"))
        }
        let mut res = Extensions::default();
        while let Some(()) = cons.take_opt_sequence(|cons| {
            res.take_extension(cons)
        })? { }
        Ok(res)
    }

    fn take_extension(
        &mut self, cons: &mut Decoder
    ) -> Result<(), DecodeError> {
        let id = Oid::take_from(cons)?;
        let critical = take_default_false(cons)?;
        cons.take_value_if(Tag::OCTET_STRING, |cons| {
            if id == oid::CE_BASIC_CONSTRAINTS {
                take_once(
                    cons, &mut self.basic_constraints,
                    BasicConstraints::take_from
                )
            }
            else if id == oid::CE_KEY_USAGE {
                take_once(cons, &mut self.key_usage, KeyUsage::take_from)
            }
            else if id == oid::CE_EXTENDED_KEY_USAGE {
                take_once(
                    cons, &mut self.extended_key_usage,
                    ExtendedKeyUsage::take_from
                )
            }
            else if id == oid::CE_SUBJECT_KEY_IDENTIFIER {
                take_once(
                    cons, &mut self.subject_key_identifier,
                    KeyIdentifier::take_from
                )
            }
            else if id == oid::CE_AUTHORITY_KEY_IDENTIFIER {
                if self.authority_key_identifier.is_some()
                    || self.other.iter().any(|ext| ext.id == id)
                {
                    return Err(cons.malformed("duplicate extension"))
                }
                let (key_id, raw) = cons.capture(
                    take_authority_key_identifier
                )?;
                match key_id {
                    Some(key_id) => {
                        self.authority_key_identifier = Some(key_id)
                    }
                    None => {
                        debug!(
                            "Keeping authority key identifier without \
                             key identifier."
                        );
                        self.other.push(Extension {
                            id, critical, value: raw.into_bytes()
                        });
                    }
                }
                Ok(())
            }
            else if critical {
                Err(cons.unsupported("unsupported critical extension"))
            }
            else {
                debug!("Ignoring unknown extension {}.", id);
                let value = cons.take_rest();
                self.other.push(Extension { id, critical, value });
                Ok(())
            }
        })
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        der::sequence((
            self.basic_constraints.map(|value| {
                encode_extension(
                    oid::CE_BASIC_CONSTRAINTS, true, value.encode()
                )
            }),
            self.subject_key_identifier.as_ref().map(|id| {
                encode_extension(
                    oid::CE_SUBJECT_KEY_IDENTIFIER, false, id.encode_ref()
                )
            }),
            self.authority_key_identifier.as_ref().map(|id| {
                encode_extension(
                    oid::CE_AUTHORITY_KEY_IDENTIFIER, false,
                    der::sequence(id.encode_ref_as(Tag::CTX_PRIM_0))
                )
            }),
            self.key_usage.map(|value| {
                encode_extension(oid::CE_KEY_USAGE, true, value.encode())
            }),
            self.extended_key_usage.as_ref().map(|value| {
                encode_extension(
                    oid::CE_EXTENDED_KEY_USAGE, false, value.encode_ref()
                )
            }),
            self.other.iter().map(Extension::encode_ref).collect::<Vec<_>>(),
        ))
    }
}

/// Takes an optional boolean with a default value of false.
///
/// DER forbids encoding the default, so an explicit false is malformed.
fn take_default_false(cons: &mut Decoder) -> Result<bool, DecodeError> {
    match cons.take_opt_bool()? {
        Some(true) => Ok(true),
        Some(false) => Err(cons.malformed("explicitly encoded default")),
        None => Ok(false),
    }
}

/// Takes the value of a known extension unless there already is one.
fn take_once<T>(
    cons: &mut Decoder,
    target: &mut Option<T>,
    op: fn(&mut Decoder) -> Result<T, DecodeError>,
) -> Result<(), DecodeError> {
    if target.is_some() {
        return Err(cons.malformed("duplicate extension"))
    }
    *target = Some(op(cons)?);
    Ok(())
}

/// Takes the key identifier of an authority key identifier extension.
///
/// ```txt
/// AuthorityKeyIdentifier ::= SEQUENCE {
///     keyIdentifier             [0] KeyIdentifier           OPTIONAL,
///     authorityCertIssuer       [1] GeneralNames            OPTIONAL,
///     authorityCertSerialNumber [2] CertificateSerialNumber OPTIONAL  }
/// ```
///
/// The extension is only used for its key identifier. Issuer and serial
/// number are skipped.
fn take_authority_key_identifier(
    cons: &mut Decoder
) -> Result<Option<KeyIdentifier>, DecodeError> {
    cons.take_sequence(|cons| {
        let res = cons.take_opt_value_if(
            Tag::CTX_PRIM_0, KeyIdentifier::from_content
        )?;
        cons.take_opt_tlv(Tag::CTX_1)?;
        cons.take_opt_tlv(Tag::CTX_PRIM_2)?;
        Ok(res)
    })
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::der::DecodeErrorKind;

    fn decode(data: Vec<u8>) -> Result<Extensions, DecodeError> {
        Decoder::decode(data, Extensions::take_from)
    }

    #[test]
    fn key_usage_bits() {
        assert_eq!(
            KeyUsage::ca().encode().to_vec().unwrap(),
            b"\x03\x02\x01\x06"
        );
        assert_eq!(
            KeyUsage::tls().encode().to_vec().unwrap(),
            b"\x03\x02\x05\xA0"
        );
        let ku = KeyUsage { decipher_only: true, ..Default::default() };
        assert_eq!(
            ku.encode().to_vec().unwrap(),
            b"\x03\x03\x07\x00\x80"
        );
        assert_eq!(
            KeyUsage::default().encode().to_vec().unwrap(),
            b"\x03\x01\x00"
        );
        for ku in &[KeyUsage::ca(), KeyUsage::tls(), ku] {
            assert_eq!(
                Decoder::decode(
                    ku.encode().to_vec().unwrap(), KeyUsage::take_from
                ).unwrap(),
                *ku
            );
        }
    }

    #[test]
    fn known_extensions() {
        let mut ext = Extensions::new();
        ext.set_basic_constraints(Some(BasicConstraints::new(true, Some(0))));
        ext.set_key_usage(Some(KeyUsage::ca()));
        ext.set_subject_key_identifier(Some(KeyIdentifier::from(&b"sk"[..])));
        ext.set_authority_key_identifier(
            Some(KeyIdentifier::from(&b"ak"[..]))
        );
        ext.set_extended_key_usage(Some(ExtendedKeyUsage::from(
            &[oid::KP_SERVER_AUTH, oid::KP_CLIENT_AUTH][..]
        )));
        let decoded = decode(ext.encode_ref().to_vec().unwrap()).unwrap();
        assert_eq!(decoded, ext);
        assert!(decoded.is_ca());
        assert_eq!(decoded.basic_constraints().unwrap().path_len(), Some(0));
        assert!(decoded.extended_key_usage().unwrap().contains(
            &oid::KP_CLIENT_AUTH
        ));
        assert!(!decoded.extended_key_usage().unwrap().contains(
            &oid::KP_CODE_SIGNING
        ));
    }

    #[test]
    fn unknown_extensions() {
        let unknown = |critical| {
            der::sequence(
                Extension::new(
                    Oid::from_arcs(&[1, 2, 3]).unwrap(),
                    critical,
                    Bytes::from_static(b"\x05\x00")
                ).encode_ref()
            ).to_vec().unwrap()
        };
        let ext = decode(unknown(false)).unwrap();
        assert!(!ext.is_ca());
        assert_eq!(ext.other().len(), 1);
        assert_eq!(ext.other()[0].value().as_ref(), b"\x05\x00");

        let err = decode(unknown(true)).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::Unsupported);
    }

    #[test]
    fn duplicate_extensions() {
        let bc = BasicConstraints::new(false, None);
        let data = der::sequence((
            encode_extension(oid::CE_BASIC_CONSTRAINTS, true, bc.encode()),
            encode_extension(oid::CE_BASIC_CONSTRAINTS, true, bc.encode()),
        )).to_vec().unwrap();
        assert_eq!(
            decode(data).unwrap_err().message(), "duplicate extension"
        );
    }

    #[test]
    fn authority_key_identifier_without_key_id() {
        // authorityCertIssuer [1] with a dNSName and serial number [2].
        let aki = Bytes::from_static(
            b"\x30\x12\xA1\x0D\x82\x0Bexample.com\x82\x01\x05"
        );
        let data = der::sequence(
            Extension::new(
                oid::CE_AUTHORITY_KEY_IDENTIFIER.to_owned(), false,
                aki.clone()
            ).encode_ref()
        ).to_vec().unwrap();
        let ext = decode(data.clone()).unwrap();
        assert!(ext.authority_key_identifier().is_none());
        assert_eq!(ext.other().len(), 1);
        assert_eq!(ext.other()[0].value(), &aki);
        assert_eq!(ext.encode_ref().to_vec().unwrap(), data);

        // A second one, with or without key identifier, is a duplicate.
        let data = der::sequence((
            Extension::new(
                oid::CE_AUTHORITY_KEY_IDENTIFIER.to_owned(), false,
                aki.clone()
            ).encode_ref(),
            encode_extension(
                oid::CE_AUTHORITY_KEY_IDENTIFIER, false,
                der::sequence(
                    KeyIdentifier::from(&b"ak"[..]).encode_as(Tag::CTX_PRIM_0)
                )
            ),
        )).to_vec().unwrap();
        assert_eq!(
            decode(data).unwrap_err().message(), "duplicate extension"
        );
    }

    #[test]
    fn strict_der() {
        assert_eq!(
            decode(b"\x30\x00".to_vec()).unwrap_err().message(),
            "empty extensions"
        );

        // critical explicitly FALSE
        let data = der::sequence(der::sequence((
            oid::CE_KEY_USAGE.encode(),
            false.encode(),
            der::sequence_as(Tag::OCTET_STRING, KeyUsage::tls().encode()),
        ))).to_vec().unwrap();
        assert_eq!(
            decode(data).unwrap_err().message(),
            "explicitly encoded default"
        );

        // cA explicitly FALSE
        assert!(Decoder::decode(
            &b"\x30\x03\x01\x01\x00"[..], BasicConstraints::take_from
        ).is_err());
        assert_eq!(
            Decoder::decode(&b"\x30\x00"[..], BasicConstraints::take_from),
            Ok(BasicConstraints::new(false, None))
        );
    }

    #[test]
    fn trailing_data_in_value() {
        let data = der::sequence(
            encode_extension(
                oid::CE_KEY_USAGE, true,
                (KeyUsage::ca().encode(), ().encode())
            )
        ).to_vec().unwrap();
        assert!(decode(data).is_err());
    }
}
