//! PKCS #10 certification requests.
//!
//! Certification requests, also called certificate signing requests or
//! CSRs, are defined in [RFC 2986]. A request carries the subject name and
//! public key the requester would like to see in a certificate, optionally
//! the extensions it asks for, and a signature made with the private key
//! to prove possession of it.
//!
//! [RFC 2986]: https://tools.ietf.org/html/rfc2986

use bytes::Bytes;
use crate::asn1::Oid;
use crate::crypto::{
    PublicKey, Signature, SignatureAlgorithm, Signer, SigningError,
    VerificationError,
};
use crate::der::{
    self, Captured, Choice2, Decoder, DecodeError, EncodeError,
    PrimitiveContent, Tag, Values,
};
use crate::oid;
#[cfg(feature = "serde")] use crate::util::base64;
use super::SignedData;
use super::ext::Extensions;
use super::name::Name;


//------------ Csr -----------------------------------------------------------

/// A certification request.
///
/// ```txt
/// CertificationRequest ::= SEQUENCE {
///      certificationRequestInfo CertificationRequestInfo,
///      signatureAlgorithm AlgorithmIdentifier,
///      signature          BIT STRING }
/// ```
#[derive(Clone, Debug)]
pub struct Csr {
    /// The outer structure of the request.
    signed_data: SignedData,

    /// The content of the request.
    info: CsrInfo,
}

/// # Data Access
///
impl Csr {
    /// Returns the content of the request.
    pub fn info(&self) -> &CsrInfo {
        &self.info
    }

    /// The subject name included in the request.
    pub fn subject(&self) -> &Name {
        &self.info.subject
    }

    /// The public key included in the request.
    pub fn public_key(&self) -> &PublicKey {
        &self.info.public_key
    }

    /// The extensions requested.
    pub fn extensions(&self) -> &Extensions {
        &self.info.extensions
    }

    pub fn signature(&self) -> &Signature {
        self.signed_data.signature()
    }
}

/// # Decode, Encode, and Validate
///
impl Csr {
    /// Decodes a source as a certification request.
    pub fn decode(source: impl Into<Bytes>) -> Result<Self, DecodeError> {
        Decoder::decode(source, Self::take_from)
    }

    /// Takes an encoded request from the beginning of a value.
    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        cons.take_sequence(Self::from_constructed)
    }

    /// Parses the content of a certification request.
    fn from_constructed(cons: &mut Decoder) -> Result<Self, DecodeError> {
        let (info, signed_data) = SignedData::from_constructed_with(
            cons, CsrInfo::take_from
        )?;
        Ok(Csr { signed_data, info })
    }

    /// Verifies the request’s signature with its own public key.
    ///
    /// The signature is checked over the request information encoded
    /// again from its parsed content.
    pub fn verify_signature(&self) -> Result<(), VerificationError> {
        let data = self.info.encode_ref().to_vec().map_err(|_| {
            VerificationError
        })?;
        self.info.public_key.verify(&data, self.signed_data.signature())
    }

    /// Returns a value encoder for a reference to the request.
    pub fn encode_ref(&self) -> impl Values + '_ {
        self.signed_data.encode_ref()
    }

    /// Returns a captured encoding of the request.
    pub fn to_captured(&self) -> Result<Captured, EncodeError> {
        self.encode_ref().to_captured()
    }
}

/// # Construct
///
impl Csr {
    /// Creates a new request signed by the given key.
    ///
    /// The public key is taken from the signer. If `extensions` is empty,
    /// no extension request attribute is included.
    pub fn construct<S: Signer>(
        signer: &S,
        key: &S::KeyId,
        subject: Name,
        extensions: Extensions,
    ) -> Result<Self, SigningError<S::Error>> {
        let info = CsrInfo::new(subject, signer.get_key_info(key)?, extensions);
        let data = info.encode_ref().to_captured().map_err(
            SigningError::Encoding
        )?;
        let signature = signer.sign(
            key, SignatureAlgorithm::default(), &data
        )?;
        Ok(Csr { signed_data: SignedData::new(data, signature), info })
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for Csr {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        let captured = self.to_captured().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&base64::Serde.encode(captured.as_slice()))
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Csr {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        use serde::de;

        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        let decoded = base64::Serde.decode(&s).map_err(de::Error::custom)?;
        Csr::decode(Bytes::from(decoded)).map_err(de::Error::custom)
    }
}


//------------ CsrInfo -------------------------------------------------------

/// The content of a certification request.
///
/// ```txt
/// CertificationRequestInfo ::= SEQUENCE {
///      version       INTEGER { v1(0) } (v1,...),
///      subject       Name,
///      subjectPKInfo SubjectPublicKeyInfo{{ PKInfoAlgorithms }},
///      attributes    [0] Attributes{{ CRIAttributes }} }
///
/// Attributes { ATTRIBUTE:IOSet } ::= SET OF Attribute{{ IOSet }}
/// Attribute { ATTRIBUTE:IOSet } ::= SEQUENCE {
///      type   ATTRIBUTE.&id({IOSet}),
///      values SET SIZE(1..MAX) OF ATTRIBUTE.&Type({IOSet}{@type}) }
/// ```
///
/// The only attribute understood is the extension request of PKCS #9. Its
/// value is a single `Extensions` sequence. All other attributes are kept
/// in their encoded form. So is the extension request attribute until the
/// extensions are changed. Attributes are encoded again in the order they
/// were decoded in.
#[derive(Clone, Debug)]
pub struct CsrInfo {
    subject: Name,
    public_key: PublicKey,
    extensions: Extensions,

    /// All attributes in their original order.
    attributes: Vec<Attribute>,
}

impl CsrInfo {
    pub fn new(
        subject: Name, public_key: PublicKey, extensions: Extensions
    ) -> Self {
        CsrInfo {
            subject, public_key, extensions,
            attributes: vec![Attribute::ExtensionRequest(None)],
        }
    }

    pub fn subject(&self) -> &Name {
        &self.subject
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Returns a mutable reference to the requested extensions.
    ///
    /// The extension request attribute will be encoded afresh at its
    /// original position or, if there wasn’t one, after all other
    /// attributes.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        let mut found = false;
        for attr in &mut self.attributes {
            if let Attribute::ExtensionRequest(ref mut raw) = *attr {
                *raw = None;
                found = true;
            }
        }
        if !found {
            self.attributes.push(Attribute::ExtensionRequest(None));
        }
        &mut self.extensions
    }

    /// Returns the encoded attributes other than the extension request.
    pub fn other_attributes(&self) -> impl Iterator<Item = &Captured> {
        self.attributes.iter().filter_map(|attr| match *attr {
            Attribute::Other(ref raw) => Some(raw),
            Attribute::ExtensionRequest(_) => None,
        })
    }

    /// Appends an encoded attribute.
    ///
    /// The attribute must not be an extension request.
    pub fn push_attribute(&mut self, attr: Captured) {
        self.attributes.push(Attribute::Other(attr))
    }

    /// Takes the request information from the beginning of a value.
    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        cons.take_sequence(|cons| {
            cons.skip_u64_if(0)?; // version MUST be 0, cause v1
            let subject = Name::take_from(cons)?;
            let public_key = PublicKey::take_from(cons)?;
            let mut res = CsrInfo {
                subject, public_key,
                extensions: Extensions::default(),
                attributes: Vec::new(),
            };
            cons.take_constructed_if(Tag::CTX_0, |cons| {
                while !cons.is_empty() {
                    res.take_attribute(cons)?;
                }
                Ok(())
            })?;
            Ok(res)
        })
    }

    fn take_attribute(
        &mut self, cons: &mut Decoder
    ) -> Result<(), DecodeError> {
        let (extensions, raw) = cons.capture(|cons| {
            cons.take_sequence(|cons| {
                let id = Oid::take_from(cons)?;
                if id == oid::EXTENSION_REQUEST {
                    cons.take_set(Extensions::take_from).map(Some)
                }
                else {
                    let mut empty = true;
                    cons.take_set(|cons| {
                        while !cons.is_empty() {
                            cons.skip_one()?;
                            empty = false;
                        }
                        Ok(())
                    })?;
                    if empty {
                        return Err(cons.malformed("empty attribute"))
                    }
                    Ok(None)
                }
            })
        })?;
        match extensions {
            Some(extensions) => {
                if self.has_extension_request() {
                    return Err(cons.malformed(
                        "duplicate extension request attribute"
                    ))
                }
                self.extensions = extensions;
                self.attributes.push(Attribute::ExtensionRequest(Some(raw)));
            }
            None => self.attributes.push(Attribute::Other(raw))
        }
        Ok(())
    }

    fn has_extension_request(&self) -> bool {
        self.attributes.iter().any(|attr| {
            matches!(*attr, Attribute::ExtensionRequest(_))
        })
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        der::sequence((
            0u8.encode(),
            self.subject.encode_ref(),
            self.public_key.encode_ref(),
            der::sequence_as(
                Tag::CTX_0,
                self.attributes.iter().map(|attr| {
                    attr.encode_ref(&self.extensions)
                }).collect::<Vec<_>>()
            ),
        ))
    }
}


//------------ Attribute -----------------------------------------------------

/// A single attribute of a request.
#[derive(Clone, Debug)]
enum Attribute {
    /// The extension request, with its original encoding if unchanged.
    ExtensionRequest(Option<Captured>),

    /// Any other attribute.
    Other(Captured),
}

impl Attribute {
    /// Returns a value encoder for the attribute.
    ///
    /// A fresh extension request is left out if there are no extensions.
    fn encode_ref<'a>(
        &'a self, extensions: &'a Extensions
    ) -> impl Values + 'a {
        match *self {
            Attribute::ExtensionRequest(Some(ref raw)) |
            Attribute::Other(ref raw) => Choice2::One(raw),
            Attribute::ExtensionRequest(None) => {
                Choice2::Two(if extensions.is_empty() {
                    None
                }
                else {
                    Some(der::sequence((
                        oid::EXTENSION_REQUEST.encode(),
                        der::set(extensions.encode_ref()),
                    )))
                })
            }
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::x509::{BasicConstraints, KeyUsage, NameAttribute};

    const CSR: &[u8] = include_bytes!("../../test-data/leaf.csr.der");
    const ATTRS_CSR: &[u8] = include_bytes!(
        "../../test-data/attrs.csr.der"
    );

    #[test]
    fn parse_and_verify() {
        let csr = Csr::decode(CSR).unwrap();
        assert_eq!(csr.subject().common_name(), Some("leaf.example.com"));
        assert_eq!(
            csr.subject().get(NameAttribute::EmailAddress).unwrap().as_str(),
            "ops@example.com"
        );
        assert!(csr.extensions().is_empty());
        assert_eq!(csr.info().other_attributes().count(), 0);
        assert_eq!(csr.public_key().key_size(), 2048);
        csr.verify_signature().unwrap();
        assert_eq!(csr.to_captured().unwrap().as_slice(), CSR);
    }

    #[test]
    fn tampered_csr() {
        let mut data = CSR.to_vec();
        // An octet inside the organization name.
        data[65] ^= 0x01;
        let csr = Csr::decode(data).unwrap();
        assert!(csr.verify_signature().is_err());
    }

    #[test]
    fn other_attributes_survive() {
        let csr = Csr::decode(CSR).unwrap();
        // challengePassword 1.2.840.113549.1.9.7
        let attr = der::sequence((
            Oid::from_arcs(&[1, 2, 840, 113549, 1, 9, 7]).unwrap().encode(),
            der::set(Bytes::from_static(b"secret").encode_as(
                Tag::UTF8_STRING
            )),
        )).to_captured().unwrap();
        let mut info = csr.info().clone();
        info.push_attribute(attr.clone());
        let data = info.encode_ref().to_vec().unwrap();
        let info = Decoder::decode(data, CsrInfo::take_from).unwrap();
        assert_eq!(info.other_attributes().collect::<Vec<_>>(), vec![&attr]);
        assert!(info.extensions().is_empty());
    }

    #[test]
    fn attribute_order_kept() {
        // Written by OpenSSL: challengePassword before extensionRequest.
        let csr = Csr::decode(ATTRS_CSR).unwrap();
        assert_eq!(csr.info().other_attributes().count(), 1);
        assert_eq!(
            csr.extensions().basic_constraints(),
            Some(BasicConstraints::new(false, None))
        );
        assert_eq!(csr.extensions().key_usage(), Some(KeyUsage::tls()));
        assert_eq!(csr.to_captured().unwrap().as_slice(), ATTRS_CSR);
        csr.verify_signature().unwrap();
    }

    #[test]
    fn changed_extensions_keep_position() {
        let csr = Csr::decode(ATTRS_CSR).unwrap();
        let mut info = csr.info().clone();
        info.extensions_mut().set_key_usage(Some(KeyUsage::ca()));
        let data = info.encode_ref().to_vec().unwrap();

        // Everything before the extension request is unchanged.
        assert_eq!(&data[4..399], &ATTRS_CSR[8..403]);
        let info = Decoder::decode(data, CsrInfo::take_from).unwrap();
        assert_eq!(info.extensions().key_usage(), Some(KeyUsage::ca()));
        assert_eq!(info.other_attributes().count(), 1);
    }

    #[test]
    fn unexpected_version() {
        let mut data = CSR.to_vec();
        assert_eq!(&data[8..11], b"\x02\x01\x00");
        data[10] = 1;
        assert!(Csr::decode(data).is_err());
    }
}

#[cfg(all(test, feature = "softkeys"))]
mod signer_test {
    use super::*;
    use crate::crypto::PublicKeyFormat;
    use crate::crypto::softsigner::OpenSslSigner;
    use crate::x509::{BasicConstraints, ExtendedKeyUsage, KeyUsage};

    #[test]
    fn build_csr() {
        let signer = OpenSslSigner::new();
        let key = signer.create_key(PublicKeyFormat::RSA).unwrap();
        let pubkey = signer.get_key_info(&key).unwrap();

        let mut extensions = Extensions::new();
        extensions.set_basic_constraints(
            Some(BasicConstraints::new(false, None))
        );
        extensions.set_key_usage(Some(KeyUsage::tls()));
        extensions.set_extended_key_usage(Some(ExtendedKeyUsage::from(
            &[oid::KP_SERVER_AUTH][..]
        )));

        let csr = Csr::construct(
            &signer, &key, Name::from_common_name("csr.example.com"),
            extensions.clone()
        ).unwrap();
        csr.verify_signature().unwrap();

        let csr = Csr::decode(csr.to_captured().unwrap().into_bytes()).unwrap();
        csr.verify_signature().unwrap();
        assert_eq!(csr.public_key(), &pubkey);
        assert_eq!(csr.extensions(), &extensions);
        assert_eq!(csr.subject().common_name(), Some("csr.example.com"));
    }

    #[test]
    fn wrong_key() {
        let signer = OpenSslSigner::new();
        let key = signer.create_key(PublicKeyFormat::RSA).unwrap();
        let csr = Csr::construct(
            &signer, &key, Name::from_common_name("csr.example.com"),
            Extensions::new()
        ).unwrap();

        // Replace the public key with an unrelated one.
        let other = signer.create_key(PublicKeyFormat::RSA).unwrap();
        let mut info = csr.info().clone();
        info.public_key = signer.get_key_info(&other).unwrap();
        let forged = Csr {
            signed_data: csr.signed_data.clone(),
            info
        };
        assert!(forged.verify_signature().is_err());
        assert!(csr.verify_signature().is_ok());
    }
}
