//! X.509 certificates.
//!
//! This module implements the certificates defined in [RFC 5280]. The
//! certificate itself is [`Cert`]. Its signed content is [`TbsCert`]
//! which is also used to create new certificates.
//!
//! [RFC 5280]: https://tools.ietf.org/html/rfc5280

use std::{borrow, error, fmt, ops};
use bytes::Bytes;
use crate::asn1::BitString;
use crate::crypto::{
    Digest, DigestAlgorithm, PublicKey, SignatureAlgorithm, Signer,
    SigningError, Signature,
};
use crate::der::{
    self, Captured, Choice2, Decoder, DecodeError, EncodeError,
    PrimitiveContent, Tag, Unsigned, Values,
};
#[cfg(feature = "serde")] use crate::util::base64;
use super::SignedData;
use super::ext::Extensions;
use super::name::Name;
use super::validity::Validity;


//------------ Cert ----------------------------------------------------------

/// An X.509 certificate.
///
/// ```txt
/// Certificate  ::=  SEQUENCE  {
///      tbsCertificate       TBSCertificate,
///      signatureAlgorithm   AlgorithmIdentifier,
///      signatureValue       BIT STRING  }
/// ```
///
/// The signature algorithm in the outer sequence has to be identical to the
/// one in the to-be-signed part.
///
/// A certificate can be decoded from its DER encoding via [`decode`] or
/// created by signing a [`TbsCert`] via [`TbsCert::into_cert`]. Either way,
/// its content is available through `Deref` to [`TbsCert`] and can’t be
/// changed anymore.
///
/// [`decode`]: Self::decode
#[derive(Clone, Debug)]
pub struct Cert {
    /// The complete encoding of the certificate.
    raw: Captured,

    /// The signed data, i.e., the encoded TBS part and the signature.
    signed_data: SignedData,

    /// The content of the TBS part.
    tbs: TbsCert,
}

impl Cert {
    /// Returns a reference to the certificate’s signature.
    pub fn signature(&self) -> &Signature {
        self.signed_data.signature()
    }

    /// Returns a reference to the signed data.
    pub fn signed_data(&self) -> &SignedData {
        &self.signed_data
    }

    /// Returns a reference to the to-be-signed part.
    pub fn tbs(&self) -> &TbsCert {
        &self.tbs
    }

    /// Returns the digest of the complete encoded certificate.
    pub fn fingerprint(&self, algorithm: DigestAlgorithm) -> Digest {
        algorithm.digest(self.raw.as_slice())
    }
}


/// # Decoding and Encoding
///
impl Cert {
    /// Decodes a source as a certificate.
    pub fn decode(source: impl Into<Bytes>) -> Result<Self, DecodeError> {
        Decoder::decode(source, Self::take_from)
    }

    /// Takes an encoded certificate from the beginning of a value.
    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        let ((signed_data, tbs), raw) = cons.capture(|cons| {
            cons.take_sequence(Self::from_constructed)
        })?;
        Ok(Cert { raw, signed_data, tbs })
    }

    /// Takes an optional certificate from the beginning of a value.
    pub fn take_opt_from(
        cons: &mut Decoder
    ) -> Result<Option<Self>, DecodeError> {
        if cons.peek_tag()? == Some(Tag::SEQUENCE) {
            Self::take_from(cons).map(Some)
        }
        else {
            Ok(None)
        }
    }

    /// Parses the content of a Certificate sequence.
    fn from_constructed(
        cons: &mut Decoder
    ) -> Result<(SignedData, TbsCert), DecodeError> {
        let (tbs, signed_data) = SignedData::from_constructed_with(
            cons, TbsCert::take_from
        )?;
        if tbs.signature != signed_data.signature().algorithm() {
            return Err(cons.malformed("signature algorithm mismatch"))
        }
        Ok((signed_data, tbs))
    }

    /// Returns a value encoder for a reference to the certificate.
    pub fn encode_ref(&self) -> impl Values + '_ {
        &self.raw
    }

    /// Returns a captured encoding of the certificate.
    pub fn to_captured(&self) -> Captured {
        self.raw.clone()
    }
}


/// # Verification
///
impl Cert {
    /// Checks whether the certificate was issued by `issuer`.
    ///
    /// This is the case if the issuer name of this certificate is the
    /// subject name of `issuer` and the signature of this certificate
    /// verifies with the public key of `issuer`. The signature is checked
    /// over the TBS part exactly as it was encoded.
    pub fn verify_issued_by(&self, issuer: &Cert) -> Result<(), IssuerError> {
        if self.tbs.issuer != issuer.tbs.subject {
            return Err(IssuerError::NameMismatch)
        }
        self.signed_data.verify_signature(
            &issuer.tbs.subject_public_key_info
        ).map_err(|_| IssuerError::InvalidSignature)
    }

    /// Returns whether the certificate was issued by `authority`.
    pub fn certified_by(&self, authority: &Cert) -> bool {
        self.verify_issued_by(authority).is_ok()
    }

    /// Returns whether the certificate is correctly self-signed.
    pub fn is_self_signed(&self) -> bool {
        self.certified_by(self)
    }
}


//--- Deref, AsRef, and Borrow

impl ops::Deref for Cert {
    type Target = TbsCert;

    fn deref(&self) -> &Self::Target {
        &self.tbs
    }
}

impl AsRef<Cert> for Cert {
    fn as_ref(&self) -> &Self {
        self
    }
}

impl AsRef<TbsCert> for Cert {
    fn as_ref(&self) -> &TbsCert {
        &self.tbs
    }
}

impl borrow::Borrow<TbsCert> for Cert {
    fn borrow(&self) -> &TbsCert {
        &self.tbs
    }
}


//--- PartialEq and Eq

impl PartialEq for Cert {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Cert { }


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for Cert {
    fn serialize<S: serde::Serializer>(
        &self, serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::Serde.encode(self.raw.as_slice()))
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Cert {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        use serde::de;

        let string = <String as serde::Deserialize>::deserialize(
            deserializer
        )?;
        let decoded = base64::Serde.decode(&string).map_err(de::Error::custom)?;
        Cert::decode(Bytes::from(decoded)).map_err(de::Error::custom)
    }
}


//------------ TbsCert -------------------------------------------------------

/// The to-be-signed part of a certificate.
///
/// ```txt
/// TBSCertificate  ::=  SEQUENCE  {
///      version         [0]  EXPLICIT Version DEFAULT v1,
///      serialNumber         CertificateSerialNumber,
///      signature            AlgorithmIdentifier,
///      issuer               Name,
///      validity             Validity,
///      subject              Name,
///      subjectPublicKeyInfo SubjectPublicKeyInfo,
///      issuerUniqueID  [1]  IMPLICIT UniqueIdentifier OPTIONAL,
///      subjectUniqueID [2]  IMPLICIT UniqueIdentifier OPTIONAL,
///      extensions      [3]  EXPLICIT Extensions OPTIONAL }
/// ```
///
/// A decoded value keeps its original encoding. Any change through one of
/// the setters drops it and the value will be encoded afresh.
#[derive(Clone, Debug)]
pub struct TbsCert {
    /// The encoded version, i.e., 0 for v1 up to 2 for v3.
    version: u8,

    /// The serial number.
    serial_number: Unsigned,

    /// The algorithm used for signing the certificate.
    signature: SignatureAlgorithm,

    /// The name of the issuer.
    issuer: Name,

    /// The validity of the certificate.
    validity: Validity,

    /// The name of the subject of this certificate.
    subject: Name,

    /// Information about the public key of this certificate.
    subject_public_key_info: PublicKey,

    issuer_unique_id: Option<BitString>,
    subject_unique_id: Option<BitString>,

    /// The extensions.
    ///
    /// If there are none, the field is left out when encoding.
    extensions: Extensions,

    /// The original encoding if the value was decoded.
    raw: Option<Captured>,
}

/// # Data Access
///
impl TbsCert {
    /// Creates a new value for a version 3 certificate.
    ///
    /// The subject key identifier extension is set from the public key.
    /// All other extensions are empty. The signature algorithm is the
    /// default algorithm.
    pub fn new(
        serial_number: Unsigned,
        issuer: Name,
        validity: Validity,
        subject: Name,
        subject_public_key_info: PublicKey,
    ) -> Self {
        let mut extensions = Extensions::new();
        extensions.set_subject_key_identifier(
            Some(subject_public_key_info.key_identifier())
        );
        TbsCert {
            version: 2,
            serial_number,
            signature: SignatureAlgorithm::default(),
            issuer,
            validity,
            subject,
            subject_public_key_info,
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions,
            raw: None,
        }
    }

    /// Returns the X.509 version, i.e., 1, 2, or 3.
    pub fn version(&self) -> u8 {
        self.version + 1
    }

    pub fn serial_number(&self) -> &Unsigned {
        &self.serial_number
    }

    pub fn set_serial_number(&mut self, serial: Unsigned) {
        self.serial_number = serial;
        self.raw = None;
    }

    /// Returns the signature algorithm named in the TBS part.
    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.signature
    }

    pub fn set_signature_algorithm(&mut self, algorithm: SignatureAlgorithm) {
        self.signature = algorithm;
        self.raw = None;
    }

    pub fn issuer(&self) -> &Name {
        &self.issuer
    }

    pub fn set_issuer(&mut self, issuer: Name) {
        self.issuer = issuer;
        self.raw = None;
    }

    pub fn validity(&self) -> Validity {
        self.validity
    }

    pub fn set_validity(&mut self, validity: Validity) {
        self.validity = validity;
        self.raw = None;
    }

    pub fn subject(&self) -> &Name {
        &self.subject
    }

    pub fn set_subject(&mut self, subject: Name) {
        self.subject = subject;
        self.raw = None;
    }

    pub fn subject_public_key_info(&self) -> &PublicKey {
        &self.subject_public_key_info
    }

    pub fn issuer_unique_id(&self) -> Option<&BitString> {
        self.issuer_unique_id.as_ref()
    }

    pub fn subject_unique_id(&self) -> Option<&BitString> {
        self.subject_unique_id.as_ref()
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Returns a mutable reference to the extensions.
    ///
    /// This drops the original encoding.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        self.raw = None;
        &mut self.extensions
    }
}

/// # Decoding and Encoding
///
impl TbsCert {
    /// Takes an encoded TBS part and keeps its encoding.
    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        let (mut res, raw) = cons.capture(|cons| {
            cons.take_sequence(Self::from_constructed)
        })?;
        res.raw = Some(raw);
        Ok(res)
    }

    /// Parses the content of a TBSCertificate sequence.
    fn from_constructed(cons: &mut Decoder) -> Result<Self, DecodeError> {
        let version = match cons.take_opt_constructed_if(
            Tag::CTX_0, |cons| cons.take_u64()
        )? {
            None => 0,
            Some(version) if version <= 2 => version as u8,
            Some(_) => {
                return Err(cons.unsupported("unsupported certificate version"))
            }
        };
        Ok(TbsCert {
            version,
            serial_number: Unsigned::take_from(cons)?,
            signature: SignatureAlgorithm::x509_take_from(cons)?,
            issuer: Name::take_from(cons)?,
            validity: Validity::take_from(cons)?,
            subject: Name::take_from(cons)?,
            subject_public_key_info: PublicKey::take_from(cons)?,
            issuer_unique_id: {
                BitString::take_opt_from_as(cons, Tag::CTX_PRIM_1)?
            },
            subject_unique_id: {
                BitString::take_opt_from_as(cons, Tag::CTX_PRIM_2)?
            },
            extensions: {
                cons.take_opt_constructed_if(
                    Tag::CTX_3, Extensions::take_from
                )?.unwrap_or_default()
            },
            raw: None,
        })
    }

    /// Returns an encoder for the value.
    ///
    /// If the value was decoded and hasn’t been changed since, this
    /// produces the original encoding.
    pub fn encode_ref(&self) -> impl Values + '_ {
        match self.raw {
            Some(ref raw) => Choice2::One(raw),
            None => Choice2::Two(self.encode_fresh()),
        }
    }

    fn encode_fresh(&self) -> impl Values + '_ {
        der::sequence((
            if self.version > 0 {
                Some(der::sequence_as(Tag::CTX_0, self.version.encode()))
            }
            else {
                None
            },
            self.serial_number.encode_ref(),
            self.signature.x509_encode(),
            self.issuer.encode_ref(),
            self.validity.encode(),
            self.subject.encode_ref(),
            self.subject_public_key_info.encode_ref(),
            self.issuer_unique_id.as_ref().map(|id| {
                id.encode_ref_as(Tag::CTX_PRIM_1)
            }),
            self.subject_unique_id.as_ref().map(|id| {
                id.encode_ref_as(Tag::CTX_PRIM_2)
            }),
            if self.extensions.is_empty() {
                None
            }
            else {
                Some(der::sequence_as(
                    Tag::CTX_3, self.extensions.encode_ref()
                ))
            },
        ))
    }

    /// Returns the encoded value.
    pub fn to_captured(&self) -> Result<Captured, EncodeError> {
        match self.raw {
            Some(ref raw) => Ok(raw.clone()),
            None => self.encode_ref().to_captured(),
        }
    }

    /// Converts the value into a signed certificate.
    ///
    /// The value is signed with the key `key` from `signer` using the
    /// signature algorithm set in the value.
    pub fn into_cert<S: Signer>(
        mut self,
        signer: &S,
        key: &S::KeyId,
    ) -> Result<Cert, SigningError<S::Error>> {
        let data = self.to_captured().map_err(SigningError::Encoding)?;
        let signature = signer.sign(key, self.signature, &data)?;
        self.raw = Some(data.clone());
        let signed_data = SignedData::new(data, signature);
        let raw = signed_data.encode_ref().to_captured().map_err(
            SigningError::Encoding
        )?;
        Ok(Cert { raw, signed_data, tbs: self })
    }
}


//------------ IssuerError ---------------------------------------------------

/// The reason a certificate wasn’t issued by another certificate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IssuerError {
    /// The issuer name doesn’t match the issuer’s subject name.
    NameMismatch,

    /// The signature doesn’t verify with the issuer’s key.
    InvalidSignature,
}

impl fmt::Display for IssuerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            IssuerError::NameMismatch => "issuer name mismatch",
            IssuerError::InvalidSignature => "invalid signature",
        })
    }
}

impl error::Error for IssuerError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::asn1::Time;
    use crate::crypto::KeyIdentifier;
    use crate::x509::KeyUsage;

    const ROOT: &[u8] = include_bytes!("../../test-data/root.der");
    const INT: &[u8] = include_bytes!("../../test-data/int.der");
    const LEAF: &[u8] = include_bytes!("../../test-data/leaf.der");
    const LEAF_SHA1: &[u8] = include_bytes!("../../test-data/leaf-sha1.der");

    fn cert(data: &'static [u8]) -> Cert {
        Cert::decode(data).unwrap()
    }

    #[test]
    fn decode_certs() {
        let root = cert(ROOT);
        let int = cert(INT);
        let leaf = cert(LEAF);

        assert_eq!(root.version(), 3);
        assert!(root.extensions().is_ca());
        assert_eq!(root.extensions().key_usage(), Some(KeyUsage::ca()));
        let ski: KeyIdentifier =
            "26D179B1B10777A1F89A3C40393A2A30DEC207BA".parse().unwrap();
        assert_eq!(root.extensions().subject_key_identifier(), Some(&ski));
        assert_eq!(
            root.subject_public_key_info().key_identifier(),
            *root.extensions().subject_key_identifier().unwrap()
        );

        assert_eq!(int.serial_number().as_slice(), b"\x10\x00");
        assert_eq!(
            int.extensions().authority_key_identifier(),
            root.extensions().subject_key_identifier()
        );

        assert_eq!(leaf.subject().common_name(), Some("leaf.example.com"));
        assert_eq!(
            leaf.serial_number().to_string(),
            "C0:FF:EE:01:23:45:67:89"
        );
        assert!(!leaf.extensions().is_ca());
        assert_eq!(leaf.extensions().key_usage(), Some(KeyUsage::tls()));
        let eku = leaf.extensions().extended_key_usage().unwrap();
        assert!(eku.contains(&crate::oid::KP_SERVER_AUTH));
        assert!(eku.contains(&crate::oid::KP_CLIENT_AUTH));
    }

    #[test]
    fn exact_reencode() {
        for data in &[ROOT, INT, LEAF, LEAF_SHA1] {
            let cert = cert(*data);
            assert_eq!(cert.to_captured().as_slice(), *data);
            assert_eq!(cert.encode_ref().to_vec().unwrap(), *data);
            assert_eq!(
                cert.tbs().to_captured().unwrap().as_slice(),
                cert.signed_data().data().as_slice()
            );
        }
    }

    #[test]
    fn issuance_relations() {
        let root = cert(ROOT);
        let int = cert(INT);
        let leaf = cert(LEAF);

        assert!(root.is_self_signed());
        assert!(!int.is_self_signed());
        assert!(int.certified_by(&root));
        assert!(leaf.certified_by(&int));
        assert_eq!(
            leaf.verify_issued_by(&root), Err(IssuerError::NameMismatch)
        );
        assert!(!root.certified_by(&int));
    }

    #[test]
    fn sha1_signature() {
        let leaf = cert(LEAF_SHA1);
        assert_eq!(
            leaf.signature().algorithm().digest(), DigestAlgorithm::Sha1
        );
        assert!(leaf.certified_by(&cert(INT)));
    }

    #[test]
    fn tampered_tbs() {
        let mut data = INT.to_vec();
        // A byte within the subject’s RSA modulus.
        data[400] ^= 0x01;
        let int = Cert::decode(data).unwrap();
        assert_eq!(
            int.verify_issued_by(&cert(ROOT)),
            Err(IssuerError::InvalidSignature)
        );
    }

    #[test]
    fn algorithm_mismatch() {
        // Replace the outer sha256WithRSAEncryption by the SHA-1 variant.
        let mut data = LEAF.to_vec();
        let tbs_len = cert(LEAF).signed_data().data().len();
        let outer = tbs_len + 4 + 12;
        assert_eq!(data[outer], 0x0b);
        data[outer] = 0x05;
        let err = Cert::decode(data).unwrap_err();
        assert_eq!(err.message(), "signature algorithm mismatch");
    }

    #[test]
    fn fingerprint() {
        let root = cert(ROOT);
        assert_eq!(
            root.fingerprint(DigestAlgorithm::Sha256).as_ref(),
            DigestAlgorithm::Sha256.digest(ROOT).as_ref()
        );
        assert_ne!(
            root.fingerprint(DigestAlgorithm::Sha1).as_ref(),
            cert(INT).fingerprint(DigestAlgorithm::Sha1).as_ref()
        );
    }

    #[test]
    fn changed_tbs_is_encoded_afresh() {
        let int = cert(INT);
        let mut tbs = int.tbs().clone();
        let validity = Validity::new(
            Time::utc(2020, 1, 1, 0, 0, 0).unwrap(),
            Time::utc(2030, 1, 1, 0, 0, 0).unwrap(),
        ).unwrap();
        tbs.set_validity(validity);
        let data = tbs.to_captured().unwrap();
        assert_ne!(data, *int.signed_data().data());
        let decoded = Decoder::decode(
            data.into_bytes(), TbsCert::take_from
        ).unwrap();
        assert_eq!(decoded.validity(), validity);
        assert_eq!(decoded.issuer(), int.issuer());
        assert_eq!(decoded.extensions(), int.extensions());
    }

    #[test]
    #[cfg(feature = "serde")]
    fn serde_cert() {
        let cert = cert(ROOT);
        let json = serde_json::to_string(&cert).unwrap();
        assert_eq!(serde_json::from_str::<Cert>(&json).unwrap(), cert);
    }
}

#[cfg(all(test, feature = "softkeys"))]
mod signer_test {
    use super::*;
    use crate::crypto::PublicKeyFormat;
    use crate::crypto::softsigner::OpenSslSigner;
    use crate::x509::{BasicConstraints, KeyUsage, NameAttribute};

    #[test]
    fn build_ca_and_ee() {
        let signer = OpenSslSigner::new();
        let ca_key = signer.create_key(PublicKeyFormat::RSA).unwrap();
        let ca_pubkey = signer.get_key_info(&ca_key).unwrap();
        let mut ca_name = Name::from_common_name("Test CA");
        ca_name.set(NameAttribute::Country, "CH");
        let validity = Validity::from_duration(chrono::TimeDelta::days(1));

        let mut tbs = TbsCert::new(
            1u64.into(), ca_name.clone(), validity, ca_name.clone(),
            ca_pubkey.clone()
        );
        tbs.extensions_mut().set_basic_constraints(
            Some(BasicConstraints::new(true, None))
        );
        tbs.extensions_mut().set_key_usage(Some(KeyUsage::ca()));
        let ca = tbs.into_cert(&signer, &ca_key).unwrap();
        let ca = Cert::decode(ca.to_captured().into_bytes()).unwrap();
        assert!(ca.is_self_signed());
        assert!(ca.extensions().is_ca());
        assert_eq!(ca.subject(), &ca_name);

        let ee_key = signer.create_key(PublicKeyFormat::RSA).unwrap();
        let ee_pubkey = signer.get_key_info(&ee_key).unwrap();
        let mut tbs = TbsCert::new(
            2u64.into(), ca_name, validity,
            Name::from_common_name("ee.example.com"), ee_pubkey
        );
        tbs.set_signature_algorithm(SignatureAlgorithm::rsa_sha1());
        tbs.extensions_mut().set_authority_key_identifier(
            Some(ca_pubkey.key_identifier())
        );
        let ee = tbs.into_cert(&signer, &ca_key).unwrap();
        assert!(ee.certified_by(&ca));
        assert!(!ee.is_self_signed());
        let ee = Cert::decode(ee.to_captured().into_bytes()).unwrap();
        assert!(ee.certified_by(&ca));
        assert_eq!(
            ee.extensions().authority_key_identifier(),
            ca.extensions().subject_key_identifier()
        );
        assert_eq!(
            ee.signature().algorithm().digest(), DigestAlgorithm::Sha1
        );
    }
}
