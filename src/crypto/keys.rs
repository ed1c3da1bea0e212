//! Types and parameters of keys.

use std::{error, fmt};
use std::str::FromStr;
use bytes::Bytes;
use ring::signature;
use ring::error::Unspecified;
use ring::signature::VerificationAlgorithm;
use untrusted::Input;
use crate::asn1::{BitString, Oid};
use crate::der::{
    self, Decoder, DecodeError, EncodeError, PrimitiveContent, Tag,
    Unsigned, Values,
};
use crate::oid;
use crate::util::hex;
use super::digest::DigestAlgorithm;
use super::signature::Signature;


//------------ PublicKeyFormat -----------------------------------------------

/// The format of a public key.
///
/// Only RSA keys are supported. The format merely remembers whether the
/// algorithm identifier had its parameters field present. New keys always
/// have it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PublicKeyFormat {
    has_parameter: bool,
}

impl PublicKeyFormat {
    /// The format for RSA keys.
    pub const RSA: Self = PublicKeyFormat { has_parameter: true };

    /// Returns whether the parameters field was present.
    pub fn has_parameter(self) -> bool {
        self.has_parameter
    }
}

/// # ASN.1 Algorithm Identifiers
///
/// The format of the public key is identified in certificates through a
/// algorithm identifier defined with this ASN.1:
///
/// ```txt
/// AlgorithmIdentifier ::= SEQUENCE {
///      algorithm          OBJECT IDENTIFIER,
///      parameters         ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// Right now, the object identifier needs to be that of `rsaEncryption`
/// defined by [RFC 4055] and the parameters must be present and NULL.
/// When parsing, we generously also allow it to be absent altogether.
///
/// [RFC 4055]: https://tools.ietf.org/html/rfc4055
impl PublicKeyFormat {
    /// Takes and returns a algorithm identifier.
    ///
    /// Returns an unsupported error if the algorithm isn’t RSA.
    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        cons.take_sequence(|cons| {
            if Oid::take_from(cons)? != oid::RSA_ENCRYPTION {
                return Err(cons.unsupported("unsupported key algorithm"))
            }
            let has_parameter = cons.take_opt_null()?.is_some();
            Ok(PublicKeyFormat { has_parameter })
        })
    }

    /// Provides an encoder for the algorihm identifier.
    ///
    /// The parameters field is only included if it was present.
    pub fn encode(self) -> impl Values {
        der::sequence((
            oid::RSA_ENCRYPTION.encode(),
            if self.has_parameter { Some(().encode()) } else { None },
        ))
    }
}

impl Default for PublicKeyFormat {
    fn default() -> Self {
        Self::RSA
    }
}


//------------ PublicKey -----------------------------------------------------

/// An RSA public key.
///
/// The key keeps both the raw key bits as they appear in the bit string of
/// a `SubjectPublicKeyInfo` and the two integers they contain:
///
/// ```txt
/// RSAPublicKey ::= SEQUENCE {
///     modulus            INTEGER,    -- n
///     publicExponent     INTEGER  }  -- e
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PublicKey {
    algorithm: PublicKeyFormat,
    bits: Bytes,
    modulus: Unsigned,
    exponent: Unsigned,
}

impl PublicKey {
    /// Creates a key from the raw modulus and public exponent.
    ///
    /// Both are big-endian octets. Leading zeros are ignored.
    pub fn from_rsa_components(
        modulus: &[u8], exponent: &[u8]
    ) -> Result<Self, EncodeError> {
        let modulus = Unsigned::from_slice(modulus);
        let exponent = Unsigned::from_slice(exponent);
        let bits = der::sequence((
            modulus.encode_ref(), exponent.encode_ref()
        )).to_bytes()?;
        Ok(PublicKey {
            algorithm: PublicKeyFormat::default(), bits, modulus, exponent
        })
    }

    pub fn algorithm(&self) -> PublicKeyFormat {
        self.algorithm
    }

    /// Returns the content of the key’s bit string.
    pub fn bits(&self) -> &[u8] {
        self.bits.as_ref()
    }

    /// Returns the RSA modulus.
    pub fn modulus(&self) -> &Unsigned {
        &self.modulus
    }

    /// Returns the RSA public exponent.
    pub fn exponent(&self) -> &Unsigned {
        &self.exponent
    }

    /// Returns the size of the modulus in bits.
    pub fn key_size(&self) -> usize {
        let slice = self.modulus.as_slice();
        slice.len() * 8 - slice[0].leading_zeros() as usize
    }

    /// Returns the key identifier of the key.
    ///
    /// This is the SHA-1 hash over the key bits, i.e., method 1 of
    /// section 4.2.1.2 of RFC 5280.
    pub fn key_identifier(&self) -> KeyIdentifier {
        KeyIdentifier::from(
            DigestAlgorithm::Sha1.digest(self.bits.as_ref()).as_ref()
        )
    }

    /// Verifies a signature using this public key.
    ///
    /// The digest is determined by the signature’s algorithm.
    pub fn verify(
        &self, message: &[u8], signature: &Signature
    ) -> Result<(), VerificationError> {
        let alg: &dyn VerificationAlgorithm = {
            match signature.algorithm().digest() {
                DigestAlgorithm::Sha256 => {
                    &signature::RSA_PKCS1_2048_8192_SHA256
                }
                DigestAlgorithm::Sha1 => {
                    &signature::RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY
                }
            }
        };
        alg.verify(
            Input::from(self.bits()),
            Input::from(message),
            Input::from(signature.value().as_ref())
        ).map_err(Into::into)
    }
}


/// # As `SubjectPublicKeyInfo`
///
/// Public keys are included in X.509 certificates as `SubjectPublicKeyInfo`
/// structures:
///
/// ```txt
/// SubjectPublicKeyInfo  ::=  SEQUENCE  {
///     algorithm            AlgorithmIdentifier,
///     subjectPublicKey     BIT STRING  }
/// ```
///
/// As these contain the same information as `PublicKey`, it can be
/// decoded from and encoded to such sequences.
impl PublicKey {
    pub fn decode(source: impl Into<Bytes>) -> Result<Self, DecodeError> {
        Decoder::decode(source, Self::take_from)
    }

    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        cons.take_sequence(|cons| {
            let algorithm = PublicKeyFormat::take_from(cons)?;
            let bits = match BitString::take_from(cons)?.octet_bytes() {
                Some(bits) => bits,
                None => return Err(cons.malformed("invalid public key"))
            };
            let (modulus, exponent) = Decoder::decode(
                bits.clone(),
                |cons| {
                    cons.take_sequence(|cons| {
                        Ok((
                            Unsigned::take_from(cons)?,
                            Unsigned::take_from(cons)?
                        ))
                    })
                }
            )?;
            Ok(PublicKey { algorithm, bits, modulus, exponent })
        })
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        der::sequence((
            self.algorithm.encode(),
            BitString::from_octets(self.bits.clone()).encode(),
        ))
    }

    /// Returns a bytes values of the encoded the *subjectPublicKeyInfo*.
    pub fn to_info_bytes(&self) -> Result<Bytes, EncodeError> {
        self.encode_ref().to_bytes()
    }
}


//------------ KeyIdentifier -------------------------------------------------

/// A key identifier.
///
/// Key identifiers generated by this crate are the SHA-1 hash over the
/// public key’s bits. Identifiers found in certificates may have been
/// generated differently and can have any length.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct KeyIdentifier(Bytes);

impl KeyIdentifier {
    /// Returns an octet slice of the key identifer’s value.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Takes an encoded key identifier from a constructed value.
    ///
    /// ```text
    /// KeyIdentifier ::= OCTET STRING
    /// ```
    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        cons.take_value_if(Tag::OCTET_STRING, Self::from_content)
    }

    /// Parses an encoded key identifer from encoded content.
    ///
    /// The identifier must not be empty.
    pub fn from_content(cons: &mut Decoder) -> Result<Self, DecodeError> {
        let content = cons.take_rest();
        if content.is_empty() {
            return Err(cons.malformed("empty key identifier"))
        }
        Ok(KeyIdentifier(content))
    }
}


//--- From and FromStr

impl<'a> From<&'a [u8]> for KeyIdentifier {
    fn from(value: &'a [u8]) -> Self {
        KeyIdentifier(Bytes::copy_from_slice(value))
    }
}

impl FromStr for KeyIdentifier {
    type Err = InvalidKeyIdentifier;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match hex::decode(value) {
            Some(res) if !res.is_empty() => Ok(KeyIdentifier(res.into())),
            _ => Err(InvalidKeyIdentifier)
        }
    }
}


//--- AsRef

impl AsRef<[u8]> for KeyIdentifier {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}


//--- Display and Debug

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&hex::encode(self.as_slice()))
    }
}

impl fmt::Debug for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "KeyIdentifier({})", self)
    }
}


//--- PrimitiveContent

impl PrimitiveContent for KeyIdentifier {
    const TAG: Tag = Tag::OCTET_STRING;

    fn encoded_len(&self) -> usize {
        self.0.len()
    }

    fn write_encoded(&self, target: &mut Vec<u8>) {
        target.extend_from_slice(self.0.as_ref())
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for KeyIdentifier {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for KeyIdentifier {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        struct KeyIdentifierVisitor;

        impl<'de> serde::de::Visitor<'de> for KeyIdentifierVisitor {
            type Value = KeyIdentifier;

            fn expecting(
                &self, formatter: &mut fmt::Formatter
            ) -> fmt::Result {
                write!(formatter,
                    "a string containing a key identifier as hex digits"
                )
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where E: serde::de::Error {
                KeyIdentifier::from_str(s).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(KeyIdentifierVisitor)
    }
}


//------------ InvalidKeyIdentifier ------------------------------------------

/// A key identifier couldn’t be parsed from a hex string.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InvalidKeyIdentifier;

impl fmt::Display for InvalidKeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid key identifier")
    }
}

impl error::Error for InvalidKeyIdentifier { }


//------------ VerificationError ---------------------------------------------

/// An error happened while verifying a signature.
///
/// No further information is provided. This is on purpose.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VerificationError;

impl From<Unspecified> for VerificationError {
    fn from(_: Unspecified) -> Self {
        VerificationError
    }
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("signature verification failed")
    }
}

impl error::Error for VerificationError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rsa_components() {
        let key = PublicKey::from_rsa_components(
            b"\x00\xC0\x01", b"\x01\x00\x01"
        ).unwrap();
        assert_eq!(
            key.bits(),
            b"\x30\x0a\x02\x03\x00\xC0\x01\x02\x03\x01\x00\x01"
        );
        assert_eq!(key.modulus().as_slice(), b"\xC0\x01");
        assert_eq!(key.exponent().as_slice(), b"\x01\x00\x01");
        assert_eq!(key.key_size(), 16);

        let info = key.to_info_bytes().unwrap();
        let decoded = PublicKey::decode(info).unwrap();
        assert_eq!(decoded, key);
        assert!(decoded.algorithm().has_parameter());
    }

    #[test]
    fn key_identifier_text() {
        let id = KeyIdentifier::from_str(
            "26D179B1B10777A1F89A3C40393A2A30DEC207BA"
        ).unwrap();
        assert_eq!(id.as_slice().len(), 20);
        assert_eq!(id.to_string(), "26D179B1B10777A1F89A3C40393A2A30DEC207BA");
        assert!(KeyIdentifier::from_str("").is_err());
        assert!(KeyIdentifier::from_str("26D").is_err());
        assert!(KeyIdentifier::from_str("XY").is_err());
    }

    #[test]
    fn rejects_unused_bits() {
        // The bit string below claims one unused bit.
        let data = b"\x30\x15\
            \x30\x0d\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x01\x05\x00\
            \x03\x04\x01\x30\x00\x00";
        assert!(PublicKey::decode(&data[..]).is_err());
    }

    #[test]
    #[cfg(feature = "serde")]
    fn serde_key_identifier() {
        use serde_test::{assert_de_tokens, assert_tokens, Token};

        let key_id = KeyIdentifier::from(&b"\x01\xAB\xcd"[..]);
        assert_tokens(&key_id, &[Token::Str("01ABCD")]);
        assert_de_tokens(&key_id, &[Token::Str("01abcd")]);
    }
}
