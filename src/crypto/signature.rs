//! Signature algorithms and operations.

use bytes::Bytes;
use crate::asn1::{ConstOid, Oid};
use crate::der::{
    self, Constructed, Decoder, DecodeError, Primitive, PrimitiveContent,
};
use crate::oid;
use super::digest::DigestAlgorithm;


//------------ SignatureAlgorithm --------------------------------------------

/// A signature algorithm.
///
/// All supported algorithms are RSA PKCS #1 v1.5 with a choice of digest
/// algorithm. However, there are two possible representations of the
/// non-existant algorithm parameters: the field can be NULL or missing.
/// In certain circumstances, it is imporant that these two
/// representations do not compare as equal. Therefore, this type keeps
/// track of the representation used.
///
/// You can construct the signature algorithm currently preferred via the
/// `Default` implementation. It uses SHA-256.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SignatureAlgorithm {
    /// The digest algorithm used.
    digest: DigestAlgorithm,

    /// Is the parameter field present?
    ///
    /// If `true`, then a parameter field is present and NULL. Otherwise it
    /// is missing.
    ///
    /// Constructed values will always have this set to `true`.
    has_parameter: bool,
}

impl SignatureAlgorithm {
    /// Returns the algorithm using SHA-1.
    pub fn rsa_sha1() -> Self {
        SignatureAlgorithm {
            digest: DigestAlgorithm::Sha1, has_parameter: true
        }
    }

    /// Returns the algorithm using SHA-256.
    pub fn rsa_sha256() -> Self {
        SignatureAlgorithm {
            digest: DigestAlgorithm::Sha256, has_parameter: true
        }
    }

    /// Returns the digest algorithm.
    pub fn digest(self) -> DigestAlgorithm {
        self.digest
    }

    /// Returns whether the parameters field was present.
    pub fn has_parameter(self) -> bool {
        self.has_parameter
    }

    /// Returns the object identifier of the algorithm.
    pub fn oid(self) -> ConstOid {
        match self.digest {
            DigestAlgorithm::Sha1 => oid::SHA1_WITH_RSA_ENCRYPTION,
            DigestAlgorithm::Sha256 => oid::SHA256_WITH_RSA_ENCRYPTION,
        }
    }
}

/// # ASN.1 Values
///
/// Signature algorithm identifiers appear in certificates and certification
/// requests as algorithm identifiers:
///
/// ```txt
/// AlgorithmIdentifier          ::= SEQUENCE {
///      algorithm                   OBJECT IDENTIFIER,
///      parameters                  ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// The algorithm must be either `sha1WithRSAEncryption` or
/// `sha256WithRSAEncryption`. Anything else is an unsupported value. The
/// parameters field can be either NULL or missing. Encoding reproduces
/// whichever was the case. Constructed values always have the NULL.
impl SignatureAlgorithm {
    /// Takes a signature algorithm identifier from the decoder.
    pub fn x509_take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        cons.take_sequence(Self::x509_from_constructed)
    }

    /// Parses the algorithm identifier from the content of its sequence.
    fn x509_from_constructed(
        cons: &mut Decoder
    ) -> Result<Self, DecodeError> {
        let oid = Oid::take_from(cons)?;
        let digest = if oid == oid::SHA256_WITH_RSA_ENCRYPTION {
            DigestAlgorithm::Sha256
        }
        else if oid == oid::SHA1_WITH_RSA_ENCRYPTION {
            DigestAlgorithm::Sha1
        }
        else {
            return Err(cons.unsupported("unsupported signature algorithm"))
        };
        let has_parameter = cons.take_opt_null()?.is_some();
        Ok(SignatureAlgorithm { digest, has_parameter })
    }

    /// Provides an encoder for the algorithm identifier.
    pub fn x509_encode(
        self
    ) -> Constructed<(Primitive<ConstOid>, Option<Primitive<()>>)> {
        der::sequence((
            self.oid().encode(),
            if self.has_parameter { Some(().encode()) } else { None },
        ))
    }
}


//--- Default

impl Default for SignatureAlgorithm {
    fn default() -> Self {
        Self::rsa_sha256()
    }
}


//------------ Signature -----------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Signature {
    algorithm: SignatureAlgorithm,
    value: Bytes
}

impl Signature {
    pub fn new(algorithm: SignatureAlgorithm, value: Bytes) -> Self {
        Signature { algorithm, value }
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    pub fn value(&self) -> &Bytes {
        &self.value
    }

    pub fn unwrap(self) -> (SignatureAlgorithm, Bytes) {
        (self.algorithm, self.value)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::der::{DecodeErrorKind, Values};

    #[test]
    fn parameters_are_remembered() {
        let with = Decoder::decode(
            &b"\x30\x0d\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0b\x05\x00"[..],
            SignatureAlgorithm::x509_take_from
        ).unwrap();
        let without = Decoder::decode(
            &b"\x30\x0b\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0b"[..],
            SignatureAlgorithm::x509_take_from
        ).unwrap();
        assert_eq!(with, SignatureAlgorithm::default());
        assert_ne!(with, without);
        assert_eq!(without.digest(), DigestAlgorithm::Sha256);
        assert_eq!(
            without.x509_encode().to_vec().unwrap(),
            b"\x30\x0b\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0b"
        );
    }

    #[test]
    fn sha1() {
        let alg = Decoder::decode(
            SignatureAlgorithm::rsa_sha1().x509_encode().to_vec().unwrap(),
            SignatureAlgorithm::x509_take_from
        ).unwrap();
        assert_eq!(alg.digest(), DigestAlgorithm::Sha1);
    }

    #[test]
    fn unsupported() {
        // ecdsa-with-SHA256
        let err = Decoder::decode(
            &b"\x30\x0a\x06\x08\x2a\x86\x48\xce\x3d\x04\x03\x02"[..],
            SignatureAlgorithm::x509_take_from
        ).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::Unsupported);
    }
}
