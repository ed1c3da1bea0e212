//! X.509 certificates and PKCS #10 certification requests.
//!
//! Certificates are represented by [`Cert`] with the signed part in
//! [`TbsCert`]. Certification requests are [`Csr`]. Both are built atop
//! the common types for names, validity periods, and extensions found in
//! the submodules.
//!
//! Decoded objects keep the octets they were decoded from wherever a
//! signature was made over them. Signatures are therefore always checked
//! against the data that was actually signed.

pub use self::cert::{Cert, IssuerError, TbsCert};
pub use self::csr::{Csr, CsrInfo};
pub use self::ext::{
    BasicConstraints, ExtendedKeyUsage, Extension, Extensions, KeyUsage,
};
pub use self::name::{Name, NameAttribute};
pub use self::validity::{Validity, ValidityError};

pub mod cert;
pub mod csr;
pub mod ext;
pub mod name;
pub mod validity;

use crate::asn1::BitString;
use crate::crypto::{
    PublicKey, Signature, SignatureAlgorithm, VerificationError,
};
use crate::der::{
    self, Captured, Decoder, DecodeError, PrimitiveContent, Values,
};


//------------ Functions -----------------------------------------------------

/// Updates an optional value the first time.
///
/// Always runs `op` but only assigns its result to `opt` if that doesn’t
/// hold a value yet.
pub fn update_first<F, T, E>(opt: &mut Option<T>, op: F) -> Result<(), E>
where F: FnOnce() -> Result<Option<T>, E> {
    if let Some(value) = op()? {
        if opt.is_none() {
            *opt = Some(value);
        }
    }
    Ok(())
}


//------------ SignedData ----------------------------------------------------

/// Data together with a signature over it.
///
/// ```txt
/// SIGNED{ToBeSigned} ::= SEQUENCE {
///     toBeSigned           ToBeSigned,
///     algorithm            AlgorithmIdentifier,
///     signature            BIT STRING }
/// ```
///
/// Certificates and certification requests both have this shape. The
/// signed data is kept in its encoded form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignedData {
    data: Captured,
    signature: Signature,
}

impl SignedData {
    pub fn new(data: Captured, signature: Signature) -> Self {
        SignedData { data, signature }
    }

    /// Returns the encoded signed data.
    pub fn data(&self) -> &Captured {
        &self.data
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Parses the content of the outer sequence.
    ///
    /// The to-be-signed value is parsed by `op` and returned alongside.
    pub fn from_constructed_with<F, T>(
        cons: &mut Decoder, op: F
    ) -> Result<(T, Self), DecodeError>
    where F: FnOnce(&mut Decoder) -> Result<T, DecodeError> {
        let (res, data) = cons.capture(op)?;
        let algorithm = SignatureAlgorithm::x509_take_from(cons)?;
        let value = match BitString::take_from(cons)?.octet_bytes() {
            Some(value) => value,
            None => return Err(cons.malformed("invalid signature value"))
        };
        Ok((res, SignedData::new(data, Signature::new(algorithm, value))))
    }

    pub fn encode_ref(&self) -> impl Values + '_ {
        der::sequence((
            &self.data,
            self.signature.algorithm().x509_encode(),
            BitString::from_octets(self.signature.value().clone()).encode(),
        ))
    }

    /// Verifies the signature over the data as it was encoded.
    pub fn verify_signature(
        &self, public_key: &PublicKey
    ) -> Result<(), VerificationError> {
        public_key.verify(self.data.as_slice(), &self.signature)
    }
}
