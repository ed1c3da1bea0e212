//! Digest algorithm and operations.

use std::io;
use ring::digest;
use crate::asn1::{ConstOid, Oid};
use crate::der::{self, Decoder, DecodeError, Values};
use crate::oid;

// Re-export the things from ring for actual digest generation.
pub use ring::digest::Digest;


//------------ DigestAlgorithm -----------------------------------------------

/// The digest algorithms supported by this crate.
///
/// These are the algorithms used by the signature algorithms. SHA-1 is
/// only supported because there still are certificates signed with it. It
/// is not used when creating new signatures.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
}

/// # Creating Digest Values
///
impl DigestAlgorithm {
    /// Returns the digest of `data` using this algorithm.
    pub fn digest(self, data: &[u8]) -> Digest {
        digest::digest(self.ring_algorithm(), data)
    }

    /// Returns a digest context for multi-step calculation of the digest.
    pub fn start(self) -> Context {
        Context(digest::Context::new(self.ring_algorithm()))
    }

    /// Returns the length of a digest value in octets.
    pub fn digest_len(self) -> usize {
        self.ring_algorithm().output_len
    }

    fn ring_algorithm(self) -> &'static digest::Algorithm {
        match self {
            DigestAlgorithm::Sha1 => &digest::SHA1_FOR_LEGACY_USE_ONLY,
            DigestAlgorithm::Sha256 => &digest::SHA256,
        }
    }
}


/// # ASN.1 Values
///
/// Digest algorithms appear on their own in a few places with the following
/// syntax:
///
/// ```txt
/// DigestAlgorithmIdentifier  ::= AlgorithmIdentifier
/// AlgorithmIdentifier        ::= SEQUENCE {
///      algorithm                 OBJECT IDENTIFIER,
///      parameters                ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// The _parameters_ field may either be absent or `NULL`. It is always
/// encoded as `NULL`.
impl DigestAlgorithm {
    /// Takes and returns a single digest algorithm identifier.
    ///
    /// Returns an unsupported error if the algorithm isn’t one of the
    /// supported algorithms.
    pub fn take_from(cons: &mut Decoder) -> Result<Self, DecodeError> {
        cons.take_sequence(|cons| {
            let res = Self::from_oid(&Oid::take_from(cons)?).ok_or_else(|| {
                cons.unsupported("unsupported digest algorithm")
            })?;
            cons.take_opt_null()?;
            Ok(res)
        })
    }

    /// Returns the algorithm for an object identifier if it is supported.
    pub fn from_oid<T: AsRef<[u8]>>(oid: &Oid<T>) -> Option<Self> {
        if *oid == oid::SHA256 {
            Some(DigestAlgorithm::Sha256)
        }
        else if *oid == oid::SHA1 {
            Some(DigestAlgorithm::Sha1)
        }
        else {
            None
        }
    }

    /// Returns the object identifier of the algorithm.
    pub fn oid(self) -> ConstOid {
        match self {
            DigestAlgorithm::Sha1 => oid::SHA1,
            DigestAlgorithm::Sha256 => oid::SHA256,
        }
    }

    /// Provides an encoder for a single algorithm identifier.
    pub fn encode(self) -> impl Values {
        use der::PrimitiveContent;

        der::sequence((
            self.oid().encode(),
            ().encode(),
        ))
    }
}


//--- Default

impl Default for DigestAlgorithm {
    fn default() -> Self {
        DigestAlgorithm::Sha256
    }
}


//------------ Context -------------------------------------------------------

#[derive(Clone)]
pub struct Context(digest::Context);

impl Context {
    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data)
    }

    pub fn finish(self) -> Digest {
        self.0.finish()
    }
}

impl io::Write for Context {
    fn write(&mut self, buf: &[u8]) -> Result<usize, io::Error> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn identifiers() {
        for alg in &[DigestAlgorithm::Sha1, DigestAlgorithm::Sha256] {
            let encoded = alg.encode().to_vec().unwrap();
            assert_eq!(
                Decoder::decode(encoded, DigestAlgorithm::take_from).unwrap(),
                *alg
            );
        }
        assert_eq!(
            Decoder::decode(
                &b"\x30\x07\x06\x05\x2B\x0E\x03\x02\x1A"[..],
                DigestAlgorithm::take_from
            ).unwrap(),
            DigestAlgorithm::Sha1
        );
    }

    #[test]
    fn context() {
        let mut ctx = DigestAlgorithm::Sha256.start();
        ctx.update(b"foo");
        ctx.update(b"bar");
        assert_eq!(
            ctx.finish().as_ref(),
            DigestAlgorithm::Sha256.digest(b"foobar").as_ref()
        );
        assert_eq!(DigestAlgorithm::Sha1.digest(b"").as_ref().len(), 20);
        assert_eq!(DigestAlgorithm::Sha256.digest_len(), 32);
    }
}
