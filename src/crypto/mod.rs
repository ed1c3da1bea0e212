//! Signing and verification.
//!
//! This module is the boundary to the cryptographic primitives. Digests
//! and signature verification are done via _ring_. Creating keys and
//! signatures is left to an implementation of the [`Signer`] trait, one of
//! which is provided atop OpenSSL with the `softkeys` feature.

pub use self::digest::{Digest, DigestAlgorithm};
pub use self::keys::{
    InvalidKeyIdentifier, KeyIdentifier, PublicKey, PublicKeyFormat,
    VerificationError,
};
pub use self::signer::{KeyError, Signer, SigningError};
pub use self::signature::{Signature, SignatureAlgorithm};

pub mod digest;
pub mod keys;
pub mod signer;
pub mod signature;
#[cfg(feature = "softkeys")] pub mod softsigner;
