//! Encoding, decoding, and validating X.509 certificates.
//!
//! This crate contains the building blocks for working with certificates
//! in their binary form:
//!
//! * the [`der`] module provides a codec for the Distinguished Encoding
//!   Rules, with the basic ASN.1 types built atop it in [`asn1`],
//! * the [`x509`] module contains X.509 certificates and PKCS #10
//!   certification requests,
//! * the [`chain`] module finds issuer certificates and checks that they
//!   lead to a trusted root.
//!
//! Cryptographic operations are collected in [`crypto`]. Verification is
//! done with _ring_. Creating keys and signatures goes through the
//! [`Signer`][crypto::Signer] trait, with an OpenSSL-based software
//! implementation available through the `softkeys` feature.
//!
//! The function [`validate`] combines everything into a single step.

pub use self::error::{validate, Error, ErrorKind};

pub mod asn1;
pub mod chain;
pub mod crypto;
pub mod der;
pub mod error;
pub mod oid;
pub mod x509;

mod util;
