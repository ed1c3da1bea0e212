//! A codec for the Distinguished Encoding Rules of ASN.1.
//!
//! This is a deliberately small subset of DER. Tags are limited to the
//! single-octet low-tag-number form and content lengths to 0x7FFF octets,
//! which covers certificates and certification requests with any
//! practical key size. Everything outside this subset is rejected as
//! unsupported rather than half-understood.
//!
//! Values are decoded via a [`Decoder`] and encoded via [`Values`]. See
//! the respective modules for details.

pub use self::captured::Captured;
pub use self::decode::{decode, Decoder};
pub use self::encode::{
    encode, sequence, sequence_as, set, total_encoded_len, Choice2,
    Constructed, Primitive, PrimitiveContent, Values,
};
pub use self::error::{DecodeError, DecodeErrorKind, EncodeError};
pub use self::int::Unsigned;
pub use self::length::MAX_LEN;
pub use self::tag::Tag;

pub mod length;

mod captured;
mod decode;
mod encode;
mod error;
mod int;
mod tag;
