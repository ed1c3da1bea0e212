//! Captured encodings.

use std::fmt;
use bytes::Bytes;
use super::decode::Decoder;
use super::encode::Values;
use super::error::{DecodeError, EncodeError};


//------------ Captured ------------------------------------------------------

/// The complete encoding of zero or more values.
///
/// A captured value keeps the octets exactly as they were received. It is
/// used wherever the precise encoding matters, for instance because a
/// signature was made over it, and it can be encoded again verbatim.
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Captured(Bytes);

impl Captured {
    /// Creates a captured value from already encoded octets.
    ///
    /// The octets are not checked.
    pub fn from_der(bytes: Bytes) -> Self {
        Captured(bytes)
    }

    /// Creates a captured value by encoding `values`.
    pub fn from_values<V: Values>(values: V) -> Result<Self, EncodeError> {
        values.to_captured()
    }

    /// Creates a captured value by taking exactly one value from `data`.
    pub fn decode_one(data: impl Into<Bytes>) -> Result<Self, DecodeError> {
        Decoder::decode(data, Decoder::capture_one)
    }

    /// Decodes the captured octets using the given closure.
    pub fn decode<F, T>(&self, op: F) -> Result<T, DecodeError>
    where F: FnOnce(&mut Decoder) -> Result<T, DecodeError> {
        Decoder::decode(self.0.clone(), op)
    }

    /// Returns the captured octets.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Returns a reference to the underlying bytes value.
    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }

    /// Converts the value into the underlying bytes value.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Returns the number of captured octets.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}


//--- AsRef

impl AsRef<[u8]> for Captured {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}


//--- Values

impl Values for Captured {
    fn encoded_len(&self) -> usize {
        self.0.len()
    }

    fn write_encoded(&self, target: &mut Vec<u8>) -> Result<(), EncodeError> {
        target.extend_from_slice(self.0.as_ref());
        Ok(())
    }
}


//--- Debug

impl fmt::Debug for Captured {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Captured(")?;
        for octet in self.0.iter() {
            write!(f, "{:02x}", octet)?;
        }
        f.write_str(")")
    }
}
