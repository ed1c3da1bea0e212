//! Errors of the DER codec.

use std::{error, fmt};


//------------ DecodeError ---------------------------------------------------

/// Decoding DER data has failed.
///
/// The error keeps a static message describing the problem and, where
/// known, the offset into the data where the problem was encountered. The
/// offset is relative to the start of the outermost decoder.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodeError {
    kind: DecodeErrorKind,
    msg: &'static str,
    pos: Option<usize>,
}

/// The kind of a decoding error.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DecodeErrorKind {
    /// The data violates the encoding rules.
    ///
    /// This covers unexpected tags, truncated data, invalid length octets,
    /// trailing data, and content not matching the expected structure.
    Malformed,

    /// The data is validly encoded but uses a feature we don’t support.
    ///
    /// Examples are unknown algorithms or string types, or lengths beyond
    /// what this codec handles.
    Unsupported,
}

impl DecodeError {
    /// Creates a new error for malformed data.
    pub fn malformed(msg: &'static str) -> Self {
        DecodeError { kind: DecodeErrorKind::Malformed, msg, pos: None }
    }

    /// Creates a new error for unsupported data.
    pub fn unsupported(msg: &'static str) -> Self {
        DecodeError { kind: DecodeErrorKind::Unsupported, msg, pos: None }
    }

    /// Attaches a position to the error unless it already has one.
    pub fn at(mut self, pos: usize) -> Self {
        if self.pos.is_none() {
            self.pos = Some(pos)
        }
        self
    }

    /// Moves the position of the error by `offset`.
    ///
    /// An error without a position is placed at `offset`.
    pub(crate) fn shifted(mut self, offset: usize) -> Self {
        self.pos = Some(self.pos.unwrap_or(0) + offset);
        self
    }

    /// Returns the kind of the error.
    pub fn kind(&self) -> DecodeErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &'static str {
        self.msg
    }

    /// Returns the offset of the offending data if known.
    pub fn position(&self) -> Option<usize> {
        self.pos
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            DecodeErrorKind::Malformed => f.write_str("malformed data")?,
            DecodeErrorKind::Unsupported => f.write_str("unsupported data")?,
        }
        write!(f, ": {}", self.msg)?;
        if let Some(pos) = self.pos {
            write!(f, " at offset {}", pos)?;
        }
        Ok(())
    }
}

impl error::Error for DecodeError { }


//------------ EncodeError ---------------------------------------------------

/// A value could not be encoded.
///
/// The only reason this can currently happen is a value whose content is
/// too long to be expressed by the supported length forms.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EncodeError {
    len: usize,
}

impl EncodeError {
    pub(crate) fn length(len: usize) -> Self {
        EncodeError { len }
    }

    /// Returns the content length that could not be encoded.
    pub fn content_len(self) -> usize {
        self.len
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unsupported content length {}", self.len)
    }
}

impl error::Error for EncodeError { }
