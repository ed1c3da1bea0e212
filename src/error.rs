//! The crate-wide error type and the all-in-one validation.
//!
//! Each module has its own error types. [`Error`] collects all of them for
//! callers that just want to know what kind of problem happened.

use std::{error, fmt};
use bytes::Bytes;
use crate::chain::{
    build_chain, verify_trust, CertificateRepository, Chain, ChainError,
    TrustError, TrustedRoots,
};
use crate::crypto::VerificationError;
use crate::der::{DecodeError, DecodeErrorKind};
use crate::x509::{Cert, IssuerError};


//------------ validate ------------------------------------------------------

/// Decodes a certificate, builds its chain, and checks that it is trusted.
///
/// Returns the chain if everything is fine.
pub fn validate<R: CertificateRepository + ?Sized>(
    der: impl Into<Bytes>,
    repository: &R,
    roots: &TrustedRoots,
) -> Result<Chain, Error> {
    let cert = Cert::decode(der)?;
    let chain = build_chain(&cert, repository)?;
    verify_trust(&cert, &chain, roots)?;
    Ok(chain)
}


//------------ ErrorKind -----------------------------------------------------

/// The kind of problem that happened.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// Data violated the encoding rules.
    MalformedEncoding,

    /// Data used a feature that isn’t supported.
    UnsupportedValue,

    /// A signature didn’t verify.
    SignatureMismatch,

    /// No certificate chain could be built.
    ChainNotFound,

    /// A chain didn’t end at a trusted root.
    UntrustedRoot,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            ErrorKind::MalformedEncoding => "malformed encoding",
            ErrorKind::UnsupportedValue => "unsupported value",
            ErrorKind::SignatureMismatch => "signature mismatch",
            ErrorKind::ChainNotFound => "chain not found",
            ErrorKind::UntrustedRoot => "untrusted root",
        })
    }
}


//------------ Error ---------------------------------------------------------

/// Any error that can happen in this crate.
#[derive(Clone, Debug)]
pub enum Error {
    Decode(DecodeError),
    Verification(VerificationError),
    Issuer(IssuerError),
    ChainNotFound,

    /// The certificate repository failed, with its error message.
    Repository(String),
    Trust(TrustError),
}

impl Error {
    /// Returns the kind of the error.
    pub fn kind(&self) -> ErrorKind {
        match *self {
            Error::Decode(ref err) => match err.kind() {
                DecodeErrorKind::Malformed => ErrorKind::MalformedEncoding,
                DecodeErrorKind::Unsupported => ErrorKind::UnsupportedValue,
            },
            Error::Verification(_) | Error::Issuer(_) => {
                ErrorKind::SignatureMismatch
            }
            Error::ChainNotFound | Error::Repository(_) => {
                ErrorKind::ChainNotFound
            }
            Error::Trust(TrustError::SignatureMismatch { .. }) => {
                ErrorKind::SignatureMismatch
            }
            Error::Trust(TrustError::UntrustedRoot) => {
                ErrorKind::UntrustedRoot
            }
        }
    }
}

impl From<DecodeError> for Error {
    fn from(err: DecodeError) -> Self {
        Error::Decode(err)
    }
}

impl From<VerificationError> for Error {
    fn from(err: VerificationError) -> Self {
        Error::Verification(err)
    }
}

impl From<IssuerError> for Error {
    fn from(err: IssuerError) -> Self {
        Error::Issuer(err)
    }
}

impl<E: fmt::Display> From<ChainError<E>> for Error {
    fn from(err: ChainError<E>) -> Self {
        match err {
            ChainError::NotFound => Error::ChainNotFound,
            ChainError::Repository(err) => Error::Repository(err.to_string()),
        }
    }
}

impl From<TrustError> for Error {
    fn from(err: TrustError) -> Self {
        Error::Trust(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Decode(ref err) => err.fmt(f),
            Error::Verification(ref err) => err.fmt(f),
            Error::Issuer(ref err) => err.fmt(f),
            Error::ChainNotFound => f.write_str("certificate chain not found"),
            Error::Repository(ref err) => {
                write!(f, "repository failure: {}", err)
            }
            Error::Trust(ref err) => err.fmt(f),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Decode(ref err) => Some(err),
            Error::Verification(ref err) => Some(err),
            Error::Issuer(ref err) => Some(err),
            Error::Trust(ref err) => Some(err),
            _ => None
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::chain::MemoryRepository;

    const ROOT: &[u8] = include_bytes!("../test-data/root.der");
    const INT: &[u8] = include_bytes!("../test-data/int.der");
    const LEAF: &[u8] = include_bytes!("../test-data/leaf.der");

    fn setup() -> (MemoryRepository, TrustedRoots) {
        let root = Cert::decode(ROOT).unwrap();
        let int = Cert::decode(INT).unwrap();
        (
            vec![int, root.clone()].into_iter().collect(),
            Some(root).into_iter().collect(),
        )
    }

    #[test]
    fn validate_leaf() {
        let (repo, roots) = setup();
        let chain = validate(LEAF, &repo, &roots).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(
            chain[0].subject().common_name(), Some("Example Intermediate CA")
        );
    }

    #[test]
    fn error_kinds() {
        let (repo, roots) = setup();
        assert_eq!(
            validate(&LEAF[..LEAF.len() - 1], &repo, &roots).unwrap_err()
                .kind(),
            ErrorKind::MalformedEncoding
        );
        assert_eq!(
            validate(LEAF, &MemoryRepository::new(), &roots).unwrap_err()
                .kind(),
            ErrorKind::ChainNotFound
        );
        assert_eq!(
            validate(LEAF, &repo, &TrustedRoots::new()).unwrap_err().kind(),
            ErrorKind::UntrustedRoot
        );
        assert_eq!(
            Error::from(IssuerError::InvalidSignature).kind(),
            ErrorKind::SignatureMismatch
        );
        assert_eq!(
            Error::from(TrustError::SignatureMismatch { depth: 1 }).kind(),
            ErrorKind::SignatureMismatch
        );
        assert_eq!(
            Error::from(ChainError::Repository("offline")).to_string(),
            "repository failure: offline"
        );
    }
}
