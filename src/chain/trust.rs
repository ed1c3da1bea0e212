//! Verifying that a chain leads to a trusted root.

use std::{error, fmt, slice};
use std::iter::FromIterator;
use log::debug;
use crate::x509::Cert;


//------------ TrustedRoots --------------------------------------------------

/// The set of root certificates that are trusted.
///
/// The set is typically loaded once and then only read.
#[derive(Clone, Debug, Default)]
pub struct TrustedRoots {
    roots: Vec<Cert>,
}

impl TrustedRoots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a root certificate to the set.
    ///
    /// Adding a certificate that is already present does nothing.
    pub fn add(&mut self, cert: Cert) {
        if !self.contains(&cert) {
            self.roots.push(cert)
        }
    }

    /// Returns whether the exact certificate is in the set.
    pub fn contains(&self, cert: &Cert) -> bool {
        self.roots.iter().any(|root| root == cert)
    }

    /// Returns the first trusted root that certified `cert`.
    pub fn find_issuer(&self, cert: &Cert) -> Option<&Cert> {
        self.roots.iter().find(|root| cert.certified_by(root))
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<Cert> {
        self.roots.iter()
    }
}

impl FromIterator<Cert> for TrustedRoots {
    fn from_iter<I: IntoIterator<Item = Cert>>(iter: I) -> Self {
        let mut res = TrustedRoots::new();
        res.extend(iter);
        res
    }
}

impl Extend<Cert> for TrustedRoots {
    fn extend<I: IntoIterator<Item = Cert>>(&mut self, iter: I) {
        iter.into_iter().for_each(|cert| self.add(cert))
    }
}


//------------ verify_trust --------------------------------------------------

/// Verifies that `cert` is trusted through `chain`.
///
/// Each certificate of `cert` followed by `chain` has to be certified by
/// the next one. The check stops at the first one that isn’t. The last
/// certificate has to be certified by one of the `roots`.
pub fn verify_trust(
    cert: &Cert, chain: &[Cert], roots: &TrustedRoots
) -> Result<(), TrustError> {
    let mut current = cert;
    for (depth, next) in chain.iter().enumerate() {
        if let Err(err) = current.verify_issued_by(next) {
            debug!(
                "Certificate '{}' at depth {} not issued by '{}': {}",
                current.subject(), depth, next.subject(), err
            );
            return Err(TrustError::SignatureMismatch { depth })
        }
        current = next;
    }
    match roots.find_issuer(current) {
        Some(root) => {
            debug!(
                "Certificate '{}' trusted through root '{}'.",
                cert.subject(), root.subject()
            );
            Ok(())
        }
        None => {
            debug!(
                "No trusted root for certificate '{}'.", current.subject()
            );
            Err(TrustError::UntrustedRoot)
        }
    }
}


//------------ TrustError ----------------------------------------------------

/// A certificate isn’t trusted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrustError {
    /// A certificate wasn’t certified by the next one in the chain.
    ///
    /// The depth is the position of the certificate where zero is the
    /// certificate itself and one the first element of the chain.
    SignatureMismatch { depth: usize },

    /// The end of the chain isn’t certified by any trusted root.
    UntrustedRoot,
}

impl fmt::Display for TrustError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TrustError::SignatureMismatch { depth } => {
                write!(f, "signature mismatch at depth {}", depth)
            }
            TrustError::UntrustedRoot => f.write_str("untrusted root"),
        }
    }
}

impl error::Error for TrustError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    const ROOT: &[u8] = include_bytes!("../../test-data/root.der");
    const INT: &[u8] = include_bytes!("../../test-data/int.der");
    const LEAF: &[u8] = include_bytes!("../../test-data/leaf.der");
    const LEAF_SHA1: &[u8] = include_bytes!("../../test-data/leaf-sha1.der");

    fn cert(data: &'static [u8]) -> Cert {
        Cert::decode(data).unwrap()
    }

    #[test]
    fn trusted() {
        let roots: TrustedRoots = Some(cert(ROOT)).into_iter().collect();
        let chain = [cert(INT), cert(ROOT)];
        assert_eq!(verify_trust(&cert(LEAF), &chain, &roots), Ok(()));
        assert_eq!(verify_trust(&cert(LEAF_SHA1), &chain, &roots), Ok(()));
        assert_eq!(verify_trust(&cert(INT), &chain[1..], &roots), Ok(()));
        assert_eq!(verify_trust(&cert(ROOT), &[], &roots), Ok(()));

        // A chain ending below the root is fine, too.
        assert_eq!(verify_trust(&cert(LEAF), &chain[..1], &roots), Ok(()));
    }

    #[test]
    fn untrusted() {
        let chain = [cert(INT), cert(ROOT)];
        assert_eq!(
            verify_trust(&cert(LEAF), &chain, &TrustedRoots::new()),
            Err(TrustError::UntrustedRoot)
        );
        let roots: TrustedRoots = Some(cert(INT)).into_iter().collect();
        assert_eq!(
            verify_trust(&cert(LEAF), &chain, &roots),
            Err(TrustError::UntrustedRoot)
        );
    }

    #[test]
    fn broken_chain() {
        let roots: TrustedRoots = Some(cert(ROOT)).into_iter().collect();
        assert_eq!(
            verify_trust(&cert(LEAF), &[cert(ROOT)], &roots),
            Err(TrustError::SignatureMismatch { depth: 0 })
        );
        assert_eq!(
            verify_trust(&cert(LEAF), &[cert(INT), cert(INT)], &roots),
            Err(TrustError::SignatureMismatch { depth: 1 })
        );
    }

    #[test]
    fn roots_are_a_set() {
        let mut roots = TrustedRoots::new();
        roots.add(cert(ROOT));
        roots.add(cert(ROOT));
        roots.extend(vec![cert(INT), cert(ROOT)]);
        assert_eq!(roots.len(), 2);
        assert!(roots.contains(&cert(INT)));
        assert!(!roots.contains(&cert(LEAF)));
        assert_eq!(roots.find_issuer(&cert(INT)), Some(&cert(ROOT)));
        assert_eq!(roots.find_issuer(&cert(ROOT)), Some(&cert(ROOT)));
        assert_eq!(roots.find_issuer(&cert(LEAF)), Some(&cert(INT)));
    }
}
