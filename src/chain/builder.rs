//! Building certificate chains.
//!
//! A chain leads from a certificate to a self-signed certificate through
//! issuer certificates found in a [`CertificateRepository`]. Issuers are
//! looked up by the common name of the issuer name and accepted if they
//! actually certified the certificate. If there are several ways to reach
//! a self-signed certificate, the longest one is used.

use std::{error, fmt, ops, slice, vec};
use std::collections::HashSet;
use std::iter::FromIterator;
use log::{debug, trace, warn};
use crate::crypto::DigestAlgorithm;
use crate::x509::Cert;


//------------ CertificateRepository -----------------------------------------

/// A source of certificates.
pub trait CertificateRepository {
    /// An operational error happened in the repository.
    type Error: fmt::Debug + fmt::Display;

    /// Returns all certificates whose subject has the given common name.
    ///
    /// If there are no such certificates, returns an empty vec.
    fn find_by_subject_common_name(
        &self, name: &str
    ) -> Result<Vec<Cert>, Self::Error>;
}

impl<'a, T: CertificateRepository + ?Sized> CertificateRepository for &'a T {
    type Error = T::Error;

    fn find_by_subject_common_name(
        &self, name: &str
    ) -> Result<Vec<Cert>, Self::Error> {
        (*self).find_by_subject_common_name(name)
    }
}


//------------ MemoryRepository ----------------------------------------------

/// A certificate repository keeping all certificates in memory.
///
/// Certificates are returned in the order they were added.
#[derive(Clone, Debug, Default)]
pub struct MemoryRepository {
    certs: Vec<Cert>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a certificate to the repository.
    pub fn add(&mut self, cert: Cert) {
        self.certs.push(cert)
    }

    pub fn len(&self) -> usize {
        self.certs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<Cert> {
        self.certs.iter()
    }
}

impl CertificateRepository for MemoryRepository {
    type Error = std::convert::Infallible;

    fn find_by_subject_common_name(
        &self, name: &str
    ) -> Result<Vec<Cert>, Self::Error> {
        Ok(self.certs.iter().filter(|cert| {
            cert.subject().common_name() == Some(name)
        }).cloned().collect())
    }
}

impl FromIterator<Cert> for MemoryRepository {
    fn from_iter<I: IntoIterator<Item = Cert>>(iter: I) -> Self {
        MemoryRepository { certs: iter.into_iter().collect() }
    }
}

impl Extend<Cert> for MemoryRepository {
    fn extend<I: IntoIterator<Item = Cert>>(&mut self, iter: I) {
        self.certs.extend(iter)
    }
}


//------------ Chain ---------------------------------------------------------

/// The issuer certificates of a certificate.
///
/// The chain starts with the certificate that issued the certificate the
/// chain was built for and ends with a self-signed certificate. It does
/// not contain the certificate itself. The chain of a self-signed
/// certificate is empty.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Chain {
    certs: Vec<Cert>,
}

impl Chain {
    /// Creates a chain from a vec of certificates, nearest issuer first.
    pub fn new(certs: Vec<Cert>) -> Self {
        Chain { certs }
    }

    /// Returns the certificate that issued the certificate.
    pub fn issuer(&self) -> Option<&Cert> {
        self.certs.first()
    }

    /// Returns the last certificate of the chain.
    pub fn root(&self) -> Option<&Cert> {
        self.certs.last()
    }

    pub fn as_slice(&self) -> &[Cert] {
        self.certs.as_slice()
    }

    pub fn into_vec(self) -> Vec<Cert> {
        self.certs
    }
}

impl ops::Deref for Chain {
    type Target = [Cert];

    fn deref(&self) -> &[Cert] {
        self.as_slice()
    }
}

impl AsRef<[Cert]> for Chain {
    fn as_ref(&self) -> &[Cert] {
        self.as_slice()
    }
}

impl IntoIterator for Chain {
    type Item = Cert;
    type IntoIter = vec::IntoIter<Cert>;

    fn into_iter(self) -> Self::IntoIter {
        self.certs.into_iter()
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Cert;
    type IntoIter = slice::Iter<'a, Cert>;

    fn into_iter(self) -> Self::IntoIter {
        self.certs.iter()
    }
}


//------------ build_chain ---------------------------------------------------

/// Builds the chain of issuer certificates for `cert`.
///
/// If `cert` is self-signed, the chain is empty. Otherwise all certificates
/// in `repository` that have the common name of the issuer of `cert` as
/// their subject’s common name and certified `cert` are candidates. The
/// chain of each candidate is built in turn. The candidate with the
/// longest chain wins. If there are several, the one returned first by
/// the repository is used.
///
/// A certificate is never used twice in a chain, so cyclic issuer
/// relations end the search on that path.
///
/// Fails with `ChainError::NotFound` if no chain ending in a self-signed
/// certificate exists and with `ChainError::Repository` if the repository
/// failed.
pub fn build_chain<R: CertificateRepository + ?Sized>(
    cert: &Cert, repository: &R,
) -> Result<Chain, ChainError<R::Error>> {
    let mut visited = HashSet::new();
    visited.insert(fingerprint(cert));
    match search(cert, repository, &mut visited)? {
        Some(certs) => Ok(Chain::new(certs)),
        None => {
            debug!("No chain found for certificate '{}'.", cert.subject());
            Err(ChainError::NotFound)
        }
    }
}

/// Searches the longest chain for `cert`.
///
/// The fingerprints of all certificates on the current path are in
/// `visited`.
fn search<R: CertificateRepository + ?Sized>(
    cert: &Cert,
    repository: &R,
    visited: &mut HashSet<Vec<u8>>,
) -> Result<Option<Vec<Cert>>, ChainError<R::Error>> {
    if cert.is_self_signed() {
        trace!("Certificate '{}' is self-signed.", cert.subject());
        return Ok(Some(Vec::new()))
    }
    let name = match cert.issuer().common_name() {
        Some(name) => name,
        None => {
            debug!(
                "Certificate '{}' has no issuer common name.",
                cert.subject()
            );
            return Ok(None)
        }
    };
    let candidates = match repository.find_by_subject_common_name(name) {
        Ok(candidates) => candidates,
        Err(err) => {
            warn!("Failed to look up issuer '{}': {}", name, err);
            return Err(ChainError::Repository(err))
        }
    };
    trace!(
        "Found {} candidate(s) for issuer '{}'.", candidates.len(), name
    );

    let mut best: Option<Vec<Cert>> = None;
    for candidate in candidates {
        if let Err(err) = cert.verify_issued_by(&candidate) {
            debug!(
                "Rejecting candidate '{}' for '{}': {}",
                candidate.subject(), cert.subject(), err
            );
            continue
        }
        let print = fingerprint(&candidate);
        if visited.contains(&print) {
            debug!(
                "Candidate '{}' already on the path, skipping.",
                candidate.subject()
            );
            continue
        }
        visited.insert(print.clone());
        let sub = search(&candidate, repository, visited);
        visited.remove(&print);
        let sub = match sub? {
            Some(sub) => sub,
            None => continue
        };
        // best includes its first certificate, sub doesn’t. Ties keep
        // the chain found first.
        let longer = match best {
            Some(ref best) => sub.len() + 1 > best.len(),
            None => true,
        };
        if longer {
            let mut chain = Vec::with_capacity(sub.len() + 1);
            chain.push(candidate);
            chain.extend(sub);
            best = Some(chain);
        }
    }
    Ok(best)
}

fn fingerprint(cert: &Cert) -> Vec<u8> {
    cert.fingerprint(DigestAlgorithm::Sha256).as_ref().to_vec()
}


//------------ ChainError ----------------------------------------------------

/// Building a chain failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChainError<E> {
    /// No chain ending in a self-signed certificate could be found.
    NotFound,

    /// The repository failed to look up certificates.
    Repository(E),
}

impl<E: fmt::Display> fmt::Display for ChainError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ChainError::NotFound => f.write_str("certificate chain not found"),
            ChainError::Repository(ref err) => {
                write!(f, "repository failure: {}", err)
            }
        }
    }
}

impl<E: fmt::Debug + fmt::Display> error::Error for ChainError<E> { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn root() -> Cert {
        Cert::decode(
            include_bytes!("../../test-data/root.der").as_ref()
        ).unwrap()
    }

    fn int() -> Cert {
        Cert::decode(
            include_bytes!("../../test-data/int.der").as_ref()
        ).unwrap()
    }

    fn leaf() -> Cert {
        Cert::decode(
            include_bytes!("../../test-data/leaf.der").as_ref()
        ).unwrap()
    }

    struct FailingRepository;

    impl CertificateRepository for FailingRepository {
        type Error = &'static str;

        fn find_by_subject_common_name(
            &self, _name: &str
        ) -> Result<Vec<Cert>, Self::Error> {
            Err("offline")
        }
    }

    #[test]
    fn self_signed_is_empty() {
        let chain = build_chain(&root(), &MemoryRepository::new()).unwrap();
        assert!(chain.is_empty());
        assert!(chain.issuer().is_none());

        // The repository isn’t even asked.
        assert!(build_chain(&root(), &FailingRepository).unwrap().is_empty());
    }

    #[test]
    fn full_chain() {
        let repo: MemoryRepository = vec![root(), int()].into_iter().collect();
        let chain = build_chain(&leaf(), &repo).unwrap();
        assert_eq!(chain.as_slice(), &[int(), root()]);
        assert_eq!(chain.issuer(), Some(&int()));
        assert_eq!(chain.root(), Some(&root()));

        let chain = build_chain(&int(), &repo).unwrap();
        assert_eq!(chain.into_vec(), vec![root()]);
    }

    /// A repository answering every lookup with all its certificates.
    struct Everything(Vec<Cert>);

    impl CertificateRepository for Everything {
        type Error = std::convert::Infallible;

        fn find_by_subject_common_name(
            &self, _name: &str
        ) -> Result<Vec<Cert>, Self::Error> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn candidates_must_certify() {
        let repo = Everything(vec![leaf(), root()]);
        assert_eq!(build_chain(&leaf(), &repo), Err(ChainError::NotFound));

        let repo = Everything(vec![leaf(), root(), int()]);
        assert_eq!(
            build_chain(&leaf(), &repo).unwrap().as_slice(), &[int(), root()]
        );
    }

    #[test]
    fn missing_root() {
        let repo: MemoryRepository = Some(int()).into_iter().collect();
        assert_eq!(build_chain(&leaf(), &repo), Err(ChainError::NotFound));
    }

    #[test]
    fn repository_failure() {
        assert_eq!(
            build_chain(&leaf(), &FailingRepository),
            Err(ChainError::Repository("offline"))
        );
    }
}
