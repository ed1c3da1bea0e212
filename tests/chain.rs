//! Building and verifying the chain of the test certificates.

use certkit::ErrorKind;
use certkit::chain::{
    build_chain, verify_trust, MemoryRepository, TrustError, TrustedRoots,
};
use certkit::x509::Cert;

const ROOT: &[u8] = include_bytes!("../test-data/root.der");
const INT: &[u8] = include_bytes!("../test-data/int.der");
const LEAF: &[u8] = include_bytes!("../test-data/leaf.der");

fn cert(data: &[u8]) -> Cert {
    Cert::decode(data.to_vec()).unwrap()
}

fn repository() -> MemoryRepository {
    vec![cert(INT), cert(ROOT)].into_iter().collect()
}

fn roots() -> TrustedRoots {
    Some(cert(ROOT)).into_iter().collect()
}

#[test]
fn root_is_self_signed() {
    let root = cert(ROOT);
    assert!(root.is_self_signed());
    assert!(build_chain(&root, &repository()).unwrap().is_empty());
}

#[test]
fn leaf_chain() {
    let chain = build_chain(&cert(LEAF), &repository()).unwrap();
    assert_eq!(chain.as_slice(), &[cert(INT), cert(ROOT)]);
    assert_eq!(verify_trust(&cert(LEAF), &chain, &roots()), Ok(()));
}

#[test]
fn validate_leaf() {
    let chain = certkit::validate(LEAF, &repository(), &roots()).unwrap();
    assert_eq!(chain.len(), 2);
    assert!(chain.root().unwrap().is_self_signed());
}

#[test]
fn flipped_tbs_byte() {
    let mut data = LEAF.to_vec();

    // Inside the subject’s organization name.
    data[190] ^= 0x01;
    let leaf = cert(&data);
    assert_eq!(
        leaf.subject().common_name(), cert(LEAF).subject().common_name()
    );

    // The issuer is unchanged, so we still find candidates but none of
    // them certified the changed certificate.
    let chain = [cert(INT), cert(ROOT)];
    assert_eq!(
        verify_trust(&leaf, &chain, &roots()),
        Err(TrustError::SignatureMismatch { depth: 0 })
    );
    assert_eq!(
        certkit::validate(data, &repository(), &roots()).unwrap_err().kind(),
        ErrorKind::ChainNotFound
    );
}

#[test]
fn unknown_root() {
    let err = certkit::validate(
        LEAF, &repository(), &TrustedRoots::new()
    ).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UntrustedRoot);
}
