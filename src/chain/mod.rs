//! Certificate chains and their validation.
//!
//! The [`builder`] module finds the issuer certificates of a certificate
//! in a repository. The [`trust`] module checks that such a chain leads
//! to a trusted root.

pub use self::builder::{
    build_chain, CertificateRepository, Chain, ChainError, MemoryRepository,
};
pub use self::trust::{verify_trust, TrustError, TrustedRoots};

pub mod builder;
pub mod trust;
