//! A signer atop the OpenSSL library.
//!
//! Because this adds a dependency to openssl libs this is only available
//! with the `softkeys` feature. It is meant for implementations that need
//! to use software keys to sign things, such as a small certification
//! authority or test setups. In particular, this is not required when
//! validating.

use std::io;
use std::sync::{Arc, RwLock};
use log::debug;
use openssl::rsa::Rsa;
use openssl::pkey::{PKey, Private};
use openssl::hash::MessageDigest;
use ring::rand;
use ring::rand::SecureRandom;
use slab::Slab;
use super::digest::DigestAlgorithm;
use super::keys::{PublicKey, PublicKeyFormat};
use super::signature::{Signature, SignatureAlgorithm};
use super::signer::{KeyError, Signer, SigningError};


//------------ OpenSslSigner -------------------------------------------------

/// An OpenSSL based signer.
///
/// Keeps the keys in memory. Identifiers of destroyed keys may be handed
/// out again for new keys.
pub struct OpenSslSigner {
    keys: RwLock<Slab<Arc<KeyPair>>>,
    rng: rand::SystemRandom,
}

impl OpenSslSigner {
    pub fn new() -> OpenSslSigner {
        OpenSslSigner {
            keys: Default::default(),
            rng: rand::SystemRandom::new(),
        }
    }

    /// Imports a private key in DER encoding.
    ///
    /// Both PKCS #8 and the traditional RSA format are accepted.
    pub fn key_from_der(&self, der: &[u8]) -> Result<KeyId, io::Error> {
        self.insert_key(KeyPair::from_der(der)?)
    }

    /// Imports a private key in PEM encoding.
    pub fn key_from_pem(&self, pem: &[u8]) -> Result<KeyId, io::Error> {
        self.insert_key(KeyPair::from_pem(pem)?)
    }

    fn insert_key(&self, key: KeyPair) -> Result<KeyId, io::Error> {
        let mut keys = self.keys.write().map_err(|_| poisoned())?;
        Ok(KeyId(keys.insert(key.into())))
    }

    fn get_key(&self, id: KeyId) -> Result<Arc<KeyPair>, KeyError<io::Error>> {
        let keys = self.keys.read().map_err(|_| poisoned())?;
        keys.get(id.0).cloned().ok_or(KeyError::KeyNotFound)
    }

    fn delete_key(&self, id: KeyId) -> Result<(), KeyError<io::Error>> {
        let mut keys = self.keys.write().map_err(|_| poisoned())?;
        if keys.contains(id.0) {
            keys.remove(id.0);
            Ok(())
        }
        else {
            Err(KeyError::KeyNotFound)
        }
    }
}

impl Signer for OpenSslSigner {
    type KeyId = KeyId;
    type Error = io::Error;

    fn create_key(
        &self, algorithm: PublicKeyFormat
    ) -> Result<Self::KeyId, Self::Error> {
        self.insert_key(KeyPair::new(algorithm)?)
    }

    fn get_key_info(
        &self,
        id: &Self::KeyId
    ) -> Result<PublicKey, KeyError<Self::Error>> {
        self.get_key(*id)?.get_key_info().map_err(KeyError::Signer)
    }

    fn destroy_key(
        &self, key: &Self::KeyId
    ) -> Result<(), KeyError<Self::Error>> {
        self.delete_key(*key)
    }

    fn sign<D: AsRef<[u8]> + ?Sized>(
        &self,
        key: &Self::KeyId,
        algorithm: SignatureAlgorithm,
        data: &D
    ) -> Result<Signature, SigningError<Self::Error>> {
        self.get_key(*key)?.sign(algorithm, data.as_ref())
    }

    fn sign_one_off<D: AsRef<[u8]> + ?Sized>(
        &self,
        algorithm: SignatureAlgorithm,
        data: &D
    ) -> Result<(Signature, PublicKey), Self::Error> {
        let key = KeyPair::new(PublicKeyFormat::RSA)?;
        let info = key.get_key_info()?;
        let sig = key.sign(algorithm, data.as_ref()).map_err(|err| {
            match err {
                SigningError::Signer(err) => err,
                err => io::Error::new(io::ErrorKind::Other, err.to_string())
            }
        })?;
        Ok((sig, info))
    }

    fn rand(&self, target: &mut [u8]) -> Result<(), Self::Error> {
        self.rng.fill(target).map_err(|_|
            io::Error::new(io::ErrorKind::Other, "rng error")
        )
    }
}


impl Default for OpenSslSigner {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "key store lock poisoned")
}


//------------ KeyId ---------------------------------------------------------

/// This signer’s key identifier.
//
//  We wrap this in a newtype so that people won’t start mucking about with
//  the integers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct KeyId(usize);


//------------ KeyPair -------------------------------------------------------

/// A key pair kept by the signer.
struct KeyPair(PKey<Private>);

impl KeyPair {
    fn new(_algorithm: PublicKeyFormat) -> Result<Self, io::Error> {
        let rsa = Rsa::generate(2048)?;
        let pkey = PKey::from_rsa(rsa)?;
        debug!("Generated new RSA key with {} bits.", pkey.bits());
        Ok(KeyPair(pkey))
    }

    fn from_der(der: &[u8]) -> Result<Self, io::Error> {
        let res = match PKey::private_key_from_der(der) {
            Ok(res) => res,
            Err(_) => PKey::from_rsa(Rsa::private_key_from_der(der)?)?,
        };
        Self::check(res)
    }

    fn from_pem(pem: &[u8]) -> Result<Self, io::Error> {
        Self::check(PKey::private_key_from_pem(pem)?)
    }

    fn check(key: PKey<Private>) -> Result<Self, io::Error> {
        if key.rsa().is_err() {
            return Err(io::Error::new(
                io::ErrorKind::Other, "not an RSA key"
            ))
        }
        if key.bits() < 2048 {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("invalid key length {}", key.bits())
            ))
        }
        Ok(KeyPair(key))
    }

    fn get_key_info(&self) -> Result<PublicKey, io::Error> {
        let rsa = self.0.rsa()?;
        PublicKey::from_rsa_components(
            &rsa.n().to_vec(), &rsa.e().to_vec()
        ).map_err(|err| {
            io::Error::new(io::ErrorKind::Other, err.to_string())
        })
    }

    fn sign(
        &self,
        algorithm: SignatureAlgorithm,
        data: &[u8]
    ) -> Result<Signature, SigningError<io::Error>> {
        let digest = match algorithm.digest() {
            DigestAlgorithm::Sha1 => MessageDigest::sha1(),
            DigestAlgorithm::Sha256 => MessageDigest::sha256(),
        };
        let mut signer = ::openssl::sign::Signer::new(digest, &self.0)
            .map_err(|err| SigningError::Signer(err.into()))?;
        signer.update(data).map_err(|err| SigningError::Signer(err.into()))?;
        let value = signer.sign_to_vec().map_err(|err| {
            SigningError::Signer(err.into())
        })?;
        Ok(Signature::new(algorithm, value.into()))
    }
}


//============ Tests =========================================================

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    fn info_sign_delete() {
        let s = OpenSslSigner::new();
        let ki = s.create_key(PublicKeyFormat::RSA).unwrap();
        let data = b"foobar";
        let info = s.get_key_info(&ki).unwrap();
        assert_eq!(info.key_size(), 2048);
        let sig = s.sign(&ki, SignatureAlgorithm::default(), data).unwrap();
        info.verify(data, &sig).unwrap();
        assert!(info.verify(b"foobaz", &sig).is_err());
        s.destroy_key(&ki).unwrap();
        assert!(matches!(s.get_key_info(&ki), Err(KeyError::KeyNotFound)));
        assert!(matches!(
            s.sign(&ki, SignatureAlgorithm::default(), data),
            Err(SigningError::KeyNotFound)
        ));
    }

    #[test]
    fn sha1_signature() {
        let s = OpenSslSigner::new();
        let ki = s.create_key(PublicKeyFormat::RSA).unwrap();
        let info = s.get_key_info(&ki).unwrap();
        let sig = s.sign(&ki, SignatureAlgorithm::rsa_sha1(), b"foo").unwrap();
        info.verify(b"foo", &sig).unwrap();
    }

    #[test]
    fn one_off() {
        let s = OpenSslSigner::new();
        let (sig, key) = s.sign_one_off(
            SignatureAlgorithm::default(),
            b"foobar"
        ).unwrap();
        key.verify(b"foobar", &sig).unwrap();
    }

    #[test]
    fn import_der() {
        let s = OpenSslSigner::new();
        let ki = s.key_from_der(
            include_bytes!("../../test-data/root.key.der")
        ).unwrap();
        assert_eq!(s.get_key_info(&ki).unwrap().key_size(), 2048);
        assert!(s.key_from_der(b"foo").is_err());
    }

    #[test]
    fn random() {
        let s = OpenSslSigner::new();
        let mut buf = [0u8; 32];
        s.rand(&mut buf).unwrap();
        assert_ne!(buf, [0u8; 32]);
    }
}
