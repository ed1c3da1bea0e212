//! The object identifiers used in this crate.
//!
//! This module collects all the object indentifiers used at various places
//! in this crate in one central place. They are public so you can refer to
//! them should that ever become necessary.

use crate::asn1::{ConstOid, Oid};


//------------ Algorithms ----------------------------------------------------

/// [RFC 3279](https://tools.ietf.org/html/rfc3279) `id-sha1`
///
/// Identifies the SHA-1 one-way hash function.
pub const SHA1: ConstOid = Oid(&[43, 14, 3, 2, 26]);

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `id-sha256`
///
/// Identifies the SHA-256 one-way hash function.
pub const SHA256: ConstOid
    = Oid(&[96, 134, 72, 1, 101, 3, 4, 2, 1]);

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `rsaEncryption`
///
/// Identifies an RSA public key with no limitation to either RSASSA-PSS or
/// RSAES-OEAP.
pub const RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 1]);

/// [RFC 3279](https://tools.ietf.org/html/rfc3279) `sha1WithRSAEncryption`
///
/// Identifies the PKCS #1 version 1.5 signature algorithm with SHA-1.
pub const SHA1_WITH_RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 5]);

/// [RFC 4055](https://tools.ietf.org/html/rfc4055) `sha256WithRSAEncryption`
///
/// Identifies the PKCS #1 version 1.5 signature algorithm with SHA-256.
pub const SHA256_WITH_RSA_ENCRYPTION: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 11]);


//------------ Name Attributes -----------------------------------------------

pub const AT_COMMON_NAME: ConstOid = Oid(&[85, 4, 3]); // 2 5 4 3
pub const AT_COUNTRY_NAME: ConstOid = Oid(&[85, 4, 6]); // 2 5 4 6
pub const AT_LOCALITY_NAME: ConstOid = Oid(&[85, 4, 7]); // 2 5 4 7
pub const AT_STATE_OR_PROVINCE_NAME: ConstOid
    = Oid(&[85, 4, 8]); // 2 5 4 8
pub const AT_ORGANIZATION_NAME: ConstOid = Oid(&[85, 4, 10]); // 2 5 4 10
pub const AT_ORGANIZATIONAL_UNIT_NAME: ConstOid
    = Oid(&[85, 4, 11]); // 2 5 4 11

/// [RFC 2985](https://tools.ietf.org/html/rfc2985) `pkcs-9-at-emailAddress`
pub const EMAIL_ADDRESS: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 1]);

/// [RFC 2985](https://tools.ietf.org/html/rfc2985)
/// `pkcs-9-at-extensionRequest`
pub const EXTENSION_REQUEST: ConstOid
    = Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 14]);


//------------ Certificate Extensions ----------------------------------------

pub const CE_AUTHORITY_KEY_IDENTIFIER: ConstOid = Oid(&[85, 29, 35]);
pub const CE_BASIC_CONSTRAINTS: ConstOid = Oid(&[85, 29, 19]);
pub const CE_EXTENDED_KEY_USAGE: ConstOid = Oid(&[85, 29, 37]);
pub const CE_KEY_USAGE: ConstOid = Oid(&[85, 29, 15]);
pub const CE_SUBJECT_KEY_IDENTIFIER: ConstOid = Oid(&[85, 29, 14]);


//------------ Key Purposes --------------------------------------------------

pub const KP_SERVER_AUTH: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 3, 1]);
pub const KP_CLIENT_AUTH: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 3, 2]);
pub const KP_CODE_SIGNING: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 3, 3]);
pub const KP_EMAIL_PROTECTION: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 3, 4]);
pub const KP_TIME_STAMPING: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 3, 8]);
pub const KP_OCSP_SIGNING: ConstOid = Oid(&[43, 6, 1, 5, 5, 7, 3, 9]);


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dotted() {
        assert_eq!(SHA1.to_string(), "1.3.14.3.2.26");
        assert_eq!(SHA256.to_string(), "2.16.840.1.101.3.4.2.1");
        assert_eq!(EMAIL_ADDRESS.to_string(), "1.2.840.113549.1.9.1");
        assert_eq!(EXTENSION_REQUEST.to_string(), "1.2.840.113549.1.9.14");
        assert_eq!(CE_KEY_USAGE.to_string(), "2.5.29.15");
        assert_eq!(KP_OCSP_SIGNING.to_string(), "1.3.6.1.5.5.7.3.9");
    }
}
