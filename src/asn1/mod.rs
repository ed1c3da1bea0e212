//! ASN.1 value types.
//!
//! These types sit atop the [DER codec](crate::der) and provide decoding
//! and encoding for the universal types used by certificates and
//! certification requests.

pub use self::bitstring::BitString;
pub use self::oid::{Arcs, ConstOid, InvalidOid, Oid};
pub use self::string::{AsnString, StringEncoding};
pub use self::time::{GeneralizedTime, Time, UtcTime};
pub use crate::der::Unsigned;

mod bitstring;
mod oid;
mod string;
mod time;
