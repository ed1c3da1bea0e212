//! Various useful things.

#[cfg(feature = "serde")] pub mod base64;
pub mod hex;
