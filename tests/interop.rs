//! Checks our encodings against an independent DER implementation.

use bcder::{BitString, Mode, Oid};
use bcder::decode::Constructed;
use bcder::encode::{self, PrimitiveContent, Values};
use bytes::Bytes;
use certkit::der::{Decoder, Unsigned};
use certkit::x509::{Cert, Name, NameAttribute};

const ROOT: &[u8] = include_bytes!("../test-data/root.der");

#[test]
fn certificate_structure() {
    let cert = Cert::decode(ROOT).unwrap();
    let (tbs, alg) = Constructed::decode(ROOT, Mode::Der, |cons| {
        cons.take_sequence(|cons| {
            let tbs = cons.take_sequence(|cons| cons.capture_all())?;
            let alg = cons.take_sequence(|cons| {
                let oid = Oid::take_from(cons)?;
                cons.skip_all()?;
                Ok(oid)
            })?;
            BitString::take_from(cons)?;
            Ok((tbs, alg))
        })
    }).unwrap();
    // bcder captured the content, we keep the header, too.
    assert_eq!(
        tbs.as_slice(), &cert.signed_data().data().as_slice()[4..]
    );
    assert_eq!(
        alg.as_ref(),
        cert.signature().algorithm().oid().as_slice()
    );
}

#[test]
fn fresh_name() {
    let mut name = Name::from_common_name("Interop Test");
    name.set(NameAttribute::Country, "CH");
    name.set(NameAttribute::EmailAddress, "test@example.com");
    let data = name.to_captured().unwrap().into_bytes();

    let count = Constructed::decode(data.as_ref(), Mode::Der, |cons| {
        cons.take_sequence(|cons| {
            let mut count = 0;
            while let Some(()) = cons.take_opt_set(|cons| {
                cons.take_sequence(|cons| {
                    Oid::take_from(cons)?;
                    cons.skip_all()
                })
            })? {
                count += 1;
            }
            Ok(count)
        })
    }).unwrap();
    assert_eq!(count, 3);
}

#[test]
fn foreign_values() {
    let data = encode::sequence((
        Oid(Bytes::from_static(&[85, 4, 3])).encode(),
        0x80u8.encode(),
    )).to_captured(Mode::Der);

    let (oid, int) = Decoder::decode(data.as_slice().to_vec(), |cons| {
        cons.take_sequence(|cons| {
            let oid = certkit::asn1::Oid::take_from(cons)?;
            let int = Unsigned::take_from(cons)?;
            Ok((oid, int))
        })
    }).unwrap();
    assert_eq!(oid, certkit::oid::AT_COMMON_NAME);
    assert_eq!(int.as_slice(), b"\x80");
}
