#![no_main]

use libfuzzer_sys::fuzz_target;
use certkit::x509::{Cert, Csr, Name};

fuzz_target!(|data: &[u8]| {
    let (which, data) = match data.split_first() {
        Some((first, data)) => (*first, data),
        None => return,
    };

    match which % 3 {
        0 => {
            if let Ok(cert) = Cert::decode(data.to_vec()) {
                let _ = cert.is_self_signed();
            }
        }
        1 => {
            if let Ok(csr) = Csr::decode(data.to_vec()) {
                let _ = csr.verify_signature();
            }
        }
        2 => {
            if let Ok(name) = Name::decode(data.to_vec()) {
                assert_eq!(
                    name.to_captured().unwrap().as_slice(), data
                );
            }
        }
        _ => panic!("what?"),
    }
});
