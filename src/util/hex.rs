//! Converting from and to hex strings.


/// Encodes a octet sequence as an upper case hex string.
pub fn encode(src: &[u8]) -> String {
    let mut res = String::with_capacity(src.len() * 2);
    for &ch in src {
        res.push(char::from(DIGITS[usize::from(ch >> 4)]));
        res.push(char::from(DIGITS[usize::from(ch & 0x0F)]));
    }
    res
}

/// Decodes a hex string into an octet sequence.
///
/// Both upper and lower case digits are accepted. Returns `None` if the
/// string has an odd length or contains other characters.
pub fn decode(src: &str) -> Option<Vec<u8>> {
    let src = src.as_bytes();
    if src.len() % 2 != 0 {
        return None
    }
    src.chunks(2).map(|pair| {
        Some(digit(pair[0])? << 4 | digit(pair[1])?)
    }).collect()
}

fn digit(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None
    }
}

const DIGITS: &[u8] = b"0123456789ABCDEF";


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trip() {
        assert_eq!(encode(b"\x00\x1F\xAB"), "001FAB");
        assert_eq!(decode("001fAB"), Some(b"\x00\x1F\xAB".to_vec()));
        assert_eq!(decode("001"), None);
        assert_eq!(decode("0g"), None);
        assert_eq!(decode(""), Some(Vec::new()));
    }
}
