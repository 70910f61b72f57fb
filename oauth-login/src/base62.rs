//! Compact base-62 encoding for session expiry timestamps.

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

pub fn encode(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(ALPHABET[(value % 62) as usize]);
        value /= 62;
    }
    digits.reverse();
    // Every byte comes from the ASCII alphabet above.
    digits.into_iter().map(char::from).collect()
}

/// Returns `None` for empty input, foreign characters or overflow.
pub fn decode(encoded: &str) -> Option<u64> {
    if encoded.is_empty() {
        return None;
    }

    encoded.bytes().try_fold(0_u64, |acc, byte| {
        let digit = ALPHABET.iter().position(|&c| c == byte)? as u64;
        acc.checked_mul(62)?.checked_add(digit)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(encode(0), "0");
        assert_eq!(encode(61), "z");
        assert_eq!(encode(62), "10");
        assert_eq!(encode(1_600_000_000), "1kHR5c");
    }

    #[test]
    fn test_decode_inverts_encode() {
        for value in [1_u64, 86_400, 1_700_000_000, u64::MAX] {
            assert_eq!(decode(&encode(value)), Some(value));
        }
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("ab-c"), None);
        assert_eq!(decode("zzzzzzzzzzzzzzzzzzzzzz"), None);
    }
}
