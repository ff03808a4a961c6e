/// Errors produced when parsing hex strings.
#[derive(Debug, thiserror::Error)]
pub enum HexError {
    /// The string did not start with the mandatory `0x` prefix.
    #[error("missing 0x prefix")]
    MissingPrefix,

    /// The string contained a non-hexadecimal character.
    #[error("invalid hex digit")]
    InvalidDigit,

    /// The string had an odd number of hex digits.
    #[error("odd number of hex digits")]
    OddLength,

    /// The decoded payload did not have the expected byte length.
    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required decoded length.
        expected: usize,
        /// Observed decoded length.
        actual: usize,
    },
}

/// Decodes a `0x`-prefixed hex string into bytes.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, HexError> {
    let body = text.strip_prefix("0x").ok_or(HexError::MissingPrefix)?;

    if body.len() % 2 != 0 {
        return Err(HexError::OddLength);
    }

    body.as_bytes()
        .chunks(2)
        .map(|pair| {
            let hi = hex_digit(pair[0])?;
            let lo = hex_digit(pair[1])?;
            Ok(hi << 4 | lo)
        })
        .collect()
}

/// Decodes a `0x`-prefixed hex string into a fixed-size byte array.
pub fn decode_hex_array<const N: usize>(text: &str) -> Result<[u8; N], HexError> {
    let bytes = decode_hex(text)?;

    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| HexError::InvalidLength { expected: N, actual: bytes.len() })
}

/// Encodes bytes as a lowercase `0x`-prefixed hex string.
pub fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    out.push_str(&encode_hex_bare(bytes));
    out
}

pub(crate) fn encode_hex_bare(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";

    let mut out = String::with_capacity(bytes.len() * 2);

    for &b in bytes {
        out.push(DIGITS[(b >> 4) as usize] as char);
        out.push(DIGITS[(b & 0x0f) as usize] as char);
    }

    out
}

fn hex_digit(c: u8) -> Result<u8, HexError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(HexError::InvalidDigit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_and_rejects_malformed_input() {
        assert_eq!(decode_hex("0x").unwrap(), Vec::<u8>::new());
        assert_eq!(decode_hex("0xdeadBEEF").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(encode_hex(&[0xde, 0xad, 0xbe, 0xef]), "0xdeadbeef");

        assert!(matches!(decode_hex("deadbeef"), Err(HexError::MissingPrefix)));
        assert!(matches!(decode_hex("0xabc"), Err(HexError::OddLength)));
        assert!(matches!(decode_hex("0xzz"), Err(HexError::InvalidDigit)));
        assert!(matches!(
            decode_hex_array::<20>("0x00"),
            Err(HexError::InvalidLength { expected: 20, actual: 1 })
        ));
    }
}
