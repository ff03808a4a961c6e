//! Low-level utilities shared across the safe-history workspace.
//!
//! This crate provides the byte-level primitives the rest of the system is
//! built on: keccak-256 hashing, EIP-55 address checksum encoding, strict
//! `0x`-prefixed hex parsing, and the 32-byte ABI word encoding used both by
//! the transaction hashing scheme and by the ledger gateway's contract calls.

mod abi;
mod hex;

pub use self::{
    abi::{address_word, function_selector, u256_word},
    hex::{HexError, decode_hex, decode_hex_array, encode_hex},
};

use primitive_types::U256;
use sha3::{Digest, Keccak256};

/// Computes the keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Renders a 20-byte address in its EIP-55 checksummed textual form.
///
/// Each hex letter is uppercased when the corresponding nibble of
/// `keccak256(lowercase_hex)` is at least 8.
pub fn eip55_checksum(address: &[u8; 20]) -> String {
    let lower = hex::encode_hex_bare(address);
    let digest = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");

    for (i, c) in lower.chars().enumerate() {
        let nibble = (digest[i / 2] >> (4 * (1 - i % 2))) & 0x0f;

        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// Whether `text` is a canonically-cased rendering of `address`.
///
/// Accepts all-lowercase, all-uppercase, and the exact EIP-55 mixed-case
/// form; any other mixed-case string fails the checksum.
pub fn eip55_case_valid(text: &str, address: &[u8; 20]) -> bool {
    let body = text.strip_prefix("0x").unwrap_or(text);

    let all_lower = !body.chars().any(|c| c.is_ascii_uppercase());
    let all_upper = !body.chars().any(|c| c.is_ascii_lowercase());

    if all_lower || all_upper {
        return true;
    }

    eip55_checksum(address)[2..] == *body
}

/// Errors produced by [`U256`] conversions.
#[derive(Debug, thiserror::Error)]
pub enum U256Error {
    /// The decimal string did not parse as an unsigned 256-bit integer.
    #[error("invalid unsigned 256-bit decimal integer")]
    InvalidDecimal,
}

/// Parses a decimal string into a [`U256`].
pub fn u256_from_dec(text: &str) -> Result<U256, U256Error> {
    U256::from_dec_str(text).map_err(|_| U256Error::InvalidDecimal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak256_matches_known_vectors() {
        assert_eq!(
            encode_hex(&keccak256(b"")),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
        assert_eq!(
            encode_hex(&keccak256(b"abc")),
            "0x4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45"
        );
    }

    #[test]
    fn eip55_checksum_matches_reference_addresses() {
        // Reference addresses from the EIP-55 specification.
        for expected in [
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
            "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
            "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        ] {
            let bytes: [u8; 20] = decode_hex_array(expected).unwrap();
            assert_eq!(eip55_checksum(&bytes), expected);
        }
    }

    #[test]
    fn eip55_case_validation() {
        let text = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        let bytes: [u8; 20] = decode_hex_array(text).unwrap();

        assert!(eip55_case_valid(text, &bytes));
        assert!(eip55_case_valid(&text.to_lowercase(), &bytes));
        assert!(eip55_case_valid(&format!("0x{}", text[2..].to_uppercase()), &bytes));

        // Flip the case of one letter: the checksum no longer holds.
        let bad = text.replace("aA", "Aa");
        assert!(!eip55_case_valid(&bad, &bytes));
    }
}
