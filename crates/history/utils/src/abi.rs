//! Minimal ABI word encoding.
//!
//! Only what the hashing scheme and the ledger gateway calls need: 32-byte
//! words for addresses and unsigned integers, and 4-byte function selectors.

use primitive_types::U256;

use crate::keccak256;

/// Encodes a 20-byte address as a left-padded 32-byte ABI word.
pub fn address_word(address: &[u8; 20]) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address);
    word
}

/// Encodes an unsigned 256-bit integer as a big-endian 32-byte ABI word.
pub fn u256_word(value: U256) -> [u8; 32] {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    word
}

/// Derives the 4-byte function selector for a canonical signature string.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let digest = keccak256(signature.as_bytes());
    // keccak256 output is 32 bytes, the slice below cannot fail
    digest[..4].try_into().unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode_hex;

    #[test]
    fn words_are_left_padded_big_endian() {
        let address = [0x11u8; 20];
        let word = address_word(&address);
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(&word[12..], &address);

        let word = u256_word(U256::from(0x0102u64));
        assert_eq!(word[30], 0x01);
        assert_eq!(word[31], 0x02);
        assert_eq!(&word[..30], &[0u8; 30]);
    }

    #[test]
    fn selector_matches_known_function() {
        // transfer(address,uint256) is the canonical reference selector.
        assert_eq!(encode_hex(&function_selector("transfer(address,uint256)")), "0xa9059cbb");
    }
}
