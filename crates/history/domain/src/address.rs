//! Canonical address and hash types.

use core::{fmt, str::FromStr};

use safe_history_utils::{HexError, decode_hex_array, eip55_case_valid, eip55_checksum, encode_hex};

/// A 20-byte account address.
///
/// The canonical textual form is the EIP-55 checksummed `0x…` hex string.
/// Parsing accepts all-lowercase, all-uppercase, or a string whose mixed
/// casing matches the EIP-55 checksum; any other casing is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

/// A 32-byte hash, used both for contract transaction hashes and for ledger
/// transaction hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxHash([u8; 32]);

/// Errors produced when parsing an [`Address`].
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    /// The string was not a `0x`-prefixed 40-digit hex string.
    #[error("malformed address: {0}")]
    Hex(#[from] HexError),

    /// The string used mixed casing that fails the EIP-55 checksum.
    #[error("address checksum mismatch")]
    ChecksumMismatch,
}

/// Errors produced when parsing a [`TxHash`].
#[derive(Debug, thiserror::Error)]
pub enum TxHashError {
    /// The string was not a `0x`-prefixed 64-digit hex string.
    #[error("malformed hash: {0}")]
    Hex(#[from] HexError),
}

impl Address {
    /// The zero address, used as the null value for `gas_token` and
    /// `refund_receiver`.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Returns the raw 20 bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Whether this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl TxHash {
    /// Returns the raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl From<[u8; 32]> for TxHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let bytes: [u8; 20] = decode_hex_array(text)?;

        if !eip55_case_valid(text, &bytes) {
            return Err(AddressError::ChecksumMismatch);
        }

        Ok(Self(bytes))
    }
}

impl FromStr for TxHash {
    type Err = TxHashError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        decode_hex_array(text).map(Self).map_err(From::from)
    }
}

impl fmt::Display for Address {
    /// Formats the address in its EIP-55 checksummed form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", eip55_checksum(&self.0))
    }
}

impl fmt::Display for TxHash {
    /// Formats the hash as a lowercase `0x`-prefixed hex string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", encode_hex(&self.0))
    }
}
