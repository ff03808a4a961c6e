//! Canonical transaction hashing.
//!
//! Replicates the wallet contract's on-chain EIP-712 hashing scheme
//! bit-for-bit so a submitted hash can be verified without a ledger round
//! trip. The scheme hashes a domain separator bound to the wallet address
//! together with the struct hash of the transaction parameters.

use primitive_types::U256;
use safe_history_utils::{address_word, keccak256, u256_word};

use crate::{
    address::{Address, TxHash},
    tx::{MultisigTx, SafeOperation},
};

const DOMAIN_TYPE: &str = "EIP712Domain(address verifyingContract)";

const SAFE_TX_TYPE: &str = "SafeTx(address to,uint256 value,bytes data,uint8 operation,\
                            uint256 safeTxGas,uint256 dataGas,uint256 gasPrice,\
                            address gasToken,address refundReceiver,uint256 nonce)";

/// Transaction parameters fed into [`contract_tx_hash`].
///
/// This is the hash-relevant subset of [`MultisigTx`], borrowed so the hash
/// can be computed both before a transaction record exists (validation) and
/// from a stored record (integrity checks).
#[derive(Debug, Clone, Copy)]
pub struct SafeTxParams<'a> {
    /// The wallet address, bound into the domain separator.
    pub safe: Address,
    /// The recipient address.
    pub to: Address,
    /// The transferred amount in wei.
    pub value: U256,
    /// The call payload; `None` hashes as the empty byte string.
    pub data: Option<&'a [u8]>,
    /// The operation kind.
    pub operation: SafeOperation,
    /// Gas limit for the inner transaction.
    pub safe_tx_gas: u64,
    /// Gas reserved for data and signature checking.
    pub data_gas: u64,
    /// Gas price used for the refund calculation.
    pub gas_price: u64,
    /// Token used for the gas refund.
    pub gas_token: Address,
    /// Receiver of the gas refund.
    pub refund_receiver: Address,
    /// The wallet-scoped nonce.
    pub nonce: u64,
}

/// Computes the canonical contract transaction hash for the given parameters.
///
/// Pure function with no failure modes; malformed input is rejected before
/// parameters reach this point.
pub fn contract_tx_hash(params: &SafeTxParams<'_>) -> TxHash {
    let domain_separator = {
        let mut preimage = Vec::with_capacity(64);
        preimage.extend_from_slice(&keccak256(DOMAIN_TYPE.as_bytes()));
        preimage.extend_from_slice(&address_word(params.safe.as_bytes()));
        keccak256(&preimage)
    };

    let struct_hash = {
        let mut preimage = Vec::with_capacity(11 * 32);
        preimage.extend_from_slice(&keccak256(SAFE_TX_TYPE.as_bytes()));
        preimage.extend_from_slice(&address_word(params.to.as_bytes()));
        preimage.extend_from_slice(&u256_word(params.value));
        preimage.extend_from_slice(&keccak256(params.data.unwrap_or_default()));
        preimage.extend_from_slice(&u256_word(U256::from(params.operation.as_u8())));
        preimage.extend_from_slice(&u256_word(U256::from(params.safe_tx_gas)));
        preimage.extend_from_slice(&u256_word(U256::from(params.data_gas)));
        preimage.extend_from_slice(&u256_word(U256::from(params.gas_price)));
        preimage.extend_from_slice(&address_word(params.gas_token.as_bytes()));
        preimage.extend_from_slice(&address_word(params.refund_receiver.as_bytes()));
        preimage.extend_from_slice(&u256_word(U256::from(params.nonce)));
        keccak256(&preimage)
    };

    let mut preimage = Vec::with_capacity(2 + 64);
    preimage.extend_from_slice(&[0x19, 0x01]);
    preimage.extend_from_slice(&domain_separator);
    preimage.extend_from_slice(&struct_hash);

    TxHash::from(keccak256(&preimage))
}

impl<AUX> MultisigTx<AUX> {
    /// Recomputes the canonical hash from this record's parameters.
    pub fn compute_contract_tx_hash(&self) -> TxHash {
        contract_tx_hash(&SafeTxParams {
            safe: self.safe(),
            to: self.to(),
            value: self.value(),
            data: self.data(),
            operation: self.operation(),
            safe_tx_gas: self.safe_tx_gas(),
            data_gas: self.data_gas(),
            gas_price: self.gas_price(),
            gas_token: self.gas_token(),
            refund_receiver: self.refund_receiver(),
            nonce: self.nonce(),
        })
    }
}

#[cfg(test)]
mod tests {
    use safe_history_utils::encode_hex;

    use super::*;

    fn reference_params(data: Option<&[u8]>, nonce: u64) -> SafeTxParams<'_> {
        SafeTxParams {
            safe: "0x2c9cC5f5f02AF5b7b1CB43eb72c4E1E4E4E4a9fe".parse().unwrap(),
            to: "0x5A0b54D5dc17e0AadC383d2db43B0a0D3E029c4c".parse().unwrap(),
            value: U256::from(50_000_000_000_000_000u64),
            data,
            operation: SafeOperation::Call,
            safe_tx_gas: 500_000,
            data_gas: 500_000,
            gas_price: 1,
            gas_token: Address::ZERO,
            refund_receiver: Address::ZERO,
            nonce,
        }
    }

    #[test]
    fn type_strings_hash_to_known_typehashes() {
        assert_eq!(
            encode_hex(&keccak256(DOMAIN_TYPE.as_bytes())),
            "0x035aff83d86937d35b32e04f0ddc6ff469290eef2f1b692d8a815c89404d4749"
        );
        assert_eq!(
            encode_hex(&keccak256(SAFE_TX_TYPE.as_bytes())),
            "0x14d461bc7412367e924637b363c7bf29b8f47e2f84869f4426e5633d8af47b20"
        );
    }

    #[test]
    fn matches_reference_hash_for_empty_payload() {
        let hash = contract_tx_hash(&reference_params(None, 0));

        assert_eq!(
            hash.to_string(),
            "0xde1ffddd3a9b619eebd9c0bfd6676c617ca80f27fa33204383b5bfdb9a5c1731"
        );
    }

    #[test]
    fn empty_payload_hashes_like_absent_payload() {
        let explicit_empty = contract_tx_hash(&reference_params(Some(&[]), 0));
        let absent = contract_tx_hash(&reference_params(None, 0));

        assert_eq!(explicit_empty, absent);
    }

    #[test]
    fn matches_reference_hash_for_nonzero_payload() {
        let data = [0xa9u8, 0x05, 0x9c, 0xbb];
        let hash = contract_tx_hash(&reference_params(Some(&data), 1));

        assert_eq!(
            hash.to_string(),
            "0xe9619642cf6fedbb09e8cdc24958b9a00031e7bcc2fddeb52c4dde933d8959cf"
        );
    }
}
