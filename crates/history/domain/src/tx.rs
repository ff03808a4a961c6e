//! Multisig transaction domain models.

use bon::Builder;
use dissolve_derive::Dissolve;
use primitive_types::U256;
use strum::{Display, EnumString, IntoStaticStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Timestamps, address::Address, address::TxHash, confirmation::MultisigConfirmation};

#[cfg(feature = "serde")]
use crate::with_serde;

/// The operation a multisig transaction performs when executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, EnumString, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SafeOperation {
    /// A regular message call.
    Call,
    /// A delegate call executing foreign code in the wallet's context.
    DelegateCall,
    /// Contract creation.
    Create,
}

/// A multisig transaction tracked for a wallet.
///
/// The `contract_tx_hash` is the canonical hash of the transaction
/// parameters and serves as the dedup/correlation key: a wallet may hold
/// several competing proposals at the same nonce, each under its own hash.
/// Once the first confirmation for a hash is stored the parameters are
/// immutable.
///
/// # Type Parameters
///
/// * `AUX` - Auxiliary data type, defaults to [`Timestamps`] for tracking metadata.
#[derive(Debug, Clone, Builder, Dissolve)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub struct MultisigTx<AUX = Timestamps> {
    /// The wallet address this transaction belongs to.
    #[cfg_attr(feature = "serde", serde(with = "with_serde::address"))]
    safe: Address,

    /// The recipient address.
    #[cfg_attr(feature = "serde", serde(with = "with_serde::address"))]
    to: Address,

    /// The transferred amount in wei.
    #[cfg_attr(feature = "serde", serde(with = "with_serde::u256_dec"))]
    value: U256,

    /// The call payload. An empty payload is normalized to `None`.
    #[cfg_attr(feature = "serde", serde(with = "with_serde::hex_bytes_opt"))]
    data: Option<Vec<u8>>,

    /// The operation kind, encoded 0/1/2 on the wire.
    #[cfg_attr(feature = "serde", serde(with = "with_serde::operation"))]
    operation: SafeOperation,

    /// The wallet-scoped sequence number of this proposal.
    nonce: u64,

    /// Gas limit for the inner transaction.
    safe_tx_gas: u64,

    /// Gas reserved for data and signature checking.
    data_gas: u64,

    /// Gas price used for the refund calculation.
    gas_price: u64,

    /// Token used for the gas refund, zero address for ether.
    #[cfg_attr(feature = "serde", serde(with = "with_serde::address"))]
    gas_token: Address,

    /// Receiver of the gas refund, zero address for the execution origin.
    #[cfg_attr(feature = "serde", serde(with = "with_serde::address"))]
    refund_receiver: Address,

    /// The canonical hash of the parameters above.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "contractTransactionHash", with = "with_serde::tx_hash")
    )]
    contract_tx_hash: TxHash,

    /// Auxiliary metadata associated with this transaction.
    aux: AUX,
}

/// One transaction joined with its stored confirmation evidence, as returned
/// by history reads.
#[derive(Debug, Clone, Builder, Dissolve)]
pub struct TxHistoryEntry {
    /// The transaction record.
    tx: MultisigTx,

    /// Attached confirmations, most recent block time first.
    confirmations: Vec<MultisigConfirmation>,
}

impl SafeOperation {
    /// Returns the on-chain encoding of this operation.
    pub fn as_u8(self) -> u8 {
        match self {
            SafeOperation::Call => 0,
            SafeOperation::DelegateCall => 1,
            SafeOperation::Create => 2,
        }
    }
}

impl TryFrom<u8> for SafeOperation {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SafeOperation::Call),
            1 => Ok(SafeOperation::DelegateCall),
            2 => Ok(SafeOperation::Create),
            other => Err(other),
        }
    }
}

impl<AUX> MultisigTx<AUX> {
    /// Returns the wallet address.
    pub fn safe(&self) -> Address {
        self.safe
    }

    /// Returns the recipient address.
    pub fn to(&self) -> Address {
        self.to
    }

    /// Returns the transferred amount in wei.
    pub fn value(&self) -> U256 {
        self.value
    }

    /// Returns the call payload, if any.
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Returns the operation kind.
    pub fn operation(&self) -> SafeOperation {
        self.operation
    }

    /// Returns the wallet-scoped nonce.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Returns the gas limit for the inner transaction.
    pub fn safe_tx_gas(&self) -> u64 {
        self.safe_tx_gas
    }

    /// Returns the gas reserved for data and signature checking.
    pub fn data_gas(&self) -> u64 {
        self.data_gas
    }

    /// Returns the gas price used for the refund calculation.
    pub fn gas_price(&self) -> u64 {
        self.gas_price
    }

    /// Returns the gas refund token address.
    pub fn gas_token(&self) -> Address {
        self.gas_token
    }

    /// Returns the gas refund receiver address.
    pub fn refund_receiver(&self) -> Address {
        self.refund_receiver
    }

    /// Returns the canonical transaction hash.
    pub fn contract_tx_hash(&self) -> TxHash {
        self.contract_tx_hash
    }

    /// Returns a reference to the auxiliary metadata.
    pub fn aux(&self) -> &AUX {
        &self.aux
    }

    /// Replaces the auxiliary metadata, keeping every other field.
    pub fn with_aux<B>(self, aux: B) -> MultisigTx<B> {
        MultisigTx {
            safe: self.safe,
            to: self.to,
            value: self.value,
            data: self.data,
            operation: self.operation,
            nonce: self.nonce,
            safe_tx_gas: self.safe_tx_gas,
            data_gas: self.data_gas,
            gas_price: self.gas_price,
            gas_token: self.gas_token,
            refund_receiver: self.refund_receiver,
            contract_tx_hash: self.contract_tx_hash,
            aux,
        }
    }

    /// Whether `other` proposes exactly the same transaction parameters.
    ///
    /// Used by the store to detect a conflicting proposal submitted under an
    /// already-known (safe, contract_tx_hash) pair.
    pub fn params_match<B>(&self, other: &MultisigTx<B>) -> bool {
        self.safe == other.safe
            && self.to == other.to
            && self.value == other.value
            && self.data == other.data
            && self.operation == other.operation
            && self.nonce == other.nonce
            && self.safe_tx_gas == other.safe_tx_gas
            && self.data_gas == other.data_gas
            && self.gas_price == other.gas_price
            && self.gas_token == other.gas_token
            && self.refund_receiver == other.refund_receiver
            && self.contract_tx_hash == other.contract_tx_hash
    }
}

impl TxHistoryEntry {
    /// Returns the transaction record.
    pub fn tx(&self) -> &MultisigTx {
        &self.tx
    }

    /// Returns the attached confirmations.
    pub fn confirmations(&self) -> &[MultisigConfirmation] {
        &self.confirmations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_wire_encoding_round_trips() {
        for (raw, op) in [
            (0u8, SafeOperation::Call),
            (1, SafeOperation::DelegateCall),
            (2, SafeOperation::Create),
        ] {
            assert_eq!(SafeOperation::try_from(raw).unwrap(), op);
            assert_eq!(op.as_u8(), raw);
        }

        assert_eq!(SafeOperation::try_from(3), Err(3));
    }

    #[test]
    fn operation_text_encoding_for_storage() {
        assert_eq!(SafeOperation::Call.to_string(), "CALL");
        assert_eq!(SafeOperation::DelegateCall.to_string(), "DELEGATE_CALL");
        assert_eq!("CREATE".parse::<SafeOperation>().unwrap(), SafeOperation::Create);
    }
}
