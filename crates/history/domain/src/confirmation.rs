//! Confirmation and execution evidence attached to multisig transactions.

use bon::Builder;
use chrono::{DateTime, Utc};
use dissolve_derive::Dissolve;
use strum::{Display, EnumString, IntoStaticStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    Timestamps,
    address::{Address, TxHash},
};

#[cfg(feature = "serde")]
use crate::with_serde;

/// The kind of evidence a confirmation record carries.
///
/// Rendered `CONFIRMATION`/`EXECUTION` outbound; inbound parsing is
/// case-insensitive so the wire form `confirmation`/`execution` is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, EnumString, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum ConfirmationKind {
    /// An owner approved the transaction hash on-chain.
    Confirmation,
    /// The transaction was mined and applied on the ledger.
    Execution,
}

/// One piece of evidence attached to a [`MultisigTx`](crate::tx::MultisigTx).
///
/// For a CONFIRMATION record the `owner` is the approving owner and must
/// equal `sender`. For an EXECUTION record `owner` records who relayed the
/// execution, not who approved; executions are deduplicated by
/// `ledger_tx_hash` instead.
#[derive(Debug, Clone, Builder, Dissolve)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "camelCase"))]
pub struct MultisigConfirmation<AUX = Timestamps> {
    /// The canonical transaction hash this evidence refers to.
    #[cfg_attr(feature = "serde", serde(with = "with_serde::tx_hash"))]
    contract_tx_hash: TxHash,

    /// The owner this record is attributed to.
    #[cfg_attr(feature = "serde", serde(with = "with_serde::address"))]
    owner: Address,

    /// Whether this records an approval or the execution itself.
    #[cfg_attr(feature = "serde", serde(with = "with_serde::confirmation_kind"))]
    kind: ConfirmationKind,

    /// The ledger transaction that carried the approval or execution.
    #[cfg_attr(feature = "serde", serde(with = "with_serde::tx_hash"))]
    ledger_tx_hash: TxHash,

    /// The block the ledger transaction was mined in.
    block_number: u64,

    /// The block timestamp, used for ordering within a transaction.
    block_date_time: DateTime<Utc>,

    /// Who submitted this evidence to the API.
    #[cfg_attr(feature = "serde", serde(with = "with_serde::address"))]
    sender: Address,

    /// Auxiliary metadata associated with this record.
    aux: AUX,
}

impl<AUX> MultisigConfirmation<AUX> {
    /// Returns the canonical transaction hash.
    pub fn contract_tx_hash(&self) -> TxHash {
        self.contract_tx_hash
    }

    /// Returns the attributed owner.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Returns the record kind.
    pub fn kind(&self) -> ConfirmationKind {
        self.kind
    }

    /// Returns the ledger transaction hash.
    pub fn ledger_tx_hash(&self) -> TxHash {
        self.ledger_tx_hash
    }

    /// Returns the block number.
    pub fn block_number(&self) -> u64 {
        self.block_number
    }

    /// Returns the block timestamp.
    pub fn block_date_time(&self) -> DateTime<Utc> {
        self.block_date_time
    }

    /// Returns who submitted this evidence.
    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Returns a reference to the auxiliary metadata.
    pub fn aux(&self) -> &AUX {
        &self.aux
    }

    /// Replaces the auxiliary metadata, keeping every other field.
    pub fn with_aux<B>(self, aux: B) -> MultisigConfirmation<B> {
        MultisigConfirmation {
            contract_tx_hash: self.contract_tx_hash,
            owner: self.owner,
            kind: self.kind,
            ledger_tx_hash: self.ledger_tx_hash,
            block_number: self.block_number,
            block_date_time: self.block_date_time,
            sender: self.sender,
            aux,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_wire_and_storage_forms() {
        assert_eq!("confirmation".parse::<ConfirmationKind>().unwrap(), ConfirmationKind::Confirmation);
        assert_eq!("execution".parse::<ConfirmationKind>().unwrap(), ConfirmationKind::Execution);
        assert_eq!("EXECUTION".parse::<ConfirmationKind>().unwrap(), ConfirmationKind::Execution);
        assert!("wrong_type".parse::<ConfirmationKind>().is_err());

        assert_eq!(ConfirmationKind::Confirmation.to_string(), "CONFIRMATION");
        assert_eq!(ConfirmationKind::Execution.to_string(), "EXECUTION");
    }
}
