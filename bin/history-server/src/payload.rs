pub mod request;
pub mod response;

use bon::Builder;
use chrono::{DateTime, Utc};
use primitive_types::U256;
use safe_history_domain::{
    address::{Address, TxHash},
    confirmation::{MultisigConfirmation, MultisigConfirmationDissolved},
    tx::{MultisigTxDissolved, TxHistoryEntry, TxHistoryEntryDissolved},
    with_serde,
};
use serde::Serialize;

/// One stored transaction with its confirmations, in wire form.
#[derive(Debug, Builder, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultisigTxPayload {
    #[serde(with = "with_serde::address")]
    safe: Address,

    #[serde(with = "with_serde::address")]
    to: Address,

    #[serde(with = "with_serde::u256_dec")]
    value: U256,

    #[serde(with = "with_serde::hex_bytes_opt")]
    data: Option<Vec<u8>>,

    operation: u8,
    nonce: u64,
    safe_tx_gas: u64,
    data_gas: u64,
    gas_price: u64,

    #[serde(with = "with_serde::address")]
    gas_token: Address,

    #[serde(with = "with_serde::address")]
    refund_receiver: Address,

    #[serde(with = "with_serde::tx_hash")]
    contract_transaction_hash: TxHash,

    submission_date: DateTime<Utc>,
    confirmations: Vec<ConfirmationPayload>,
}

/// One piece of recorded evidence, in wire form.
#[derive(Debug, Builder, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationPayload {
    #[serde(with = "with_serde::address")]
    owner: Address,

    #[serde(rename = "type")]
    kind: String,

    #[serde(with = "with_serde::tx_hash")]
    transaction_hash: TxHash,

    block_number: u64,
    block_date_time: DateTime<Utc>,
    submission_date: DateTime<Utc>,
}

impl From<TxHistoryEntry> for MultisigTxPayload {
    fn from(entry: TxHistoryEntry) -> Self {
        let TxHistoryEntryDissolved { tx, confirmations } = entry.dissolve();

        let MultisigTxDissolved {
            safe,
            to,
            value,
            data,
            operation,
            nonce,
            safe_tx_gas,
            data_gas,
            gas_price,
            gas_token,
            refund_receiver,
            contract_tx_hash,
            aux,
        } = tx.dissolve();

        Self::builder()
            .safe(safe)
            .to(to)
            .value(value)
            .maybe_data(data)
            .operation(operation.as_u8())
            .nonce(nonce)
            .safe_tx_gas(safe_tx_gas)
            .data_gas(data_gas)
            .gas_price(gas_price)
            .gas_token(gas_token)
            .refund_receiver(refund_receiver)
            .contract_transaction_hash(contract_tx_hash)
            .submission_date(aux.created_at())
            .confirmations(confirmations.into_iter().map(From::from).collect())
            .build()
    }
}

impl From<MultisigConfirmation> for ConfirmationPayload {
    fn from(confirmation: MultisigConfirmation) -> Self {
        let MultisigConfirmationDissolved {
            owner,
            kind,
            ledger_tx_hash,
            block_number,
            block_date_time,
            aux,
            ..
        } = confirmation.dissolve();

        Self::builder()
            .owner(owner)
            .kind(kind.to_string())
            .transaction_hash(ledger_tx_hash)
            .block_number(block_number)
            .block_date_time(block_date_time)
            .submission_date(aux.created_at())
            .build()
    }
}
