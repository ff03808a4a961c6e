use chrono::{DateTime, Utc};
use diesel::prelude::Queryable;
use dissolve_derive::Dissolve;
use uuid::Uuid;

use crate::persistence::record::{EvidenceKind, Operation};

#[derive(Debug, Dissolve, Queryable)]
pub struct TxRecord {
    id: Uuid,
    safe_address: String,
    to_address: String,
    value: Vec<u8>,
    data: Option<Vec<u8>>,
    operation: Operation,
    nonce: i64,
    safe_tx_gas: i64,
    data_gas: i64,
    gas_price: i64,
    gas_token: String,
    refund_receiver: String,
    contract_tx_hash: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Dissolve, Queryable)]
pub struct ConfirmationRecord {
    id: Uuid,
    safe_address: String,
    contract_tx_hash: String,
    owner_address: String,
    kind: EvidenceKind,
    ledger_tx_hash: String,
    block_number: i64,
    block_date_time: DateTime<Utc>,
    sender_address: String,
    dedup_key: String,
    created_at: DateTime<Utc>,
}
