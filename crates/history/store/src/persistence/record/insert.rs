use bon::Builder;
use chrono::{DateTime, Utc};
use diesel::prelude::Insertable;

use crate::persistence::{
    record::{EvidenceKind, Operation},
    schema,
};

#[derive(Debug, Builder, Insertable)]
#[diesel(table_name = schema::multisig_tx)]
pub struct NewTxRecord<'a> {
    pub safe_address: &'a str,
    pub to_address: &'a str,
    pub value: &'a [u8],
    pub data: Option<&'a [u8]>,
    pub operation: Operation,
    pub nonce: i64,
    pub safe_tx_gas: i64,
    pub data_gas: i64,
    pub gas_price: i64,
    pub gas_token: &'a str,
    pub refund_receiver: &'a str,
    pub contract_tx_hash: &'a str,
}

#[derive(Debug, Builder, Insertable)]
#[diesel(table_name = schema::confirmation)]
pub struct NewConfirmationRecord<'a> {
    pub safe_address: &'a str,
    pub contract_tx_hash: &'a str,
    pub owner_address: &'a str,
    pub kind: EvidenceKind,
    pub ledger_tx_hash: &'a str,
    pub block_number: i64,
    pub block_date_time: DateTime<Utc>,
    pub sender_address: &'a str,
    pub dedup_key: &'a str,
}
