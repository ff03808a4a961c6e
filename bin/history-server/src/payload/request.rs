use core::num::NonZeroU32;

use chrono::{DateTime, Utc};
use dissolve_derive::Dissolve;
use serde::Deserialize;

/// Body of a submission POST.
///
/// Everything is carried as raw wire text; parsing and validation happen in
/// the engine so a bad field is reported by its wire name.
#[derive(Debug, Dissolve, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTxPayload {
    to: String,
    value: NumberOrText,
    data: Option<String>,
    operation: u8,
    nonce: u64,
    safe_tx_gas: u64,
    data_gas: u64,
    gas_price: u64,
    gas_token: Option<String>,
    refund_receiver: Option<String>,
    #[serde(rename = "contractTransactionHash")]
    contract_tx_hash: String,

    #[serde(rename = "type")]
    kind: String,

    sender: String,

    #[serde(rename = "transactionHash")]
    ledger_tx_hash: String,

    block_number: u64,
    block_date_time: DateTime<Utc>,
}

/// A decimal amount sent either as a JSON number or as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(u64),
    Text(String),
}

impl From<NumberOrText> for String {
    fn from(value: NumberOrText) -> Self {
        match value {
            NumberOrText::Number(n) => n.to_string(),
            NumberOrText::Text(s) => s,
        }
    }
}

/// Query string of a history GET.
#[derive(Debug, Dissolve, Deserialize)]
pub struct ListTxQuery {
    /// Comma-separated owner addresses; a trailing comma is tolerated
    owners: Option<String>,

    /// Opaque cursor from a previous page
    cursor: Option<String>,

    /// Page size
    limit: Option<NonZeroU32>,
}
