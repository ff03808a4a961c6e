use bon::Builder;
use serde::Serialize;

use crate::payload::MultisigTxPayload;

#[derive(Debug, Builder, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitTxResponsePayload {
    outcome: String,
    contract_transaction_hash: String,
}

#[derive(Debug, Builder, Serialize)]
pub struct ListTxResponsePayload {
    count: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    next: Option<String>,

    results: Vec<MultisigTxPayload>,
}
