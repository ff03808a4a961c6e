//! JSON-RPC implementation of the ledger gateway.

use core::time::Duration;

use safe_history_domain::address::{Address, TxHash};
use safe_history_utils::{address_word, decode_hex, encode_hex, function_selector};
use serde::Deserialize;
use serde_json::json;

use super::{LedgerError, LedgerGateway, TxReceipt};

/// A [`LedgerGateway`] backed by an Ethereum JSON-RPC node.
///
/// Owner sets and approval state are read with `eth_call` against the wallet
/// contract; execution evidence is checked with `eth_getTransactionReceipt`.
pub struct JsonRpcLedgerGateway {
    http: reqwest::Client,
    rpc_url: String,
}

#[bon::bon]
impl JsonRpcLedgerGateway {
    /// Creates a gateway talking to the node at `rpc_url`.
    ///
    /// Every request is bounded by `timeout`; an elapsed timeout surfaces as
    /// [`LedgerError::Client`].
    #[builder]
    pub fn new(rpc_url: String, timeout: Duration) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { http, rpc_url })
    }
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    result: Option<serde_json::Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    status: Option<String>,
    to: Option<String>,
    block_number: String,
}

impl JsonRpcLedgerGateway {
    async fn request(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, LedgerError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let envelope: RpcEnvelope = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = envelope.error {
            return Err(LedgerError::Rpc { code: error.code, message: error.message });
        }

        Ok(envelope.result.unwrap_or(serde_json::Value::Null))
    }

    async fn eth_call(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, LedgerError> {
        let params = json!([{"to": to.to_string(), "data": encode_hex(&data)}, "latest"]);

        let result = self.request("eth_call", params).await?;

        let text = result
            .as_str()
            .ok_or_else(|| LedgerError::malformed("eth_call result is not a string"))?;

        decode_hex(text).map_err(|e| LedgerError::malformed(e.to_string()))
    }
}

impl LedgerGateway for JsonRpcLedgerGateway {
    async fn get_owners(&self, wallet: Address) -> Result<Option<Vec<Address>>, LedgerError> {
        let data = function_selector("getOwners()").to_vec();

        let ret = self.eth_call(wallet, data).await?;

        // A call against an address without code returns no data.
        if ret.is_empty() {
            return Ok(None);
        }

        decode_address_array(&ret).map(Some)
    }

    async fn is_hash_approved(
        &self,
        wallet: Address,
        owner: Address,
        contract_tx_hash: TxHash,
    ) -> Result<bool, LedgerError> {
        let mut data = function_selector("approvedHashes(address,bytes32)").to_vec();
        data.extend_from_slice(&address_word(owner.as_bytes()));
        data.extend_from_slice(contract_tx_hash.as_bytes());

        let ret = self.eth_call(wallet, data).await?;

        Ok(ret.iter().any(|byte| *byte != 0))
    }

    async fn get_tx_receipt(
        &self,
        ledger_tx_hash: TxHash,
    ) -> Result<Option<TxReceipt>, LedgerError> {
        let result = self
            .request("eth_getTransactionReceipt", json!([ledger_tx_hash.to_string()]))
            .await?;

        if result.is_null() {
            return Ok(None);
        }

        let receipt: RpcReceipt =
            serde_json::from_value(result).map_err(|e| LedgerError::malformed(e.to_string()))?;

        // Receipts from before the status field was introduced carry none;
        // a mined transaction without one counts as applied.
        let success = match receipt.status.as_deref() {
            Some(status) => parse_quantity(status)? == 1,
            None => true,
        };

        let to = receipt
            .to
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|_| LedgerError::malformed("receipt `to` is not an address"))?;

        let block_number = parse_quantity(&receipt.block_number)?;

        let receipt = TxReceipt::builder()
            .success(success)
            .maybe_to(to)
            .block_number(block_number)
            .build();

        Ok(Some(receipt))
    }

    async fn get_nonce(&self, wallet: Address) -> Result<Option<u64>, LedgerError> {
        let data = function_selector("nonce()").to_vec();

        let ret = self.eth_call(wallet, data).await?;

        // A call against an address without code returns no data.
        if ret.is_empty() {
            return Ok(None);
        }

        Ok(Some(word_to_usize(&ret, 0)? as u64))
    }
}

fn decode_address_array(ret: &[u8]) -> Result<Vec<Address>, LedgerError> {
    let offset = word_to_usize(ret, 0)?;
    let count = word_to_usize(ret, offset)?;

    // The payload holds at most one address per 32-byte word.
    if count > ret.len() / 32 {
        return Err(LedgerError::malformed("address array truncated"));
    }

    let mut addresses = Vec::with_capacity(count);

    for index in 0..count {
        let start = index
            .checked_mul(32)
            .and_then(|delta| delta.checked_add(32))
            .and_then(|delta| offset.checked_add(delta))
            .ok_or_else(|| LedgerError::malformed("address array overflows"))?;

        let word = start
            .checked_add(32)
            .and_then(|end| ret.get(start..end))
            .ok_or_else(|| LedgerError::malformed("address array truncated"))?;

        let mut address = [0u8; 20];
        address.copy_from_slice(&word[12..]);

        addresses.push(Address::from(address));
    }

    Ok(addresses)
}

fn parse_quantity(text: &str) -> Result<u64, LedgerError> {
    let digits = text
        .strip_prefix("0x")
        .ok_or_else(|| LedgerError::malformed("quantity missing 0x prefix"))?;

    u64::from_str_radix(digits, 16).map_err(|e| LedgerError::malformed(e.to_string()))
}

fn word_to_usize(ret: &[u8], at: usize) -> Result<usize, LedgerError> {
    let word = at
        .checked_add(32)
        .and_then(|end| ret.get(at..end))
        .ok_or_else(|| LedgerError::malformed("abi return truncated"))?;

    if word[..24].iter().any(|byte| *byte != 0) {
        return Err(LedgerError::malformed("abi word out of range"));
    }

    let mut tail = [0u8; 8];
    tail.copy_from_slice(&word[24..]);

    Ok(u64::from_be_bytes(tail) as usize)
}
