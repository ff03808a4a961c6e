//! Request types for history engine operations.

use core::num::NonZeroU32;

use bon::Builder;
use chrono::{DateTime, Utc};
use dissolve_derive::Dissolve;
use safe_history_domain::address::Address;

/// A confirmation or execution submission for a wallet.
///
/// The wallet address is already parsed (it routes the request); everything
/// else arrives as raw wire text and is parsed field-by-field by the
/// validator, so a bad field is reported by name.
#[derive(Debug, Builder, Dissolve)]
pub struct SubmitTxRequest {
    /// The wallet the submission is for
    safe: Address,

    /// Recipient address, `0x`-hex
    to: String,

    /// Transferred amount in wei, decimal
    value: String,

    /// Call payload, `0x`-hex; empty or absent both mean no payload
    data: Option<String>,

    /// Operation code: 0 call, 1 delegate call, 2 create
    operation: u8,

    /// Wallet-scoped sequence number of the proposal
    nonce: u64,

    /// Gas limit for the inner transaction
    safe_tx_gas: u64,

    /// Gas reserved for data and signature checking
    data_gas: u64,

    /// Gas price used for the refund calculation
    gas_price: u64,

    /// Refund token address; absent means ether
    gas_token: Option<String>,

    /// Refund receiver address; absent means the execution origin
    refund_receiver: Option<String>,

    /// The canonical hash the client computed for the parameters above
    contract_tx_hash: String,

    /// Evidence kind: `confirmation` or `execution`
    kind: String,

    /// Address submitting the evidence
    sender: String,

    /// The ledger transaction carrying the approval or execution
    ledger_tx_hash: String,

    /// The block that ledger transaction was mined in
    block_number: u64,

    /// That block's timestamp
    block_date_time: DateTime<Utc>,
}

/// A paginated history read for a wallet.
#[derive(Debug, Builder, Dissolve)]
pub struct ListTxRequest {
    /// The wallet whose history to read
    safe: Address,

    /// Optional owner filter: keep transactions confirmed by at least one
    /// of these owners
    owners: Option<Vec<Address>>,

    /// Opaque cursor from a previous page, raw wire text
    cursor: Option<String>,

    /// Page size; a default applies when absent
    limit: Option<NonZeroU32>,
}
