//! Read-only access to the ledger the wallets live on.

mod rpc;

pub use self::rpc::JsonRpcLedgerGateway;

use core::future::Future;

use std::borrow::Cow;

use bon::Builder;
use safe_history_domain::address::{Address, TxHash};

/// Errors surfaced by ledger reads.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The node could not be reached, or the request timed out.
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),

    /// The node answered with a JSON-RPC error object.
    #[error("ledger rpc error {code}: {message}")]
    Rpc {
        /// The JSON-RPC error code.
        code: i64,
        /// The JSON-RPC error message.
        message: String,
    },

    /// The node's answer could not be decoded.
    #[error("malformed ledger response: {0}")]
    MalformedResponse(Cow<'static, str>),
}

impl LedgerError {
    pub(crate) fn malformed<R>(reason: R) -> Self
    where
        Cow<'static, str>: From<R>,
    {
        LedgerError::MalformedResponse(reason.into())
    }
}

/// The receipt of a mined ledger transaction.
#[derive(Debug, Clone, Copy, Builder)]
pub struct TxReceipt {
    /// Whether the transaction was applied successfully.
    success: bool,

    /// The called contract, `None` for contract creations.
    to: Option<Address>,

    /// The block the transaction was mined in.
    block_number: u64,
}

impl TxReceipt {
    /// Whether the transaction was applied successfully.
    pub fn success(&self) -> bool {
        self.success
    }

    /// The called contract, `None` for contract creations.
    pub fn to(&self) -> Option<Address> {
        self.to
    }

    /// The block the transaction was mined in.
    pub fn block_number(&self) -> u64 {
        self.block_number
    }
}

/// The on-chain reads submission validation depends on.
///
/// The engine only ever talks to the ledger through this trait, so the
/// JSON-RPC implementation can be swapped for a scripted one in tests.
pub trait LedgerGateway {
    /// Returns the wallet's owner set, or `None` when no contract is
    /// deployed at the address.
    fn get_owners(
        &self,
        wallet: Address,
    ) -> impl Future<Output = Result<Option<Vec<Address>>, LedgerError>> + Send;

    /// Whether `owner` has approved `contract_tx_hash` in the wallet's
    /// on-chain approval mapping.
    fn is_hash_approved(
        &self,
        wallet: Address,
        owner: Address,
        contract_tx_hash: TxHash,
    ) -> impl Future<Output = Result<bool, LedgerError>> + Send;

    /// Returns the receipt of a mined transaction, or `None` when the
    /// ledger does not know the hash.
    fn get_tx_receipt(
        &self,
        ledger_tx_hash: TxHash,
    ) -> impl Future<Output = Result<Option<TxReceipt>, LedgerError>> + Send;

    /// Returns the wallet's current transaction nonce, or `None` when no
    /// contract is deployed at the address.
    fn get_nonce(
        &self,
        wallet: Address,
    ) -> impl Future<Output = Result<Option<u64>, LedgerError>> + Send;
}

impl<G> LedgerGateway for std::sync::Arc<G>
where
    G: LedgerGateway,
{
    fn get_owners(
        &self,
        wallet: Address,
    ) -> impl Future<Output = Result<Option<Vec<Address>>, LedgerError>> + Send {
        (**self).get_owners(wallet)
    }

    fn is_hash_approved(
        &self,
        wallet: Address,
        owner: Address,
        contract_tx_hash: TxHash,
    ) -> impl Future<Output = Result<bool, LedgerError>> + Send {
        (**self).is_hash_approved(wallet, owner, contract_tx_hash)
    }

    fn get_tx_receipt(
        &self,
        ledger_tx_hash: TxHash,
    ) -> impl Future<Output = Result<Option<TxReceipt>, LedgerError>> + Send {
        (**self).get_tx_receipt(ledger_tx_hash)
    }

    fn get_nonce(
        &self,
        wallet: Address,
    ) -> impl Future<Output = Result<Option<u64>, LedgerError>> + Send {
        (**self).get_nonce(wallet)
    }
}
