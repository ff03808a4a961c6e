#![allow(missing_docs)]

//! The submission and history-read pipeline.
//!
//! [`HistoryEngine`] is generic over its storage and its ledger access, so
//! the same pipeline runs against PostgreSQL and a live node in production
//! and against in-memory doubles in tests.

mod error;
mod ledger;
mod types;
mod validate;

pub use self::{
    error::{HistoryEngineError, SubmissionRejected},
    ledger::{JsonRpcLedgerGateway, LedgerError, LedgerGateway, TxReceipt},
    types::{request, response},
};

use core::num::NonZeroU32;

use safe_history_store::{HistoryStore, PageCursor, PageRequest, TxHistoryPageDissolved};

use self::types::{
    request::{ListTxRequest, ListTxRequestDissolved, SubmitTxRequest},
    response::{ListTxResponse, SubmissionOutcome, SubmitTxResponse},
};

/// Page size applied when a read does not name one.
const DEFAULT_PAGE_LIMIT: NonZeroU32 = NonZeroU32::new(100).unwrap();

pub struct HistoryEngine<S, G> {
    store: S,
    gateway: G,
}

impl<S, G> HistoryEngine<S, G> {
    pub fn new(store: S, gateway: G) -> Self {
        Self { store, gateway }
    }
}

impl<S, G> HistoryEngine<S, G>
where
    S: HistoryStore + Sync,
    G: LedgerGateway + Sync,
{
    /// Runs a submission through the full pipeline: parse, hash check,
    /// on-chain authorization, then the atomic store write.
    ///
    /// Validation failures write nothing. An accepted replay is not an
    /// error; it comes back as [`SubmissionOutcome::Duplicate`].
    #[tracing::instrument(skip_all)]
    pub async fn submit(
        &self,
        request: SubmitTxRequest,
    ) -> Result<SubmitTxResponse, HistoryEngineError> {
        let parsed = validate::parse(request)?;
        let (tx, confirmation) = validate::authorize(&self.gateway, parsed).await?;

        let contract_tx_hash = tx.contract_tx_hash();

        let recorded = self.store.record_submission(tx, confirmation).await?;

        let outcome = if recorded.confirmation_created() {
            SubmissionOutcome::Created
        } else {
            SubmissionOutcome::Duplicate
        };

        tracing::info!(
            %contract_tx_hash,
            %outcome,
            transaction_created = recorded.transaction_created(),
            "submission accepted",
        );

        Ok(SubmitTxResponse::builder()
            .outcome(outcome)
            .contract_tx_hash(contract_tx_hash)
            .build())
    }

    /// Reads one page of a wallet's history, newest transaction first.
    #[tracing::instrument(skip_all)]
    pub async fn list_txs(
        &self,
        request: ListTxRequest,
    ) -> Result<ListTxResponse, HistoryEngineError> {
        let ListTxRequestDissolved { safe, owners, cursor, limit } = request.dissolve();

        let after = cursor
            .as_deref()
            .map(str::parse::<PageCursor>)
            .transpose()
            .map_err(|e| SubmissionRejected::malformed("cursor", e.to_string()))?;

        let page = PageRequest::builder()
            .limit(limit.unwrap_or(DEFAULT_PAGE_LIMIT))
            .maybe_after(after)
            .build();

        let page = self.store.list_txs(safe, owners, page).await?;

        let TxHistoryPageDissolved { total, next, entries } = page.dissolve();

        Ok(ListTxResponse::builder().total(total).maybe_next(next).entries(entries).build())
    }
}
