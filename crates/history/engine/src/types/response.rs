//! Response types for history engine operations.

use dissolve_derive::Dissolve;
use safe_history_domain::{address::TxHash, tx::TxHistoryEntry};
use safe_history_store::PageCursor;
use strum::Display;

/// How an accepted submission was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionOutcome {
    /// A new confirmation row was written.
    Created,
    /// The submission replayed an already stored confirmation.
    Duplicate,
}

/// Response from an accepted submission.
#[derive(Debug, Dissolve)]
pub struct SubmitTxResponse {
    /// Whether the submission created a new record
    outcome: SubmissionOutcome,

    /// The canonical hash the submission was recorded under
    contract_tx_hash: TxHash,
}

/// Response from a paginated history read.
#[derive(Debug, Dissolve)]
pub struct ListTxResponse {
    /// Matching transactions across all pages
    total: u64,

    /// Cursor for the next page, `None` on the last page
    next: Option<PageCursor>,

    /// This page's transactions, newest first
    entries: Vec<TxHistoryEntry>,
}

#[bon::bon]
impl SubmitTxResponse {
    #[builder]
    pub(crate) fn new(outcome: SubmissionOutcome, contract_tx_hash: TxHash) -> Self {
        Self { outcome, contract_tx_hash }
    }
}

#[bon::bon]
impl ListTxResponse {
    #[builder]
    pub(crate) fn new(total: u64, next: Option<PageCursor>, entries: Vec<TxHistoryEntry>) -> Self {
        Self { total, next, entries }
    }
}
