use std::borrow::Cow;

use safe_history_domain::address::{Address, TxHash};
use safe_history_store::HistoryStoreError;

use crate::ledger::LedgerError;

/// Top-level error for engine operations.
#[derive(Debug, thiserror::Error)]
pub enum HistoryEngineError {
    /// The submission failed validation and nothing was written.
    #[error("submission rejected: {0}")]
    Rejected(#[from] SubmissionRejected),

    /// The ledger node could not be reached or answered garbage.
    ///
    /// Transient: the same submission may succeed on retry, unlike a
    /// [`SubmissionRejected`] which is a verdict on the submission itself.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(#[from] LedgerError),

    /// The persistence layer failed after validation.
    #[error("store error: {0}")]
    Store(HistoryStoreError),
}

/// The closed set of reasons a submission is refused.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionRejected {
    /// A field failed to parse.
    #[error("malformed field `{field}`: {reason}")]
    MalformedInput {
        /// The offending wire field.
        field: &'static str,
        /// What was wrong with it.
        reason: Cow<'static, str>,
    },

    /// The submitted hash does not match the hash recomputed from the
    /// submitted parameters.
    #[error("contract transaction hash mismatch: computed {computed}, submitted {submitted}")]
    HashMismatch {
        /// The hash recomputed from the parameters.
        computed: TxHash,
        /// The hash the client submitted.
        submitted: TxHash,
    },

    /// No wallet contract is deployed at the submitted address.
    #[error("no wallet deployed at {safe}")]
    UnknownWallet {
        /// The address that resolved to nothing on-chain.
        safe: Address,
    },

    /// The sender is not one of the wallet's owners.
    #[error("sender {sender} is not an owner of {safe}")]
    UnauthorizedSender {
        /// The wallet the submission targeted.
        safe: Address,
        /// The non-owner sender.
        sender: Address,
    },

    /// The owner has not approved the hash on-chain.
    #[error("{owner} has not approved {contract_tx_hash} on-chain")]
    NotYetApproved {
        /// The owner claimed to have approved.
        owner: Address,
        /// The hash that is not approved.
        contract_tx_hash: TxHash,
    },

    /// The claimed execution could not be verified on the ledger.
    #[error("ledger transaction {ledger_tx_hash} does not execute wallet {safe}")]
    ExecutionUnverified {
        /// The wallet the execution was claimed for.
        safe: Address,
        /// The ledger transaction that failed verification.
        ledger_tx_hash: TxHash,
    },

    /// The hash is already stored with different transaction parameters.
    #[error("conflicting parameters for stored transaction {contract_tx_hash}")]
    ConflictingProposal {
        /// The hash whose stored parameters did not match.
        contract_tx_hash: TxHash,
    },
}

impl SubmissionRejected {
    pub(crate) fn malformed<R>(field: &'static str, reason: R) -> Self
    where
        Cow<'static, str>: From<R>,
    {
        SubmissionRejected::MalformedInput { field, reason: reason.into() }
    }
}

impl From<HistoryStoreError> for HistoryEngineError {
    fn from(err: HistoryStoreError) -> Self {
        match err {
            HistoryStoreError::ConflictingProposal { contract_tx_hash } => {
                SubmissionRejected::ConflictingProposal { contract_tx_hash }.into()
            },
            other => HistoryEngineError::Store(other),
        }
    }
}
