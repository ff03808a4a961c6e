use std::borrow::Cow;

use safe_history_domain::address::TxHash;

use crate::persistence::store::StoreError;

pub type Result<T, E = HistoryStoreError> = core::result::Result<T, E>;

/// Errors that can occur when interacting with the store
#[derive(Debug, thiserror::Error)]
pub enum HistoryStoreError {
    /// A database-level error occurred.
    ///
    /// This wraps errors from the underlying persistence layer, including
    /// connection issues, query failures, and transaction errors.
    #[error("database error: {0}")]
    Store(#[from] StoreError),

    /// A submission re-used an existing contract transaction hash with
    /// parameters that differ from the stored ones.
    ///
    /// Stored transaction parameters are immutable once the first
    /// confirmation for a hash has been recorded.
    #[error("conflicting parameters for stored transaction {contract_tx_hash}")]
    ConflictingProposal {
        /// The hash whose stored parameters did not match.
        contract_tx_hash: TxHash,
    },

    /// An invalid cursor was supplied for a paginated read.
    #[error("invalid page cursor")]
    InvalidCursor,

    /// Failed to acquire a database connection from the pool.
    ///
    /// This typically indicates the connection pool is exhausted or
    /// the database is unavailable.
    #[error("pool error")]
    Pool,

    /// An invalid value was encountered during processing.
    ///
    /// This is returned when data retrieved from the database cannot be
    /// converted to the expected type or format.
    #[error("invalid value error")]
    InvalidValue,

    /// An unclassified error occurred.
    ///
    /// This is used for errors that don't fit into the other categories.
    #[error("other error: {0}")]
    Other(Cow<'static, str>),
}

impl From<diesel::result::Error> for HistoryStoreError {
    fn from(err: diesel::result::Error) -> Self {
        HistoryStoreError::Store(err.into())
    }
}
