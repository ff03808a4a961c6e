//! Persistence layer for the safe transaction history service.
//!
//! This crate provides durable storage for multisig transactions and the
//! confirmation evidence attached to them. It acts as the data access layer
//! for the history engine, handling all interactions with the PostgreSQL
//! database.
//!
//! # Architecture
//!
//! The store is built on top of [diesel](diesel.rs) with async PostgreSQL support, providing:
//! - Connection pooling via [deadpool](docs.rs/deadpool) for efficient resource management
//! - Transaction support for atomic operations
//! - Type-safe database queries and conversions
//!
//! # Main Components
//!
//! - [`HistoryStore`] - The storage interface the engine is written against
//! - [`MultisigHistoryStore`] - The PostgreSQL-backed implementation
//! - [`DbPool`] - Connection pool type for managing database connections
//! - [`HistoryStoreError`] - Error types for store operations
//!
//! # Usage
//!
//! ```ignore
//! // Establish a connection pool
//! let pool = establish_pool(database_url, max_connections).await?;
//!
//! // Create the store
//! let store = MultisigHistoryStore::new(pool);
//!
//! // Store operations
//! let recorded = store.record_submission(tx, confirmation).await?;
//! let page = store.list_txs(safe, None, page_request).await?;
//! ```

mod error;
mod persistence;
mod types;

pub use self::{
    error::HistoryStoreError,
    persistence::pool::{DbConn, DbPool, establish_pool},
    types::{CursorError, PageCursor, PageRequest, Recorded, TxHistoryPage, TxHistoryPageDissolved},
};

use core::future::Future;

use std::collections::HashMap;

use diesel_async::AsyncConnection;
use safe_history_domain::{
    Timestamps,
    address::{Address, TxHash},
    confirmation::{ConfirmationKind, MultisigConfirmation},
    tx::{MultisigTx, TxHistoryEntry},
};
use safe_history_utils::u256_word;
use uuid::Uuid;

use self::{
    error::Result,
    persistence::{
        record::{
            insert::{NewConfirmationRecord, NewTxRecord},
            select::{ConfirmationRecord, ConfirmationRecordDissolved, TxRecord, TxRecordDissolved},
        },
        store::{self, StoreError},
    },
};

/// The storage interface the history engine is written against.
///
/// The engine only ever talks to storage through this trait, so the
/// database-backed [`MultisigHistoryStore`] can be swapped for an in-memory
/// implementation in tests.
pub trait HistoryStore {
    /// Records a validated submission: the transaction row if it is new, and
    /// the confirmation row if it is not a duplicate.
    ///
    /// Both writes happen atomically. Replaying a submission is not an
    /// error; the returned [`Recorded`] says which rows were actually
    /// created.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryStoreError::ConflictingProposal`] when the
    /// transaction hash is already stored with different parameters.
    fn record_submission(
        &self,
        tx: MultisigTx<()>,
        confirmation: MultisigConfirmation<()>,
    ) -> impl Future<Output = Result<Recorded>> + Send;

    /// Reads one page of a wallet's transaction history, newest first.
    ///
    /// When `owner_filter` is given, only transactions holding at least one
    /// confirmation from one of the listed owners are returned; the
    /// confirmations attached to each returned transaction are never
    /// filtered.
    fn list_txs(
        &self,
        safe: Address,
        owner_filter: Option<Vec<Address>>,
        page: PageRequest,
    ) -> impl Future<Output = Result<TxHistoryPage>> + Send;
}

impl<S> HistoryStore for std::sync::Arc<S>
where
    S: HistoryStore,
{
    fn record_submission(
        &self,
        tx: MultisigTx<()>,
        confirmation: MultisigConfirmation<()>,
    ) -> impl Future<Output = Result<Recorded>> + Send {
        (**self).record_submission(tx, confirmation)
    }

    fn list_txs(
        &self,
        safe: Address,
        owner_filter: Option<Vec<Address>>,
        page: PageRequest,
    ) -> impl Future<Output = Result<TxHistoryPage>> + Send {
        (**self).list_txs(safe, owner_filter, page)
    }
}

/// The PostgreSQL-backed [`HistoryStore`] implementation.
pub struct MultisigHistoryStore {
    pool: DbPool,
}

impl MultisigHistoryStore {
    /// Creates a new `MultisigHistoryStore` instance with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        MultisigHistoryStore { pool }
    }

    async fn get_conn(&self) -> Result<DbConn> {
        self.pool.get().await.map_err(|_| HistoryStoreError::Pool)
    }
}

impl HistoryStore for MultisigHistoryStore {
    #[tracing::instrument(
        skip_all,
        fields(
            safe = %tx.safe(),
            contract_tx_hash = %tx.contract_tx_hash(),
            kind = %confirmation.kind(),
            owner = %confirmation.owner(),
        ),
    )]
    async fn record_submission(
        &self,
        tx: MultisigTx<()>,
        confirmation: MultisigConfirmation<()>,
    ) -> Result<Recorded> {
        self.get_conn()
            .await?
            .transaction(|conn| {
                Box::pin(async move {
                    let safe_address = tx.safe().to_string();
                    let to_address = tx.to().to_string();
                    let value = u256_word(tx.value());
                    let gas_token = tx.gas_token().to_string();
                    let refund_receiver = tx.refund_receiver().to_string();
                    let contract_tx_hash = tx.contract_tx_hash().to_string();

                    let new_tx = NewTxRecord::builder()
                        .safe_address(&safe_address)
                        .to_address(&to_address)
                        .value(&value)
                        .maybe_data(tx.data())
                        .operation(tx.operation().into())
                        .nonce(to_signed(tx.nonce())?)
                        .safe_tx_gas(to_signed(tx.safe_tx_gas())?)
                        .data_gas(to_signed(tx.data_gas())?)
                        .gas_price(to_signed(tx.gas_price())?)
                        .gas_token(&gas_token)
                        .refund_receiver(&refund_receiver)
                        .contract_tx_hash(&contract_tx_hash)
                        .build();

                    let transaction_created = store::save_new_tx_if_absent(conn, new_tx).await?;

                    if !transaction_created {
                        let stored =
                            store::fetch_tx_by_safe_and_hash(conn, &safe_address, &contract_tx_hash)
                                .await?
                                .ok_or(StoreError::other("tx row missing after conflict"))?;

                        let (_, stored) = make_multisig_tx(stored)?;

                        if !stored.params_match(&tx) {
                            return Err(HistoryStoreError::ConflictingProposal {
                                contract_tx_hash: tx.contract_tx_hash(),
                            });
                        }
                    }

                    let owner_address = confirmation.owner().to_string();
                    let ledger_tx_hash = confirmation.ledger_tx_hash().to_string();
                    let sender_address = confirmation.sender().to_string();

                    let dedup_key = match confirmation.kind() {
                        ConfirmationKind::Confirmation => {
                            format!("{}:{owner_address}", ConfirmationKind::Confirmation)
                        },
                        ConfirmationKind::Execution => {
                            format!("{}:{ledger_tx_hash}", ConfirmationKind::Execution)
                        },
                    };

                    let new_confirmation = NewConfirmationRecord::builder()
                        .safe_address(&safe_address)
                        .contract_tx_hash(&contract_tx_hash)
                        .owner_address(&owner_address)
                        .kind(confirmation.kind().into())
                        .ledger_tx_hash(&ledger_tx_hash)
                        .block_number(to_signed(confirmation.block_number())?)
                        .block_date_time(confirmation.block_date_time())
                        .sender_address(&sender_address)
                        .dedup_key(&dedup_key)
                        .build();

                    let confirmation_created =
                        store::save_new_confirmation_if_absent(conn, new_confirmation).await?;

                    Ok(Recorded::builder()
                        .transaction_created(transaction_created)
                        .confirmation_created(confirmation_created)
                        .build())
                })
            })
            .await
    }

    #[tracing::instrument(
        skip_all,
        fields(%safe, limit = page.limit().get(), has_cursor = page.after().is_some()),
    )]
    async fn list_txs(
        &self,
        safe: Address,
        owner_filter: Option<Vec<Address>>,
        page: PageRequest,
    ) -> Result<TxHistoryPage> {
        let conn = &mut self.get_conn().await?;

        let safe_address = safe.to_string();
        let owners: Option<Vec<String>> =
            owner_filter.map(|owners| owners.iter().map(ToString::to_string).collect());

        let total = store::count_txs_by_safe(conn, &safe_address, owners.as_deref()).await?;

        let limit = i64::from(page.limit().get());
        let after = page.after().map(|cursor| (cursor.created_at(), cursor.id()));

        // One extra row decides whether a next page exists.
        let mut records =
            store::fetch_tx_page_by_safe(conn, &safe_address, owners.as_deref(), after, limit + 1)
                .await?;

        let has_more = records.len() as i64 > limit;
        if has_more {
            records.truncate(limit as usize);
        }

        let mut ids = Vec::with_capacity(records.len());
        let mut txs = Vec::with_capacity(records.len());

        for record in records {
            let (id, tx) = make_multisig_tx(record)?;
            ids.push(id);
            txs.push(tx);
        }

        let next = has_more
            .then(|| {
                ids.last().zip(txs.last()).map(|(&id, tx)| {
                    PageCursor::builder().created_at(tx.aux().created_at()).id(id).build()
                })
            })
            .flatten();

        let hashes: Vec<String> =
            txs.iter().map(|tx| tx.contract_tx_hash().to_string()).collect();

        let mut confirmations_by_hash: HashMap<TxHash, Vec<MultisigConfirmation>> = HashMap::new();

        for record in
            store::fetch_confirmations_by_tx_hashes(conn, &safe_address, &hashes).await?
        {
            let confirmation = make_confirmation(record)?;
            confirmations_by_hash
                .entry(confirmation.contract_tx_hash())
                .or_default()
                .push(confirmation);
        }

        let entries = txs
            .into_iter()
            .map(|tx| {
                let confirmations =
                    confirmations_by_hash.remove(&tx.contract_tx_hash()).unwrap_or_default();

                TxHistoryEntry::builder().tx(tx).confirmations(confirmations).build()
            })
            .collect();

        // casting total to u64 is safe as count >= 0
        Ok(TxHistoryPage::builder()
            .total(total as u64)
            .maybe_next(next)
            .entries(entries)
            .build())
    }
}

fn to_signed(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| HistoryStoreError::InvalidValue)
}

fn make_multisig_tx(tx_record: TxRecord) -> Result<(Uuid, MultisigTx)> {
    let TxRecordDissolved {
        id,
        safe_address,
        to_address,
        value,
        data,
        operation,
        nonce,
        safe_tx_gas,
        data_gas,
        gas_price,
        gas_token,
        refund_receiver,
        contract_tx_hash,
        created_at,
    } = tx_record.dissolve();

    if value.len() != 32 {
        return Err(HistoryStoreError::InvalidValue);
    }

    let timestamps = Timestamps::builder().created_at(created_at).updated_at(created_at).build();

    let tx = MultisigTx::builder()
        .safe(parse_stored(&safe_address)?)
        .to(parse_stored(&to_address)?)
        .value(primitive_types::U256::from_big_endian(&value))
        .maybe_data(data)
        .operation(operation.into_inner())
        .nonce(to_unsigned(nonce)?)
        .safe_tx_gas(to_unsigned(safe_tx_gas)?)
        .data_gas(to_unsigned(data_gas)?)
        .gas_price(to_unsigned(gas_price)?)
        .gas_token(parse_stored(&gas_token)?)
        .refund_receiver(parse_stored(&refund_receiver)?)
        .contract_tx_hash(parse_stored(&contract_tx_hash)?)
        .aux(timestamps)
        .build();

    Ok((id, tx))
}

fn make_confirmation(confirmation_record: ConfirmationRecord) -> Result<MultisigConfirmation> {
    let ConfirmationRecordDissolved {
        contract_tx_hash,
        owner_address,
        kind,
        ledger_tx_hash,
        block_number,
        block_date_time,
        sender_address,
        created_at,
        ..
    } = confirmation_record.dissolve();

    let timestamps = Timestamps::builder().created_at(created_at).updated_at(created_at).build();

    let confirmation = MultisigConfirmation::builder()
        .contract_tx_hash(parse_stored(&contract_tx_hash)?)
        .owner(parse_stored(&owner_address)?)
        .kind(kind.into_inner())
        .ledger_tx_hash(parse_stored(&ledger_tx_hash)?)
        .block_number(to_unsigned(block_number)?)
        .block_date_time(block_date_time)
        .sender(parse_stored(&sender_address)?)
        .aux(timestamps)
        .build();

    Ok(confirmation)
}

fn parse_stored<T>(text: &str) -> Result<T>
where
    T: core::str::FromStr,
{
    text.parse().map_err(|_| HistoryStoreError::InvalidValue)
}

fn to_unsigned(value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| HistoryStoreError::InvalidValue)
}
