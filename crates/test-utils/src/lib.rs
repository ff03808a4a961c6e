//! Test utilities for safe history components.
//!
//! This crate provides in-process doubles for the engine's two seams — a
//! scripted [`MockLedgerGateway`] and an in-memory [`MemoryHistoryStore`]
//! with the same dedup and ordering semantics as the PostgreSQL store — plus
//! fixture builders for well-formed submissions, so integration tests across
//! this workspace run without a database or a ledger node.

use core::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use chrono::{DateTime, Utc};
use primitive_types::U256;
use safe_history_domain::{
    Timestamps,
    address::{Address, TxHash},
    confirmation::{ConfirmationKind, MultisigConfirmation},
    tx::{MultisigTx, SafeOperation, TxHistoryEntry},
    tx_hash::{SafeTxParams, contract_tx_hash},
};
use safe_history_engine::{LedgerError, LedgerGateway, TxReceipt, request::SubmitTxRequest};
use safe_history_store::{
    HistoryStore, HistoryStoreError, PageCursor, PageRequest, Recorded, TxHistoryPage,
};
use uuid::Uuid;

// LEDGER GATEWAY DOUBLE
// ================================================================================================

/// A scripted [`LedgerGateway`]: tests deploy wallets, approve hashes, and
/// plant receipts up front, then hand the gateway to the engine.
#[derive(Default)]
pub struct MockLedgerGateway {
    owners: Mutex<HashMap<Address, Vec<Address>>>,
    approved: Mutex<HashSet<(Address, Address, TxHash)>>,
    receipts: Mutex<HashMap<TxHash, TxReceipt>>,
    nonces: Mutex<HashMap<Address, u64>>,
    unavailable: AtomicBool,
}

impl MockLedgerGateway {
    /// Creates a gateway with no deployed wallets, approvals, or receipts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a wallet contract with the given owner set.
    pub fn deploy_wallet(&self, safe: Address, owners: Vec<Address>) {
        self.owners.lock().unwrap().insert(safe, owners);
    }

    /// Marks `contract_tx_hash` as approved by `owner` in `safe`'s on-chain
    /// approval mapping.
    pub fn approve_hash(&self, safe: Address, owner: Address, contract_tx_hash: TxHash) {
        self.approved.lock().unwrap().insert((safe, owner, contract_tx_hash));
    }

    /// Plants a mined-transaction receipt.
    pub fn put_receipt(&self, ledger_tx_hash: TxHash, receipt: TxReceipt) {
        self.receipts.lock().unwrap().insert(ledger_tx_hash, receipt);
    }

    /// Sets the wallet's current transaction nonce. Deployed wallets
    /// without an explicit nonce report zero.
    pub fn set_nonce(&self, safe: Address, nonce: u64) {
        self.nonces.lock().unwrap().insert(safe, nonce);
    }

    /// Makes every subsequent gateway call fail, as an unreachable node
    /// would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), LedgerError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LedgerError::Rpc { code: -32000, message: "node down".to_owned() });
        }

        Ok(())
    }
}

impl LedgerGateway for MockLedgerGateway {
    async fn get_owners(&self, wallet: Address) -> Result<Option<Vec<Address>>, LedgerError> {
        self.check_available()?;

        Ok(self.owners.lock().unwrap().get(&wallet).cloned())
    }

    async fn is_hash_approved(
        &self,
        wallet: Address,
        owner: Address,
        contract_tx_hash: TxHash,
    ) -> Result<bool, LedgerError> {
        self.check_available()?;

        Ok(self.approved.lock().unwrap().contains(&(wallet, owner, contract_tx_hash)))
    }

    async fn get_tx_receipt(
        &self,
        ledger_tx_hash: TxHash,
    ) -> Result<Option<TxReceipt>, LedgerError> {
        self.check_available()?;

        Ok(self.receipts.lock().unwrap().get(&ledger_tx_hash).copied())
    }

    async fn get_nonce(&self, wallet: Address) -> Result<Option<u64>, LedgerError> {
        self.check_available()?;

        if !self.owners.lock().unwrap().contains_key(&wallet) {
            return Ok(None);
        }

        Ok(Some(self.nonces.lock().unwrap().get(&wallet).copied().unwrap_or(0)))
    }
}

// HISTORY STORE DOUBLE
// ================================================================================================

/// An in-memory [`HistoryStore`] mirroring the PostgreSQL semantics:
/// immutable parameters per stored hash, per-owner/per-ledger-tx dedup, and
/// keyset pagination on `(created_at, id)`.
///
/// Row timestamps come from a monotonic counter, so insertion order is
/// deterministic regardless of wall-clock resolution.
#[derive(Default)]
pub struct MemoryHistoryStore {
    inner: Mutex<MemoryInner>,
    ticks: AtomicI64,
}

#[derive(Default)]
struct MemoryInner {
    txs: Vec<(Uuid, MultisigTx)>,
    confirmations: Vec<MultisigConfirmation>,
}

const MEMORY_EPOCH_MICROS: i64 = 1_700_000_000_000_000;

impl MemoryHistoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn tick(&self) -> DateTime<Utc> {
        let micros = MEMORY_EPOCH_MICROS + self.ticks.fetch_add(1, Ordering::SeqCst);

        DateTime::from_timestamp_micros(micros).unwrap()
    }
}

impl HistoryStore for MemoryHistoryStore {
    async fn record_submission(
        &self,
        tx: MultisigTx<()>,
        confirmation: MultisigConfirmation<()>,
    ) -> Result<Recorded, HistoryStoreError> {
        let created_at = self.tick();
        let mut inner = self.inner.lock().unwrap();

        let existing_matches = inner
            .txs
            .iter()
            .find(|(_, stored)| {
                stored.safe() == tx.safe() && stored.contract_tx_hash() == tx.contract_tx_hash()
            })
            .map(|(_, stored)| stored.params_match(&tx));

        let transaction_created = match existing_matches {
            Some(false) => {
                return Err(HistoryStoreError::ConflictingProposal {
                    contract_tx_hash: tx.contract_tx_hash(),
                });
            },
            Some(true) => false,
            None => {
                let timestamps =
                    Timestamps::builder().created_at(created_at).updated_at(created_at).build();

                inner.txs.push((Uuid::new_v4(), tx.clone().with_aux(timestamps)));

                true
            },
        };

        let duplicate = inner.confirmations.iter().any(|stored| {
            stored.contract_tx_hash() == confirmation.contract_tx_hash()
                && stored.kind() == confirmation.kind()
                && match confirmation.kind() {
                    ConfirmationKind::Confirmation => stored.owner() == confirmation.owner(),
                    ConfirmationKind::Execution => {
                        stored.ledger_tx_hash() == confirmation.ledger_tx_hash()
                    },
                }
        });

        if !duplicate {
            let timestamps =
                Timestamps::builder().created_at(created_at).updated_at(created_at).build();

            inner.confirmations.push(confirmation.with_aux(timestamps));
        }

        Ok(Recorded::builder()
            .transaction_created(transaction_created)
            .confirmation_created(!duplicate)
            .build())
    }

    async fn list_txs(
        &self,
        safe: Address,
        owner_filter: Option<Vec<Address>>,
        page: PageRequest,
    ) -> Result<TxHistoryPage, HistoryStoreError> {
        let inner = self.inner.lock().unwrap();

        let mut matches: Vec<(Uuid, MultisigTx)> = inner
            .txs
            .iter()
            .filter(|(_, tx)| tx.safe() == safe)
            .filter(|(_, tx)| {
                owner_filter.as_ref().is_none_or(|owners| {
                    inner.confirmations.iter().any(|confirmation| {
                        confirmation.contract_tx_hash() == tx.contract_tx_hash()
                            && owners.contains(&confirmation.owner())
                    })
                })
            })
            .cloned()
            .collect();

        matches.sort_by(|(id_a, tx_a), (id_b, tx_b)| {
            (tx_b.aux().created_at(), id_b).cmp(&(tx_a.aux().created_at(), id_a))
        });

        let total = matches.len() as u64;

        if let Some(cursor) = page.after() {
            matches.retain(|(id, tx)| {
                (tx.aux().created_at(), *id) < (cursor.created_at(), cursor.id())
            });
        }

        let limit = page.limit().get() as usize;
        let has_more = matches.len() > limit;
        matches.truncate(limit);

        let next = has_more
            .then(|| {
                matches.last().map(|(id, tx)| {
                    PageCursor::builder().created_at(tx.aux().created_at()).id(*id).build()
                })
            })
            .flatten();

        let entries = matches
            .into_iter()
            .map(|(_, tx)| {
                let mut confirmations: Vec<MultisigConfirmation> = inner
                    .confirmations
                    .iter()
                    .filter(|confirmation| {
                        confirmation.contract_tx_hash() == tx.contract_tx_hash()
                    })
                    .cloned()
                    .collect();

                confirmations.sort_by(|a, b| {
                    b.block_date_time()
                        .cmp(&a.block_date_time())
                        .then(a.aux().created_at().cmp(&b.aux().created_at()))
                });

                TxHistoryEntry::builder().tx(tx).confirmations(confirmations).build()
            })
            .collect();

        Ok(TxHistoryPage::builder().total(total).maybe_next(next).entries(entries).build())
    }
}

// FIXTURES
// ================================================================================================

/// A deterministic address for owner or wallet `index`.
pub fn address(index: u8) -> Address {
    Address::from([index; 20])
}

/// A deterministic ledger transaction hash for `index`.
pub fn ledger_hash(index: u8) -> TxHash {
    TxHash::from([index; 32])
}

/// The hash a well-formed [`submission`] with these coordinates carries.
#[bon::builder]
pub fn fixture_hash(
    safe: Address,
    #[builder(default = 0)] nonce: u64,
    #[builder(default = 1_000_000)] value_wei: u64,
) -> TxHash {
    contract_tx_hash(&SafeTxParams {
        safe,
        to: address(0xBB),
        value: U256::from(value_wei),
        data: None,
        operation: SafeOperation::Call,
        nonce,
        safe_tx_gas: 50_000,
        data_gas: 21_000,
        gas_price: 1,
        gas_token: Address::ZERO,
        refund_receiver: Address::ZERO,
    })
}

/// Builds a well-formed submission whose hash matches its parameters.
///
/// Defaults give a `CONFIRMATION` at nonce 0; tests override what they care
/// about. The carried hash is the one [`fixture_hash`] returns for the same
/// `(safe, nonce)`.
#[bon::builder]
pub fn submission(
    safe: Address,
    sender: Address,
    #[builder(default = 0)] nonce: u64,
    #[builder(default = 1_000_000)] value_wei: u64,
    #[builder(default = ConfirmationKind::Confirmation)] kind: ConfirmationKind,
    #[builder(default = ledger_hash(0xEE))] ledger_tx_hash: TxHash,
    #[builder(default = 100)] block_number: u64,
    block_date_time: Option<DateTime<Utc>>,
    contract_tx_hash: Option<TxHash>,
) -> SubmitTxRequest {
    let hash = contract_tx_hash
        .unwrap_or_else(|| fixture_hash().safe(safe).nonce(nonce).value_wei(value_wei).call());

    let block_date_time = block_date_time.unwrap_or_else(|| {
        DateTime::from_timestamp(1_600_000_000 + block_number as i64, 0).unwrap()
    });

    SubmitTxRequest::builder()
        .safe(safe)
        .to(address(0xBB).to_string())
        .value(value_wei.to_string())
        .operation(SafeOperation::Call.as_u8())
        .nonce(nonce)
        .safe_tx_gas(50_000)
        .data_gas(21_000)
        .gas_price(1)
        .contract_tx_hash(hash.to_string())
        .kind(kind.to_string().to_lowercase())
        .sender(sender.to_string())
        .ledger_tx_hash(ledger_tx_hash.to_string())
        .block_number(block_number)
        .block_date_time(block_date_time)
        .build()
}

/// A receipt for a successful execution against `safe`.
pub fn execution_receipt(safe: Address, block_number: u64) -> TxReceipt {
    TxReceipt::builder().success(true).to(safe).block_number(block_number).build()
}
