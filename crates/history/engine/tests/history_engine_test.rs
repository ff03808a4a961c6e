//! integration tests for safe-history-engine

use core::num::NonZeroU32;

use std::sync::Arc;

use chrono::DateTime;
use primitive_types::U256;
use safe_history_domain::{
    address::Address,
    confirmation::{ConfirmationKind, MultisigConfirmation},
    tx::{MultisigTx, SafeOperation},
};
use safe_history_engine::{
    HistoryEngine, HistoryEngineError, LedgerGateway, SubmissionRejected, TxReceipt,
    request::ListTxRequest,
    response::{ListTxResponseDissolved, SubmissionOutcome, SubmitTxResponseDissolved},
};
use safe_history_store::{HistoryStore, HistoryStoreError, PageRequest};
use safe_history_test_utils::{
    MemoryHistoryStore, MockLedgerGateway, address, execution_receipt, fixture_hash, ledger_hash,
    submission,
};

type TestEngine = HistoryEngine<Arc<MemoryHistoryStore>, Arc<MockLedgerGateway>>;

fn engine() -> (TestEngine, Arc<MemoryHistoryStore>, Arc<MockLedgerGateway>) {
    let store = Arc::new(MemoryHistoryStore::new());
    let gateway = Arc::new(MockLedgerGateway::new());

    (HistoryEngine::new(store.clone(), gateway.clone()), store, gateway)
}

/// Deploys a three-owner wallet `address(0xAA)` and returns it with its
/// owners.
fn deploy_three_owner_wallet(gateway: &MockLedgerGateway) -> (Address, [Address; 3]) {
    let safe = address(0xAA);
    let owners = [address(1), address(2), address(3)];

    gateway.deploy_wallet(safe, owners.to_vec());

    (safe, owners)
}

#[tokio::test]
async fn records_and_lists_a_fully_confirmed_transaction() {
    // Arrange
    let (engine, _, gateway) = engine();
    let (safe, [alice, bob, charlie]) = deploy_three_owner_wallet(&gateway);

    let hash = fixture_hash().safe(safe).call();
    gateway.approve_hash(safe, alice, hash);
    gateway.approve_hash(safe, bob, hash);
    gateway.put_receipt(ledger_hash(0xEE), execution_receipt(safe, 102));

    // Act
    let first = engine
        .submit(submission().safe(safe).sender(alice).block_number(100).call())
        .await
        .unwrap();

    let second = engine
        .submit(submission().safe(safe).sender(bob).block_number(101).call())
        .await
        .unwrap();

    let third = engine
        .submit(
            submission()
                .safe(safe)
                .sender(charlie)
                .kind(ConfirmationKind::Execution)
                .block_number(102)
                .call(),
        )
        .await
        .unwrap();

    let page = engine.list_txs(ListTxRequest::builder().safe(safe).build()).await.unwrap();

    // Assert
    let SubmitTxResponseDissolved { outcome, contract_tx_hash } = first.dissolve();
    assert_eq!(outcome, SubmissionOutcome::Created);
    assert_eq!(contract_tx_hash, hash);

    let SubmitTxResponseDissolved { outcome, .. } = second.dissolve();
    assert_eq!(outcome, SubmissionOutcome::Created);

    let SubmitTxResponseDissolved { outcome, .. } = third.dissolve();
    assert_eq!(outcome, SubmissionOutcome::Created);

    let ListTxResponseDissolved { total, next, entries } = page.dissolve();
    assert_eq!(total, 1);
    assert!(next.is_none());
    assert_eq!(entries.len(), 1);

    let entry = &entries[0];
    assert_eq!(entry.tx().contract_tx_hash(), hash);
    assert_eq!(entry.tx().nonce(), 0);

    // Confirmations come back newest block first, the execution on top.
    let confirmations = entry.confirmations();
    assert_eq!(confirmations.len(), 3);
    assert_eq!(confirmations[0].kind(), ConfirmationKind::Execution);
    assert_eq!(confirmations[0].owner(), charlie);
    assert_eq!(confirmations[1].owner(), bob);
    assert_eq!(confirmations[2].owner(), alice);
}

#[tokio::test]
async fn replaying_a_submission_reports_duplicate_without_new_rows() {
    // Arrange
    let (engine, _, gateway) = engine();
    let (safe, [alice, ..]) = deploy_three_owner_wallet(&gateway);

    gateway.approve_hash(safe, alice, fixture_hash().safe(safe).call());

    // Act
    let first = engine.submit(submission().safe(safe).sender(alice).call()).await.unwrap();
    let replay = engine.submit(submission().safe(safe).sender(alice).call()).await.unwrap();

    let page = engine.list_txs(ListTxRequest::builder().safe(safe).build()).await.unwrap();

    // Assert
    let SubmitTxResponseDissolved { outcome, .. } = first.dissolve();
    assert_eq!(outcome, SubmissionOutcome::Created);

    let SubmitTxResponseDissolved { outcome, .. } = replay.dissolve();
    assert_eq!(outcome, SubmissionOutcome::Duplicate);

    let ListTxResponseDissolved { total, entries, .. } = page.dissolve();
    assert_eq!(total, 1);
    assert_eq!(entries[0].confirmations().len(), 1);
}

#[tokio::test]
async fn executions_collapse_by_ledger_hash_but_replacements_append() {
    // Arrange
    let (engine, _, gateway) = engine();
    let (safe, [alice, bob, ..]) = deploy_three_owner_wallet(&gateway);

    gateway.put_receipt(ledger_hash(0xEE), execution_receipt(safe, 100));
    gateway.put_receipt(ledger_hash(0xEF), execution_receipt(safe, 105));

    let execution = || {
        submission().safe(safe).kind(ConfirmationKind::Execution).block_number(100)
    };

    // Act
    let first = engine.submit(execution().sender(alice).call()).await.unwrap();

    // A second relay of the same mined transaction, reported by another owner.
    let relay = engine.submit(execution().sender(bob).call()).await.unwrap();

    // A replacement execution landed in a later block under its own hash.
    let replacement = engine
        .submit(
            submission()
                .safe(safe)
                .sender(alice)
                .kind(ConfirmationKind::Execution)
                .ledger_tx_hash(ledger_hash(0xEF))
                .block_number(105)
                .call(),
        )
        .await
        .unwrap();

    let page = engine.list_txs(ListTxRequest::builder().safe(safe).build()).await.unwrap();

    // Assert
    let SubmitTxResponseDissolved { outcome, .. } = first.dissolve();
    assert_eq!(outcome, SubmissionOutcome::Created);

    let SubmitTxResponseDissolved { outcome, .. } = relay.dissolve();
    assert_eq!(outcome, SubmissionOutcome::Duplicate);

    let SubmitTxResponseDissolved { outcome, .. } = replacement.dissolve();
    assert_eq!(outcome, SubmissionOutcome::Created);

    let ListTxResponseDissolved { total, entries, .. } = page.dissolve();
    assert_eq!(total, 1);

    let confirmations = entries[0].confirmations();
    assert_eq!(confirmations.len(), 2);
    assert_eq!(confirmations[0].ledger_tx_hash(), ledger_hash(0xEF));
    assert_eq!(confirmations[1].ledger_tx_hash(), ledger_hash(0xEE));
}

#[tokio::test]
async fn rejects_a_submission_whose_hash_does_not_match_its_parameters() {
    // Arrange
    let (engine, _, gateway) = engine();
    let (safe, [alice, ..]) = deploy_three_owner_wallet(&gateway);

    let foreign_hash = fixture_hash().safe(safe).nonce(7).call();

    // Act
    let result = engine
        .submit(submission().safe(safe).sender(alice).contract_tx_hash(foreign_hash).call())
        .await;

    // Assert
    assert!(matches!(
        result,
        Err(HistoryEngineError::Rejected(SubmissionRejected::HashMismatch { submitted, .. }))
            if submitted == foreign_hash
    ));
}

#[tokio::test]
async fn rejects_senders_outside_the_owner_set() {
    // Arrange
    let (engine, _, gateway) = engine();
    let (safe, _) = deploy_three_owner_wallet(&gateway);

    let outsider = address(0x99);

    // Act
    let result = engine.submit(submission().safe(safe).sender(outsider).call()).await;

    // Assert
    assert!(matches!(
        result,
        Err(HistoryEngineError::Rejected(SubmissionRejected::UnauthorizedSender {
            sender, ..
        })) if sender == outsider
    ));
}

#[tokio::test]
async fn rejects_a_confirmation_the_owner_has_not_approved_on_chain() {
    // Arrange
    let (engine, _, gateway) = engine();
    let (safe, [alice, ..]) = deploy_three_owner_wallet(&gateway);

    // Act
    let result = engine.submit(submission().safe(safe).sender(alice).call()).await;

    // Assert
    assert!(matches!(
        result,
        Err(HistoryEngineError::Rejected(SubmissionRejected::NotYetApproved { owner, .. }))
            if owner == alice
    ));
}

#[tokio::test]
async fn rejects_wallets_with_no_deployed_contract() {
    // Arrange
    let (engine, _, _) = engine();

    let safe = address(0xAA);

    // Act
    let result = engine.submit(submission().safe(safe).sender(address(1)).call()).await;

    // Assert
    assert!(matches!(
        result,
        Err(HistoryEngineError::Rejected(SubmissionRejected::UnknownWallet { safe: rejected }))
            if rejected == safe
    ));
}

#[tokio::test]
async fn rejects_executions_without_a_matching_successful_receipt() {
    // Arrange
    let (engine, _, gateway) = engine();
    let (safe, [alice, ..]) = deploy_three_owner_wallet(&gateway);

    let request = || {
        submission().safe(safe).sender(alice).kind(ConfirmationKind::Execution).call()
    };

    // Act: no receipt at all.
    let missing = engine.submit(request()).await;

    // Act: mined, but against a different contract.
    gateway.put_receipt(ledger_hash(0xEE), execution_receipt(address(0x77), 100));
    let wrong_target = engine.submit(request()).await;

    // Act: mined against the wallet, but reverted.
    gateway.put_receipt(
        ledger_hash(0xEE),
        TxReceipt::builder().success(false).to(safe).block_number(100).build(),
    );
    let reverted = engine.submit(request()).await;

    // Assert
    for result in [missing, wrong_target, reverted] {
        assert!(matches!(
            result,
            Err(HistoryEngineError::Rejected(SubmissionRejected::ExecutionUnverified { .. }))
        ));
    }
}

#[tokio::test]
async fn rejects_conflicting_parameters_for_an_already_stored_hash() {
    // Arrange
    let store = MemoryHistoryStore::new();

    let safe = address(0xAA);
    let hash = fixture_hash().safe(safe).call();

    let tx = |value: u64| {
        MultisigTx::builder()
            .safe(safe)
            .to(address(0xBB))
            .value(U256::from(value))
            .operation(SafeOperation::Call)
            .nonce(0)
            .safe_tx_gas(50_000)
            .data_gas(21_000)
            .gas_price(1)
            .gas_token(Address::ZERO)
            .refund_receiver(Address::ZERO)
            .contract_tx_hash(hash)
            .aux(())
            .build()
    };

    let confirmation = |owner: Address| {
        MultisigConfirmation::builder()
            .contract_tx_hash(hash)
            .owner(owner)
            .kind(ConfirmationKind::Confirmation)
            .ledger_tx_hash(ledger_hash(0xEE))
            .block_number(100)
            .block_date_time(DateTime::from_timestamp(1_600_000_100, 0).unwrap())
            .sender(owner)
            .aux(())
            .build()
    };

    // Act
    store.record_submission(tx(1_000_000), confirmation(address(1))).await.unwrap();
    let conflict = store.record_submission(tx(2_000_000), confirmation(address(2))).await;

    // Assert
    assert!(matches!(
        conflict,
        Err(HistoryStoreError::ConflictingProposal { contract_tx_hash }) if contract_tx_hash == hash
    ));

    // The stored row is untouched and still carries its single confirmation.
    let page = store
        .list_txs(safe, None, PageRequest::builder().limit(NonZeroU32::new(10).unwrap()).build())
        .await
        .unwrap();
    assert_eq!(page.total(), 1);
    assert_eq!(page.entries()[0].tx().value(), U256::from(1_000_000));
    assert_eq!(page.entries()[0].confirmations().len(), 1);
}

#[tokio::test]
async fn competing_proposals_at_the_same_nonce_both_appear_in_history() {
    // Arrange
    let (engine, _, gateway) = engine();
    let (safe, [alice, bob, _]) = deploy_three_owner_wallet(&gateway);

    gateway.approve_hash(safe, alice, fixture_hash().safe(safe).call());
    gateway.approve_hash(safe, bob, fixture_hash().safe(safe).value_wei(2_000_000).call());

    // Act
    engine.submit(submission().safe(safe).sender(alice).call()).await.unwrap();
    engine
        .submit(submission().safe(safe).sender(bob).value_wei(2_000_000).call())
        .await
        .unwrap();

    let page = engine.list_txs(ListTxRequest::builder().safe(safe).build()).await.unwrap();

    // Assert: same nonce, different hashes, two separate history rows.
    let ListTxResponseDissolved { total, entries, .. } = page.dissolve();
    assert_eq!(total, 2);
    assert_eq!(entries[0].tx().nonce(), 0);
    assert_eq!(entries[1].tx().nonce(), 0);
    assert_ne!(entries[0].tx().contract_tx_hash(), entries[1].tx().contract_tx_hash());
}

#[tokio::test]
async fn owner_filter_selects_transactions_without_hiding_confirmations() {
    // Arrange
    let (engine, _, gateway) = engine();
    let (safe, [alice, bob, _]) = deploy_three_owner_wallet(&gateway);

    let first_hash = fixture_hash().safe(safe).call();
    gateway.approve_hash(safe, alice, first_hash);
    gateway.approve_hash(safe, bob, first_hash);
    gateway.approve_hash(safe, bob, fixture_hash().safe(safe).nonce(1).call());

    engine.submit(submission().safe(safe).sender(alice).call()).await.unwrap();
    engine.submit(submission().safe(safe).sender(bob).block_number(101).call()).await.unwrap();
    engine.submit(submission().safe(safe).sender(bob).nonce(1).call()).await.unwrap();

    // Act
    let alice_view = engine
        .list_txs(ListTxRequest::builder().safe(safe).owners(vec![alice]).build())
        .await
        .unwrap();

    let stranger_view = engine
        .list_txs(ListTxRequest::builder().safe(safe).owners(vec![address(0x99)]).build())
        .await
        .unwrap();

    // Assert: the filter drops the nonce-1 transaction alice never confirmed,
    // but the kept transaction still shows bob's confirmation too.
    let ListTxResponseDissolved { total, entries, .. } = alice_view.dissolve();
    assert_eq!(total, 1);
    assert_eq!(entries[0].tx().contract_tx_hash(), first_hash);
    assert_eq!(entries[0].confirmations().len(), 2);

    let ListTxResponseDissolved { total, entries, .. } = stranger_view.dissolve();
    assert_eq!(total, 0);
    assert!(entries.is_empty());
}

#[tokio::test]
async fn pagination_stays_stable_while_new_transactions_arrive() {
    // Arrange
    let (engine, _, gateway) = engine();
    let (safe, [alice, ..]) = deploy_three_owner_wallet(&gateway);

    for nonce in 0..4 {
        gateway.approve_hash(safe, alice, fixture_hash().safe(safe).nonce(nonce).call());
    }

    for nonce in 0..3 {
        engine.submit(submission().safe(safe).sender(alice).nonce(nonce).call()).await.unwrap();
    }

    // Act: read the first page of two.
    let first_page = engine
        .list_txs(
            ListTxRequest::builder().safe(safe).limit(NonZeroU32::new(2).unwrap()).build(),
        )
        .await
        .unwrap();

    let ListTxResponseDissolved { total, next, entries } = first_page.dissolve();
    assert_eq!(total, 3);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].tx().nonce(), 2);
    assert_eq!(entries[1].tx().nonce(), 1);

    let cursor = next.expect("a third transaction remains").to_string();

    // A new proposal lands between the two reads.
    engine.submit(submission().safe(safe).sender(alice).nonce(3).call()).await.unwrap();

    let second_page = engine
        .list_txs(
            ListTxRequest::builder()
                .safe(safe)
                .cursor(cursor)
                .limit(NonZeroU32::new(2).unwrap())
                .build(),
        )
        .await
        .unwrap();

    // Assert: the cursor keeps reading older rows; the new proposal never
    // shifts into the resumed page.
    let ListTxResponseDissolved { total, next, entries } = second_page.dissolve();
    assert_eq!(total, 4);
    assert!(next.is_none());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].tx().nonce(), 0);
}

#[tokio::test]
async fn a_wallet_with_no_history_reads_back_empty() {
    // Arrange
    let (engine, _, _) = engine();

    // Act
    let page =
        engine.list_txs(ListTxRequest::builder().safe(address(0xAA)).build()).await.unwrap();

    // Assert
    let ListTxResponseDissolved { total, next, entries } = page.dissolve();
    assert_eq!(total, 0);
    assert!(next.is_none());
    assert!(entries.is_empty());
}

#[tokio::test]
async fn nonce_reads_distinguish_deployed_wallets_from_bare_addresses() {
    // Arrange
    let (_, _, gateway) = engine();
    let (safe, _) = deploy_three_owner_wallet(&gateway);

    // Act & Assert: a freshly deployed wallet starts at nonce zero.
    assert_eq!(gateway.get_nonce(safe).await.unwrap(), Some(0));

    gateway.set_nonce(safe, 7);
    assert_eq!(gateway.get_nonce(safe).await.unwrap(), Some(7));

    // An address with no contract has no nonce to report.
    assert_eq!(gateway.get_nonce(address(0xBB)).await.unwrap(), None);
}

#[tokio::test]
async fn ledger_outages_surface_as_unavailable_and_clear_on_recovery() {
    // Arrange
    let (engine, _, gateway) = engine();
    let (safe, [alice, ..]) = deploy_three_owner_wallet(&gateway);

    gateway.approve_hash(safe, alice, fixture_hash().safe(safe).call());
    gateway.set_unavailable(true);

    // Act
    let during_outage = engine.submit(submission().safe(safe).sender(alice).call()).await;

    gateway.set_unavailable(false);
    let after_recovery = engine.submit(submission().safe(safe).sender(alice).call()).await;

    // Assert
    assert!(matches!(during_outage, Err(HistoryEngineError::LedgerUnavailable(_))));

    let SubmitTxResponseDissolved { outcome, .. } = after_recovery.unwrap().dissolve();
    assert_eq!(outcome, SubmissionOutcome::Created);
}

#[tokio::test]
async fn rejects_malformed_cursors_by_field_name() {
    // Arrange
    let (engine, _, _) = engine();

    // Act
    let result = engine
        .list_txs(
            ListTxRequest::builder()
                .safe(address(0xAA))
                .cursor("not-a-cursor".to_owned())
                .build(),
        )
        .await;

    // Assert
    assert!(matches!(
        result,
        Err(HistoryEngineError::Rejected(SubmissionRejected::MalformedInput {
            field: "cursor",
            ..
        }))
    ));
}
