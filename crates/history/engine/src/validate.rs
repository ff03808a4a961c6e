//! Field-level parsing and on-chain authorization of submissions.
//!
//! Parsing is pure and reports the first bad field by its wire name; nothing
//! touches the ledger until every field has parsed and the submitted hash
//! matches the recomputed one.

use chrono::{DateTime, Utc};
use safe_history_domain::{
    address::{Address, TxHash},
    confirmation::{ConfirmationKind, MultisigConfirmation},
    tx::{MultisigTx, SafeOperation},
};
use safe_history_utils::{decode_hex, u256_from_dec};

use crate::{
    error::{HistoryEngineError, SubmissionRejected},
    ledger::LedgerGateway,
    types::request::{SubmitTxRequest, SubmitTxRequestDissolved},
};

/// A submission whose fields all parsed and whose hash checks out.
#[derive(Debug)]
pub(crate) struct ParsedSubmission {
    pub tx: MultisigTx<()>,
    pub kind: ConfirmationKind,
    pub sender: Address,
    pub ledger_tx_hash: TxHash,
    pub block_number: u64,
    pub block_date_time: DateTime<Utc>,
}

pub(crate) fn parse(request: SubmitTxRequest) -> Result<ParsedSubmission, SubmissionRejected> {
    let SubmitTxRequestDissolved {
        safe,
        to,
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
        kind,
        sender,
        ledger_tx_hash,
        block_number,
        block_date_time,
    } = request.dissolve();

    let to = parse_address("to", &to)?;

    let value =
        u256_from_dec(&value).map_err(|e| SubmissionRejected::malformed("value", e.to_string()))?;

    let data = parse_payload(data.as_deref())?;

    let operation = SafeOperation::try_from(operation)
        .map_err(|_| SubmissionRejected::malformed("operation", "must be 0, 1 or 2"))?;

    let gas_token = parse_optional_address("gasToken", gas_token.as_deref())?;
    let refund_receiver = parse_optional_address("refundReceiver", refund_receiver.as_deref())?;

    let submitted = parse_tx_hash("contractTransactionHash", &contract_tx_hash)?;

    let kind = kind.parse::<ConfirmationKind>().map_err(|_| {
        SubmissionRejected::malformed("type", "must be `confirmation` or `execution`")
    })?;

    let sender = parse_address("sender", &sender)?;
    let ledger_tx_hash = parse_tx_hash("transactionHash", &ledger_tx_hash)?;

    let tx = MultisigTx::builder()
        .safe(safe)
        .to(to)
        .value(value)
        .maybe_data(data)
        .operation(operation)
        .nonce(nonce)
        .safe_tx_gas(safe_tx_gas)
        .data_gas(data_gas)
        .gas_price(gas_price)
        .gas_token(gas_token)
        .refund_receiver(refund_receiver)
        .contract_tx_hash(submitted)
        .aux(())
        .build();

    let computed = tx.compute_contract_tx_hash();

    if computed != submitted {
        return Err(SubmissionRejected::HashMismatch { computed, submitted });
    }

    Ok(ParsedSubmission { tx, kind, sender, ledger_tx_hash, block_number, block_date_time })
}

pub(crate) async fn authorize<G>(
    gateway: &G,
    parsed: ParsedSubmission,
) -> Result<(MultisigTx<()>, MultisigConfirmation<()>), HistoryEngineError>
where
    G: LedgerGateway,
{
    let ParsedSubmission { tx, kind, sender, ledger_tx_hash, block_number, block_date_time } =
        parsed;

    let safe = tx.safe();

    let owners = gateway
        .get_owners(safe)
        .await?
        .ok_or(SubmissionRejected::UnknownWallet { safe })?;

    if !owners.contains(&sender) {
        return Err(SubmissionRejected::UnauthorizedSender { safe, sender }.into());
    }

    match kind {
        ConfirmationKind::Confirmation => {
            if !gateway.is_hash_approved(safe, sender, tx.contract_tx_hash()).await? {
                return Err(SubmissionRejected::NotYetApproved {
                    owner: sender,
                    contract_tx_hash: tx.contract_tx_hash(),
                }
                .into());
            }
        },
        ConfirmationKind::Execution => {
            gateway
                .get_tx_receipt(ledger_tx_hash)
                .await?
                .filter(|receipt| receipt.success() && receipt.to() == Some(safe))
                .ok_or(SubmissionRejected::ExecutionUnverified { safe, ledger_tx_hash })?;
        },
    }

    let confirmation = MultisigConfirmation::builder()
        .contract_tx_hash(tx.contract_tx_hash())
        .owner(sender)
        .kind(kind)
        .ledger_tx_hash(ledger_tx_hash)
        .block_number(block_number)
        .block_date_time(block_date_time)
        .sender(sender)
        .aux(())
        .build();

    Ok((tx, confirmation))
}

fn parse_address(field: &'static str, text: &str) -> Result<Address, SubmissionRejected> {
    text.parse().map_err(|e: safe_history_domain::address::AddressError| {
        SubmissionRejected::malformed(field, e.to_string())
    })
}

fn parse_optional_address(
    field: &'static str,
    text: Option<&str>,
) -> Result<Address, SubmissionRejected> {
    text.map_or(Ok(Address::ZERO), |text| parse_address(field, text))
}

fn parse_tx_hash(field: &'static str, text: &str) -> Result<TxHash, SubmissionRejected> {
    text.parse().map_err(|e: safe_history_domain::address::TxHashError| {
        SubmissionRejected::malformed(field, e.to_string())
    })
}

fn parse_payload(text: Option<&str>) -> Result<Option<Vec<u8>>, SubmissionRejected> {
    let Some(text) = text else {
        return Ok(None);
    };

    if text.is_empty() || text == "0x" {
        return Ok(None);
    }

    decode_hex(text)
        .map(Some)
        .map_err(|e| SubmissionRejected::malformed("data", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use safe_history_domain::tx_hash::{SafeTxParams, contract_tx_hash};

    const TO: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    fn safe_address() -> Address {
        Address::from([0x42u8; 20])
    }

    fn matching_hash(safe: Address) -> TxHash {
        contract_tx_hash(&SafeTxParams {
            safe,
            to: TO.parse().unwrap(),
            value: u256_from_dec("1000000000000000000").unwrap(),
            data: None,
            operation: SafeOperation::Call,
            nonce: 7,
            safe_tx_gas: 50_000,
            data_gas: 21_000,
            gas_price: 1,
            gas_token: Address::ZERO,
            refund_receiver: Address::ZERO,
        })
    }

    fn request(to: &str, kind: &str, hash: TxHash) -> SubmitTxRequest {
        SubmitTxRequest::builder()
            .safe(safe_address())
            .to(to.to_owned())
            .value("1000000000000000000".to_owned())
            .operation(0)
            .nonce(7)
            .safe_tx_gas(50_000)
            .data_gas(21_000)
            .gas_price(1)
            .contract_tx_hash(hash.to_string())
            .kind(kind.to_owned())
            .sender(TO.to_owned())
            .ledger_tx_hash(TxHash::from([0xabu8; 32]).to_string())
            .block_number(100)
            .block_date_time(chrono::DateTime::UNIX_EPOCH)
            .build()
    }

    #[test]
    fn accepts_a_well_formed_submission() {
        let safe = safe_address();

        let parsed = parse(request(TO, "confirmation", matching_hash(safe))).unwrap();

        assert_eq!(parsed.tx.safe(), safe);
        assert_eq!(parsed.kind, ConfirmationKind::Confirmation);
        assert!(parsed.tx.data().is_none());
    }

    #[test]
    fn reports_bad_fields_by_wire_name() {
        let hash = matching_hash(safe_address());

        let rejection = parse(request("not-an-address", "confirmation", hash)).unwrap_err();

        assert!(matches!(
            rejection,
            SubmissionRejected::MalformedInput { field: "to", .. }
        ));
    }

    #[test]
    fn rejects_unknown_evidence_kinds() {
        let hash = matching_hash(safe_address());

        let rejection = parse(request(TO, "wrong_type", hash)).unwrap_err();

        assert!(matches!(
            rejection,
            SubmissionRejected::MalformedInput { field: "type", .. }
        ));
    }

    #[test]
    fn rejects_a_tampered_hash() {
        let rejection =
            parse(request(TO, "confirmation", TxHash::from([0u8; 32]))).unwrap_err();

        assert!(matches!(rejection, SubmissionRejected::HashMismatch { .. }));
    }

    #[test]
    fn empty_payload_forms_are_equivalent() {
        assert_eq!(parse_payload(None).unwrap(), None);
        assert_eq!(parse_payload(Some("")).unwrap(), None);
        assert_eq!(parse_payload(Some("0x")).unwrap(), None);
        assert_eq!(parse_payload(Some("0xabcd")).unwrap(), Some(vec![0xab, 0xcd]));
        assert!(parse_payload(Some("abcd")).is_err());
    }
}
