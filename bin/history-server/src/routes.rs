use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use safe_history_domain::address::Address;
use safe_history_engine::{
    request::{ListTxRequest, SubmitTxRequest},
    response::{ListTxResponseDissolved, SubmitTxResponseDissolved},
};

use crate::{
    App, AppDissolved,
    error::AppError,
    payload::{
        request::{ListTxQuery, ListTxQueryDissolved, SubmitTxPayload, SubmitTxPayloadDissolved},
        response::{ListTxResponsePayload, SubmitTxResponsePayload},
    },
};

#[tracing::instrument]
pub async fn health() -> StatusCode {
    StatusCode::OK
}

#[tracing::instrument(skip_all, fields(safe = %address))]
pub async fn submit_multisig_tx(
    State(app): State<App>,
    Path(address): Path<String>,
    Json(payload): Json<SubmitTxPayload>,
) -> Result<(StatusCode, Json<SubmitTxResponsePayload>), AppError> {
    let AppDissolved { engine } = app.dissolve();

    let safe = parse_wallet_address(&address)?;

    let SubmitTxPayloadDissolved {
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
    } = payload.dissolve();

    let request = SubmitTxRequest::builder()
        .safe(safe)
        .to(to)
        .value(value.into())
        .maybe_data(data)
        .operation(operation)
        .nonce(nonce)
        .safe_tx_gas(safe_tx_gas)
        .data_gas(data_gas)
        .gas_price(gas_price)
        .maybe_gas_token(gas_token)
        .maybe_refund_receiver(refund_receiver)
        .contract_tx_hash(contract_tx_hash)
        .kind(kind)
        .sender(sender)
        .ledger_tx_hash(ledger_tx_hash)
        .block_number(block_number)
        .block_date_time(block_date_time)
        .build();

    let SubmitTxResponseDissolved { outcome, contract_tx_hash } =
        engine.submit(request).await?.dissolve();

    let response = SubmitTxResponsePayload::builder()
        .outcome(outcome.to_string())
        .contract_transaction_hash(contract_tx_hash.to_string())
        .build();

    Ok((StatusCode::ACCEPTED, Json(response)))
}

#[tracing::instrument(skip_all, fields(safe = %address))]
pub async fn list_multisig_tx(
    State(app): State<App>,
    Path(address): Path<String>,
    Query(query): Query<ListTxQuery>,
) -> Result<Json<ListTxResponsePayload>, AppError> {
    let AppDissolved { engine } = app.dissolve();

    let safe = parse_wallet_address(&address)?;

    let ListTxQueryDissolved { owners, cursor, limit } = query.dissolve();

    let owners = owners.as_deref().map(parse_owners_filter).transpose()?;

    let request = ListTxRequest::builder()
        .safe(safe)
        .maybe_owners(owners)
        .maybe_cursor(cursor)
        .maybe_limit(limit)
        .build();

    let ListTxResponseDissolved { total, next, entries } =
        engine.list_txs(request).await?.dissolve();

    if total == 0 {
        return Err(AppError::EmptyHistory);
    }

    let response = ListTxResponsePayload::builder()
        .count(total)
        .maybe_next(next.map(|cursor| cursor.to_string()))
        .results(entries.into_iter().map(From::from).collect())
        .build();

    Ok(Json(response))
}

fn parse_wallet_address(address: &str) -> Result<Address, AppError> {
    address
        .parse()
        .map_err(|e: safe_history_domain::address::AddressError| {
            AppError::InvalidWalletAddress(e.to_string().into())
        })
        .inspect_err(|e| tracing::warn!("failed to parse wallet address: {e}"))
}

// A trailing comma in `owners=` is tolerated, matching established client
// behavior.
fn parse_owners_filter(owners: &str) -> Result<Vec<Address>, AppError> {
    owners
        .split(',')
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry.parse().map_err(|e: safe_history_domain::address::AddressError| {
                AppError::InvalidOwnersFilter(e.to_string().into())
            })
        })
        .collect()
}
