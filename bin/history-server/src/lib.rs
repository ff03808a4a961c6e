#![allow(missing_docs)]

pub mod config;

mod error;
mod payload;
mod routes;

use std::sync::Arc;

use axum::{Router, routing};
use bon::Builder;
use dissolve_derive::Dissolve;
use safe_history_engine::{HistoryEngine, JsonRpcLedgerGateway};
use safe_history_store::MultisigHistoryStore;

/// The engine the server runs: Postgres storage, JSON-RPC ledger access.
pub type Engine = HistoryEngine<MultisigHistoryStore, JsonRpcLedgerGateway>;

pub fn create_router(app: App) -> Router {
    Router::new()
        .route("/health", routing::get(routes::health))
        .route(
            "/api/v1/safes/{address}/multisig-transactions",
            routing::post(routes::submit_multisig_tx).get(routes::list_multisig_tx),
        )
        .with_state(app)
}

#[derive(Clone, Builder, Dissolve)]
pub struct App {
    engine: Arc<Engine>,
}
