//! Route handlers.

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::core::LedgerStore;
use crate::types::{LedgerError, Transaction, TransactionId, Wallet, WalletId};

/// Creates the ledger routes.
pub fn routes<S: LedgerStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/wallet", post(create_wallet::<S>))
        .route("/wallet/{wallet_id}", get(get_wallet::<S>))
        .route(
            "/wallet/{wallet_id}/transactions",
            get(list_wallet_transactions::<S>),
        )
        .route("/transaction", post(create_transaction::<S>))
        .route("/transaction/{tran_id}", delete(revert_transaction::<S>))
}

/// Request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Target wallet.
    pub wallet_id: WalletId,
    /// Non-negative amount, as a JSON number or decimal string.
    pub amount: Decimal,
    /// `CREDIT` or `DEBIT`; validated by the processor.
    #[serde(rename = "type")]
    pub tx_type: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn path_id<T>(extracted: Result<Path<T>, PathRejection>, what: &str) -> Result<T, LedgerError> {
    extracted
        .map(|Path(id)| id)
        .map_err(|_| LedgerError::invalid_request(format!("invalid {what} id")))
}

async fn create_wallet<S: LedgerStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Wallet>, LedgerError> {
    state.ledger.create_wallet().await.map(Json)
}

async fn get_wallet<S: LedgerStore>(
    State(state): State<AppState<S>>,
    wallet_id: Result<Path<WalletId>, PathRejection>,
) -> Result<Json<Wallet>, LedgerError> {
    let wallet_id = path_id(wallet_id, "wallet")?;
    state.ledger.get_wallet(wallet_id).await.map(Json)
}

async fn list_wallet_transactions<S: LedgerStore>(
    State(state): State<AppState<S>>,
    wallet_id: Result<Path<WalletId>, PathRejection>,
) -> Result<Json<Vec<Transaction>>, LedgerError> {
    let wallet_id = path_id(wallet_id, "wallet")?;
    state
        .ledger
        .list_wallet_transactions(wallet_id)
        .await
        .map(Json)
}

async fn create_transaction<S: LedgerStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<Json<Transaction>, LedgerError> {
    let Json(request) =
        payload.map_err(|rejection| LedgerError::invalid_request(rejection.body_text()))?;
    state
        .ledger
        .create_transaction(request.wallet_id, &request.tx_type, request.amount)
        .await
        .map(Json)
}

async fn revert_transaction<S: LedgerStore>(
    State(state): State<AppState<S>>,
    tran_id: Result<Path<TransactionId>, PathRejection>,
) -> Result<Json<Transaction>, LedgerError> {
    let tran_id = path_id(tran_id, "transaction")?;
    state.ledger.revert_transaction(tran_id).await.map(Json)
}
