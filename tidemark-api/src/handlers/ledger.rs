//! Read-only ledger queries

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    pub address: String,
}

pub async fn get_balance(
    State(state): State<AppState>,
    Query(query): Query<AddressQuery>,
) -> ApiResult<impl IntoResponse> {
    let balance = state.ledger.balance(&query.address).await?;
    Ok(Json(json!({ "balance": balance })))
}

pub async fn get_trustlines(
    State(state): State<AppState>,
    Query(query): Query<AddressQuery>,
) -> ApiResult<impl IntoResponse> {
    let trustlines = state.ledger.trustlines(&query.address).await?;
    Ok(Json(json!({ "trustlines": trustlines })))
}

pub async fn summarize_trustlines(
    State(state): State<AppState>,
    Query(query): Query<AddressQuery>,
) -> ApiResult<impl IntoResponse> {
    let summary = state.ledger.summarize_trustlines(&query.address).await?;
    Ok(Json(summary))
}

pub async fn get_transaction_history(
    State(state): State<AppState>,
    Query(query): Query<AddressQuery>,
) -> ApiResult<impl IntoResponse> {
    let transactions = state.ledger.transaction_history(&query.address).await?;
    Ok(Json(json!({ "transactions": transactions })))
}
