//! Escrow settlement routes
//!
//! The payloads returned here are unsigned; the caller signs and submits
//! them, then reports the resulting offer sequence and settlement back.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use tidemark_engine::escrow_coordinator::CreateEscrowRequest;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    /// Listing id
    pub id: i64,
    pub buyer: String,
    /// Seconds until the escrow becomes cancellable
    pub cancel_after: u32,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateRequest>,
) -> ApiResult<impl IntoResponse> {
    let tx = state
        .coordinator
        .create_escrow(CreateEscrowRequest {
            listing_id: req.id,
            buyer: req.buyer,
            cancel_after_secs: req.cancel_after,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Escrow payload created successfully", "data": tx })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct FinishRequest {
    pub id: i64,
}

pub async fn finish(
    State(state): State<AppState>,
    Json(req): Json<FinishRequest>,
) -> ApiResult<impl IntoResponse> {
    let tx = state.coordinator.finish_escrow(req.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Escrow finish payload created successfully", "data": tx })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SequenceRequest {
    pub id: i64,
    pub offer_sequence: u32,
}

pub async fn sequence(
    State(state): State<AppState>,
    Json(req): Json<SequenceRequest>,
) -> ApiResult<impl IntoResponse> {
    let listing = state
        .coordinator
        .record_offer_sequence(req.id, req.offer_sequence)
        .await?;
    Ok(Json(json!({ "message": "Offer sequence recorded", "data": listing.public() })))
}

#[derive(Debug, Deserialize)]
pub struct SettledRequest {
    pub id: i64,
}

pub async fn settled(
    State(state): State<AppState>,
    Json(req): Json<SettledRequest>,
) -> ApiResult<impl IntoResponse> {
    let listing = state.coordinator.mark_settled(req.id).await?;
    Ok(Json(json!({ "message": "Escrow marked settled", "data": listing.public() })))
}
