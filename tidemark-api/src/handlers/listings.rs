//! Listing CRUD
//!
//! Fetching a listing and deleting one are separate operations with
//! separate verbs; a read never mutates.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use tidemark_engine::models::NewListing;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateListingRequest {
    pub username: String,
    pub listing_name: String,
    /// Price in drops
    pub price: i64,
    pub listing_description: String,
}

pub async fn create_listing(
    State(state): State<AppState>,
    Json(req): Json<CreateListingRequest>,
) -> ApiResult<impl IntoResponse> {
    let listing = state
        .listings
        .insert(NewListing {
            seller: req.username,
            name: req.listing_name,
            description: req.listing_description,
            price_drops: req.price,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Listing created successfully", "data": listing.public() })),
    ))
}

pub async fn all_listings(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let listings = state.listings.all().await?;
    let views: Vec<_> = listings.iter().map(|l| l.public()).collect();
    Ok(Json(json!({ "message": "Success", "data": views })))
}

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub id: i64,
}

pub async fn get_listing(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> ApiResult<impl IntoResponse> {
    let listing = state.listings.get(query.id).await?;
    Ok(Json(json!({ "message": "Success", "data": listing.public() })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateListingRequest {
    pub id: i64,
    pub listing_name: String,
    pub price: i64,
    pub listing_description: String,
}

pub async fn update_listing(
    State(state): State<AppState>,
    Json(req): Json<UpdateListingRequest>,
) -> ApiResult<impl IntoResponse> {
    let listing = state
        .listings
        .update_details(req.id, req.listing_name, req.listing_description, req.price)
        .await?;
    Ok(Json(json!({ "message": "Listing updated successfully", "data": listing.public() })))
}

#[derive(Debug, Deserialize)]
pub struct ListingIdRequest {
    pub id: i64,
}

pub async fn remove_listing(
    State(state): State<AppState>,
    Json(req): Json<ListingIdRequest>,
) -> ApiResult<impl IntoResponse> {
    state.listings.remove(req.id).await?;
    Ok(Json(json!({ "message": "Listing deleted successfully" })))
}

pub async fn reset_listing(
    State(state): State<AppState>,
    Json(req): Json<ListingIdRequest>,
) -> ApiResult<impl IntoResponse> {
    let listing = state.coordinator.reset_escrow(req.id).await?;
    Ok(Json(json!({ "message": "Listing updated successfully", "data": listing.public() })))
}
