//! User data retrieval and wallet assignment

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub username: String,
}

pub async fn get_user(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<impl IntoResponse> {
    let user = state.users.get(&query.username).await?;
    Ok(Json(json!({ "message": "Success", "data": user.profile() })))
}

#[derive(Debug, Deserialize)]
pub struct AllUsersQuery {
    /// Username to leave out of the result, typically the requester
    pub exclude: Option<String>,
}

pub async fn all_users(
    State(state): State<AppState>,
    Query(query): Query<AllUsersQuery>,
) -> ApiResult<impl IntoResponse> {
    let usernames = state.users.usernames(query.exclude.as_deref()).await?;
    Ok(Json(json!({ "message": "Success", "data": usernames })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateWalletRequest {
    pub username: String,
    pub wallet_id: String,
}

pub async fn update_wallet(
    State(state): State<AppState>,
    Json(req): Json<UpdateWalletRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state.users.set_wallet(&req.username, &req.wallet_id).await?;
    Ok(Json(json!({ "message": "Success", "data": user.profile() })))
}
