//! Error-to-response mapping
//!
//! Each engine error kind keeps its identity across the HTTP boundary as a
//! machine-readable code plus a status, instead of collapsing into one
//! generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use tidemark_engine::error::EscrowError;

/// Result alias for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Wrapper giving `EscrowError` an HTTP representation
pub struct ApiError(pub EscrowError);

impl From<EscrowError> for ApiError {
    fn from(err: EscrowError) -> Self {
        Self(err)
    }
}

fn status_and_code(err: &EscrowError) -> (StatusCode, &'static str) {
    use EscrowError::*;
    match err {
        ListingNotFound(_) => (StatusCode::NOT_FOUND, "listing_not_found"),
        UserNotFound(_) => (StatusCode::NOT_FOUND, "user_not_found"),
        WalletNotFound(_) => (StatusCode::NOT_FOUND, "wallet_not_found"),
        AlreadyEscrowed(_) => (StatusCode::CONFLICT, "already_escrowed"),
        State { .. } => (StatusCode::CONFLICT, "invalid_state"),
        EscrowIncomplete(_) => (StatusCode::BAD_REQUEST, "escrow_incomplete"),
        MissingField(_) => (StatusCode::BAD_REQUEST, "missing_field"),
        LedgerBuild(_) => (StatusCode::BAD_REQUEST, "ledger_build_error"),
        LedgerQuery(_) => (StatusCode::BAD_REQUEST, "ledger_query_error"),
        UsernameTaken(_) => (StatusCode::BAD_REQUEST, "username_taken"),
        Serialization(_) => (StatusCode::BAD_REQUEST, "serialization_error"),
        InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
        Auth(_) => (StatusCode::UNAUTHORIZED, "auth_error"),
        LedgerRpc(_) => (StatusCode::BAD_GATEWAY, "ledger_unreachable"),
        EntropyUnavailable(_) => (StatusCode::INTERNAL_SERVER_ERROR, "entropy_unavailable"),
        PersistenceFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "persistence_failed"),
        Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
        Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = status_and_code(&self.0);
        if status.is_server_error() {
            error!(code, "{}", self.0);
        }
        (status, Json(json!({ "code": code, "error": self.0.to_string() }))).into_response()
    }
}
