//! REST API server for the Tidemark marketplace
//!
//! Thin HTTP layer over `tidemark-engine`: route dispatch, request/response
//! shuffling and error-to-status mapping. All domain behavior lives in the
//! engine crate.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::AppState;

/// Build the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(handlers::ping))
        // User accounts
        .route("/app/register", post(handlers::auth::register))
        .route("/app/login", post(handlers::auth::login))
        .route("/app/user", get(handlers::users::get_user))
        .route("/app/all_users", get(handlers::users::all_users))
        .route("/app/update_wallet", put(handlers::users::update_wallet))
        // Listings
        .route("/app/create_listing", post(handlers::listings::create_listing))
        .route("/app/all_listings", get(handlers::listings::all_listings))
        .route("/app/listing", get(handlers::listings::get_listing))
        .route("/app/update_listing", put(handlers::listings::update_listing))
        .route("/app/remove_listing", delete(handlers::listings::remove_listing))
        .route("/app/reset_listing", put(handlers::listings::reset_listing))
        // Escrow settlement
        .route("/escrow/create", post(handlers::escrow::create))
        .route("/escrow/finish", post(handlers::escrow::finish))
        .route("/escrow/sequence", post(handlers::escrow::sequence))
        .route("/escrow/settled", post(handlers::escrow::settled))
        // Ledger queries
        .route("/xrp/get_balance", get(handlers::ledger::get_balance))
        .route("/xrp/get_trustlines", get(handlers::ledger::get_trustlines))
        .route("/xrp/summarize_trustlines", get(handlers::ledger::summarize_trustlines))
        .route(
            "/xrp/get_transaction_history",
            get(handlers::ledger::get_transaction_history),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
