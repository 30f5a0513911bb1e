//! Marketplace backend engine with escrowed settlement on the XRP Ledger
//!
//! This crate implements the domain logic behind the Tidemark API:
//! - Crypto-condition generation for conditionally-released escrows
//! - Unsigned ledger transaction construction (create, finish, payments)
//! - Escrow workflow coordination against listing and user stores
//! - Read-only ledger queries (balances, trustlines, transaction history)
//!
//! Transactions are returned unsigned; signing and submission stay with the
//! caller so wallet secrets never reach this crate.

pub mod auth;
pub mod condition_generator;
pub mod error;
pub mod escrow_coordinator;
pub mod ledger_query;
pub mod models;
pub mod store;
pub mod transaction_builder;

use error::EscrowError;

/// Result type alias for engine operations
pub type EscrowResult<T> = Result<T, EscrowError>;
