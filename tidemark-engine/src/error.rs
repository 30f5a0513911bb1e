//! Error types for the marketplace engine
//!
//! One variant per failure kind so the API layer can map each to a distinct
//! status code instead of collapsing everything into a generic message.

use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EscrowError {
    /// Listing lookup failed
    #[error("Listing {0} not found")]
    ListingNotFound(i64),

    /// A participant has no wallet address on record
    #[error("No wallet address on record for {0}")]
    WalletNotFound(String),

    /// Escrow creation attempted while an unresolved escrow exists
    #[error("Listing {0} already has an open escrow")]
    AlreadyEscrowed(i64),

    /// Finish attempted without the full condition/fulfillment/sequence set
    #[error("Escrow for listing {0} is incomplete and cannot be finished")]
    EscrowIncomplete(i64),

    /// A transaction field that can never succeed on-ledger when absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The store rejected a write after a transaction was already built
    #[error("Persistence error: {0}")]
    PersistenceFailed(String),

    /// The secure random source could not be read
    #[error("Entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    /// Failure constructing a ledger-native transaction payload
    #[error("Transaction build error: {0}")]
    LedgerBuild(String),

    /// Invalid lifecycle transition
    #[error("Invalid state transition: {from_state} -> {to_state}: {reason}")]
    State {
        from_state: String,
        to_state: String,
        reason: String,
    },

    /// User lookup failed
    #[error("User {0} not found")]
    UserNotFound(String),

    /// Registration attempted with a username that is taken
    #[error("Username {0} already exists")]
    UsernameTaken(String),

    /// Login failed
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Credential hashing or token errors
    #[error("Auth error: {0}")]
    Auth(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Ledger JSON-RPC transport errors
    #[error("Ledger request error: {0}")]
    LedgerRpc(#[from] reqwest::Error),

    /// The ledger answered a query with an error result
    #[error("Ledger query failed: {0}")]
    LedgerQuery(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// General internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EscrowError {
    /// Create a persistence error
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        Self::PersistenceFailed(msg.into())
    }

    /// Create an entropy error
    pub fn entropy<S: Into<String>>(msg: S) -> Self {
        Self::EntropyUnavailable(msg.into())
    }

    /// Create a transaction build error
    pub fn ledger_build<S: Into<String>>(msg: S) -> Self {
        Self::LedgerBuild(msg.into())
    }

    /// Create a ledger query error
    pub fn ledger_query<S: Into<String>>(msg: S) -> Self {
        Self::LedgerQuery(msg.into())
    }

    /// Create a state transition error
    pub fn state<S: Into<String>>(from_state: S, to_state: S, reason: S) -> Self {
        Self::State {
            from_state: from_state.into(),
            to_state: to_state.into(),
            reason: reason.into(),
        }
    }

    /// Create an auth error
    pub fn auth<S: Into<String>>(msg: S) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}
