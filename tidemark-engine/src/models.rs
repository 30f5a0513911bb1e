//! Core data models for the marketplace
//!
//! Listings, users, and the escrow lifecycle state machine derived from a
//! listing's persisted escrow fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EscrowError;
use crate::EscrowResult;

/// Escrow lifecycle for a single listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscrowState {
    /// No escrow has been created for the listing
    NoEscrow,
    /// Condition and fulfillment persisted, settlement pending
    Open,
    /// Caller reported the finish transaction as validated
    Settled,
}

impl EscrowState {
    /// Check if this is a terminal state (only a reset leaves it)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled)
    }

    /// Check if this state allows escrow creation
    pub fn can_create(&self) -> bool {
        matches!(self, Self::NoEscrow)
    }

    /// Check if this state allows finishing
    pub fn can_finish(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Listing model representing an item for sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub seller: String,
    pub name: String,
    pub description: String,
    /// Price in drops (1 XRP = 1,000,000 drops)
    pub price_drops: i64,

    // Escrow fields: all null until an escrow is created, then all set.
    // A listing with only some of them set is inconsistent and the finish
    // path rejects it.
    pub buyer: Option<String>,
    pub escrow_condition: Option<String>,
    pub escrow_fulfillment: Option<String>,
    pub escrow_sequence: Option<u32>,
    pub escrow_settled_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Create a new listing with no escrow
    pub fn new(id: i64, seller: String, name: String, description: String, price_drops: i64) -> Self {
        Self {
            id,
            seller,
            name,
            description,
            price_drops,
            buyer: None,
            escrow_condition: None,
            escrow_fulfillment: None,
            escrow_sequence: None,
            escrow_settled_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Derive the escrow state from the persisted fields
    pub fn escrow_state(&self) -> EscrowState {
        if self.escrow_settled_at.is_some() {
            EscrowState::Settled
        } else if self.escrow_condition.is_some()
            || self.escrow_fulfillment.is_some()
            || self.escrow_sequence.is_some()
        {
            EscrowState::Open
        } else {
            EscrowState::NoEscrow
        }
    }

    /// Check that every field the finish transaction needs is present
    pub fn escrow_is_complete(&self) -> bool {
        self.buyer.is_some()
            && self.escrow_condition.is_some()
            && self.escrow_fulfillment.is_some()
            && self.escrow_sequence.is_some()
    }

    /// Projection safe to return to API callers. The condition and sequence
    /// are public on-ledger data; the fulfillment stays secret until it is
    /// disclosed in the finish transaction.
    pub fn public(&self) -> ListingView {
        ListingView {
            id: self.id,
            seller: self.seller.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            price_drops: self.price_drops,
            buyer: self.buyer.clone(),
            escrow_condition: self.escrow_condition.clone(),
            escrow_sequence: self.escrow_sequence,
            escrow_state: self.escrow_state(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Validate a lifecycle transition against the derived state
    pub fn validate_transition(&self, to_state: EscrowState) -> EscrowResult<()> {
        let from = self.escrow_state();
        let valid = match (from, to_state) {
            (EscrowState::NoEscrow, EscrowState::Open) => true,
            (EscrowState::Open, EscrowState::Settled) => true,
            // A reset returns any state to NoEscrow
            (_, EscrowState::NoEscrow) => true,
            _ => false,
        };

        if valid {
            Ok(())
        } else {
            Err(EscrowError::state(
                format!("{:?}", from),
                format!("{:?}", to_state),
                "Invalid escrow transition".to_string(),
            ))
        }
    }
}

/// Listing data without the escrow fulfillment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingView {
    pub id: i64,
    pub seller: String,
    pub name: String,
    pub description: String,
    pub price_drops: i64,
    pub buyer: Option<String>,
    pub escrow_condition: Option<String>,
    pub escrow_sequence: Option<u32>,
    pub escrow_state: EscrowState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a listing; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewListing {
    pub seller: String,
    pub name: String,
    pub description: String,
    pub price_drops: i64,
}

/// User model; the wallet address is looked up by the escrow subsystem but
/// never mutated by it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub wallet_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            username,
            password_hash,
            wallet_address: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Projection safe to return to API callers
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            wallet_address: self.wallet_address.clone(),
            created_at: self.created_at,
        }
    }
}

/// User data without the credential hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub wallet_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing() -> Listing {
        Listing::new(1, "alice".to_string(), "Lamp".to_string(), "A lamp".to_string(), 500)
    }

    #[test]
    fn new_listing_has_no_escrow() {
        let l = listing();
        assert_eq!(l.escrow_state(), EscrowState::NoEscrow);
        assert!(l.escrow_state().can_create());
        assert!(!l.escrow_is_complete());
    }

    #[test]
    fn partial_fields_count_as_open_but_incomplete() {
        let mut l = listing();
        l.escrow_condition = Some("A025".to_string());
        assert_eq!(l.escrow_state(), EscrowState::Open);
        assert!(l.escrow_state().can_finish());
        assert!(!l.escrow_is_complete());
    }

    #[test]
    fn public_view_omits_the_fulfillment() {
        let mut l = listing();
        l.buyer = Some("bob".to_string());
        l.escrow_condition = Some("A025".to_string());
        l.escrow_fulfillment = Some("A022".to_string());
        let json = serde_json::to_value(l.public()).unwrap();
        assert!(json.get("escrow_fulfillment").is_none());
        assert_eq!(json["escrow_condition"], "A025");
        assert_eq!(json["escrow_state"], serde_json::json!("Open"));
    }

    #[test]
    fn settled_is_terminal() {
        let mut l = listing();
        l.escrow_condition = Some("A025".to_string());
        l.escrow_settled_at = Some(Utc::now());
        assert!(l.escrow_state().is_terminal());
        assert!(l.validate_transition(EscrowState::Open).is_err());
        assert!(l.validate_transition(EscrowState::NoEscrow).is_ok());
    }
}
