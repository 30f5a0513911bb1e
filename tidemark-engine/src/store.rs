//! Listing and user stores
//!
//! Trait seams for the two persistence collaborators plus in-memory
//! implementations backed by `RwLock<HashMap>`. The listing store is the
//! single source of truth for escrow state; `set_escrow_fields` is a
//! compare-and-swap under the store's write lock, so of two racing escrow
//! creations for one listing exactly one wins.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use crate::error::EscrowError;
use crate::models::{EscrowState, Listing, NewListing, User};
use crate::EscrowResult;

/// Persistence contract for listings
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn insert(&self, new: NewListing) -> EscrowResult<Listing>;
    async fn get(&self, id: i64) -> EscrowResult<Listing>;
    async fn all(&self) -> EscrowResult<Vec<Listing>>;
    async fn update_details(
        &self,
        id: i64,
        name: String,
        description: String,
        price_drops: i64,
    ) -> EscrowResult<Listing>;
    async fn remove(&self, id: i64) -> EscrowResult<()>;

    /// Atomically assign the buyer and escrow fields. Fails with
    /// `AlreadyEscrowed` unless the listing currently has no escrow.
    async fn set_escrow_fields(
        &self,
        id: i64,
        buyer: &str,
        fulfillment: &str,
        condition: &str,
    ) -> EscrowResult<Listing>;

    /// Record the on-ledger sequence of the create transaction once the
    /// caller has submitted it
    async fn set_escrow_sequence(&self, id: i64, sequence: u32) -> EscrowResult<Listing>;

    /// Record that the finish transaction was validated on-ledger
    async fn mark_settled(&self, id: i64) -> EscrowResult<Listing>;

    /// Clear the buyer and all escrow fields, returning the listing to
    /// circulation
    async fn clear_escrow(&self, id: i64) -> EscrowResult<Listing>;
}

/// Persistence contract for users and their wallet addresses
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: User) -> EscrowResult<User>;
    async fn get(&self, username: &str) -> EscrowResult<User>;
    async fn usernames(&self, exclude: Option<&str>) -> EscrowResult<Vec<String>>;
    async fn set_wallet(&self, username: &str, wallet_id: &str) -> EscrowResult<User>;

    /// Resolve a username to its wallet address; a missing user or a user
    /// without a wallet both fail with `WalletNotFound`
    async fn wallet_address(&self, username: &str) -> EscrowResult<String>;
}

/// In-memory listing store
pub struct MemoryListingStore {
    listings: RwLock<HashMap<i64, Listing>>,
    next_id: AtomicI64,
}

impl MemoryListingStore {
    pub fn new() -> Self {
        Self {
            listings: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryListingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListingStore for MemoryListingStore {
    async fn insert(&self, new: NewListing) -> EscrowResult<Listing> {
        if new.price_drops <= 0 {
            return Err(EscrowError::persistence("Price must be greater than 0 drops"));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let listing = Listing::new(id, new.seller, new.name, new.description, new.price_drops);
        self.listings.write().await.insert(id, listing.clone());
        Ok(listing)
    }

    async fn get(&self, id: i64) -> EscrowResult<Listing> {
        self.listings
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(EscrowError::ListingNotFound(id))
    }

    async fn all(&self) -> EscrowResult<Vec<Listing>> {
        let mut listings: Vec<Listing> = self.listings.read().await.values().cloned().collect();
        listings.sort_by_key(|l| l.id);
        Ok(listings)
    }

    async fn update_details(
        &self,
        id: i64,
        name: String,
        description: String,
        price_drops: i64,
    ) -> EscrowResult<Listing> {
        if price_drops <= 0 {
            return Err(EscrowError::persistence("Price must be greater than 0 drops"));
        }
        let mut listings = self.listings.write().await;
        let listing = listings.get_mut(&id).ok_or(EscrowError::ListingNotFound(id))?;
        listing.name = name;
        listing.description = description;
        listing.price_drops = price_drops;
        listing.updated_at = Utc::now();
        Ok(listing.clone())
    }

    async fn remove(&self, id: i64) -> EscrowResult<()> {
        self.listings
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(EscrowError::ListingNotFound(id))
    }

    async fn set_escrow_fields(
        &self,
        id: i64,
        buyer: &str,
        fulfillment: &str,
        condition: &str,
    ) -> EscrowResult<Listing> {
        let mut listings = self.listings.write().await;
        let listing = listings.get_mut(&id).ok_or(EscrowError::ListingNotFound(id))?;
        if !listing.escrow_state().can_create() {
            return Err(EscrowError::AlreadyEscrowed(id));
        }
        listing.buyer = Some(buyer.to_string());
        listing.escrow_fulfillment = Some(fulfillment.to_string());
        listing.escrow_condition = Some(condition.to_string());
        listing.updated_at = Utc::now();
        Ok(listing.clone())
    }

    async fn set_escrow_sequence(&self, id: i64, sequence: u32) -> EscrowResult<Listing> {
        let mut listings = self.listings.write().await;
        let listing = listings.get_mut(&id).ok_or(EscrowError::ListingNotFound(id))?;
        match listing.escrow_state() {
            EscrowState::Open => {
                listing.escrow_sequence = Some(sequence);
                listing.updated_at = Utc::now();
                Ok(listing.clone())
            }
            EscrowState::NoEscrow => Err(EscrowError::EscrowIncomplete(id)),
            EscrowState::Settled => Err(EscrowError::state(
                "Settled".to_string(),
                "Open".to_string(),
                "Cannot record a sequence on a settled escrow".to_string(),
            )),
        }
    }

    async fn mark_settled(&self, id: i64) -> EscrowResult<Listing> {
        let mut listings = self.listings.write().await;
        let listing = listings.get_mut(&id).ok_or(EscrowError::ListingNotFound(id))?;
        listing.validate_transition(EscrowState::Settled)?;
        if !listing.escrow_is_complete() {
            return Err(EscrowError::EscrowIncomplete(id));
        }
        listing.escrow_settled_at = Some(Utc::now());
        listing.updated_at = Utc::now();
        Ok(listing.clone())
    }

    async fn clear_escrow(&self, id: i64) -> EscrowResult<Listing> {
        let mut listings = self.listings.write().await;
        let listing = listings.get_mut(&id).ok_or(EscrowError::ListingNotFound(id))?;
        listing.buyer = None;
        listing.escrow_condition = None;
        listing.escrow_fulfillment = None;
        listing.escrow_sequence = None;
        listing.escrow_settled_at = None;
        listing.updated_at = Utc::now();
        Ok(listing.clone())
    }
}

/// In-memory user store keyed by username
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: User) -> EscrowResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) {
            return Err(EscrowError::UsernameTaken(user.username));
        }
        users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn get(&self, username: &str) -> EscrowResult<User> {
        self.users
            .read()
            .await
            .get(username)
            .cloned()
            .ok_or_else(|| EscrowError::UserNotFound(username.to_string()))
    }

    async fn usernames(&self, exclude: Option<&str>) -> EscrowResult<Vec<String>> {
        let users = self.users.read().await;
        let mut names: Vec<String> = users
            .keys()
            .filter(|name| Some(name.as_str()) != exclude)
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }

    async fn set_wallet(&self, username: &str, wallet_id: &str) -> EscrowResult<User> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(username)
            .ok_or_else(|| EscrowError::UserNotFound(username.to_string()))?;
        user.wallet_address = Some(wallet_id.to_string());
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn wallet_address(&self, username: &str) -> EscrowResult<String> {
        self.users
            .read()
            .await
            .get(username)
            .and_then(|user| user.wallet_address.clone())
            .ok_or_else(|| EscrowError::WalletNotFound(username.to_string()))
    }
}
