//! Escrow coordinator - sequences escrow settlement against external state
//!
//! Enforces the business preconditions around escrow creation and finishing,
//! then drives the transaction builder and the listing store. The stores are
//! injected at construction; the coordinator holds no signing material and
//! never submits a transaction itself, it hands unsigned payloads back to
//! the caller.

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::EscrowError;
use crate::models::{EscrowState, Listing};
use crate::store::{ListingStore, UserStore};
use crate::transaction_builder::{EscrowCreate, EscrowFinish, EscrowTransactionBuilder};
use crate::EscrowResult;

/// Configuration for the escrow coordinator
#[derive(Debug, Clone)]
pub struct EscrowCoordinatorConfig {
    /// Maximum escrow amount in drops
    pub max_escrow_drops: u64,
}

impl Default for EscrowCoordinatorConfig {
    fn default() -> Self {
        Self {
            max_escrow_drops: 1_000_000_000, // 1000 XRP
        }
    }
}

/// Escrow creation request
#[derive(Debug, Clone)]
pub struct CreateEscrowRequest {
    pub listing_id: i64,
    pub buyer: String,
    /// Seconds from now until the escrow becomes cancellable
    pub cancel_after_secs: u32,
}

/// Coordinates the escrow lifecycle for listings
pub struct EscrowCoordinator {
    config: EscrowCoordinatorConfig,
    builder: EscrowTransactionBuilder,
    listings: Arc<dyn ListingStore>,
    users: Arc<dyn UserStore>,
}

impl EscrowCoordinator {
    pub fn new(
        config: EscrowCoordinatorConfig,
        listings: Arc<dyn ListingStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            config,
            builder: EscrowTransactionBuilder::new(),
            listings,
            users,
        }
    }

    /// Create an escrow for a listing.
    ///
    /// The buyer funds the escrow, so the buyer's wallet is the transaction
    /// account and the seller's wallet is the destination. The condition,
    /// fulfillment and buyer are persisted before the payload is returned,
    /// so a caller never submits a transaction the store does not know
    /// about.
    pub async fn create_escrow(&self, request: CreateEscrowRequest) -> EscrowResult<EscrowCreate> {
        info!(listing_id = request.listing_id, buyer = %request.buyer, "Creating escrow");

        if request.buyer.trim().is_empty() {
            return Err(EscrowError::MissingField("buyer"));
        }

        let listing = self.listings.get(request.listing_id).await?;
        if !listing.escrow_state().can_create() {
            warn!(listing_id = listing.id, "Escrow already open for listing");
            return Err(EscrowError::AlreadyEscrowed(listing.id));
        }

        let buyer_wallet = self.users.wallet_address(&request.buyer).await?;
        let seller_wallet = self.users.wallet_address(&listing.seller).await?;

        let amount = self.escrow_amount(&listing)?;
        let (tx, pair) = self.builder.build_create(
            &buyer_wallet,
            &seller_wallet,
            amount,
            request.cancel_after_secs,
        )?;

        // Persist before returning success; a store refusal here means the
        // payload must not be submitted.
        self.listings
            .set_escrow_fields(listing.id, &request.buyer, &pair.fulfillment, &pair.condition)
            .await?;

        info!(listing_id = listing.id, "Escrow created and persisted");

        Ok(tx)
    }

    /// Build the finish transaction for a listing's open escrow.
    ///
    /// Ledger roles are replayed from the record made at creation time: the
    /// buyer's wallet was the create-side account, so it is the finish-side
    /// owner, and the seller's wallet finishes as the account receiving the
    /// funds.
    pub async fn finish_escrow(&self, listing_id: i64) -> EscrowResult<EscrowFinish> {
        info!(listing_id, "Finishing escrow");

        let listing = self.listings.get(listing_id).await?;
        if listing.escrow_state().is_terminal() {
            return Err(EscrowError::state(
                format!("{:?}", listing.escrow_state()),
                format!("{:?}", EscrowState::Open),
                "Escrow is already settled".to_string(),
            ));
        }

        let buyer = listing
            .buyer
            .as_deref()
            .ok_or(EscrowError::EscrowIncomplete(listing_id))?;
        let buyer_wallet = self.users.wallet_address(buyer).await?;
        let seller_wallet = self.users.wallet_address(&listing.seller).await?;

        if !listing.escrow_is_complete() {
            return Err(EscrowError::EscrowIncomplete(listing_id));
        }

        // escrow_is_complete guarantees these are present
        let sequence = listing.escrow_sequence.unwrap_or_default();
        let condition = listing.escrow_condition.as_deref().unwrap_or_default();
        let fulfillment = listing.escrow_fulfillment.as_deref().unwrap_or_default();

        let tx = self
            .builder
            .build_finish(&seller_wallet, &buyer_wallet, sequence, condition, fulfillment)?;

        info!(listing_id, "Escrow finish payload built");

        Ok(tx)
    }

    /// Record the create transaction's on-ledger sequence number, reported
    /// by the caller after submission
    pub async fn record_offer_sequence(&self, listing_id: i64, sequence: u32) -> EscrowResult<Listing> {
        if sequence == 0 {
            return Err(EscrowError::MissingField("offer_sequence"));
        }
        let listing = self.listings.set_escrow_sequence(listing_id, sequence).await?;
        info!(listing_id, sequence, "Recorded escrow offer sequence");
        Ok(listing)
    }

    /// Record that the finish transaction was validated on-ledger
    pub async fn mark_settled(&self, listing_id: i64) -> EscrowResult<Listing> {
        let listing = self.listings.mark_settled(listing_id).await?;
        info!(listing_id, "Escrow marked settled");
        Ok(listing)
    }

    /// Clear the buyer and escrow fields so the listing can be sold again
    pub async fn reset_escrow(&self, listing_id: i64) -> EscrowResult<Listing> {
        let listing = self.listings.clear_escrow(listing_id).await?;
        info!(listing_id, "Escrow fields cleared");
        Ok(listing)
    }

    fn escrow_amount(&self, listing: &Listing) -> EscrowResult<u64> {
        let amount = u64::try_from(listing.price_drops)
            .map_err(|_| EscrowError::ledger_build("Listing price is not a valid drop amount"))?;
        if amount > self.config.max_escrow_drops {
            return Err(EscrowError::ledger_build(format!(
                "Amount {} drops exceeds maximum {}",
                amount, self.config.max_escrow_drops
            )));
        }
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition_generator::verify;
    use crate::models::{NewListing, User};
    use crate::store::{MemoryListingStore, MemoryUserStore};
    use crate::transaction_builder::ripple_time_now;

    struct Fixture {
        coordinator: EscrowCoordinator,
        listings: Arc<MemoryListingStore>,
        users: Arc<MemoryUserStore>,
        listing_id: i64,
    }

    async fn fixture() -> Fixture {
        let listings = Arc::new(MemoryListingStore::new());
        let users = Arc::new(MemoryUserStore::new());

        for (name, wallet) in [("alice", "rALICE"), ("bob", "rBOB")] {
            users
                .insert(User::new(name.to_string(), "hash".to_string()))
                .await
                .unwrap();
            users.set_wallet(name, wallet).await.unwrap();
        }

        let listing = listings
            .insert(NewListing {
                seller: "alice".to_string(),
                name: "Lamp".to_string(),
                description: "A lamp".to_string(),
                price_drops: 500,
            })
            .await
            .unwrap();

        let coordinator = EscrowCoordinator::new(
            EscrowCoordinatorConfig::default(),
            listings.clone(),
            users.clone(),
        );

        Fixture {
            coordinator,
            listings,
            users,
            listing_id: listing.id,
        }
    }

    fn create_request(listing_id: i64) -> CreateEscrowRequest {
        CreateEscrowRequest {
            listing_id,
            buyer: "bob".to_string(),
            cancel_after_secs: 3600,
        }
    }

    #[tokio::test]
    async fn create_builds_payload_and_persists_fields() {
        let fx = fixture().await;
        let before = ripple_time_now();

        let tx = fx
            .coordinator
            .create_escrow(create_request(fx.listing_id))
            .await
            .unwrap();

        assert_eq!(tx.account, "rBOB");
        assert_eq!(tx.destination, "rALICE");
        assert_eq!(tx.amount, "500");
        assert!(tx.cancel_after > before);

        let listing = fx.listings.get(fx.listing_id).await.unwrap();
        assert_eq!(listing.escrow_state(), EscrowState::Open);
        assert_eq!(listing.buyer.as_deref(), Some("bob"));
        assert_eq!(listing.escrow_condition.as_deref(), Some(tx.condition.as_str()));
        assert!(verify(
            listing.escrow_condition.as_deref().unwrap(),
            listing.escrow_fulfillment.as_deref().unwrap(),
        ));
    }

    #[tokio::test]
    async fn create_fails_for_missing_listing() {
        let fx = fixture().await;
        let err = fx.coordinator.create_escrow(create_request(999)).await.unwrap_err();
        assert!(matches!(err, EscrowError::ListingNotFound(999)));
    }

    #[tokio::test]
    async fn create_fails_for_unknown_buyer_without_writes() {
        let fx = fixture().await;
        let mut request = create_request(fx.listing_id);
        request.buyer = "mallory".to_string();

        let err = fx.coordinator.create_escrow(request).await.unwrap_err();
        assert!(matches!(err, EscrowError::WalletNotFound(_)));

        let listing = fx.listings.get(fx.listing_id).await.unwrap();
        assert_eq!(listing.escrow_state(), EscrowState::NoEscrow);
    }

    #[tokio::test]
    async fn create_fails_when_seller_has_no_wallet() {
        let fx = fixture().await;
        fx.users
            .insert(User::new("carol".to_string(), "hash".to_string()))
            .await
            .unwrap();
        let listing = fx
            .listings
            .insert(NewListing {
                seller: "carol".to_string(),
                name: "Rug".to_string(),
                description: "A rug".to_string(),
                price_drops: 900,
            })
            .await
            .unwrap();

        let err = fx
            .coordinator
            .create_escrow(create_request(listing.id))
            .await
            .unwrap_err();
        assert!(matches!(err, EscrowError::WalletNotFound(name) if name == "carol"));

        let listing = fx.listings.get(listing.id).await.unwrap();
        assert_eq!(listing.escrow_state(), EscrowState::NoEscrow);
    }

    #[tokio::test]
    async fn second_create_is_rejected_and_first_escrow_kept() {
        let fx = fixture().await;
        fx.coordinator
            .create_escrow(create_request(fx.listing_id))
            .await
            .unwrap();
        let first = fx.listings.get(fx.listing_id).await.unwrap();

        let err = fx
            .coordinator
            .create_escrow(create_request(fx.listing_id))
            .await
            .unwrap_err();
        assert!(matches!(err, EscrowError::AlreadyEscrowed(_)));

        let current = fx.listings.get(fx.listing_id).await.unwrap();
        assert_eq!(current.escrow_condition, first.escrow_condition);
        assert_eq!(current.escrow_fulfillment, first.escrow_fulfillment);
    }

    #[tokio::test]
    async fn create_rejects_empty_buyer() {
        let fx = fixture().await;
        let mut request = create_request(fx.listing_id);
        request.buyer = "  ".to_string();
        let err = fx.coordinator.create_escrow(request).await.unwrap_err();
        assert!(matches!(err, EscrowError::MissingField("buyer")));
    }

    #[tokio::test]
    async fn create_rejects_amount_above_configured_maximum() {
        let fx = fixture().await;
        let coordinator = EscrowCoordinator::new(
            EscrowCoordinatorConfig { max_escrow_drops: 100 },
            fx.listings.clone(),
            fx.users.clone(),
        );
        let err = coordinator
            .create_escrow(create_request(fx.listing_id))
            .await
            .unwrap_err();
        assert!(matches!(err, EscrowError::LedgerBuild(_)));
    }

    #[tokio::test]
    async fn finish_on_listing_without_escrow_is_incomplete() {
        let fx = fixture().await;
        let err = fx.coordinator.finish_escrow(fx.listing_id).await.unwrap_err();
        assert!(matches!(err, EscrowError::EscrowIncomplete(_)));
    }

    #[tokio::test]
    async fn finish_requires_recorded_sequence() {
        let fx = fixture().await;
        fx.coordinator
            .create_escrow(create_request(fx.listing_id))
            .await
            .unwrap();

        let err = fx.coordinator.finish_escrow(fx.listing_id).await.unwrap_err();
        assert!(matches!(err, EscrowError::EscrowIncomplete(_)));

        // The open escrow stays intact for a retry
        let listing = fx.listings.get(fx.listing_id).await.unwrap();
        assert_eq!(listing.escrow_state(), EscrowState::Open);
        assert!(listing.escrow_condition.is_some());
    }

    #[tokio::test]
    async fn create_sequence_finish_round_trip() {
        let fx = fixture().await;
        let create = fx
            .coordinator
            .create_escrow(create_request(fx.listing_id))
            .await
            .unwrap();
        fx.coordinator
            .record_offer_sequence(fx.listing_id, 42)
            .await
            .unwrap();

        let finish = fx.coordinator.finish_escrow(fx.listing_id).await.unwrap();

        // Roles swap: the seller's wallet finishes what the buyer's opened
        assert_eq!(finish.account, "rALICE");
        assert_eq!(finish.owner, "rBOB");
        assert_eq!(finish.offer_sequence, 42);
        assert_eq!(finish.condition, create.condition);
        assert!(verify(&finish.condition, &finish.fulfillment));
    }

    #[tokio::test]
    async fn finish_after_settlement_is_rejected() {
        let fx = fixture().await;
        fx.coordinator
            .create_escrow(create_request(fx.listing_id))
            .await
            .unwrap();
        fx.coordinator
            .record_offer_sequence(fx.listing_id, 42)
            .await
            .unwrap();
        fx.coordinator.finish_escrow(fx.listing_id).await.unwrap();
        fx.coordinator.mark_settled(fx.listing_id).await.unwrap();

        let err = fx.coordinator.finish_escrow(fx.listing_id).await.unwrap_err();
        assert!(matches!(err, EscrowError::State { .. }));
    }

    #[tokio::test]
    async fn reset_allows_a_new_escrow() {
        let fx = fixture().await;
        fx.coordinator
            .create_escrow(create_request(fx.listing_id))
            .await
            .unwrap();
        fx.coordinator.reset_escrow(fx.listing_id).await.unwrap();

        let listing = fx.listings.get(fx.listing_id).await.unwrap();
        assert_eq!(listing.escrow_state(), EscrowState::NoEscrow);

        assert!(fx
            .coordinator
            .create_escrow(create_request(fx.listing_id))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn record_sequence_rejects_zero() {
        let fx = fixture().await;
        fx.coordinator
            .create_escrow(create_request(fx.listing_id))
            .await
            .unwrap();
        let err = fx
            .coordinator
            .record_offer_sequence(fx.listing_id, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, EscrowError::MissingField("offer_sequence")));
    }
}
