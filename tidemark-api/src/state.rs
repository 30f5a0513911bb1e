//! Shared application state
//!
//! Every collaborator is constructed here and injected explicitly; no
//! module-level singletons.

use std::sync::Arc;

use tidemark_engine::auth::{AuthService, AuthServiceConfig};
use tidemark_engine::escrow_coordinator::{EscrowCoordinator, EscrowCoordinatorConfig};
use tidemark_engine::ledger_query::{LedgerQueryClient, LedgerQueryConfig};
use tidemark_engine::store::{ListingStore, MemoryListingStore, MemoryUserStore, UserStore};
use tidemark_engine::EscrowResult;

use crate::config::ApiConfig;

#[derive(Clone)]
pub struct AppState {
    pub listings: Arc<dyn ListingStore>,
    pub users: Arc<dyn UserStore>,
    pub coordinator: Arc<EscrowCoordinator>,
    pub auth: Arc<AuthService>,
    pub ledger: Arc<LedgerQueryClient>,
}

impl AppState {
    pub fn new(config: &ApiConfig) -> EscrowResult<Self> {
        let listings: Arc<dyn ListingStore> = Arc::new(MemoryListingStore::new());
        let users: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());

        let coordinator = Arc::new(EscrowCoordinator::new(
            EscrowCoordinatorConfig::default(),
            listings.clone(),
            users.clone(),
        ));

        let auth = Arc::new(AuthService::new(
            AuthServiceConfig {
                token_secret: config.token_secret.clone(),
                token_ttl_secs: config.token_ttl_secs,
            },
            users.clone(),
        )?);

        let ledger = Arc::new(LedgerQueryClient::new(LedgerQueryConfig {
            json_rpc_url: config.ledger_rpc_url.clone(),
            ..LedgerQueryConfig::default()
        }));

        Ok(Self {
            listings,
            users,
            coordinator,
            auth,
            ledger,
        })
    }
}
