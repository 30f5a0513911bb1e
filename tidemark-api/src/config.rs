//! Server configuration loaded from the environment

use serde::Deserialize;

/// API server configuration.
///
/// Read from `TIDEMARK_*` environment variables (a `.env` file is honored);
/// `TIDEMARK_TOKEN_SECRET` has no default and must be set.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub ledger_rpc_url: String,
    pub token_secret: String,
    pub token_ttl_secs: i64,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .set_default("bind_addr", "0.0.0.0:8080")?
            .set_default("ledger_rpc_url", "https://s.altnet.rippletest.net:51234/")?
            .set_default("token_ttl_secs", 3600)?
            .add_source(config::Environment::with_prefix("TIDEMARK"))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
