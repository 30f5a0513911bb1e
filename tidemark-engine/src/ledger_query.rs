//! Ledger query client - read-only JSON-RPC lookups
//!
//! Balances, trustlines and transaction history for a ledger address, plus
//! pure helpers that summarize trustline data. Queries only; nothing here
//! signs, submits or mutates ledger state.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::error::EscrowError;
use crate::EscrowResult;

/// Drops per XRP
const DROPS_PER_XRP: f64 = 1_000_000.0;

/// Configuration for the ledger query client
#[derive(Debug, Clone)]
pub struct LedgerQueryConfig {
    /// JSON-RPC endpoint of a ledger node
    pub json_rpc_url: String,
    /// Default number of history entries per request
    pub history_limit: u32,
}

impl Default for LedgerQueryConfig {
    fn default() -> Self {
        Self {
            json_rpc_url: "https://s.altnet.rippletest.net:51234/".to_string(),
            history_limit: 10,
        }
    }
}

/// One trustline as reported by the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustLine {
    /// The issuer's account
    pub account: String,
    pub currency: String,
    pub balance: String,
    pub limit: String,
    #[serde(default)]
    pub limit_peer: Option<String>,
}

/// Per-currency aggregate in a trustline summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrencySummary {
    pub lines: Vec<TrustlineEntry>,
    pub total_balance: f64,
    pub total_limit: f64,
}

/// One summarized trustline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustlineEntry {
    pub issuer: String,
    pub balance: f64,
    pub limit: f64,
}

/// Summary of an account's trustlines, grouped by decoded currency
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrustlineSummary {
    pub total_trustlines: u32,
    pub currencies: BTreeMap<String, CurrencySummary>,
}

/// Read-only ledger JSON-RPC client
pub struct LedgerQueryClient {
    config: LedgerQueryConfig,
    http: reqwest::Client,
}

impl LedgerQueryClient {
    pub fn new(config: LedgerQueryConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Fetch validated account data for an address
    pub async fn account_info(&self, address: &str) -> EscrowResult<Value> {
        let result = self
            .request(
                "account_info",
                json!({
                    "account": address,
                    "ledger_index": "validated",
                    "strict": true,
                }),
            )
            .await?;
        Ok(result["account_data"].clone())
    }

    /// Account balance in XRP
    pub async fn balance(&self, address: &str) -> EscrowResult<f64> {
        let account_data = self.account_info(address).await?;
        let drops = account_data["Balance"]
            .as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| EscrowError::ledger_query("Account data has no balance"))?;
        Ok(drops / DROPS_PER_XRP)
    }

    /// All trustlines for an address
    pub async fn trustlines(&self, address: &str) -> EscrowResult<Vec<TrustLine>> {
        let result = self
            .request("account_lines", json!({ "account": address }))
            .await?;
        let lines = result
            .get("lines")
            .cloned()
            .unwrap_or_else(|| json!([]));
        Ok(serde_json::from_value(lines)?)
    }

    /// Trustline summary for an address
    pub async fn summarize_trustlines(&self, address: &str) -> EscrowResult<TrustlineSummary> {
        let lines = self.trustlines(address).await?;
        Ok(summarize_trustlines(&lines))
    }

    /// Most recent transactions for an address, newest first
    pub async fn transaction_history(&self, address: &str) -> EscrowResult<Vec<Value>> {
        let result = self
            .request(
                "account_tx",
                json!({
                    "account": address,
                    "ledger_index_min": -1,
                    "ledger_index_max": -1,
                    "limit": self.config.history_limit,
                    "binary": false,
                    "forward": false,
                }),
            )
            .await?;
        let transactions = result
            .get("transactions")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Ok(transactions)
    }

    async fn request(&self, method: &str, params: Value) -> EscrowResult<Value> {
        let body = json!({ "method": method, "params": [params] });
        let response: Value = self
            .http
            .post(&self.config.json_rpc_url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        let result = response["result"].clone();
        if result["status"] == "success" {
            Ok(result)
        } else {
            let reason = result["error_message"]
                .as_str()
                .or_else(|| result["error"].as_str())
                .unwrap_or("unknown ledger error");
            Err(EscrowError::ledger_query(format!("{method}: {reason}")))
        }
    }
}

impl Default for LedgerQueryClient {
    fn default() -> Self {
        Self::new(LedgerQueryConfig::default())
    }
}

/// Decode a 40-character hex currency code to ASCII, falling back to the
/// raw input for standard three-letter codes or undecodable bytes
pub fn decode_currency(currency: &str) -> String {
    let Ok(bytes) = hex::decode(currency) else {
        return currency.to_string();
    };
    match String::from_utf8(bytes) {
        Ok(decoded) => {
            let trimmed = decoded.trim_end_matches('\0');
            if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_graphic()) {
                currency.to_string()
            } else {
                trimmed.to_string()
            }
        }
        Err(_) => currency.to_string(),
    }
}

/// Group trustlines by decoded currency with per-currency totals.
/// Lines with zero balance and zero limits on both sides are skipped.
pub fn summarize_trustlines(lines: &[TrustLine]) -> TrustlineSummary {
    let mut summary = TrustlineSummary::default();

    for line in lines {
        let balance: f64 = line.balance.parse().unwrap_or(0.0);
        let limit: f64 = line.limit.parse().unwrap_or(0.0);
        let limit_peer: f64 = line
            .limit_peer
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);

        if balance == 0.0 && limit == 0.0 && limit_peer == 0.0 {
            continue;
        }

        summary.total_trustlines += 1;
        let entry = summary
            .currencies
            .entry(decode_currency(&line.currency))
            .or_default();
        entry.lines.push(TrustlineEntry {
            issuer: line.account.clone(),
            balance,
            limit,
        });
        entry.total_balance += balance;
        entry.total_limit += limit;
    }

    summary
}
