//! Guild ledger client.
//!
//! Thin HTTP client for the off-chain ledger service that tracks guild
//! activity. Reporting is strictly best-effort: the ledger is bookkeeping,
//! and no failure here may ever stall or abort a raid, so every error path
//! degrades to a log line.

use alloy_primitives::Address;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Payload for a completed raid, posted to `raid-success`.
#[derive(Debug, Clone, Serialize)]
pub struct RaidReport {
    pub guild_address: Address,
    /// Profit in the vault asset's smallest unit, stringified to survive
    /// JSON number limits.
    pub profit: String,
    pub token_in: Address,
    pub token_out: Address,
    pub tx_hash: String,
    pub portal_color: String,
}

#[derive(Debug, Deserialize)]
struct ActiveGuildEntry {
    address: Address,
}

#[derive(Clone)]
pub struct LedgerClient {
    client: Client,
    base_url: String,
}

impl LedgerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client, base_url: base_url.into() }
    }

    /// Report a successful raid. Errors are logged and swallowed.
    pub async fn report_raid(&self, report: &RaidReport) {
        let url = format!("{}/raid-success", self.base_url);
        match self.client.post(&url).json(report).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!(guild = %report.guild_address, "Raid reported to ledger");
            }
            Ok(resp) => {
                warn!(status = %resp.status(), "Ledger rejected raid report");
            }
            Err(e) => {
                warn!(error = %e, "Failed to reach ledger");
            }
        }
    }

    /// Fetch addresses of guilds the ledger considers active. Failure
    /// degrades to an empty list so configured sources still run.
    pub async fn active_guilds(&self) -> Vec<Address> {
        let url = format!("{}/active-guilds", self.base_url);
        let resp = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "Failed to fetch active guilds");
                return Vec::new();
            }
        };
        match resp.json::<Vec<ActiveGuildEntry>>().await {
            Ok(entries) => entries.into_iter().map(|e| e.address).collect(),
            Err(e) => {
                warn!(error = %e, "Malformed active guilds response");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_fixtures::addr;

    #[test]
    fn test_raid_report_serializes_expected_fields() {
        let report = RaidReport {
            guild_address: addr(1),
            profit: "12345".to_string(),
            token_in: addr(2),
            token_out: addr(3),
            tx_hash: "0xabc".to_string(),
            portal_color: "#6d28d9".to_string(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["profit"], "12345");
        assert_eq!(json["tx_hash"], "0xabc");
        assert_eq!(json["portal_color"], "#6d28d9");
        assert!(json["guild_address"].as_str().unwrap().starts_with("0x"));
    }

    #[tokio::test]
    async fn test_unreachable_ledger_degrades_to_empty() {
        let client = LedgerClient::new("http://127.0.0.1:1/api");
        assert!(client.active_guilds().await.is_empty());
    }
}
