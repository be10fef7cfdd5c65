//! Guild raids — vault-sourced closed-loop arbitrage.
//!
//! A guild vault holds pooled capital in a single asset. Each cycle, the
//! runner evaluates closed two-hop loops from that asset, and when the best
//! loop yields a strictly positive round trip it fires `executeRaid` with a
//! 95% minimum-out guard on the final leg. Completed raids are reported to
//! the ledger on a fire-and-forget task. Vault fee distribution is gated by
//! a per-vault cooldown.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolValue};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::chain::ChainClient;
use crate::config::GuildConfig;
use crate::graph::RouteGraph;
use crate::ledger::{LedgerClient, RaidReport};
use crate::oracle::PriceOracle;
use crate::types::{ExecutionMode, Route, SwapStep};

use super::executor::SwapEncoder;

sol! {
    /// One hop as the vault's raid entrypoint consumes it.
    struct RaidStep {
        address target;
        bytes data;
        address tokenIn;
        address tokenOut;
    }
}

/// Minimum-out guard on the raid's final output, in basis points.
const RAID_MIN_OUT_BPS: u64 = 9_500;

struct LoopCandidate {
    route: Route,
    mid_amount: U256,
    final_amount: U256,
    profit: U256,
}

pub struct GuildRunner {
    config: GuildConfig,
    mode: ExecutionMode,
    graph: RouteGraph,
    oracle: Arc<dyn PriceOracle>,
    chain: Arc<dyn ChainClient>,
    encoder: SwapEncoder,
    ledger: Option<LedgerClient>,
    last_distribution: HashMap<Address, DateTime<Utc>>,
}

impl GuildRunner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: GuildConfig,
        mode: ExecutionMode,
        graph: RouteGraph,
        oracle: Arc<dyn PriceOracle>,
        chain: Arc<dyn ChainClient>,
        encoder: SwapEncoder,
        ledger: Option<LedgerClient>,
    ) -> Self {
        Self {
            config,
            mode,
            graph,
            oracle,
            chain,
            encoder,
            ledger,
            last_distribution: HashMap::new(),
        }
    }

    /// One full cycle over every guild source: raid evaluation, then fee
    /// distribution. Per-vault failures are logged and never stop the rest
    /// of the roster.
    pub async fn run_cycle(&mut self) {
        for vault in self.sources().await {
            if let Err(e) = self.run_raid(vault).await {
                warn!(vault = %vault, error = %e, "Raid cycle failed");
            }
            if let Err(e) = self.maybe_distribute(vault).await {
                warn!(vault = %vault, error = %e, "Fee distribution failed");
            }
        }
    }

    /// Configured sources plus ledger-discovered guilds, deduplicated in
    /// first-seen order.
    async fn sources(&self) -> Vec<Address> {
        let mut sources = self.config.sources.clone();
        if let Some(ledger) = &self.ledger {
            for discovered in ledger.active_guilds().await {
                if !sources.contains(&discovered) {
                    sources.push(discovered);
                }
            }
        }
        sources
    }

    async fn run_raid(&self, vault: Address) -> Result<()> {
        let asset = self
            .chain
            .vault_asset(vault)
            .await
            .context("Vault asset read failed")?;
        let total = self
            .chain
            .vault_total_assets(vault)
            .await
            .context("Vault total assets read failed")?;
        if total.is_zero() {
            debug!(vault = %vault, "Vault is empty; skipping");
            return Ok(());
        }

        let loops = self.graph.closed_loops(asset);
        if loops.is_empty() {
            debug!(vault = %vault, "No closed loops from vault asset");
            return Ok(());
        }

        let mut best: Option<LoopCandidate> = None;
        for route in loops {
            let mid = self.oracle.quote(&route[0], total).await;
            if mid.is_zero() {
                continue;
            }
            let fin = self.oracle.quote(&route[1], mid).await;
            // Only strictly positive round trips qualify.
            if fin <= total {
                continue;
            }
            let profit = fin - total;
            if best.as_ref().map_or(true, |b| profit > b.profit) {
                best = Some(LoopCandidate {
                    route,
                    mid_amount: mid,
                    final_amount: fin,
                    profit,
                });
            }
        }

        let Some(candidate) = best else {
            debug!(vault = %vault, "No profitable loop this cycle");
            return Ok(());
        };

        let steps = self
            .encoder
            .build_steps(&candidate.route, &[total, candidate.mid_amount])?;
        let min_out =
            candidate.final_amount * U256::from(RAID_MIN_OUT_BPS) / U256::from(10_000u64);
        let payload = encode_raid_payload(min_out, &steps);

        if self.mode != ExecutionMode::Live {
            info!(
                vault = %vault,
                profit = %candidate.profit,
                min_out = %min_out,
                mode = %self.mode,
                "Raid found, not submitted"
            );
            return Ok(());
        }

        let tx = self
            .chain
            .execute_raid(vault, total, payload)
            .await
            .context("Raid submission failed")?;
        info!(vault = %vault, tx = %tx, profit = %candidate.profit, "Raid executed");

        if let Some(ledger) = &self.ledger {
            let ledger = ledger.clone();
            let report = RaidReport {
                guild_address: vault,
                profit: candidate.profit.to_string(),
                token_in: candidate.route[0].from,
                token_out: candidate.route[0].to,
                tx_hash: tx,
                portal_color: self.config.portal_color.clone(),
            };
            // Fire and forget: ledger latency must not delay the next vault.
            tokio::spawn(async move {
                ledger.report_raid(&report).await;
            });
        }
        Ok(())
    }

    async fn maybe_distribute(&mut self, vault: Address) -> Result<()> {
        let fees = self
            .chain
            .accumulated_fees(vault)
            .await
            .context("Accumulated fees read failed")?;
        if fees.is_zero() {
            return Ok(());
        }
        let cooldown = Duration::seconds(self.config.fee_cooldown_secs as i64);
        if let Some(last) = self.last_distribution.get(&vault) {
            if Utc::now() - *last < cooldown {
                debug!(vault = %vault, "Fee cooldown active");
                return Ok(());
            }
        }

        if self.mode == ExecutionMode::Live {
            let tx = self
                .chain
                .distribute_fees(vault)
                .await
                .context("Fee distribution call failed")?;
            info!(vault = %vault, tx = %tx, fees = %fees, "Fees distributed");
        } else {
            info!(vault = %vault, fees = %fees, mode = %self.mode, "Fees distributable, not submitted");
        }
        self.last_distribution.insert(vault, Utc::now());
        Ok(())
    }
}

/// `abi.encode(uint256 minOut, RaidStep[] steps)`, the raid entrypoint's
/// opaque payload.
fn encode_raid_payload(min_out: U256, steps: &[SwapStep]) -> Vec<u8> {
    let sol_steps: Vec<RaidStep> = steps
        .iter()
        .map(|s| RaidStep {
            target: s.target,
            data: s.data.clone().into(),
            tokenIn: s.token_in,
            tokenOut: s.token_out,
        })
        .collect();
    (min_out, sol_steps).abi_encode()
}
