//! The decision engine.
//!
//! One `run_tick` per poll interval: read the held balance, check the
//! forced-exit timer, enumerate candidate routes from the held token, quote
//! them hop by hop, score on the 18-decimal basis, and commit the single
//! best candidate when it strictly clears the profit threshold. Holding is
//! the default outcome; the engine only ever moves for a reason.

pub mod executor;
pub mod guild;

use alloy_primitives::{Address, I256, U256};
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::chain::ChainClient;
use crate::config::AppConfig;
use crate::graph::RouteGraph;
use crate::oracle::PriceOracle;
use crate::storage::StateStore;
use crate::strategy::{denormalize, normalize, profit_threshold, score_swap};
use crate::types::{
    Edge, ExecutionMode, MonarchError, PositionState, PositionStatus, Protocol, Route, ScanStrategy,
    TickReport, TokenRegistry,
};

use executor::{Executor, SwapEncoder};

/// Balances at or below this raw amount are treated as unfunded during
/// capital discovery.
const DUST_THRESHOLD: u64 = 1000;

/// Fee tiers probed when valuing a position with no direct edge back to
/// the initial token.
const PROBE_FEES: [u32; 3] = [100, 500, 3000];

struct Candidate {
    route: Route,
    hop_amounts: Vec<U256>,
    amount_out: U256,
    score: I256,
}

pub struct Engine {
    config: AppConfig,
    registry: TokenRegistry,
    graph: RouteGraph,
    oracle: Arc<dyn PriceOracle>,
    chain: Option<Arc<dyn ChainClient>>,
    executor: Executor,
    store: StateStore,
    state: PositionState,
}

impl Engine {
    pub fn new(
        config: AppConfig,
        oracle: Arc<dyn PriceOracle>,
        chain: Option<Arc<dyn ChainClient>>,
        store: StateStore,
        state: PositionState,
    ) -> Result<Self> {
        let registry = config.registry();
        let graph = config.graph(&registry)?;
        let encoder = SwapEncoder::new(
            config.network.uniswap_router,
            config.network.settlement,
            config.network.curve.clone(),
        );
        let executor = Executor::new(
            config.bot.mode,
            chain.clone(),
            encoder,
            config.thresholds.slippage_bps,
            config.thresholds.commit_before_confirm,
        );
        Ok(Self { config, registry, graph, oracle, chain, executor, store, state })
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    // -----------------------------------------------------------------------
    // Capital discovery
    // -----------------------------------------------------------------------

    /// One-time capital discovery, run explicitly before the first tick.
    ///
    /// Scans the roster in declaration order for the first funded token;
    /// falls back to the configured default capital when nothing on chain
    /// is funded (or no chain client is wired). The snapshot is write-once
    /// and all later profit accounting is relative to it.
    pub async fn initialize_capital(&mut self) -> Result<()> {
        if self.state.is_initialized() {
            info!(state = %self.state, "Capital already recorded; skipping discovery");
            return Ok(());
        }

        if let Some(chain) = &self.chain {
            let owner = chain.owner();
            for token in &self.config.tokens {
                let balance = match chain.balance_of(token.address, owner).await {
                    Ok(b) => b,
                    Err(e) => {
                        warn!(token = %token.symbol, error = %e, "Balance read failed during discovery");
                        continue;
                    }
                };
                if balance > U256::from(DUST_THRESHOLD) {
                    info!(token = %token.symbol, balance = %balance, "Discovered funded roster token");
                    self.state.initialize_capital(balance, token.address)?;
                    self.store.save(&self.state)?;
                    return Ok(());
                }
            }
            warn!("No funded roster token found; using configured default capital");
        }

        let token = self.config.default_token_address(&self.registry)?;
        let decimals = self.registry.decimals_of(token);
        let amount =
            U256::from((self.config.bot.default_capital * 10f64.powi(i32::from(decimals))) as u128);
        info!(
            token = %self.config.bot.default_token,
            amount = %amount,
            "Starting from configured default capital"
        );
        self.state.initialize_capital(amount, token)?;
        self.store.save(&self.state)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    pub async fn run_tick(&mut self) -> Result<TickReport> {
        let held = self.state.held_token;
        let balance = match (&self.chain, self.config.bot.mode) {
            (Some(chain), ExecutionMode::Live) => chain
                .balance_of(held, chain.owner())
                .await
                .context("Held balance read failed")?,
            _ => self.state.held_amount,
        };

        if balance.is_zero() {
            warn!(token = %self.registry.symbol_of(held), "Held balance is zero; nothing to evaluate");
            return Ok(self.report(0, None, false, false).await);
        }

        if let Some(report) = self.try_forced_exit(balance).await? {
            return Ok(report);
        }

        let balance18 = normalize(balance, held, &self.registry)?;
        let threshold = profit_threshold(
            self.config.thresholds.min_profit_amount,
            self.config.thresholds.min_profit_percent,
            balance18,
        );
        let threshold = I256::try_from(threshold)
            .map_err(|_| MonarchError::Execution("threshold out of signed range".into()))?;

        let routes: Vec<Route> = match self.config.bot.scan_strategy {
            ScanStrategy::DirectOnly => {
                self.graph.neighbors(held).iter().map(|e| vec![*e]).collect()
            }
            ScanStrategy::MultiHop => self.graph.find_paths(held, self.config.bot.max_hops),
        };
        debug!(count = routes.len(), "Candidate routes enumerated");

        let mut best: Option<Candidate> = None;
        for route in &routes {
            let Some((hop_amounts, amount_out)) = self.quote_route(route, balance).await else {
                continue;
            };
            let final_token = route.last().map(|e| e.to).ok_or(MonarchError::EmptyRoute)?;
            let score = score_swap(
                balance,
                held,
                amount_out,
                final_token,
                &self.registry,
                self.config.risk.tiered,
            )?;
            // Strict improvement only: ties keep the earlier candidate.
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(Candidate { route: route.clone(), hop_amounts, amount_out, score });
            }
        }

        let mut executed = false;
        if let Some(candidate) = &best {
            if candidate.score > threshold {
                let target = candidate.route.last().map(|e| e.to).unwrap_or(held);
                info!(
                    from = %self.registry.symbol_of(held),
                    to = %self.registry.symbol_of(target),
                    hops = candidate.route.len(),
                    score = %format_score(candidate.score),
                    "Committing best route"
                );
                self.executor
                    .execute(
                        &candidate.route,
                        &candidate.hop_amounts,
                        candidate.amount_out,
                        &mut self.state,
                        &self.store,
                    )
                    .await?;
                executed = true;
            } else {
                debug!(
                    best = %format_score(candidate.score),
                    threshold = %format_score(threshold),
                    "Best candidate below threshold; holding"
                );
            }
        }

        let best_score = best.map(|b| format_score(b.score));
        Ok(self.report(routes.len(), best_score, executed, false).await)
    }

    /// Forced exit: a position held past the timeout unwinds into the safe
    /// haven through a direct edge, bypassing the profit threshold. Returns
    /// the tick report when an exit was committed.
    async fn try_forced_exit(&mut self, balance: U256) -> Result<Option<TickReport>> {
        if self.state.status != PositionStatus::Hold {
            return Ok(None);
        }
        let limit = Duration::hours(self.config.thresholds.force_exit_hours);
        if self.state.held_for() <= limit {
            return Ok(None);
        }
        let haven = self.config.safe_haven_address(&self.registry)?;
        let held = self.state.held_token;
        if held == haven {
            // Timed out but already safe; drop back to SEARCH.
            self.state.reset_to_search(held);
            self.store.save(&self.state)?;
            return Ok(None);
        }

        let Some(exit_edge) = self.graph.neighbors(held).iter().find(|e| e.to == haven).copied()
        else {
            warn!(
                held = %self.registry.symbol_of(held),
                "Position timed out but no direct edge to safe haven; continuing scan"
            );
            return Ok(None);
        };
        let amount_out = self.oracle.quote(&exit_edge, balance).await;
        if amount_out.is_zero() {
            warn!(edge = %exit_edge, "Forced exit quote returned zero; continuing scan");
            return Ok(None);
        }

        warn!(
            held = %self.registry.symbol_of(held),
            hours = self.state.held_for().num_hours(),
            "Position timed out; forcing exit to safe haven"
        );
        self.executor
            .execute(&[exit_edge], &[balance], amount_out, &mut self.state, &self.store)
            .await?;
        self.state.reset_to_search(haven);
        self.store.save(&self.state)?;
        Ok(Some(self.report(1, None, true, true).await))
    }

    async fn quote_route(&self, route: &[Edge], amount_in: U256) -> Option<(Vec<U256>, U256)> {
        let mut hop_amounts = Vec::with_capacity(route.len());
        let mut amount = amount_in;
        for edge in route {
            hop_amounts.push(amount);
            let out = self.oracle.quote(edge, amount).await;
            if out.is_zero() {
                debug!(edge = %edge, "Zero quote; dropping route");
                return None;
            }
            amount = out;
        }
        Some((hop_amounts, amount))
    }

    // -----------------------------------------------------------------------
    // Accounting
    // -----------------------------------------------------------------------

    /// Estimate the held position's value in initial-token units. Log-only:
    /// a miss at every fallback yields no profit line, never an error.
    async fn account(&self) -> (Option<String>, Option<f64>) {
        let Some(initial_token) = self.state.initial_token else {
            return (None, None);
        };
        if self.state.initial_capital.is_zero() {
            return (None, None);
        }
        let Some(value) = self
            .estimate_value(self.state.held_amount, self.state.held_token, initial_token)
            .await
        else {
            return (None, None);
        };

        let initial = self.state.initial_capital;
        let (Ok(value_i), Ok(initial_i)) = (I256::try_from(value), I256::try_from(initial)) else {
            return (None, None);
        };
        let profit = value_i - initial_i;
        let decimals = self.registry.decimals_of(initial_token);
        let formatted = format_fixed(profit, decimals);

        let percent = match (u128::try_from(value), u128::try_from(initial)) {
            (Ok(v), Ok(i)) if i > 0 => Some((v as f64 - i as f64) / i as f64 * 100.0),
            _ => None,
        };
        (Some(formatted), percent)
    }

    /// Value `amount` of `token` in `target` units: direct edge quote, then
    /// standard fee-tier probes, then a 1:1 decimal rescale as the last
    /// resort (reasonable for a near-peg roster).
    async fn estimate_value(&self, amount: U256, token: Address, target: Address) -> Option<U256> {
        if token == target {
            return Some(amount);
        }
        if let Some(edge) = self.graph.neighbors(token).iter().find(|e| e.to == target) {
            let out = self.oracle.quote(edge, amount).await;
            if !out.is_zero() {
                return Some(out);
            }
        }
        for fee in PROBE_FEES {
            let probe = Edge { from: token, to: target, protocol: Protocol::UniswapV3, fee };
            let out = self.oracle.quote(&probe, amount).await;
            if !out.is_zero() {
                return Some(out);
            }
        }
        let norm = normalize(amount, token, &self.registry).ok()?;
        denormalize(norm, target, &self.registry).ok()
    }

    async fn report(
        &self,
        edges_scanned: usize,
        best_score: Option<String>,
        executed: bool,
        forced_exit: bool,
    ) -> TickReport {
        let (profit, profit_percent) = self.account().await;
        let report = TickReport {
            timestamp: Utc::now(),
            status: self.state.status,
            held_token: self.state.held_token,
            edges_scanned,
            best_score,
            executed,
            forced_exit,
            profit,
            profit_percent,
        };
        info!(report = %report, "Tick complete");
        report
    }
}

fn format_score(score: I256) -> String {
    format_fixed(score, 18)
}

/// Render a signed fixed-point amount at the given decimal precision.
fn format_fixed(value: I256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let abs = value.unsigned_abs();
    let scale = U256::from(10u8).pow(U256::from(decimals));
    format!(
        "{}{}.{:0>width$}",
        if value.is_negative() { "-" } else { "" },
        abs / scale,
        abs % scale,
        width = decimals as usize,
    )
}
