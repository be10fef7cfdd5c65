//! Route execution — payload encoding and mode-aware commitment.
//!
//! A chosen route becomes a list of `SwapStep`s, one ABI-encoded
//! instruction per hop, handed to the settlement contract as a single
//! atomic call. Simulated and dry-run modes stop short of submission and
//! book the quoted fill optimistically; live mode submits with a
//! slippage-derived minimum output.

use alloy_primitives::{
    aliases::{U160, U24},
    Address, U256,
};
use alloy_sol_types::{sol, SolValue};
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::chain::ChainClient;
use crate::oracle::curve::CurvePoolConfig;
use crate::storage::StateStore;
use crate::types::{
    validate_route, Edge, ExecutionMode, MonarchError, PositionState, Protocol, SwapStep, TxHash,
};

sol! {
    /// Mirrors the Uniswap V3 router's `ExactInputSingleParams`.
    struct ExactInputSingleParams {
        address tokenIn;
        address tokenOut;
        uint24 fee;
        address recipient;
        uint256 deadline;
        uint256 amountIn;
        uint256 amountOutMinimum;
        uint160 sqrtPriceLimitX96;
    }
}

/// Seconds a submitted hop stays valid.
const SWAP_DEADLINE_SECS: u64 = 300;

// ---------------------------------------------------------------------------
// Payload encoding
// ---------------------------------------------------------------------------

/// Builds per-hop instruction payloads. Venue addresses are fixed at
/// construction; unmappable hops (a Curve edge touching a token outside the
/// pool's coin table) fail closed — an execution-path miss must abort the
/// route, unlike the quote path's soft zero.
pub struct SwapEncoder {
    uniswap_router: Address,
    settlement: Address,
    curve: Option<CurvePoolConfig>,
}

impl SwapEncoder {
    pub fn new(uniswap_router: Address, settlement: Address, curve: Option<CurvePoolConfig>) -> Self {
        Self { uniswap_router, settlement, curve }
    }

    /// Encode one hop. `amount_in` is the quoted input for this hop; the
    /// per-hop minimum is left at zero since the route-level minimum guards
    /// the whole call.
    pub fn encode_step(&self, edge: &Edge, amount_in: U256) -> Result<SwapStep, MonarchError> {
        match edge.protocol {
            Protocol::UniswapV3 => {
                let params = ExactInputSingleParams {
                    tokenIn: edge.from,
                    tokenOut: edge.to,
                    fee: U24::from(edge.fee),
                    recipient: self.settlement,
                    deadline: U256::from(Utc::now().timestamp() as u64 + SWAP_DEADLINE_SECS),
                    amountIn: amount_in,
                    amountOutMinimum: U256::ZERO,
                    sqrtPriceLimitX96: U160::ZERO,
                };
                Ok(SwapStep {
                    target: self.uniswap_router,
                    data: params.abi_encode(),
                    token_in: edge.from,
                    token_out: edge.to,
                })
            }
            Protocol::Curve => {
                let curve = self
                    .curve
                    .as_ref()
                    .ok_or(MonarchError::ChainRequired("curve pool configuration"))?;
                let i = curve
                    .coin_index(edge.from)
                    .ok_or(MonarchError::UnmappedCurveToken(edge.from))?;
                let j = curve
                    .coin_index(edge.to)
                    .ok_or(MonarchError::UnmappedCurveToken(edge.to))?;
                Ok(SwapStep {
                    target: curve.pool,
                    data: (i, j, curve.pool).abi_encode(),
                    token_in: edge.from,
                    token_out: edge.to,
                })
            }
        }
    }

    /// Encode a full route. `hop_amounts[i]` is the quoted input to hop `i`.
    pub fn build_steps(
        &self,
        route: &[Edge],
        hop_amounts: &[U256],
    ) -> Result<Vec<SwapStep>, MonarchError> {
        if route.len() != hop_amounts.len() {
            return Err(MonarchError::Execution(format!(
                "route has {} hops but {} amounts",
                route.len(),
                hop_amounts.len()
            )));
        }
        route
            .iter()
            .zip(hop_amounts)
            .map(|(edge, amount)| self.encode_step(edge, *amount))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Result of committing a route.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub tx_hash: Option<TxHash>,
    /// Amount booked into the new position. Optimistic at the quoted
    /// output in all modes.
    pub filled_amount: U256,
}

pub struct Executor {
    mode: ExecutionMode,
    chain: Option<Arc<dyn ChainClient>>,
    encoder: SwapEncoder,
    slippage_bps: u64,
    commit_before_confirm: bool,
}

impl Executor {
    pub fn new(
        mode: ExecutionMode,
        chain: Option<Arc<dyn ChainClient>>,
        encoder: SwapEncoder,
        slippage_bps: u64,
        commit_before_confirm: bool,
    ) -> Self {
        Self { mode, chain, encoder, slippage_bps, commit_before_confirm }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Commit `route` and persist the resulting position. On any failure
    /// before the commit point the state and state file are untouched, so
    /// the next tick re-evaluates from the previous position.
    pub async fn execute(
        &self,
        route: &[Edge],
        hop_amounts: &[U256],
        expected_out: U256,
        state: &mut PositionState,
        store: &StateStore,
    ) -> Result<ExecutionOutcome> {
        validate_route(route, state.held_token)?;
        let amount_in = *hop_amounts.first().ok_or(MonarchError::EmptyRoute)?;
        let final_token = route.last().map(|e| e.to).ok_or(MonarchError::EmptyRoute)?;

        match self.mode {
            ExecutionMode::Simulated => {
                debug!(hops = route.len(), out = %expected_out, "Simulated fill");
                state.update_hold(final_token, expected_out);
                store.save(state)?;
                Ok(ExecutionOutcome { tx_hash: None, filled_amount: expected_out })
            }
            ExecutionMode::DryRun => {
                let steps = self.encoder.build_steps(route, hop_amounts)?;
                for (idx, step) in steps.iter().enumerate() {
                    info!(
                        hop = idx,
                        target = %step.target,
                        payload_bytes = step.data.len(),
                        "Dry run: payload built, not submitted"
                    );
                }
                state.update_hold(final_token, expected_out);
                store.save(state)?;
                Ok(ExecutionOutcome { tx_hash: None, filled_amount: expected_out })
            }
            ExecutionMode::Live => {
                let chain = self
                    .chain
                    .as_ref()
                    .ok_or(MonarchError::ChainRequired("live execution"))?;
                let steps = self.encoder.build_steps(route, hop_amounts)?;
                let min_out =
                    expected_out * U256::from(10_000 - self.slippage_bps) / U256::from(10_000u64);

                let tx = chain
                    .submit_swap(amount_in, min_out, &steps)
                    .await
                    .context("Swap submission failed")?;
                info!(tx = %tx, min_out = %min_out, "Swap submitted");

                if self.commit_before_confirm {
                    state.update_hold(final_token, expected_out);
                    store.save(state)?;
                    if let Err(e) = chain.await_confirmation(&tx).await {
                        warn!(tx = %tx, error = %e, "Confirmation failed after commit; state may over-report");
                        return Err(e);
                    }
                } else {
                    chain
                        .await_confirmation(&tx)
                        .await
                        .context("Swap confirmation failed")?;
                    state.update_hold(final_token, expected_out);
                    store.save(state)?;
                }
                Ok(ExecutionOutcome { tx_hash: Some(tx), filled_amount: expected_out })
            }
        }
    }
}
