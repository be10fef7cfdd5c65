//! Price oracle — protocol-dispatching quote layer.
//!
//! Defines the `PriceOracle` trait and provides backends for:
//! - Uniswap V3 quoter calls (live)
//! - Curve pool `get_dy` calls against a fixed coin-index table (live)
//! - a randomized near-peg simulation for offline replay
//!
//! Every backend fails soft: a lookup miss, malformed pair, or call error
//! degrades to a zero `amount_out` sentinel and never aborts the tick.

pub mod curve;
pub mod sim;
pub mod uniswap;

use alloy_primitives::U256;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::chain::ChainClient;
use crate::types::{Edge, PriceSource, Protocol};

use curve::CurvePool;
use sim::SimOracle;
use uniswap::UniswapQuoter;

/// Quote a single edge for an exact input amount.
///
/// Returns the output amount in the target token's smallest unit; zero is
/// the "no liquidity / fetch failure" sentinel, never a valid price.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn quote(&self, edge: &Edge, amount_in: U256) -> U256;
}

/// Dispatches quotes by edge protocol, or routes everything to the
/// simulation backend when `PriceSource::Simulated` is selected — the
/// selection is independent of execution mode so live and replayed runs
/// share the rest of the system unchanged.
pub struct QuoteRouter {
    source: PriceSource,
    uniswap: Option<UniswapQuoter>,
    curve: Option<CurvePool>,
    sim: SimOracle,
}

impl QuoteRouter {
    pub fn new(
        source: PriceSource,
        chain: Option<Arc<dyn ChainClient>>,
        curve_pool: Option<curve::CurvePoolConfig>,
    ) -> Self {
        let uniswap = chain.clone().map(UniswapQuoter::new);
        let curve = match (chain, curve_pool) {
            (Some(chain), Some(cfg)) => Some(CurvePool::new(chain, cfg)),
            _ => None,
        };
        Self { source, uniswap, curve, sim: SimOracle::default() }
    }

    /// Replace the simulation backend (deterministic variants for tests).
    pub fn with_sim(mut self, sim: SimOracle) -> Self {
        self.sim = sim;
        self
    }
}

#[async_trait]
impl PriceOracle for QuoteRouter {
    async fn quote(&self, edge: &Edge, amount_in: U256) -> U256 {
        if amount_in.is_zero() {
            return U256::ZERO;
        }
        if self.source == PriceSource::Simulated {
            return self.sim.quote(edge, amount_in).await;
        }
        match edge.protocol {
            Protocol::UniswapV3 => match &self.uniswap {
                Some(backend) => backend.quote(edge, amount_in).await,
                None => {
                    warn!(edge = %edge, "No chain client for live Uniswap quote");
                    U256::ZERO
                }
            },
            Protocol::Curve => match &self.curve {
                Some(backend) => backend.quote(edge, amount_in).await,
                None => {
                    warn!(edge = %edge, "No Curve pool configured");
                    U256::ZERO
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_fixtures::{addr, edge};

    #[tokio::test]
    async fn test_zero_input_is_zero_output() {
        let router = QuoteRouter::new(PriceSource::Simulated, None, None);
        let e = edge(addr(1), addr(2), Protocol::UniswapV3, 500);
        assert_eq!(router.quote(&e, U256::ZERO).await, U256::ZERO);
    }

    #[tokio::test]
    async fn test_live_without_chain_degrades_to_zero() {
        let router = QuoteRouter::new(PriceSource::Live, None, None);
        let uni = edge(addr(1), addr(2), Protocol::UniswapV3, 500);
        let crv = edge(addr(1), addr(2), Protocol::Curve, 0);
        assert_eq!(router.quote(&uni, U256::from(1000u64)).await, U256::ZERO);
        assert_eq!(router.quote(&crv, U256::from(1000u64)).await, U256::ZERO);
    }

    #[tokio::test]
    async fn test_simulated_source_ignores_protocol() {
        let router = QuoteRouter::new(PriceSource::Simulated, None, None);
        for proto in [Protocol::UniswapV3, Protocol::Curve] {
            let e = edge(addr(1), addr(2), proto, 500);
            let out = router.quote(&e, U256::from(1_000_000u64)).await;
            assert!(!out.is_zero());
        }
    }
}
