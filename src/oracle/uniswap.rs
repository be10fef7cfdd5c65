//! Uniswap V3 quote backend.
//!
//! Thin adapter over the chain client's `quoteExactInputSingle` call. Any
//! call error is swallowed into the zero sentinel — a failed quote must
//! never abort the scan.

use alloy_primitives::U256;
use std::sync::Arc;
use tracing::debug;

use crate::chain::ChainClient;
use crate::types::Edge;

pub struct UniswapQuoter {
    chain: Arc<dyn ChainClient>,
}

impl UniswapQuoter {
    pub fn new(chain: Arc<dyn ChainClient>) -> Self {
        Self { chain }
    }

    pub async fn quote(&self, edge: &Edge, amount_in: U256) -> U256 {
        match self
            .chain
            .quote_exact_input_single(edge.from, edge.to, edge.fee, amount_in)
            .await
        {
            Ok(amount_out) => amount_out,
            Err(e) => {
                debug!(edge = %edge, error = %e, "Uniswap quote failed");
                U256::ZERO
            }
        }
    }
}
