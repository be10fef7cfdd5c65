//! Curve pool quote backend.
//!
//! Curve pools address coins by integer index rather than token address, so
//! this backend carries a fixed token -> index table for one pool. Pairs
//! outside the table degrade to the zero sentinel.

use alloy_primitives::{Address, U256};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::chain::ChainClient;
use crate::types::Edge;

/// Static description of one Curve pool: its address and coin ordering.
/// The position of each token in `coins` is its `int128` index.
#[derive(Debug, Clone, Deserialize)]
pub struct CurvePoolConfig {
    pub pool: Address,
    pub coins: Vec<Address>,
}

impl CurvePoolConfig {
    pub fn coin_index(&self, token: Address) -> Option<i128> {
        self.coins.iter().position(|c| *c == token).map(|i| i as i128)
    }
}

pub struct CurvePool {
    chain: Arc<dyn ChainClient>,
    config: CurvePoolConfig,
}

impl CurvePool {
    pub fn new(chain: Arc<dyn ChainClient>, config: CurvePoolConfig) -> Self {
        Self { chain, config }
    }

    pub async fn quote(&self, edge: &Edge, amount_in: U256) -> U256 {
        let (Some(i), Some(j)) = (
            self.config.coin_index(edge.from),
            self.config.coin_index(edge.to),
        ) else {
            warn!(edge = %edge, "Unsupported Curve pair");
            return U256::ZERO;
        };

        match self.chain.get_dy(self.config.pool, i, j, amount_in).await {
            Ok(amount_out) => amount_out,
            Err(e) => {
                debug!(edge = %edge, error = %e, "Curve quote failed");
                U256::ZERO
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_fixtures::addr;

    #[test]
    fn test_coin_index() {
        let cfg = CurvePoolConfig { pool: addr(9), coins: vec![addr(3), addr(1), addr(2)] };
        assert_eq!(cfg.coin_index(addr(3)), Some(0));
        assert_eq!(cfg.coin_index(addr(1)), Some(1));
        assert_eq!(cfg.coin_index(addr(2)), Some(2));
        assert_eq!(cfg.coin_index(addr(7)), None);
    }
}
