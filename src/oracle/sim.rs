//! Simulation quote backend.
//!
//! Emulates near-peg stablecoin slippage without any network dependency:
//! the output is the input scaled by a uniform random multiplier in
//! [0.999, 1.001]. Decimal conversion is deliberately not applied — the
//! simulated mesh quotes in input units, which is enough to exercise the
//! scoring and decision paths offline.

use alloy_primitives::U256;
use rand::Rng;

use crate::types::Edge;

/// Multiplier bounds expressed in parts-per-million.
const VARIANCE_FLOOR_PPM: u64 = 999_000;
const VARIANCE_CEIL_PPM: u64 = 1_001_000;
const PPM: u64 = 1_000_000;

pub struct SimOracle {
    floor_ppm: u64,
    ceil_ppm: u64,
}

impl Default for SimOracle {
    fn default() -> Self {
        Self { floor_ppm: VARIANCE_FLOOR_PPM, ceil_ppm: VARIANCE_CEIL_PPM }
    }
}

impl SimOracle {
    /// Fixed-multiplier variant for deterministic tests (`ppm` of 1_000_000
    /// means an exact 1:1 fill).
    pub fn fixed(ppm: u64) -> Self {
        Self { floor_ppm: ppm, ceil_ppm: ppm }
    }

    pub async fn quote(&self, _edge: &Edge, amount_in: U256) -> U256 {
        let ppm = if self.floor_ppm == self.ceil_ppm {
            self.floor_ppm
        } else {
            rand::thread_rng().gen_range(self.floor_ppm..=self.ceil_ppm)
        };
        amount_in * U256::from(ppm) / U256::from(PPM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_fixtures::{addr, edge};
    use crate::types::Protocol;

    #[tokio::test]
    async fn test_quote_within_variance_bounds() {
        let sim = SimOracle::default();
        let e = edge(addr(1), addr(2), Protocol::UniswapV3, 500);
        let amount = U256::from(1_000_000_000u64);
        for _ in 0..50 {
            let out = sim.quote(&e, amount).await;
            assert!(out >= amount * U256::from(VARIANCE_FLOOR_PPM) / U256::from(PPM));
            assert!(out <= amount * U256::from(VARIANCE_CEIL_PPM) / U256::from(PPM));
        }
    }

    #[tokio::test]
    async fn test_fixed_multiplier() {
        let sim = SimOracle::fixed(1_002_000);
        let e = edge(addr(1), addr(2), Protocol::Curve, 0);
        let out = sim.quote(&e, U256::from(1_000_000u64)).await;
        assert_eq!(out, U256::from(1_002_000u64));
    }
}
