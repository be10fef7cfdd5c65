//! Acceptance threshold for candidate swaps.

use alloy_primitives::U256;

/// Minimum score a candidate must strictly exceed, on the 18-decimal
/// basis. An absolute floor takes precedence over the percent floor; the
/// percent floor is taken against the normalized held balance, with the
/// percentage truncated to basis points before applying.
pub fn profit_threshold(
    min_profit_amount: Option<f64>,
    min_profit_percent: f64,
    balance18: U256,
) -> U256 {
    if let Some(amount) = min_profit_amount {
        return U256::from((amount * 1e18) as u128);
    }
    let bps = (min_profit_percent * 100.0).floor() as u64;
    balance18 * U256::from(bps) / U256::from(10_000u64)
}
