//! 18-decimal normalization and swap scoring.

use alloy_primitives::{Address, I256, U256};

use crate::types::{MonarchError, TokenRegistry};

/// Per-tier risk haircut, in thousandths of the output (0.3% per tier
/// crossed downward).
const TIER_PENALTY_PER_MILLE: u64 = 3;

/// Scale `amount` from the token's native precision up to 18 decimals.
/// Tokens above 18 decimals are rejected rather than truncated.
pub fn normalize(
    amount: U256,
    token: Address,
    registry: &TokenRegistry,
) -> Result<U256, MonarchError> {
    let decimals = registry.decimals_of(token);
    if decimals > 18 {
        return Err(MonarchError::UnsupportedDecimals(token, decimals));
    }
    Ok(amount * U256::from(10u8).pow(U256::from(18 - decimals)))
}

/// Scale an 18-decimal amount back down to the token's native precision.
/// Truncates toward zero.
pub fn denormalize(
    amount18: U256,
    token: Address,
    registry: &TokenRegistry,
) -> Result<U256, MonarchError> {
    let decimals = registry.decimals_of(token);
    if decimals > 18 {
        return Err(MonarchError::UnsupportedDecimals(token, decimals));
    }
    Ok(amount18 / U256::from(10u8).pow(U256::from(18 - decimals)))
}

/// Risk haircut on `out_norm` for moving down the tier ladder.
///
/// Only downgrades are penalized: moving from tier 1 into tier 3 costs
/// 0.6% of the output; moving up or sideways costs nothing.
pub fn risk_penalty(
    out_norm: U256,
    token_in: Address,
    token_out: Address,
    registry: &TokenRegistry,
) -> U256 {
    let from_tier = registry.tier_of(token_in);
    let to_tier = registry.tier_of(token_out);
    if to_tier <= from_tier {
        return U256::ZERO;
    }
    let delta = u64::from(to_tier - from_tier);
    out_norm * U256::from(TIER_PENALTY_PER_MILLE * delta) / U256::from(1000u64)
}

/// Net score of swapping `amount_in` of `token_in` for `amount_out` of
/// `token_out`, on the 18-decimal basis. Negative scores are meaningful
/// (the hold-by-default comparison is strict), hence the signed result.
pub fn score_swap(
    amount_in: U256,
    token_in: Address,
    amount_out: U256,
    token_out: Address,
    registry: &TokenRegistry,
    tiered: bool,
) -> Result<I256, MonarchError> {
    let in_norm = normalize(amount_in, token_in, registry)?;
    let out_norm = normalize(amount_out, token_out, registry)?;
    let penalty = if tiered {
        risk_penalty(out_norm, token_in, token_out, registry)
    } else {
        U256::ZERO
    };

    let to_signed = |v: U256| {
        I256::try_from(v)
            .map_err(|_| MonarchError::Execution(format!("amount out of signed range: {v}")))
    };
    Ok(to_signed(out_norm)? - to_signed(in_norm)? - to_signed(penalty)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_fixtures::{addr, registry};

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_normalize_six_decimals() {
        let reg = registry();
        // 1.5 units of the 6-decimal token.
        let norm = normalize(u(1_500_000), addr(1), &reg).unwrap();
        assert_eq!(norm, U256::from(1_500_000_000_000_000_000u128));
    }

    #[test]
    fn test_normalize_eighteen_decimals_identity() {
        let reg = registry();
        let amount = U256::from(123_456_789u64);
        assert_eq!(normalize(amount, addr(2), &reg).unwrap(), amount);
    }

    #[test]
    fn test_normalize_rejects_high_precision() {
        let mut reg = registry();
        reg.insert(
            addr(9),
            crate::types::TokenInfo { symbol: "XXL".into(), decimals: 24, tier: 3 },
        );
        assert!(matches!(
            normalize(u(1), addr(9), &reg),
            Err(MonarchError::UnsupportedDecimals(_, 24))
        ));
    }

    #[test]
    fn test_denormalize_roundtrip() {
        let reg = registry();
        let amount = u(2_000_000);
        let norm = normalize(amount, addr(1), &reg).unwrap();
        assert_eq!(denormalize(norm, addr(1), &reg).unwrap(), amount);
    }

    #[test]
    fn test_penalty_only_on_downgrade() {
        let reg = registry();
        let out = U256::from(1_000_000_000_000_000_000u128);
        // tier 1 -> tier 3: two tiers down, 0.6%.
        let down = risk_penalty(out, addr(1), addr(3), &reg);
        assert_eq!(down, out * u(6) / u(1000));
        // tier 3 -> tier 1: upgrade, free.
        assert_eq!(risk_penalty(out, addr(3), addr(1), &reg), U256::ZERO);
        // same tier: free.
        assert_eq!(risk_penalty(out, addr(2), addr(2), &reg), U256::ZERO);
    }

    #[test]
    fn test_unknown_token_treated_as_riskiest() {
        let reg = registry();
        let out = U256::from(1_000_000_000_000_000_000u128);
        let p = risk_penalty(out, addr(1), addr(99), &reg);
        assert_eq!(p, out * u(6) / u(1000));
    }

    #[test]
    fn test_score_flat_swap_is_zero() {
        let reg = registry();
        // 1.0 of 6-dec token in, 1.0 of 18-dec token out, same-ish tiers off.
        let score = score_swap(
            u(1_000_000),
            addr(1),
            U256::from(1_000_000_000_000_000_000u128),
            addr(2),
            &reg,
            false,
        )
        .unwrap();
        assert_eq!(score, I256::ZERO);
    }

    #[test]
    fn test_small_gain_across_decimals_is_positive() {
        let reg = registry();
        // 100.0 of the 6-decimal token in, 100.1 of the 18-decimal token out.
        let score = score_swap(
            u(100_000_000),
            addr(1),
            U256::from(100_100_000_000_000_000_000u128),
            addr(2),
            &reg,
            false,
        )
        .unwrap();
        assert!(score.is_positive());
        assert_eq!(score, I256::try_from(100_000_000_000_000_000u128).unwrap());
    }

    #[test]
    fn test_score_can_go_negative() {
        let reg = registry();
        let score = score_swap(
            u(1_000_000),
            addr(1),
            U256::from(990_000_000_000_000_000u128),
            addr(2),
            &reg,
            false,
        )
        .unwrap();
        assert!(score.is_negative());
    }

    #[test]
    fn test_tiered_penalty_shrinks_score() {
        let reg = registry();
        let amount_in = u(1_000_000);
        let amount_out = U256::from(1_010_000_000_000_000_000u128);
        let plain = score_swap(amount_in, addr(1), amount_out, addr(3), &reg, false).unwrap();
        let tiered = score_swap(amount_in, addr(1), amount_out, addr(3), &reg, true).unwrap();
        assert!(tiered < plain);
        // 0.3% * 2 tiers of the normalized output.
        let expected_penalty = I256::try_from(amount_out * u(6) / u(1000)).unwrap();
        assert_eq!(plain - tiered, expected_penalty);
    }
}
