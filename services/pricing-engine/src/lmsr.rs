//! LMSR pricing math
//!
//! The market maker quotes every security in a market off one shared
//! outstanding-share vector `q`. With liquidity `b` and display scale `K`:
//!
//! ```text
//! price_i    = K · exp(q_i/b) / Σ_j exp(q_j/b)
//! potential  = K · b · ln(Σ_j exp(q_j/b))
//! trade cost = potential(q with q_i += Δ) − potential(q)
//! ```
//!
//! `potential` is the LMSR cost function; its partial derivative in `q_i`
//! is exactly `price_i`, so the trade cost is the path-independent token
//! amount owed for a signed trade of Δ shares.
//!
//! All exponentials go through a max-shifted log-sum-exp. The direct form
//! overflows `f64` once any `q_i/b` exceeds ~709, which real share counts
//! reach easily at low liquidity.

/// Numerically stable `ln(Σ exp(x_j))`
///
/// Shifts by `max(x_j)` before exponentiating so the largest term is
/// `exp(0)` and the sum stays in range.
fn log_sum_exp(xs: &[f64]) -> f64 {
    let max = xs.iter().fold(f64::NEG_INFINITY, |m, &x| m.max(x));
    let sum: f64 = xs.iter().map(|&x| (x - max).exp()).sum();
    max + sum.ln()
}

/// Instantaneous price of the security at `idx`
///
/// Prices across the whole vector sum to `scale`.
///
/// # Panics
/// Panics if `b <= 0`, `scale <= 0`, the vector is empty, or `idx` is out
/// of bounds.
pub fn price(b: f64, scale: f64, shares: &[f64], idx: usize) -> f64 {
    assert!(b > 0.0, "Liquidity must be positive");
    assert!(scale > 0.0, "Display scale must be positive");
    assert!(!shares.is_empty(), "Share vector must be non-empty");
    assert!(idx < shares.len(), "Security index out of bounds");

    let max = shares.iter().fold(f64::NEG_INFINITY, |m, &q| m.max(q / b));
    let mut numerator = 0.0;
    let mut sum = 0.0;
    for (j, &q) in shares.iter().enumerate() {
        let e = (q / b - max).exp();
        if j == idx {
            numerator = e;
        }
        sum += e;
    }
    scale * numerator / sum
}

/// LMSR cost potential of a share vector, scaled to the display scale
///
/// # Panics
/// Panics if `b <= 0`, `scale <= 0`, or the vector is empty.
pub fn potential(b: f64, scale: f64, shares: &[f64]) -> f64 {
    assert!(b > 0.0, "Liquidity must be positive");
    assert!(scale > 0.0, "Display scale must be positive");
    assert!(!shares.is_empty(), "Share vector must be non-empty");

    let xs: Vec<f64> = shares.iter().map(|&q| q / b).collect();
    scale * b * log_sum_exp(&xs)
}

/// Exact token cost of trading a signed `delta` of the security at `idx`
///
/// Positive for a net payment by the trader, negative for a net receipt.
/// Evaluated against a copy of the vector; the caller's slice is left
/// untouched because the pre-trade vector is still needed for validation.
///
/// # Panics
/// Panics on the same domain violations as [`potential`], or if `idx` is
/// out of bounds.
pub fn trade_cost(b: f64, scale: f64, shares: &[f64], idx: usize, delta: f64) -> f64 {
    assert!(idx < shares.len(), "Security index out of bounds");
    if delta == 0.0 {
        return 0.0;
    }

    let before = potential(b, scale, shares);
    let mut shifted = shares.to_vec();
    shifted[idx] += delta;
    potential(b, scale, &shifted) - before
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-5;

    fn within_epsilon(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_price_reference_scenario() {
        // b=10, q=[10,20,23] at unit scale
        assert!(within_epsilon(price(10.0, 1.0, &[10.0, 20.0, 23.0], 0), 0.13536));
    }

    #[test]
    fn test_price_scaled_scenario() {
        let p = price(10.0, 100.0, &[10.0, 20.0, 23.0], 0);
        assert!((p - 13.536235).abs() < 1e-4);
    }

    #[test]
    fn test_trade_cost_reference_scenario() {
        assert!(within_epsilon(
            trade_cost(10.0, 1.0, &[10.0, 20.0, 23.0], 0, 7.0),
            1.28590
        ));
    }

    #[test]
    fn test_trade_cost_scaled_scenario() {
        let cost = trade_cost(10.0, 100.0, &[10.0, 20.0, 23.0], 0, 7.0);
        assert!((cost - 128.590162).abs() < 1e-4);
    }

    #[test]
    fn test_zero_vector_prices_uniformly() {
        let shares = [0.0, 0.0, 0.0];
        for idx in 0..shares.len() {
            assert_eq!(price(10.0, 100.0, &shares, idx), 100.0 / 3.0);
        }
    }

    #[test]
    fn test_single_security_prices_at_scale() {
        assert_eq!(price(10.0, 100.0, &[42.0], 0), 100.0);
    }

    #[test]
    fn test_zero_delta_costs_nothing() {
        assert_eq!(trade_cost(10.0, 100.0, &[10.0, 20.0, 23.0], 1, 0.0), 0.0);
    }

    #[test]
    fn test_trade_cost_leaves_input_untouched() {
        let shares = vec![10.0, 20.0, 23.0];
        trade_cost(10.0, 100.0, &shares, 0, 7.0);
        assert_eq!(shares, vec![10.0, 20.0, 23.0]);
    }

    #[test]
    fn test_sell_cost_is_negative() {
        let cost = trade_cost(10.0, 100.0, &[50.0, 20.0, 23.0], 0, -10.0);
        assert!(cost < 0.0);
    }

    #[test]
    fn test_large_share_counts_stay_finite() {
        // direct exponentiation would overflow at q/b = 1e5
        let shares = [1.0e6, 2.0e6, 2.3e6];
        let p = price(10.0, 100.0, &shares, 2);
        assert!(p.is_finite());
        assert!((p - 100.0).abs() < 1e-9);

        let cost = trade_cost(10.0, 100.0, &shares, 2, 5.0);
        assert!(cost.is_finite());
    }

    #[test]
    #[should_panic(expected = "Liquidity must be positive")]
    fn test_non_positive_liquidity_panics() {
        price(0.0, 100.0, &[1.0, 2.0], 0);
    }

    #[test]
    #[should_panic(expected = "Share vector must be non-empty")]
    fn test_empty_vector_panics() {
        potential(10.0, 100.0, &[]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn share_vector() -> impl Strategy<Value = Vec<f64>> {
            proptest::collection::vec(0.0f64..500.0, 1..8)
        }

        proptest! {
            #[test]
            fn prop_prices_sum_to_scale(shares in share_vector()) {
                let total: f64 = (0..shares.len())
                    .map(|i| price(10.0, 100.0, &shares, i))
                    .sum();
                prop_assert!((total - 100.0).abs() < 1e-6);
            }

            #[test]
            fn prop_zero_trade_is_free(shares in share_vector()) {
                prop_assert_eq!(trade_cost(10.0, 100.0, &shares, 0, 0.0), 0.0);
            }

            #[test]
            fn prop_buy_then_sell_back_nets_zero(
                shares in share_vector(),
                delta in 0.1f64..100.0,
            ) {
                let buy = trade_cost(10.0, 100.0, &shares, 0, delta);
                let mut after = shares.clone();
                after[0] += delta;
                let sell = trade_cost(10.0, 100.0, &after, 0, -delta);
                prop_assert!((buy + sell).abs() < 1e-6);
            }

            #[test]
            fn prop_buy_never_pays_the_trader(
                shares in share_vector(),
                delta in 0.1f64..100.0,
            ) {
                // cost can round to exactly zero when the target security is
                // deep out of the money, but it must never go negative
                prop_assert!(trade_cost(10.0, 100.0, &shares, 0, delta) >= 0.0);
            }
        }
    }
}
