//! Pricing Engine Service
//!
//! Pure LMSR (Logarithmic Market Scoring Rule) pricing kernel. Given a
//! liquidity constant and the outstanding-share vector of one market, it
//! computes the instantaneous price of every security and the exact token
//! cost of a signed trade. No I/O, no state.
//!
//! **Key Invariants:**
//! - Prices across one market always sum to the display scale
//! - A zero-size trade costs exactly zero
//! - Deterministic (same inputs → same outputs)
//! - Numerically stable for arbitrarily large share counts (shifted
//!   log-sum-exp; never direct exponentiation)

pub mod engine;
pub mod lmsr;

pub use engine::{PricingConfig, PricingEngine};
