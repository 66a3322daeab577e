//! Pricing engine — configured facade over the LMSR kernel
//!
//! Carries the deployment-fixed liquidity constant and display scale so
//! callers never thread raw parameters through settlement code.

use serde::{Deserialize, Serialize};

use crate::lmsr;

/// Pricing engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Liquidity constant `b`; larger means deeper liquidity and smaller
    /// price impact per share
    pub liquidity: f64,
    /// Display scale `K`; prices across one market sum to this value
    pub scale: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            liquidity: 10.0,
            scale: 100.0,
        }
    }
}

/// Pricing engine service
#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    /// Create a new pricing engine with default configuration
    pub fn new() -> Self {
        Self {
            config: PricingConfig::default(),
        }
    }

    /// Create a new pricing engine with custom configuration
    ///
    /// # Panics
    /// Panics if liquidity or scale is not positive
    pub fn with_config(config: PricingConfig) -> Self {
        assert!(config.liquidity > 0.0, "Liquidity must be positive");
        assert!(config.scale > 0.0, "Display scale must be positive");
        Self { config }
    }

    /// The configured display scale
    pub fn scale(&self) -> f64 {
        self.config.scale
    }

    /// Price of the security at `idx` given the market's share vector
    pub fn price(&self, shares: &[f64], idx: usize) -> f64 {
        lmsr::price(self.config.liquidity, self.config.scale, shares, idx)
    }

    /// Prices for every security in the market, in vector order
    pub fn prices(&self, shares: &[f64]) -> Vec<f64> {
        (0..shares.len()).map(|i| self.price(shares, i)).collect()
    }

    /// Token cost of trading a signed `delta` of the security at `idx`
    pub fn trade_cost(&self, shares: &[f64], idx: usize, delta: f64) -> f64 {
        lmsr::trade_cost(self.config.liquidity, self.config.scale, shares, idx, delta)
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new()
    }
}
