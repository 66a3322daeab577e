//! Market book — one market and its full share vector
//!
//! The book owns the market's securities as an ordered list; the share
//! vector handed to the pricing kernel is a projection of that list, and a
//! security is addressed by its index into it. Keeping the vector inside
//! one owner makes "update one security, reprice all of them" structural:
//! there is no path that mutates a share count without going through the
//! book that can rebalance the rest.

use pricing_engine::PricingEngine;
use types::errors::{MarketError, SettlementError};
use types::ids::SecurityId;
use types::market::{Market, PriceTick, Security};

/// A market plus the ordered securities backing its share vector
#[derive(Debug, Clone)]
pub struct MarketBook {
    pub market: Market,
    securities: Vec<Security>,
}

impl MarketBook {
    /// Create a book for a freshly created market with no securities
    pub fn new(market: Market) -> Self {
        Self {
            market,
            securities: Vec::new(),
        }
    }

    /// Securities in vector order
    pub fn securities(&self) -> &[Security] {
        &self.securities
    }

    /// Find a security's index in the share vector
    pub fn index_of(&self, security_id: &SecurityId) -> Option<usize> {
        self.securities
            .iter()
            .position(|s| s.security_id == *security_id)
    }

    /// Look up a security by id
    pub fn get_security(&self, security_id: &SecurityId) -> Option<&Security> {
        self.index_of(security_id).map(|idx| &self.securities[idx])
    }

    /// Current outstanding-share vector, in security order
    pub fn share_vector(&self) -> Vec<f64> {
        self.securities.iter().map(|s| s.shares_outstanding).collect()
    }

    /// Snapshot the full share vector and locate the target security
    ///
    /// The caller must hold this market's consistency boundary; the snapshot
    /// is only valid against writes made under the same boundary entry.
    pub fn snapshot(
        &self,
        target: &SecurityId,
    ) -> Result<(Vec<f64>, usize), SettlementError> {
        let idx = self
            .index_of(target)
            .ok_or_else(|| SettlementError::SecurityNotFound {
                security_id: target.to_string(),
            })?;
        Ok((self.share_vector(), idx))
    }

    /// Add a security with zero outstanding shares
    ///
    /// Lifecycle gating (draft-only) is enforced by the ledger; the caller
    /// rebalances afterwards.
    pub fn add_security(
        &mut self,
        shortname: impl Into<String>,
        description: impl Into<String>,
        timestamp: i64,
    ) -> SecurityId {
        let security = Security::new(self.market.market_id, shortname, description, timestamp);
        let id = security.security_id;
        self.securities.push(security);
        id
    }

    /// Remove a security from the vector
    ///
    /// The caller rebalances afterwards.
    pub fn remove_security(&mut self, security_id: &SecurityId) -> Result<Security, MarketError> {
        let idx = self
            .index_of(security_id)
            .ok_or_else(|| MarketError::SecurityNotFound {
                security_id: security_id.to_string(),
            })?;
        Ok(self.securities.remove(idx))
    }

    /// Shift one security's outstanding shares by a signed, validated delta
    pub fn apply_trade(&mut self, idx: usize, delta: f64) {
        self.securities[idx].shares_outstanding += delta;
    }

    /// Recompute and store `last_price` for every security from the current
    /// share vector
    ///
    /// Must run after *any* change to the vector — a trade on one security
    /// moves the price of all of them.
    pub fn rebalance(&mut self, pricing: &PricingEngine) {
        let prices = pricing.prices(&self.share_vector());
        for (security, price) in self.securities.iter_mut().zip(prices) {
            security.last_price = price;
        }
    }

    /// One price tick per security at the given timestamp, in vector order
    pub fn price_ticks(&self, timestamp: i64) -> Vec<PriceTick> {
        self.securities
            .iter()
            .map(|s| PriceTick {
                security_id: s.security_id,
                price: s.last_price,
                timestamp,
            })
            .collect()
    }
}
