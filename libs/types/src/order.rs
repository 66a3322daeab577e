//! Order side and the immutable order record
//!
//! The order ledger is a write-once log: records are appended by the
//! settlement transaction and never updated or deleted afterwards. It is the
//! audit trail from which share counts and balances can be re-derived.

use crate::ids::{AccountId, MarketId, OrderId, SecurityId};
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy from the market maker
    BUY,
    /// Sell back to the market maker
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }

    /// Convert an unsigned order amount into the signed trade delta
    pub fn signed(&self, amount: f64) -> f64 {
        match self {
            Side::BUY => amount,
            Side::SELL => -amount,
        }
    }
}

/// One settled order
///
/// `amount` is the signed share count (positive bought, negative sold) and
/// `cost` the signed token flow (positive paid, negative received), both as
/// realized at settlement time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub account_id: AccountId,
    pub market_id: MarketId,
    pub security_id: SecurityId,
    pub amount: f64,
    pub cost: f64,
    pub created_at: i64,
}

impl Order {
    /// Create a settled order record
    pub fn new(
        account_id: AccountId,
        market_id: MarketId,
        security_id: SecurityId,
        amount: f64,
        cost: f64,
        timestamp: i64,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            account_id,
            market_id,
            security_id,
            amount,
            cost,
            created_at: timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::BUY.opposite(), Side::SELL);
        assert_eq!(Side::SELL.opposite(), Side::BUY);
    }

    #[test]
    fn test_side_signed() {
        assert_eq!(Side::BUY.signed(7.0), 7.0);
        assert_eq!(Side::SELL.signed(7.0), -7.0);
    }

    #[test]
    fn test_side_serialization() {
        assert_eq!(serde_json::to_string(&Side::BUY).unwrap(), "\"BUY\"");
        assert_eq!(serde_json::to_string(&Side::SELL).unwrap(), "\"SELL\"");
    }

    #[test]
    fn test_order_roundtrip() {
        let order = Order::new(
            AccountId::new(),
            MarketId::new(),
            SecurityId::new(),
            -3.5,
            -1.25,
            1754000000000000000,
        );
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
    }
}
