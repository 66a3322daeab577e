//! Market lifecycle and security state
//!
//! A market owns a set of securities whose prices are jointly determined:
//! the outstanding-share vector of the whole market is the sole input to
//! every security's price. Securities are therefore mutated only through
//! their owning market, never independently.

use crate::ids::{MarketId, SecurityId};
use serde::{Deserialize, Serialize};

/// Market lifecycle status
///
/// Securities may only be added or removed while the market is DRAFT.
/// A market that has ever left DRAFT can no longer be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketStatus {
    /// Created but not yet open for trading; securities editable
    DRAFT,
    /// Open for trading
    OPEN,
    /// Closed for trading
    CLOSED,
}

/// A prediction market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub market_id: MarketId,
    pub description: String,
    pub status: MarketStatus,
    pub created_at: i64,
    pub opened_at: Option<i64>,
    pub closed_at: Option<i64>,
}

impl Market {
    /// Create a new market in DRAFT status
    pub fn new(description: impl Into<String>, timestamp: i64) -> Self {
        Self {
            market_id: MarketId::new(),
            description: description.into(),
            status: MarketStatus::DRAFT,
            created_at: timestamp,
            opened_at: None,
            closed_at: None,
        }
    }

    /// Open the market for trading
    pub fn open(&mut self, timestamp: i64) {
        self.status = MarketStatus::OPEN;
        // reopening a closed market keeps the first opened_at
        self.opened_at.get_or_insert(timestamp);
        self.closed_at = None;
    }

    /// Close the market for trading
    pub fn close(&mut self, timestamp: i64) {
        self.status = MarketStatus::CLOSED;
        self.closed_at = Some(timestamp);
    }

    /// Check if the market is open for trading
    pub fn is_open(&self) -> bool {
        matches!(self.status, MarketStatus::OPEN)
    }

    /// Check if the market is still in DRAFT
    pub fn is_draft(&self) -> bool {
        matches!(self.status, MarketStatus::DRAFT)
    }

    /// Check if the market has ever been opened
    ///
    /// Once true, the market is undeletable and its securities frozen.
    pub fn ever_opened(&self) -> bool {
        !self.is_draft()
    }
}

/// A tradable security belonging to exactly one market
///
/// `shares_outstanding` and `last_price` are mutated only by the settlement
/// transaction, or by security-management calls that rebalance the whole
/// market afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Security {
    pub security_id: SecurityId,
    pub market_id: MarketId,
    pub shortname: String,
    pub description: String,
    pub shares_outstanding: f64,
    pub last_price: f64,
    pub created_at: i64,
}

impl Security {
    /// Create a new security with zero outstanding shares
    ///
    /// `last_price` starts at zero and is set by the first rebalance.
    pub fn new(
        market_id: MarketId,
        shortname: impl Into<String>,
        description: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            security_id: SecurityId::new(),
            market_id,
            shortname: shortname.into(),
            description: description.into(),
            shares_outstanding: 0.0,
            last_price: 0.0,
            created_at: timestamp,
        }
    }
}

/// One entry in the append-only price-history log
///
/// Every committed settlement writes one tick per security in the market,
/// all carrying the settlement's timestamp. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    pub security_id: SecurityId,
    pub price: f64,
    pub timestamp: i64,
}
