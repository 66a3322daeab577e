//! Account, portfolio and position types
//!
//! An account holds one token portfolio (the market numeraire) and one
//! position per security it has ever traded. Positions are created lazily on
//! first trade; an absent position means a holding of zero, never a
//! negative-default row.

use crate::ids::{AccountId, SecurityId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Token balance for one account
///
/// Invariant: `tokens >= 0` — affordability is validated by the settlement
/// transaction before any mutation reaches here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub account_id: AccountId,
    pub tokens: f64,
}

impl Portfolio {
    /// Create a portfolio holding the initial token allocation
    pub fn new(account_id: AccountId, tokens: f64) -> Self {
        Self { account_id, tokens }
    }

    /// Apply a signed settlement cost: positive debits, negative credits
    ///
    /// # Panics
    /// Panics if the debit would leave the balance negative
    pub fn charge(&mut self, cost: f64) {
        assert!(
            self.tokens - cost >= 0.0,
            "Token balance must not go negative"
        );
        self.tokens -= cost;
    }
}

/// Signed share holding of one account in one security
///
/// Invariant: `amount >= 0` — short selling is rejected upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub account_id: AccountId,
    pub security_id: SecurityId,
    pub amount: f64,
}

impl Position {
    /// Create an empty position
    pub fn new(account_id: AccountId, security_id: SecurityId) -> Self {
        Self {
            account_id,
            security_id,
            amount: 0.0,
        }
    }

    /// Apply a signed trade amount: positive buys, negative sells
    ///
    /// # Panics
    /// Panics if the sale would leave the holding negative
    pub fn apply(&mut self, delta: f64) {
        assert!(
            self.amount + delta >= 0.0,
            "Position must not go negative"
        );
        self.amount += delta;
    }
}

/// Account aggregate: portfolio plus per-security positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub portfolio: Portfolio,
    pub positions: HashMap<SecurityId, Position>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Account {
    /// Create a new account with the given initial token allocation
    pub fn new(initial_tokens: f64, timestamp: i64) -> Self {
        let account_id = AccountId::new();
        Self {
            account_id,
            portfolio: Portfolio::new(account_id, initial_tokens),
            positions: HashMap::new(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Current token balance
    pub fn tokens(&self) -> f64 {
        self.portfolio.tokens
    }

    /// Current holding in a security; absent position means zero
    pub fn held(&self, security_id: &SecurityId) -> f64 {
        self.positions
            .get(security_id)
            .map(|p| p.amount)
            .unwrap_or(0.0)
    }

    /// Apply one validated settlement to this account: debit the signed
    /// `cost` and shift the position by the signed `delta`, creating the
    /// position row on first trade.
    pub fn apply_settlement(
        &mut self,
        security_id: SecurityId,
        delta: f64,
        cost: f64,
        timestamp: i64,
    ) {
        self.portfolio.charge(cost);
        self.positions
            .entry(security_id)
            .or_insert_with(|| Position::new(self.account_id, security_id))
            .apply(delta);
        self.updated_at = timestamp;
    }
}
