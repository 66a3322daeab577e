//! Ledger — all mutable market state plus the collaborator operations
//!
//! Market/security lifecycle, account management, and the read-only queries
//! sit here; the settlement transaction itself lives in `settle`. Lifecycle
//! calls that change a share vector outside a settlement (adding or removing
//! a security) finish with a full-vector rebalance, because every security's
//! price depends on the whole vector.
//!
//! Readers do not enter the consistency boundary for longer than a copy:
//! they may observe a committed-but-stale price board, never a partially
//! applied settlement.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use dashmap::DashMap;
use serde::Deserialize;

use pricing_engine::{PricingConfig, PricingEngine};
use types::account::Account;
use types::errors::{AccountError, LedgerError, MarketError, SettlementError};
use types::ids::{AccountId, MarketId, SecurityId};
use types::market::{Market, PriceTick, Security};
use types::order::Order;

use crate::book::MarketBook;
use crate::boundary::MarketBoundary;

/// Current time as unix nanoseconds (saturates past year 2262)
pub(crate) fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

/// Shortname + description pair for a security to be added
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SecuritySpec {
    pub shortname: String,
    pub description: String,
}

/// Order-ledger query filter; all fields optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub account_id: Option<AccountId>,
    pub market_id: Option<MarketId>,
    pub security_id: Option<SecurityId>,
    /// Only orders created at or after this unix-nanosecond timestamp
    pub since: Option<i64>,
    pub limit: Option<usize>,
}

/// The in-memory ledger backing the exchange
///
/// All methods take `&self`; shared ownership via `Arc<Ledger>` is the
/// expected deployment shape.
pub struct Ledger {
    pub(crate) pricing: PricingEngine,
    pub(crate) boundary: MarketBoundary,
    pub(crate) accounts: DashMap<AccountId, Arc<Mutex<Account>>>,
    /// Global security → owning market index for id-only lookups
    pub(crate) securities: DashMap<SecurityId, MarketId>,
    /// Append-only order ledger
    pub(crate) orders: Mutex<Vec<Order>>,
    /// Append-only price history, one tick per security per settlement
    pub(crate) ticks: Mutex<Vec<PriceTick>>,
}

impl Ledger {
    /// Create a ledger with default pricing parameters
    pub fn new() -> Self {
        Self::with_pricing(PricingConfig::default())
    }

    /// Create a ledger with custom pricing parameters
    pub fn with_pricing(config: PricingConfig) -> Self {
        Self {
            pricing: PricingEngine::with_config(config),
            boundary: MarketBoundary::new(),
            accounts: DashMap::new(),
            securities: DashMap::new(),
            orders: Mutex::new(Vec::new()),
            ticks: Mutex::new(Vec::new()),
        }
    }

    // ── Market lifecycle ────────────────────────────────────────────────

    /// Create a market in DRAFT status
    pub fn create_market(&self, description: impl Into<String>) -> MarketId {
        let market = Market::new(description, now_nanos());
        let market_id = market.market_id;
        self.boundary.register(MarketBook::new(market));
        tracing::info!(%market_id, "market created");
        market_id
    }

    /// Open a market for trading
    pub fn open_market(&self, market_id: &MarketId) -> Result<(), LedgerError> {
        self.boundary.with_book(market_id, |book| {
            if book.market.is_open() {
                return Err(MarketError::AlreadyOpen {
                    market_id: market_id.to_string(),
                }
                .into());
            }
            book.market.open(now_nanos());
            tracing::info!(%market_id, "market opened");
            Ok(())
        })
    }

    /// Close a market for trading
    pub fn close_market(&self, market_id: &MarketId) -> Result<(), LedgerError> {
        self.boundary.with_book(market_id, |book| {
            if !book.market.is_open() {
                return Err(MarketError::NotOpen {
                    market_id: market_id.to_string(),
                }
                .into());
            }
            book.market.close(now_nanos());
            tracing::info!(%market_id, "market closed");
            Ok(())
        })
    }

    /// Delete a market that never left DRAFT, cascading to its securities
    pub fn delete_market(&self, market_id: &MarketId) -> Result<(), LedgerError> {
        let book = self.boundary.remove_draft(market_id)?;
        for security in book.securities() {
            self.securities.remove(&security.security_id);
        }
        tracing::info!(%market_id, "market deleted");
        Ok(())
    }

    // ── Security management ─────────────────────────────────────────────

    /// Add securities to a DRAFT market, then rebalance the whole vector
    pub fn add_securities(
        &self,
        market_id: &MarketId,
        specs: Vec<SecuritySpec>,
    ) -> Result<Vec<SecurityId>, LedgerError> {
        let timestamp = now_nanos();
        self.boundary.with_book(market_id, |book| {
            if book.market.ever_opened() {
                return Err(MarketError::NotDraft {
                    market_id: market_id.to_string(),
                }
                .into());
            }
            let ids: Vec<SecurityId> = specs
                .into_iter()
                .map(|spec| book.add_security(spec.shortname, spec.description, timestamp))
                .collect();
            book.rebalance(&self.pricing);
            for id in &ids {
                self.securities.insert(*id, *market_id);
            }
            tracing::info!(%market_id, added = ids.len(), "securities added");
            Ok(ids)
        })
    }

    /// Remove a security from a DRAFT market, then rebalance the remainder
    pub fn remove_security(
        &self,
        market_id: &MarketId,
        security_id: &SecurityId,
    ) -> Result<(), LedgerError> {
        self.boundary.with_book(market_id, |book| {
            if book.market.ever_opened() {
                return Err(MarketError::NotDraft {
                    market_id: market_id.to_string(),
                }
                .into());
            }
            book.remove_security(security_id)?;
            book.rebalance(&self.pricing);
            self.securities.remove(security_id);
            tracing::info!(%market_id, %security_id, "security removed");
            Ok(())
        })
    }

    // ── Accounts ────────────────────────────────────────────────────────

    /// Open an account holding the given initial token allocation
    pub fn open_account(&self, initial_tokens: f64) -> Result<AccountId, LedgerError> {
        if !initial_tokens.is_finite() || initial_tokens < 0.0 {
            return Err(AccountError::InvalidAllocation {
                tokens: initial_tokens,
            }
            .into());
        }
        let account = Account::new(initial_tokens, now_nanos());
        let account_id = account.account_id;
        self.accounts
            .insert(account_id, Arc::new(Mutex::new(account)));
        tracing::info!(%account_id, initial_tokens, "account opened");
        Ok(account_id)
    }

    /// Clone the account's current state (portfolio + positions)
    pub fn get_account(&self, account_id: &AccountId) -> Result<Account, LedgerError> {
        let slot = self
            .accounts
            .get(account_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AccountError::NotFound {
                account_id: account_id.to_string(),
            })?;
        let account = slot
            .lock()
            .map_err(|_| SettlementError::ConcurrencyAborted)?;
        Ok(account.clone())
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// Market detail
    pub fn get_market(&self, market_id: &MarketId) -> Result<Market, LedgerError> {
        self.boundary
            .with_book(market_id, |book| Ok(book.market.clone()))
    }

    /// All markets currently open for trading, in creation order
    pub fn list_open_markets(&self) -> Vec<Market> {
        let mut markets: Vec<Market> = self
            .boundary
            .market_ids()
            .into_iter()
            .filter_map(|id| {
                self.boundary
                    .with_book(&id, |book| Ok(book.market.clone()))
                    .ok()
            })
            .filter(|m| m.is_open())
            .collect();
        markets.sort_by_key(|m| m.created_at);
        markets
    }

    /// Security detail, looked up by id alone
    pub fn get_security(&self, security_id: &SecurityId) -> Result<Security, LedgerError> {
        let market_id = self
            .securities
            .get(security_id)
            .map(|entry| *entry.value())
            .ok_or_else(|| MarketError::SecurityNotFound {
                security_id: security_id.to_string(),
            })?;
        self.boundary.with_book(&market_id, |book| {
            book.get_security(security_id)
                .cloned()
                .ok_or_else(|| {
                    MarketError::SecurityNotFound {
                        security_id: security_id.to_string(),
                    }
                    .into()
                })
        })
    }

    /// All securities of a market with their live prices, in vector order
    pub fn list_securities(&self, market_id: &MarketId) -> Result<Vec<Security>, LedgerError> {
        self.boundary
            .with_book(market_id, |book| Ok(book.securities().to_vec()))
    }

    /// The market's current price board, in security order
    ///
    /// Derived from the cached `last_price` values; pure readers tolerate a
    /// board that is one commit stale.
    pub fn current_prices(
        &self,
        market_id: &MarketId,
    ) -> Result<Vec<(SecurityId, f64)>, LedgerError> {
        self.boundary.with_book(market_id, |book| {
            Ok(book
                .securities()
                .iter()
                .map(|s| (s.security_id, s.last_price))
                .collect())
        })
    }

    /// Filtered view of the append-only order ledger, oldest first
    pub fn order_book(&self, filter: &OrderFilter) -> Vec<Order> {
        let orders = match self.orders.lock() {
            Ok(orders) => orders,
            Err(_) => return Vec::new(),
        };
        let matches = |order: &Order| {
            filter.account_id.map_or(true, |id| order.account_id == id)
                && filter.market_id.map_or(true, |id| order.market_id == id)
                && filter.security_id.map_or(true, |id| order.security_id == id)
                && filter.since.map_or(true, |ts| order.created_at >= ts)
        };
        let iter = orders.iter().filter(|&o| matches(o)).cloned();
        match filter.limit {
            Some(limit) => iter.take(limit).collect(),
            None => iter.collect(),
        }
    }

    /// Price history of one security, oldest first
    pub fn price_history(&self, security_id: &SecurityId) -> Vec<PriceTick> {
        match self.ticks.lock() {
            Ok(ticks) => ticks
                .iter()
                .filter(|t| t.security_id == *security_id)
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
