//! Consistency boundary — per-market mutual exclusion
//!
//! A settlement must read a market's share vector and later write back the
//! updated vector, balances, and prices as one unit; interleaving two such
//! read-validate-write sequences loses updates. The boundary therefore
//! serializes access per market: each market's book sits behind its own
//! lock, keyed by `MarketId`, and a caller enters the boundary by running a
//! closure against the locked book.
//!
//! Entry blocks until the previous holder reaches a terminal state; release
//! is unconditional (the guard drops on success, error, and panic alike), so
//! a holder can never leak the boundary. A previous holder that panicked
//! mid-flight leaves the lock poisoned; later entries surface that as
//! `ConcurrencyAborted` rather than serving a possibly half-written book.
//!
//! Markets never share a lock, so settlements against different markets
//! proceed fully in parallel.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use types::errors::{LedgerError, MarketError, SettlementError};
use types::ids::MarketId;

use crate::book::MarketBook;

/// Keyed per-market locks over the market books
#[derive(Debug, Default)]
pub struct MarketBoundary {
    books: DashMap<MarketId, Arc<Mutex<MarketBook>>>,
}

impl MarketBoundary {
    pub fn new() -> Self {
        Self {
            books: DashMap::new(),
        }
    }

    /// Register a new market book under its market's key
    pub fn register(&self, book: MarketBook) {
        self.books
            .insert(book.market.market_id, Arc::new(Mutex::new(book)));
    }

    /// Ids of all registered markets
    pub fn market_ids(&self) -> Vec<MarketId> {
        self.books.iter().map(|entry| *entry.key()).collect()
    }

    /// Enter the market's boundary and run `f` against its book
    ///
    /// Blocks until any in-flight holder for the same market has committed
    /// or rolled back. The shard reference into the key map is dropped
    /// before the book lock is taken, so a holder never blocks access to
    /// unrelated markets.
    pub fn with_book<T>(
        &self,
        market_id: &MarketId,
        f: impl FnOnce(&mut MarketBook) -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let slot = match self.books.get(market_id) {
            Some(entry) => entry.value().clone(),
            None => {
                return Err(MarketError::NotFound {
                    market_id: market_id.to_string(),
                }
                .into())
            }
        };
        let mut book = slot
            .lock()
            .map_err(|_| SettlementError::ConcurrencyAborted)?;
        f(&mut book)
    }

    /// Remove a market that never left DRAFT, returning its final book
    ///
    /// The draft check happens under the market's own lock so a concurrent
    /// open cannot slip between check and removal.
    pub fn remove_draft(&self, market_id: &MarketId) -> Result<MarketBook, LedgerError> {
        let slot = match self.books.get(market_id) {
            Some(entry) => entry.value().clone(),
            None => {
                return Err(MarketError::NotFound {
                    market_id: market_id.to_string(),
                }
                .into())
            }
        };
        let book = slot
            .lock()
            .map_err(|_| SettlementError::ConcurrencyAborted)?;
        if book.market.ever_opened() {
            return Err(MarketError::OnceOpened {
                market_id: market_id.to_string(),
            }
            .into());
        }
        let removed = book.clone();
        self.books.remove(market_id);
        Ok(removed)
    }
}
