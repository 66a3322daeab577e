//! Settlement Service
//!
//! The order-fulfillment transaction engine for the prediction market. Owns
//! all mutable state (markets with their share vectors, accounts, the
//! append-only order ledger and price history) and the state-transition
//! routine that validates, applies, and commits a single buy/sell order
//! against a market's shared share vector under concurrent access.
//!
//! **Key Invariants:**
//! - At most one settlement mid-flight per market (strict serializability
//!   per market; unrelated markets never contend)
//! - Every committed settlement recomputes the price of *every* security in
//!   the market (LMSR prices are joint)
//! - No token balance or share position ever goes negative
//! - Failures roll back completely; there are no partial writes

pub mod book;
pub mod boundary;
pub mod ledger;
mod settle;

pub use book::MarketBook;
pub use boundary::MarketBoundary;
pub use ledger::{Ledger, OrderFilter, SecuritySpec};
