//! Error taxonomy for the prediction-market exchange
//!
//! Settlement failures are split into caller mistakes (bad amount, not
//! enough tokens or holdings) and system conditions (the consistency
//! boundary could not be entered). All variants are local, synchronous
//! failures; nothing here is retried automatically.

use thiserror::Error;

/// Top-level ledger error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Settlement error: {0}")]
    Settlement(#[from] SettlementError),

    #[error("Market error: {0}")]
    Market(#[from] MarketError),

    #[error("Account error: {0}")]
    Account(#[from] AccountError),
}

/// Failures of the order settlement transaction
///
/// Any of these leaves state exactly as before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettlementError {
    #[error("Invalid amount: {amount} (must be positive)")]
    InvalidAmount { amount: f64 },

    #[error("Market is closed: {market_id}")]
    MarketClosed { market_id: String },

    #[error("Security not found in market: {security_id}")]
    SecurityNotFound { security_id: String },

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("Insufficient holdings: required {required}, held {held}")]
    InsufficientHoldings { required: f64, held: f64 },

    #[error("Settlement aborted by concurrency control")]
    ConcurrencyAborted,
}

/// Market and security lifecycle errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("Market not found: {market_id}")]
    NotFound { market_id: String },

    #[error("Market is already open: {market_id}")]
    AlreadyOpen { market_id: String },

    #[error("Market is not open: {market_id}")]
    NotOpen { market_id: String },

    #[error("Securities of market {market_id} are frozen (market left draft)")]
    NotDraft { market_id: String },

    #[error("Disallowed deletion of market that was once open: {market_id}")]
    OnceOpened { market_id: String },

    #[error("Security not found: {security_id}")]
    SecurityNotFound { security_id: String },
}

/// Account errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccountError {
    #[error("Account not found: {account_id}")]
    NotFound { account_id: String },

    #[error("Invalid initial allocation: {tokens}")]
    InvalidAllocation { tokens: f64 },
}
