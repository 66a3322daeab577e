//! Request and response DTOs for the gateway API

use serde::{Deserialize, Serialize};
use settlement::SecuritySpec;
use types::account::Account;
use types::ids::{AccountId, MarketId, SecurityId};
use types::order::{Order, Side};

#[derive(Debug, Deserialize)]
pub struct CreateMarketRequest {
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct MarketCreatedResponse {
    pub market_id: MarketId,
}

#[derive(Debug, Deserialize)]
pub struct AddSecuritiesRequest {
    pub securities: Vec<SecuritySpec>,
}

#[derive(Debug, Serialize)]
pub struct SecuritiesAddedResponse {
    pub security_ids: Vec<SecurityId>,
}

#[derive(Debug, Deserialize)]
pub struct OpenAccountRequest {
    pub initial_tokens: f64,
}

#[derive(Debug, Serialize)]
pub struct AccountCreatedResponse {
    pub account_id: AccountId,
}

/// Portfolio plus positions, flattened for the wire
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub account_id: AccountId,
    pub tokens: f64,
    pub positions: Vec<PositionEntry>,
}

#[derive(Debug, Serialize)]
pub struct PositionEntry {
    pub security_id: SecurityId,
    pub amount: f64,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        let mut positions: Vec<PositionEntry> = account
            .positions
            .values()
            .map(|p| PositionEntry {
                security_id: p.security_id,
                amount: p.amount,
            })
            .collect();
        positions.sort_by_key(|p| *p.security_id.as_uuid());
        Self {
            account_id: account.account_id,
            tokens: account.portfolio.tokens,
            positions,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub account_id: AccountId,
    pub market_id: MarketId,
    pub security_id: SecurityId,
    pub amount: f64,
    pub side: Side,
}

/// The settled order plus the market's refreshed price board
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order: Order,
    pub prices: Vec<PriceEntry>,
}

#[derive(Debug, Serialize)]
pub struct PriceEntry {
    pub security_id: SecurityId,
    pub price: f64,
}
