//! The order settlement transaction
//!
//! One call = one atomic state transition: validate the requested trade
//! against the market's live share vector and the account's balances, then
//! either apply every write (tokens, position, order record, every
//! security's shares and price, price-history ticks) or none of them.
//!
//! Lock order is fixed: market boundary → account → order ledger → price
//! history. All fallible steps complete before the first write, so a
//! failure can simply return — rollback is structural, not compensating.

use types::errors::{AccountError, LedgerError, SettlementError};
use types::ids::{AccountId, MarketId, SecurityId};
use types::order::{Order, Side};

use crate::ledger::{now_nanos, Ledger};

impl Ledger {
    /// Settle one buy/sell order against a market
    ///
    /// `amount` is the unsigned share count; `side` carries the direction.
    /// Returns the created order record with its realized signed cost. On
    /// any error, state is exactly as before the call.
    ///
    /// Settlements against the same market serialize: the N-th committed
    /// settlement prices against exactly the first N−1 commits. Settlements
    /// against different markets proceed in parallel.
    pub fn settle(
        &self,
        account_id: &AccountId,
        market_id: &MarketId,
        security_id: &SecurityId,
        amount: f64,
        side: Side,
    ) -> Result<Order, LedgerError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(SettlementError::InvalidAmount { amount }.into());
        }
        let timestamp = now_nanos();

        self.boundary.with_book(market_id, |book| {
            if !book.market.is_open() {
                return Err(SettlementError::MarketClosed {
                    market_id: market_id.to_string(),
                }
                .into());
            }

            // snapshot and price under the boundary: the vector read here is
            // exactly the vector the commit below writes against
            let (shares, idx) = book.snapshot(security_id)?;
            let delta = side.signed(amount);
            let cost = self.pricing.trade_cost(&shares, idx, delta);

            // account lock nests inside the market boundary, so the balance
            // check and the debit are one unit even across markets
            let slot = self
                .accounts
                .get(account_id)
                .map(|entry| entry.value().clone())
                .ok_or_else(|| AccountError::NotFound {
                    account_id: account_id.to_string(),
                })?;
            let mut account = slot
                .lock()
                .map_err(|_| SettlementError::ConcurrencyAborted)?;

            let held = account.held(security_id);
            if cost > 0.0 && (delta < 0.0 || account.tokens() < cost) {
                return Err(SettlementError::InsufficientFunds {
                    required: cost,
                    available: account.tokens(),
                }
                .into());
            }
            // every sale must be covered by current holdings, even when the
            // computed cost underflows to zero for a far out-of-the-money
            // security; a zero-cost trade carries no funds constraint
            if delta < 0.0 && held < -delta {
                return Err(SettlementError::InsufficientHoldings {
                    required: -delta,
                    held,
                }
                .into());
            }

            let mut orders = self
                .orders
                .lock()
                .map_err(|_| SettlementError::ConcurrencyAborted)?;
            let mut ticks = self
                .ticks
                .lock()
                .map_err(|_| SettlementError::ConcurrencyAborted)?;

            // commit point: nothing below can fail
            account.apply_settlement(*security_id, delta, cost, timestamp);
            book.apply_trade(idx, delta);
            book.rebalance(&self.pricing);

            let order = Order::new(*account_id, *market_id, *security_id, delta, cost, timestamp);
            orders.push(order.clone());
            ticks.extend(book.price_ticks(timestamp));

            tracing::debug!(
                %market_id,
                %security_id,
                %account_id,
                delta,
                cost,
                "settlement committed"
            );
            Ok(order)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{OrderFilter, SecuritySpec};
    use types::errors::MarketError;

    const EPSILON: f64 = 1e-9;

    /// Open market with four zero-share securities, one funded account
    fn setup(tokens: f64) -> (Ledger, MarketId, Vec<SecurityId>, AccountId) {
        let ledger = Ledger::new();
        let market_id = ledger.create_market("nationals 2026");
        let specs = ["S1", "S2", "S3", "S4"]
            .iter()
            .map(|s| SecuritySpec {
                shortname: s.to_string(),
                description: format!("{} wins nationals", s),
            })
            .collect();
        let security_ids = ledger.add_securities(&market_id, specs).unwrap();
        ledger.open_market(&market_id).unwrap();
        let account_id = ledger.open_account(tokens).unwrap();
        (ledger, market_id, security_ids, account_id)
    }

    #[test]
    fn test_settle_buy_updates_everything() {
        let (ledger, market_id, securities, account_id) = setup(10_000.0);
        let target = securities[2];

        let order = ledger
            .settle(&account_id, &market_id, &target, 50.0, Side::BUY)
            .unwrap();
        assert_eq!(order.amount, 50.0);
        assert!(order.cost > 0.0);

        // account debited by the realized cost
        let account = ledger.get_account(&account_id).unwrap();
        assert!((account.tokens() - (10_000.0 - order.cost)).abs() < EPSILON);
        assert_eq!(account.held(&target), 50.0);

        // traded security's shares moved, every price refreshed
        let secs = ledger.list_securities(&market_id).unwrap();
        assert_eq!(secs[2].shares_outstanding, 50.0);
        assert!(secs[2].last_price > 25.0);
        for other in [0, 1, 3] {
            assert_eq!(secs[other].shares_outstanding, 0.0);
            assert!(secs[other].last_price < 25.0);
        }
        let board: f64 = secs.iter().map(|s| s.last_price).sum();
        assert!((board - 100.0).abs() < 1e-6);

        // one price tick per security in the market
        for sec in &secs {
            let history = ledger.price_history(&sec.security_id);
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].price, sec.last_price);
            assert_eq!(history[0].timestamp, order.created_at);
        }
    }

    #[test]
    fn test_settle_sell_back_restores_balance() {
        let (ledger, market_id, securities, account_id) = setup(10_000.0);
        let target = securities[0];

        let buy = ledger
            .settle(&account_id, &market_id, &target, 30.0, Side::BUY)
            .unwrap();
        let sell = ledger
            .settle(&account_id, &market_id, &target, 30.0, Side::SELL)
            .unwrap();

        assert_eq!(sell.amount, -30.0);
        assert!((buy.cost + sell.cost).abs() < 1e-6);

        let account = ledger.get_account(&account_id).unwrap();
        assert!((account.tokens() - 10_000.0).abs() < 1e-6);
        assert_eq!(account.held(&target), 0.0);
    }

    #[test]
    fn test_settle_rejects_non_positive_amount() {
        let (ledger, market_id, securities, account_id) = setup(10_000.0);
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = ledger
                .settle(&account_id, &market_id, &securities[0], bad, Side::BUY)
                .unwrap_err();
            assert!(matches!(
                err,
                LedgerError::Settlement(SettlementError::InvalidAmount { .. })
            ));
        }
    }

    #[test]
    fn test_settle_closed_market() {
        let (ledger, market_id, securities, account_id) = setup(10_000.0);
        ledger.close_market(&market_id).unwrap();
        let err = ledger
            .settle(&account_id, &market_id, &securities[0], 1.0, Side::BUY)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Settlement(SettlementError::MarketClosed { .. })
        ));
    }

    #[test]
    fn test_settle_unknown_market() {
        let (ledger, _, securities, account_id) = setup(10_000.0);
        let err = ledger
            .settle(
                &account_id,
                &MarketId::new(),
                &securities[0],
                1.0,
                Side::BUY,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Market(MarketError::NotFound { .. })
        ));
    }

    #[test]
    fn test_settle_security_from_other_market() {
        let (ledger, market_id, _, account_id) = setup(10_000.0);
        let other_market = ledger.create_market("other");
        let other_ids = ledger
            .add_securities(
                &other_market,
                vec![SecuritySpec {
                    shortname: "OTHER".to_string(),
                    description: "other".to_string(),
                }],
            )
            .unwrap();

        let err = ledger
            .settle(&account_id, &market_id, &other_ids[0], 1.0, Side::BUY)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Settlement(SettlementError::SecurityNotFound { .. })
        ));
    }

    #[test]
    fn test_settle_unknown_account() {
        let (ledger, market_id, securities, _) = setup(10_000.0);
        let err = ledger
            .settle(
                &AccountId::new(),
                &market_id,
                &securities[0],
                1.0,
                Side::BUY,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Account(AccountError::NotFound { .. })
        ));
    }

    #[test]
    fn test_settle_insufficient_funds() {
        // buying 100 shares of one of four securities costs ~8614 tokens at
        // b=10/K=100; 50 tokens cannot cover it
        let (ledger, market_id, securities, account_id) = setup(50.0);
        let err = ledger
            .settle(&account_id, &market_id, &securities[0], 100.0, Side::BUY)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Settlement(SettlementError::InsufficientFunds { .. })
        ));

        // nothing was written
        let account = ledger.get_account(&account_id).unwrap();
        assert_eq!(account.tokens(), 50.0);
        assert!(account.positions.is_empty());
        let secs = ledger.list_securities(&market_id).unwrap();
        assert!(secs.iter().all(|s| s.shares_outstanding == 0.0));
        assert!(ledger.order_book(&Default::default()).is_empty());
        assert!(ledger.price_history(&securities[0]).is_empty());
    }

    #[test]
    fn test_settle_insufficient_holdings() {
        let (ledger, market_id, securities, account_id) = setup(10_000.0);
        ledger
            .settle(&account_id, &market_id, &securities[2], 50.0, Side::BUY)
            .unwrap();

        // holding 50, selling 60
        let err = ledger
            .settle(&account_id, &market_id, &securities[2], 60.0, Side::SELL)
            .unwrap_err();
        match err {
            LedgerError::Settlement(SettlementError::InsufficientHoldings { required, held }) => {
                assert_eq!(required, 60.0);
                assert_eq!(held, 50.0);
            }
            other => panic!("expected InsufficientHoldings, got {other:?}"),
        }
    }

    #[test]
    fn test_settle_sell_without_position() {
        let (ledger, market_id, securities, account_id) = setup(10_000.0);
        // absent position reads as zero holding, not as an error
        let err = ledger
            .settle(&account_id, &market_id, &securities[1], 5.0, Side::SELL)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Settlement(SettlementError::InsufficientHoldings { .. })
        ));
    }

    #[test]
    fn test_zero_cost_sell_still_requires_holdings() {
        // push one security so far into the money that the other side's
        // potential shift underflows to a cost of exactly zero
        let (ledger, market_id, securities, account_id) = setup(3_000_000.0);
        ledger
            .settle(&account_id, &market_id, &securities[1], 20_000.0, Side::BUY)
            .unwrap();

        let err = ledger
            .settle(&account_id, &market_id, &securities[0], 1.0, Side::SELL)
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Settlement(SettlementError::InsufficientHoldings { .. })
        ));
    }

    #[test]
    fn test_order_ledger_is_append_only_audit_trail() {
        let (ledger, market_id, securities, account_id) = setup(10_000.0);
        ledger
            .settle(&account_id, &market_id, &securities[0], 10.0, Side::BUY)
            .unwrap();
        ledger
            .settle(&account_id, &market_id, &securities[1], 4.0, Side::BUY)
            .unwrap();
        ledger
            .settle(&account_id, &market_id, &securities[0], 3.0, Side::SELL)
            .unwrap();

        let all = ledger.order_book(&Default::default());
        assert_eq!(all.len(), 3);

        // share counts re-derive from the signed amounts
        let net: f64 = all
            .iter()
            .filter(|o| o.security_id == securities[0])
            .map(|o| o.amount)
            .sum();
        let secs = ledger.list_securities(&market_id).unwrap();
        assert_eq!(secs[0].shares_outstanding, net);

        // token balance re-derives from the signed costs
        let spent: f64 = all.iter().map(|o| o.cost).sum();
        let account = ledger.get_account(&account_id).unwrap();
        assert!((account.tokens() - (10_000.0 - spent)).abs() < EPSILON);

        // filters
        let filtered = ledger.order_book(&OrderFilter {
            security_id: Some(securities[0]),
            ..Default::default()
        });
        assert_eq!(filtered.len(), 2);
        let limited = ledger.order_book(&OrderFilter {
            limit: Some(1),
            ..Default::default()
        });
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_settlements_in_closed_market_leave_history_intact() {
        let (ledger, market_id, securities, account_id) = setup(10_000.0);
        ledger
            .settle(&account_id, &market_id, &securities[0], 10.0, Side::BUY)
            .unwrap();
        ledger.close_market(&market_id).unwrap();

        assert!(ledger
            .settle(&account_id, &market_id, &securities[0], 1.0, Side::BUY)
            .is_err());
        assert_eq!(ledger.order_book(&Default::default()).len(), 1);
        assert_eq!(ledger.price_history(&securities[0]).len(), 1);
    }
}
