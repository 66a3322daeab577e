use crate::error::AppError;
use crate::models::{CreateOrderRequest, OrderResponse, PriceEntry};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use settlement::OrderFilter;
use types::order::Order;

/// Place one buy/sell order; the settlement engine is the sole counterparty
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.ledger.settle(
        &payload.account_id,
        &payload.market_id,
        &payload.security_id,
        payload.amount,
        payload.side,
    )?;

    // every settlement moves the whole board, so hand it back with the fill
    let prices = state
        .ledger
        .current_prices(&payload.market_id)?
        .into_iter()
        .map(|(security_id, price)| PriceEntry { security_id, price })
        .collect();

    Ok(Json(OrderResponse { order, prices }))
}

/// Order-book listing with optional account/market/security/since filters
pub async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Json<Vec<Order>> {
    Json(state.ledger.order_book(&filter))
}
