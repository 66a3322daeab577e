use crate::error::AppError;
use crate::models::{
    AddSecuritiesRequest, CreateMarketRequest, MarketCreatedResponse, PriceEntry,
    SecuritiesAddedResponse,
};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use types::ids::{MarketId, SecurityId};
use types::market::{Market, PriceTick, Security};
use uuid::Uuid;

pub async fn create_market(
    State(state): State<AppState>,
    Json(payload): Json<CreateMarketRequest>,
) -> Result<Json<MarketCreatedResponse>, AppError> {
    let market_id = state.ledger.create_market(payload.description);
    Ok(Json(MarketCreatedResponse { market_id }))
}

pub async fn list_markets(State(state): State<AppState>) -> Json<Vec<Market>> {
    Json(state.ledger.list_open_markets())
}

pub async fn get_market(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Market>, AppError> {
    let market = state.ledger.get_market(&MarketId::from_uuid(id))?;
    Ok(Json(market))
}

pub async fn open_market(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.ledger.open_market(&MarketId::from_uuid(id))?;
    Ok(StatusCode::OK)
}

pub async fn close_market(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.ledger.close_market(&MarketId::from_uuid(id))?;
    Ok(StatusCode::OK)
}

pub async fn delete_market(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.ledger.delete_market(&MarketId::from_uuid(id))?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_securities(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddSecuritiesRequest>,
) -> Result<Json<SecuritiesAddedResponse>, AppError> {
    let security_ids = state
        .ledger
        .add_securities(&MarketId::from_uuid(id), payload.securities)?;
    Ok(Json(SecuritiesAddedResponse { security_ids }))
}

pub async fn remove_security(
    State(state): State<AppState>,
    Path((id, security_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    state.ledger.remove_security(
        &MarketId::from_uuid(id),
        &SecurityId::from_uuid(security_id),
    )?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_securities(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Security>>, AppError> {
    let securities = state.ledger.list_securities(&MarketId::from_uuid(id))?;
    Ok(Json(securities))
}

pub async fn current_prices(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PriceEntry>>, AppError> {
    let prices = state
        .ledger
        .current_prices(&MarketId::from_uuid(id))?
        .into_iter()
        .map(|(security_id, price)| PriceEntry { security_id, price })
        .collect();
    Ok(Json(prices))
}

pub async fn get_security(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Security>, AppError> {
    let security = state.ledger.get_security(&SecurityId::from_uuid(id))?;
    Ok(Json(security))
}

pub async fn price_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Json<Vec<PriceTick>> {
    Json(state.ledger.price_history(&SecurityId::from_uuid(id)))
}
