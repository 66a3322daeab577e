use crate::error::AppError;
use crate::models::{AccountCreatedResponse, AccountResponse, OpenAccountRequest};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use types::ids::AccountId;
use uuid::Uuid;

pub async fn open_account(
    State(state): State<AppState>,
    Json(payload): Json<OpenAccountRequest>,
) -> Result<Json<AccountCreatedResponse>, AppError> {
    let account_id = state.ledger.open_account(payload.initial_tokens)?;
    Ok(Json(AccountCreatedResponse { account_id }))
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountResponse>, AppError> {
    let account = state.ledger.get_account(&AccountId::from_uuid(id))?;
    Ok(Json(account.into()))
}
