use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use types::errors::{AccountError, LedgerError, MarketError, SettlementError};

/// Central error type for the gateway application
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Map ledger failures onto HTTP semantics: caller mistakes become 4xx,
/// concurrency/system conditions become 5xx.
impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match &err {
            LedgerError::Settlement(settlement) => match settlement {
                SettlementError::InvalidAmount { .. }
                | SettlementError::InsufficientFunds { .. }
                | SettlementError::InsufficientHoldings { .. } => AppError::BadRequest(message),
                SettlementError::MarketClosed { .. } => AppError::Conflict(message),
                SettlementError::SecurityNotFound { .. } => AppError::NotFound(message),
                SettlementError::ConcurrencyAborted => AppError::ServiceUnavailable(message),
            },
            LedgerError::Market(market) => match market {
                MarketError::NotFound { .. } | MarketError::SecurityNotFound { .. } => {
                    AppError::NotFound(message)
                }
                MarketError::AlreadyOpen { .. }
                | MarketError::NotOpen { .. }
                | MarketError::NotDraft { .. }
                | MarketError::OnceOpened { .. } => AppError::Conflict(message),
            },
            LedgerError::Account(account) => match account {
                AccountError::NotFound { .. } => AppError::NotFound(message),
                AccountError::InvalidAllocation { .. } => AppError::BadRequest(message),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, "BAD_REQUEST"),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, "NOT_FOUND"),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, "CONFLICT"),
            AppError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                msg,
                "SERVICE_UNAVAILABLE",
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "INTERNAL_ERROR",
            ),
        };

        let body = Json(json!({
            "error": code,
            "message": error_message
        }));

        (status, body).into_response()
    }
}
