use crate::handlers::{account, market, order};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/orders", post(order::create_order).get(order::list_orders))
        .route(
            "/markets",
            post(market::create_market).get(market::list_markets),
        )
        .route(
            "/markets/:id",
            get(market::get_market).delete(market::delete_market),
        )
        .route("/markets/:id/open", post(market::open_market))
        .route("/markets/:id/close", post(market::close_market))
        .route(
            "/markets/:id/securities",
            post(market::add_securities).get(market::list_securities),
        )
        .route(
            "/markets/:id/securities/:security_id",
            delete(market::remove_security),
        )
        .route("/markets/:id/prices", get(market::current_prices))
        .route("/securities/:id", get(market::get_security))
        .route("/securities/:id/history", get(market::price_history))
        .route("/accounts", post(account::open_account))
        .route("/accounts/:id", get(account::get_account));

    Router::new()
        .nest("/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
