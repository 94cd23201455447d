use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod containers;
pub mod doc;
pub mod health;
pub mod membership;
pub mod open_hours;
pub mod orders;
pub mod params;
pub mod products;
pub mod reviews;
pub mod staff;
pub mod stock_requests;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/open-hours", open_hours::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/containers", containers::router())
        .nest("/membership", membership::router())
        .nest("/reviews", reviews::router())
        .nest("/stock-requests", stock_requests::router())
        .nest("/staff", staff::router())
}
