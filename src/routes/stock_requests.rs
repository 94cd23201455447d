use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::stock_requests::CreateStockRequest, error::AppResult, middleware::auth::AuthUser,
    models::StockRequest, response::ApiResponse, services::stock_request_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create_stock_request))
}

#[utoipa::path(
    post,
    path = "/api/stock-requests",
    request_body = CreateStockRequest,
    responses(
        (status = 200, description = "Ask the shop to stock a product", body = ApiResponse<StockRequest>),
        (status = 400, description = "Empty or too long"),
    ),
    security(("bearer_auth" = [])),
    tag = "Stock Requests"
)]
pub async fn create_stock_request(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateStockRequest>,
) -> AppResult<Json<ApiResponse<StockRequest>>> {
    let resp = stock_request_service::create_stock_request(&state, &user, payload).await?;
    Ok(Json(resp))
}
