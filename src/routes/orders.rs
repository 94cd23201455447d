use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get},
};

use crate::{
    dto::orders::{
        CancelOrderResponse, CreateOrderRequest, CreateOrderResponse, OrderGroupList, OrderList,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::OrderListQuery,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/groups", get(list_order_groups))
        .route("/groups/{delivery_slot_key}", delete(cancel_order))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created", body = ApiResponse<CreateOrderResponse>),
        (status = 400, description = "Invalid items, date or slot"),
        (status = 409, description = "Slot unavailable or order already placed for that date"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<ApiResponse<CreateOrderResponse>>> {
    let resp = order_service::create_order(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("order_date" = Option<String>, Query, description = "Delivery date, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Order rows visible to the caller", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/groups",
    params(
        ("order_date" = Option<String>, Query, description = "Delivery date, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Orders grouped per delivery slot, newest first", body = ApiResponse<OrderGroupList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_order_groups(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderGroupList>>> {
    let resp = order_service::list_order_groups(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/orders/groups/{delivery_slot_key}",
    params(
        ("delivery_slot_key" = String, Path, description = "e.g. 2024-06-10_slot-16")
    ),
    responses(
        (status = 200, description = "All rows of the checkout deleted", body = ApiResponse<CancelOrderResponse>),
        (status = 403, description = "Only customers can cancel"),
        (status = 404, description = "No such order"),
        (status = 409, description = "Delivery window already started"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(delivery_slot_key): Path<String>,
) -> AppResult<Json<ApiResponse<CancelOrderResponse>>> {
    let resp = order_service::cancel_order(&state, &user, &delivery_slot_key).await?;
    Ok(Json(resp))
}
