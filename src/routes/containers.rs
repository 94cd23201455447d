use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::containers::{ContainerBalance, ContainerRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::ContainerStorageItem,
    response::ApiResponse,
    services::container_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/balance", get(get_balance))
        .route("/new-customer-call", post(request_new_customer_call))
}

#[utoipa::path(
    get,
    path = "/api/containers/balance",
    responses(
        (status = 200, description = "Containers currently held by the shop for the caller", body = ApiResponse<ContainerBalance>)
    ),
    security(("bearer_auth" = [])),
    tag = "Containers"
)]
pub async fn get_balance(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ContainerBalance>>> {
    let resp = container_service::get_balance(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/containers/new-customer-call",
    request_body = ContainerRequest,
    responses(
        (status = 200, description = "Initial container pickup filed", body = ApiResponse<ContainerStorageItem>),
        (status = 400, description = "Invalid count or date"),
        (status = 409, description = "Already filed, or the slot is unavailable"),
    ),
    security(("bearer_auth" = [])),
    tag = "Containers"
)]
pub async fn request_new_customer_call(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ContainerRequest>,
) -> AppResult<Json<ApiResponse<ContainerStorageItem>>> {
    let resp = container_service::request_new_customer_call(&state, &user, payload).await?;
    Ok(Json(resp))
}
