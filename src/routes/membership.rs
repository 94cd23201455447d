use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::{containers::ContainerRequest, membership::RefillTicketResult},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Membership,
    response::ApiResponse,
    services::membership_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_membership))
        .route("/refill-ticket", post(use_refill_ticket))
}

#[utoipa::path(
    get,
    path = "/api/membership",
    responses(
        (status = 200, description = "Delivery fee and remaining refill tickets", body = ApiResponse<Membership>)
    ),
    security(("bearer_auth" = [])),
    tag = "Membership"
)]
pub async fn get_membership(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Membership>>> {
    let resp = membership_service::get_membership(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/membership/refill-ticket",
    request_body = ContainerRequest,
    responses(
        (status = 200, description = "Ticket spent on a container pickup", body = ApiResponse<RefillTicketResult>),
        (status = 400, description = "No tickets left or invalid count"),
        (status = 409, description = "Slot unavailable"),
    ),
    security(("bearer_auth" = [])),
    tag = "Membership"
)]
pub async fn use_refill_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ContainerRequest>,
) -> AppResult<Json<ApiResponse<RefillTicketResult>>> {
    let resp = membership_service::use_refill_ticket(&state, &user, payload).await?;
    Ok(Json(resp))
}
