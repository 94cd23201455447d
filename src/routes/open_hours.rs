use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::open_hours::{OpenHoursQuery, TimeSlotCatalog},
    error::AppResult,
    middleware::auth::AuthUser,
    models::DateType,
    response::ApiResponse,
    services::open_hours_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_open_hours))
}

#[utoipa::path(
    get,
    path = "/api/open-hours",
    params(
        ("date_type" = Option<String>, Query, description = "today (default) or tomorrow")
    ),
    responses(
        (status = 200, description = "Time slot catalog for the day", body = ApiResponse<TimeSlotCatalog>)
    ),
    security(("bearer_auth" = [])),
    tag = "Open Hours"
)]
pub async fn get_open_hours(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<OpenHoursQuery>,
) -> AppResult<Json<ApiResponse<TimeSlotCatalog>>> {
    let date_type = query.date_type.unwrap_or(DateType::Today);
    let resp = open_hours_service::get_open_hours(&state, date_type).await?;
    Ok(Json(resp))
}
