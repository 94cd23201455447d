use axum::{Json, extract::State};
use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
    pub database: String,
    pub timezone: String,
    /// Wall-clock time the shop is operating on.
    #[schema(value_type = String)]
    pub business_time: NaiveDateTime,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "OK", body = ApiResponse<HealthData>),
    ),
        tag = "Health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthData>> {
    let database = match state.orm.ping().await {
        Ok(()) => "ok",
        Err(err) => {
            tracing::warn!(error = %err, "database ping failed");
            "unavailable"
        }
    };
    let data = HealthData {
        status: "ok".to_string(),
        database: database.to_string(),
        timezone: state.timezone.name().to_string(),
        business_time: state.business_now(),
    };

    Json(ApiResponse::success(
        "Health check",
        data,
        Some(Meta::empty()),
    ))
}
