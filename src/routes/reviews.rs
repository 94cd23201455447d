use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::reviews::{CreateReviewRequest, ReviewList},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Review,
    response::ApiResponse,
    services::review_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_reviews).post(create_review))
}

#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 200, description = "Review created", body = ApiResponse<Review>),
        (status = 400, description = "Invalid rating or content"),
        (status = 404, description = "No order for that delivery slot"),
        (status = 409, description = "Already reviewed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::create_review(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/reviews",
    responses(
        (status = 200, description = "Reviews, newest first", body = ApiResponse<ReviewList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    let resp = review_service::list_reviews(&state, &user).await?;
    Ok(Json(resp))
}
