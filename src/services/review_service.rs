use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::orders::parse_delivery_slot_key,
    dto::reviews::{CreateReviewRequest, ReviewList},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        reviews::{ActiveModel as ReviewActive, Column as ReviewCol, Entity as Reviews, Model as ReviewModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer},
    models::Review,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    payload: CreateReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    ensure_customer(user)?;
    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest("rating must be between 1 and 5".into()));
    }
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("content is required".into()));
    }
    if parse_delivery_slot_key(&payload.delivery_slot_key).is_none() {
        return Err(AppError::BadRequest("Malformed delivery slot key".into()));
    }

    let order_row = OrderItems::find()
        .filter(
            Condition::all()
                .add(OrderItemCol::DeliverySlotKey.eq(payload.delivery_slot_key.as_str()))
                .add(OrderItemCol::OrdererCode.eq(user.orderer_code.as_str())),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let existing = Reviews::find()
        .filter(
            Condition::all()
                .add(ReviewCol::DeliverySlotKey.eq(payload.delivery_slot_key.as_str()))
                .add(ReviewCol::OrdererCode.eq(user.orderer_code.as_str())),
        )
        .count(&state.orm)
        .await?;
    if existing > 0 {
        return Err(AppError::Conflict(
            "This delivery has already been reviewed".into(),
        ));
    }

    let review = ReviewActive {
        id: Set(Uuid::new_v4()),
        orderer_code: Set(user.orderer_code.clone()),
        delivery_slot_key: Set(payload.delivery_slot_key.clone()),
        order_date: Set(order_row.order_date),
        delivery_time_slot_label: Set(order_row.delivery_slot_label),
        rating: Set(payload.rating),
        content: Set(content.to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        Some(user),
        "review_create",
        "reviews",
        serde_json::json!({ "review_id": review.id, "delivery_slot_key": review.delivery_slot_key }),
    )
    .await;

    Ok(ApiResponse::success(
        "Review created",
        review_from_entity(review),
        Some(Meta::empty()),
    ))
}

/// Newest first; customers only see their own reviews.
pub async fn list_reviews(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<ReviewList>> {
    let mut finder = Reviews::find();
    if !user.is_staff() {
        finder = finder.filter(ReviewCol::OrdererCode.eq(user.orderer_code.as_str()));
    }
    let items: Vec<Review> = finder
        .order_by_desc(ReviewCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(review_from_entity)
        .collect();
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}

fn review_from_entity(model: ReviewModel) -> Review {
    Review {
        id: model.id,
        orderer_code: model.orderer_code,
        delivery_slot_key: model.delivery_slot_key,
        order_date: model.order_date,
        delivery_time_slot_label: model.delivery_time_slot_label,
        rating: model.rating,
        content: model.content,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
