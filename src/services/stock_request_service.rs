use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::stock_requests::{CreateStockRequest, StockRequestList},
    entity::stock_requests::{
        ActiveModel as StockRequestActive, Column as StockRequestCol, Entity as StockRequests,
        Model as StockRequestModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer, ensure_staff},
    models::StockRequest,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const MAX_STOCK_REQUEST_CHARS: usize = 500;

pub async fn create_stock_request(
    state: &AppState,
    user: &AuthUser,
    payload: CreateStockRequest,
) -> AppResult<ApiResponse<StockRequest>> {
    ensure_customer(user)?;
    let content = payload.content.trim();
    if content.is_empty() {
        return Err(AppError::BadRequest("content is required".into()));
    }
    if content.chars().count() > MAX_STOCK_REQUEST_CHARS {
        return Err(AppError::BadRequest(format!(
            "content must be at most {MAX_STOCK_REQUEST_CHARS} characters"
        )));
    }

    let request = StockRequestActive {
        id: Set(Uuid::new_v4()),
        orderer_code: Set(user.orderer_code.clone()),
        content: Set(content.to_string()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        state,
        Some(user),
        "stock_request_create",
        "stock_requests",
        serde_json::json!({ "stock_request_id": request.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Request submitted",
        stock_request_from_entity(request),
        Some(Meta::empty()),
    ))
}

pub async fn list_stock_requests(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<StockRequestList>> {
    ensure_staff(user)?;
    let items: Vec<StockRequest> = StockRequests::find()
        .order_by_desc(StockRequestCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(stock_request_from_entity)
        .collect();
    let meta = Meta::total(items.len());
    Ok(ApiResponse::success("Stock requests", StockRequestList { items }, Some(meta)))
}

fn stock_request_from_entity(model: StockRequestModel) -> StockRequest {
    StockRequest {
        id: model.id,
        orderer_code: model.orderer_code,
        content: model.content,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
