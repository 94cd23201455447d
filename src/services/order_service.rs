use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::orders::{self, OrderLine},
    dto::orders::{
        CancelOrderResponse, ContainerInfo, CreateOrderRequest, CreateOrderResponse,
        OrderGroupList, OrderList, UpdateOrderStatusRequest,
    },
    entity::{
        container_storage::{Column as ContainerCol, Entity as ContainerStorage},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        products::{Column as ProdCol, Entity as Products},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer, ensure_staff},
    models::{DeliverySlot, OrderItem, Product, RequestSource, StaffStatusCheck},
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::{container_service, open_hours_service, product_service::product_from_entity},
    state::AppState,
};

pub const MAX_CONTAINER_COUNT: i32 = 99;

/// Creates one order-item row per line. Prices come from the product table only.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<CreateOrderResponse>> {
    validate_lines(&payload.items)?;
    if let Some(info) = payload.container_info {
        validate_container_info(info)?;
    }

    let now = state.business_now();
    let delivery_date = payload.delivery_date;

    let txn = state.orm.begin().await?;

    let slot =
        open_hours_service::booking_slot(&txn, delivery_date, &payload.delivery_slot_id, now)
            .await?;

    // Concurrent checkouts by the same customer queue here until the first commits.
    lock_customer(&txn, user).await?;
    let existing = OrderItems::find()
        .filter(
            Condition::all()
                .add(OrderItemCol::OrdererCode.eq(user.orderer_code.as_str()))
                .add(OrderItemCol::OrderDate.eq(delivery_date)),
        )
        .count(&txn)
        .await?;
    if existing > 0 {
        tracing::debug!(orderer_code = %user.orderer_code, %delivery_date, "duplicate order for date");
        return Err(AppError::Conflict(format!(
            "An order for {delivery_date} already exists"
        )));
    }

    let product_ids: Vec<String> = payload
        .items
        .iter()
        .map(|line| line.product_id.clone())
        .collect();
    let products: HashMap<String, Product> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(&txn)
        .await?
        .into_iter()
        .map(|model| (model.id.clone(), product_from_entity(model)))
        .collect();

    let mut priced: Vec<(&OrderLine, &Product, i64)> = Vec::with_capacity(payload.items.len());
    for line in &payload.items {
        let product = products
            .get(&line.product_id)
            .filter(|p| p.is_active)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown product {}", line.product_id)))?;
        if !product.in_stock {
            return Err(AppError::BadRequest(format!(
                "Product {} is out of stock",
                product.name
            )));
        }
        priced.push((line, product, product.price_per_min_order * i64::from(line.quantity)));
    }
    let total_price: i64 = priced.iter().map(|(_, _, price)| price).sum();

    let order_id = Uuid::new_v4();
    let delivery_slot = DeliverySlot::from(&slot);
    let slot_key = orders::delivery_slot_key(delivery_date, &slot.id);

    for (line, product, item_price) in &priced {
        let snapshot = serde_json::to_value(product)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_id: Set(product.id.clone()),
            product: Set(snapshot),
            quantity: Set(line.quantity),
            item_price: Set(*item_price),
            total_order_price: Set(total_price),
            orderer_code: Set(user.orderer_code.clone()),
            order_date: Set(delivery_date),
            delivery_slot_id: Set(delivery_slot.id.clone()),
            delivery_slot_label: Set(delivery_slot.label.clone()),
            delivery_start_hour: Set(delivery_slot.start_hour as i32),
            delivery_end_hour: Set(delivery_slot.end_hour as i32),
            delivery_slot_key: Set(slot_key.clone()),
            staff_status_check: Set(StaffStatusCheck::Pending.as_str().to_string()),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    if let Some(info) = payload.container_info.filter(|info| info.container_count > 0) {
        container_service::insert_request(
            &txn,
            &user.orderer_code,
            delivery_date,
            &delivery_slot,
            info,
            RequestSource::Order,
        )
        .await?;
    }

    txn.commit().await?;

    tracing::info!(
        %order_id,
        orderer_code = %user.orderer_code,
        delivery_slot_key = %slot_key,
        total_price,
        "order created"
    );
    audit::record(
        state,
        Some(user),
        "order_create",
        "order_items",
        serde_json::json!({
            "order_id": order_id,
            "delivery_slot_key": slot_key,
            "total_price": total_price,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        CreateOrderResponse {
            order_id,
            delivery_slot_key: slot_key,
            total_price,
        },
        Some(Meta::empty()),
    ))
}

/// Customers get their own rows, staff get every row.
pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let orders = fetch_visible_orders(state, user, &query).await?;
    let meta = Meta::total(orders.len());
    Ok(ApiResponse::success(
        "Ok",
        OrderList {
            orders,
            user_role: user.role,
        },
        Some(meta),
    ))
}

pub async fn list_order_groups(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderGroupList>> {
    let items = fetch_visible_orders(state, user, &query).await?;
    let groups = orders::group_orders(items, user.role, state.business_now());
    let meta = Meta::total(groups.len());
    Ok(ApiResponse::success(
        "Ok",
        OrderGroupList {
            groups,
            user_role: user.role,
        },
        Some(meta),
    ))
}

/// Deletes every row of the caller's checkout for `delivery_slot_key`, or nothing.
pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    delivery_slot_key: &str,
) -> AppResult<ApiResponse<CancelOrderResponse>> {
    ensure_customer(user)?;
    if orders::parse_delivery_slot_key(delivery_slot_key).is_none() {
        return Err(AppError::BadRequest("Malformed delivery slot key".into()));
    }

    let ownership = Condition::all()
        .add(OrderItemCol::DeliverySlotKey.eq(delivery_slot_key))
        .add(OrderItemCol::OrdererCode.eq(user.orderer_code.as_str()));

    let txn = state.orm.begin().await?;
    let rows = OrderItems::find()
        .filter(ownership.clone())
        .lock(LockType::Update)
        .all(&txn)
        .await?;
    let first = rows.first().ok_or(AppError::NotFound)?;

    let start_hour = u32::try_from(first.delivery_start_hour).unwrap_or_default();
    if !orders::is_cancellable(first.order_date, start_hour, state.business_now()) {
        tracing::debug!(delivery_slot_key, "cancellation window closed");
        return Err(AppError::Conflict(
            "The delivery window has started; the order can no longer be cancelled".into(),
        ));
    }

    let expected = rows.len() as u64;
    let deleted = OrderItems::delete_many()
        .filter(ownership)
        .exec(&txn)
        .await?
        .rows_affected;
    if deleted != expected {
        // Dropping the transaction rolls the partial delete back.
        return Err(AppError::Internal(anyhow::anyhow!(
            "cancellation of {delivery_slot_key} removed {deleted} of {expected} rows"
        )));
    }

    ContainerStorage::delete_many()
        .filter(
            Condition::all()
                .add(ContainerCol::DeliverySlotKey.eq(delivery_slot_key))
                .add(ContainerCol::OrdererCode.eq(user.orderer_code.as_str()))
                .add(ContainerCol::Source.eq(RequestSource::Order.as_str()))
                .add(ContainerCol::IsIncoming.eq(true))
                .add(ContainerCol::ActualContainerCount.is_null())
                .add(ContainerCol::OutgoingContainerId.is_null()),
        )
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(delivery_slot_key, deleted, "order cancelled");
    audit::record(
        state,
        Some(user),
        "order_cancel",
        "order_items",
        serde_json::json!({ "delivery_slot_key": delivery_slot_key, "deleted_count": deleted }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order cancelled",
        CancelOrderResponse {
            delivery_slot_key: delivery_slot_key.to_string(),
            deleted_count: deleted,
        },
        Some(Meta::empty()),
    ))
}

/// Staff flag on a single row; siblings in the same checkout are untouched.
pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<OrderItem>> {
    ensure_staff(user)?;
    let existing = OrderItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: OrderItemActive = existing.into();
    active.staff_status_check = Set(payload.staff_status_check.as_str().to_string());
    let item = active.update(&state.orm).await?;

    audit::record(
        state,
        Some(user),
        "order_status_update",
        "order_items",
        serde_json::json!({ "order_item_id": item.id, "status": item.staff_status_check }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        order_item_from_entity(item)?,
        Some(Meta::empty()),
    ))
}

async fn fetch_visible_orders(
    state: &AppState,
    user: &AuthUser,
    query: &OrderListQuery,
) -> AppResult<Vec<OrderItem>> {
    let mut condition = Condition::all();
    if !user.is_staff() {
        condition = condition.add(OrderItemCol::OrdererCode.eq(user.orderer_code.as_str()));
    }
    if let Some(date) = query.order_date {
        condition = condition.add(OrderItemCol::OrderDate.eq(date));
    }

    OrderItems::find()
        .filter(condition)
        .order_by_desc(OrderItemCol::OrderDate)
        .order_by_desc(OrderItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect()
}

fn validate_lines(lines: &[OrderLine]) -> AppResult<()> {
    if lines.is_empty() {
        return Err(AppError::BadRequest("Order has no items".into()));
    }
    let mut seen = HashSet::new();
    for line in lines {
        if line.quantity <= 0 {
            return Err(AppError::BadRequest(format!(
                "Invalid quantity for product {}",
                line.product_id
            )));
        }
        if !seen.insert(line.product_id.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Product {} listed twice",
                line.product_id
            )));
        }
    }
    Ok(())
}

/// Takes a row lock on the caller's user record for the rest of `conn`'s transaction.
pub(crate) async fn lock_customer<C: ConnectionTrait>(conn: &C, user: &AuthUser) -> AppResult<()> {
    Users::find_by_id(user.user_id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(())
}

pub(crate) fn validate_container_info(info: ContainerInfo) -> AppResult<()> {
    if !(0..=MAX_CONTAINER_COUNT).contains(&info.container_count) {
        return Err(AppError::BadRequest(format!(
            "container_count must be between 0 and {MAX_CONTAINER_COUNT}"
        )));
    }
    Ok(())
}

pub(crate) fn delivery_slot(id: String, label: String, start_hour: i32, end_hour: i32) -> DeliverySlot {
    DeliverySlot {
        id,
        label,
        start_hour: u32::try_from(start_hour).unwrap_or_default(),
        end_hour: u32::try_from(end_hour).unwrap_or_default(),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> AppResult<OrderItem> {
    let product: Product = serde_json::from_value(model.product)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt product snapshot: {e}")))?;
    Ok(OrderItem {
        id: model.id,
        order_id: model.order_id,
        product,
        quantity: model.quantity,
        item_price: model.item_price,
        total_order_price: model.total_order_price,
        orderer_code: model.orderer_code,
        order_date: model.order_date,
        delivery_time_slot: delivery_slot(
            model.delivery_slot_id,
            model.delivery_slot_label,
            model.delivery_start_hour,
            model.delivery_end_hour,
        ),
        delivery_slot_key: model.delivery_slot_key,
        staff_status_check: StaffStatusCheck::parse(&model.staff_status_check)?,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
