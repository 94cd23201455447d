use chrono::{NaiveDate, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::{
        ledger::{self, AllBalances, OutgoingChange, Reconciliation},
        orders,
    },
    dto::{
        containers::{ContainerBalance, ContainerRequest, ReconciliationResult, StaffTodoData},
        orders::ContainerInfo,
    },
    entity::container_storage::{
        ActiveModel as ContainerActive, Column as ContainerCol, Entity as ContainerStorage,
        Model as ContainerModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer, ensure_staff},
    models::{ContainerStorageItem, DeliverySlot, RequestSource},
    response::{ApiResponse, Meta},
    services::{
        open_hours_service,
        order_service::{self, delivery_slot},
    },
    state::AppState,
};

/// Balance of the calling customer, summed from their ledger rows.
pub async fn get_balance(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ContainerBalance>> {
    let items = load_items(state, Some(&user.orderer_code)).await?;
    let balance = ledger::balance(&items, &user.orderer_code);
    Ok(ApiResponse::ok(ContainerBalance {
        orderer_code: user.orderer_code.clone(),
        balance,
    }))
}

pub async fn get_all_balances(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<AllBalances>> {
    ensure_staff(user)?;
    let items = load_items(state, None).await?;
    let balances = ledger::all_balances(&items);
    let meta = Meta::total(balances.balances.len());
    Ok(ApiResponse::success("Container balances", balances, Some(meta)))
}

pub async fn get_staff_todo_data(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<StaffTodoData>> {
    ensure_staff(user)?;
    let items = load_items(state, None).await?;
    let today = state.business_now().date();

    let summary = ledger::summarize(&items);
    let (due_today, overdue) = ledger::split_for_day(&items, today);
    let meta = Meta::total(items.len());

    Ok(ApiResponse::success(
        "Container todo",
        StaffTodoData {
            container_items: items,
            due_today,
            overdue,
            summary,
        },
        Some(meta),
    ))
}

/// Records staff-verified counts on a request row.
///
/// The incoming count lands on the row itself; the outgoing count lives on a linked
/// sibling row that is created on first use and updated afterwards.
pub async fn reconcile(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: Reconciliation,
) -> AppResult<ApiResponse<ReconciliationResult>> {
    ensure_staff(user)?;
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let target = ContainerStorage::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let plan = ledger::plan_reconciliation(&container_item_from_entity(target.clone())?, &payload)?;

    let mut active: ContainerActive = target.clone().into();
    if let Some(count) = plan.incoming_count {
        active.actual_container_count = Set(Some(count));
    }
    if let Some(comment) = payload.staff_comment.as_ref() {
        active.staff_comment = Set(Some(comment.clone()));
    }

    let outgoing_container_id = match plan.outgoing {
        OutgoingChange::None => target.outgoing_container_id,
        OutgoingChange::Create { count } => {
            let sibling = ContainerActive {
                id: Set(Uuid::new_v4()),
                orderer_code: Set(target.orderer_code.clone()),
                order_date: Set(target.order_date),
                delivery_slot_id: Set(target.delivery_slot_id.clone()),
                delivery_slot_label: Set(target.delivery_slot_label.clone()),
                delivery_start_hour: Set(target.delivery_start_hour),
                delivery_end_hour: Set(target.delivery_end_hour),
                delivery_slot_key: Set(target.delivery_slot_key.clone()),
                requested_container_count: Set(0),
                needs_washing: Set(false),
                actual_container_count: Set(Some(count)),
                is_incoming: Set(false),
                outgoing_container_id: Set(None),
                outgoing_container_count: Set(None),
                staff_comment: Set(None),
                source: Set(target.source.clone()),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;
            active.outgoing_container_id = Set(Some(sibling.id));
            active.outgoing_container_count = Set(Some(count));
            Some(sibling.id)
        }
        OutgoingChange::Update { id: sibling_id, count } => {
            let sibling = ContainerStorage::find_by_id(sibling_id)
                .one(&txn)
                .await?
                .ok_or(AppError::NotFound)?;
            let mut sibling: ContainerActive = sibling.into();
            sibling.actual_container_count = Set(count);
            sibling.update(&txn).await?;
            active.outgoing_container_count = Set(count);
            Some(sibling_id)
        }
    };

    let updated = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        container_id = %updated.id,
        orderer_code = %updated.orderer_code,
        incoming = ?plan.incoming_count,
        outgoing = ?payload.outgoing_count,
        "container reconciled"
    );
    audit::record(
        state,
        Some(user),
        "container_reconcile",
        "container_storage",
        serde_json::json!({
            "container_id": updated.id,
            "incoming_count": plan.incoming_count,
            "outgoing_count": payload.outgoing_count,
            "reconciled_at": Utc::now(),
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Container reconciled",
        ReconciliationResult {
            item: container_item_from_entity(updated)?,
            outgoing_container_id,
        },
        Some(Meta::empty()),
    ))
}

/// A first-time customer's call for staff to collect and fill their initial containers.
///
/// Each customer gets one such call; later pickups go through orders or refill tickets.
pub async fn request_new_customer_call(
    state: &AppState,
    user: &AuthUser,
    payload: ContainerRequest,
) -> AppResult<ApiResponse<ContainerStorageItem>> {
    ensure_customer(user)?;
    payload.validate()?;
    let now = state.business_now();

    let txn = state.orm.begin().await?;
    let slot = open_hours_service::booking_slot(
        &txn,
        payload.delivery_date,
        &payload.delivery_slot_id,
        now,
    )
    .await?;

    order_service::lock_customer(&txn, user).await?;
    let previous = ContainerStorage::find()
        .filter(
            Condition::all()
                .add(ContainerCol::OrdererCode.eq(user.orderer_code.as_str()))
                .add(ContainerCol::Source.eq(RequestSource::NewCustomerCall.as_str())),
        )
        .count(&txn)
        .await?;
    if previous > 0 {
        tracing::debug!(orderer_code = %user.orderer_code, "repeat new customer call");
        return Err(AppError::Conflict(
            "A new customer call has already been filed".into(),
        ));
    }

    let row = insert_request(
        &txn,
        &user.orderer_code,
        payload.delivery_date,
        &DeliverySlot::from(&slot),
        payload.container_info(),
        RequestSource::NewCustomerCall,
    )
    .await?;
    txn.commit().await?;

    tracing::info!(
        container_id = %row.id,
        orderer_code = %user.orderer_code,
        container_count = payload.container_count,
        "new customer call filed"
    );
    audit::record(
        state,
        Some(user),
        "new_customer_call",
        "container_storage",
        serde_json::json!({
            "container_id": row.id,
            "delivery_slot_key": row.delivery_slot_key,
            "container_count": payload.container_count,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "New customer call filed",
        container_item_from_entity(row)?,
        Some(Meta::empty()),
    ))
}

/// Appends an unreconciled incoming request row for the given visit.
pub(crate) async fn insert_request<C: ConnectionTrait>(
    conn: &C,
    orderer_code: &str,
    date: NaiveDate,
    slot: &DeliverySlot,
    info: ContainerInfo,
    source: RequestSource,
) -> AppResult<ContainerModel> {
    let row = ContainerActive {
        id: Set(Uuid::new_v4()),
        orderer_code: Set(orderer_code.to_string()),
        order_date: Set(date),
        delivery_slot_id: Set(slot.id.clone()),
        delivery_slot_label: Set(slot.label.clone()),
        delivery_start_hour: Set(slot.start_hour as i32),
        delivery_end_hour: Set(slot.end_hour as i32),
        delivery_slot_key: Set(orders::delivery_slot_key(date, &slot.id)),
        requested_container_count: Set(info.container_count),
        needs_washing: Set(info.needs_washing),
        actual_container_count: Set(None),
        is_incoming: Set(true),
        outgoing_container_id: Set(None),
        outgoing_container_count: Set(None),
        staff_comment: Set(None),
        source: Set(source.as_str().to_string()),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(row)
}

async fn load_items(
    state: &AppState,
    orderer_code: Option<&str>,
) -> AppResult<Vec<ContainerStorageItem>> {
    let mut finder = ContainerStorage::find();
    if let Some(code) = orderer_code {
        finder = finder.filter(ContainerCol::OrdererCode.eq(code));
    }
    finder
        .order_by_desc(ContainerCol::OrderDate)
        .order_by_desc(ContainerCol::DeliveryStartHour)
        .order_by_asc(ContainerCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(container_item_from_entity)
        .collect()
}

pub(crate) fn container_item_from_entity(model: ContainerModel) -> AppResult<ContainerStorageItem> {
    Ok(ContainerStorageItem {
        id: model.id,
        orderer_code: model.orderer_code,
        order_date: model.order_date,
        delivery_time_slot: delivery_slot(
            model.delivery_slot_id,
            model.delivery_slot_label,
            model.delivery_start_hour,
            model.delivery_end_hour,
        ),
        delivery_slot_key: model.delivery_slot_key,
        requested_container_count: model.requested_container_count,
        needs_washing: model.needs_washing,
        actual_container_count: model.actual_container_count,
        is_incoming: model.is_incoming,
        outgoing_container_id: model.outgoing_container_id,
        outgoing_container_count: model.outgoing_container_count,
        staff_comment: model.staff_comment,
        source: RequestSource::parse(&model.source)?,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
