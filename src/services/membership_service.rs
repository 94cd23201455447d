use chrono::Utc;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};

use crate::{
    audit,
    dto::{
        containers::ContainerRequest,
        membership::{RefillTicketResult, UpdateMembershipRequest},
    },
    entity::{
        memberships::{ActiveModel as MembershipActive, Entity as Memberships, Model as MembershipModel},
        users::{Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_customer, ensure_staff},
    models::{DeliverySlot, Membership, RequestSource, UserRole},
    response::{ApiResponse, Meta},
    services::{container_service, open_hours_service},
    state::AppState,
};

/// The caller's membership. Customers without a row have no fee and no tickets.
pub async fn get_membership(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<Membership>> {
    ensure_customer(user)?;
    let membership = Memberships::find_by_id(user.orderer_code.clone())
        .one(&state.orm)
        .await?
        .map(membership_from_entity)
        .unwrap_or_else(|| empty_membership(&user.orderer_code));
    Ok(ApiResponse::ok(membership))
}

pub async fn update_membership(
    state: &AppState,
    user: &AuthUser,
    orderer_code: &str,
    payload: UpdateMembershipRequest,
) -> AppResult<ApiResponse<Membership>> {
    ensure_staff(user)?;
    if payload.delivery_fee.is_some_and(|fee| fee < 0) {
        return Err(AppError::BadRequest("delivery_fee must not be negative".into()));
    }
    if payload.refill_tickets.is_some_and(|tickets| tickets < 0) {
        return Err(AppError::BadRequest("refill_tickets must not be negative".into()));
    }

    let owner = Users::find()
        .filter(UserCol::OrdererCode.eq(orderer_code))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    if UserRole::parse(&owner.role)? != UserRole::Customer {
        return Err(AppError::BadRequest("Only customers hold memberships".into()));
    }

    let txn = state.orm.begin().await?;
    let existing = Memberships::find_by_id(orderer_code.to_string())
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let updated = match existing {
        Some(model) => {
            let mut active: MembershipActive = model.into();
            if let Some(fee) = payload.delivery_fee {
                active.delivery_fee = Set(fee);
            }
            if let Some(tickets) = payload.refill_tickets {
                active.refill_tickets = Set(tickets);
            }
            active.updated_at = Set(Utc::now().into());
            active.update(&txn).await?
        }
        None => {
            MembershipActive {
                orderer_code: Set(orderer_code.to_string()),
                delivery_fee: Set(payload.delivery_fee.unwrap_or_default()),
                refill_tickets: Set(payload.refill_tickets.unwrap_or_default()),
                updated_at: Set(Utc::now().into()),
            }
            .insert(&txn)
            .await?
        }
    };
    txn.commit().await?;

    audit::record(
        state,
        Some(user),
        "membership_update",
        "memberships",
        serde_json::json!({
            "orderer_code": updated.orderer_code,
            "delivery_fee": updated.delivery_fee,
            "refill_tickets": updated.refill_tickets,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Membership updated",
        membership_from_entity(updated),
        Some(Meta::empty()),
    ))
}

/// Spends one refill ticket on a container pickup without an order.
///
/// The ticket and the ledger request row are written in one transaction; the membership
/// row stays locked until it commits.
pub async fn use_refill_ticket(
    state: &AppState,
    user: &AuthUser,
    payload: ContainerRequest,
) -> AppResult<ApiResponse<RefillTicketResult>> {
    ensure_customer(user)?;
    payload.validate()?;
    let now = state.business_now();

    let txn = state.orm.begin().await?;
    let membership = Memberships::find_by_id(user.orderer_code.clone())
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .filter(|m| m.refill_tickets > 0)
        .ok_or_else(|| AppError::BadRequest("No refill tickets left".into()))?;

    let slot = open_hours_service::booking_slot(
        &txn,
        payload.delivery_date,
        &payload.delivery_slot_id,
        now,
    )
    .await?;

    let remaining_tickets = membership.refill_tickets - 1;
    let mut active: MembershipActive = membership.into();
    active.refill_tickets = Set(remaining_tickets);
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;

    let row = container_service::insert_request(
        &txn,
        &user.orderer_code,
        payload.delivery_date,
        &DeliverySlot::from(&slot),
        payload.container_info(),
        RequestSource::RefillTicket,
    )
    .await?;
    txn.commit().await?;

    tracing::info!(
        container_id = %row.id,
        orderer_code = %user.orderer_code,
        remaining_tickets,
        "refill ticket used"
    );
    audit::record(
        state,
        Some(user),
        "refill_ticket_use",
        "memberships",
        serde_json::json!({
            "container_id": row.id,
            "delivery_slot_key": row.delivery_slot_key,
            "container_count": payload.container_count,
            "remaining_tickets": remaining_tickets,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Refill ticket used",
        RefillTicketResult {
            item: container_service::container_item_from_entity(row)?,
            remaining_tickets,
        },
        Some(Meta::empty()),
    ))
}

fn empty_membership(orderer_code: &str) -> Membership {
    Membership {
        orderer_code: orderer_code.to_string(),
        delivery_fee: 0,
        refill_tickets: 0,
    }
}

fn membership_from_entity(model: MembershipModel) -> Membership {
    Membership {
        orderer_code: model.orderer_code,
        delivery_fee: model.delivery_fee,
        refill_tickets: model.refill_tickets,
    }
}
