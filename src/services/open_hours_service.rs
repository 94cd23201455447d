use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, TransactionTrait};

use crate::{
    audit,
    db::DbPool,
    domain::time_slots::{self, SlotOverride},
    dto::open_hours::{SaveOpenHoursRequest, SaveOpenHoursResponse, TimeSlotCatalog},
    entity::open_hours::{ActiveModel as OpenHourActive, Column as OpenHourCol, Entity as OpenHours},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{DateType, TimeSlot},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_open_hours(
    state: &AppState,
    date_type: DateType,
) -> AppResult<ApiResponse<TimeSlotCatalog>> {
    let today = state.business_now().date();
    let date = date_type.resolve(today);

    let mut overrides = load_overrides(&state.orm, date_type).await?;
    for (slot_id, count) in reservation_counts(&state.pool, date).await? {
        overrides.entry(slot_id).or_default().reservation_count = Some(count);
    }

    let slots = time_slots::build_catalog(date, &overrides);
    let meta = Meta::total(slots.len());
    Ok(ApiResponse::success(
        "Open hours",
        TimeSlotCatalog {
            date_type,
            date,
            is_closed: time_slots::is_non_operating_day(date),
            slots,
        },
        Some(meta),
    ))
}

/// Replaces the override set for a date type. Unknown slot ids are dropped and a repeated
/// id keeps its last entry.
pub async fn save_open_hours(
    state: &AppState,
    user: &AuthUser,
    payload: SaveOpenHoursRequest,
) -> AppResult<ApiResponse<SaveOpenHoursResponse>> {
    ensure_staff(user)?;
    let SaveOpenHoursRequest { date_type, slots } = payload;
    let submitted = slots.len();
    let known = time_slots::retain_known_slots(slots);
    let ignored = submitted - known.len();
    if ignored > 0 {
        tracing::debug!(ignored, date_type = date_type.as_str(), "dropping unknown or repeated slot ids");
    }

    let txn = state.orm.begin().await?;
    OpenHours::delete_many()
        .filter(OpenHourCol::DateType.eq(date_type.as_str()))
        .exec(&txn)
        .await?;

    let now = Utc::now();
    let rows: Vec<OpenHourActive> = known
        .iter()
        .map(|slot| OpenHourActive {
            date_type: Set(date_type.as_str().to_string()),
            slot_id: Set(slot.id.clone()),
            is_enabled: Set(slot.is_enabled),
            comment: Set(slot.comment.clone()),
            updated_at: Set(now.into()),
        })
        .collect();
    if !rows.is_empty() {
        OpenHours::insert_many(rows).exec(&txn).await?;
    }
    txn.commit().await?;

    audit::record(
        state,
        Some(user),
        "open_hours_save",
        "open_hours",
        serde_json::json!({ "date_type": date_type.as_str(), "slots": known.len() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Open hours saved",
        SaveOpenHoursResponse {
            date_type,
            saved: known.len(),
            ignored,
        },
        Some(Meta::empty()),
    ))
}

/// Catalog used to validate a booking for `date`; only today and tomorrow are bookable.
pub async fn load_catalog<C: ConnectionTrait>(
    conn: &C,
    date: NaiveDate,
    today: NaiveDate,
) -> AppResult<Vec<TimeSlot>> {
    let date_type = DateType::from_date(date, today).ok_or_else(|| {
        AppError::BadRequest("Delivery date must be today or tomorrow".into())
    })?;
    let overrides = load_overrides(conn, date_type).await?;
    Ok(time_slots::build_catalog(date, &overrides))
}

/// Bookable slot `slot_id` on `date`, or [`AppError::SlotUnavailable`].
pub async fn bookable_slot<C: ConnectionTrait>(
    conn: &C,
    date: NaiveDate,
    slot_id: &str,
    today: NaiveDate,
) -> AppResult<TimeSlot> {
    let catalog = load_catalog(conn, date, today).await?;
    let slot = catalog
        .into_iter()
        .find(|slot| slot.id == slot_id)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown time slot {slot_id}")))?;
    if !slot.is_enabled {
        return Err(AppError::SlotUnavailable(format!(
            "Time slot {} is closed on {date}",
            slot.label
        )));
    }
    Ok(slot)
}

/// [`bookable_slot`] plus the expiry rule: a window that has already started on `date`
/// is rejected with [`AppError::SlotUnavailable`].
pub async fn booking_slot<C: ConnectionTrait>(
    conn: &C,
    date: NaiveDate,
    slot_id: &str,
    now: NaiveDateTime,
) -> AppResult<TimeSlot> {
    let slot = bookable_slot(conn, date, slot_id, now.date()).await?;
    if time_slots::is_slot_expired(date, slot.start_hour, now) {
        tracing::debug!(slot_id = %slot.id, %date, "rejecting booking for started slot");
        return Err(AppError::SlotUnavailable(format!(
            "Time slot {} on {date} can no longer be booked",
            slot.label
        )));
    }
    Ok(slot)
}

async fn load_overrides<C: ConnectionTrait>(
    conn: &C,
    date_type: DateType,
) -> AppResult<HashMap<String, SlotOverride>> {
    let rows = OpenHours::find()
        .filter(OpenHourCol::DateType.eq(date_type.as_str()))
        .all(conn)
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            (
                row.slot_id,
                SlotOverride {
                    is_enabled: Some(row.is_enabled),
                    comment: Some(row.comment),
                    reservation_count: None,
                },
            )
        })
        .collect())
}

/// Distinct customers holding an order per slot on `date`.
async fn reservation_counts(pool: &DbPool, date: NaiveDate) -> AppResult<Vec<(String, i64)>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT delivery_slot_id, COUNT(DISTINCT orderer_code)
        FROM order_items
        WHERE order_date = $1
        GROUP BY delivery_slot_id
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
