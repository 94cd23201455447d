//! Delivery window catalog.
//!
//! Every day shares one fixed template of one-hour windows. Staff overrides (keyed by
//! slot id) toggle a window or attach a comment; the non-operating weekday closes
//! everything regardless of overrides.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::TimeSlot;

pub const FIRST_START_HOUR: u32 = 10;
pub const LAST_START_HOUR: u32 = 21;
pub const NON_OPERATING_DAY: Weekday = Weekday::Sun;
pub const CLOSED_COMMENT: &str = "No deliveries on Sundays";

/// Stored per-slot override for one date type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SlotOverride {
    pub is_enabled: Option<bool>,
    pub comment: Option<String>,
    pub reservation_count: Option<i64>,
}

/// Staff-submitted state of one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SlotUpdate {
    pub id: String,
    pub is_enabled: bool,
    #[serde(default)]
    pub comment: String,
}

pub fn slot_id(start_hour: u32) -> String {
    format!("slot-{start_hour}")
}

fn slot_label(start_hour: u32, end_hour: u32) -> String {
    format!("{start_hour:02}:00 - {end_hour:02}:00")
}

/// Twelve one-hour windows starting at 10:00, all open, no comment, no reservations.
pub fn generate_base_slots() -> Vec<TimeSlot> {
    (FIRST_START_HOUR..=LAST_START_HOUR)
        .map(|start_hour| {
            let end_hour = start_hour + 1;
            TimeSlot {
                id: slot_id(start_hour),
                label: slot_label(start_hour, end_hour),
                start_hour,
                end_hour,
                is_enabled: true,
                comment: String::new(),
                reservation_count: 0,
            }
        })
        .collect()
}

/// Template slot for `id`, if the id belongs to the template.
pub fn find_base_slot(id: &str) -> Option<TimeSlot> {
    generate_base_slots().into_iter().find(|slot| slot.id == id)
}

/// Left-biased merge: overrides only change flags of slots that already exist.
pub fn apply_overrides(
    base_slots: Vec<TimeSlot>,
    overrides: &HashMap<String, SlotOverride>,
) -> Vec<TimeSlot> {
    base_slots
        .into_iter()
        .map(|slot| match overrides.get(&slot.id) {
            Some(over) => TimeSlot {
                is_enabled: over.is_enabled.unwrap_or(slot.is_enabled),
                comment: over.comment.clone().unwrap_or_default(),
                reservation_count: over.reservation_count.unwrap_or(0),
                ..slot
            },
            None => slot,
        })
        .collect()
}

pub fn is_non_operating_day(date: NaiveDate) -> bool {
    date.weekday() == NON_OPERATING_DAY
}

/// Closes every slot when `date` is the non-operating weekday.
pub fn apply_closure(slots: Vec<TimeSlot>, date: NaiveDate) -> Vec<TimeSlot> {
    if !is_non_operating_day(date) {
        return slots;
    }
    slots
        .into_iter()
        .map(|slot| TimeSlot {
            is_enabled: false,
            comment: CLOSED_COMMENT.to_string(),
            ..slot
        })
        .collect()
}

/// The catalog shown for `date`: template, then overrides, then the closure rule.
pub fn build_catalog(date: NaiveDate, overrides: &HashMap<String, SlotOverride>) -> Vec<TimeSlot> {
    apply_closure(apply_overrides(generate_base_slots(), overrides), date)
}

/// Drops updates whose id is not part of the template. When an id repeats, the last
/// update for it wins.
pub fn retain_known_slots(updates: Vec<SlotUpdate>) -> Vec<SlotUpdate> {
    let mut seen = HashSet::new();
    let mut kept: Vec<SlotUpdate> = updates
        .into_iter()
        .rev()
        .filter(|update| find_base_slot(&update.id).is_some())
        .filter(|update| seen.insert(update.id.clone()))
        .collect();
    kept.reverse();
    kept
}

/// True while the window on `date` starting at `start_hour` has not begun yet.
pub fn is_slot_ahead(date: NaiveDate, start_hour: u32, now: NaiveDateTime) -> bool {
    let today = now.date();
    date > today || (date == today && start_hour > now.hour())
}

/// "Too soon to deliver": the window has started or lies in the past.
pub fn is_slot_expired(date: NaiveDate, start_hour: u32, now: NaiveDateTime) -> bool {
    !is_slot_ahead(date, start_hour, now)
}
