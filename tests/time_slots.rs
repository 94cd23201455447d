use std::collections::HashMap;

use chrono::NaiveDate;
use refill_shop_api::{
    domain::time_slots::{
        CLOSED_COMMENT, SlotOverride, SlotUpdate, build_catalog, find_base_slot,
        generate_base_slots, is_non_operating_day, is_slot_expired, retain_known_slots,
    },
    models::DateType,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn base_template_has_twelve_hourly_slots() {
    let slots = generate_base_slots();
    assert_eq!(slots.len(), 12);

    let first = &slots[0];
    assert_eq!(first.id, "slot-10");
    assert_eq!(first.label, "10:00 - 11:00");
    assert_eq!((first.start_hour, first.end_hour), (10, 11));

    let last = slots.last().expect("last slot");
    assert_eq!(last.id, "slot-21");
    assert_eq!(last.label, "21:00 - 22:00");

    assert!(slots.iter().all(|s| s.is_enabled && s.comment.is_empty() && s.reservation_count == 0));
}

#[test]
fn overrides_touch_only_known_slots() {
    let mut overrides = HashMap::new();
    overrides.insert(
        "slot-14".to_string(),
        SlotOverride {
            is_enabled: Some(false),
            comment: Some("Staff meeting".into()),
            reservation_count: None,
        },
    );
    overrides.insert(
        "slot-16".to_string(),
        SlotOverride {
            reservation_count: Some(3),
            ..Default::default()
        },
    );
    overrides.insert(
        "slot-23".to_string(),
        SlotOverride {
            is_enabled: Some(true),
            ..Default::default()
        },
    );

    // A Monday, so the closure rule does not apply.
    let catalog = build_catalog(date(2024, 6, 10), &overrides);
    assert_eq!(catalog.len(), 12);
    assert!(catalog.iter().all(|s| s.id != "slot-23"));

    let closed = catalog.iter().find(|s| s.id == "slot-14").expect("slot-14");
    assert!(!closed.is_enabled);
    assert_eq!(closed.comment, "Staff meeting");

    let busy = catalog.iter().find(|s| s.id == "slot-16").expect("slot-16");
    assert!(busy.is_enabled);
    assert_eq!(busy.reservation_count, 3);

    let untouched = catalog.iter().find(|s| s.id == "slot-10").expect("slot-10");
    assert!(untouched.is_enabled);
    assert_eq!(untouched.reservation_count, 0);
}

#[test]
fn sunday_closes_every_slot_whatever_the_overrides() {
    let sunday = date(2024, 6, 9);
    assert!(is_non_operating_day(sunday));

    let mut overrides = HashMap::new();
    overrides.insert(
        "slot-12".to_string(),
        SlotOverride {
            is_enabled: Some(true),
            comment: Some("Open".into()),
            reservation_count: None,
        },
    );

    let catalog = build_catalog(sunday, &overrides);
    assert_eq!(catalog.len(), 12);
    assert!(catalog.iter().all(|s| !s.is_enabled && s.comment == CLOSED_COMMENT));
}

#[test]
fn unknown_slot_updates_are_dropped() {
    let updates = vec![
        SlotUpdate {
            id: "slot-9".into(),
            is_enabled: false,
            comment: String::new(),
        },
        SlotUpdate {
            id: "slot-11".into(),
            is_enabled: false,
            comment: "Closed early".into(),
        },
    ];
    let kept = retain_known_slots(updates);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].id, "slot-11");

    assert!(find_base_slot("slot-21").is_some());
    assert!(find_base_slot("slot-22").is_none());
}

#[test]
fn repeated_slot_updates_keep_the_last_entry() {
    let updates = vec![
        SlotUpdate {
            id: "slot-12".into(),
            is_enabled: false,
            comment: "Lunch".into(),
        },
        SlotUpdate {
            id: "slot-13".into(),
            is_enabled: false,
            comment: String::new(),
        },
        SlotUpdate {
            id: "slot-12".into(),
            is_enabled: true,
            comment: "Reopened".into(),
        },
    ];
    let kept = retain_known_slots(updates);
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0].id, "slot-13");
    assert_eq!(kept[1].id, "slot-12");
    assert!(kept[1].is_enabled);
    assert_eq!(kept[1].comment, "Reopened");
}

#[test]
fn slot_expires_once_its_hour_has_started() {
    let now = date(2024, 6, 10).and_hms_opt(14, 30, 0).expect("valid time");

    assert!(!is_slot_expired(date(2024, 6, 10), 15, now));
    assert!(is_slot_expired(date(2024, 6, 10), 14, now));
    assert!(is_slot_expired(date(2024, 6, 10), 10, now));
    assert!(!is_slot_expired(date(2024, 6, 11), 10, now));
    assert!(is_slot_expired(date(2024, 6, 9), 21, now));
}

#[test]
fn date_type_maps_today_and_tomorrow_only() {
    let today = date(2024, 6, 10);
    assert_eq!(DateType::Today.resolve(today), today);
    assert_eq!(DateType::Tomorrow.resolve(today), date(2024, 6, 11));
    assert_eq!(DateType::from_date(date(2024, 6, 11), today), Some(DateType::Tomorrow));
    assert_eq!(DateType::from_date(date(2024, 6, 12), today), None);
    assert_eq!(DateType::from_date(date(2024, 6, 9), today), None);
}
