use chrono::{NaiveDate, NaiveDateTime, Utc};
use refill_shop_api::{
    domain::orders::{delivery_slot_key, group_orders, is_cancellable, parse_delivery_slot_key},
    models::{DeliverySlot, OrderItem, Product, StaffStatusCheck, UserRole},
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn at(day: NaiveDate, hour: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, 0, 0).expect("valid time")
}

fn product(id: &str, price_per_min_order: i64) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {id}"),
        category1_id: id[..2].to_string(),
        category2_id: id[3..5].to_string(),
        unit: "kg".into(),
        supplier: "Test Supplier".into(),
        description: None,
        price_per_unit: price_per_min_order * 2,
        order_min_quantity: 0.5,
        order_unit: "kg".into(),
        price_per_min_order,
        in_stock: true,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn item(
    orderer_code: &str,
    order_date: NaiveDate,
    start_hour: u32,
    product_id: &str,
    quantity: i32,
    price_per_min_order: i64,
) -> OrderItem {
    let slot_id = format!("slot-{start_hour}");
    OrderItem {
        id: Uuid::new_v4(),
        order_id: Uuid::new_v4(),
        product: product(product_id, price_per_min_order),
        quantity,
        item_price: price_per_min_order * i64::from(quantity),
        total_order_price: 0,
        orderer_code: orderer_code.to_string(),
        order_date,
        delivery_slot_key: delivery_slot_key(order_date, &slot_id),
        delivery_time_slot: DeliverySlot {
            id: slot_id,
            label: format!("{start_hour:02}:00 - {:02}:00", start_hour + 1),
            start_hour,
            end_hour: start_hour + 1,
        },
        staff_status_check: StaffStatusCheck::Pending,
        created_at: Utc::now(),
    }
}

#[test]
fn delivery_slot_key_round_trips_through_parse() {
    let key = delivery_slot_key(date(2024, 6, 10), "slot-16");
    assert_eq!(key, "2024-06-10_slot-16");
    assert_eq!(parse_delivery_slot_key(&key), Some((date(2024, 6, 10), "slot-16")));
    assert_eq!(parse_delivery_slot_key("2024-06-10"), None);
    assert_eq!(parse_delivery_slot_key("yesterday_slot-16"), None);
    assert_eq!(parse_delivery_slot_key("2024-06-10_"), None);
}

#[test]
fn group_total_is_sum_of_item_prices_and_items_sort_by_product_id() {
    let day = date(2024, 6, 10);
    let rows = vec![
        item("A-1001", day, 16, "LQ-OL-001", 1, 6000),
        item("A-1001", day, 16, "GR-RI-001", 2, 3000),
        item("A-1001", day, 16, "HH-DT-001", 3, 5000),
    ];

    let groups = group_orders(rows, UserRole::Customer, at(day, 9));
    assert_eq!(groups.len(), 1);
    let group = &groups[0];
    assert_eq!(group.delivery_slot_key, "2024-06-10_slot-16");
    assert_eq!(group.total_price, 6000 + 6000 + 15000);
    let ids: Vec<&str> = group.items.iter().map(|i| i.product.id.as_str()).collect();
    assert_eq!(ids, vec!["GR-RI-001", "HH-DT-001", "LQ-OL-001"]);
    assert_eq!(group.time_slot_label, "16:00 - 17:00");
}

#[test]
fn groups_sort_newest_date_then_latest_start_hour() {
    let rows = vec![
        item("A-1001", date(2024, 6, 9), 20, "GR-RI-001", 1, 3000),
        item("A-1001", date(2024, 6, 10), 10, "GR-RI-001", 1, 3000),
        item("A-1001", date(2024, 6, 10), 15, "GR-RI-001", 1, 3000),
        item("A-1001", date(2024, 6, 11), 12, "GR-RI-001", 1, 3000),
    ];
    let groups = group_orders(rows, UserRole::Staff, at(date(2024, 6, 10), 8));
    let keys: Vec<&str> = groups.iter().map(|g| g.delivery_slot_key.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "2024-06-11_slot-12",
            "2024-06-10_slot-15",
            "2024-06-10_slot-10",
            "2024-06-09_slot-20",
        ]
    );
}

#[test]
fn start_hour_beats_lexicographic_key_order() {
    // "slot-9" sorts after "slot-10" as text; the numeric hour decides instead.
    let day = date(2024, 6, 10);
    let mut early = item("A-1001", day, 9, "GR-RI-001", 1, 3000);
    early.delivery_time_slot.id = "slot-9".into();
    early.delivery_slot_key = delivery_slot_key(day, "slot-9");
    let late = item("A-1002", day, 10, "GR-RI-001", 1, 3000);

    let groups = group_orders(vec![early, late], UserRole::Staff, at(day, 7));
    assert_eq!(groups[0].delivery_slot_key, "2024-06-10_slot-10");
    assert_eq!(groups[1].delivery_slot_key, "2024-06-10_slot-9");
}

#[test]
fn orderer_colors_follow_first_appearance() {
    let day = date(2024, 6, 10);
    let rows = vec![
        item("A-1003", day, 18, "GR-RI-001", 1, 3000),
        item("A-1001", day, 18, "GR-OA-001", 1, 4500),
        item("A-1003", day, 18, "LQ-SO-001", 1, 4000),
    ];
    let groups = group_orders(rows, UserRole::Staff, at(day, 9));
    let group = &groups[0];
    assert_eq!(group.orderer_count, 2);
    assert_eq!(group.orderers[0].orderer_code, "A-1003");
    assert_eq!(group.orderers[0].color_index, 0);
    assert_eq!(group.orderers[1].orderer_code, "A-1001");
    assert_eq!(group.orderers[1].color_index, 1);
}

#[test]
fn cancellation_allowed_only_before_window_starts() {
    let now = at(date(2024, 6, 10), 14);
    assert!(is_cancellable(date(2024, 6, 10), 16, now));
    assert!(!is_cancellable(date(2024, 6, 10), 13, now));
    assert!(!is_cancellable(date(2024, 6, 10), 14, now));
    assert!(is_cancellable(date(2024, 6, 11), 10, now));
    assert!(!is_cancellable(date(2024, 6, 9), 21, now));
}

#[test]
fn can_cancel_is_customer_only() {
    let now = at(date(2024, 6, 10), 14);
    let rows = || {
        vec![
            item("A-1001", date(2024, 6, 10), 16, "GR-RI-001", 1, 3000),
            item("A-1001", date(2024, 6, 10), 13, "GR-RI-001", 1, 3000),
            item("A-1001", date(2024, 6, 11), 10, "GR-RI-001", 1, 3000),
        ]
    };

    let customer = group_orders(rows(), UserRole::Customer, now);
    let flags: Vec<(&str, bool)> = customer
        .iter()
        .map(|g| (g.delivery_slot_key.as_str(), g.can_cancel))
        .collect();
    assert_eq!(
        flags,
        vec![
            ("2024-06-11_slot-10", true),
            ("2024-06-10_slot-16", true),
            ("2024-06-10_slot-13", false),
        ]
    );

    let staff = group_orders(rows(), UserRole::Staff, now);
    assert!(staff.iter().all(|g| !g.can_cancel));
}
