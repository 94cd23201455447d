use chrono::NaiveDate;
use refill_shop_api::{
    domain::cart::{Cart, CartProduct, CartSession, MemoryCartStore},
    error::AppError,
    models::DeliverySlot,
};
use uuid::Uuid;

fn product(id: &str, price_per_min_order: i64) -> CartProduct {
    CartProduct {
        id: id.to_string(),
        name: format!("Product {id}"),
        order_min_quantity: 0.5,
        order_unit: "kg".into(),
        price_per_min_order,
    }
}

fn slot(start_hour: u32) -> DeliverySlot {
    DeliverySlot {
        id: format!("slot-{start_hour}"),
        label: format!("{start_hour:02}:00 - {:02}:00", start_hour + 1),
        start_hour,
        end_hour: start_hour + 1,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn totals_use_price_per_min_order_times_batches() -> anyhow::Result<()> {
    let mut cart = Cart::default();
    cart.add_item(product("GR-RI-001", 5000), 2)?;
    assert_eq!(cart.total_price(), 10000);
    assert_eq!(cart.total_items(), 2);
    assert_eq!(cart.lines[0].shipped_amount(), 1.0);

    cart.add_item(product("LQ-OL-001", 6000), 1)?;
    assert_eq!(cart.total_price(), 16000);
    assert_eq!(cart.total_items(), 3);
    Ok(())
}

#[test]
fn adding_same_product_merges_lines() -> anyhow::Result<()> {
    let mut cart = Cart::default();
    cart.add_item(product("GR-RI-001", 3000), 1)?;
    cart.add_item(product("GR-RI-001", 3000), 2)?;
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].quantity, 3);
    Ok(())
}

#[test]
fn merging_past_the_quantity_limit_is_rejected() -> anyhow::Result<()> {
    let mut cart = Cart::default();
    cart.add_item(product("GR-RI-001", 3000), i32::MAX)?;
    let overflow = cart.add_item(product("GR-RI-001", 3000), 1);
    assert!(matches!(overflow, Err(AppError::BadRequest(_))));
    assert_eq!(cart.lines[0].quantity, i32::MAX);
    Ok(())
}

#[tokio::test]
async fn rejected_merge_is_not_saved() -> anyhow::Result<()> {
    let store = MemoryCartStore::new();
    let owner = Uuid::new_v4();

    let mut session = CartSession::open(store.clone(), owner).await?;
    session.add_item(product("GR-RI-001", 3000), i32::MAX).await?;
    let overflow = session.add_item(product("GR-RI-001", 3000), 1).await;
    assert!(matches!(overflow, Err(AppError::BadRequest(_))));
    assert_eq!(store.save_count(), 1);
    Ok(())
}

#[test]
fn non_positive_quantity_removes_line() -> anyhow::Result<()> {
    let mut cart = Cart::default();
    cart.add_item(product("GR-RI-001", 3000), 2)?;
    cart.add_item(product("GR-OA-001", 4500), 1)?;

    cart.update_quantity("GR-RI-001", 5);
    assert_eq!(cart.lines[0].quantity, 5);

    cart.update_quantity("GR-RI-001", 0);
    assert_eq!(cart.lines.len(), 1);
    cart.update_quantity("GR-OA-001", -1);
    assert!(cart.is_empty());
    Ok(())
}

#[test]
fn slot_date_defaults_to_today() {
    let today = date(2024, 6, 10);
    let mut cart = Cart::default();
    cart.set_time_slot(Some(slot(16)), None, today);
    let selection = cart.selection.as_ref().expect("selection");
    assert_eq!(selection.date, today);
    assert_eq!(selection.slot.id, "slot-16");

    cart.set_time_slot(None, Some(date(2024, 6, 11)), today);
    assert!(cart.selection.is_none());
}

#[test]
fn order_lines_carry_no_prices() -> anyhow::Result<()> {
    let mut cart = Cart::default();
    cart.add_item(product("GR-RI-001", 3000), 2)?;
    let lines = cart.order_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product_id, "GR-RI-001");
    assert_eq!(lines[0].quantity, 2);
    Ok(())
}

#[test]
fn checkout_validation_requires_lines_and_slot() -> anyhow::Result<()> {
    let mut cart = Cart::default();
    assert!(matches!(cart.validate_for_checkout(), Err(AppError::BadRequest(_))));

    cart.add_item(product("GR-RI-001", 3000), 1)?;
    assert!(matches!(cart.validate_for_checkout(), Err(AppError::BadRequest(_))));

    cart.set_time_slot(Some(slot(18)), None, date(2024, 6, 10));
    assert!(cart.validate_for_checkout().is_ok());
    Ok(())
}

#[tokio::test]
async fn session_saves_after_every_mutation() -> anyhow::Result<()> {
    let store = MemoryCartStore::new();
    let owner = Uuid::new_v4();
    let today = date(2024, 6, 10);

    let mut session = CartSession::open(store.clone(), owner).await?;
    session.add_item(product("GR-RI-001", 3000), 2).await?;
    session.add_item(product("HH-DT-001", 5000), 1).await?;
    session.update_quantity("GR-RI-001", 4).await?;
    session.set_time_slot(Some(slot(16)), None, today).await?;
    assert_eq!(store.save_count(), 4);

    let saved = store.snapshot(owner).expect("persisted cart");
    assert_eq!(saved.total_price(), 4 * 3000 + 5000);
    assert_eq!(saved.selection.as_ref().map(|s| s.date), Some(today));

    // Reopening picks the cart back up from the store.
    let reopened = CartSession::open(store.clone(), owner).await?;
    assert_eq!(reopened.cart(), &saved);

    session.remove_item("HH-DT-001").await?;
    session.clear().await?;
    assert_eq!(store.save_count(), 6);
    assert!(store.snapshot(owner).expect("persisted cart").is_empty());
    Ok(())
}

#[tokio::test]
async fn checkout_drops_expired_slot_and_keeps_items() -> anyhow::Result<()> {
    let store = MemoryCartStore::new();
    let owner = Uuid::new_v4();
    let today = date(2024, 6, 10);

    let mut session = CartSession::open(store.clone(), owner).await?;
    session.add_item(product("GR-RI-001", 3000), 2).await?;
    session.set_time_slot(Some(slot(13)), None, today).await?;

    let now = today.and_hms_opt(14, 5, 0).expect("valid time");
    let result = session.prepare_checkout(now).await;
    assert!(matches!(result, Err(AppError::SlotUnavailable(_))));

    let saved = store.snapshot(owner).expect("persisted cart");
    assert!(saved.selection.is_none());
    assert_eq!(saved.lines.len(), 1);
    Ok(())
}

#[tokio::test]
async fn checkout_draft_uses_selected_slot() -> anyhow::Result<()> {
    let store = MemoryCartStore::new();
    let owner = Uuid::new_v4();
    let today = date(2024, 6, 10);

    let mut session = CartSession::open(store, owner).await?;
    session.add_item(product("GR-RI-001", 3000), 2).await?;
    session
        .set_time_slot(Some(slot(10)), Some(date(2024, 6, 11)), today)
        .await?;

    let now = today.and_hms_opt(20, 0, 0).expect("valid time");
    let draft = session.prepare_checkout(now).await?;
    assert_eq!(draft.delivery_date, date(2024, 6, 11));
    assert_eq!(draft.slot.id, "slot-10");
    assert_eq!(draft.lines.len(), 1);
    // Preparing does not empty the cart; that happens once the order is stored.
    assert!(!session.cart().is_empty());
    Ok(())
}
